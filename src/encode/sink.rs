use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::encode::multipage::{PageCompression, write_artifact_tiff};
use crate::foundation::error::{MergeError, MergeResult};
use crate::render::pipeline::Artifact;

/// Destination for composited artifacts, one per base name.
///
/// Sinks are shared across worker threads when a batch runs in parallel.
pub trait ArtifactSink: Send + Sync {
    /// Persist `artifact` under `base`. Must not leave partial output behind on error.
    fn write_artifact(&self, base: &str, artifact: &Artifact) -> MergeResult<()>;
}

/// Writes `{out_dir}/{base}.{ext}` as a multi-page TIFF.
#[derive(Clone, Debug)]
pub struct TiffSink {
    out_dir: PathBuf,
    ext: String,
    compression: PageCompression,
}

impl TiffSink {
    pub fn new(out_dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            ext: ext.into(),
            compression: PageCompression::default(),
        }
    }

    pub fn with_compression(mut self, compression: PageCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Final output path for `base`.
    pub fn path_for(&self, base: &str) -> PathBuf {
        self.out_dir.join(format!("{base}.{}", self.ext))
    }

    fn write_tmp(&self, tmp: &Path, artifact: &Artifact) -> MergeResult<()> {
        let f = File::create(tmp).with_context(|| format!("create '{}'", tmp.display()))?;
        let mut w = BufWriter::new(f);
        write_artifact_tiff(&mut w, artifact, self.compression)?;
        w.flush().with_context(|| format!("flush '{}'", tmp.display()))?;
        Ok(())
    }
}

impl ArtifactSink for TiffSink {
    fn write_artifact(&self, base: &str, artifact: &Artifact) -> MergeResult<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("create output dir '{}'", self.out_dir.display()))?;

        let dst = self.path_for(base);
        let tmp = self.out_dir.join(format!(".{base}.{}.partial", self.ext));
        if let Err(e) = self.write_tmp(&tmp, artifact) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &dst)
            .with_context(|| format!("move '{}' to '{}'", tmp.display(), dst.display()))?;

        tracing::debug!(path = %dst.display(), "wrote artifact");
        Ok(())
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    artifacts: Mutex<BTreeMap<String, Artifact>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base names written so far, sorted.
    pub fn bases(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Clone of the artifact stored for `base`.
    pub fn get(&self, base: &str) -> Option<Artifact> {
        self.lock().get(base).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Artifact>> {
        // Inserts are single calls; the map stays consistent after a panic.
        self.artifacts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ArtifactSink for InMemorySink {
    fn write_artifact(&self, base: &str, artifact: &Artifact) -> MergeResult<()> {
        if base.is_empty() {
            return Err(MergeError::validation("artifact base name is empty"));
        }
        self.lock().insert(base.to_string(), artifact.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
