use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    assets::inputs::{PartPaths, discover_base_names, load_part_set, validate_part_paths},
    encode::multipage::PageCompression,
    encode::sink::ArtifactSink,
    foundation::error::{MergeError, MergeResult, Stage},
    render::pipeline::compose,
};

/// Default output directory name, relative to the input directory.
pub const DEFAULT_OUT_DIR: &str = "merged_images";

/// Options controlling a batch run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchOpts {
    /// File extension shared by inputs and outputs, without the dot.
    pub ext: String,
    /// Output directory. `None` means `<input dir>/merged_images`.
    pub out_dir: Option<PathBuf>,
    /// Page compression for written artifacts.
    pub compression: PageCompression,
    /// Process sets on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            ext: "tif".to_string(),
            out_dir: None,
            compression: PageCompression::Deflate,
            parallel: false,
            threads: None,
        }
    }
}

impl BatchOpts {
    pub fn validate(&self) -> MergeResult<()> {
        if self.ext.is_empty() || self.ext.contains(['/', '\\', '.']) {
            return Err(MergeError::validation(format!(
                "extension '{}' must be a bare extension like 'tif'",
                self.ext
            )));
        }
        if self.threads == Some(0) {
            return Err(MergeError::validation("'threads' must be >= 1 when set"));
        }
        Ok(())
    }

    /// Output directory for inputs found in `input_dir`.
    pub fn resolve_out_dir(&self, input_dir: &Path) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| input_dir.join(DEFAULT_OUT_DIR))
    }
}

/// Result of processing one base name.
#[derive(Debug)]
pub enum SetOutcome {
    /// Artifact written.
    Merged,
    /// Rejected before decoding ([`MergeError::IncompleteSet`]).
    Skipped(MergeError),
    /// Failed after validation ([`MergeError::Processing`]).
    Failed(MergeError),
}

impl SetOutcome {
    /// Human-readable diagnostic line, if this outcome has one.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            SetOutcome::Merged => None,
            SetOutcome::Skipped(e) | SetOutcome::Failed(e) => Some(e.to_string()),
        }
    }
}

/// Per-base-name outcomes of a batch, in discovery order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(String, SetOutcome)>,
}

impl BatchReport {
    pub fn merged(&self) -> usize {
        self.count(|o| matches!(o, SetOutcome::Merged))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SetOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SetOutcome::Failed(_)))
    }

    /// Skip and error lines, in discovery order.
    pub fn diagnostics(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|(_, o)| o.diagnostic())
            .collect()
    }

    fn count(&self, pred: impl Fn(&SetOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Validate, decode, compose and write one base name.
///
/// Never returns an error: every failure, including a panic, becomes the set's outcome.
#[tracing::instrument(skip(dir, opts, sink))]
pub fn process_set(
    dir: &Path,
    base: &str,
    opts: &BatchOpts,
    sink: &dyn ArtifactSink,
) -> SetOutcome {
    let at = |stage: Stage| move |e: MergeError| MergeError::processing(base, stage, e);
    let run = || -> MergeResult<()> {
        let paths = PartPaths::new(dir, base, &opts.ext);
        validate_part_paths(&paths).map_err(at(Stage::Decode))?;
        let parts = load_part_set(&paths).map_err(at(Stage::Decode))?;
        let artifact = compose(parts).map_err(at(Stage::Compose))?;
        sink.write_artifact(base, &artifact).map_err(at(Stage::Write))
    };

    let result = catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        Err(MergeError::Processing {
            base: base.to_string(),
            stage: Stage::Panic,
            detail: panic_message(payload.as_ref()),
        })
    });

    match result {
        Ok(()) => {
            tracing::info!("merged");
            SetOutcome::Merged
        }
        Err(MergeError::IncompleteSet {
            base,
            missing,
            non_rgb,
        }) => {
            tracing::warn!(?missing, ?non_rgb, "skipping incomplete set");
            SetOutcome::Skipped(MergeError::IncompleteSet {
                base,
                missing,
                non_rgb,
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, "set failed");
            SetOutcome::Failed(e)
        }
    }
}

/// Discover every base name in `dir` and process each one independently.
///
/// Only discovery and option errors abort the batch.
pub fn run_batch(
    dir: &Path,
    opts: &BatchOpts,
    sink: &dyn ArtifactSink,
) -> MergeResult<BatchReport> {
    run_batch_with(dir, opts, sink, &|_, _| {})
}

/// [`run_batch`], calling `on_outcome` as soon as each set finishes.
///
/// Sequential runs report in discovery order; parallel runs report in completion order. The
/// returned report is always in discovery order.
pub fn run_batch_with(
    dir: &Path,
    opts: &BatchOpts,
    sink: &dyn ArtifactSink,
    on_outcome: &(dyn Fn(&str, &SetOutcome) + Sync),
) -> MergeResult<BatchReport> {
    opts.validate()?;
    let bases = discover_base_names(dir, &opts.ext)?;
    tracing::info!(count = bases.len(), dir = %dir.display(), "discovered base names");

    let run_one = |base: &String| {
        let outcome = process_set(dir, base, opts, sink);
        on_outcome(base, &outcome);
        (base.clone(), outcome)
    };
    let outcomes: Vec<(String, SetOutcome)> = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| bases.par_iter().map(run_one).collect())
    } else {
        bases.iter().map(run_one).collect()
    };

    Ok(BatchReport { outcomes })
}

fn build_thread_pool(threads: Option<usize>) -> MergeResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MergeError::validation(format!("failed to build rayon thread pool: {e}")))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/batch.rs"]
mod tests;
