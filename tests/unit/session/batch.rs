use std::fs::{self, File};

use tiff::encoder::{TiffEncoder, colortype};

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Role;
use crate::render::pipeline::Artifact;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "crossmerge_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_set(dir: &Path, base: &str, skip: Option<Role>) {
    for role in Role::ALL {
        if Some(role) == skip {
            continue;
        }
        let path = dir.join(format!("{base}_{}.tif", role.suffix()));
        let mut f = File::create(path).unwrap();
        let data = vec![90u8; 4 * 4 * 3];
        TiffEncoder::new(&mut f)
            .unwrap()
            .write_image::<colortype::RGB8>(4, 4, &data)
            .unwrap();
    }
}

struct FailFor(&'static str);

impl ArtifactSink for FailFor {
    fn write_artifact(&self, base: &str, _artifact: &Artifact) -> MergeResult<()> {
        if base == self.0 {
            return Err(MergeError::Other(anyhow::anyhow!("disk full")));
        }
        Ok(())
    }
}

struct PanicFor(&'static str);

impl ArtifactSink for PanicFor {
    fn write_artifact(&self, base: &str, _artifact: &Artifact) -> MergeResult<()> {
        assert_ne!(base, self.0, "sink exploded");
        Ok(())
    }
}

#[test]
fn complete_and_incomplete_sets_are_isolated() {
    let dir = temp_dir("batch_isolation");
    write_set(&dir, "a", None);
    write_set(&dir, "b", Some(Role::Reference));

    let sink = InMemorySink::new();
    let report = run_batch(&dir, &BatchOpts::default(), &sink).unwrap();

    assert_eq!(report.merged(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(sink.bases(), ["a"]);
    assert_eq!(
        report.diagnostics(),
        ["Skipping b - Incomplete set of images or non-RGB format."]
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failure_in_first_set_does_not_stop_the_next() {
    let dir = temp_dir("batch_failure");
    write_set(&dir, "a", None);
    write_set(&dir, "b", None);

    let report = run_batch(&dir, &BatchOpts::default(), &FailFor("a")).unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.merged(), 1);
    assert_eq!(report.outcomes[0].0, "a");
    match &report.outcomes[0].1 {
        SetOutcome::Failed(MergeError::Processing { stage, .. }) => {
            assert_eq!(*stage, Stage::Write)
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        report.diagnostics(),
        ["Error processing a: disk full".to_string()]
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn panic_is_contained_to_its_set() {
    let dir = temp_dir("batch_panic");
    write_set(&dir, "a", None);
    write_set(&dir, "b", None);

    let report = run_batch(&dir, &BatchOpts::default(), &PanicFor("a")).unwrap();
    assert_eq!(report.merged(), 1);
    match &report.outcomes[0].1 {
        SetOutcome::Failed(MergeError::Processing { stage, detail, .. }) => {
            assert_eq!(*stage, Stage::Panic);
            assert!(detail.contains("sink exploded"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_input_is_a_failure_not_a_skip() {
    let dir = temp_dir("batch_corrupt");
    write_set(&dir, "a", None);
    fs::write(dir.join("a_te.tif"), b"II*\0garbage").unwrap();

    let sink = InMemorySink::new();
    let report = run_batch(&dir, &BatchOpts::default(), &sink).unwrap();
    assert_eq!(report.failed(), 1);
    assert!(sink.is_empty());
    assert!(report.diagnostics()[0].starts_with("Error processing a: "));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parallel_run_keeps_discovery_order() {
    let dir = temp_dir("batch_parallel");
    for base in ["c", "a", "d", "b"] {
        write_set(&dir, base, if base == "d" { Some(Role::Top) } else { None });
    }

    let opts = BatchOpts {
        parallel: true,
        threads: Some(2),
        ..BatchOpts::default()
    };
    let sink = InMemorySink::new();
    let report = run_batch(&dir, &opts, &sink).unwrap();

    let order: Vec<&str> = report.outcomes.iter().map(|(b, _)| b.as_str()).collect();
    assert_eq!(order, ["a", "b", "c", "d"]);
    assert_eq!(report.merged(), 3);
    assert_eq!(report.skipped(), 1);
    assert_eq!(sink.bases(), ["a", "b", "c"]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_dir_yields_empty_report() {
    let dir = temp_dir("batch_empty");
    let report = run_batch(&dir, &BatchOpts::default(), &InMemorySink::new()).unwrap();
    assert!(report.outcomes.is_empty());
    assert!(report.diagnostics().is_empty());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn opts_validation() {
    assert!(BatchOpts::default().validate().is_ok());
    let bad_threads = BatchOpts {
        threads: Some(0),
        ..BatchOpts::default()
    };
    assert!(bad_threads.validate().is_err());
    let bad_ext = BatchOpts {
        ext: ".tif".to_string(),
        ..BatchOpts::default()
    };
    assert!(bad_ext.validate().is_err());
}

#[test]
fn opts_from_partial_json() {
    let opts: BatchOpts =
        serde_json::from_str(r#"{ "parallel": true, "compression": "uncompressed" }"#).unwrap();
    assert!(opts.parallel);
    assert_eq!(opts.compression, PageCompression::Uncompressed);
    assert_eq!(opts.ext, "tif");
    assert!(serde_json::from_str::<BatchOpts>(r#"{ "bogus": 1 }"#).is_err());
}

#[test]
fn default_out_dir_is_under_input_dir() {
    let opts = BatchOpts::default();
    assert_eq!(
        opts.resolve_out_dir(Path::new("scans")),
        Path::new("scans").join("merged_images")
    );
    let opts = BatchOpts {
        out_dir: Some(PathBuf::from("elsewhere")),
        ..BatchOpts::default()
    };
    assert_eq!(opts.resolve_out_dir(Path::new("scans")), Path::new("elsewhere"));
}

#[test]
fn outcomes_are_reported_as_each_set_finishes() {
    let dir = temp_dir("batch_streaming");
    write_set(&dir, "a", Some(Role::Left));
    write_set(&dir, "b", None);
    write_set(&dir, "c", None);

    let seen = std::sync::Mutex::new(Vec::new());
    let sink = FailFor("c");
    let report = run_batch_with(&dir, &BatchOpts::default(), &sink, &|base, outcome| {
        let written = seen.lock().unwrap().len();
        assert_eq!(base, ["a", "b", "c"][written]);
        seen.lock().unwrap().push((base.to_string(), outcome.diagnostic()));
    })
    .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(
        seen,
        [
            (
                "a".to_string(),
                Some("Skipping a - Incomplete set of images or non-RGB format.".to_string())
            ),
            ("b".to_string(), None),
            ("c".to_string(), Some("Error processing c: disk full".to_string())),
        ]
    );
    assert_eq!(report.diagnostics().len(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn sixteen_bit_sets_are_merged() {
    let dir = temp_dir("batch_rgb16");
    for role in Role::ALL {
        let path = dir.join(format!("w_{}.tif", role.suffix()));
        let mut f = File::create(path).unwrap();
        let data = vec![0xabcdu16; 4 * 4 * 3];
        TiffEncoder::new(&mut f)
            .unwrap()
            .write_image::<colortype::RGB16>(4, 4, &data)
            .unwrap();
    }

    let sink = InMemorySink::new();
    let report = run_batch(&dir, &BatchOpts::default(), &sink).unwrap();
    assert_eq!(report.merged(), 1);
    assert!(report.diagnostics().is_empty());
    let artifact = sink.get("w").unwrap();
    assert_eq!(artifact.layers[0].1.get_pixel(0, 0).0, [0xab, 0xab, 0xab, 255]);

    let _ = fs::remove_dir_all(&dir);
}
