//! Batch integration tests: real files on disk, full pipeline, worker pool.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use yacs::batch::FileError;
use yacs::{discover, BatchCoordinator, BatchError, ExcludeRules, TransportLoader};
use yacs_core::{ProcessOptions, Processor, ResolutionCache};

fn write(root: &Path, rel: &str, value: &Value) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn read(path: &Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

fn processor() -> Processor {
    Processor::new(
        Arc::new(TransportLoader::with_timeout_seconds(0).unwrap()),
        Arc::new(ResolutionCache::new()),
    )
}

/// Shared library documents plus `count` service documents that use them.
fn service_tree(root: &Path, count: usize) {
    write(
        root,
        "lib/base.json",
        &json!({
            "defaults": {
                "region": "eu-west",
                "owner": "platform",
                "limits": {"cpu": 1, "memory": 512},
                "@lock_names": ["owner"]
            }
        }),
    );
    write(
        root,
        "lib/service.schema.json",
        &json!({
            "type": "object",
            "required": ["name", "region"],
            "properties": {"name": {"type": "string"}}
        }),
    );

    for i in 0..count {
        write(
            root,
            &format!("services/svc{i:02}.json"),
            &json!({
                "@parent": {"$ref": "../lib/base.json#/defaults"},
                "@schemas": {"service": {"$ref": "../lib/service.schema.json"}},
                "name": format!("svc{i:02}"),
                "owner": "someone-else",
                "limits": {"memory": 1024 + i}
            }),
        );
    }
}

#[test]
fn test_batch_produces_merged_outputs() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    service_tree(input.path(), 12);

    let rules = ExcludeRules::new(&["lib/**"]).unwrap();
    let items = discover(input.path(), output.path(), &rules).unwrap();
    assert_eq!(items.len(), 12);

    let summary = BatchCoordinator::new(processor(), ProcessOptions::default(), 4)
        .with_queue_capacity(4)
        .run(items)
        .unwrap();
    assert_eq!(summary.processed, 12);

    let out = read(&output.path().join("services/svc03.json"));
    assert_eq!(
        out,
        json!({
            "region": "eu-west",
            "owner": "platform",
            "limits": {"cpu": 1, "memory": 1027},
            "name": "svc03",
            "@lock_names": ["owner"]
        })
    );
}

#[test]
fn test_batch_skip_stages() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    service_tree(input.path(), 1);

    let options = ProcessOptions {
        inherit: false,
        validate: false,
        ..ProcessOptions::default()
    };
    let rules = ExcludeRules::new(&["lib/**"]).unwrap();
    let items = discover(input.path(), output.path(), &rules).unwrap();
    BatchCoordinator::new(processor(), options, 2)
        .run(items)
        .unwrap();

    let out = read(&output.path().join("services/svc00.json"));
    assert_eq!(out["@parent"]["region"], "eu-west");
    assert_eq!(out["owner"], "someone-else");
    assert!(out.get("@schemas").is_none());
}

#[test]
fn test_invalid_document_fails_the_run() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    service_tree(input.path(), 3);
    write(
        input.path(),
        "services/broken.json",
        &json!({
            "@schemas": {"service": {"$ref": "../lib/service.schema.json"}},
            "name": 7
        }),
    );

    let rules = ExcludeRules::new(&["lib/**"]).unwrap();
    let items = discover(input.path(), output.path(), &rules).unwrap();
    let err = BatchCoordinator::new(processor(), ProcessOptions::default(), 2)
        .run(items)
        .unwrap_err();

    match err {
        BatchError::File { path, source } => {
            assert!(path.ends_with("broken.json"));
            match source {
                FileError::Process(yacs_core::Error::Validation(message)) => {
                    assert!(message.starts_with("[0] "));
                    assert!(message.contains("service"));
                }
                other => panic!("unexpected source: {other}"),
            }
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_reference_target_fails_the_run() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write(input.path(), "a.json", &json!({"x": {"$ref": "missing.json"}}));

    let items = discover(input.path(), output.path(), &ExcludeRules::default()).unwrap();
    let err = BatchCoordinator::new(processor(), ProcessOptions::default(), 1)
        .run(items)
        .unwrap_err();

    assert!(matches!(
        err,
        BatchError::File {
            source: FileError::Process(yacs_core::Error::Fetch { .. }),
            ..
        }
    ));
    assert!(!output.path().join("a.json").exists());
}
