mod common;

use common::fixtures::{list_files, service, write_file, GENERATED, HAND_WRITTEN};
use msgen::manifest::{is_generated_file, read_manifest, ManifestRequest, ModelInput};
use msgen::regen::{
    delete_dir_contents_if_exists, is_protected_path, plan_selective_delete, regenerate,
    regenerate_with, selective_delete_dir_contents, ProtectedPaths, RegenerationRequest,
};
use serde_json::json;

fn backend_request() -> RegenerationRequest {
    RegenerationRequest::Backend(ManifestRequest {
        microservice_id: "svc-hr".into(),
        microservice_name: "HR".into(),
        models: vec![ModelInput::new("Employee", "m1")
            .with_fields(vec![json!({ "name": "firstName" }), json!({ "name": "salary" })])],
        generated_files: Vec::new(),
    })
}

#[test]
fn test_fixture_classification_matches_intent() {
    for rel in GENERATED {
        assert!(!is_protected_path(rel), "{rel} should be regenerated");
    }
    for rel in HAND_WRITTEN {
        assert!(is_protected_path(rel), "{rel} should be protected");
    }
}

#[test]
fn test_selective_delete_leaves_exactly_hand_written_files() {
    let dir = service();

    selective_delete_dir_contents(dir.path()).unwrap();

    let mut expected: Vec<String> = HAND_WRITTEN.iter().map(|s| (*s).to_string()).collect();
    expected.sort();
    assert_eq!(list_files(dir.path()), expected);
}

#[test]
fn test_destructive_delete_leaves_nothing() {
    let dir = service();

    delete_dir_contents_if_exists(dir.path()).unwrap();

    assert!(list_files(dir.path()).is_empty());
    assert!(dir.path().is_dir());
}

#[test]
fn test_dry_run_plan_changes_nothing() {
    let dir = service();
    let before = list_files(dir.path());

    let plan = plan_selective_delete(dir.path(), &ProtectedPaths::canonical()).unwrap();

    assert_eq!(list_files(dir.path()), before);
    assert_eq!(plan.files_removed.len(), GENERATED.len());
}

#[test]
fn test_repeated_regeneration_preserves_custom_code() {
    let dir = service();
    let root = dir.path();
    let render = |root: &std::path::Path| -> anyhow::Result<Vec<String>> {
        for rel in GENERATED {
            write_file(root, rel, "// regenerated\n");
        }
        Ok(GENERATED.iter().map(|s| (*s).to_string()).collect())
    };

    for _ in 0..3 {
        regenerate(root, backend_request(), render).unwrap();
    }

    for rel in HAND_WRITTEN {
        let body = std::fs::read_to_string(root.join(rel)).unwrap();
        assert_eq!(body, format!("// {rel}\n"), "{rel} was rewritten");
    }
    for rel in GENERATED {
        assert!(is_generated_file(root, rel).unwrap(), "{rel} missing from manifest");
    }
    for rel in HAND_WRITTEN {
        assert!(!is_generated_file(root, rel).unwrap(), "{rel} claimed by manifest");
    }

    let manifest = read_manifest(root).unwrap().unwrap();
    assert_eq!(manifest.models[0].field_count, 2);
    assert_eq!(manifest.protected_paths, vec!["src/domain", "tests/domain"]);
}

#[test]
fn test_removed_generated_files_drop_out_of_manifest() {
    let dir = service();
    let root = dir.path();

    regenerate(root, backend_request(), |root| {
        write_file(root, "src/core/app.js", "// v1\n");
        write_file(root, "src/core/legacy.js", "// v1\n");
        Ok(vec!["src/core/app.js".into(), "src/core/legacy.js".into()])
    })
    .unwrap();
    regenerate(root, backend_request(), |root| {
        write_file(root, "src/core/app.js", "// v2\n");
        Ok(vec!["src/core/app.js".into()])
    })
    .unwrap();

    assert!(!root.join("src/core/legacy.js").exists());
    assert!(!is_generated_file(root, "src/core/legacy.js").unwrap());
    assert!(is_generated_file(root, "src/core/app.js").unwrap());
}

#[test]
fn test_extra_protected_files_survive_regeneration() {
    let dir = service();
    let root = dir.path();
    write_file(root, "LICENSE", "MIT\n");
    let protected = ProtectedPaths::canonical().with_extra_files(["LICENSE"]);

    let report = regenerate_with(root, backend_request(), &protected, |_| Ok(Vec::new())).unwrap();

    assert!(root.join("LICENSE").is_file());
    assert!(report.deletion.protected_skipped.contains(&"LICENSE".to_string()));
}
