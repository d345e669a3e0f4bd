//! Constraint fixer over files and directories

use std::fs;
use std::path::Path;

use familiar_snippets::{ConstraintFixer, FixKind};
use serde_json::{json, Value};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_entity_schema_is_fixed() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Bond.schema.json",
        r#"{
            "type": "object",
            "properties": {
                "entity_type": {
                    "type": "string",
                    "enum": ["Focus", "Filament", "Motif", "Bond"],
                    "const": "Bond"
                },
                "strength": { "type": "number", "minimum": 0.0, "maximum": 1.0 }
            }
        }"#,
    );

    let input = dir.path().join("Bond.schema.json");
    let output = dir.path().join("out/Bond.schema.json");
    let outcome = ConstraintFixer::default().fix_file(&input, &output).unwrap();

    let kinds: Vec<FixKind> = outcome.changes.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![FixKind::EnumConstConflict, FixKind::NumericConstraints]);

    let fixed = read(&output);
    assert_eq!(
        fixed["properties"]["entity_type"],
        json!({ "type": "string", "const": "Bond" })
    );
    assert_eq!(fixed["properties"]["strength"], json!({ "type": "number" }));

    // key order survives the rewrite
    let keys: Vec<&String> = fixed["properties"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["entity_type", "strength"]);
}

#[test]
fn test_batch_mirrors_tree_and_counts_failures() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");

    write(&input, "entities/A.json", r#"{"type": "integer", "minimum": 1}"#);
    write(&input, "entities/nested/B.json", r#"{"patternProperties": {"^x": {}}}"#);
    write(&input, "C.json", r#"{"type": "string"}"#);
    write(&input, "Broken.json", "{ nope");
    write(&input, "notes.txt", "ignored");

    let summary = ConstraintFixer::default().fix_batch(&input, &output).unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.modified, 1);
    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.failed, vec![input.join("Broken.json")]);

    assert_eq!(read(&output.join("entities/A.json")), json!({ "type": "integer" }));
    assert_eq!(
        read(&output.join("entities/nested/B.json")),
        json!({ "patternProperties": { "^x": {} } })
    );
    assert!(output.join("C.json").exists());
    assert!(!output.join("Broken.json").exists());
    assert!(!output.join("notes.txt").exists());
}

#[test]
fn test_batch_requires_directory() {
    let dir = tempfile::tempdir().unwrap();
    let result = ConstraintFixer::default().fix_batch(&dir.path().join("missing"), dir.path());
    assert!(result.is_err());
}
