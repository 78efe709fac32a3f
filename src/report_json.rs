//! Purpose: JSON serializers for classification and assembly results.
//! Exports: `classification_json`, `assembly_json`.
//! Role: Keep stdout envelope shapes consistent across `repackage` and `inspect`.
//! Invariants: Stable key names; container is `null` when absent.
//! Invariants: Library order in output matches classifier input order.

use arkpack::api::{AssemblyReport, Classification, Library, NestedEntry};
use serde_json::{Map, Value, json};

fn library_json(library: &Library) -> Value {
    json!({
        "name": library.name(),
        "file": library.file().display().to_string(),
        "scope": library.scope().as_str(),
    })
}

pub(crate) fn classification_json(classification: &Classification) -> Value {
    let libraries = classification
        .outcomes()
        .iter()
        .map(|classified| {
            let mut map = Map::new();
            map.insert("name".to_string(), json!(classified.library.name()));
            map.insert(
                "file".to_string(),
                json!(classified.library.file().display().to_string()),
            );
            map.insert("scope".to_string(), json!(classified.library.scope().as_str()));
            map.insert("outcome".to_string(), json!(classified.outcome.as_str()));
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "container": classification.container().map(library_json),
        "plugins": classification.plugins().iter().map(library_json).collect::<Vec<_>>(),
        "libraries": libraries,
    })
}

fn nested_json(entry: &NestedEntry) -> Value {
    json!({
        "library": entry.library,
        "scope": entry.scope.as_str(),
        "entry": entry.entry,
        "size": entry.size,
        "sha256": entry.sha256,
    })
}

pub(crate) fn assembly_json(report: &AssemblyReport, written_at: Option<String>) -> Value {
    let mut map = Map::new();
    map.insert("output".to_string(), json!(report.output.display().to_string()));
    map.insert("bootstrap_entries".to_string(), json!(report.bootstrap_entries));
    map.insert(
        "nested".to_string(),
        Value::Array(report.nested.iter().map(nested_json).collect()),
    );
    if !report.excluded.is_empty() {
        map.insert("excluded".to_string(), json!(report.excluded));
    }
    if let Some(written_at) = written_at {
        map.insert("written_at".to_string(), json!(written_at));
    }
    Value::Object(map)
}
