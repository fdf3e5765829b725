//! Minimal response-shape check against the schema sent to the provider.
//!
//! Understands the subset of OpenAPI schema used for `responseSchema`:
//! `type` (case-insensitive `OBJECT`, `ARRAY`, `STRING`, `NUMBER`,
//! `INTEGER`, `BOOLEAN`), `properties`, `required`, and `items`. Unknown
//! keywords are ignored and extra object properties are allowed.

use serde_json::Value;

/// Verify that `value` conforms to `schema`. The error names the first
/// offending path, e.g. `$.content_plan.goals[2]`.
pub fn check_shape(value: &Value, schema: &Value) -> Result<(), String> {
    check_at(value, schema, "$")
}

fn check_at(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    let Some(kind) = schema.get("type").and_then(Value::as_str) else {
        return Ok(());
    };

    match kind.to_ascii_uppercase().as_str() {
        "OBJECT" => {
            let Some(obj) = value.as_object() else {
                return Err(format!("{path}: expected object"));
            };
            if let Some(required) = schema.get("required").and_then(Value::as_array) {
                for key in required.iter().filter_map(Value::as_str) {
                    if !obj.contains_key(key) {
                        return Err(format!("{path}: missing required field '{key}'"));
                    }
                }
            }
            if let Some(props) = schema.get("properties").and_then(Value::as_object) {
                for (key, prop_schema) in props {
                    if let Some(child) = obj.get(key) {
                        check_at(child, prop_schema, &format!("{path}.{key}"))?;
                    }
                }
            }
            Ok(())
        }
        "ARRAY" => {
            let Some(items) = value.as_array() else {
                return Err(format!("{path}: expected array"));
            };
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    check_at(item, item_schema, &format!("{path}[{i}]"))?;
                }
            }
            Ok(())
        }
        "STRING" => expect(value.is_string(), path, "string"),
        "NUMBER" => expect(value.is_number(), path, "number"),
        "INTEGER" => expect(value.is_i64() || value.is_u64(), path, "integer"),
        "BOOLEAN" => expect(value.is_boolean(), path, "boolean"),
        _ => Ok(()),
    }
}

fn expect(ok: bool, path: &str, kind: &str) -> Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(format!("{path}: expected {kind}"))
    }
}
