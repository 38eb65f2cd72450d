use crate::error::{OblioError, Result};
use serde::Serialize;
use serde_json::Value;

/// Flatten a payload into URL query pairs.
///
/// Nested objects use bracketed keys (`client[cif]=...`), arrays of scalars
/// repeat the key and arrays of objects are indexed (`rows[0][name]=...`).
/// `null` values are skipped; strings are passed through unchanged, so wire
/// types such as [`crate::wire::Bool`] arrive already encoded.
pub fn to_query_pairs<P>(payload: &P) -> Result<Vec<(String, String)>>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(payload)
        .map_err(|e| OblioError::RequestBuild(format!("encode query: {}", e)))?;

    let mut pairs = Vec::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, v) in map {
                flatten(&key, &v, &mut pairs);
            }
        }
        other => {
            return Err(OblioError::RequestBuild(format!(
                "query payload must be an object, got {}",
                other
            )))
        }
    }

    Ok(pairs)
}

fn flatten(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key.to_string(), b.to_string())),
        Value::Number(n) => out.push((key.to_string(), n.to_string())),
        Value::String(s) => out.push((key.to_string(), s.clone())),
        Value::Object(map) => {
            for (child, v) in map {
                flatten(&format!("{}[{}]", key, child), v, out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        flatten(&format!("{}[{}]", key, i), item, out)
                    }
                    scalar => flatten(key, scalar, out),
                }
            }
        }
    }
}
