//! Parameter tree cleanup applied before a payload leaves the process.

use serde_json::{Map, Value};

/// Returns a copy of `value` with every `null` removed.
///
/// Nulls are filtered out of arrays and their keys dropped from objects, at
/// any depth. Scalars, including `0`, `false` and `""`, are returned as is.
/// The input is never modified and the function is idempotent.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(sanitize)
                .collect(),
        ),
        Value::Object(entries) => {
            let cleaned: Map<String, Value> = entries
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), sanitize(v)))
                .collect();
            Value::Object(cleaned)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_nulls_from_objects_and_arrays() {
        let input = json!({"a": 1, "b": null, "d": [1, null, 2]});
        assert_eq!(sanitize(&input), json!({"a": 1, "d": [1, 2]}));
    }

    #[test]
    fn keeps_falsy_scalars() {
        let input = json!({"a": 0, "b": false, "c": ""});
        assert_eq!(sanitize(&input), input);
    }

    #[test]
    fn strips_nested_nulls() {
        let input = json!({
            "pagina": 1,
            "filtro": {"de": null, "ate": "31/12/2024", "tags": [null, {"x": null}]},
        });
        assert_eq!(
            sanitize(&input),
            json!({"pagina": 1, "filtro": {"ate": "31/12/2024", "tags": [{}]}})
        );
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            json!(null),
            json!(42),
            json!("text"),
            json!([null, [null, 1], {"k": null}]),
            json!({"a": {"b": {"c": null, "d": [0, false, null]}}}),
        ];
        for sample in samples {
            let once = sanitize(&sample);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn does_not_mutate_input() {
        let input = json!({"a": null, "b": [null]});
        let snapshot = input.clone();
        let _ = sanitize(&input);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn scalar_null_passes_through() {
        assert_eq!(sanitize(&Value::Null), Value::Null);
    }
}
