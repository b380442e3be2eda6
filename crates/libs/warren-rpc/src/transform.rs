//! Pure transforms over nested JSON structures.
//!
//! Free functions taking the container as an explicit argument; nothing here
//! touches foreign types. [`scrub_nils`] backs the JSONAPI error adaptation
//! (the JSONAPI spec expects unset keys not to be transmitted at all), and
//! [`rename_keys`] adapts key spellings between wire conventions.

use serde_json::{Map, Value};

/// Rewrites every string key in every nested object by substring
/// substitution, recursing through objects and arrays. Non-container values
/// pass through unchanged.
pub fn rename_keys(value: &Value, find: &str, replace: &str) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, nested)| (key.replace(find, replace), rename_keys(nested, find, replace)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rename_keys(item, find, replace))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Removes every key whose value is JSON null from a flat map. Nested
/// containers are kept as-is; this deliberately scrubs one level only.
pub fn scrub_nils(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renames_keys_through_nested_objects_and_arrays() {
        let input = json!({ "a_x": 1, "b": [{ "c_x": 2 }] });
        let output = rename_keys(&input, "_x", "_y");
        assert_eq!(output, json!({ "a_y": 1, "b": [{ "c_y": 2 }] }));
    }

    #[test]
    fn leaves_non_container_values_untouched() {
        let input = json!({ "k_x": "v_x" });
        assert_eq!(rename_keys(&input, "_x", "_y"), json!({ "k_y": "v_x" }));
        assert_eq!(rename_keys(&json!(42), "_x", "_y"), json!(42));
    }

    #[test]
    fn swapped_rename_restores_the_original() {
        // Holds whenever find/replace never occur as substrings of each other.
        let input = json!({ "a_x": 1, "b": [{ "c_x": 2 }], "plain": null });
        let there = rename_keys(&input, "_x", "_y");
        let back = rename_keys(&there, "_y", "_x");
        assert_eq!(back, input);
    }

    #[test]
    fn scrubs_exactly_the_null_valued_keys() {
        let fields = json!({ "title": "bad", "detail": null })
            .as_object()
            .expect("object")
            .clone();
        let scrubbed = scrub_nils(&fields);
        assert_eq!(Value::Object(scrubbed), json!({ "title": "bad" }));
    }

    #[test]
    fn scrub_is_flat_and_keeps_nested_nulls() {
        let fields = json!({ "meta": { "inner": null }, "gone": null })
            .as_object()
            .expect("object")
            .clone();
        let scrubbed = scrub_nils(&fields);
        assert_eq!(
            Value::Object(scrubbed),
            json!({ "meta": { "inner": null } })
        );
    }
}
