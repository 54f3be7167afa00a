use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Types that can be requested as structured JSON from a provider.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// A self-contained JSON schema for this type.
    ///
    /// - `$ref`s are inlined and `definitions` / `$schema` removed, since
    ///   neither Gemini's `responseJsonSchema` nor Claude tool schemas resolve them
    /// - record objects (those with `properties`) get `additionalProperties: false`
    /// - map objects (`BTreeMap<String, _>`) keep their value schema
    fn strict_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);
        close_record_objects(&mut value);

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn close_record_objects(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if map.contains_key("properties") && !map.contains_key("additionalProperties") {
                map.insert(
                    "additionalProperties".to_string(),
                    serde_json::Value::Bool(false),
                );
            }
            for (_, v) in map.iter_mut() {
                close_record_objects(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                close_record_objects(item);
            }
        }
        _ => {}
    }
}

fn inline_refs(value: &mut serde_json::Value) {
    let definitions = match value {
        serde_json::Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(type_name) {
                        // Keep sibling keywords such as `description`.
                        let mut inlined = def.clone();
                        if let (serde_json::Value::Object(target), Some(desc)) =
                            (&mut inlined, map.get("description").cloned())
                        {
                            target.insert("description".to_string(), desc);
                        }
                        *value = inlined;
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if let [single] = all_of.as_slice() {
                    *value = single.clone();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Deserialize, JsonSchema)]
    struct Swatch {
        name: String,
        hex: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Palette {
        swatches: Vec<Swatch>,
        tokens: BTreeMap<String, String>,
    }

    #[test]
    fn nested_struct_is_inlined() {
        let schema = Palette::strict_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("definitions"));
        assert!(!obj.contains_key("$schema"));

        let items = &obj["properties"]["swatches"]["items"];
        assert!(items.get("$ref").is_none());
        assert_eq!(items["type"], serde_json::json!("object"));
        assert_eq!(items["additionalProperties"], serde_json::json!(false));
    }

    #[test]
    fn map_objects_keep_value_schema() {
        let schema = Palette::strict_schema();
        let tokens = &schema["properties"]["tokens"];
        assert_eq!(tokens["additionalProperties"]["type"], serde_json::json!("string"));
    }

    #[test]
    fn optional_fields_stay_optional() {
        let schema = Swatch::strict_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, vec!["name"]);
    }
}
