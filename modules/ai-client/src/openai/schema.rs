use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Types usable as OpenAI structured output.
///
/// Implemented for anything that is `JsonSchema + DeserializeOwned`. The
/// generated schema satisfies strict mode: every object carries
/// `additionalProperties: false`, lists all of its properties as required
/// and has no `$ref` indirection left.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    fn openai_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = match &mut value {
            Value::Object(map) => {
                map.remove("$schema");
                map.remove("definitions")
            }
            _ => None,
        };
        if let Some(defs) = definitions {
            inline_refs(&mut value, &defs);
        }
        close_objects(&mut value);

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                require_all_properties(map);
            }
            for (_, v) in map.iter_mut() {
                close_objects(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

fn require_all_properties(map: &mut Map<String, Value>) {
    map.insert("additionalProperties".to_string(), Value::Bool(false));
    let required: Vec<Value> = match map.get("properties") {
        Some(Value::Object(props)) => props.keys().cloned().map(Value::String).collect(),
        _ => return,
    };
    map.insert("required".to_string(), Value::Array(required));
}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();
            if let Some(def) = target {
                *value = def;
                inline_refs(value, definitions);
                return;
            }

            // schemars wraps a documented $ref in a single-element allOf.
            let single = match map.get("allOf") {
                Some(Value::Array(all_of)) if all_of.len() == 1 => all_of.first().cloned(),
                _ => None,
            };
            if let Some(inner) = single {
                *value = inner;
                inline_refs(value, definitions);
                return;
            }

            for (_, v) in map.iter_mut() {
                inline_refs(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Verdict {
        is_valid: bool,
        reason: String,
        note: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Citation {
        source: String,
        link: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Answer {
        /// Primary citation for the answer.
        primary: Citation,
        others: Vec<Citation>,
    }

    #[test]
    fn optional_fields_are_still_required() {
        let schema = Verdict::openai_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .expect("required array")
            .iter()
            .filter_map(|v| v.as_str())
            .collect();

        assert!(required.contains(&"is_valid"));
        assert!(required.contains(&"reason"));
        assert!(required.contains(&"note"));
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
    }

    #[test]
    fn nested_and_documented_refs_are_inlined() {
        let schema = Answer::openai_schema();
        let obj = schema.as_object().unwrap();
        assert!(!obj.contains_key("definitions"));
        assert!(!obj.contains_key("$schema"));

        let primary = &schema["properties"]["primary"];
        assert!(primary.get("$ref").is_none());
        assert!(primary.get("allOf").is_none());
        assert_eq!(primary["type"], "object");
        assert_eq!(primary["additionalProperties"], Value::Bool(false));

        let item = &schema["properties"]["others"]["items"];
        assert!(item.get("$ref").is_none());
        assert_eq!(item["type"], "object");
    }
}
