/*!
shared.rs - helpers used by more than one subcommand.

  - find_tool: case-insensitive lookup over the registered descriptors
  - extract_params: flatten an input schema into (name, type, required, description)
  - build_arguments_from_schema + coerce_value: turn `--param` strings into
    typed JSON using the tool's declared property types
*/

use anyhow::{Result, bail};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use rmcp::model::Tool;

/// One row of a tool's parameter listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub kind: String,
    pub required: bool,
    pub description: String,
}

/// Find a tool by name, ignoring ASCII case.
pub fn find_tool<'a>(tools: &'a [Tool], name: &str) -> Option<&'a Tool> {
    tools.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// First line of a tool description, for one-line listings.
pub fn summary_line(tool: &Tool) -> &str {
    tool.description
        .as_deref()
        .and_then(|d| d.lines().next())
        .unwrap_or("")
}

/// Primitive type of a schema property.
///
/// Optional fields come out of the schema generator as `["integer", "null"]`;
/// the first non-null entry wins.
pub fn declared_type(prop: &Value) -> &str {
    match prop.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|k| *k != "null")
            .unwrap_or("string"),
        _ => "string",
    }
}

fn required_set(schema: &Map<String, Value>) -> HashSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

pub fn extract_params(schema: &Map<String, Value>) -> Vec<ParamInfo> {
    let required = required_set(schema);
    let Some(props) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    props
        .iter()
        .map(|(name, prop)| ParamInfo {
            name: name.clone(),
            kind: declared_type(prop).to_string(),
            required: required.contains(name.as_str()),
            description: prop
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
        })
        .collect()
}

/// Build the JSON arguments object for a call.
///
/// String values (from `--param`) are coerced to the property's declared
/// type; values that arrived structured (from `--param-file`) pass through.
/// Keys unknown to the schema are kept so the tool can reject them itself.
pub fn build_arguments_from_schema(
    schema: &Map<String, Value>,
    mut provided: HashMap<String, Value>,
) -> Result<Map<String, Value>> {
    let required = required_set(schema);
    let mut result = Map::new();

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (pname, prop) in props {
            match provided.remove(pname) {
                Some(Value::String(raw)) => {
                    result.insert(pname.clone(), coerce_value(&raw, declared_type(prop)));
                }
                Some(structured) => {
                    result.insert(pname.clone(), structured);
                }
                None if required.contains(pname.as_str()) => {
                    bail!("missing required parameter: {pname}");
                }
                None => {}
            }
        }
    }

    result.extend(provided);
    Ok(result)
}

/// Coerce a raw string using a primitive type hint; unparseable input stays a string.
pub fn coerce_value(raw: &str, type_hint: &str) -> Value {
    match type_hint {
        "integer" => raw
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        "number" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        "array" => Value::Array(
            raw.split(',')
                .map(|s| Value::String(s.trim().to_string()))
                .collect(),
        ),
        // nested config mappings: accept inline JSON
        "object" => match serde_json::from_str::<Value>(raw) {
            Ok(v @ Value::Object(_)) => v,
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}
