use crate::config::config::Config;
use schemars::{schema_for, Schema};
use std::collections::HashMap;

const HEADER: &str = "# DebugView Configuration File\n# Read once when the debug context is installed\n\n\n";

/// Renders the config as YAML with each field's doc comment above it.
pub fn serialize_config(config: &Config) -> Result<String, serde_yaml::Error> {
    let yaml_string = serde_yaml::to_string(config)?;
    let mut field_docs = HashMap::new();
    let config_schema = schema_for!(Config);
    extract_field_documentation(&config_schema, &config_schema, "", &mut field_docs);

    let mut output = String::from(HEADER);
    output.push_str(&add_comments_to_yaml(&yaml_string, &field_docs));
    output.push('\n');
    Ok(output)
}

fn extract_field_documentation(
    root: &Schema,
    schema: &Schema,
    prefix: &str,
    field_docs: &mut HashMap<String, String>,
) {
    let Some(properties) = schema
        .as_object()
        .and_then(|obj| obj.get("properties"))
        .and_then(|props| props.as_object())
    else {
        return;
    };

    for (key, prop_value) in properties {
        let field_path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        let Some(prop_obj) = prop_value.as_object() else {
            continue;
        };

        if let Some(desc_str) = prop_obj.get("description").and_then(|d| d.as_str()) {
            field_docs.insert(field_path.clone(), desc_str.to_string());
        }

        // Nested structs are emitted as references into `$defs`
        let nested = match prop_obj.get("$ref").and_then(|r| r.as_str()) {
            Some(reference) => resolve_definition(root, reference),
            None if prop_obj.contains_key("properties") => Schema::try_from(prop_value.clone()).ok(),
            None => None,
        };

        if let Some(nested_schema) = nested {
            extract_field_documentation(root, &nested_schema, &field_path, field_docs);
        }
    }
}

fn resolve_definition(root: &Schema, reference: &str) -> Option<Schema> {
    let name = reference.strip_prefix("#/$defs/")?;
    let definition = root.as_object()?.get("$defs")?.as_object()?.get(name)?;
    Schema::try_from(definition.clone()).ok()
}

fn add_comments_to_yaml(yaml: &str, field_docs: &HashMap<String, String>) -> String {
    let mut result = Vec::new();
    let mut field_path_stack = Vec::new();

    for line in yaml.lines() {
        let is_list_item = line.trim_start().starts_with("- ");
        if let (Some(colon_pos), false) = (line.find(':'), is_list_item) {
            let before_colon = &line[..colon_pos];
            let field_name = before_colon.trim();

            let indent_level = (before_colon.len() - before_colon.trim_start().len()) / 2;
            let indent = "  ".repeat(indent_level);
            field_path_stack.truncate(indent_level);
            field_path_stack.push(field_name.to_string());
            let full_field_path = field_path_stack.join(".");

            if let Some(doc) = field_docs.get(&full_field_path) {
                if !result.is_empty() {
                    result.push(String::new());
                }
                result.push(format!("{}# {}", indent, doc));
            }
        }

        result.push(line.to_string());
    }

    result.join("\n")
}
