// Conversion of declarative action input schemas into MCP tool JSON Schema

use serde_json::{json, Map, Value};
use solana_mcp_core::schema::join_path;
use solana_mcp_core::{Constraint, FieldSpec, FieldType, InputSchema, SchemaAdaptationError};
use std::collections::HashSet;

/// Convert `schema` into the object schema advertised as a tool's
/// `inputSchema`.
///
/// Field names, types, optional-ness and descriptions are preserved. Types
/// and constraints JSON Schema cannot express fail with the dotted path of
/// the offending field.
pub fn adapt(schema: &InputSchema) -> Result<Value, SchemaAdaptationError> {
    adapt_object(schema, "")
}

fn adapt_object(schema: &InputSchema, prefix: &str) -> Result<Value, SchemaAdaptationError> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut seen = HashSet::new();

    for field in &schema.fields {
        let path = join_path(prefix, &field.name);
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaAdaptationError::new(path, "duplicate field name"));
        }

        properties.insert(field.name.clone(), adapt_field(field, &path)?);
        if !field.optional {
            required.push(Value::String(field.name.clone()));
        }
    }

    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    }))
}

fn adapt_field(field: &FieldSpec, path: &str) -> Result<Value, SchemaAdaptationError> {
    let mut schema = adapt_type(&field.ty, path)?;

    if let Value::Object(map) = &mut schema {
        if let Some(description) = &field.description {
            map.insert("description".to_string(), Value::String(description.clone()));
        }
        for constraint in &field.constraints {
            let (key, value) = adapt_constraint(constraint, &field.ty, path)?;
            map.insert(key.to_string(), value);
        }
    }

    Ok(schema)
}

fn adapt_type(ty: &FieldType, path: &str) -> Result<Value, SchemaAdaptationError> {
    match ty {
        FieldType::String => Ok(json!({ "type": "string" })),
        FieldType::Number => Ok(json!({ "type": "number" })),
        FieldType::Integer => Ok(json!({ "type": "integer" })),
        FieldType::Boolean => Ok(json!({ "type": "boolean" })),
        FieldType::Enum(values) if values.is_empty() => {
            Err(SchemaAdaptationError::new(path, "enum has no values"))
        }
        FieldType::Enum(values) => Ok(json!({ "type": "string", "enum": values })),
        FieldType::Array(item) => {
            let items = adapt_type(item, &format!("{}[]", path))?;
            Ok(json!({ "type": "array", "items": items }))
        }
        FieldType::Object(inner) => adapt_object(inner, path),
        FieldType::Union(_) => Err(SchemaAdaptationError::new(
            path,
            "union types are not supported",
        )),
        FieldType::Refined { refinement, .. } => Err(SchemaAdaptationError::new(
            path,
            format!("refinement `{}` has no schema equivalent", refinement),
        )),
        FieldType::Custom(name) => Err(SchemaAdaptationError::new(
            path,
            format!("custom type `{}` has no schema equivalent", name),
        )),
    }
}

fn adapt_constraint(
    constraint: &Constraint,
    ty: &FieldType,
    path: &str,
) -> Result<(&'static str, Value), SchemaAdaptationError> {
    let is_string = matches!(ty, FieldType::String);
    let is_numeric = matches!(ty, FieldType::Number | FieldType::Integer);

    let mismatch = |name: &str| {
        SchemaAdaptationError::new(
            path,
            format!("constraint `{}` cannot apply to a {} field", name, ty.kind()),
        )
    };

    match constraint {
        Constraint::MinLength(n) if is_string => Ok(("minLength", json!(n))),
        Constraint::MaxLength(n) if is_string => Ok(("maxLength", json!(n))),
        Constraint::Pattern(p) if is_string => Ok(("pattern", json!(p))),
        Constraint::Minimum(n) if is_numeric => Ok(("minimum", json!(n))),
        Constraint::Maximum(n) if is_numeric => Ok(("maximum", json!(n))),
        Constraint::MinLength(_) => Err(mismatch("minLength")),
        Constraint::MaxLength(_) => Err(mismatch("maxLength")),
        Constraint::Pattern(_) => Err(mismatch("pattern")),
        Constraint::Minimum(_) => Err(mismatch("minimum")),
        Constraint::Maximum(_) => Err(mismatch("maximum")),
        Constraint::Custom(name) => Err(SchemaAdaptationError::new(
            path,
            format!("custom constraint `{}` has no schema equivalent", name),
        )),
    }
}
