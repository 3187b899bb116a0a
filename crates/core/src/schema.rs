// Declarative input schemas for actions

use serde_json::Value;

/// Value type of a single input field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    /// String restricted to the listed literals
    Enum(Vec<String>),
    Array(Box<FieldType>),
    Object(InputSchema),
    /// Any of several types
    Union(Vec<FieldType>),
    /// A base type narrowed by an arbitrary predicate (e.g. "valid base58 pubkey")
    Refined {
        base: Box<FieldType>,
        refinement: String,
    },
    /// Host-specific type with no portable description
    Custom(String),
}

impl FieldType {
    pub fn array_of(item: FieldType) -> Self {
        Self::Array(Box::new(item))
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn refined(base: FieldType, refinement: impl Into<String>) -> Self {
        Self::Refined {
            base: Box::new(base),
            refinement: refinement.into(),
        }
    }

    /// Short name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Enum(_) => "enum",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Union(_) => "union",
            Self::Refined { .. } => "refinement",
            Self::Custom(_) => "custom",
        }
    }
}

/// Constraint attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    MinLength(u64),
    MaxLength(u64),
    Minimum(f64),
    Maximum(f64),
    Pattern(String),
    Custom(String),
}

/// One named field of an input schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub optional: bool,
    pub description: Option<String>,
    pub constraints: Vec<Constraint>,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            description: None,
            constraints: Vec::new(),
        }
    }

    pub fn optional(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Ordered set of named input fields for an action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    pub fields: Vec<FieldSpec>,
}

impl InputSchema {
    /// Schema for actions that take no input.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check call arguments against this schema.
    ///
    /// Only presence and JSON types are checked. Constraints and refinements
    /// are left to the handler. `null` is accepted for schemas with no
    /// required fields.
    pub fn check(&self, arguments: &Value) -> Result<(), String> {
        match arguments {
            Value::Null if self.fields.iter().all(|f| f.optional) => Ok(()),
            Value::Object(_) => self.check_object(arguments, ""),
            other => Err(format!("expected an object, got {}", json_kind(other))),
        }
    }

    fn check_object(&self, value: &Value, prefix: &str) -> Result<(), String> {
        let Value::Object(map) = value else {
            return Err(format!("`{}` must be an object", prefix));
        };

        for field in &self.fields {
            let path = join_path(prefix, &field.name);
            match map.get(&field.name) {
                None | Some(Value::Null) if field.optional => {}
                None | Some(Value::Null) => {
                    return Err(format!("missing required field `{}`", path));
                }
                Some(value) => check_value(&field.ty, value, &path)?,
            }
        }

        Ok(())
    }
}

fn check_value(ty: &FieldType, value: &Value, path: &str) -> Result<(), String> {
    let ok = match ty {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Integer => value.is_i64() || value.is_u64(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Enum(values) => match value.as_str() {
            Some(s) if values.iter().any(|v| v == s) => true,
            Some(s) => {
                return Err(format!(
                    "`{}` must be one of [{}], got \"{}\"",
                    path,
                    values.join(", "),
                    s
                ))
            }
            None => false,
        },
        FieldType::Array(item) => match value.as_array() {
            Some(items) => {
                for (i, element) in items.iter().enumerate() {
                    check_value(item, element, &format!("{}[{}]", path, i))?;
                }
                true
            }
            None => false,
        },
        FieldType::Object(schema) => {
            if !value.is_object() {
                false
            } else {
                return schema.check_object(value, path);
            }
        }
        // Not representable on the wire, never advertised
        FieldType::Union(_) | FieldType::Refined { .. } | FieldType::Custom(_) => true,
    };

    if ok {
        Ok(())
    } else {
        Err(format!(
            "`{}` must be of type {}, got {}",
            path,
            ty.kind(),
            json_kind(value)
        ))
    }
}

/// Dotted path of `name` under `prefix`; empty prefix means top level.
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn swap_schema() -> InputSchema {
        InputSchema::empty()
            .field(
                FieldSpec::required("outputMint", FieldType::String).describe("Target token mint"),
            )
            .field(FieldSpec::required("inputAmount", FieldType::Number))
            .field(FieldSpec::optional("slippageBps", FieldType::Integer))
            .field(FieldSpec::optional(
                "route",
                FieldType::enumeration(["direct", "best"]),
            ))
    }

    #[test]
    fn test_empty_schema_accepts_null_and_empty_object() {
        let schema = InputSchema::empty();
        assert!(schema.is_empty());
        assert!(schema.check(&Value::Null).is_ok());
        assert!(schema.check(&json!({})).is_ok());
    }

    #[test]
    fn test_check_accepts_valid_arguments() {
        let args = json!({"outputMint": "So111", "inputAmount": 1.5, "route": "best"});
        assert!(swap_schema().check(&args).is_ok());
    }

    #[test]
    fn test_check_reports_missing_required() {
        let err = swap_schema().check(&json!({"outputMint": "So111"})).unwrap_err();
        assert!(err.contains("inputAmount"));
    }

    #[test]
    fn test_check_reports_type_mismatch() {
        let err = swap_schema()
            .check(&json!({"outputMint": "So111", "inputAmount": "lots"}))
            .unwrap_err();
        assert!(err.contains("inputAmount"));
        assert!(err.contains("number"));
    }

    #[test]
    fn test_check_rejects_unknown_enum_value() {
        let err = swap_schema()
            .check(&json!({"outputMint": "a", "inputAmount": 1, "route": "slow"}))
            .unwrap_err();
        assert!(err.contains("route"));
    }

    #[test]
    fn test_check_nested_paths() {
        let schema = InputSchema::empty().field(FieldSpec::required(
            "position",
            FieldType::Object(
                InputSchema::empty()
                    .field(FieldSpec::required("ticks", FieldType::array_of(FieldType::Integer))),
            ),
        ));

        assert!(schema.check(&json!({"position": {"ticks": [1, 2]}})).is_ok());
        let err = schema
            .check(&json!({"position": {"ticks": [1, "x"]}}))
            .unwrap_err();
        assert!(err.contains("position.ticks[1]"));
    }

    #[test]
    fn test_check_rejects_non_object_arguments() {
        assert!(swap_schema().check(&json!([1, 2])).is_err());
        assert!(swap_schema().check(&Value::Null).is_err());
    }
}
