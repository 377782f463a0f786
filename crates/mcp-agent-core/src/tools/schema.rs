//! Parameter schema extraction for tool handles
//!
//! Tools describe their parameters in one of three ways: a JSON schema map
//! held inline, a typed object that can render a JSON schema, or the raw
//! `inputSchema` an MCP server sent. `resolve_schema` probes them in that
//! order, once, when the tool is registered.

use std::marker::PhantomData;

use schemars::JsonSchema;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Error rendering a schema object
#[derive(Error, Debug)]
#[error("schema rendering failed: {0}")]
pub struct SchemaError(pub String);

/// Something that can render itself as a JSON schema
pub trait JsonSchemaObject: Send + Sync {
    fn json_schema(&self) -> Result<Value, SchemaError>;
}

/// Schema derived from a Rust type via `schemars`
pub struct TypedSchema<T>(PhantomData<fn() -> T>);

impl<T: JsonSchema> TypedSchema<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: JsonSchema> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: JsonSchema> JsonSchemaObject for TypedSchema<T> {
    fn json_schema(&self) -> Result<Value, SchemaError> {
        serde_json::to_value(schemars::schema_for!(T)).map_err(|e| SchemaError(e.to_string()))
    }
}

/// The three schema representations a tool may carry
///
/// All probes default to `None`; implementors override the one they have.
pub trait ToolSchemaSource {
    /// A JSON schema map held directly by the tool
    fn inline_schema(&self) -> Option<Map<String, Value>> {
        None
    }

    /// A schema object that renders on demand
    fn schema_object(&self) -> Option<&dyn JsonSchemaObject> {
        None
    }

    /// The raw input schema sent by a remote server
    fn input_schema(&self) -> Option<Value> {
        None
    }
}

/// Parameters as exported to callers and the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParameters {
    /// Full object schema bound to the model
    pub schema: Value,
    /// `properties` of the schema
    pub properties: Map<String, Value>,
    /// `required` of the schema
    pub required: Vec<String>,
}

fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

impl ResolvedParameters {
    fn empty() -> Self {
        Self {
            schema: empty_object_schema(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Split an object schema into properties and required names
    pub fn from_schema(schema: Value) -> Result<Self, SchemaError> {
        let obj = schema
            .as_object()
            .ok_or_else(|| SchemaError(format!("expected an object schema, got {}", schema)))?;

        let properties = match obj.get("properties") {
            None => Map::new(),
            Some(Value::Object(props)) => props.clone(),
            Some(other) => {
                return Err(SchemaError(format!("'properties' is not an object: {}", other)));
            }
        };

        let required = match obj.get("required") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(String::from)
                        .ok_or_else(|| SchemaError(format!("non-string required entry: {}", v)))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(SchemaError(format!("'required' is not an array: {}", other)));
            }
        };

        Ok(Self {
            schema,
            properties,
            required,
        })
    }
}

/// Pick the first schema the source offers
fn first_schema<S: ToolSchemaSource + ?Sized>(source: &S) -> Result<Option<Value>, SchemaError> {
    if let Some(inline) = source.inline_schema() {
        return Ok(Some(Value::Object(inline)));
    }
    if let Some(object) = source.schema_object() {
        return object.json_schema().map(Some);
    }
    Ok(source.input_schema().filter(|v| !v.is_null()))
}

/// Resolve a tool's parameters; errors are left to the caller to log
pub fn resolve_schema<S: ToolSchemaSource + ?Sized>(source: &S) -> Result<ResolvedParameters, SchemaError> {
    match first_schema(source)? {
        Some(schema) => ResolvedParameters::from_schema(schema),
        None => Ok(ResolvedParameters::empty()),
    }
}

/// Like `resolve_schema` but never fails: malformed schemas become empty
pub fn resolve_schema_or_empty<S: ToolSchemaSource + ?Sized>(
    source: &S,
    on_error: impl FnOnce(&SchemaError),
) -> ResolvedParameters {
    resolve_schema(source).unwrap_or_else(|e| {
        on_error(&e);
        ResolvedParameters::empty()
    })
}
