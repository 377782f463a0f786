//! Tool discovery, registration and execution
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │                                             │
//! │  - One group per MCP server (or source)     │
//! │  - Sanitized, unique names (NameSanitizer)  │
//! │  - Schemas resolved once at registration    │
//! │  - Tool definitions for the model           │
//! │  - describe() export for callers            │
//! └─────────────────────────────────────────────┘
//!           │ lookup(name)
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  ToolExecutor                               │
//! │                                             │
//! │  - Argument normalization                   │
//! │  - Per-call timeout, panic containment      │
//! │  - ToolOutcome for events and transcript    │
//! └─────────────────────────────────────────────┘
//!           │ ToolHandle::invoke
//!           ▼
//!     McpToolHandle (rmcp)  /  FunctionTool (in-process)
//! ```

mod sanitize;
mod schema;
mod handle;
mod registry;
mod executor;

pub use sanitize::{NameSanitizer, FALLBACK_NAME};
pub use schema::{
    resolve_schema, resolve_schema_or_empty, JsonSchemaObject, ResolvedParameters, SchemaError,
    ToolSchemaSource, TypedSchema,
};
pub use handle::{FunctionTool, InvocationContext, McpToolHandle, ToolError, ToolHandle};
pub use registry::{ServerToolsInfo, ToolDescriptor, ToolRegistry, ToolSummary, ToolsInfo};
pub use executor::{normalize_arguments, ToolExecutor, ToolOutcome, RAW_ARGS_KEY};
