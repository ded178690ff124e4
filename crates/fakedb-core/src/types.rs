use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Enumerated type declared in the schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnumType {
    pub name: String,
    /// Member names in declaration order.
    pub members: Vec<String>,
}
