//! Lowering options and the read-only environment.

use serde::{Deserialize, Serialize};
use tscs_common::limits::MAX_LOWERING_DEPTH;
use tscs_ir::ModuleMemberIndex;

/// Fully qualified name of the runtime tagged-union class family.
pub const DEFAULT_UNION_TYPE_NAME: &str = "global::Tscs.Runtime.Union";

/// Type given to catch parameters.
pub const DEFAULT_EXCEPTION_TYPE_NAME: &str = "global::System.Exception";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoweringOptions {
    /// Declare `for` counters initialised from an integer literal as `int`.
    pub int_loop_vars: bool,
    pub union_type_name: String,
    pub exception_type_name: String,
    /// Statement/expression nesting limit.
    pub max_depth: u32,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            int_loop_vars: true,
            union_type_name: DEFAULT_UNION_TYPE_NAME.to_string(),
            exception_type_name: DEFAULT_EXCEPTION_TYPE_NAME.to_string(),
            max_depth: MAX_LOWERING_DEPTH,
        }
    }
}

impl LoweringOptions {
    /// Parse options from a JSON object; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Everything the lowerer reads but never changes.
#[derive(Debug, Clone, Default)]
pub struct LoweringEnv {
    pub options: LoweringOptions,
    pub members: ModuleMemberIndex,
}

impl LoweringEnv {
    pub fn new(members: ModuleMemberIndex) -> Self {
        Self {
            options: LoweringOptions::default(),
            members,
        }
    }

    pub fn with_options(mut self, options: LoweringOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
#[path = "../tests/options.rs"]
mod tests;
