//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::op::EvaluationMode;
use crate::query::DEFAULT_PAGE_SIZE;

/// Storage key saved filters live under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "savedFilters";

/// Settings shared by every query an application runs.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// use gridline_query::{EngineConfig, EvaluationMode};
///
/// let config: EngineConfig = serde_json::from_str(r#"{"mode": "strict"}"#).unwrap();
/// assert_eq!(config.mode, EvaluationMode::Strict);
/// assert_eq!(config.default_page_size, 10);
/// assert_eq!(config.storage_key, "savedFilters");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How unknown operators are treated.
    pub mode: EvaluationMode,
    /// Page size for queries that do not set one.
    pub default_page_size: usize,
    /// Key saved filters are persisted under.
    pub storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            mode: EvaluationMode::Lenient,
            default_page_size: DEFAULT_PAGE_SIZE,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}
