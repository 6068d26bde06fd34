use serde::{Deserialize, Serialize};

/// Tunables shared by every parser a factory loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Targets larger than this are rejected before parsing.
    pub max_target_bytes: u64,
    /// Per-parse budget handed to tree-sitter. 0 disables the limit.
    pub parse_timeout_micros: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_target_bytes: 8 * 1024 * 1024,
            parse_timeout_micros: 0,
        }
    }
}

impl ParserConfig {
    pub fn with_max_target_bytes(mut self, bytes: u64) -> Self {
        self.max_target_bytes = bytes;
        self
    }

    pub fn with_parse_timeout_micros(mut self, micros: u64) -> Self {
        self.parse_timeout_micros = micros;
        self
    }
}
