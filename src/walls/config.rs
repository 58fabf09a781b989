//! Parser configuration.

/// Default limit on nested `#UNITS SAVE`s.
pub const DEFAULT_MAX_UNITS_STACK_DEPTH: usize = 10;

/// Configuration for a [`WallsParser`](super::WallsParser) session.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// How many `#UNITS SAVE`s may be outstanding at once.
    pub max_units_stack_depth: usize,
    /// Name reported in error locations (usually the file path).
    pub source_name: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_units_stack_depth: DEFAULT_MAX_UNITS_STACK_DEPTH,
            source_name: None,
        }
    }
}

impl ParserConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum `#UNITS SAVE` nesting depth.
    pub fn with_max_units_stack_depth(mut self, depth: usize) -> Self {
        self.max_units_stack_depth = depth;
        self
    }

    /// Set the source name used in error locations.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}
