pub const DEFAULT_MAX_EXPRESSION_LENGTH: usize = 4096;
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;
pub const DEFAULT_MAX_TREE_DEPTH: usize = 256;

/// Resource guards and caching for an [`Evaluator`](crate::Evaluator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Longest accepted input, in bytes.
    pub max_expression_length: usize,
    /// Deepest accepted parenthesis nesting, checked before parsing.
    pub max_nesting_depth: usize,
    /// Deepest expression tree the evaluator will walk.
    pub max_tree_depth: usize,
    /// Number of parsed expressions kept in the LRU cache. Zero disables caching.
    pub cache_size: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_expression_length: DEFAULT_MAX_EXPRESSION_LENGTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            cache_size: 0,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_max_expression_length(mut self, max: usize) -> Self {
        self.max_expression_length = max;
        self
    }

    pub fn with_max_nesting_depth(mut self, max: usize) -> Self {
        self.max_nesting_depth = max;
        self
    }

    pub fn with_max_tree_depth(mut self, max: usize) -> Self {
        self.max_tree_depth = max;
        self
    }

    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }
}
