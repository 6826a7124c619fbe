//! Runtime options shared by the parser and the interpreter

/// Environment variable overriding [`Options::max_depth`]
pub const MAX_DEPTH_ENV: &str = "RECORDLINE_MAX_DEPTH";

/// Default nesting limit for records, arrays and optionals
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard upper bound on [`Options::max_depth`]. Parser and interpreter both
/// recurse once per level, so larger limits would exhaust the thread stack.
pub const MAX_DEPTH_CEILING: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Deepest record/value nesting accepted before the line is rejected
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Options {
    /// Set the nesting limit, clamped to [`MAX_DEPTH_CEILING`]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_CEILING);
        self
    }

    /// Defaults, with `RECORDLINE_MAX_DEPTH` applied when it holds a positive integer.
    pub fn from_env() -> Self {
        Self::default().apply_max_depth(std::env::var(MAX_DEPTH_ENV).ok().as_deref())
    }

    fn apply_max_depth(self, raw: Option<&str>) -> Self {
        match raw.and_then(|v| v.trim().parse::<usize>().ok()) {
            Some(depth) if depth > 0 => self.with_max_depth(depth),
            _ => self,
        }
    }
}
