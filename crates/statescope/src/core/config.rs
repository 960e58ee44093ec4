//! Configuration for state model construction

/// Default namespace separator for hierarchical identifiers
pub const DEFAULT_NAMESPACE_SEPARATOR: &str = ".";

/// Default prefix for generated concurrent region names
pub const DEFAULT_CONCURRENT_PREFIX: &str = "CONC";

/// Settings that control how a state model resolves identifiers
///
/// # Example
///
/// ```
/// use statescope::core::ModelConfig;
///
/// let config = ModelConfig::default().with_separator(Some("::"));
/// assert_eq!(config.separator(), Some("::"));
/// assert_eq!(config.concurrent_prefix(), "CONC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    separator: Option<String>,
    concurrent_prefix: String,
    hide_empty_description: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            separator: Some(DEFAULT_NAMESPACE_SEPARATOR.to_string()),
            concurrent_prefix: DEFAULT_CONCURRENT_PREFIX.to_string(),
            hide_empty_description: false,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the namespace separator; `None` makes every identifier a single segment
    pub fn with_separator(mut self, separator: Option<&str>) -> Self {
        self.separator = separator.filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    /// Set the prefix used when naming concurrent regions
    pub fn with_concurrent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.concurrent_prefix = prefix.into();
        self
    }

    pub fn with_hide_empty_description(mut self, hide: bool) -> Self {
        self.hide_empty_description = hide;
        self
    }

    pub fn set_hide_empty_description(&mut self, hide: bool) {
        self.hide_empty_description = hide;
    }

    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    pub fn concurrent_prefix(&self) -> &str {
        &self.concurrent_prefix
    }

    pub fn hide_empty_description(&self) -> bool {
        self.hide_empty_description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.separator(), Some("."));
        assert_eq!(config.concurrent_prefix(), "CONC");
        assert!(!config.hide_empty_description());
    }

    #[test]
    fn test_empty_separator_disables_hierarchy() {
        let config = ModelConfig::new().with_separator(Some(""));
        assert_eq!(config.separator(), None);
    }

    #[test]
    fn test_builder_methods() {
        let config = ModelConfig::new()
            .with_separator(None)
            .with_concurrent_prefix("REGION")
            .with_hide_empty_description(true);
        assert_eq!(config.separator(), None);
        assert_eq!(config.concurrent_prefix(), "REGION");
        assert!(config.hide_empty_description());
    }
}
