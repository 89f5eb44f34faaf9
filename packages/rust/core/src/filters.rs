//! Named template filters.

use infojunkie_html::TableStripper;
use infojunkie_shared::ChangelogConfig;

/// Name the changelog-table filter is registered under.
pub const UNCHANGELOGIFY: &str = "unchangelogify";

/// A pure string → string transform applied by name from templates.
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, input: &str) -> String;
}

/// Removes changelog tables from an HTML fragment.
#[derive(Debug, Clone, Default)]
pub struct UnchangelogifyFilter {
    stripper: TableStripper,
}

impl UnchangelogifyFilter {
    pub fn new(marker_class: impl Into<String>) -> Self {
        Self {
            stripper: TableStripper::new(marker_class),
        }
    }
}

impl From<&ChangelogConfig> for UnchangelogifyFilter {
    fn from(config: &ChangelogConfig) -> Self {
        Self::new(config.marker_class.as_str())
    }
}

impl Filter for UnchangelogifyFilter {
    fn name(&self) -> &str {
        UNCHANGELOGIFY
    }

    fn apply(&self, input: &str) -> String {
        self.stripper.apply(input)
    }
}
