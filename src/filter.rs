/// Name prefixes of the mobile app projects that share one language set
pub const DEFAULT_PREFIXES: [&str; 3] = ["ANDR", "APP-", "APP:"];

/// Selects projects by raw, case-sensitive name prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFilter {
    prefixes: Vec<String>,
}

impl ProjectFilter {
    /// Build a filter from prefixes, dropping empty entries
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Parse a comma separated prefix list (whitespace around entries is trimmed)
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Names shorter than a prefix simply don't match it
    pub fn matches(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIXES)
    }
}
