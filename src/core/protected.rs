use std::collections::BTreeSet;

/// Branch names that are never classified or deleted. The default branch is
/// always a member, whether or not it was listed explicitly. Immutable for
/// the duration of a sweep.
#[derive(Debug, Clone)]
pub struct ProtectedSet {
    default_branch: String,
    names: BTreeSet<String>,
}

impl ProtectedSet {
    /// Build from a space-separated list, unioned with the default branch.
    pub fn new(default_branch: impl Into<String>, protected_branches: &str) -> Self {
        let default_branch = default_branch.into();
        let mut names: BTreeSet<String> = protected_branches
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        names.insert(default_branch.clone());

        Self {
            default_branch,
            names,
        }
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Space-separated rendering for reports and logs.
    pub fn to_display_string(&self) -> String {
        self.names
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
