//! Text filters applied by the top-level list queries

/// Case-insensitive substring predicate
///
/// An absent or empty needle matches everything, so `users(query: "")`
/// behaves like `users`.
#[derive(Debug, Clone, Default)]
pub struct TextFilter {
    needle: Option<String>,
}

impl TextFilter {
    pub fn new(query: Option<&str>) -> Self {
        Self {
            needle: query.filter(|q| !q.is_empty()).map(str::to_lowercase),
        }
    }

    /// Whether this filter lets every record through
    pub fn is_empty(&self) -> bool {
        self.needle.is_none()
    }

    pub fn matches(&self, haystack: &str) -> bool {
        match &self.needle {
            Some(needle) => haystack.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    /// True if any of the given fields contains the needle
    pub fn matches_any(&self, haystacks: &[&str]) -> bool {
        self.is_empty() || haystacks.iter().any(|h| self.matches(h))
    }

    /// Keep the items whose extracted fields match, preserving order
    pub fn apply<T, F>(&self, items: Vec<T>, fields: F) -> Vec<T>
    where
        F: Fn(&T) -> Vec<&str>,
    {
        if self.is_empty() {
            return items;
        }
        items
            .into_iter()
            .filter(|item| self.matches_any(&fields(item)))
            .collect()
    }
}
