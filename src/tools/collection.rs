use indexmap::IndexMap;

use crate::tools::instance::ToolInstance;

/// Live tool instances in insertion order, which doubles as z-order.
#[derive(Debug, Default)]
pub struct ToolCollection {
    tools: IndexMap<String, ToolInstance>,
}

impl ToolCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces; a replaced tool keeps its z-order slot.
    pub fn insert(&mut self, tool: ToolInstance) -> Option<ToolInstance> {
        self.tools.insert(tool.id().to_owned(), tool)
    }

    /// Removes while preserving the order of the remaining tools.
    pub fn remove(&mut self, id: &str) -> Option<ToolInstance> {
        self.tools.shift_remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ToolInstance> {
        self.tools.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ToolInstance> {
        self.tools.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.tools.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ToolInstance> {
        self.tools.values()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut ToolInstance> {
        self.tools.values_mut()
    }

    /// Topmost (most recently attached) first, the order hit tests use.
    pub fn iter_topmost_first(&self) -> impl Iterator<Item = &ToolInstance> {
        self.tools.values().rev()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    #[must_use]
    pub fn ids_matching(&self, pattern: &str) -> Vec<String> {
        self.tools
            .keys()
            .filter(|id| id_matches_pattern(pattern, id))
            .cloned()
            .collect()
    }
}

/// Glob match where `*` spans any run of characters and `?` one character.
///
/// A pattern without wildcards matches ids containing it as a substring.
#[must_use]
pub fn id_matches_pattern(pattern: &str, id: &str) -> bool {
    if !pattern.contains(['*', '?']) {
        return id.contains(pattern);
    }
    let pattern: Vec<char> = pattern.chars().collect();
    let id: Vec<char> = id.chars().collect();
    let (mut p, mut i) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut star_match = 0usize;
    while i < id.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == id[i]) {
            p += 1;
            i += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            star_match = i;
            p += 1;
        } else if let Some(star_at) = star {
            p = star_at + 1;
            star_match += 1;
            i = star_match;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::id_matches_pattern;

    #[test]
    fn wildcard_patterns_match_whole_ids() {
        assert!(id_matches_pattern("fib-*", "fib-42"));
        assert!(id_matches_pattern("*-42", "fib-42"));
        assert!(id_matches_pattern("f?b-*", "fab-1"));
        assert!(!id_matches_pattern("fib-*", "trend-1"));
        assert!(!id_matches_pattern("fib-?", "fib-42"));
    }

    #[test]
    fn plain_patterns_match_substrings() {
        assert!(id_matches_pattern("session", "alerts-session-3"));
        assert!(!id_matches_pattern("session", "alerts-3"));
    }
}
