//! Content filtering for character names and speech.

use std::collections::HashSet;
use std::sync::Arc;

/// Decides whether player-supplied text is acceptable.
///
/// Consulted for registration names and for everything said aloud. Sync
/// and object-safe so the realm can hold one as `Box<dyn ContentFilter>`.
pub trait ContentFilter: Send + Sync + 'static {
    /// `true` if `text` must be refused.
    fn is_disallowed(&self, text: &str) -> bool;
}

/// A shared filter, so the connection handlers and the realm can consult
/// the same word list.
impl<F: ContentFilter + ?Sized> ContentFilter for Arc<F> {
    fn is_disallowed(&self, text: &str) -> bool {
        (**self).is_disallowed(text)
    }
}

/// Refuses text containing any listed word.
///
/// Matching is case-insensitive and whole-word: with `"darn"` listed,
/// "Darn it!" is refused but "darning" is fine. An empty list allows
/// everything.
#[derive(Debug, Clone, Default)]
pub struct WordListFilter {
    words: HashSet<String>,
}

impl WordListFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }
}

impl ContentFilter for WordListFilter {
    fn is_disallowed(&self, text: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .any(|w| self.words.contains(&w.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_disallowed_whole_word_case_insensitive() {
        let filter = WordListFilter::new(["darn"]);
        assert!(filter.is_disallowed("Darn it!"));
        assert!(filter.is_disallowed("well...DARN"));
        assert!(!filter.is_disallowed("I was darning socks"));
    }

    #[test]
    fn test_is_disallowed_empty_list_allows_everything() {
        let filter = WordListFilter::default();
        assert!(!filter.is_disallowed("anything at all"));
    }

    #[test]
    fn test_is_disallowed_through_arc_shares_word_list() {
        let shared: Arc<dyn ContentFilter> =
            Arc::new(WordListFilter::new(["blast"]));
        let realm_copy = Arc::clone(&shared);
        assert!(realm_copy.is_disallowed("Blast!"));
        assert!(!shared.is_disallowed("hello"));
    }
}
