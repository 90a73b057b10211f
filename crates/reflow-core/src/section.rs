//! Wrappable sections.

use crate::document::Document;
use crate::rules::SelectorRule;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Number of `(scope, selector kind, scoring generation)` results remembered per section.
const MATCH_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(20).unwrap();

/// Scope, combining selector or not, and [`Document::selector_generation`].
type MatchKey = (String, bool, u64);

/// One kind of wrappable content, such as a block comment.
#[derive(Debug)]
pub struct Section {
    /// The section's own wrap width.
    pub wrap_width: Option<usize>,
    /// Line starts to try, in priority order. Never empty.
    pub allowed_line_starts: Vec<String>,
    /// Identifies the section's content.
    pub selector: SelectorRule,
    /// Identifies text that may be combined with the content, such as a comment's delimiter.
    pub combining_selector: Option<SelectorRule>,
    cache: Mutex<LruCache<MatchKey, bool>>,
}

impl Clone for Section {
    fn clone(&self) -> Self {
        Self::new(
            self.wrap_width,
            self.allowed_line_starts.clone(),
            self.selector.clone(),
            self.combining_selector.clone(),
        )
    }
}

impl Section {
    /// Create a section. An empty `allowed_line_starts` is replaced with `[""]`.
    pub fn new(
        wrap_width: Option<usize>,
        allowed_line_starts: Vec<String>,
        selector: SelectorRule,
        combining_selector: Option<SelectorRule>,
    ) -> Self {
        let allowed_line_starts = if allowed_line_starts.is_empty() {
            vec![String::new()]
        } else {
            allowed_line_starts
        };
        Self {
            wrap_width,
            allowed_line_starts,
            selector,
            combining_selector,
            cache: Mutex::new(LruCache::new(MATCH_CACHE_CAPACITY)),
        }
    }

    /// Returns `true` if `scope` is content of this section.
    pub fn matches_selector<D: Document + ?Sized>(&self, doc: &D, scope: &str) -> bool {
        self.matches_cached(doc, scope, false)
    }

    /// Returns `true` if `scope` may be combined with this section's content. Always `false`
    /// when the section has no combining selector.
    pub fn matches_combining_selector<D: Document + ?Sized>(&self, doc: &D, scope: &str) -> bool {
        self.combining_selector.is_some() && self.matches_cached(doc, scope, true)
    }

    fn matches_cached<D: Document + ?Sized>(&self, doc: &D, scope: &str, combining: bool) -> bool {
        let key = (scope.to_string(), combining, doc.selector_generation());
        if let Ok(mut cache) = self.cache.lock()
            && let Some(&hit) = cache.get(&key)
        {
            return hit;
        }

        let rule = if combining {
            self.combining_selector.as_ref()
        } else {
            Some(&self.selector)
        };
        let result = rule.is_some_and(|rule| rule.matches(doc, scope));
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, result);
        }
        result
    }
}
