//! Keyword scanning over flat collections of strings
//!
//! Every scanner in the report has the same shape: walk a list of items, keep
//! the ones a [`Matcher`] selects, and return them deduplicated and sorted.

use crate::config::ScanConfig;
use std::collections::BTreeSet;

/// Literal that every schema hint must contain (compared lower-cased)
pub const CREATE_TABLE: &str = "create table";

/// Decides whether an item is reported, and in which form
pub trait Matcher {
    /// Return the text to collect for `item`, or `None` to skip it
    fn select<'a>(&self, item: &'a str) -> Option<&'a str>;
}

/// Case-insensitive substring matcher over a fixed keyword list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Build a set; keywords are lower-cased and empty entries dropped
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Lower-cased keywords in declaration order
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// True when no keyword survived normalization
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// True if any keyword occurs in `text`, ignoring case
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.matches_lowered(&lowered)
    }

    fn matches_lowered(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

impl Matcher for KeywordSet {
    fn select<'a>(&self, item: &'a str) -> Option<&'a str> {
        self.matches(item).then_some(item)
    }
}

/// Two-predicate matcher for SQL schema fragments
///
/// A string qualifies when its trimmed, lower-cased text contains
/// `create table` and at least one of the correlated keywords. The trimmed
/// text is what gets collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMatcher {
    correlated: KeywordSet,
}

impl SchemaMatcher {
    /// Require `create table` plus one of `correlated`
    pub fn new(correlated: KeywordSet) -> Self {
        Self { correlated }
    }
}

impl Matcher for SchemaMatcher {
    fn select<'a>(&self, item: &'a str) -> Option<&'a str> {
        let trimmed = item.trim();
        let lowered = trimmed.to_lowercase();
        (lowered.contains(CREATE_TABLE) && self.correlated.matches_lowered(&lowered))
            .then_some(trimmed)
    }
}

/// Collect every item selected by `matcher` into a sorted, deduplicated set
pub fn scan_matching<'a, I, M>(items: I, matcher: &M) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
    M: Matcher + ?Sized,
{
    items
        .into_iter()
        .filter_map(|item| matcher.select(item))
        .map(str::to_string)
        .collect()
}

/// The three matchers used by the report, built from configuration
#[derive(Debug, Clone)]
pub struct Scanners {
    /// Class descriptor hints
    pub classes: KeywordSet,
    /// String constant hints
    pub strings: KeywordSet,
    /// SQL schema hints
    pub schema: SchemaMatcher,
}

impl Scanners {
    /// Build all three matchers from the `[scan]` table
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            classes: KeywordSet::new(&config.class_hints),
            strings: KeywordSet::new(&config.string_hints),
            schema: SchemaMatcher::new(KeywordSet::new(&config.schema_hints)),
        }
    }
}

impl Default for Scanners {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}
