//! Glyph names in the merged font

use std::{
    borrow::Borrow,
    fmt::{Display, Formatter, Result},
    ops::Deref,
};

/// A glyph name, possibly suffixed (`A.1`) to keep the merged `post` table unique
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlyphName(String);

impl GlyphName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `name.n`, the candidate tried for the n-th clash of `name`
    pub fn with_suffix(&self, n: usize) -> Self {
        Self(format!("{}.{n}", self.0))
    }
}

impl Deref for GlyphName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for GlyphName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlyphName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GlyphName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_glyph_name_suffix() {
        let name = GlyphName::new("A");
        assert_eq!(name.with_suffix(1), "A.1");
        assert_eq!(name.with_suffix(1).with_suffix(2), "A.1.2");
    }

    #[test]
    fn test_glyph_name_borrow_lookup() {
        let set: HashSet<GlyphName> = ["A", "B"].into_iter().map(GlyphName::from).collect();
        assert!(set.contains("A"));
        assert!(!set.contains("C"));
    }
}
