use std::fmt;

use serde::{Deserialize, Serialize};

/// Character that splits an asset name into `<shape>_<orientation>`.
pub const SHAPE_NAME_SEPARATOR: char = '_';

//
// ─── SHAPE ASSET ───────────────────────────────────────────────────────────────
//

/// One orientation image of a puzzle shape.
///
/// Identity is the full asset name: two assets are the same answer option
/// exactly when their names match.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeAsset {
    name: String,
}

impl ShapeAsset {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Full asset identifier, e.g. `"L3_090"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape identity prefix (text before the first separator).
    ///
    /// Returns `None` when the name has no separator or the prefix is empty.
    #[must_use]
    pub fn shape_prefix(&self) -> Option<&str> {
        self.name
            .split_once(SHAPE_NAME_SEPARATOR)
            .map(|(prefix, _)| prefix)
            .filter(|prefix| !prefix.is_empty())
    }

    /// Orientation suffix, if the name carries one.
    #[must_use]
    pub fn orientation(&self) -> Option<&str> {
        self.shape_prefix()?;
        self.name
            .split_once(SHAPE_NAME_SEPARATOR)
            .map(|(_, suffix)| suffix)
    }
}

impl fmt::Debug for ShapeAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeAsset({})", self.name)
    }
}

impl fmt::Display for ShapeAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for ShapeAsset {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

//
// ─── SHAPE GROUP ───────────────────────────────────────────────────────────────
//

/// All orientation variants that share one shape identity.
///
/// Variants keep the order in which they were discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeGroup {
    name: String,
    variants: Vec<ShapeAsset>,
}

impl ShapeGroup {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, asset: ShapeAsset) {
        self.variants.push(asset);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn variants(&self) -> &[ShapeAsset] {
        &self.variants
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Number of variants with distinct identities.
    #[must_use]
    pub fn distinct_variants(&self) -> usize {
        let mut seen: Vec<&str> = Vec::with_capacity(self.variants.len());
        for variant in &self.variants {
            if !seen.contains(&variant.name()) {
                seen.push(variant.name());
            }
        }
        seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_text_before_first_separator() {
        let asset = ShapeAsset::new("L3_090_b");
        assert_eq!(asset.shape_prefix(), Some("L3"));
        assert_eq!(asset.orientation(), Some("090_b"));
    }

    #[test]
    fn names_without_separator_have_no_prefix() {
        assert_eq!(ShapeAsset::new("lonely").shape_prefix(), None);
        assert_eq!(ShapeAsset::new("_090").shape_prefix(), None);
        assert_eq!(ShapeAsset::new("lonely").orientation(), None);
    }

    #[test]
    fn duplicate_variants_are_counted_once() {
        let mut group = ShapeGroup::new("A");
        group.push(ShapeAsset::new("A_1"));
        group.push(ShapeAsset::new("A_1"));
        assert_eq!(group.len(), 2);
        assert_eq!(group.distinct_variants(), 1);
    }
}
