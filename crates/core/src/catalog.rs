use std::collections::BTreeMap;

use log::warn;

use crate::model::{ShapeAsset, ShapeGroup};

/// Shape groups available to a session, keyed by shape name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeCatalog {
    groups: BTreeMap<String, ShapeGroup>,
}

impl ShapeCatalog {
    /// Group assets by the prefix before their first separator.
    ///
    /// Variants keep their input order within a group. An asset whose name
    /// has no usable prefix becomes its own group under its full name.
    pub fn build_groups(assets: impl IntoIterator<Item = ShapeAsset>) -> Self {
        let mut groups: BTreeMap<String, ShapeGroup> = BTreeMap::new();
        for asset in assets {
            let key = match asset.shape_prefix() {
                Some(prefix) => prefix.to_owned(),
                None => {
                    warn!(
                        "asset `{}` has no shape separator; treating it as its own shape",
                        asset.name()
                    );
                    asset.name().to_owned()
                }
            };
            groups
                .entry(key.clone())
                .or_insert_with(|| ShapeGroup::new(key))
                .push(asset);
        }
        Self { groups }
    }

    /// Convenience for building a catalog from plain asset names.
    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::build_groups(names.into_iter().map(|n| ShapeAsset::new(n.as_ref())))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ShapeGroup> {
        self.groups.get(name)
    }

    /// Shape names in catalog order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = &ShapeGroup> {
        self.groups.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of assets across all groups.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.groups.values().map(ShapeGroup::len).sum()
    }
}
