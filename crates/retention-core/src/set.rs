use std::collections::btree_map::{self, BTreeMap};

use serde::{Serialize, Serializer};

use crate::model::Release;

/// A set of releases deduplicated by release id.
///
/// Iteration is ordered by id so that results, reports and fingerprints are
/// stable regardless of the order in which scopes contributed releases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseSet {
    inner: BTreeMap<String, Release>,
}

impl ReleaseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a release. Returns `false` if a release with the same id was
    /// already present (the existing value is kept).
    pub fn insert(&mut self, release: Release) -> bool {
        match self.inner.entry(release.id.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(release);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Set union, consuming `other`.
    pub fn union(&mut self, other: ReleaseSet) {
        for (_, release) in other.inner {
            self.insert(release);
        }
    }

    pub fn contains(&self, release: &Release) -> bool {
        self.inner.contains_key(&release.id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.inner.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Release> {
        self.inner.get(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Release> {
        self.inner.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }
}

impl FromIterator<Release> for ReleaseSet {
    fn from_iter<I: IntoIterator<Item = Release>>(iter: I) -> Self {
        let mut set = ReleaseSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Release> for ReleaseSet {
    fn extend<I: IntoIterator<Item = Release>>(&mut self, iter: I) {
        for release in iter {
            self.insert(release);
        }
    }
}

impl IntoIterator for ReleaseSet {
    type Item = Release;
    type IntoIter = btree_map::IntoValues<String, Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_values()
    }
}

impl<'a> IntoIterator for &'a ReleaseSet {
    type Item = &'a Release;
    type IntoIter = btree_map::Values<'a, String, Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.values()
    }
}

impl Serialize for ReleaseSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.inner.values())
    }
}
