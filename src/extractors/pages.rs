// src/extractors/pages.rs
//! Correlates text anchors with page indices so that layout loading can be
//! limited to the pages that hold the charges table and the bail entry.

use crate::extractors::grammar::{BAIL_PAGE_ANCHOR, CHARGES_PAGE_ANCHOR};
use serde::Serialize;
use std::collections::BTreeSet;

/// Zero-based page indices, iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageSet(BTreeSet<usize>);

impl PageSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &PageSet) -> PageSet {
        PageSet(self.0.union(&other.0).copied().collect())
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

impl FromIterator<usize> for PageSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        PageSet(iter.into_iter().collect())
    }
}

/// Pages whose raw text contains `anchor` literally. An empty set is not an error.
pub fn locate<S: AsRef<str>>(pages: &[S], anchor: &str) -> PageSet {
    pages
        .iter()
        .enumerate()
        .filter(|(_, text)| text.as_ref().contains(anchor))
        .map(|(index, _)| index)
        .collect()
}

/// Where the layout-only fields live. Built from page text before any layout
/// is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageAddress {
    pub charges: PageSet,
    pub bail: PageSet,
}

impl PageAddress {
    pub fn locate<S: AsRef<str>>(pages: &[S]) -> Self {
        let address = Self {
            charges: locate(pages, CHARGES_PAGE_ANCHOR),
            bail: locate(pages, BAIL_PAGE_ANCHOR),
        };
        tracing::debug!(
            "Charge pages {:?}, bail pages {:?}",
            address.charges.to_vec(),
            address.bail.to_vec()
        );
        address
    }

    /// Minimal page range to load for positional extraction.
    pub fn load_set(&self) -> PageSet {
        self.charges.union(&self.bail)
    }
}
