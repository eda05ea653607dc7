//! Filter and sort partitions, and the snapshot a fetch reads from them.

use std::collections::BTreeSet;

use shared::domain::{ItemTypeFilter, SortOrder};

use crate::collection::CollectionState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedFilters {
    pub tags: BTreeSet<String>,
    pub brands: BTreeSet<String>,
}

/// Filter partition. Only the selection is read by the collection fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub selected: SelectedFilters,
}

impl FilterState {
    /// Flips membership of `tag`; returns whether it is selected afterwards.
    pub fn toggle_tag(&mut self, tag: impl Into<String>) -> bool {
        toggle(&mut self.selected.tags, tag.into())
    }

    pub fn toggle_brand(&mut self, brand: impl Into<String>) -> bool {
        toggle(&mut self.selected.brands, brand.into())
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.tags = tags.into_iter().map(Into::into).collect();
    }

    pub fn set_brands<I, S>(&mut self, brands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.brands = brands.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.selected = SelectedFilters::default();
    }
}

fn toggle(set: &mut BTreeSet<String>, value: String) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub sort_type: SortOrder,
}

/// Criteria for one fetch, read from the partitions before the request leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaSnapshot {
    pub page: u32,
    pub sort_value: SortOrder,
    pub filter_type: ItemTypeFilter,
    pub tags: BTreeSet<String>,
    pub brands: BTreeSet<String>,
}

impl CriteriaSnapshot {
    pub fn capture(
        filter: &FilterState,
        sort: &SortState,
        products: &CollectionState,
        filter_type: ItemTypeFilter,
    ) -> Self {
        Self {
            page: products.page,
            sort_value: sort.sort_type,
            filter_type,
            tags: filter.selected.tags.clone(),
            brands: filter.selected.brands.clone(),
        }
    }
}
