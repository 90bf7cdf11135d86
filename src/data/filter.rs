use std::collections::BTreeSet;

use super::model::{Key, KeyedDataset};

// ---------------------------------------------------------------------------
// FilterSet: row keys surviving the active cross-widget filter / selection
// ---------------------------------------------------------------------------

/// Set of row keys published by the selection bus.
pub type FilterSet = BTreeSet<Key>;

/// Collect anything key-like into a [`FilterSet`].
pub fn filter_set<K: Into<Key>>(keys: impl IntoIterator<Item = K>) -> FilterSet {
    keys.into_iter().map(Into::into).collect()
}

/// Return the rows of `dataset` whose key is in `keys`.
///
/// Keys absent from the dataset are ignored. Work is proportional to the size
/// of the filter set, and the result keeps the dataset's row order.
pub fn filter_by_keys(dataset: &KeyedDataset, keys: &FilterSet) -> KeyedDataset {
    let mut hits: Vec<(usize, &Key)> = keys
        .iter()
        .filter_map(|k| dataset.position(k).map(|pos| (pos, k)))
        .collect();
    hits.sort_unstable_by_key(|(pos, _)| *pos);

    hits.into_iter()
        .filter_map(|(_, k)| dataset.get(k).map(|v| (k.clone(), v.clone())))
        .collect()
}

// ---------------------------------------------------------------------------
// Crosstalk events
// ---------------------------------------------------------------------------

/// A change notification from the crosstalk bus.
///
/// Filters and selections differ in how an empty key set is read:
/// * `Filter(None)` → no filter active, use everything
/// * `Filter(Some(∅))` → every row filtered out
/// * `Selection(None)` / `Selection(Some(∅))` → nothing selected, use everything
#[derive(Debug, Clone, PartialEq)]
pub enum CrosstalkEvent {
    Filter(Option<FilterSet>),
    Selection(Option<FilterSet>),
}

impl CrosstalkEvent {
    /// The key set that narrows the data, or `None` when the full dataset
    /// applies.
    pub fn active_keys(&self) -> Option<&FilterSet> {
        match self {
            CrosstalkEvent::Filter(keys) => keys.as_ref(),
            CrosstalkEvent::Selection(keys) => keys.as_ref().filter(|k| !k.is_empty()),
        }
    }

    /// Narrow `dataset` according to this event.
    pub fn apply(&self, dataset: &KeyedDataset) -> KeyedDataset {
        match self.active_keys() {
            Some(keys) => filter_by_keys(dataset, keys),
            None => dataset.clone(),
        }
    }
}
