// File: crates/curve-core/src/store.rs
// Summary: Authoritative series collection (plus the active selection); every mutation passes here.

use std::collections::BTreeMap;

use log::warn;

use crate::grid;
use crate::selection::{Selection, TimeRange};
use crate::series::{Sample, Series};

/// Deep copy of series data keyed by id.
pub type Snapshot = BTreeMap<String, Vec<Sample>>;

/// Bring `data` onto the canonical grid. Returns the data and whether a repair happened.
pub fn normalize_data(data: Vec<Sample>) -> (Vec<Sample>, bool) {
    if grid::is_on_grid(&data) {
        (data, false)
    } else {
        (grid::regrid(&data), true)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SeriesStore {
    series: Vec<Series>,
    selection: Selection,
}

impl SeriesStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.series.len() }

    pub fn is_empty(&self) -> bool { self.series.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Series> { self.series.iter() }

    pub fn ids(&self) -> Vec<String> { self.series.iter().map(|s| s.id.clone()).collect() }

    pub fn find(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool { self.find(id).is_some() }

    fn position(&self, id: &str) -> Option<usize> {
        self.series.iter().position(|s| s.id == id)
    }

    /// Insert or overwrite by id; data is brought onto the grid first.
    /// Returns true when the data needed repair.
    pub fn add(&mut self, mut series: Series) -> bool {
        let (data, repaired) = normalize_data(std::mem::take(&mut series.data));
        if repaired {
            warn!("series '{}' was not on the sample grid; regridded to 1440 points", series.id);
        }
        series.data = data;
        match self.position(&series.id) {
            Some(i) => self.series[i] = series,
            None => self.series.push(series),
        }
        repaired
    }

    /// Replace the data of an existing series. `None` when the id is unknown,
    /// otherwise whether the data needed repair.
    pub fn replace_data(&mut self, id: &str, data: Vec<Sample>) -> Option<bool> {
        let i = self.position(id)?;
        let (data, repaired) = normalize_data(data);
        if repaired {
            warn!("edit left series '{}' off the sample grid; regridded", id);
        }
        self.series[i].data = data;
        Some(repaired)
    }

    /// Remove a series and drop it from the selection.
    pub fn delete(&mut self, id: &str) -> Option<Series> {
        let i = self.position(id)?;
        self.selection.forget(id);
        Some(self.series.remove(i))
    }

    /// Deep copy of the data of every known id in `ids`.
    pub fn snapshot<S: AsRef<str>>(&self, ids: &[S]) -> Snapshot {
        ids.iter()
            .filter_map(|id| self.find(id.as_ref()).map(|s| (s.id.clone(), s.data.clone())))
            .collect()
    }

    /// Write snapshot data back (ids no longer present are skipped).
    pub fn restore(&mut self, snapshot: &Snapshot) {
        for (id, data) in snapshot {
            if self.replace_data(id, data.clone()).is_none() {
                warn!("cannot restore '{}': series no longer exists", id);
            }
        }
    }

    pub fn children_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a Series> + 'a {
        self.series.iter().filter(move |s| s.parent_id.as_deref() == Some(parent_id))
    }

    pub fn has_children(&self, id: &str) -> bool { self.children_of(id).next().is_some() }

    /// Elementwise sum of the children of `parent_id`, or `None` when it has none.
    pub fn children_sum(&self, parent_id: &str) -> Option<Vec<Sample>> {
        let mut sum: Option<Vec<Sample>> = None;
        for child in self.children_of(parent_id) {
            let data = grid::regrid(&child.data);
            match sum.as_mut() {
                None => sum = Some(data),
                Some(acc) => {
                    for (a, c) in acc.iter_mut().zip(data.iter()) {
                        a.value += c.value;
                    }
                }
            }
        }
        sum
    }

    /// Set the parent's data to the sum of its children. Returns false when the
    /// parent is unknown or childless.
    pub fn recompute_parent(&mut self, parent_id: &str) -> bool {
        if !self.contains(parent_id) { return false; }
        match self.children_sum(parent_id) {
            Some(sum) => self.replace_data(parent_id, sum).is_some(),
            None => false,
        }
    }

    pub fn selection(&self) -> &Selection { &self.selection }

    pub fn set_selection(&mut self, time_range: Option<TimeRange>, series_ids: Vec<String>) {
        self.selection.set(time_range, series_ids);
    }

    pub fn clear_selection(&mut self) { self.selection.clear(); }
}
