//! The table engine

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::Column;
use super::Direction;
use super::FilterState;
use super::FilterValue;
use super::SortState;

/// Rows plus column definitions plus filter, sort and visibility state.
///
/// The engine never mutates rows: [`visible_rows`](Self::visible_rows) is a
/// projection recomputed on every call. Filters combine with AND; sorting is
/// stable, so rows that tie on every key keep their original order.
///
/// # Example
///
/// ```
/// use nodes_admin_lib::table::{Column, DataTable, Direction, FilterKind, FilterValue};
///
/// let columns = vec![
///     Column::new("name", "Name", |r: &(String, bool)| r.0.as_str().into()).filter(FilterKind::Text),
///     Column::new("admin", "Admin", |r: &(String, bool)| r.1.into()).filter(FilterKind::Facet),
/// ];
/// let rows = vec![("ada".to_string(), true), ("bob".to_string(), false), ("cy".to_string(), true)];
/// let mut table = DataTable::new(columns, rows);
///
/// table.set_filter("admin", FilterValue::facets(["true"]));
/// table.set_sort("name", Direction::Desc);
/// let names: Vec<&str> = table.visible_rows().iter().map(|r| r.0.as_str()).collect();
/// assert_eq!(names, ["cy", "ada"]);
/// ```
#[derive(Debug, Clone)]
pub struct DataTable<R> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    filters: FilterState,
    sort: SortState,
}

impl<R> DataTable<R> {
    /// Creates a table with no filters and no sort.
    pub fn new(columns: Vec<Column<R>>, rows: Vec<R>) -> Self {
        Self {
            columns,
            rows,
            filters: FilterState::new(),
            sort: SortState::new(),
        }
    }

    /// All rows in their original order.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// All column definitions.
    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    /// Looks up a column by id.
    pub fn column(&self, id: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.id() == id)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Replaces the rows and resets filter and sort state.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.filters.clear();
        self.sort.clear();
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Sets the filter of a column, replacing any previous one.
    ///
    /// An empty value clears the filter. Returns `false` (and changes
    /// nothing) if the column does not exist.
    pub fn set_filter(&mut self, column_id: &str, value: FilterValue) -> bool {
        if self.column(column_id).is_none() {
            log::trace!("set_filter: unknown column '{}'", column_id);
            return false;
        }
        if value.is_empty() {
            self.filters.remove(column_id);
        } else {
            self.filters.insert(column_id.to_string(), value);
        }
        true
    }

    /// Removes the filter of a column. Returns `true` if one was set.
    pub fn clear_filter(&mut self, column_id: &str) -> bool {
        self.filters.remove(column_id).is_some()
    }

    /// Removes every filter.
    pub fn reset_filters(&mut self) {
        self.filters.clear();
    }

    /// Returns `true` if any filter is active.
    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    fn passes(&self, row: &R, skip: Option<&str>) -> bool {
        self.filters.iter().all(|(id, value)| {
            if skip == Some(id.as_str()) {
                return true;
            }
            match self.column(id) {
                Some(column) => value.matches(&column.value(row)),
                None => true,
            }
        })
    }

    /// Counts rows per display value of a column.
    ///
    /// Only rows passing every other column's filter are counted, so the
    /// counts show what selecting each value would yield.
    pub fn facet_counts(&self, column_id: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        let Some(column) = self.column(column_id) else {
            return counts;
        };
        for row in self.rows.iter().filter(|row| self.passes(row, Some(column_id))) {
            *counts.entry(column.value(row).display()).or_insert(0) += 1;
        }
        counts
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Sorts by a column.
    ///
    /// Replaces the direction in place if the column is already a sort key,
    /// otherwise appends it as the lowest-priority key. Returns `false` for
    /// unknown or unsortable columns.
    pub fn set_sort(&mut self, column_id: &str, direction: Direction) -> bool {
        if !self.column(column_id).is_some_and(Column::is_sortable) {
            log::trace!("set_sort: column '{}' is not sortable", column_id);
            return false;
        }
        match self.sort.iter_mut().find(|(id, _)| id == column_id) {
            Some(entry) => entry.1 = direction,
            None => self.sort.push((column_id.to_string(), direction)),
        }
        true
    }

    /// Removes every sort key.
    pub fn reset_sort(&mut self) {
        self.sort.clear();
    }

    /// Cycles a column through unsorted, ascending, descending, unsorted.
    ///
    /// Returns the new direction, `None` once the key is removed.
    pub fn toggle_sort(&mut self, column_id: &str) -> Option<Direction> {
        let current = self
            .sort
            .iter()
            .position(|(id, _)| id == column_id);
        match current {
            None => self
                .set_sort(column_id, Direction::Asc)
                .then_some(Direction::Asc),
            Some(pos) if self.sort[pos].1 == Direction::Asc => {
                self.sort[pos].1 = Direction::Desc;
                Some(Direction::Desc)
            }
            Some(pos) => {
                self.sort.remove(pos);
                None
            }
        }
    }

    fn compare(&self, a: &R, b: &R) -> Ordering {
        for (id, direction) in &self.sort {
            let Some(column) = self.column(id) else {
                continue;
            };
            let ord = column.compare(a, b);
            let ord = match direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Indices into [`rows`](Self::rows) of the visible rows, in display order.
    pub fn visible_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&i| self.passes(&self.rows[i], None))
            .collect();
        if !self.sort.is_empty() {
            indices.sort_by(|&a, &b| self.compare(&self.rows[a], &self.rows[b]));
        }
        indices
    }

    /// Rows passing every filter, sorted by the sort state.
    pub fn visible_rows(&self) -> Vec<&R> {
        self.visible_indices()
            .into_iter()
            .map(|i| &self.rows[i])
            .collect()
    }

    // =========================================================================
    // Column visibility
    // =========================================================================

    /// Shows or hides a column. Hiding an unhideable column is ignored.
    ///
    /// Returns `true` if the visibility changed.
    pub fn set_column_visibility(&mut self, column_id: &str, visible: bool) -> bool {
        let Some(column) = self.columns.iter_mut().find(|c| c.id() == column_id) else {
            return false;
        };
        if !visible && !column.is_hideable() {
            return false;
        }
        let changed = column.is_visible() != visible;
        column.set_visible(visible);
        changed
    }

    /// Flips a column's visibility. Returns the resulting visibility.
    pub fn toggle_column_visibility(&mut self, column_id: &str) -> Option<bool> {
        let visible = self.column(column_id)?.is_visible();
        self.set_column_visibility(column_id, !visible);
        self.column(column_id).map(Column::is_visible)
    }

    /// Visible columns in definition order.
    pub fn visible_columns(&self) -> Vec<&Column<R>> {
        self.columns.iter().filter(|c| c.is_visible()).collect()
    }
}
