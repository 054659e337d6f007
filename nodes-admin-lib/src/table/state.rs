//! Filter and sort state

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use super::CellValue;

/// A filter applied to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Case-insensitive substring of the display string.
    Text(String),
    /// Display strings to keep. An empty set keeps everything.
    Facets(BTreeSet<String>),
}

impl FilterValue {
    /// Creates a text filter.
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    /// Creates a facet filter from selected values.
    pub fn facets<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::Facets(values.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if the filter restricts nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.is_empty(),
            FilterValue::Facets(set) => set.is_empty(),
        }
    }

    /// Returns `true` if the cell passes.
    pub fn matches(&self, cell: &CellValue) -> bool {
        match self {
            FilterValue::Text(text) => cell
                .display()
                .to_lowercase()
                .contains(&text.to_lowercase()),
            FilterValue::Facets(set) => set.is_empty() || set.contains(&cell.display()),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ascending (A-Z, 0-9).
    Asc,
    /// Descending (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

/// Active filters keyed by column id.
pub type FilterState = BTreeMap<String, FilterValue>;

/// Sort keys in priority order; the first entry is the primary key.
pub type SortState = Vec<(String, Direction)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let filter = FilterValue::text("ADA");
        assert!(filter.matches(&CellValue::from("Ada Lovelace")));
        assert!(!filter.matches(&CellValue::from("Grace")));
        assert!(!filter.matches(&CellValue::Null));
    }

    #[test]
    fn test_facet_filter() {
        let filter = FilterValue::facets(["true"]);
        assert!(filter.matches(&CellValue::from(true)));
        assert!(!filter.matches(&CellValue::from(false)));
        assert!(FilterValue::facets(Vec::<String>::new()).matches(&CellValue::from(false)));
    }
}
