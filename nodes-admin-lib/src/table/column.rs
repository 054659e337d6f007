//! Column definitions

use std::cmp::Ordering;
use std::sync::Arc;

use super::CellValue;

type Accessor<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;
type Comparator<R> = Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

/// How a column can be filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Not filterable.
    #[default]
    None,
    /// Case-insensitive substring match on the display string.
    Text,
    /// Membership in a set of selected display strings.
    Facet,
}

/// Describes one column of a [`DataTable`](super::DataTable).
///
/// # Example
///
/// ```
/// use nodes_admin_lib::table::Column;
/// use nodes_admin_lib::table::FilterKind;
///
/// struct User { name: String, admin: bool }
///
/// let name = Column::new("name", "Name", |u: &User| u.name.as_str().into())
///     .filter(FilterKind::Text);
/// let role = Column::new("isAdmin", "Role", |u: &User| u.admin.into())
///     .filter(FilterKind::Facet)
///     .hideable(false);
/// assert_eq!(role.id(), "isAdmin");
/// ```
pub struct Column<R> {
    id: String,
    header: String,
    accessor: Accessor<R>,
    filter: FilterKind,
    comparator: Option<Comparator<R>>,
    sortable: bool,
    visible: bool,
    hideable: bool,
}

impl<R> Column<R> {
    /// Creates a sortable, visible, hideable column with no filter.
    pub fn new<F>(id: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            filter: FilterKind::None,
            comparator: None,
            sortable: true,
            visible: true,
            hideable: true,
        }
    }

    /// Sets the filter kind.
    pub fn filter(mut self, kind: FilterKind) -> Self {
        self.filter = kind;
        self
    }

    /// Sorts with a custom comparator instead of comparing cell values.
    pub fn comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&R, &R) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Sets whether the column can be sorted.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets initial visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets whether the column can be hidden.
    pub fn hideable(mut self, hideable: bool) -> Self {
        self.hideable = hideable;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn filter_kind(&self) -> FilterKind {
        self.filter
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_hideable(&self) -> bool {
        self.hideable
    }

    /// Derives the cell value for a row.
    pub fn value(&self, row: &R) -> CellValue {
        (self.accessor)(row)
    }

    /// Compares two rows by this column, ascending.
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        match &self.comparator {
            Some(cmp) => cmp(a, b),
            None => self.value(a).cmp(&self.value(b)),
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            filter: self.filter,
            comparator: self.comparator.clone(),
            sortable: self.sortable,
            visible: self.visible,
            hideable: self.hideable,
        }
    }
}

impl<R> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("filter", &self.filter)
            .field("sortable", &self.sortable)
            .field("visible", &self.visible)
            .field("hideable", &self.hideable)
            .finish_non_exhaustive()
    }
}
