//! Data table engine
//!
//! A generic filter/sort/visibility engine over caller-supplied rows. Columns
//! derive a [`CellValue`] from each row; filters and sort keys refer to
//! columns by id.

mod column;
mod engine;
mod state;
mod value;

pub use column::Column;
pub use column::FilterKind;
pub use engine::DataTable;
pub use state::Direction;
pub use state::FilterState;
pub use state::FilterValue;
pub use state::SortState;
pub use value::CellValue;
