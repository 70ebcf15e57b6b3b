//! Pure record transformations. Nothing here touches storage or logging.

pub mod dates;
pub mod flatten;
pub mod paths;
pub mod redundancy;
pub mod tabular;

pub use dates::{format_date, format_dates, DEFAULT_DATE_FORMAT};
pub use flatten::{flatten, flatten_record, DEFAULT_KEY_SEPARATOR};
pub use paths::{derived_output_path, tabular_path};
pub use redundancy::{deep_equal, eliminate, Elimination};
pub use tabular::{serialize, union_keys};
