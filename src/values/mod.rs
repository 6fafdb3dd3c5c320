//! Self-validating identity values.

pub mod email;
pub mod id;
pub mod ordering;
pub mod pagination;
pub mod password;
pub mod timestamp;
pub mod validation;

pub use email::Email;
pub use id::Id;
pub use ordering::{Sort, SortDirection, Sorts};
pub use pagination::Pagination;
pub use password::Password;
pub use timestamp::{Timestamp, TimestampError};
pub use validation::{ValidationError, ValidationErrors};
