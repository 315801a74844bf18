//! Page artifact storage
//!
//! Recognition output (text, hOCR, preview images) is stored per page and
//! addressed by [`PagePath`](crate::version::PagePath). The engine needs only
//! one primitive from the storage layer: copy a page's artifacts from one
//! address to another.

mod local;
mod types;

pub use local::LocalPageStorage;
pub use types::{PageStorage, StorageError};
