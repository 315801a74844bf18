//! Document versions and their storage addresses
//!
//! A [`DocumentVersion`] is an immutable snapshot of a document's pages.
//! Mutation operations never edit a version in place; they populate a fresh
//! shell obtained from [`DocumentVersion::bump`] or built by the caller.

mod path;
mod types;

pub use path::{DocumentPath, PagePath};
pub use types::{DocumentVersion, Page};
