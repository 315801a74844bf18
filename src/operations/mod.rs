//! Version mutation operations
//!
//! | Operation | Artifact | Recognition artifacts | Text |
//! |---|---|---|---|
//! | delete pages | survivors | copied | copied |
//! | insert pages, merges | three-pass insert | copied | copied |
//! | reorder | permuted | dropped | dropped |
//! | rotate | rotated | dropped | copied |

mod engine;
mod request;

pub use engine::PageMutationEngine;
pub use request::{annotate_rotations, Destination};
