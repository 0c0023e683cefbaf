//! Storage for uploaded source files

mod clerk;

pub use clerk::{sanitize_filename, FileClerk, StoredFile};
