//! Journal entries: the single persisted record type.

mod model;
mod repository;

pub use model::{Entry, EntryInput, EntryValidationError};
pub use repository::EntryRepository;
