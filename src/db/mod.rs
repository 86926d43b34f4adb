pub mod repository;
pub mod schema;

pub use repository::{InsertOutcome, Repository};
