//! Corpus entries, snapshots, and the stores they are read from.

mod entry;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod mysql;
mod snapshot;
mod store;


pub use entry::CorpusEntry;
pub use error::{CorpusError, CorpusResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockCorpusStore;
pub use mysql::{MySqlCorpusStore, build_union_query, is_valid_table_name};
pub use snapshot::{CorpusSnapshot, IndexedEntry};
pub use store::CorpusStore;
