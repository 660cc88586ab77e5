//! Corpus freshness signalling.
//!
//! The ingestion process writes a minute-resolution timestamp into a shared
//! key-value store whenever it updates the corpus. The cache compares that
//! value against the timestamp it loaded under to decide whether to reload.

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod redis;
mod signal;
mod store;
mod timestamp;


pub use error::{FreshnessError, FreshnessResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockFreshnessStore;
pub use self::redis::RedisFreshnessStore;
pub use signal::FreshnessSignal;
pub use store::FreshnessStore;
pub use timestamp::UpdateTimestamp;
