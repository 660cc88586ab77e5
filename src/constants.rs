//! Cross-cutting, shared constants.
//!
//! The thresholds and the freshness key layout are part of the contract with the
//! ingestion process that publishes corpus updates, so they live in one place.

/// Cosine similarity at or above which an entry is a match outright.
pub const PRIMARY_THRESHOLD: f32 = 0.8;

/// Cosine similarity the best entry must exceed before the lexical fallback is tried.
pub const SECONDARY_THRESHOLD: f32 = 0.6;

/// Logical name hashed into the freshness key; also the field holding the corpus timestamp.
pub const FRESHNESS_LOGICAL_NAME: &str = "intelligence_list";

/// Minute-resolution timestamp format shared with the ingestion process.
pub const UPDATE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Source tables unioned into the corpus when none are configured.
pub const DEFAULT_CORPUS_TABLES: &[&str] = &["sms_tfc", "sms_mgp"];

/// Output dimension of the stub embedder (matches common fastText releases).
pub const DEFAULT_STUB_DIM: usize = 300;

pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_EMBED_TIMEOUT_MS: u64 = 2_000;

pub const DEFAULT_RELOAD_BACKOFF_SECS: u64 = 30;

pub const DEFAULT_MEMO_CAPACITY: u64 = 10_000;

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
