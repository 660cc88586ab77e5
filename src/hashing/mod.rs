//! Hashing helpers.
//!
//! Two hash families are in use:
//!
//! - **SHA-256** for the freshness key. The ingestion process computes the same
//!   digest independently, so this one is fixed by the wire contract.
//! - **BLAKE3** for everything internal (query memo keys, snapshot fingerprints).

use blake3::Hasher;
use sha2::{Digest, Sha256};

use crate::corpus::CorpusEntry;

/// Returns the lowercase hex SHA-256 digest of `name`.
///
/// The freshness store keys its hash by `sha256_hex("intelligence_list")`.
pub fn freshness_key(name: &str) -> String {
    format!("{:x}", Sha256::digest(name.as_bytes()))
}

#[inline]
pub fn hash_query(query: &str) -> [u8; 32] {
    *blake3::hash(query.as_bytes()).as_bytes()
}

/// Computes a content fingerprint over an ordered list of corpus entries.
///
/// Fields are length-prefixed so that moving bytes between adjacent fields
/// changes the digest. Order matters: the same rows in a different order yield a
/// different fingerprint, since snapshot order decides tie-breaks.
pub fn fingerprint_entries<'a, I>(entries: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a CorpusEntry>,
{
    let mut hasher = Hasher::new();
    for entry in entries {
        for field in entry.fields() {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
    }
    *hasher.finalize().as_bytes()
}

/// Formats the first 8 bytes of a digest as hex, for logs.
pub fn short_hex(digest: &[u8; 32]) -> String {
    blake3::Hash::from(*digest).to_hex()[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content: &str) -> CorpusEntry {
        CorpusEntry {
            content: content.to_string(),
            title: "title".to_string(),
            tag: "false".to_string(),
            link: "https://example.org/a".to_string(),
            summary: "summary".to_string(),
            source: "source".to_string(),
        }
    }

    #[test]
    fn test_freshness_key_is_sha256_hex() {
        // sha256("intelligence_list")
        let key = freshness_key("intelligence_list");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(key, freshness_key("intelligence_list"));
        assert_ne!(key, freshness_key("intelligence_list2"));
    }

    #[test]
    fn test_freshness_key_known_vector() {
        assert_eq!(
            freshness_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_query_deterministic() {
        assert_eq!(hash_query("hello"), hash_query("hello"));
        assert_ne!(hash_query("hello"), hash_query("hello "));
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let a = entry("a");
        let b = entry("b");
        let ab = fingerprint_entries([&a, &b]);
        let ba = fingerprint_entries([&b, &a]);
        assert_ne!(ab, ba);
        assert_eq!(ab, fingerprint_entries([&a, &b]));
    }

    #[test]
    fn test_fingerprint_field_boundaries() {
        let mut x = entry("ab");
        x.title = "c".to_string();
        let mut y = entry("a");
        y.title = "bc".to_string();
        assert_ne!(fingerprint_entries([&x]), fingerprint_entries([&y]));
    }

    #[test]
    fn test_short_hex() {
        let digest = [0xabu8; 32];
        assert_eq!(short_hex(&digest), "abababababababab");
    }
}
