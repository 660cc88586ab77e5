use serde::{Deserialize, Serialize};

/// One fact-checked item from the corpus.
///
/// Identity is positional within a snapshot; two rows with equal fields are
/// indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// The claim text as circulated (what queries are compared against).
    pub content: String,
    pub title: String,
    /// Verdict label as published by the fact-checker (e.g. "false", "錯誤").
    pub tag: String,
    pub link: String,
    pub summary: String,
    /// Publishing fact-checker.
    pub source: String,
}

impl CorpusEntry {
    /// Text fed to the embedder: trimmed, with line breaks removed.
    pub fn embedding_text(&self) -> String {
        self.content.trim().replace(['\r', '\n'], "")
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.content,
            &self.title,
            &self.tag,
            &self.link,
            &self.summary,
            &self.source,
        ]
    }
}
