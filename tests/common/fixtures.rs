//! Corpus rows and vectors shared by the integration tests.

use factmatch::CorpusEntry;

/// Embedding dimension used by every fixture vector.
pub const DIM: usize = 3;

pub const HAWAII_RUMOR: &str = "夏威夷州長宣布台灣人免簽入境";
pub const VACCINE_RUMOR: &str = "疫苗含有追蹤晶片";
pub const SALT_RUMOR: &str = "喝鹽水可以預防新冠肺炎";

/// Unit vector whose cosine against `[1, 0, 0]` is `s`. Orthogonal to the other rumors.
pub fn at(s: f32) -> Vec<f32> {
    vec![s, 0.0, (1.0 - s * s).sqrt()]
}

pub fn entry(content: &str, title: &str) -> CorpusEntry {
    CorpusEntry {
        content: content.to_string(),
        title: title.to_string(),
        tag: "錯誤".to_string(),
        link: format!("https://tfc-taiwan.org.tw/articles/{}", title.len()),
        summary: format!("{} 查核結果", title),
        source: "tfc".to_string(),
    }
}

/// Three rumors pointing in clearly separated directions. The third axis is left free.
pub fn rumor_rows() -> Vec<(CorpusEntry, Vec<f32>)> {
    vec![
        (entry(HAWAII_RUMOR, "夏威夷免簽謠言"), vec![1.0, 0.0, 0.0]),
        (entry(VACCINE_RUMOR, "疫苗晶片謠言"), vec![0.0, 1.0, 0.0]),
        (entry(SALT_RUMOR, "鹽水防疫謠言"), vec![-1.0, 0.0, 0.0]),
    ]
}
