//! Wire types for `POST /fasttext`.
//!
//! Field names (including `Summery` and `Sourse`) are a stable contract with
//! downstream consumers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::MatchResult;

/// Upstream tracing context forwarded by the caller.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SentryContext {
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub span_id: Option<String>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct FactCheckRequest {
    pub query_id: Uuid,
    #[serde(default)]
    pub query_type: Option<String>,
    pub query_body: String,
    /// Caller's timestamp, passed through untouched.
    #[serde(default)]
    pub query_date_time: Option<String>,
    #[serde(default)]
    pub sentry: Option<SentryContext>,
}

/// The matched fact-check; every field is `null` when nothing matched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseBody {
    pub text: Option<String>,
    pub title: Option<String>,
    pub tag: Option<String>,
    pub link: Option<String>,
    pub summery: Option<String>,
    pub sourse: Option<String>,
    pub similarity: Option<f32>,
}

impl From<&MatchResult> for ResponseBody {
    fn from(result: &MatchResult) -> Self {
        match result {
            MatchResult::NoMatch => Self::default(),
            MatchResult::Matched {
                entry, similarity, ..
            } => Self {
                text: Some(entry.content.clone()),
                title: Some(entry.title.clone()),
                tag: Some(entry.tag.clone()),
                link: Some(entry.link.clone()),
                summery: Some(entry.summary.clone()),
                sourse: Some(entry.source.clone()),
                similarity: Some(*similarity),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FactCheckResponse {
    pub query_id: Uuid,
    pub response_id: Uuid,
    pub response_message: String,
    pub response_body: ResponseBody,
    /// Local wall-clock time the response was assembled.
    pub response_date_time: NaiveDateTime,
}

impl FactCheckResponse {
    pub const SUCCESS: &'static str = "Success";

    /// Assembles the response for `query_id` with a fresh response id.
    pub fn assemble(query_id: Uuid, result: &MatchResult) -> Self {
        Self {
            query_id,
            response_id: Uuid::new_v4(),
            response_message: Self::SUCCESS.to_string(),
            response_body: ResponseBody::from(result),
            response_date_time: chrono::Local::now().naive_local(),
        }
    }
}
