use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

// --- Request payloads ---

/// Body for `POST /configure`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyRequest<'a> {
    pub api_key: &'a str,
}

/// Body for `POST /start_session` and `POST /full_pipeline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub seller_description: String,
    pub reviews: Vec<String>,
}

/// Body for the session-keyed step endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SessionIdRequest<'a> {
    pub session_id: &'a str,
}

// --- Response payloads ---

/// Plain `{message}` acknowledgement (configure, worker toggle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    #[serde(default)]
    pub status: String,
}

impl HeartbeatResponse {
    /// The backend reports e.g. "heartbeat success" / "heartbeat failed".
    pub fn is_success(&self) -> bool {
        self.status.to_lowercase().contains("success")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
}

// Record types keep `value` as sent and every other key in `extra`, so a
// record serializes back to exactly what the backend returned.

/// One attribute/value pair pulled out of a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAttribute {
    pub attribute: String,
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtractedAttribute {
    pub fn value_text(&self) -> Cow<'_, str> {
        value_text(&self.value)
    }
}

/// Result of `POST /extract`: one attribute list per review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub extracted_attributes: Vec<Vec<ExtractedAttribute>>,
    #[serde(default)]
    pub markdown: String,
}

/// How an extracted attribute relates to the seller description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchStatus {
    Missing,
    Matching,
    Contradictory,
    PartiallyMatching,
    Other(String),
}

impl MatchStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Missing => "missing",
            Self::Matching => "matching",
            Self::Contradictory => "contradictory",
            Self::PartiallyMatching => "partially_matching",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MatchStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "missing" => Self::Missing,
            "matching" => Self::Matching,
            "contradictory" => Self::Contradictory,
            "partially_matching" => Self::PartiallyMatching,
            _ => Self::Other(s),
        }
    }
}

impl From<MatchStatus> for String {
    fn from(status: MatchStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a per-review match table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedAttributeRecord {
    pub attribute: String,
    pub value: Value,
    pub status: MatchStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatchedAttributeRecord {
    pub fn value_text(&self) -> Cow<'_, str> {
        value_text(&self.value)
    }

    pub fn evidence(&self) -> Option<&str> {
        text_field(&self.extra, "evidence")
    }
}

/// Result of `POST /match`: one record table per review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub all_dataframes: Vec<Vec<MatchedAttributeRecord>>,
    #[serde(default)]
    pub markdown: String,
}

/// A matched record filed under a category. The backend keeps the record's
/// `status` and `evidence` keys; both stay in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedItem {
    pub attribute: String,
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CategorizedItem {
    pub fn value_text(&self) -> Cow<'_, str> {
        value_text(&self.value)
    }

    pub fn evidence(&self) -> Option<&str> {
        text_field(&self.extra, "evidence")
    }

    pub fn status(&self) -> Option<MatchStatus> {
        text_field(&self.extra, "status").map(|s| MatchStatus::from(s.to_string()))
    }
}

/// status -> category -> items, in the order the backend emitted them.
pub type CategorizedResult = IndexMap<String, IndexMap<String, Vec<CategorizedItem>>>;

/// Result of `POST /categorize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizeResponse {
    pub results: CategorizedResult,
    #[serde(default)]
    pub markdown: String,
}

impl CategorizeResponse {
    /// Total number of items across every status and category.
    pub fn item_count(&self) -> usize {
        self.results
            .values()
            .flat_map(|categories| categories.values())
            .map(Vec::len)
            .sum()
    }
}

/// Text form of an attribute value. LLM output occasionally yields numbers or
/// booleans where text is expected; `null` reads as empty.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

fn text_field<'a>(extra: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    extra.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}
