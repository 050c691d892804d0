//! Wire types shared between the score server, its tests, and developer tooling.
//!
//! Field names follow the JSON contract the browser client speaks (`sessionId`,
//! `playerAddress`, ...). Serialization is behind the optional `serde` feature.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Body of `POST /start`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartRequest {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
}

/// Response of `POST /start`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StartResponse {
    pub session_id: String,
}

/// Hit count exactly as the client sent it.
///
/// Browsers are not consistent about numbers versus numeric strings, so the
/// server accepts both and decides integrality itself via [`RawHits::to_count`].
/// Any other JSON value is kept as [`RawHits::Other`] so that a bad count is
/// rejected by the pipeline rather than by body decoding.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawHits {
    Integer(i64),
    Float(f64),
    Text(String),
    #[cfg(feature = "serde")]
    Other(serde_json::Value),
}

impl RawHits {
    /// Interprets the claim as an integer, or `None` when it is not one.
    pub fn to_count(&self) -> Option<i64> {
        match self {
            RawHits::Integer(n) => Some(*n),
            RawHits::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            RawHits::Text(s) => s.trim().parse().ok(),
            #[cfg(feature = "serde")]
            RawHits::Other(_) => None,
        }
    }
}

impl From<i64> for RawHits {
    fn from(value: i64) -> Self {
        RawHits::Integer(value)
    }
}

/// A field the client is expected to send as a string.
///
/// Non-string values are kept rather than failing the whole body; the
/// gate that reads the field rejects them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum WireText {
    Text(String),
    #[cfg(feature = "serde")]
    Other(serde_json::Value),
}

impl WireText {
    /// The string value, or `None` for a non-string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireText::Text(s) => Some(s),
            #[cfg(feature = "serde")]
            WireText::Other(_) => None,
        }
    }

    /// False for empty strings, `false`, `0`, `[]` and `{}`.
    pub fn is_present(&self) -> bool {
        match self {
            WireText::Text(s) => !s.is_empty(),
            #[cfg(feature = "serde")]
            WireText::Other(value) => match value {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                serde_json::Value::String(s) => !s.is_empty(),
                serde_json::Value::Array(items) => !items.is_empty(),
                serde_json::Value::Object(fields) => !fields.is_empty(),
            },
        }
    }
}

impl From<String> for WireText {
    fn from(value: String) -> Self {
        WireText::Text(value)
    }
}

impl From<&str> for WireText {
    fn from(value: &str) -> Self {
        WireText::Text(value.to_string())
    }
}

/// Body of `POST /submit`.
///
/// Every field is optional and loosely typed at the wire level; the
/// submission pipeline decides which absence or bad value maps to which
/// rejection.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct SubmitRequest {
    pub session_id: Option<WireText>,
    pub hits: Option<RawHits>,
    pub player_address: Option<WireText>,
    pub message: Option<WireText>,
    pub signature: Option<WireText>,
}

/// Claim the client signs with its wallet before submitting.
///
/// Only `timestamp` is interpreted by the server; the rest binds the signature
/// to one run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ClaimMessage {
    pub hits: i64,
    pub session_id: String,
    pub timestamp: i64,
}

/// Signed score returned by a successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreReceipt {
    pub score: u64,
    /// Server-assigned unix seconds, covered by `signature`.
    pub timestamp: i64,
    /// `0x`-prefixed 65-byte personal-message signature.
    pub signature: String,
    /// EIP-55 address of the server signing key.
    pub trusted: String,
}

/// Row of the public leaderboard.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

/// Error body for every non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Acknowledgement of `POST /api/log-error`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogAck {
    pub status: String,
}

impl LogAck {
    pub fn logged() -> Self {
        Self {
            status: "logged".to_string(),
        }
    }
}
