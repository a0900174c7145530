use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use serde_urlencoded::ser::Error as FormError;

/// Legacy note creation endpoint. It only accepts requests that look like the
/// site's own XHR calls.
pub const LEGACY_ENDPOINT: &str = "https://privnote.com/legacy/";
pub const ORIGIN: &str = "https://privnote.com";
pub const REFERER: &str = "https://privnote.com/";
pub const USER_AGENT: &str = concat!(
    "privnote/v",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/dombo/privnote)"
);

/// Kind of note being created. The legacy endpoint only knows about text.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    #[serde(rename = "T")]
    Text,
}

/// Sent to the server when creating a new note.
///
/// Fields are declared in key order so the encoded body matches what the
/// service has always received.
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub data: String,
    pub data_type: DataType,
    pub dont_ask: bool,
    pub duration_hours: u32,
    pub has_manual_pass: bool,
    pub notify_email: String,
    pub notify_ref: String,
}

impl NoteForm {
    /// `application/x-www-form-urlencoded` body for this form.
    pub fn encode(&self) -> Result<String, FormError> {
        serde_urlencoded::to_string(self)
    }
}

impl fmt::Debug for NoteForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteForm")
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("data_type", &self.data_type)
            .field("dont_ask", &self.dont_ask)
            .field("duration_hours", &self.duration_hours)
            .field("has_manual_pass", &self.has_manual_pass)
            .field("notify_email", &self.notify_email)
            .field("notify_ref", &self.notify_ref)
            .finish()
    }
}

/// Gets returned by the server when a note was created
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteResponse {
    #[serde(default)]
    pub has_manual_pass: bool,
    #[serde(default)]
    pub policy: i64,
    #[serde(default, rename = "expires_js")]
    pub expires: Option<String>,
    pub note_link: String,
    #[serde(default)]
    pub dont_ask: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid expiry `{0}`, expected one of: {list}", list = Expiry::token_list())]
pub struct ExpiryError(pub String);

/// How long an unread note survives on the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Expiry {
    /// Destroyed after the first read, or after 30 days unread.
    #[default]
    AfterReading,
    Hour,
    Day,
    Week,
    Month,
}

/// Every accepted token with its meaning, in the order they are offered.
const TOKENS: &[(&str, Expiry, &str)] = &[
    ("0", Expiry::AfterReading, "expire after 1st read, or 30 days in unread state"),
    ("immediate", Expiry::AfterReading, "same as 0"),
    ("1h", Expiry::Hour, "1 hour"),
    ("24h", Expiry::Day, "24 hours"),
    ("1d", Expiry::Day, "1 day"),
    ("7d", Expiry::Week, "7 days"),
    ("1w", Expiry::Week, "1 week"),
    ("30d", Expiry::Month, "30 days"),
    ("1m", Expiry::Month, "1 month"),
];

impl Expiry {
    /// Value sent as `duration_hours`. Zero means "burn after reading"
    /// rather than a literal zero hour lifetime.
    #[must_use]
    pub fn hours(self) -> u32 {
        match self {
            Expiry::AfterReading => 0,
            Expiry::Hour => 1,
            Expiry::Day => 24,
            Expiry::Week => 24 * 7,
            Expiry::Month => 24 * 30,
        }
    }

    /// `(token, usage)` pairs for help text and shell completion.
    pub fn tokens() -> impl Iterator<Item = (&'static str, &'static str)> {
        TOKENS.iter().map(|(token, _, usage)| (*token, *usage))
    }

    fn token_list() -> String {
        Self::tokens()
            .map(|(token, _)| token)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Expiry {
    type Err = ExpiryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();

        TOKENS
            .iter()
            .find(|(t, _, _)| t.eq_ignore_ascii_case(token))
            .map(|(_, expiry, _)| *expiry)
            .ok_or_else(|| ExpiryError(s.to_string()))
    }
}
