use log::{debug, info};
use privnote_shared::{LEGACY_ENDPOINT, NoteForm, NoteResponse, ORIGIN, REFERER, USER_AGENT};
use reqwest::blocking::{Client, Request};
use reqwest::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::errors::NoteError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates notes on the remote service.
///
/// A submission is never retried: the note may already exist server side and
/// a second attempt could leave a duplicate behind.
pub trait NoteService {
    fn submit(&self, form: &NoteForm) -> Result<NoteResponse, NoteError>;
}

impl<T: NoteService + ?Sized> NoteService for &T {
    fn submit(&self, form: &NoteForm) -> Result<NoteResponse, NoteError> {
        (**self).submit(form)
    }
}

pub struct HttpNoteService {
    client: Client,
    endpoint: String,
}

impl HttpNoteService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, NoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(xhr_headers())
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Client for the public privnote.com endpoint.
    pub fn privnote() -> Result<Self, NoteError> {
        Self::new(LEGACY_ENDPOINT, DEFAULT_TIMEOUT)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request line, form headers and body of a submission. The user agent
    /// and XHR headers are client defaults, added when the request is
    /// executed, so they do not show up here.
    pub fn build_request(&self, form: &NoteForm) -> Result<Request, NoteError> {
        let body = form.encode()?;

        let request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .build()?;

        Ok(request)
    }
}

impl NoteService for HttpNoteService {
    fn submit(&self, form: &NoteForm) -> Result<NoteResponse, NoteError> {
        let request = self.build_request(form)?;
        info!(
            "Submitting note to {} ({} ciphertext bytes, {} hours)",
            self.endpoint,
            form.data.len(),
            form.duration_hours
        );

        let response = self.client.execute(request)?;
        let status = response.status();
        let body = response.text()?;
        debug!("privnote answered {status}");

        if !status.is_success() {
            return Err(NoteError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        parse_response(&body)
    }
}

/// Parse the JSON reply to a note creation request.
pub fn parse_response(body: &str) -> Result<NoteResponse, NoteError> {
    let response: NoteResponse = serde_json::from_str(body)?;

    if response.note_link.trim().is_empty() {
        return Err(NoteError::MissingLink);
    }

    debug!(
        "Note created (policy {}, expires {:?})",
        response.policy, response.expires
    );

    Ok(response)
}

/// Headers the legacy endpoint expects from the site's own XHR calls.
fn xhr_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("dnt", HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("origin", HeaderValue::from_static(ORIGIN));
    headers.insert("referer", HeaderValue::from_static(REFERER));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
