use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("nothing to send, pipe the note in or pass --file")]
    NoInput,
    #[error("the note is empty")]
    EmptyNote,
    #[error("failed to read {source_name}: {err}")]
    Input {
        source_name: String,
        err: std::io::Error,
    },
    #[error("secure random source unavailable: {0}")]
    Entropy(String),
    #[error("cannot generate a password from an empty alphabet")]
    EmptyAlphabet,
    #[error("encryption is unavailable: {0}")]
    CipherUnavailable(String),
    #[error("failed to encrypt note: {0}")]
    Encryption(String),
    #[error("failed to decrypt note: {0}")]
    Decryption(String),
    #[error("failed to encode note form: {0}")]
    Form(#[from] privnote_shared::FormError),
    #[error("failed to reach privnote: {0}")]
    Network(#[from] reqwest::Error),
    #[error("privnote rejected the note with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response from privnote: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("privnote did not return a note link")]
    MissingLink,
}
