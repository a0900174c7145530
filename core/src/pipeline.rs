use log::info;
use privnote_shared::{DataType, Expiry, NoteForm};
use std::fmt;
use zeroize::Zeroizing;

use crate::client::NoteService;
use crate::crypto::NoteCipher;
use crate::errors::NoteError;
use crate::link::compose_link;
use crate::password::{DEFAULT_ALPHABET, DEFAULT_LENGTH, generate_password};

/// Key protecting a note.
pub enum Password {
    /// Chosen by the user. Never leaves the machine, not even in the link.
    Manual(Zeroizing<String>),
    /// Generated locally and handed to the recipient in the link fragment.
    Generated(Zeroizing<String>),
}

impl Password {
    /// Use the manual password when there is one, otherwise generate one.
    pub fn manual_or_generated(manual: Option<Zeroizing<String>>) -> Result<Self, NoteError> {
        match manual {
            Some(password) => Ok(Password::Manual(password)),
            None => Ok(Password::Generated(generate_password(
                DEFAULT_LENGTH,
                DEFAULT_ALPHABET,
            )?)),
        }
    }

    #[must_use]
    pub fn is_manual(&self) -> bool {
        matches!(self, Password::Manual(_))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        match self {
            Password::Manual(p) | Password::Generated(p) => p.as_str(),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Password::Manual(_) => f.write_str("Password::Manual(<redacted>)"),
            Password::Generated(_) => f.write_str("Password::Generated(<redacted>)"),
        }
    }
}

/// Everything needed to create one note. Built once per run.
pub struct NoteRequest {
    pub content: Zeroizing<Vec<u8>>,
    pub password: Password,
    pub expiry: Expiry,
    pub dont_ask: bool,
    pub notify_email: String,
    pub notify_reference: String,
}

impl fmt::Debug for NoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteRequest")
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .field("password", &self.password)
            .field("expiry", &self.expiry)
            .field("dont_ask", &self.dont_ask)
            .field("notify_email", &self.notify_email)
            .field("notify_reference", &self.notify_reference)
            .finish()
    }
}

impl NoteRequest {
    fn form(&self, ciphertext: String) -> NoteForm {
        NoteForm {
            data: ciphertext,
            data_type: DataType::Text,
            dont_ask: self.dont_ask,
            duration_hours: self.expiry.hours(),
            has_manual_pass: self.password.is_manual(),
            notify_email: self.notify_email.clone(),
            notify_ref: self.notify_reference.clone(),
        }
    }
}

/// encrypt -> submit -> compose link.
pub struct Pipeline<C, S> {
    cipher: C,
    service: S,
}

impl<C: NoteCipher, S: NoteService> Pipeline<C, S> {
    pub fn new(cipher: C, service: S) -> Self {
        Self { cipher, service }
    }

    /// Fails fast when encryption cannot work. Nothing has been sent yet.
    pub fn preflight(&self) -> Result<(), NoteError> {
        self.cipher.ensure_available()
    }

    /// Create the note and return the link to share.
    pub fn submit(&self, request: &NoteRequest) -> Result<String, NoteError> {
        self.preflight()?;

        let password = request.password.expose();
        let ciphertext = self.cipher.encrypt(&request.content, password)?;
        info!(
            "Encrypted {} byte note ({} password)",
            request.content.len(),
            if request.password.is_manual() {
                "manual"
            } else {
                "generated"
            }
        );

        let response = self.service.submit(&request.form(ciphertext))?;

        Ok(compose_link(
            &response,
            password,
            request.password.is_manual(),
        ))
    }
}
