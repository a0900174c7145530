//! Client side of privnote: read a note, encrypt it locally, create it on the
//! service and build the link to share.

pub mod client;
pub mod crypto;
pub mod errors;
pub mod input;
pub mod link;
pub mod password;
pub mod pipeline;

pub use client::{HttpNoteService, NoteService};
pub use crypto::{NoteCipher, OpensslCompat};
pub use errors::NoteError;
pub use input::{is_pipe_or_file, read_note};
pub use link::compose_link;
pub use pipeline::{NoteRequest, Password, Pipeline};
