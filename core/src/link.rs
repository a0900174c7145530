use privnote_shared::NoteResponse;

/// Final link handed to the user.
///
/// A generated password is appended as the URL fragment: browsers never send
/// the fragment, so the recipient gets the key while the service does not.
/// A manual password is known to the user already and stays out of the link.
#[must_use]
pub fn compose_link(response: &NoteResponse, password: &str, password_is_manual: bool) -> String {
    if password_is_manual {
        response.note_link.clone()
    } else {
        format!("{}#{password}", response.note_link)
    }
}
