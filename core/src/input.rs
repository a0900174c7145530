use log::debug;
use std::fs;
use std::io::Read;
use std::path::Path;
use zeroize::Zeroizing;

#[cfg(unix)]
use std::os::fd::AsFd;
#[cfg(not(unix))]
use std::io::IsTerminal;

use crate::errors::NoteError;

/// Read the note body. Non-empty piped input wins over `file`.
///
/// `piped` is `None` when standard input is a terminal.
pub fn read_note<R: Read>(
    piped: Option<R>,
    file: Option<&Path>,
) -> Result<Zeroizing<Vec<u8>>, NoteError> {
    if let Some(mut reader) = piped {
        let mut buf = Zeroizing::new(Vec::new());
        reader
            .read_to_end(&mut buf)
            .map_err(|err| NoteError::Input {
                source_name: "standard input".to_string(),
                err,
            })?;

        if !buf.is_empty() {
            debug!("Read {} bytes from standard input", buf.len());
            return Ok(buf);
        }
    }

    let Some(path) = file else {
        return Err(NoteError::NoInput);
    };

    let content = Zeroizing::new(fs::read(path).map_err(|err| NoteError::Input {
        source_name: path.display().to_string(),
        err,
    })?);

    if content.is_empty() {
        return Err(NoteError::EmptyNote);
    }

    debug!("Read {} bytes from {}", content.len(), path.display());
    Ok(content)
}

/// Whether `handle` is a pipe or a redirected regular file, the kinds of
/// standard input that reach end of file. Terminals, sockets and character
/// devices are not note input.
#[cfg(unix)]
pub fn is_pipe_or_file(handle: impl AsFd) -> bool {
    use std::os::unix::fs::FileTypeExt;

    let metadata = handle
        .as_fd()
        .try_clone_to_owned()
        .map(fs::File::from)
        .and_then(|file| file.metadata());

    match metadata {
        Ok(metadata) => {
            let kind = metadata.file_type();
            kind.is_fifo() || kind.is_file()
        }
        Err(err) => {
            debug!("Cannot inspect standard input: {err}");
            false
        }
    }
}

#[cfg(not(unix))]
pub fn is_pipe_or_file(handle: &impl IsTerminal) -> bool {
    !handle.is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn note_file(content: &[u8]) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn piped_input_wins_over_file() {
        let file = note_file(b"from file");
        let note = read_note(Some(Cursor::new(b"from pipe")), Some(file.path())).unwrap();
        assert_eq!(note.as_slice(), b"from pipe");
    }

    #[test]
    fn empty_pipe_falls_back_to_file() {
        let file = note_file(b"from file");
        let note = read_note(Some(Cursor::new(b"")), Some(file.path())).unwrap();
        assert_eq!(note.as_slice(), b"from file");
    }

    #[test]
    fn reads_file_when_nothing_is_piped() {
        let file = note_file(b"line one\nline two\n");
        let note = read_note(None::<Cursor<Vec<u8>>>, Some(file.path())).unwrap();
        assert_eq!(note.as_slice(), b"line one\nline two\n");
    }

    #[test]
    fn piped_bytes_are_kept_verbatim() {
        let note = read_note(Some(Cursor::new(b"a\nb\r\n\n")), None).unwrap();
        assert_eq!(note.as_slice(), b"a\nb\r\n\n");
    }

    #[test]
    fn no_source_is_an_error() {
        assert!(matches!(
            read_note(None::<Cursor<Vec<u8>>>, None),
            Err(NoteError::NoInput)
        ));
        assert!(matches!(
            read_note(Some(Cursor::new(b"")), None),
            Err(NoteError::NoInput)
        ));
    }

    #[test]
    fn empty_file_is_an_error() {
        let file = note_file(b"");
        assert!(matches!(
            read_note(None::<Cursor<Vec<u8>>>, Some(file.path())),
            Err(NoteError::EmptyNote)
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");

        let err = read_note(None::<Cursor<Vec<u8>>>, Some(&path)).unwrap_err();
        assert!(matches!(err, NoteError::Input { .. }));
        assert!(err.to_string().contains("absent.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn redirected_file_counts_as_piped() {
        let file = note_file(b"from file");
        assert!(is_pipe_or_file(file.as_file()));
    }

    #[cfg(unix)]
    #[test]
    fn socket_is_not_read_as_input() {
        use std::net::{TcpListener, TcpStream};

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let stream = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        assert!(!is_pipe_or_file(&stream));
    }

    #[cfg(unix)]
    #[test]
    fn character_device_is_not_read_as_input() {
        let null = fs::File::open("/dev/null").unwrap();
        assert!(!is_pipe_or_file(&null));
    }
}
