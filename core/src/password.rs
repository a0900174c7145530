//! Passwords for notes the user did not protect themselves.
//!
//! The generated password ends up in the link fragment and is the only thing
//! protecting the note, so every character index comes straight from the
//! operating system's entropy source. There is no seedable generator here.

use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use crate::errors::NoteError;

pub const DEFAULT_LENGTH: usize = 9;
pub const DEFAULT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz1234567890";

/// Source of uniformly distributed indices.
pub trait UniformIndex {
    /// Returns an index in `0..bound`. `bound` is never zero.
    fn next_uniform_index(&mut self, bound: usize) -> Result<usize, NoteError>;
}

/// Indices drawn from the OS CSPRNG with rejection sampling, so small bounds
/// carry no modulo bias.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl UniformIndex for OsEntropy {
    fn next_uniform_index(&mut self, bound: usize) -> Result<usize, NoteError> {
        let bound = u32::try_from(bound)
            .map_err(|_| NoteError::Entropy(format!("index bound {bound} is too large")))?;

        if bound == 0 {
            return Err(NoteError::EmptyAlphabet);
        }

        // Largest multiple of `bound` that fits, anything at or above it is redrawn.
        let zone = u32::MAX - (u32::MAX % bound);

        loop {
            let mut buf = [0u8; 4];
            OsRng
                .try_fill_bytes(&mut buf)
                .map_err(|e| NoteError::Entropy(e.to_string()))?;

            let value = u32::from_le_bytes(buf);
            if value < zone {
                return Ok((value % bound) as usize);
            }
        }
    }
}

/// Generate a password of `length` characters drawn from `alphabet`.
pub fn generate_password(length: usize, alphabet: &str) -> Result<Zeroizing<String>, NoteError> {
    generate_password_with(&mut OsEntropy, length, alphabet)
}

pub fn generate_password_with<R: UniformIndex>(
    rng: &mut R,
    length: usize,
    alphabet: &str,
) -> Result<Zeroizing<String>, NoteError> {
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return Err(NoteError::EmptyAlphabet);
    }

    let mut password = Zeroizing::new(String::with_capacity(length));
    for _ in 0..length {
        let index = rng.next_uniform_index(chars.len())?;
        password.push(chars[index]);
    }

    Ok(password)
}
