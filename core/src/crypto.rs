//! OpenSSL compatible password encryption.
//!
//! privnote decrypts in the browser with the same scheme `openssl enc
//! -aes-256-cbc -md md5 -a` produces, so the layout is fixed:
//!
//! ```text
//!   base64("Salted__" || salt[8] || AES-256-CBC(PKCS#7, plaintext))
//!   key || iv = EVP_BytesToKey(MD5, password, salt), one iteration
//! ```

use aes::Aes256;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use rand_core::{OsRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::NoteError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
/// `openssl -a` breaks its base64 output into lines of this width.
const LINE_WIDTH: usize = 64;

/// Something able to turn a note into the text the service stores.
pub trait NoteCipher {
    /// Fails when the cipher cannot be used at all. Called before any other
    /// work so a missing capability never surfaces halfway through a run.
    fn ensure_available(&self) -> Result<(), NoteError>;

    fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<String, NoteError>;
}

impl<T: NoteCipher + ?Sized> NoteCipher for &T {
    fn ensure_available(&self) -> Result<(), NoteError> {
        (**self).ensure_available()
    }

    fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<String, NoteError> {
        (**self).encrypt(plaintext, password)
    }
}

/// In-process AES-256-CBC, byte compatible with the OpenSSL CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpensslCompat;

impl NoteCipher for OpensslCompat {
    fn ensure_available(&self) -> Result<(), NoteError> {
        // Self test: a block must survive a round trip through this build.
        let salt = [0u8; SALT_LEN];
        let encoded = encrypt_with_salt(b"privnote", "self-test", &salt)?;
        let decoded = decrypt_with_password(&encoded, "self-test")
            .map_err(|e| NoteError::CipherUnavailable(e.to_string()))?;

        if decoded.as_slice() != b"privnote" {
            return Err(NoteError::CipherUnavailable(
                "AES-256-CBC self test produced the wrong plaintext".to_string(),
            ));
        }

        Ok(())
    }

    fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<String, NoteError> {
        encrypt_with_password(plaintext, password)
    }
}

/// Encrypt with a fresh random salt.
pub fn encrypt_with_password(plaintext: &[u8], password: &str) -> Result<String, NoteError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| NoteError::Entropy(e.to_string()))?;

    encrypt_with_salt(plaintext, password, &salt)
}

/// Deterministic for a given `(plaintext, password, salt)`.
pub fn encrypt_with_salt(
    plaintext: &[u8],
    password: &str,
    salt: &[u8; SALT_LEN],
) -> Result<String, NoteError> {
    let (key, iv) = bytes_to_key(password.as_bytes(), salt);

    let cipher = Aes256CbcEnc::new_from_slices(&key[..], &iv[..])
        .map_err(|_| NoteError::Encryption("Invalid key length".to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut storage = Vec::with_capacity(MAGIC.len() + SALT_LEN + ciphertext.len());
    storage.extend_from_slice(MAGIC);
    storage.extend_from_slice(salt);
    storage.extend_from_slice(&ciphertext);

    Ok(wrap_lines(&STANDARD.encode(storage)))
}

/// Reverse of [`encrypt_with_password`]. Accepts wrapped or single line base64.
pub fn decrypt_with_password(
    encoded: &str,
    password: &str,
) -> Result<Zeroizing<Vec<u8>>, NoteError> {
    let compact: String = encoded.split_whitespace().collect();
    let blob = STANDARD
        .decode(compact)
        .map_err(|e| NoteError::Decryption(format!("Invalid base64: {e}")))?;

    if blob.len() < MAGIC.len() + SALT_LEN || &blob[..MAGIC.len()] != MAGIC {
        return Err(NoteError::Decryption(
            "Data is missing the salt header".to_string(),
        ));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&blob[MAGIC.len()..MAGIC.len() + SALT_LEN]);
    let ciphertext = &blob[MAGIC.len() + SALT_LEN..];

    let (key, iv) = bytes_to_key(password.as_bytes(), &salt);

    let cipher = Aes256CbcDec::new_from_slices(&key[..], &iv[..])
        .map_err(|_| NoteError::Decryption("Invalid key length".to_string()))?;

    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| NoteError::Decryption("Decryption failed (Wrong password?)".to_string()))?;

    Ok(Zeroizing::new(plaintext))
}

/// OpenSSL's `EVP_BytesToKey` with MD5 and a single round:
/// `D_i = MD5(D_{i-1} || password || salt)` until key and IV are filled.
fn bytes_to_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
) -> (Zeroizing<[u8; KEY_LEN]>, Zeroizing<[u8; IV_LEN]>) {
    let mut material = Zeroizing::new(Vec::with_capacity(KEY_LEN + IV_LEN + 16));
    let mut previous: Vec<u8> = Vec::new();

    while material.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&previous);
        hasher.update(password);
        hasher.update(salt);

        previous.zeroize();
        previous = hasher.finalize().to_vec();
        material.extend_from_slice(&previous);
    }
    previous.zeroize();

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let mut iv = Zeroizing::new([0u8; IV_LEN]);
    key.copy_from_slice(&material[..KEY_LEN]);
    iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + IV_LEN]);

    (key, iv)
}

fn wrap_lines(encoded: &str) -> String {
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 1);

    // base64 output is ASCII, so byte chunks are valid str slices.
    for line in encoded.as_bytes().chunks(LINE_WIDTH) {
        wrapped.push_str(&String::from_utf8_lossy(line));
        wrapped.push('\n');
    }

    wrapped
}
