//! AES-CFB envelope with PKCS7 padding.
//!
//! Wire format: URL-safe base64 without `=` of `IV (16 bytes) || CFB(padded plaintext)`.
//! The key length selects AES-128, AES-192 or AES-256.
//!
//! The trailing pad byte is the only check on decryption, so a wrong key is
//! usually, but not always, reported as [`Error::Padding`].

use aes::cipher::{AsyncStreamCipher, BlockCipher, BlockEncryptMut, KeyInit, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use base64::alphabet;
use base64::engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Error, Result};

/// AES block size, IV size and padding granularity in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Accepted AES key lengths in bytes.
pub const KEY_SIZES: [usize; 3] = [16, 24, 32];

/// URL-safe decoder that accepts input with or without trailing `=`.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Clone, Copy)]
enum Direction {
    Encrypt,
    Decrypt,
}

fn check_key(key: &[u8]) -> Result<()> {
    if KEY_SIZES.contains(&key.len()) {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.len()))
    }
}

fn apply_cfb(key: &[u8], iv: &[u8], buf: &mut [u8], direction: Direction) -> Result<()> {
    match key.len() {
        16 => run_cfb::<Aes128>(key, iv, buf, direction),
        24 => run_cfb::<Aes192>(key, iv, buf, direction),
        32 => run_cfb::<Aes256>(key, iv, buf, direction),
        other => Err(Error::InvalidKey(other)),
    }
}

fn run_cfb<C>(key: &[u8], iv: &[u8], buf: &mut [u8], direction: Direction) -> Result<()>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    match direction {
        Direction::Encrypt => cfb_mode::Encryptor::<C>::new_from_slices(key, iv)
            .map_err(|_| Error::InvalidKey(key.len()))?
            .encrypt(buf),
        Direction::Decrypt => cfb_mode::Decryptor::<C>::new_from_slices(key, iv)
            .map_err(|_| Error::InvalidKey(key.len()))?
            .decrypt(buf),
    }
    Ok(())
}

/// Append PKCS7 padding; an aligned input gains a full block of `0x10`.
fn pad(mut data: Vec<u8>) -> Vec<u8> {
    let padding = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    data.resize(data.len() + padding, padding as u8);
    data
}

/// Strip the pad length declared by the last byte.
fn unpad(data: &[u8]) -> Result<&[u8]> {
    let declared = *data.last().ok_or(Error::Padding)? as usize;
    if declared > data.len() {
        return Err(Error::Padding);
    }
    Ok(&data[..data.len() - declared])
}

/// Generate a random AES key of `len` bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] unless `len` is 16, 24 or 32.
pub fn generate_key(len: usize) -> Result<Vec<u8>> {
    let mut key = vec![0u8; len];
    check_key(&key)?;
    OsRng.fill_bytes(&mut key);
    Ok(key)
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// # Arguments
///
/// * `plaintext` - Any byte string, including empty
/// * `key` - 16, 24 or 32 raw key bytes
///
/// # Returns
///
/// URL-safe base64 of `IV || ciphertext` with the trailing `=` removed.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] for any other key length.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<String> {
    check_key(key)?;

    let mut iv = [0u8; BLOCK_SIZE];
    OsRng.fill_bytes(&mut iv);

    let mut body = pad(plaintext.to_vec());
    apply_cfb(key, &iv, &mut body, Direction::Encrypt)?;

    let mut envelope = Vec::with_capacity(BLOCK_SIZE + body.len());
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&body);
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(envelope))
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// # Errors
///
/// * [`Error::InvalidKey`] - key is not 16, 24 or 32 bytes
/// * [`Error::Decode`] - input is not URL-safe base64
/// * [`Error::BlockSize`] - decoded length is zero or not a multiple of 16
/// * [`Error::Padding`] - no body after the IV, or the pad length exceeds it
pub fn decrypt(ciphertext: &str, key: &[u8]) -> Result<Vec<u8>> {
    check_key(key)?;

    let decoded = URL_SAFE_LENIENT.decode(ciphertext)?;
    if decoded.is_empty() || decoded.len() % BLOCK_SIZE != 0 {
        return Err(Error::BlockSize(decoded.len()));
    }

    let (iv, body) = decoded.split_at(BLOCK_SIZE);
    let mut body = body.to_vec();
    apply_cfb(key, iv, &mut body, Direction::Decrypt)?;

    Ok(unpad(&body)?.to_vec())
}
