//! # cipherkit
//!
//! RSA and AES primitives behind plain byte-in / string-out functions.
//!
//! Every operation is a stateless function: keys are passed in explicitly,
//! nothing is cached, and all of them may be called concurrently from any
//! number of threads. The only shared resource is the operating system's
//! random number generator.
//!
//! ## Features
//!
//! - **Key Handling**: Generate RSA key pairs and read/write them as PKCS1 PEM
//!   (`RSA PRIVATE KEY` / `RSA PUBLIC KEY`)
//! - **OAEP Encryption**: Randomized RSA-OAEP with SHA-256, standard base64 output
//! - **Raw Private-Key Transform**: Deterministic "encrypt with the private key,
//!   decrypt with the public key" using hand-built PKCS1 v1.5 block-type-1 padding
//! - **Signatures**: PKCS1 v1.5 signatures over SHA-256 digests
//! - **AES-CFB Envelope**: PKCS7-padded AES-CFB with a random IV, URL-safe base64
//! - **Hybrid Envelope**: AES for the message, OAEP for the AES key
//!
//! ## Quick Start
//!
//! ```rust
//! use cipherkit::keys::{KeyPair, MIN_KEY_BITS};
//! use cipherkit::{raw, signing, symmetric};
//!
//! let key_pair = KeyPair::generate(MIN_KEY_BITS).unwrap();
//!
//! // Private-key transform, recoverable by anyone holding the public key
//! let token = raw::encrypt_with_private_key(b"S0000232", &key_pair.private_key).unwrap();
//! let message = raw::decrypt_with_public_key(&token, &key_pair.public_key).unwrap();
//! assert_eq!(message, b"S0000232");
//!
//! // Sign and verify
//! let signature = signing::sign(b"query", &key_pair.private_key).unwrap();
//! assert!(signing::verify(&signature, b"query", &key_pair.public_key));
//!
//! // Symmetric envelope
//! let key = b"LKHlhb899Y09olUiLKHlhb899Y09olUi";
//! let sealed = symmetric::encrypt(b"S0000232", key).unwrap();
//! assert_eq!(symmetric::decrypt(&sealed, key).unwrap(), b"S0000232");
//! ```
//!
//! ## Security
//!
//! - The raw transform carries no integrity check and its big-integer
//!   arithmetic is not constant-time.
//! - The AES envelope is unauthenticated; the pad byte is the only sanity check.
//! - Legacy encrypted PEM blocks (`legacy-pem` feature) are only tried with an
//!   empty passphrase.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](crate::Error); nothing
//! in this crate exits the process or substitutes a default value.
//! [`signing::verify`] answers `true` or `false` instead of returning an error.

pub mod config;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod oaep;
pub mod pem;
pub mod raw;
pub mod signing;
pub mod symmetric;

pub use error::{Error, Result};
pub use keys::KeyPair;
pub use raw::FixedWidthBlock;
pub use rsa::{RsaPrivateKey, RsaPublicKey};
