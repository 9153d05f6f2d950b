//! # JWE Serialization
//!
//! This crate serializes JSON Web Encryption (JWE) messages ([RFC7516])
//! into their two standard wire forms: the single-line Compact
//! Serialization and the structural JSON Serialization.
//!
//! The message itself — headers, encrypted key(s), initialization
//! vector, ciphertext, and authentication tag — is produced by an
//! encryption pipeline outside this crate. This crate only packages
//! those values into standard textual forms; it performs no
//! encryption, decryption, or key management, and it does not parse
//! the reverse direction.
//!
//! [RFC7516]: https://www.rfc-editor.org/rfc/rfc7516

pub mod error;
pub mod jose;

pub use crate::error::Error;
pub use crate::jose::jwe::{Bytes, Header, Message, Protected, Recipient};
