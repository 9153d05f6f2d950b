//! # JSON Object Signing and Encryption (JOSE)
//!
//! Types and wire encodings from the JOSE family of specifications.
//! Currently limited to the JWE serialization surface ([RFC7516]).
//!
//! [RFC7516]: https://www.rfc-editor.org/rfc/rfc7516

pub mod jwe;

pub use jwe::{Header, Message};
