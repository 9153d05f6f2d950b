//! # JSON Web Encryption (JWE)
//!
//! JWE ([RFC7516]) specifies how encrypted content can be represented
//! using JSON. This module covers the serialization surface only: a
//! fully populated [`Message`] is turned into either the Compact
//! Serialization (a single line of five dot-separated base64url
//! segments, exactly one recipient) or the JSON Serialization (the
//! structural multi-recipient form, minified or pretty-printed).
//!
//! Producing the message — content encryption, key wrapping, tag
//! computation — is the concern of an encryption pipeline elsewhere.
//! See JWA ([RFC7518]) for the algorithm identifiers carried in the
//! headers.
//!
//! [RFC7516]: https://www.rfc-editor.org/rfc/rfc7516
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

use std::collections::BTreeMap;

use base64ct::{Base64UrlUnpadded as Base64, Encoding};
use serde::ser;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::Error;

/// A JWE message ready for serialization.
///
/// All members are produced outside this crate and are read-only
/// inputs here: serializing never mutates the message, so the same
/// value can be serialized repeatedly (one JSON form, many compact
/// views).
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Message {
    /// JWE Protected Header. Required for compact serialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<Protected>,

    /// Shared unprotected header as a JSON object. JSON serialization
    /// only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unprotected: Option<Value>,

    /// Per-recipient information. Compact serialization requires
    /// exactly one entry.
    pub recipients: Vec<Recipient>,

    /// Additional authenticated data. Not used for compact
    /// serialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aad: Option<Bytes>,

    /// Initialization vector (nonce) used by the content encryption
    /// algorithm.
    pub iv: Bytes,

    /// Ciphertext produced by the content encryption algorithm.
    pub ciphertext: Bytes,

    /// Authentication tag resulting from the encryption.
    pub tag: Bytes,
}

impl Message {
    /// Serialize the message into JWE Compact Serialization:
    ///
    /// ```text
    /// base64(JWE Protected Header) + '.'
    ///     + base64(JWE Encrypted Key) + '.'
    ///     + base64(JWE Initialization Vector) + '.'
    ///     + base64(JWE Ciphertext) + '.'
    ///     + base64(JWE Authentication Tag)
    /// ```
    ///
    /// The header written out is the protected header merged with the
    /// single recipient's header (see [`Header::merge`]). A zero-length
    /// binary field produces an empty segment at its position, never an
    /// omitted one, so the output always contains exactly four `.`
    /// separators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedRecipientCount`] unless the message
    /// has exactly one recipient, [`Error::InvalidHeader`] if the
    /// protected header is missing or empty, and
    /// [`Error::EncodingFailure`] if the merged header cannot be
    /// encoded. On error no output is produced.
    pub fn to_compact(&self) -> Result<Vec<u8>, Error> {
        tracing::debug!("to_compact");

        if self.recipients.len() != 1 {
            return Err(Error::UnsupportedRecipientCount(self.recipients.len()));
        }
        let recipient = &self.recipients[0];

        let Some(Protected(protected)) = &self.protected else {
            return Err(Error::InvalidHeader);
        };
        let merged = protected.merge(&recipient.header)?;

        let header_json = serde_json::to_vec(&merged)
            .map_err(|e| Error::EncodingFailure { field: "protected header", source: e })?;

        let protected = Base64::encode_string(&header_json);
        let encrypted_key = Base64::encode_string(recipient.encrypted_key.as_ref());
        let iv = Base64::encode_string(self.iv.as_ref());
        let ciphertext = Base64::encode_string(self.ciphertext.as_ref());
        let tag = Base64::encode_string(self.tag.as_ref());

        Ok(format!("{protected}.{encrypted_key}.{iv}.{ciphertext}.{tag}").into_bytes())
    }

    /// Serialize the message into JWE JSON Serialization — the
    /// structural form supporting any number of recipients.
    ///
    /// When `pretty` is set the output is indented with 2 spaces;
    /// otherwise it is minified. The two forms carry byte-identical
    /// data and differ only in whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarshalFailure`] if the message cannot be
    /// represented as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>, Error> {
        tracing::debug!("to_json");

        if pretty {
            serde_json::to_vec_pretty(self).map_err(Error::MarshalFailure)
        } else {
            serde_json::to_vec(self).map_err(Error::MarshalFailure)
        }
    }
}

/// JWE Protected Header. Serializes as the base64url encoding of the
/// header's JSON representation, per RFC 7516 §7.2.1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Protected(pub Header);

impl Serialize for Protected {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bytes = serde_json::to_vec(&self.0).map_err(ser::Error::custom)?;
        serializer.serialize_str(&Base64::encode_string(&bytes))
    }
}

/// A JOSE header: the key-management and content-encryption algorithm
/// identifiers plus any private or extension parameters.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Header {
    /// Identifies the algorithm used to encrypt or determine the value
    /// of the content encryption key (CEK). For example, "RSA-OAEP".
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alg: String,

    /// The algorithm used to perform authenticated encryption on the
    /// plaintext. MUST be an AEAD algorithm. For example, "A256GCM".
    #[serde(skip_serializing_if = "String::is_empty")]
    pub enc: String,

    /// Private and extension parameters, flattened into the header's
    /// JSON object alongside `alg` and `enc`. An ordered map so that
    /// insertion order can never leak into the output.
    #[serde(flatten)]
    pub private: BTreeMap<String, Value>,
}

impl Header {
    /// True when no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alg.is_empty() && self.enc.is_empty() && self.private.is_empty()
    }

    /// Merge a per-recipient header onto this (protected) header,
    /// returning a freshly built header. Neither input is modified.
    ///
    /// Policy: the recipient's `alg` and `enc` always replace the
    /// protected values, even when the recipient leaves them empty.
    /// Private parameters are overlaid key by key with the recipient's
    /// value winning on collision.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the protected header is
    /// structurally empty.
    pub fn merge(&self, recipient: &Self) -> Result<Self, Error> {
        if self.is_empty() {
            return Err(Error::InvalidHeader);
        }

        let mut merged = self.clone();
        merged.alg.clone_from(&recipient.alg);
        merged.enc.clone_from(&recipient.enc);
        for (k, v) in &recipient.private {
            merged.private.insert(k.clone(), v.clone());
        }

        Ok(merged)
    }
}

/// Contains information specific to a single recipient.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Recipient {
    /// JWE Per-Recipient Unprotected Header.
    pub header: Header,

    /// The recipient's JWE Encrypted Key. Zero-length for key
    /// management modes that carry no wrapped key (e.g. direct key
    /// agreement).
    pub encrypted_key: Bytes,
}

/// A binary JWE field, carried raw and written out as unpadded
/// base64url text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Wrap raw bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&Base64::encode_string(&self.0))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn message() -> Message {
        Message {
            protected: Some(Protected(Header {
                private: BTreeMap::from([("cty".to_string(), json!("json"))]),
                ..Header::default()
            })),
            recipients: vec![Recipient {
                header: Header {
                    alg: "RSA-OAEP".to_string(),
                    enc: "A256GCM".to_string(),
                    private: BTreeMap::from([("foo".to_string(), json!("bar"))]),
                },
                encrypted_key: Bytes::from(&b"wrapped-cek"[..]),
            }],
            iv: Bytes::from(&b"init-vector"[..]),
            ciphertext: Bytes::from(&b"lorem ipsum"[..]),
            tag: Bytes::from(&b"auth-tag"[..]),
            ..Message::default()
        }
    }

    #[test]
    fn compact_merges_headers() {
        let compact = message().to_compact().expect("should serialize");
        let compact = String::from_utf8(compact).expect("should be utf8");

        let segments: Vec<&str> = compact.split('.').collect();
        assert_eq!(segments.len(), 5);

        let decoded = Base64::decode_vec(segments[0]).expect("should decode");
        let header: Value = serde_json::from_slice(&decoded).expect("should deserialize");

        assert_eq!(header["alg"], "RSA-OAEP");
        assert_eq!(header["enc"], "A256GCM");
        assert_eq!(header["cty"], "json");
        assert_eq!(header["foo"], "bar");
    }

    #[test]
    fn compact_requires_one_recipient() {
        let mut msg = message();

        msg.recipients.clear();
        let err = msg.to_compact().expect_err("should fail");
        assert!(matches!(err, Error::UnsupportedRecipientCount(0)));

        msg.recipients = vec![Recipient::default(), Recipient::default()];
        let err = msg.to_compact().expect_err("should fail");
        assert!(matches!(err, Error::UnsupportedRecipientCount(2)));
    }

    #[test]
    fn compact_requires_protected_header() {
        let mut msg = message();

        msg.protected = None;
        assert!(matches!(msg.to_compact(), Err(Error::InvalidHeader)));

        msg.protected = Some(Protected(Header::default()));
        assert!(matches!(msg.to_compact(), Err(Error::InvalidHeader)));
    }

    #[test]
    fn compact_keeps_empty_segments() {
        let mut msg = message();
        msg.recipients[0].encrypted_key = Bytes::default();

        let compact = msg.to_compact().expect("should serialize");
        let compact = String::from_utf8(compact).expect("should be utf8");

        assert_eq!(compact.matches('.').count(), 4);
        let segments: Vec<&str> = compact.split('.').collect();
        assert_eq!(segments[1], "");
    }

    #[test]
    fn merge_recipient_wins() {
        let protected = Header {
            private: BTreeMap::from([("x".to_string(), json!(1))]),
            ..Header::default()
        };
        let recipient = Header {
            private: BTreeMap::from([("x".to_string(), json!(2))]),
            ..Header::default()
        };

        let merged = protected.merge(&recipient).expect("should merge");
        assert_eq!(merged.private["x"], json!(2));

        // inputs are untouched
        assert_eq!(protected.private["x"], json!(1));
        assert_eq!(recipient.private["x"], json!(2));
    }

    #[test]
    fn merge_overwrites_alg_and_enc() {
        let protected = Header {
            alg: "ECDH-ES".to_string(),
            enc: "A128GCM".to_string(),
            ..Header::default()
        };

        // a recipient with unset identifiers still replaces both
        let merged = protected.merge(&Header::default()).expect("should merge");
        assert!(merged.alg.is_empty());
        assert!(merged.enc.is_empty());
    }

    #[test]
    fn merge_rejects_empty_protected() {
        let err = Header::default().merge(&Header::default()).expect_err("should fail");
        assert!(matches!(err, Error::InvalidHeader));
    }

    #[test]
    fn json_pretty_and_minified_agree() {
        let msg = message();

        let minified = msg.to_json(false).expect("should serialize");
        let pretty = msg.to_json(true).expect("should serialize");

        let a: Value = serde_json::from_slice(&minified).expect("should deserialize");
        let b: Value = serde_json::from_slice(&pretty).expect("should deserialize");
        assert_eq!(a, b);

        // whitespace is the only difference
        assert!(pretty.len() > minified.len());
        assert!(pretty.contains(&b'\n'));
        assert!(!minified.contains(&b'\n'));
    }

    #[test]
    fn json_allows_many_recipients() {
        let mut msg = message();
        msg.recipients.push(Recipient {
            header: Header {
                alg: "ECDH-ES".to_string(),
                ..Header::default()
            },
            encrypted_key: Bytes::default(),
        });

        let json = msg.to_json(false).expect("should serialize");
        let value: Value = serde_json::from_slice(&json).expect("should deserialize");

        assert_eq!(value["recipients"].as_array().map(Vec::len), Some(2));
        assert!(value["protected"].is_string());
    }
}
