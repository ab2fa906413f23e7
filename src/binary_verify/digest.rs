//! Certificate digest and fingerprint encoding.
//!
//! A fingerprint is the digest of one certificate's raw bytes rendered as
//! standard base64 (padded, no line breaks). Comparison between fingerprints
//! ignores ASCII case and runs in constant time for equal-length inputs.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD as BASE64};
use base64::Engine;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::VerificationError;
use crate::config::ConfigError;

// Case-folded fingerprints no longer carry canonical trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Digest function applied to certificate bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DigestAlgorithm {
    /// 20-byte SHA-1. Not collision resistant; only for fingerprints produced
    /// by tooling that still emits SHA-1.
    Sha1,
    /// 32-byte SHA-256.
    #[default]
    Sha256,
    /// 32-byte BLAKE3.
    Blake3,
}

impl DigestAlgorithm {
    /// Digest length in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 | DigestAlgorithm::Blake3 => 32,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Blake3 => "BLAKE3",
        }
    }

    fn digest(self, data: &[u8]) -> Zeroizing<Vec<u8>> {
        let out = match self {
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        };
        Zeroizing::new(out)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Textual digest of a single signing certificate.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    encoded: String,
    algorithm: DigestAlgorithm,
    // Absent when the text was not canonical base64 (e.g. case-folded).
    digest: Option<Zeroizing<Vec<u8>>>,
}

impl Fingerprint {
    /// Reads a caller-supplied fingerprint.
    ///
    /// Surrounding whitespace is trimmed. The remainder must be base64 that
    /// decodes to exactly `algorithm.output_len()` bytes; interior whitespace or
    /// line breaks are rejected.
    pub fn parse(algorithm: DigestAlgorithm, text: &str) -> Result<Self, ConfigError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyFingerprint);
        }

        let decoded = LENIENT
            .decode(trimmed)
            .map_err(|_| ConfigError::MalformedFingerprint)?;
        if decoded.len() != algorithm.output_len() {
            return Err(ConfigError::MalformedFingerprint);
        }

        let digest = if BASE64.encode(&decoded) == trimmed {
            Some(Zeroizing::new(decoded))
        } else {
            None
        };

        Ok(Self {
            encoded: trimmed.to_string(),
            algorithm,
            digest,
        })
    }

    /// Base64 text, as computed or as supplied (trimmed).
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Lowercase hex rendering of the same digest.
    ///
    /// `None` for a parsed fingerprint whose text is not canonical base64:
    /// case-folded text still matches but no longer encodes the digest bytes.
    pub fn to_hex(&self) -> Option<String> {
        self.digest.as_ref().map(|digest| hex::encode(digest.as_slice()))
    }

    /// Case-insensitive comparison against another fingerprint's text.
    pub fn matches(&self, candidate: &str) -> bool {
        eq_ignore_ascii_case_ct(self.encoded.as_bytes(), candidate.as_bytes())
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.matches(&other.encoded)
    }
}

impl Eq for Fingerprint {}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Turns raw certificate bytes into a [`Fingerprint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestEncoder {
    algorithm: DigestAlgorithm,
}

impl DigestEncoder {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Digests `certificate` and encodes the result.
    ///
    /// # Errors
    /// * `VerificationError::MalformedIdentity` if `certificate` is empty.
    pub fn encode(&self, certificate: &[u8]) -> Result<Fingerprint, VerificationError> {
        if certificate.is_empty() {
            return Err(VerificationError::MalformedIdentity);
        }

        let digest = self.algorithm.digest(certificate);
        Ok(Fingerprint {
            encoded: BASE64.encode(digest.as_slice()),
            algorithm: self.algorithm,
            digest: Some(digest),
        })
    }
}

// Constant-time for equal lengths; length itself is not secret.
fn eq_ignore_ascii_case_ct(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x.to_ascii_lowercase() ^ y.to_ascii_lowercase();
    }
    diff == 0
}
