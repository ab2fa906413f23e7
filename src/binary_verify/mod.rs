//! Signing identity verification.
//!
//! # Components
//! - `digest`: certificate digest and canonical fingerprint encoding.
//! - `provenance`: installer trust policy evaluation.
//! - `local_self_verify`: the verifier that combines both into a verdict.

pub mod digest;
pub mod local_self_verify;
pub mod provenance;

use core::fmt;

/// Reasons a self-verification pass can fail.
///
/// These stay inside the crate boundary: [`local_self_verify::TamperingVerifier::validate`]
/// collapses every variant into `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    /// Certificate bytes were absent or empty, or no certificate was reported.
    MalformedIdentity,
    /// More than one certificate claims to have signed the binary.
    AmbiguousSigning,
    /// Installer identity did not satisfy the trust policy.
    UntrustedInstaller,
    /// The computed fingerprint differs from the expected one.
    FingerprintMismatch,
    /// The identity source failed to answer.
    IdentitySourceUnavailable,
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationError::MalformedIdentity => write!(f, "Malformed signing identity"),
            VerificationError::AmbiguousSigning => write!(f, "Ambiguous signing certificate set"),
            VerificationError::UntrustedInstaller => write!(f, "Untrusted installer"),
            VerificationError::FingerprintMismatch => write!(f, "Fingerprint mismatch"),
            VerificationError::IdentitySourceUnavailable => write!(f, "Identity source unavailable"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VerificationError {}
