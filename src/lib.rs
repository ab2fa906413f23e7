//! tamper-guard: runtime self-verification of an application's signing identity.
//!
//! An application calls [`TamperingVerifier::validate`] before trusting its own
//! execution. The check confirms that the binary is signed by exactly one
//! certificate whose fingerprint equals the value the developer configured, and
//! optionally that the binary was installed by a trusted distribution channel.
//!
//! # Modules
//! - `binary_verify`: digest encoding, provenance policy and the verifier itself.
//! - `config`: immutable verifier configuration and its builder.
//! - `platform`: the identity-source boundary and bundled sources.
//! - `utils`: developer setup aid that reports the current fingerprint.
//!
//! # Security
//! - **Fail closed**: every missing, ambiguous or erroring input yields `false`.
//! - **Opaque verdict**: callers learn only pass/fail, never which check failed.
//! - **Zeroization**: certificate bytes are wiped as soon as a check completes.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod binary_verify;
pub mod config;
pub mod platform;
pub mod utils;

pub use binary_verify::digest::{DigestAlgorithm, Fingerprint};
pub use binary_verify::local_self_verify::{TamperingVerifier, Verdict};
pub use binary_verify::VerificationError;
pub use config::{ConfigError, InstallerMatch, TamperingConfig, TamperingConfigBuilder, TrustPolicy};
pub use platform::{IdentitySource, PlatformError, SigningCertificate, StaticIdentity};

/// Installer identity reported for applications delivered by the official store.
pub const PLAY_STORE_INSTALLER: &str = "com.android.vending";
