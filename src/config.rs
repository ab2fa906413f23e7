//! Verifier configuration.
//!
//! A [`TamperingConfig`] is built once, validated up front and then handed to
//! [`crate::TamperingVerifier::new`]. Nothing in it changes afterwards.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::binary_verify::digest::{DigestAlgorithm, Fingerprint};
use crate::PLAY_STORE_INSTALLER;

/// Errors raised while building a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Expected fingerprint is empty or whitespace.
    EmptyFingerprint,
    /// Expected fingerprint is not base64 of the configured digest length.
    MalformedFingerprint,
    /// A trusted installer id is empty.
    EmptyInstallerId,
    /// Configuration document could not be parsed.
    InvalidDocument,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyFingerprint => write!(f, "Expected fingerprint is empty"),
            ConfigError::MalformedFingerprint => write!(f, "Expected fingerprint is malformed"),
            ConfigError::EmptyInstallerId => write!(f, "Trusted installer id is empty"),
            ConfigError::InvalidDocument => write!(f, "Invalid configuration document"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// How an installer id is compared against the trusted ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InstallerMatch {
    /// Installer id starts with a trusted id.
    #[default]
    Prefix,
    /// Installer id equals a trusted id.
    Exact,
}

/// Installation provenance requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPolicy {
    /// Whether the installer identity is checked at all.
    pub enforce_trusted_installer: bool,
    /// Installer ids accepted when enforcement is on.
    pub trusted_installer_ids: Vec<String>,
    pub installer_match: InstallerMatch,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            enforce_trusted_installer: false,
            trusted_installer_ids: vec![String::from(PLAY_STORE_INSTALLER)],
            installer_match: InstallerMatch::Prefix,
        }
    }
}

/// Immutable verifier configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TamperingConfig {
    expected_fingerprint: Fingerprint,
    policy: TrustPolicy,
}

impl TamperingConfig {
    /// Starts a configuration that expects `expected_fingerprint`.
    pub fn builder(expected_fingerprint: impl Into<String>) -> TamperingConfigBuilder {
        TamperingConfigBuilder::new(expected_fingerprint)
    }

    pub fn expected_fingerprint(&self) -> &Fingerprint {
        &self.expected_fingerprint
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.expected_fingerprint.algorithm()
    }

    /// Reads a configuration from a JSON document.
    ///
    /// Fields: `expected_fingerprint` (required), `enforce_trusted_installer`,
    /// `trusted_installer_ids`, `installer_match` (`"prefix"` | `"exact"`),
    /// `digest_algorithm` (`"sha1"` | `"sha256"` | `"blake3"`). Omitted fields
    /// take the builder defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument =
            serde_json::from_str(document).map_err(|_| ConfigError::InvalidDocument)?;

        let mut builder = TamperingConfigBuilder::new(doc.expected_fingerprint)
            .enforce_trusted_installer(doc.enforce_trusted_installer)
            .installer_match(doc.installer_match)
            .digest_algorithm(doc.digest_algorithm);
        for id in doc.trusted_installer_ids {
            builder = builder.trusted_installer(id);
        }
        builder.build()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    expected_fingerprint: String,
    #[serde(default)]
    enforce_trusted_installer: bool,
    #[serde(default)]
    trusted_installer_ids: Vec<String>,
    #[serde(default)]
    installer_match: InstallerMatch,
    #[serde(default)]
    digest_algorithm: DigestAlgorithm,
}

/// Builder for [`TamperingConfig`].
#[derive(Debug, Clone)]
pub struct TamperingConfigBuilder {
    expected_fingerprint: String,
    enforce_trusted_installer: bool,
    trusted_installer_ids: Vec<String>,
    installer_match: InstallerMatch,
    digest_algorithm: DigestAlgorithm,
}

impl TamperingConfigBuilder {
    pub fn new(expected_fingerprint: impl Into<String>) -> Self {
        Self {
            expected_fingerprint: expected_fingerprint.into(),
            enforce_trusted_installer: false,
            trusted_installer_ids: Vec::new(),
            installer_match: InstallerMatch::default(),
            digest_algorithm: DigestAlgorithm::default(),
        }
    }

    /// Only accept installs from a trusted installer. Defaults to `false`.
    pub fn enforce_trusted_installer(mut self, enforce: bool) -> Self {
        self.enforce_trusted_installer = enforce;
        self
    }

    /// Adds a trusted installer id. When none is added the official store id
    /// is used.
    pub fn trusted_installer(mut self, id: impl Into<String>) -> Self {
        self.trusted_installer_ids.push(id.into());
        self
    }

    pub fn installer_match(mut self, mode: InstallerMatch) -> Self {
        self.installer_match = mode;
        self
    }

    /// Digest the expected fingerprint was produced with. Defaults to SHA-256.
    pub fn digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = algorithm;
        self
    }

    pub fn build(self) -> Result<TamperingConfig, ConfigError> {
        let expected_fingerprint =
            Fingerprint::parse(self.digest_algorithm, &self.expected_fingerprint)?;

        let trusted_installer_ids = if self.trusted_installer_ids.is_empty() {
            vec![String::from(PLAY_STORE_INSTALLER)]
        } else {
            if self.trusted_installer_ids.iter().any(|id| id.trim().is_empty()) {
                return Err(ConfigError::EmptyInstallerId);
            }
            self.trusted_installer_ids
        };

        Ok(TamperingConfig {
            expected_fingerprint,
            policy: TrustPolicy {
                enforce_trusted_installer: self.enforce_trusted_installer,
                trusted_installer_ids,
                installer_match: self.installer_match,
            },
        })
    }
}
