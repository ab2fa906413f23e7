//! Host platform boundary.
//!
//! The verifier never asks the operating system directly; it consumes an
//! [`IdentitySource`]. Everything a source returns is treated as untrusted.

#[cfg(feature = "std")]
pub mod pc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    NotSupported,
    AccessDenied,
    NotFound,
    IOError,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::NotSupported => write!(f, "Platform feature not supported"),
            PlatformError::AccessDenied => write!(f, "Access denied"),
            PlatformError::NotFound => write!(f, "Identity data not found"),
            PlatformError::IOError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlatformError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => PlatformError::NotFound,
            std::io::ErrorKind::PermissionDenied => PlatformError::AccessDenied,
            _ => PlatformError::IOError,
        }
    }
}

/// Raw bytes of one certificate claimed to have signed the binary.
///
/// The bytes are wiped when the certificate is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningCertificate {
    der: Zeroizing<Vec<u8>>,
}

impl SigningCertificate {
    pub fn new(der: Vec<u8>) -> Self {
        Self {
            der: Zeroizing::new(der),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    pub fn len(&self) -> usize {
        self.der.len()
    }

    pub fn is_empty(&self) -> bool {
        self.der.is_empty()
    }
}

impl From<&[u8]> for SigningCertificate {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<Vec<u8>> for SigningCertificate {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

// Certificate contents are never printed.
impl fmt::Debug for SigningCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCertificate")
            .field("len", &self.der.len())
            .finish()
    }
}

/// Supplies the running binary's signing identity.
pub trait IdentitySource {
    /// Every certificate reported as having signed the binary, in platform order.
    fn signing_certificates(&self) -> Result<Vec<SigningCertificate>, PlatformError>;

    /// Identifier of the installer, `None` when unknown or side-loaded.
    fn installer_identity(&self) -> Result<Option<String>, PlatformError>;
}

impl<T: IdentitySource + ?Sized> IdentitySource for &T {
    fn signing_certificates(&self) -> Result<Vec<SigningCertificate>, PlatformError> {
        (**self).signing_certificates()
    }

    fn installer_identity(&self) -> Result<Option<String>, PlatformError> {
        (**self).installer_identity()
    }
}

impl<T: IdentitySource + ?Sized> IdentitySource for Box<T> {
    fn signing_certificates(&self) -> Result<Vec<SigningCertificate>, PlatformError> {
        (**self).signing_certificates()
    }

    fn installer_identity(&self) -> Result<Option<String>, PlatformError> {
        (**self).installer_identity()
    }
}

impl<T: IdentitySource + ?Sized> IdentitySource for alloc::sync::Arc<T> {
    fn signing_certificates(&self) -> Result<Vec<SigningCertificate>, PlatformError> {
        (**self).signing_certificates()
    }

    fn installer_identity(&self) -> Result<Option<String>, PlatformError> {
        (**self).installer_identity()
    }
}

/// Identity handed over by the host, e.g. collected through a JNI bridge.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    certificates: Vec<SigningCertificate>,
    installer: Option<String>,
}

impl StaticIdentity {
    pub fn new(certificates: Vec<SigningCertificate>, installer: Option<String>) -> Self {
        Self {
            certificates,
            installer,
        }
    }

    /// A single certificate with no installer.
    pub fn single(certificate: impl Into<SigningCertificate>) -> Self {
        Self::new(alloc::vec![certificate.into()], None)
    }

    pub fn with_installer(mut self, installer: impl Into<String>) -> Self {
        self.installer = Some(installer.into());
        self
    }
}

impl IdentitySource for StaticIdentity {
    fn signing_certificates(&self) -> Result<Vec<SigningCertificate>, PlatformError> {
        Ok(self.certificates.clone())
    }

    fn installer_identity(&self) -> Result<Option<String>, PlatformError> {
        Ok(self.installer.clone())
    }
}
