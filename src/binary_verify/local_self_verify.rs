//! Self-verification of the running binary's signing identity.
//!
//! # Checks, in order
//! 1. Installer provenance (only when enforced; cheapest, fails fast).
//! 2. Exactly one signing certificate.
//! 3. Fingerprint of that certificate equals the expected one, ignoring case.
//!
//! Any failure, including a failing or panicking identity source, yields an
//! invalid verdict. The caller is never told which check failed.

use super::digest::DigestEncoder;
use super::provenance::is_trusted_installer;
use super::VerificationError;
use crate::config::TamperingConfig;
use crate::platform::IdentitySource;

/// Outcome of one verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    valid: bool,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Checks that the running binary is signed and installed as configured.
///
/// Holds no mutable state; one instance can be shared between threads and
/// every call queries the source afresh.
pub struct TamperingVerifier<S> {
    config: TamperingConfig,
    encoder: DigestEncoder,
    source: S,
}

impl<S: IdentitySource> TamperingVerifier<S> {
    pub fn new(config: TamperingConfig, source: S) -> Self {
        let encoder = DigestEncoder::new(config.digest_algorithm());
        Self {
            config,
            encoder,
            source,
        }
    }

    pub fn config(&self) -> &TamperingConfig {
        &self.config
    }

    /// Returns `true` if the binary is not tampered.
    ///
    /// A panicking identity source is contained and counts as invalid, but the
    /// process-wide panic hook still runs first: with the default hook the
    /// panic message (and a backtrace under `RUST_BACKTRACE`) reaches stderr.
    /// Hosts that must stay silent install their own hook with
    /// `std::panic::set_hook` at startup.
    pub fn validate(&self) -> bool {
        self.verdict().is_valid()
    }

    pub fn verdict(&self) -> Verdict {
        match self.evaluate() {
            Ok(()) => Verdict { valid: true },
            Err(reason) => {
                log::debug!("Signing identity check failed: {}", reason);
                Verdict { valid: false }
            }
        }
    }

    #[cfg(feature = "std")]
    pub(crate) fn evaluate(&self) -> Result<(), VerificationError> {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        catch_unwind(AssertUnwindSafe(|| self.run_checks()))
            .unwrap_or(Err(VerificationError::IdentitySourceUnavailable))
    }

    #[cfg(not(feature = "std"))]
    pub(crate) fn evaluate(&self) -> Result<(), VerificationError> {
        self.run_checks()
    }

    fn run_checks(&self) -> Result<(), VerificationError> {
        let policy = self.config.policy();
        if policy.enforce_trusted_installer {
            let installer = self
                .source
                .installer_identity()
                .map_err(|_| VerificationError::IdentitySourceUnavailable)?;
            if !is_trusted_installer(installer.as_deref(), policy) {
                return Err(VerificationError::UntrustedInstaller);
            }
        }

        let certificates = self
            .source
            .signing_certificates()
            .map_err(|_| VerificationError::IdentitySourceUnavailable)?;

        let certificate = match certificates.as_slice() {
            [single] => single,
            [] => return Err(VerificationError::MalformedIdentity),
            _ => return Err(VerificationError::AmbiguousSigning),
        };

        let fingerprint = self.encoder.encode(certificate.as_bytes())?;
        if self.config.expected_fingerprint().matches(fingerprint.as_str()) {
            Ok(())
        } else {
            Err(VerificationError::FingerprintMismatch)
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::binary_verify::digest::DigestAlgorithm;
    use crate::platform::{PlatformError, SigningCertificate, StaticIdentity};
    use std::cell::Cell;
    use std::sync::Arc;

    const CERT: [u8; 10] = [0x30, 0x82, 0x01, 0x0a, 0x02, 0x82, 0x01, 0x01, 0x00, 0xc3];
    const CERT_SHA256: &str = "ikZ6JxI+QnXI/Z0fjAz9KudTaNRPn9UP8jttoQScGIg=";
    const CERT_SHA1: &str = "e/YcReDd75hQA0dq9Gq7GY9QjIA=";
    const OTHER_SHA256: &str = "MAvhIZ8VFG8iu724qmjnSxi0Un3cjWYyyx6XkbMoOqo=";

    /// Mock source that counts queries and can be told to fail.
    #[derive(Default)]
    struct MockSource {
        certificates: Vec<Vec<u8>>,
        installer: Option<String>,
        fail_certificates: bool,
        fail_installer: bool,
        installer_queries: Cell<u32>,
        certificate_queries: Cell<u32>,
    }

    impl IdentitySource for MockSource {
        fn signing_certificates(&self) -> Result<Vec<SigningCertificate>, PlatformError> {
            self.certificate_queries.set(self.certificate_queries.get() + 1);
            if self.fail_certificates {
                return Err(PlatformError::AccessDenied);
            }
            Ok(self.certificates.iter().cloned().map(SigningCertificate::new).collect())
        }

        fn installer_identity(&self) -> Result<Option<String>, PlatformError> {
            self.installer_queries.set(self.installer_queries.get() + 1);
            if self.fail_installer {
                return Err(PlatformError::NotSupported);
            }
            Ok(self.installer.clone())
        }
    }

    struct PanickingSource;

    impl IdentitySource for PanickingSource {
        fn signing_certificates(&self) -> Result<Vec<SigningCertificate>, PlatformError> {
            panic!("platform bridge crashed");
        }

        fn installer_identity(&self) -> Result<Option<String>, PlatformError> {
            Ok(None)
        }
    }

    fn config(expected: &str) -> TamperingConfig {
        TamperingConfig::builder(expected).build().unwrap()
    }

    fn enforcing_config(expected: &str) -> TamperingConfig {
        TamperingConfig::builder(expected)
            .enforce_trusted_installer(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_matching_certificate_is_valid() {
        let verifier = TamperingVerifier::new(config(CERT_SHA256), StaticIdentity::single(&CERT[..]));
        assert!(verifier.validate());
        assert_eq!(verifier.evaluate(), Ok(()));
        assert_eq!(verifier.config().expected_fingerprint().as_str(), CERT_SHA256);
    }

    #[test]
    fn test_one_byte_change_is_invalid() {
        let mut altered = CERT;
        altered[9] = 0xc4;
        let verifier = TamperingVerifier::new(config(CERT_SHA256), StaticIdentity::single(&altered[..]));
        assert!(!verifier.validate());
        assert_eq!(verifier.evaluate(), Err(VerificationError::FingerprintMismatch));

        let verifier = TamperingVerifier::new(config(OTHER_SHA256), StaticIdentity::single(&altered[..]));
        assert!(verifier.validate());
    }

    #[test]
    fn test_case_only_difference_is_valid() {
        let upper = CERT_SHA256.to_ascii_uppercase();
        let lower = CERT_SHA256.to_ascii_lowercase();
        for expected in [upper.as_str(), lower.as_str()] {
            let verifier = TamperingVerifier::new(config(expected), StaticIdentity::single(&CERT[..]));
            assert!(verifier.validate(), "expected {} to match", expected);
        }
    }

    #[test]
    fn test_legacy_sha1_fingerprint() {
        let config = TamperingConfig::builder(CERT_SHA1)
            .digest_algorithm(DigestAlgorithm::Sha1)
            .build()
            .unwrap();
        let verifier = TamperingVerifier::new(config, StaticIdentity::single(&CERT[..]));
        assert!(verifier.validate());
    }

    #[test]
    fn test_zero_certificates_is_invalid() {
        let verifier = TamperingVerifier::new(config(CERT_SHA256), StaticIdentity::default());
        assert!(!verifier.validate());
        assert_eq!(verifier.evaluate(), Err(VerificationError::MalformedIdentity));
    }

    #[test]
    fn test_multiple_certificates_are_invalid() {
        // Both certificates match; ambiguity alone fails the check.
        let source = StaticIdentity::new(
            vec![SigningCertificate::from(&CERT[..]), SigningCertificate::from(&CERT[..])],
            None,
        );
        let verifier = TamperingVerifier::new(config(CERT_SHA256), source);
        assert!(!verifier.validate());
        assert_eq!(verifier.evaluate(), Err(VerificationError::AmbiguousSigning));
    }

    #[test]
    fn test_empty_certificate_is_malformed() {
        let verifier = TamperingVerifier::new(config(CERT_SHA256), StaticIdentity::single(Vec::<u8>::new()));
        assert_eq!(verifier.evaluate(), Err(VerificationError::MalformedIdentity));
    }

    #[test]
    fn test_absent_installer_rejected_when_enforced() {
        let source = MockSource {
            certificates: vec![CERT.to_vec()],
            ..Default::default()
        };
        let verifier = TamperingVerifier::new(enforcing_config(CERT_SHA256), &source);
        assert!(!verifier.validate());
        assert_eq!(verifier.evaluate(), Err(VerificationError::UntrustedInstaller));
        // Provenance fails before certificates are fetched.
        assert_eq!(source.certificate_queries.get(), 0);
    }

    #[test]
    fn test_trusted_installer_accepted_when_enforced() {
        let source = StaticIdentity::single(&CERT[..]).with_installer("com.android.vending");
        let verifier = TamperingVerifier::new(enforcing_config(CERT_SHA256), source);
        assert!(verifier.validate());

        let source = StaticIdentity::single(&CERT[..]).with_installer("com.android.packageinstaller");
        let verifier = TamperingVerifier::new(enforcing_config(CERT_SHA256), source);
        assert!(!verifier.validate());
    }

    #[test]
    fn test_installer_not_consulted_when_not_enforced() {
        let source = MockSource {
            certificates: vec![CERT.to_vec()],
            fail_installer: true,
            ..Default::default()
        };
        let verifier = TamperingVerifier::new(config(CERT_SHA256), &source);
        assert!(verifier.validate());
        assert_eq!(source.installer_queries.get(), 0);
    }

    #[test]
    fn test_source_errors_fail_closed() {
        let source = MockSource {
            fail_certificates: true,
            ..Default::default()
        };
        let verifier = TamperingVerifier::new(config(CERT_SHA256), &source);
        assert!(!verifier.validate());
        assert_eq!(verifier.evaluate(), Err(VerificationError::IdentitySourceUnavailable));

        let source = MockSource {
            certificates: vec![CERT.to_vec()],
            fail_installer: true,
            ..Default::default()
        };
        let verifier = TamperingVerifier::new(enforcing_config(CERT_SHA256), &source);
        assert_eq!(verifier.evaluate(), Err(VerificationError::IdentitySourceUnavailable));
    }

    #[test]
    fn test_panicking_source_fails_closed() {
        let verifier = TamperingVerifier::new(config(CERT_SHA256), PanickingSource);
        assert!(!verifier.validate());
        assert_eq!(verifier.evaluate(), Err(VerificationError::IdentitySourceUnavailable));
    }

    #[test]
    fn test_fresh_query_per_call() {
        let source = MockSource {
            certificates: vec![CERT.to_vec()],
            ..Default::default()
        };
        let verifier = TamperingVerifier::new(config(CERT_SHA256), &source);
        assert!(verifier.validate());
        assert!(verifier.validate());
        assert_eq!(source.certificate_queries.get(), 2);
    }

    #[test]
    fn test_concurrent_validation() {
        let source = Arc::new(StaticIdentity::single(&CERT[..]));
        let verifier = Arc::new(TamperingVerifier::new(config(CERT_SHA256), source));

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let verifier = Arc::clone(&verifier);
                    scope.spawn(move || verifier.validate())
                })
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap());
            }
        });
    }
}
