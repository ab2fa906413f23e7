//! Developer setup aid.
//!
//! [`report_certificate_fingerprint`] logs the fingerprint of the current
//! signing certificate so it can be copied into the verifier configuration.
//! Run it once on a development build; it is not part of the validation path
//! and must not ship enabled on end-user devices.

use crate::binary_verify::digest::{DigestAlgorithm, DigestEncoder, Fingerprint};
use crate::binary_verify::VerificationError;
use crate::platform::IdentitySource;

/// Computes and logs the fingerprint of the binary's signing certificate.
///
/// The base64 form goes into the configuration; the hex form is printed for
/// comparison with platform tooling. Nothing is logged for an ambiguous set.
pub fn report_certificate_fingerprint<S: IdentitySource + ?Sized>(
    source: &S,
    algorithm: DigestAlgorithm,
) -> Result<Fingerprint, VerificationError> {
    let certificates = source
        .signing_certificates()
        .map_err(|_| VerificationError::IdentitySourceUnavailable)?;

    let certificate = match certificates.as_slice() {
        [single] => single,
        [] => {
            log::warn!("No signing certificate reported; nothing to fingerprint");
            return Err(VerificationError::MalformedIdentity);
        }
        many => {
            log::warn!(
                "{} signing certificates reported; the binary may have been re-signed",
                many.len()
            );
            return Err(VerificationError::AmbiguousSigning);
        }
    };

    let fingerprint = DigestEncoder::new(algorithm).encode(certificate.as_bytes())?;
    log::info!(
        "\n\n___________\n{} certificate fingerprint\nbase64: {}\nhex:    {}\n___________\n",
        algorithm,
        fingerprint,
        fingerprint.to_hex().as_deref().unwrap_or("-")
    );
    Ok(fingerprint)
}
