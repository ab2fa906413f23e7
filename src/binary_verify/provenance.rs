//! Installation provenance policy.

use crate::config::{InstallerMatch, TrustPolicy};

/// Returns whether `installer_id` satisfies `policy`.
///
/// With enforcement disabled this is always `true`. Otherwise the installer
/// must be present, non-empty and match one trusted id under
/// `policy.installer_match`.
pub fn is_trusted_installer(installer_id: Option<&str>, policy: &TrustPolicy) -> bool {
    if !policy.enforce_trusted_installer {
        return true;
    }

    let installer = match installer_id {
        Some(id) if !id.is_empty() => id,
        _ => return false,
    };

    policy
        .trusted_installer_ids
        .iter()
        .filter(|trusted| !trusted.is_empty())
        .any(|trusted| match policy.installer_match {
            InstallerMatch::Prefix => installer.starts_with(trusted.as_str()),
            InstallerMatch::Exact => installer == trusted.as_str(),
        })
}
