//! Desktop identity source backed by an unpacked signing block.
//!
//! Certificates are the `*.der` / `*.cer` files of a directory, read in file
//! name order. The installer identity, if any, is the first line of a marker
//! file written by the installer.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{IdentitySource, PlatformError, SigningCertificate};

/// Upper bound on a single certificate file.
const MAX_CERTIFICATE_BYTES: u64 = 1024 * 1024;

const CERTIFICATE_EXTENSIONS: [&str; 2] = ["der", "cer"];

pub struct DirectoryIdentity {
    certificate_dir: PathBuf,
    installer_marker: Option<PathBuf>,
}

impl DirectoryIdentity {
    pub fn new<P: AsRef<Path>>(certificate_dir: P) -> Self {
        Self {
            certificate_dir: certificate_dir.as_ref().to_path_buf(),
            installer_marker: None,
        }
    }

    /// File whose first line names the installer. A missing file means no
    /// installer is known.
    pub fn with_installer_marker<P: AsRef<Path>>(mut self, marker: P) -> Self {
        self.installer_marker = Some(marker.as_ref().to_path_buf());
        self
    }

    fn certificate_paths(&self) -> Result<Vec<PathBuf>, PlatformError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.certificate_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_certificate = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| {
                    CERTIFICATE_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
                .unwrap_or(false);
            if is_certificate {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn read_certificate(path: &Path) -> Result<SigningCertificate, PlatformError> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    if len > MAX_CERTIFICATE_BYTES {
        return Err(PlatformError::IOError);
    }

    // The file may grow after the metadata check.
    let buffer = read_capped(file, MAX_CERTIFICATE_BYTES, len as usize)?;
    Ok(SigningCertificate::new(buffer))
}

fn read_capped<R: Read>(reader: R, cap: u64, size_hint: usize) -> Result<Vec<u8>, PlatformError> {
    let mut buffer = Vec::with_capacity(size_hint);
    reader.take(cap + 1).read_to_end(&mut buffer)?;
    if buffer.len() as u64 > cap {
        return Err(PlatformError::IOError);
    }
    Ok(buffer)
}

impl IdentitySource for DirectoryIdentity {
    fn signing_certificates(&self) -> Result<Vec<SigningCertificate>, PlatformError> {
        self.certificate_paths()?
            .iter()
            .map(|path| read_certificate(path))
            .collect()
    }

    fn installer_identity(&self) -> Result<Option<String>, PlatformError> {
        let marker = match &self.installer_marker {
            Some(marker) => marker,
            None => return Ok(None),
        };

        let contents = match fs::read_to_string(marker) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let installer = contents.lines().next().unwrap_or("").trim();
        if installer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(installer.to_string()))
        }
    }
}
