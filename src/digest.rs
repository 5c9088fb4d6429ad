use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// Supported digest algorithms for checksum computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// SHA-256 checksum
    Sha256,
    /// SHA-512 checksum
    Sha512,
}

impl DigestAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(format!(
                "Unknown digest algorithm '{}'. Supported: sha256, sha512",
                s
            )),
        }
    }
}

enum DigestState {
    Sha256(Sha256),
    Sha512(Sha512),
}

/// Writer wrapper that hashes every byte it forwards
pub struct DigestWriter<W: Write> {
    inner: W,
    state: DigestState,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W, algorithm: DigestAlgorithm) -> Self {
        let state = match algorithm {
            DigestAlgorithm::Sha256 => DigestState::Sha256(Sha256::new()),
            DigestAlgorithm::Sha512 => DigestState::Sha512(Sha512::new()),
        };
        DigestWriter { inner, state }
    }

    /// Finalize the digest, returning the inner writer and the hex checksum
    pub fn finalize(self) -> (W, String) {
        let checksum = match self.state {
            DigestState::Sha256(hasher) => hex::encode(hasher.finalize()),
            DigestState::Sha512(hasher) => hex::encode(hasher.finalize()),
        };
        (self.inner, checksum)
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Only hash what the inner writer accepted
        let n = self.inner.write(buf)?;
        match &mut self.state {
            DigestState::Sha256(hasher) => hasher.update(&buf[..n]),
            DigestState::Sha512(hasher) => hasher.update(&buf[..n]),
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
