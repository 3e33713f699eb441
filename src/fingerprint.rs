//! Content fingerprints for change detection.
//!
//! A [`Fingerprint`] is the SHA-256 digest of a file's full content, or the
//! [`Fingerprint::Empty`] sentinel when the file could not be read. Only the
//! bytes matter: timestamp or permission changes never alter a fingerprint.

use anyhow::Result;
use memmap2::MmapOptions;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Files at least this large are hashed through a memory map.
pub const DEFAULT_MMAP_THRESHOLD: u64 = 1_048_576;

/// Digest of a file's content at one point in time.
///
/// The derived `PartialEq` is structural and exists for round-tripping; use
/// [`Fingerprint::matches`] to decide whether content is unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// SHA-256 over the full content
    Digest([u8; 32]),
    /// The file could not be read when the fingerprint was taken
    Empty,
}

impl Fingerprint {
    /// Whether two fingerprints prove identical content.
    ///
    /// `Empty` matches nothing, not even another `Empty`, so a file that was
    /// or is unreadable is always reported as modified.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Digest(a), Self::Digest(b)) => a == b,
            _ => false,
        }
    }

    /// Whether this is the unreadable-file sentinel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Empty => Ok(()),
        }
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest(_) => write!(f, "Fingerprint({self})"),
            Self::Empty => write!(f, "Fingerprint(EMPTY)"),
        }
    }
}

/// Error parsing a fingerprint from its hex form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintParseError {
    /// Neither empty nor 64 characters
    InvalidLength(usize),
    /// Contained a non-hex character
    InvalidHex,
}

impl fmt::Display for FingerprintParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(len) => write!(f, "expected 64 hex characters, got {len}"),
            Self::InvalidHex => write!(f, "invalid hex character"),
        }
    }
}

impl std::error::Error for FingerprintParseError {}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::Empty);
        }
        if s.len() != 64 {
            return Err(FingerprintParseError::InvalidLength(s.len()));
        }
        // from_str_radix would also take a sign
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FingerprintParseError::InvalidHex);
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex = std::str::from_utf8(chunk).map_err(|_| FingerprintParseError::InvalidHex)?;
            bytes[i] = u8::from_str_radix(hex, 16).map_err(|_| FingerprintParseError::InvalidHex)?;
        }
        Ok(Self::Digest(bytes))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Fingerprint of an in-memory buffer.
#[must_use]
pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    Fingerprint::Digest(Sha256::digest(data).into())
}

/// Computes file fingerprints, memory-mapping large files.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    mmap_threshold: u64,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(DEFAULT_MMAP_THRESHOLD)
    }
}

impl Fingerprinter {
    /// Creates a fingerprinter that maps files of `mmap_threshold` bytes or more.
    #[must_use]
    pub const fn new(mmap_threshold: u64) -> Self {
        Self { mmap_threshold }
    }

    /// Fingerprints `path`, degrading to [`Fingerprint::Empty`] on any read failure.
    #[must_use]
    pub fn fingerprint(&self, path: &Path) -> Fingerprint {
        match self.try_fingerprint(path) {
            Ok(fp) => fp,
            Err(e) => {
                tracing::debug!("cannot fingerprint {}: {e}", path.display());
                Fingerprint::Empty
            }
        }
    }

    /// Fingerprints `path`, reporting why reading failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, mapped, or read.
    pub fn try_fingerprint(&self, path: &Path) -> Result<Fingerprint> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();

        if len == 0 {
            return Ok(fingerprint_bytes(b""));
        }

        if len >= self.mmap_threshold {
            // SAFETY: the map is read-only and dropped before returning; a
            // concurrent writer can at worst yield a digest of mixed content,
            // which is reported as a modification.
            let mmap = unsafe { MmapOptions::new().map(&file)? };
            return Ok(fingerprint_bytes(&mmap));
        }

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 65536];
        loop {
            let bytes_read = file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
        Ok(Fingerprint::Digest(hasher.finalize().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fingerprint_bytes_stable() {
        let a = fingerprint_bytes(b"Hello, World!");
        let b = fingerprint_bytes(b"Hello, World!");
        assert!(a.matches(&b));
        assert_eq!(a.to_string().len(), 64);
        assert!(!a.matches(&fingerprint_bytes(b"Different data")));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            fingerprint_bytes(b"").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_file_matches_bytes() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "A")?;

        let fp = Fingerprinter::default().try_fingerprint(&path)?;
        assert!(fp.matches(&fingerprint_bytes(b"A")));
        Ok(())
    }

    #[test]
    fn test_mmap_and_streaming_agree() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![7u8; 4096])?;

        let mapped = Fingerprinter::new(1).try_fingerprint(&path)?;
        let streamed = Fingerprinter::new(u64::MAX).try_fingerprint(&path)?;
        assert!(mapped.matches(&streamed));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let fp = Fingerprinter::default().fingerprint(&dir.path().join("missing"));
        assert!(fp.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_never_matches() {
        let real = fingerprint_bytes(b"A");
        assert!(!Fingerprint::Empty.matches(&real));
        assert!(!real.matches(&Fingerprint::Empty));
        // Two unreadable observations are not evidence of unchanged content
        assert!(!Fingerprint::Empty.matches(&Fingerprint::Empty));
    }

    #[test]
    fn test_hex_parse() {
        let fp = fingerprint_bytes(b"A");
        let parsed: Fingerprint = fp.to_string().parse().expect("should parse");
        assert_eq!(fp, parsed);
        assert_eq!("".parse::<Fingerprint>(), Ok(Fingerprint::Empty));
        assert_eq!(
            "abc".parse::<Fingerprint>(),
            Err(FingerprintParseError::InvalidLength(3))
        );
        assert_eq!(
            "zz".repeat(32).parse::<Fingerprint>(),
            Err(FingerprintParseError::InvalidHex)
        );
    }

    #[test]
    fn test_hex_parse_rejects_signs() {
        let signed = format!("+f{}", "0".repeat(62));
        assert_eq!(
            signed.parse::<Fingerprint>(),
            Err(FingerprintParseError::InvalidHex)
        );
        let negative = format!("{}-1", "0".repeat(62));
        assert!(negative.parse::<Fingerprint>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Fingerprint::Empty).expect("serialize");
        assert_eq!(json, "\"\"");
        let fp: Fingerprint = serde_json::from_str(&json).expect("deserialize");
        assert!(fp.is_empty());
    }
}
