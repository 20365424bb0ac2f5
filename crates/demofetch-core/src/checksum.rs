//! Payload digests: MD5 for the legacy archive listings, SHA-256 otherwise.
//!
//! Digests are computed over the whole in-memory buffer after the transfer
//! completes, never inline with the download.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;

/// Hash function an expected digest was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    /// Length of the hex encoding of this algorithm's output.
    pub fn hex_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 32,
            DigestAlgorithm::Sha256 => 64,
        }
    }

    pub const ALL: [DigestAlgorithm; 2] = [DigestAlgorithm::Md5, DigestAlgorithm::Sha256];

    fn from_hex_len(len: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.hex_len() == len)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Md5 => f.write_str("md5"),
            DigestAlgorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

/// Validated expected digest. Stored lower-cased so comparison is
/// case-insensitive with respect to the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDigest {
    algorithm: DigestAlgorithm,
    hex: String,
}

impl ExpectedDigest {
    /// Parses a hex digest, inferring the algorithm from its length.
    pub fn parse(hex: &str) -> Result<Self, String> {
        let hex = hex.trim();
        let algorithm = DigestAlgorithm::from_hex_len(hex.len()).ok_or_else(|| {
            format!(
                "digest {:?} has {} hex chars; expected 32 (md5) or 64 (sha256)",
                hex,
                hex.len()
            )
        })?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("digest {:?} is not hexadecimal", hex));
        }
        Ok(Self {
            algorithm,
            hex: hex.to_ascii_lowercase(),
        })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    /// True if `actual_hex` denotes the same digest (case-insensitive).
    pub fn matches(&self, actual_hex: &str) -> bool {
        self.hex.eq_ignore_ascii_case(actual_hex)
    }
}

impl fmt::Display for ExpectedDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Compute the digest of `data` and return it as lowercase hex.
pub fn digest_hex(algorithm: DigestAlgorithm, data: &[u8]) -> String {
    match algorithm {
        DigestAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            hasher.update(data);
            hex::encode(hasher.finalize())
        }
        DigestAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(data);
            hex::encode(hasher.finalize())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_known_content() {
        assert_eq!(
            digest_hex(DigestAlgorithm::Md5, b""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            digest_hex(DigestAlgorithm::Md5, b"hello\n"),
            "b1946ac92492d2347c6235b4d2611184"
        );
    }

    #[test]
    fn sha256_known_content() {
        assert_eq!(
            digest_hex(DigestAlgorithm::Sha256, b"hello\n"),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn hex_len_matches_digest_output() {
        for algorithm in DigestAlgorithm::ALL {
            assert_eq!(digest_hex(algorithm, b"abc").len(), algorithm.hex_len());
            let parsed = ExpectedDigest::parse(&digest_hex(algorithm, b"abc")).unwrap();
            assert_eq!(parsed.algorithm(), algorithm);
        }
    }

    #[test]
    fn parse_infers_algorithm_from_length() {
        let md5 = ExpectedDigest::parse("7d770d38618e20796fbe642037f08de5").unwrap();
        assert_eq!(md5.algorithm(), DigestAlgorithm::Md5);
        let sha = ExpectedDigest::parse(
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        )
        .unwrap();
        assert_eq!(sha.algorithm(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn parse_lowercases_and_matches_case_insensitively() {
        let d = ExpectedDigest::parse("B1946AC92492D2347C6235B4D2611184").unwrap();
        assert_eq!(d.as_hex(), "b1946ac92492d2347c6235b4d2611184");
        assert!(d.matches("b1946ac92492d2347c6235b4d2611184"));
        assert!(d.matches("B1946ac92492d2347c6235b4d2611184"));
        assert!(!d.matches("d41d8cd98f00b204e9800998ecf8427e"));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(ExpectedDigest::parse("").is_err());
        assert!(ExpectedDigest::parse("abc123").is_err());
        assert!(ExpectedDigest::parse("zz770d38618e20796fbe642037f08de5").is_err());
    }
}
