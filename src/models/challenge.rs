//! Single-use verification challenge

use rand::rngs::OsRng;
use rand::RngCore;

/// Bytes of entropy per challenge
pub const CHALLENGE_BYTES: usize = 64;

/// A random token a callback must echo back verbatim.
///
/// Lives only inside one verification attempt and is dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge(String);

impl Challenge {
    /// Generate a fresh hex-encoded challenge from the OS RNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; CHALLENGE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact, byte-for-byte comparison with an echoed response body
    pub fn matches(&self, echoed: &str) -> bool {
        self.0 == echoed
    }
}

impl std::fmt::Display for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
