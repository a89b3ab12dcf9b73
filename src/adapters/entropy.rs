use crate::domain::error::RandomnessError;
use crate::ports::entropy::EntropySource;
use rand::rngs::OsRng;
use rand::TryRngCore;

/// Entropy straight from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), RandomnessError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| RandomnessError(e.to_string()))
    }
}
