use crate::domain::error::RandomnessError;

/// Source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), RandomnessError>;
}
