pub mod random;

use pinhole_core::ShortCode;

pub use random::{Error, RandomGenerator, RandomGeneratorSettings};

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Candidates may collide with codes already in use; the caller checks the
/// table and asks again.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;
    /// Generates the next candidate code.
    fn generate(&self) -> Self::Output;
}
