use crate::Generator;
use parking_lot::Mutex;
use pinhole_core::ShortCode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use thiserror::Error;
use typed_builder::TypedBuilder;

/// `A-Z`, `a-z`, `0-9`.
pub const DEFAULT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const DEFAULT_LENGTH: usize = 6;
const MAX_LENGTH: usize = 64;

/// Errors returned when building a [`RandomGenerator`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("code length must be between 1 and 64, got {0}")]
    InvalidLength(usize),
    #[error("alphabet must not be empty")]
    EmptyAlphabet,
    #[error("alphabet character {0:?} is not allowed in a short code")]
    InvalidCharacter(char),
    #[error("alphabet character {0:?} appears more than once")]
    DuplicateCharacter(char),
}

/// Configures a [`RandomGenerator`] instance.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomGeneratorSettings {
    /// Number of characters per code.
    #[builder(default = DEFAULT_LENGTH)]
    pub length: usize,
    /// Characters codes are drawn from. Must be distinct and valid in a short code.
    #[builder(default = DEFAULT_ALPHABET.to_string(), setter(into))]
    pub alphabet: String,
    /// Fixed seed for reproducible sequences. Seeded from the OS when unset.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

/// Draws each character of a code uniformly and independently from the alphabet.
///
/// With the defaults that is 62^6 (about 5.7e10) possible codes.
#[derive(Debug)]
pub struct RandomGenerator {
    alphabet: Vec<char>,
    length: usize,
    rng: Mutex<StdRng>,
}

impl RandomGenerator {
    /// Creates a generator after validating `settings`.
    pub fn new(settings: RandomGeneratorSettings) -> Result<Self, Error> {
        if settings.length == 0 || settings.length > MAX_LENGTH {
            return Err(Error::InvalidLength(settings.length));
        }

        let alphabet: Vec<char> = settings.alphabet.chars().collect();
        if alphabet.is_empty() {
            return Err(Error::EmptyAlphabet);
        }

        let mut seen = HashSet::with_capacity(alphabet.len());
        for &c in &alphabet {
            if !(c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                return Err(Error::InvalidCharacter(c));
            }
            if !seen.insert(c) {
                return Err(Error::DuplicateCharacter(c));
            }
        }

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            alphabet,
            length: settings.length,
            rng: Mutex::new(rng),
        })
    }

    /// Number of distinct codes this generator can produce, if it fits in a `u128`.
    pub fn keyspace(&self) -> Option<u128> {
        (self.alphabet.len() as u128).checked_pow(self.length as u32)
    }

    fn next_code(&self) -> String {
        let mut rng = self.rng.lock();
        (0..self.length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_LENGTH,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        ShortCode::new_unchecked(self.next_code())
    }
}
