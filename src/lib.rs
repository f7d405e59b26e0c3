//! This crate includes cryptographic building blocks for privacy-preserving
//! authentication over arbitrary-precision integer groups:
//! - Pedersen commitments in a prime-order Schnorr subgroup.
//! - Damgård-Fujisaki integer commitments over the quadratic-residue subgroup
//!   of a special-RSA modulus.
//! - Schnorr-style zero-knowledge proofs of knowledge of a representation,
//!   commitment openings, equality, multiplication, and ranges.
//! - Camenisch-Lysyanskaya anonymous credentials with selective disclosure,
//!   tying the above together.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]

pub mod arith;
pub mod challenge;
pub mod cl;
pub mod damgard_fujisaki;
pub mod groups;
pub mod pedersen;
pub mod primes;
pub mod proofs;
pub mod squares;

use thiserror::Error;

/// A trait synonym for a cryptographically secure random number generator. This trait is
/// blanket-implemented for all valid types and will never need to be implemented by-hand.
pub trait Rng: rand::CryptoRng + rand::RngCore {}
impl<T: rand::CryptoRng + rand::RngCore> Rng for T {}

/// Error types that may arise from cryptographic operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Caused by an input value that lies outside the range the operation accepts.
    #[error("value is outside the allowed range")]
    OutsideRange,
    /// Caused by vectors (bases, secrets, responses, boundaries) of mismatched lengths.
    #[error("expected a vector of length {expected}, got {got}")]
    LengthMismatch {
        /// The length required by the parameters.
        expected: usize,
        /// The length that was provided.
        got: usize,
    },
    /// Caused by an attribute wider than the parameter set allows.
    #[error("attribute exceeds {0} bits")]
    AttributeTooWide(usize),
    /// Caused by moduli that are required to be coprime but are not.
    #[error("moduli are not coprime")]
    NotCoprime,
    /// Caused by a prime search that exhausted its attempt budget.
    #[error("prime generation failed within the attempt budget")]
    PrimeGenerationFailed,
    /// Caused by a group-generator search that exhausted its attempt budget.
    #[error("generator search failed within the attempt budget")]
    GeneratorSearchFailed,
    /// Caused by a sum-of-squares decomposition that exhausted its attempt budget.
    #[error("square decomposition failed within the attempt budget")]
    SquareDecompositionFailed,
    /// Caused by invoking a protocol operation out of order.
    #[error("operation invoked out of protocol order: {0}")]
    OutOfOrder(&'static str),
    /// A zero-knowledge or credential check returned false.
    ///
    /// Deliberately carries no detail about which sub-check failed.
    #[error("verification failed")]
    VerificationFailed,
}
