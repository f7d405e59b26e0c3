//! Functionality for building challenge values.
//!
//! In the interactive Σ-protocols the verifier samples the challenge
//! uniformly from `[0, 2^κ)`. In the non-interactive (Fiat-Shamir) variant
//! both parties derive it by hashing a canonical byte concatenation of the
//! preceding transcript: every participating integer is converted to its
//! unsigned big-endian minimal-length byte form, the bytes are concatenated
//! in the order fixed by the protocol, and the concatenation is hashed with
//! SHA3-512. The digest, read as a big-endian nonnegative integer, is the
//! challenge; no modular reduction is applied. The transcript always starts
//! with a `context` value binding the long-lived public parameters of the
//! issuing party, which prevents cross-protocol substitution.

use crate::arith::{pow2, random_below};
use crate::Rng;
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_512};

/// A challenge for use in a Σ-protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge(pub(crate) BigInt);

impl Challenge {
    /// Sample a uniform challenge from `[0, 2^bits)`, as an interactive
    /// verifier does.
    pub fn random(rng: &mut impl Rng, bits: usize) -> Self {
        Challenge(random_below(rng, &pow2(bits)))
    }

    /// The challenge as an integer.
    pub fn as_integer(&self) -> &BigInt {
        &self.0
    }
}

/// A trait implemented by types which can feed their public components into
/// a [`ChallengeBuilder`].
pub trait ChallengeDigest {
    /// Incorporate public components of this type into a [`ChallengeBuilder`].
    fn digest(&self, builder: &mut ChallengeBuilder);
}

impl<'a, T: ChallengeDigest> ChallengeDigest for &'a T {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        (**self).digest(builder);
    }
}

impl ChallengeDigest for BigInt {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(self);
    }
}

/// Holds state used when building a [`Challenge`] using the Fiat-Shamir
/// heuristic, as in a non-interactive Schnorr proof.
#[derive(Debug)]
pub struct ChallengeBuilder {
    hasher: Sha3_512,
}

impl Default for ChallengeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeBuilder {
    /// Initialize a new, empty challenge.
    pub fn new() -> Self {
        Self {
            hasher: Sha3_512::new(),
        }
    }

    /// Incorporate public data from some given type into the challenge.
    pub fn digest<T: ChallengeDigest>(&mut self, object: &T) {
        object.digest(self);
    }

    /// A conveniently chainable variant of [`ChallengeBuilder::digest`].
    pub fn with<T: ChallengeDigest>(mut self, object: &T) -> Self {
        object.digest(&mut self);
        self
    }

    /// Incorporate a nonnegative integer into the challenge, in its
    /// canonical unsigned big-endian minimal-length form.
    pub fn digest_integer(&mut self, n: &BigInt) {
        debug_assert!(!n.is_negative(), "only nonnegative integers are hashed");
        if n.is_zero() {
            return;
        }
        let (_, bytes) = n.to_bytes_be();
        self.hasher.update(&bytes);
    }

    /// A conveniently chainable variant of [`ChallengeBuilder::digest_integer`].
    pub fn with_integer(mut self, n: &BigInt) -> Self {
        self.digest_integer(n);
        self
    }

    /// Incorporate arbitrary bytes into the challenge.
    pub fn digest_bytes(&mut self, bytes: impl AsRef<[u8]>) {
        self.hasher.update(bytes);
    }

    /// Consume the builder and generate a [`Challenge`] from the
    /// accumulated data.
    pub fn finish(self) -> Challenge {
        let digest = self.hasher.finalize();
        Challenge(BigInt::from_bytes_be(Sign::Plus, &digest))
    }
}
