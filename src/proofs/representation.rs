/*!
Proofs of knowledge of a representation: given bases `g_1, ..., g_k` of a
cyclic group and a public `y = g_1^{x_1} * ... * g_k^{x_k}`, the prover
demonstrates knowledge of the exponents `x_i`.

## Intuition

This is the generalized Schnorr protocol \[1\], leaving the challenge phase
undefined so it can run interactively or under Fiat-Shamir.

The protocol has three phases.

1. *Commit*. The prover samples one mask `r_i` per secret from the
   randomness space appropriate to the group and sends
   `t = g_1^{r_1} * ... * g_k^{r_k}`. The output of this step is described
   by [`RepresentationProofBuilder`].

2. *Challenge*. The verifier samples a uniform challenge from `[0, 2^κ)`,
   or both parties derive one by hashing the transcript; see
   [`Challenge`](crate::challenge::Challenge).

3. *Response*. The prover sends `z_i = r_i + c * x_i`, reduced modulo the
   group order in a prime-order group and kept as an unbounded integer in a
   hidden-order group (reducing modulo any public value there would leak).

The verifier accepts when `g_1^{z_1} * ... * g_k^{z_k} = y^c * t`.

Proofs that need per-secret bit-length bounds (credential issuance and
presentation) use the
[bounded variant](RepresentationProofBuilder::generate_proof_commitments_with_bounds),
which samples each mask from `[0, 2^{b_i})`, optionally two-sided.

## References

1. C. P. Schnorr. Efficient signature generation by smart cards. Journal of
   Cryptology, 4(3):161-174, Jan 1991.
*/

use crate::arith::{pow2, random_also_neg, random_below};
use crate::challenge::{Challenge, ChallengeBuilder, ChallengeDigest};
use crate::groups::CyclicGroup;
use crate::{Error, Rng};
use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};

/// A partially-built [`RepresentationProof`].
///
/// Built up to (but not including) the challenge phase.
#[derive(Debug)]
pub struct RepresentationProofBuilder<'a, G: CyclicGroup> {
    group: &'a G,
    bases: Vec<BigInt>,
    masks: Vec<BigInt>,
    /// Commitment to the masks, `t = prod g_i^{r_i}`.
    mask_commitment: BigInt,
}

impl<'a, G: CyclicGroup> RepresentationProofBuilder<'a, G> {
    /// Run the commitment phase, sampling each mask from the group's
    /// randomness space for a challenge space of `challenge_bits` bits.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        group: &'a G,
        bases: &[BigInt],
        challenge_bits: usize,
    ) -> Self {
        let masks: Vec<BigInt> = bases
            .iter()
            .map(|_| group.sample_mask(&mut *rng, challenge_bits))
            .collect();
        Self::from_masks(group, bases, masks)
    }

    /// Run the commitment phase with a per-secret bit bound on each mask:
    /// `r_i` is sampled from `[0, 2^{bounds[i]})`, or from
    /// `(-2^{bounds[i]}, 2^{bounds[i]})` when `two_sided` is set.
    pub fn generate_proof_commitments_with_bounds(
        rng: &mut impl Rng,
        group: &'a G,
        bases: &[BigInt],
        bounds: &[usize],
        two_sided: bool,
    ) -> Result<Self, Error> {
        if bases.len() != bounds.len() {
            return Err(Error::LengthMismatch {
                expected: bases.len(),
                got: bounds.len(),
            });
        }
        let masks: Vec<BigInt> = bounds
            .iter()
            .map(|&bits| {
                let bound = pow2(bits);
                if two_sided {
                    random_also_neg(&mut *rng, &bound)
                } else {
                    random_below(&mut *rng, &bound)
                }
            })
            .collect();
        Ok(Self::from_masks(group, bases, masks))
    }

    fn from_masks(group: &'a G, bases: &[BigInt], masks: Vec<BigInt>) -> Self {
        let mask_commitment = bases
            .iter()
            .zip(&masks)
            .fold(BigInt::one(), |acc, (base, mask)| {
                group.mul(&acc, &group.exp(base, mask))
            });
        RepresentationProofBuilder {
            group,
            bases: bases.to_vec(),
            masks,
            mask_commitment,
        }
    }

    /// The round-one message `t`.
    pub fn mask_commitment(&self) -> &BigInt {
        &self.mask_commitment
    }

    /// Run the response phase to complete the proof:
    /// `z_i = r_i + c * x_i`, reduced the way the group requires.
    pub fn generate_proof_response(
        self,
        secrets: &[BigInt],
        challenge: &Challenge,
    ) -> Result<RepresentationProof, Error> {
        if secrets.len() != self.masks.len() {
            return Err(Error::LengthMismatch {
                expected: self.masks.len(),
                got: secrets.len(),
            });
        }
        let responses = self
            .masks
            .iter()
            .zip(secrets)
            .map(|(mask, secret)| {
                self.group
                    .reduce_response(mask + challenge.as_integer() * secret)
            })
            .collect();
        Ok(RepresentationProof {
            mask_commitment: self.mask_commitment,
            responses,
        })
    }
}

/// Fully constructed proof of knowledge of a representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentationProof {
    /// The commitment to the masks, `t`.
    pub mask_commitment: BigInt,
    /// The response values, one per base.
    pub responses: Vec<BigInt>,
}

impl RepresentationProof {
    /// Verify knowledge of a representation of `y` over `bases`:
    /// `prod g_i^{z_i} = y^c * t`.
    pub fn verify<G: CyclicGroup>(
        &self,
        group: &G,
        bases: &[BigInt],
        y: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        if bases.len() != self.responses.len() {
            return false;
        }
        let lhs = bases
            .iter()
            .zip(&self.responses)
            .fold(BigInt::one(), |acc, (base, z)| {
                group.mul(&acc, &group.exp(base, z))
            });
        let rhs = group.mul(
            &group.exp(y, challenge.as_integer()),
            &self.mask_commitment,
        );
        lhs == rhs
    }
}

impl<'a, G: CyclicGroup> ChallengeDigest for RepresentationProofBuilder<'a, G> {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(&self.mask_commitment);
    }
}

impl ChallengeDigest for RepresentationProof {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(&self.mask_commitment);
    }
}
