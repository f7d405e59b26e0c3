/*!
Proof of knowledge of the opening of a Damgård-Fujisaki commitment: for a
public `c` the prover knows `(x, r)` with `c = G^x * H^r mod N`.

The masks live in ranges sized so that the responses statistically hide the
witness even though they are never reduced: the value mask comes from
`[0, T * 2^(|N| + κ))` and the randomness mask from `[0, 2^(B + |N| + κ))`,
where `T` bounds the committed value, `B = k + |N|` is the bit length of the
commitment randomness space, and `κ` is the challenge-space size in bits
(for the Fiat-Shamir variant, the hash output length joins κ).
*/

use crate::arith::{pow2, random_below};
use crate::challenge::{Challenge, ChallengeBuilder, ChallengeDigest};
use crate::damgard_fujisaki::DamgardFujisakiParameters;
use crate::groups::CyclicGroup;
use crate::Rng;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A partially-built [`OpeningProof`].
#[derive(Debug)]
pub struct OpeningProofBuilder {
    value_mask: BigInt,
    randomness_mask: BigInt,
    mask_commitment: BigInt,
}

impl OpeningProofBuilder {
    /// Run the commitment phase: sample the two masks and send
    /// `t = G^{m1} * H^{m2}`.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        params: &DamgardFujisakiParameters,
        challenge_bits: usize,
    ) -> Self {
        let n_bits = params.n().bits() as usize;
        let value_mask = random_below(rng, &(params.t() * pow2(n_bits + challenge_bits)));
        let randomness_mask = random_below(
            rng,
            &pow2(params.randomness_bits() + n_bits + challenge_bits),
        );
        let mask_commitment = params.compute_commit(&value_mask, &randomness_mask);
        OpeningProofBuilder {
            value_mask,
            randomness_mask,
            mask_commitment,
        }
    }

    /// The round-one message `t`.
    pub fn mask_commitment(&self) -> &BigInt {
        &self.mask_commitment
    }

    /// Run the response phase using the opening `(x, r)`: responses are
    /// `(m1 + c*x, m2 + c*r)` in `Z`.
    pub fn generate_proof_response(
        self,
        x: &BigInt,
        r: &BigInt,
        challenge: &Challenge,
    ) -> OpeningProof {
        let c = challenge.as_integer();
        OpeningProof {
            mask_commitment: self.mask_commitment,
            value_response: self.value_mask + c * x,
            randomness_response: self.randomness_mask + c * r,
        }
    }
}

/// Fully constructed proof of knowledge of a commitment opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningProof {
    /// The round-one message `t`.
    pub mask_commitment: BigInt,
    /// Response for the committed value.
    pub value_response: BigInt,
    /// Response for the commitment randomness.
    pub randomness_response: BigInt,
}

impl OpeningProof {
    /// Verify knowledge of an opening of `commitment`:
    /// `G^{s1} * H^{s2} = t * c^{challenge}`.
    pub fn verify(
        &self,
        params: &DamgardFujisakiParameters,
        commitment: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        let group = params.group();
        let lhs = params.compute_commit(&self.value_response, &self.randomness_response);
        let rhs = group.mul(
            &self.mask_commitment,
            &group.exp(commitment, challenge.as_integer()),
        );
        lhs == rhs
    }
}

impl ChallengeDigest for OpeningProofBuilder {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(&self.mask_commitment);
    }
}

impl ChallengeDigest for OpeningProof {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(&self.mask_commitment);
    }
}
