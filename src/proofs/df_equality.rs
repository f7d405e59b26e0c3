/*!
Proof that two Damgård-Fujisaki commitments, possibly on different moduli,
hide the same value.

For `c1 = G1^x * H1^{r1} mod N1` and `c2 = G2^x * H2^{r2} mod N2` the prover
samples one masking witness `ρ` for the shared value and independent masks
`σ1, σ2` for the randomness, sends `t_i = G_i^ρ * H_i^{σ_i}`, and answers a
challenge `c` with `(s, u1, u2) = (ρ + c*x, σ1 + c*r1, σ2 + c*r2)` in `Z`.
The verifier accepts when `t_i * c_i^c = G_i^s * H_i^{u_i}` for both `i`;
sharing `s` across the two identities is what forces the committed values to
match.
*/

use crate::arith::{pow2, random_below};
use crate::challenge::{Challenge, ChallengeBuilder, ChallengeDigest};
use crate::damgard_fujisaki::DamgardFujisakiParameters;
use crate::groups::CyclicGroup;
use crate::Rng;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A partially-built [`EqualityProof`].
#[derive(Debug)]
pub struct EqualityProofBuilder {
    value_mask: BigInt,
    randomness_mask1: BigInt,
    randomness_mask2: BigInt,
    mask_commitment1: BigInt,
    mask_commitment2: BigInt,
}

impl EqualityProofBuilder {
    /// Run the commitment phase over both parameter sets.
    ///
    /// The shared value mask is drawn from `[0, T * 2^(|N| + κ))` and the
    /// randomness masks from `[0, 2^(B + 2|N| + κ))`, sized by the first
    /// parameter set.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        params1: &DamgardFujisakiParameters,
        params2: &DamgardFujisakiParameters,
        challenge_bits: usize,
    ) -> Self {
        let n_bits = params1.n().bits() as usize;
        let value_mask = random_below(rng, &(params1.t() * pow2(n_bits + challenge_bits)));
        let randomness_bound = pow2(params1.randomness_bits() + 2 * n_bits + challenge_bits);
        let randomness_mask1 = random_below(rng, &randomness_bound);
        let randomness_mask2 = random_below(rng, &randomness_bound);
        EqualityProofBuilder {
            mask_commitment1: params1.compute_commit(&value_mask, &randomness_mask1),
            mask_commitment2: params2.compute_commit(&value_mask, &randomness_mask2),
            value_mask,
            randomness_mask1,
            randomness_mask2,
        }
    }

    /// Run the response phase using the shared value and both randomness
    /// values.
    pub fn generate_proof_response(
        self,
        x: &BigInt,
        r1: &BigInt,
        r2: &BigInt,
        challenge: &Challenge,
    ) -> EqualityProof {
        let c = challenge.as_integer();
        EqualityProof {
            mask_commitment1: self.mask_commitment1,
            mask_commitment2: self.mask_commitment2,
            value_response: self.value_mask + c * x,
            randomness_response1: self.randomness_mask1 + c * r1,
            randomness_response2: self.randomness_mask2 + c * r2,
        }
    }
}

/// Fully constructed proof that two commitments hide the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualityProof {
    /// Round-one message under the first parameter set.
    pub mask_commitment1: BigInt,
    /// Round-one message under the second parameter set.
    pub mask_commitment2: BigInt,
    /// The shared response for the committed value.
    pub value_response: BigInt,
    /// Response for the first commitment's randomness.
    pub randomness_response1: BigInt,
    /// Response for the second commitment's randomness.
    pub randomness_response2: BigInt,
}

impl EqualityProof {
    /// Verify that `commitment1` and `commitment2` open to the same value.
    pub fn verify(
        &self,
        params1: &DamgardFujisakiParameters,
        params2: &DamgardFujisakiParameters,
        commitment1: &BigInt,
        commitment2: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        let c = challenge.as_integer();

        let group1 = params1.group();
        let lhs1 = group1.mul(&self.mask_commitment1, &group1.exp(commitment1, c));
        let rhs1 = params1.compute_commit(&self.value_response, &self.randomness_response1);

        let group2 = params2.group();
        let lhs2 = group2.mul(&self.mask_commitment2, &group2.exp(commitment2, c));
        let rhs2 = params2.compute_commit(&self.value_response, &self.randomness_response2);

        lhs1 == rhs1 && lhs2 == rhs2
    }
}

impl ChallengeDigest for EqualityProofBuilder {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(&self.mask_commitment1);
        builder.digest_integer(&self.mask_commitment2);
    }
}

impl ChallengeDigest for EqualityProof {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(&self.mask_commitment1);
        builder.digest_integer(&self.mask_commitment2);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::damgard_fujisaki::{DamgardFujisakiCommitter, DamgardFujisakiReceiver};
    use crate::test::rng;
    use num_traits::One;

    #[test]
    fn equality_proof_verifies_across_moduli() {
        let mut rng = rng();
        let receiver1 = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let receiver2 = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let mut committer1 = DamgardFujisakiCommitter::new(receiver1.params().clone());
        let mut committer2 = DamgardFujisakiCommitter::new(receiver2.params().clone());

        // The shared value must fit below both bounds.
        let t = receiver1.params().t().min(receiver2.params().t()).clone();
        let x = crate::arith::random_below(&mut rng, &t);
        let c1 = committer1.commit(&mut rng, x.clone()).unwrap();
        let c2 = committer2.commit(&mut rng, x).unwrap();

        let builder = EqualityProofBuilder::generate_proof_commitments(
            &mut rng,
            committer1.params(),
            committer2.params(),
            80,
        );
        let challenge = Challenge::random(&mut rng, 80);
        let (x, r1) = committer1.decommit().unwrap();
        let (_, r2) = committer2.decommit().unwrap();
        let proof = builder.generate_proof_response(x, r1, r2, &challenge);

        assert!(proof.verify(
            committer1.params(),
            committer2.params(),
            &c1,
            &c2,
            &challenge
        ));
    }

    #[test]
    fn unequal_values_are_rejected() {
        let mut rng = rng();
        let receiver1 = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let receiver2 = DamgardFujisakiReceiver::from_existing(&receiver1);
        let mut committer1 = DamgardFujisakiCommitter::new(receiver1.params().clone());
        let mut committer2 = DamgardFujisakiCommitter::new(receiver2.params().clone());

        let x = crate::arith::random_below(&mut rng, receiver1.params().t());
        let c1 = committer1.commit(&mut rng, x.clone()).unwrap();
        let c2 = committer2.commit(&mut rng, x + BigInt::one()).unwrap();

        let builder = EqualityProofBuilder::generate_proof_commitments(
            &mut rng,
            committer1.params(),
            committer2.params(),
            80,
        );
        let challenge = Challenge::random(&mut rng, 80);
        let (x, r1) = committer1.decommit().unwrap();
        let (_, r2) = committer2.decommit().unwrap();
        let proof = builder.generate_proof_response(x, r1, r2, &challenge);

        assert!(!proof.verify(
            committer1.params(),
            committer2.params(),
            &c1,
            &c2,
            &challenge
        ));
    }
}
