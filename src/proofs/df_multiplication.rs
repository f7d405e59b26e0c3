/*!
Proof that three Damgård-Fujisaki commitments on one parameter set satisfy
`x3 = x1 * x2`.

## Intuition

Besides proving knowledge of openings of `c1` and `c2`, the prover shows a
representation of `c3` over the bases `(c2, H)`: since
`c2^{x1} = G^{x1*x2} * H^{x1*r2}`, the commitment `c3 = G^{x3} * H^{r3}`
equals `c2^{x1} * H^{r3 - x1*r2}` exactly when `x3 = x1 * x2`. Sharing the
response for `x1` between the opening of `c1` and the representation of
`c3` ties the three commitments together.

The verifier checks three identities; any failing identity rejects the
whole proof, with no partial accept:

```text
G^{u1} * H^{v1} = d1 * c1^c
G^{u2} * H^{v2} = d2 * c2^c
c2^{u1} * H^{v3} = d3 * c3^c
```

A [`SquareProof`] is the special case `c1 = c2`: the prover shows that a
commitment hides the square of the value inside another commitment, using
the same shared-response trick over two identities. The range proof is built
from square proofs.
*/

use crate::arith::{pow2, random_below};
use crate::challenge::{Challenge, ChallengeBuilder, ChallengeDigest};
use crate::damgard_fujisaki::DamgardFujisakiParameters;
use crate::groups::CyclicGroup;
use crate::Rng;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A partially-built [`MultiplicationProof`].
#[derive(Debug)]
pub struct MultiplicationProofBuilder {
    value_mask1: BigInt,
    value_mask2: BigInt,
    randomness_mask1: BigInt,
    randomness_mask2: BigInt,
    cross_mask: BigInt,
    mask_commitment1: BigInt,
    mask_commitment2: BigInt,
    mask_commitment3: BigInt,
}

impl MultiplicationProofBuilder {
    /// Run the commitment phase. All three commitments share `params`;
    /// `commitment2` is needed because it serves as a base for the third
    /// round-one message.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        params: &DamgardFujisakiParameters,
        commitment2: &BigInt,
        challenge_bits: usize,
    ) -> Self {
        let group = params.group();
        let n_bits = params.n().bits() as usize;

        let value_bound = params.t() * pow2(n_bits + challenge_bits);
        let value_mask1 = random_below(rng, &value_bound);
        let value_mask2 = random_below(rng, &value_bound);

        let randomness_bound = pow2(params.randomness_bits() + 2 * n_bits + challenge_bits);
        let randomness_mask1 = random_below(rng, &randomness_bound);
        let randomness_mask2 = random_below(rng, &randomness_bound);
        // The cross term r3 - x1*r2 is wider than a plain randomness value
        // by a factor of T.
        let cross_mask = random_below(rng, &(params.t() * &randomness_bound));

        let mask_commitment3 = group.mul(
            &group.exp(commitment2, &value_mask1),
            &group.exp(params.h(), &cross_mask),
        );
        MultiplicationProofBuilder {
            mask_commitment1: params.compute_commit(&value_mask1, &randomness_mask1),
            mask_commitment2: params.compute_commit(&value_mask2, &randomness_mask2),
            mask_commitment3,
            value_mask1,
            value_mask2,
            randomness_mask1,
            randomness_mask2,
            cross_mask,
        }
    }

    /// Run the response phase from the three openings.
    pub fn generate_proof_response(
        self,
        opening1: (&BigInt, &BigInt),
        opening2: (&BigInt, &BigInt),
        opening3: (&BigInt, &BigInt),
        challenge: &Challenge,
    ) -> MultiplicationProof {
        let (x1, r1) = opening1;
        let (_, r2) = opening2;
        let (_, r3) = opening3;
        let c = challenge.as_integer();
        let cross = r3 - x1 * r2;
        MultiplicationProof {
            mask_commitment1: self.mask_commitment1,
            mask_commitment2: self.mask_commitment2,
            mask_commitment3: self.mask_commitment3,
            value_response1: self.value_mask1 + c * x1,
            value_response2: self.value_mask2 + c * opening2.0,
            randomness_response1: self.randomness_mask1 + c * r1,
            randomness_response2: self.randomness_mask2 + c * r2,
            cross_response: self.cross_mask + c * cross,
        }
    }
}

/// Fully constructed proof of a multiplicative relation among three
/// commitments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplicationProof {
    /// Round-one message for the opening of `c1`.
    pub mask_commitment1: BigInt,
    /// Round-one message for the opening of `c2`.
    pub mask_commitment2: BigInt,
    /// Round-one message for the representation of `c3` over `(c2, H)`.
    pub mask_commitment3: BigInt,
    /// Response for `x1`, shared by the first and third identities.
    pub value_response1: BigInt,
    /// Response for `x2`.
    pub value_response2: BigInt,
    /// Response for `r1`.
    pub randomness_response1: BigInt,
    /// Response for `r2`.
    pub randomness_response2: BigInt,
    /// Response for the cross term `r3 - x1*r2`.
    pub cross_response: BigInt,
}

impl MultiplicationProof {
    /// Verify that `commitment3` hides the product of the values inside
    /// `commitment1` and `commitment2`.
    pub fn verify(
        &self,
        params: &DamgardFujisakiParameters,
        commitment1: &BigInt,
        commitment2: &BigInt,
        commitment3: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        let group = params.group();
        let c = challenge.as_integer();

        let check1 = params.compute_commit(&self.value_response1, &self.randomness_response1)
            == group.mul(&self.mask_commitment1, &group.exp(commitment1, c));

        let check2 = params.compute_commit(&self.value_response2, &self.randomness_response2)
            == group.mul(&self.mask_commitment2, &group.exp(commitment2, c));

        let lhs3 = group.mul(
            &group.exp(commitment2, &self.value_response1),
            &group.exp(params.h(), &self.cross_response),
        );
        let check3 = lhs3 == group.mul(&self.mask_commitment3, &group.exp(commitment3, c));

        check1 && check2 && check3
    }
}

/// A partially-built [`SquareProof`].
#[derive(Debug)]
pub struct SquareProofBuilder {
    value_mask: BigInt,
    randomness_mask: BigInt,
    cross_mask: BigInt,
    mask_commitment1: BigInt,
    mask_commitment2: BigInt,
}

impl SquareProofBuilder {
    /// Run the commitment phase; `root_commitment` is the commitment to the
    /// root `w`, and serves as a base for the second round-one message.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        params: &DamgardFujisakiParameters,
        root_commitment: &BigInt,
        challenge_bits: usize,
    ) -> Self {
        let group = params.group();
        let n_bits = params.n().bits() as usize;

        let value_mask = random_below(rng, &(params.t() * pow2(n_bits + challenge_bits)));
        let randomness_bound = pow2(params.randomness_bits() + 2 * n_bits + challenge_bits);
        let randomness_mask = random_below(rng, &randomness_bound);
        let cross_mask = random_below(rng, &(params.t() * &randomness_bound));

        let mask_commitment2 = group.mul(
            &group.exp(root_commitment, &value_mask),
            &group.exp(params.h(), &cross_mask),
        );
        SquareProofBuilder {
            mask_commitment1: params.compute_commit(&value_mask, &randomness_mask),
            mask_commitment2,
            value_mask,
            randomness_mask,
            cross_mask,
        }
    }

    /// Run the response phase. `root_opening = (w, s)` opens the root
    /// commitment and `square_randomness` is the randomness of the square
    /// commitment `G^{w^2} * H^{r}`.
    pub fn generate_proof_response(
        self,
        root_opening: (&BigInt, &BigInt),
        square_randomness: &BigInt,
        challenge: &Challenge,
    ) -> SquareProof {
        let (w, s) = root_opening;
        let c = challenge.as_integer();
        let cross = square_randomness - w * s;
        SquareProof {
            mask_commitment1: self.mask_commitment1,
            mask_commitment2: self.mask_commitment2,
            value_response: self.value_mask + c * w,
            randomness_response: self.randomness_mask + c * s,
            cross_response: self.cross_mask + c * cross,
        }
    }
}

/// Proof that one commitment hides the square of the value inside another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareProof {
    /// Round-one message for the opening of the root commitment.
    pub mask_commitment1: BigInt,
    /// Round-one message for the representation of the square commitment.
    pub mask_commitment2: BigInt,
    /// Response for the root `w`, shared by both identities.
    pub value_response: BigInt,
    /// Response for the root commitment's randomness.
    pub randomness_response: BigInt,
    /// Response for the cross term.
    pub cross_response: BigInt,
}

impl SquareProof {
    /// Verify that `square_commitment` hides the square of the value inside
    /// `root_commitment`.
    pub fn verify(
        &self,
        params: &DamgardFujisakiParameters,
        root_commitment: &BigInt,
        square_commitment: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        let group = params.group();
        let c = challenge.as_integer();

        let check1 = params.compute_commit(&self.value_response, &self.randomness_response)
            == group.mul(&self.mask_commitment1, &group.exp(root_commitment, c));

        let lhs2 = group.mul(
            &group.exp(root_commitment, &self.value_response),
            &group.exp(params.h(), &self.cross_response),
        );
        let check2 = lhs2 == group.mul(&self.mask_commitment2, &group.exp(square_commitment, c));

        check1 && check2
    }
}

impl ChallengeDigest for SquareProofBuilder {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(&self.mask_commitment1);
        builder.digest_integer(&self.mask_commitment2);
    }
}

impl ChallengeDigest for SquareProof {
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
    use num_integer::Roots;

    #[test]
    fn multiplication_proof_verifies() {
        let mut rng = rng();
        let receiver1 = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let receiver2 = DamgardFujisakiReceiver::from_existing(&receiver1);
        let receiver3 = DamgardFujisakiReceiver::from_existing(&receiver1);
        let mut committer1 = DamgardFujisakiCommitter::new(receiver1.params().clone());
        let mut committer2 = DamgardFujisakiCommitter::new(receiver2.params().clone());
        let mut committer3 = DamgardFujisakiCommitter::new(receiver3.params().clone());

        // Keep the factors small enough that the product stays below T.
        let half_bound = receiver1.params().t().sqrt();
        let x1 = crate::arith::random_below(&mut rng, &half_bound);
        let x2 = crate::arith::random_below(&mut rng, &half_bound);
        let x3 = &x1 * &x2;
        let c1 = committer1.commit(&mut rng, x1).unwrap();
        let c2 = committer2.commit(&mut rng, x2).unwrap();
        let c3 = committer3.commit(&mut rng, x3).unwrap();

        let builder = MultiplicationProofBuilder::generate_proof_commitments(
            &mut rng,
            committer1.params(),
            &c2,
            80,
        );
        let challenge = Challenge::random(&mut rng, 80);
        let proof = builder.generate_proof_response(
            committer1.decommit().unwrap(),
            committer2.decommit().unwrap(),
            committer3.decommit().unwrap(),
            &challenge,
        );

        assert!(proof.verify(receiver1.params(), &c1, &c2, &c3, &challenge));
    }

    #[test]
    fn wrong_product_is_rejected() {
        let mut rng = rng();
        let receiver1 = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let mut committer1 = DamgardFujisakiCommitter::new(receiver1.params().clone());
        let mut committer2 = DamgardFujisakiCommitter::new(receiver1.params().clone());
        let mut committer3 = DamgardFujisakiCommitter::new(receiver1.params().clone());

        let half_bound = receiver1.params().t().sqrt();
        let x1 = crate::arith::random_below(&mut rng, &half_bound);
        let x2 = crate::arith::random_below(&mut rng, &half_bound);
        let x3 = &x1 * &x2 + BigInt::from(1);
        let c1 = committer1.commit(&mut rng, x1).unwrap();
        let c2 = committer2.commit(&mut rng, x2).unwrap();
        let c3 = committer3.commit(&mut rng, x3).unwrap();

        let builder = MultiplicationProofBuilder::generate_proof_commitments(
            &mut rng,
            committer1.params(),
            &c2,
            80,
        );
        let challenge = Challenge::random(&mut rng, 80);
        let proof = builder.generate_proof_response(
            committer1.decommit().unwrap(),
            committer2.decommit().unwrap(),
            committer3.decommit().unwrap(),
            &challenge,
        );

        assert!(!proof.verify(receiver1.params(), &c1, &c2, &c3, &challenge));
    }

    #[test]
    fn square_proof_verifies() {
        let mut rng = rng();
        let receiver = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let mut root_committer = DamgardFujisakiCommitter::new(receiver.params().clone());
        let mut square_committer = DamgardFujisakiCommitter::new(receiver.params().clone());

        let w = crate::arith::random_below(&mut rng, &receiver.params().t().sqrt());
        let d = root_committer.commit(&mut rng, w.clone()).unwrap();
        let big = square_committer.commit(&mut rng, &w * &w).unwrap();

        let builder =
            SquareProofBuilder::generate_proof_commitments(&mut rng, receiver.params(), &d, 80);
        let challenge = Challenge::random(&mut rng, 80);
        let (_, square_randomness) = square_committer.decommit().unwrap();
        let proof = builder.generate_proof_response(
            root_committer.decommit().unwrap(),
            square_randomness,
            &challenge,
        );

        assert!(proof.verify(receiver.params(), &d, &big, &challenge));
    }
}
