/*!
Proof that a Damgård-Fujisaki commitment hides a value in a range
`a <= x <= b`.

## Intuition

This is the Boudot decomposition \[1\]: `x - a >= 0` and `b - x >= 0` are
each written as a sum of at most four squares, `u = w1^2 + ... + w4^2`. For
each side the prover publishes four *small* commitments `d_i` to the roots
`w_i` and four *big* commitments `D_i` to their squares, allocating the big
commitments' randomness so that it sums to the randomness of the target:

```text
prod D_i = c * G^{-a}        (lower side, a commitment to x - a)
prod D'_i = G^b * c^{-1}     (upper side, a commitment to b - x)
```

The verifier checks both product identities directly and a
[`SquareProof`] per big commitment; together these show the committed value
sits between the bounds. One challenge is shared by all eight square proofs.

## References

1. F. Boudot. Efficient proofs that a committed number lies in an interval.
   EUROCRYPT 2000.
*/

use crate::arith::random_below;
use crate::challenge::{Challenge, ChallengeBuilder, ChallengeDigest};
use crate::damgard_fujisaki::{DamgardFujisakiCommitter, DamgardFujisakiParameters};
use crate::groups::CyclicGroup;
use crate::proofs::df_multiplication::{SquareProof, SquareProofBuilder};
use crate::squares::four_squares;
use crate::{Error, Rng};
use arrayvec::ArrayVec;
use num_bigint::BigInt;
use num_traits::Signed;
use serde::{Deserialize, Serialize};

/// One side of the decomposition, mid-protocol.
#[derive(Debug)]
struct SideBuilder {
    small_commitments: [BigInt; 4],
    big_commitments: [BigInt; 4],
    /// Per square: the root, the small commitment's randomness, and the big
    /// commitment's randomness.
    openings: [(BigInt, BigInt, BigInt); 4],
    square_builders: [SquareProofBuilder; 4],
}

impl SideBuilder {
    /// Commit to the four-square decomposition of `value`, allocating big
    /// randomness that sums to `target_randomness`.
    fn new(
        rng: &mut impl Rng,
        params: &DamgardFujisakiParameters,
        value: &BigInt,
        target_randomness: &BigInt,
        challenge_bits: usize,
    ) -> Result<Self, Error> {
        let roots = four_squares(rng, value)?;
        let randomness_bound = params.randomness_bound();

        let mut big_randomness: ArrayVec<BigInt, 4> = (0..3)
            .map(|_| random_below(&mut *rng, &randomness_bound))
            .collect();
        let allocated: BigInt = big_randomness.iter().sum();
        big_randomness.push(target_randomness - allocated);
        let big_randomness = big_randomness.into_inner().expect("known length");

        let mut small_commitments = ArrayVec::<BigInt, 4>::new();
        let mut big_commitments = ArrayVec::<BigInt, 4>::new();
        let mut openings = ArrayVec::<(BigInt, BigInt, BigInt), 4>::new();
        let mut square_builders = ArrayVec::<SquareProofBuilder, 4>::new();
        for (root, big_r) in roots.into_iter().zip(big_randomness) {
            let small_r = random_below(rng, &randomness_bound);
            let small = params.compute_commit(&root, &small_r);
            let big = params.compute_commit(&(&root * &root), &big_r);
            square_builders.push(SquareProofBuilder::generate_proof_commitments(
                rng,
                params,
                &small,
                challenge_bits,
            ));
            small_commitments.push(small);
            big_commitments.push(big);
            openings.push((root, small_r, big_r));
        }

        Ok(SideBuilder {
            small_commitments: small_commitments.into_inner().expect("known length"),
            big_commitments: big_commitments.into_inner().expect("known length"),
            openings: openings.into_inner().expect("known length"),
            square_builders: square_builders.into_inner().expect("known length"),
        })
    }

    fn finish(self, challenge: &Challenge) -> Side {
        let SideBuilder {
            small_commitments,
            big_commitments,
            openings,
            square_builders,
        } = self;
        let square_proofs: ArrayVec<SquareProof, 4> = square_builders
            .into_iter()
            .zip(&openings)
            .map(|(builder, (root, small_r, big_r))| {
                builder.generate_proof_response((root, small_r), big_r, challenge)
            })
            .collect();
        Side {
            small_commitments,
            big_commitments,
            square_proofs: square_proofs.into_inner().expect("known length"),
        }
    }
}

/// One side of a finished [`RangeProof`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Side {
    /// Commitments to the four roots.
    pub small_commitments: [BigInt; 4],
    /// Commitments to the four squares.
    pub big_commitments: [BigInt; 4],
    /// A square proof tying each big commitment to its small one.
    pub square_proofs: [SquareProof; 4],
}

impl Side {
    fn verify(
        &self,
        params: &DamgardFujisakiParameters,
        target: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        let group = params.group();
        let product = self
            .big_commitments
            .iter()
            .fold(BigInt::from(1), |acc, big| group.mul(&acc, big));
        if &product != target {
            return false;
        }
        self.small_commitments
            .iter()
            .zip(&self.big_commitments)
            .zip(&self.square_proofs)
            .all(|((small, big), proof)| proof.verify(params, small, big, challenge))
    }
}

/// A partially-built [`RangeProof`].
#[derive(Debug)]
pub struct RangeProofBuilder {
    lower: SideBuilder,
    upper: SideBuilder,
}

impl RangeProofBuilder {
    /// Run the commitment phase for a proof that the value inside
    /// `committer`'s commitment lies in `[a, b]`.
    ///
    /// Returns [`Error::OutsideRange`] if it does not.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        committer: &DamgardFujisakiCommitter,
        a: &BigInt,
        b: &BigInt,
        challenge_bits: usize,
    ) -> Result<Self, Error> {
        let (x, r) = committer.decommit()?;
        let params = committer.params();
        let lower_value = x - a;
        let upper_value = b - x;
        if lower_value.is_negative() || upper_value.is_negative() {
            return Err(Error::OutsideRange);
        }
        Ok(RangeProofBuilder {
            lower: SideBuilder::new(rng, params, &lower_value, r, challenge_bits)?,
            upper: SideBuilder::new(rng, params, &upper_value, &-r, challenge_bits)?,
        })
    }

    /// Run the response phase of all eight square proofs under one shared
    /// challenge.
    pub fn generate_proof_response(self, challenge: &Challenge) -> RangeProof {
        RangeProof {
            lower: self.lower.finish(challenge),
            upper: self.upper.finish(challenge),
        }
    }
}

/// Fully constructed proof that a committed value lies in `[a, b]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeProof {
    /// The `x - a` side.
    pub lower: Side,
    /// The `b - x` side.
    pub upper: Side,
}

impl RangeProof {
    /// Verify that `commitment` hides a value in `[a, b]`.
    pub fn verify(
        &self,
        params: &DamgardFujisakiParameters,
        commitment: &BigInt,
        a: &BigInt,
        b: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        let group = params.group();
        // c * G^{-a} commits to x - a under the original randomness;
        // G^b * c^{-1} commits to b - x under its negation.
        let lower_target = group.mul(commitment, &group.exp(params.g(), &-a));
        let upper_target = group.mul(&group.exp(params.g(), b), &group.inv(commitment));
        self.lower.verify(params, &lower_target, challenge)
            && self.upper.verify(params, &upper_target, challenge)
    }
}

impl ChallengeDigest for RangeProofBuilder {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        for side in [&self.lower, &self.upper] {
            for c in &side.small_commitments {
                builder.digest_integer(c);
            }
            for c in &side.big_commitments {
                builder.digest_integer(c);
            }
            for square in &side.square_builders {
                builder.digest(square);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::damgard_fujisaki::DamgardFujisakiReceiver;
    use crate::test::rng;

    #[test]
    fn range_proof_verifies() {
        let mut rng = rng();
        let mut receiver = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        // A wider bound than the default N; any bound works as long as both
        // sides agree on it.
        let t = receiver.params().n() * receiver.params().n();
        receiver.set_value_bound(t);
        let mut committer = DamgardFujisakiCommitter::new(receiver.params().clone());

        let x = crate::arith::random_below(&mut rng, receiver.params().n());
        let a = &x - 10;
        let b = &x + 10;
        let c = committer.commit(&mut rng, x).unwrap();
        receiver.set_commitment(c.clone());

        let builder =
            RangeProofBuilder::generate_proof_commitments(&mut rng, &committer, &a, &b, 80)
                .unwrap();
        let challenge = Challenge::random(&mut rng, 80);
        let proof = builder.generate_proof_response(&challenge);

        assert!(proof.verify(receiver.params(), &c, &a, &b, &challenge));
    }

    #[test]
    fn out_of_range_value_cannot_start_a_proof() {
        let mut rng = rng();
        let receiver = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let mut committer = DamgardFujisakiCommitter::new(receiver.params().clone());

        let x = BigInt::from(100);
        let _ = committer.commit(&mut rng, x).unwrap();

        let err = RangeProofBuilder::generate_proof_commitments(
            &mut rng,
            &committer,
            &BigInt::from(200),
            &BigInt::from(300),
            80,
        )
        .unwrap_err();
        assert_eq!(err, Error::OutsideRange);
    }

    #[test]
    fn shifted_bounds_are_rejected() {
        let mut rng = rng();
        let receiver = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let mut committer = DamgardFujisakiCommitter::new(receiver.params().clone());

        let x = BigInt::from(1000);
        let a = BigInt::from(990);
        let b = BigInt::from(1010);
        let c = committer.commit(&mut rng, x).unwrap();

        let builder =
            RangeProofBuilder::generate_proof_commitments(&mut rng, &committer, &a, &b, 80)
                .unwrap();
        let challenge = Challenge::random(&mut rng, 80);
        let proof = builder.generate_proof_response(&challenge);

        // The honest interval verifies; a disjoint one must not.
        assert!(proof.verify(receiver.params(), &c, &a, &b, &challenge));
        assert!(!proof.verify(
            receiver.params(),
            &c,
            &BigInt::from(1020),
            &BigInt::from(1040),
            &challenge
        ));
    }
}
