//! Pedersen commitments over a prime-order Schnorr subgroup.
//!
//! The committer learns the public parameters `(group, H)` from the
//! receiver, commits to a value `x` in `[0, Q)` as `c = G^x * H^r` for a
//! fresh `r`, and later decommits by revealing `(x, r)`. Binding rests on
//! the discrete-log assumption in the subgroup; hiding is statistical. The
//! receiver that generated the parameters may keep the trapdoor `a` with
//! `H = G^a`, which some derived protocols use for equivocation.

use crate::arith::random_below;
use crate::groups::{CyclicGroup, SchnorrGroup};
use crate::{Error, Rng};
use num_bigint::BigInt;
use num_traits::Signed;
use serde::{Deserialize, Serialize};

/// Public parameters for Pedersen commitments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedersenParameters {
    group: SchnorrGroup,
    h: BigInt,
}

impl PedersenParameters {
    /// Assemble parameters received from the party that generated them.
    pub fn new(group: SchnorrGroup, h: BigInt) -> Self {
        PedersenParameters { group, h }
    }

    /// The underlying group.
    pub fn group(&self) -> &SchnorrGroup {
        &self.group
    }

    /// The second base `H = G^a`.
    pub fn h(&self) -> &BigInt {
        &self.h
    }

    /// Computes `G^x * H^r` in the group.
    pub(crate) fn compute_commit(&self, x: &BigInt, r: &BigInt) -> BigInt {
        let t1 = self.group.exp(&self.group.g, x);
        let t2 = self.group.exp(&self.h, r);
        self.group.mul(&t1, &t2)
    }
}

/// The receiver side of the Pedersen scheme.
///
/// Generates the parameters (and keeps the trapdoor), accepts a commitment,
/// and later checks the decommitment against it.
#[derive(Debug)]
pub struct PedersenReceiver {
    params: PedersenParameters,
    trapdoor: Option<BigInt>,
    commitment: Option<BigInt>,
}

impl PedersenReceiver {
    /// Generate fresh parameters over a group with an order of `q_bits`
    /// bits. The trapdoor `a` with `H = G^a` stays in the receiver.
    pub fn new(rng: &mut impl Rng, q_bits: usize) -> Result<Self, Error> {
        let group = SchnorrGroup::new(rng, q_bits)?;
        let a = random_below(rng, &group.q);
        let h = group.exp(&group.g, &a);
        Ok(PedersenReceiver {
            params: PedersenParameters::new(group, h),
            trapdoor: Some(a),
            commitment: None,
        })
    }

    /// Construct a receiver from existing parameters (no trapdoor known).
    pub fn from_params(params: PedersenParameters) -> Self {
        PedersenReceiver {
            params,
            trapdoor: None,
            commitment: None,
        }
    }

    /// The public parameters, to hand to a committer.
    pub fn params(&self) -> &PedersenParameters {
        &self.params
    }

    /// The trapdoor `a` with `H = G^a`, if this receiver generated the
    /// parameters.
    pub fn trapdoor(&self) -> Option<&BigInt> {
        self.trapdoor.as_ref()
    }

    /// Store a received commitment.
    pub fn set_commitment(&mut self, c: BigInt) {
        self.commitment = Some(c);
    }

    /// Check a received decommitment `(x, r)` against the stored commitment.
    pub fn check_decommitment(&self, x: &BigInt, r: &BigInt) -> Result<bool, Error> {
        let commitment = self
            .commitment
            .as_ref()
            .ok_or(Error::OutOfOrder("decommitment checked before commitment"))?;
        Ok(&self.params.compute_commit(x, r) == commitment)
    }
}

/// The committer side of the Pedersen scheme.
#[derive(Debug)]
pub struct PedersenCommitter {
    params: PedersenParameters,
    state: Option<(BigInt, BigInt)>,
}

impl PedersenCommitter {
    /// Construct a committer from the receiver's public parameters.
    pub fn new(params: PedersenParameters) -> Self {
        PedersenCommitter {
            params,
            state: None,
        }
    }

    /// The parameters this committer uses.
    pub fn params(&self) -> &PedersenParameters {
        &self.params
    }

    /// Commit to `x`, which must lie in `[0, Q)`. Returns `c = G^x * H^r`
    /// for a fresh uniform `r`.
    pub fn commit(&mut self, rng: &mut impl Rng, x: BigInt) -> Result<BigInt, Error> {
        if x.is_negative() || x >= self.params.group.q {
            return Err(Error::OutsideRange);
        }
        let r = random_below(rng, &self.params.group.q);
        let c = self.params.compute_commit(&x, &r);
        self.state = Some((x, r));
        Ok(c)
    }

    /// Reveal the committed value and randomness.
    pub fn decommit(&self) -> Result<(&BigInt, &BigInt), Error> {
        self.state
            .as_ref()
            .map(|(x, r)| (x, r))
            .ok_or(Error::OutOfOrder("decommitment requested before commitment"))
    }

    /// Check a trapdoor received from the receiver: `G^a = H`.
    pub fn verify_trapdoor(&self, a: &BigInt) -> bool {
        let group = &self.params.group;
        group.exp(&group.g, a) == self.params.h
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::rng;
    use num_bigint::BigInt;

    fn receiver() -> PedersenReceiver {
        let mut rng = rng();
        PedersenReceiver::new(&mut rng, 160).unwrap()
    }

    #[test]
    fn commit_decommit() {
        let mut rng = rng();
        let mut receiver = receiver();
        let mut committer = PedersenCommitter::new(receiver.params().clone());

        let x = random_below(&mut rng, &receiver.params().group().q);
        let c = committer.commit(&mut rng, x).unwrap();
        receiver.set_commitment(c);

        let (x, r) = committer.decommit().unwrap();
        assert!(receiver.check_decommitment(x, r).unwrap());
    }

    #[test]
    fn commit_does_not_decommit_on_wrong_value() {
        let mut rng = rng();
        let mut receiver = receiver();
        let mut committer = PedersenCommitter::new(receiver.params().clone());

        let c = committer.commit(&mut rng, BigInt::from(42)).unwrap();
        receiver.set_commitment(c);

        let (_, r) = committer.decommit().unwrap();
        assert!(!receiver.check_decommitment(&BigInt::from(43), r).unwrap());
    }

    #[test]
    fn commit_does_not_decommit_on_wrong_randomness() {
        let mut rng = rng();
        let mut receiver = receiver();
        let mut committer = PedersenCommitter::new(receiver.params().clone());

        let c = committer.commit(&mut rng, BigInt::from(42)).unwrap();
        receiver.set_commitment(c);

        let (x, r) = committer.decommit().unwrap();
        let bad_r = r + 1;
        assert!(!receiver.check_decommitment(x, &bad_r).unwrap());
    }

    #[test]
    fn commit_rejects_out_of_range_values() {
        let mut rng = rng();
        let receiver = receiver();
        let mut committer = PedersenCommitter::new(receiver.params().clone());

        let too_big = receiver.params().group().q.clone();
        assert_eq!(
            committer.commit(&mut rng, too_big).unwrap_err(),
            Error::OutsideRange
        );
        assert_eq!(
            committer.commit(&mut rng, BigInt::from(-1)).unwrap_err(),
            Error::OutsideRange
        );
    }

    #[test]
    fn decommit_before_commit_is_an_error() {
        let receiver = receiver();
        let committer = PedersenCommitter::new(receiver.params().clone());
        assert!(matches!(
            committer.decommit().unwrap_err(),
            Error::OutOfOrder(_)
        ));
        assert!(matches!(
            receiver
                .check_decommitment(&BigInt::from(1), &BigInt::from(1))
                .unwrap_err(),
            Error::OutOfOrder(_)
        ));
    }

    #[test]
    fn trapdoor_verifies() {
        let receiver = receiver();
        let committer = PedersenCommitter::new(receiver.params().clone());
        let a = receiver.trapdoor().unwrap();
        assert!(committer.verify_trapdoor(a));
        assert!(!committer.verify_trapdoor(&(a + 1)));
    }
}
