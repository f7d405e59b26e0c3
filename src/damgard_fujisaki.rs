//! Damgård-Fujisaki integer commitments over the QR subgroup of a
//! special-RSA modulus.
//!
//! The receiver generates the modulus `N` (and therefore owns the trapdoor
//! factorization — it must never act as a committer on its own parameters)
//! and two generators `G, H` of the quadratic-residue subgroup. A value
//! `x` in `[0, T)` is committed as `c = G^x * H^r mod N` with
//! `r` uniform in `[0, 2^k * N)`; the oversized randomness space is what
//! makes the masking in derived zero-knowledge proofs statistically hiding,
//! with gap `2^-k`. Binding rests on the Strong RSA assumption.
//!
//! Equality and multiplication proofs need several commitments under the
//! *same* `(N, G, H)`; additional receivers are constructed
//! [from an existing one](DamgardFujisakiReceiver::from_existing) instead of
//! re-sampling primes.

use crate::arith::{pow2, random_below};
use crate::groups::{CyclicGroup, QrSpecialRsa, QrSpecialRsaPublic};
use crate::{Error, Rng};
use num_bigint::BigInt;
use num_traits::Signed;
use serde::{Deserialize, Serialize};

/// Public parameters for Damgård-Fujisaki commitments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamgardFujisakiParameters {
    n: BigInt,
    g: BigInt,
    h: BigInt,
    /// Exclusive upper bound on committed values.
    t: BigInt,
    /// Statistical security parameter governing the randomness range.
    k: usize,
}

impl DamgardFujisakiParameters {
    /// Assemble parameters received from the party that generated them.
    /// Committed values must lie in `[0, t)`.
    pub fn new(n: BigInt, g: BigInt, h: BigInt, t: BigInt, k: usize) -> Self {
        DamgardFujisakiParameters { n, g, h, t, k }
    }

    /// The special-RSA modulus.
    pub fn n(&self) -> &BigInt {
        &self.n
    }

    /// The first commitment base.
    pub fn g(&self) -> &BigInt {
        &self.g
    }

    /// The second commitment base.
    pub fn h(&self) -> &BigInt {
        &self.h
    }

    /// The exclusive upper bound on committed values.
    pub fn t(&self) -> &BigInt {
        &self.t
    }

    /// The statistical security parameter.
    pub fn k(&self) -> usize {
        self.k
    }

    /// The public group view the parameters live in.
    pub fn group(&self) -> QrSpecialRsaPublic {
        QrSpecialRsaPublic::new(self.n.clone())
    }

    /// Exclusive upper bound `2^k * N` on commitment randomness.
    pub(crate) fn randomness_bound(&self) -> BigInt {
        pow2(self.k) * &self.n
    }

    /// The bit length of the randomness bound, `B = k + |N|`, used by the
    /// derived proofs to size their masks.
    pub(crate) fn randomness_bits(&self) -> usize {
        self.k + self.n.bits() as usize
    }

    /// Computes `G^x * H^r mod N`. Negative `x` or `r` invert.
    pub fn compute_commit(&self, x: &BigInt, r: &BigInt) -> BigInt {
        let group = self.group();
        let t1 = group.exp(&self.g, x);
        let t2 = group.exp(&self.h, r);
        group.mul(&t1, &t2)
    }
}

/// The receiver side of the Damgård-Fujisaki scheme. Owns the trapdoor.
#[derive(Debug)]
pub struct DamgardFujisakiReceiver {
    group: QrSpecialRsa,
    params: DamgardFujisakiParameters,
    commitment: Option<BigInt>,
}

impl DamgardFujisakiReceiver {
    /// Generate a fresh modulus from safe primes of `safe_prime_bits` bits
    /// and two independent QR generators. The value bound `T` defaults to
    /// `N`.
    pub fn new(rng: &mut impl Rng, safe_prime_bits: usize, k: usize) -> Result<Self, Error> {
        let group = QrSpecialRsa::new(rng, safe_prime_bits)?;
        let g = group.random_generator(rng)?;
        let h = group.random_generator(rng)?;
        Ok(Self::assemble(group, g, h, k))
    }

    /// Like [`new`](Self::new), but with the commitment bases built by the
    /// Chinese-remainder construction of Fujisaki-Okamoto: an order-`p`
    /// generator modulo `P` and an order-`q` generator modulo `Q` are
    /// combined into `G`, and `H = G^alpha` for a random invertible `alpha`.
    pub fn new_with_crt_generators(
        rng: &mut impl Rng,
        safe_prime_bits: usize,
        k: usize,
    ) -> Result<Self, Error> {
        let group = QrSpecialRsa::new(rng, safe_prime_bits)?;
        let (g, h) = group.crt_generator_pair(rng)?;
        Ok(Self::assemble(group, g, h, k))
    }

    fn assemble(group: QrSpecialRsa, g: BigInt, h: BigInt, k: usize) -> Self {
        let n = group.modulus().clone();
        let params = DamgardFujisakiParameters::new(n.clone(), g, h, n, k);
        DamgardFujisakiReceiver {
            group,
            params,
            commitment: None,
        }
    }

    /// Construct an additional receiver over the same `(N, G, H)`, for
    /// protocols that relate several commitments on one modulus.
    pub fn from_existing(other: &DamgardFujisakiReceiver) -> Self {
        DamgardFujisakiReceiver {
            group: other.group.clone(),
            params: other.params.clone(),
            commitment: None,
        }
    }

    /// Replace the value bound `T`. The range proof uses a wider bound than
    /// the default `N`.
    pub fn set_value_bound(&mut self, t: BigInt) {
        self.params.t = t;
    }

    /// The public parameters, to hand to a committer.
    pub fn params(&self) -> &DamgardFujisakiParameters {
        &self.params
    }

    /// The private group view. Trapdoor material.
    pub fn group(&self) -> &QrSpecialRsa {
        &self.group
    }

    /// Store a received commitment.
    pub fn set_commitment(&mut self, c: BigInt) {
        self.commitment = Some(c);
    }

    /// The stored commitment.
    pub fn commitment(&self) -> Result<&BigInt, Error> {
        self.commitment
            .as_ref()
            .ok_or(Error::OutOfOrder("commitment not yet received"))
    }

    /// Check a received decommitment `(x, r)` against the stored commitment.
    pub fn check_decommitment(&self, x: &BigInt, r: &BigInt) -> Result<bool, Error> {
        let commitment = self.commitment()?;
        Ok(&self.params.compute_commit(x, r) == commitment)
    }
}

/// The committer side of the Damgård-Fujisaki scheme.
///
/// Holds only the public parameters; the factorization of `N` stays with
/// the receiver, which is what makes the commitment binding.
#[derive(Debug)]
pub struct DamgardFujisakiCommitter {
    params: DamgardFujisakiParameters,
    state: Option<(BigInt, BigInt)>,
}

impl DamgardFujisakiCommitter {
    /// Construct a committer from the receiver's public parameters.
    pub fn new(params: DamgardFujisakiParameters) -> Self {
        DamgardFujisakiCommitter {
            params,
            state: None,
        }
    }

    /// The parameters this committer uses.
    pub fn params(&self) -> &DamgardFujisakiParameters {
        &self.params
    }

    /// Commit to `x`, which must lie in `[0, T)`. Returns
    /// `c = G^x * H^r mod N` for `r` uniform in `[0, 2^k * N)`.
    pub fn commit(&mut self, rng: &mut impl Rng, x: BigInt) -> Result<BigInt, Error> {
        if x.is_negative() || x >= self.params.t {
            return Err(Error::OutsideRange);
        }
        let r = random_below(rng, &self.params.randomness_bound());
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
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::rng;

    #[test]
    fn commit_decommit() {
        let mut rng = rng();
        let mut receiver = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let mut committer = DamgardFujisakiCommitter::new(receiver.params().clone());

        let x = random_below(&mut rng, receiver.params().t());
        let c = committer.commit(&mut rng, x).unwrap();
        receiver.set_commitment(c);

        let (x, r) = committer.decommit().unwrap();
        assert!(receiver.check_decommitment(x, r).unwrap());
        assert!(!receiver.check_decommitment(&(x + 1), r).unwrap());
    }

    #[test]
    fn commit_rejects_out_of_range_values() {
        let mut rng = rng();
        let receiver = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let mut committer = DamgardFujisakiCommitter::new(receiver.params().clone());

        let too_big = receiver.params().t().clone();
        assert_eq!(
            committer.commit(&mut rng, too_big).unwrap_err(),
            Error::OutsideRange
        );
    }

    #[test]
    fn crt_generator_receiver_commits() {
        let mut rng = rng();
        let mut receiver =
            DamgardFujisakiReceiver::new_with_crt_generators(&mut rng, 128, 40).unwrap();
        let mut committer = DamgardFujisakiCommitter::new(receiver.params().clone());

        let c = committer.commit(&mut rng, BigInt::from(99)).unwrap();
        receiver.set_commitment(c);
        let (x, r) = committer.decommit().unwrap();
        assert!(receiver.check_decommitment(x, r).unwrap());
    }

    #[test]
    fn receivers_from_existing_share_parameters() {
        let mut rng = rng();
        let receiver = DamgardFujisakiReceiver::new(&mut rng, 128, 40).unwrap();
        let second = DamgardFujisakiReceiver::from_existing(&receiver);
        assert_eq!(receiver.params(), second.params());
    }
}
