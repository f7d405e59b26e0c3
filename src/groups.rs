//! The two kinds of cyclic groups the proof systems run over.
//!
//! - [`SchnorrGroup`]: the prime-order subgroup of `Z_P^*` generated by an
//!   element of prime order `Q | P - 1`. The order is public, so Σ-protocol
//!   responses are reduced modulo `Q` and masks are drawn from `[0, Q)`.
//! - [`QrSpecialRsa`] / [`QrSpecialRsaPublic`]: the subgroup of quadratic
//!   residues modulo a special-RSA modulus `N = P*Q`, of order `p*q` for the
//!   Sophie Germain halves `p, q`. The order is the trapdoor: only the party
//!   that generated the modulus holds it. Responses are therefore kept as
//!   unbounded integers and masks are drawn from `[0, 2^(|N| + κ))` so that
//!   `r + c*x` statistically hides the witness.
//!
//! Provers and verifiers are parameterized once by the [`CyclicGroup`]
//! capability set and hold no knowledge of which variant they got.

use crate::arith::{self, exponentiate, pow2, random_below, random_invertible};
use crate::primes::{random_prime, SpecialRsaPrimes};
use crate::{Error, Rng};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Attempt budget for rejection-sampled generator searches.
const GENERATOR_ATTEMPTS: usize = 1_000;

/// Attempt budget for the prime search in [`SchnorrGroup::new`].
const SCHNORR_GROUP_ATTEMPTS: usize = 100_000;

/// The capability set a Σ-protocol needs from a cyclic group.
///
/// There are two concrete variants: prime-order groups where the order is
/// public, and hidden-order groups where it is a trapdoor. The difference
/// surfaces in [`sample_mask`](CyclicGroup::sample_mask) (the randomness
/// space for round one) and [`reduce_response`](CyclicGroup::reduce_response)
/// (whether round-three values may be reduced).
pub trait CyclicGroup {
    /// The modulus group elements are reduced by.
    fn modulus(&self) -> &BigInt;

    /// Computes `base^exponent` in the group. Negative exponents invert.
    fn exp(&self, base: &BigInt, exponent: &BigInt) -> BigInt;

    /// Computes `a * b` in the group.
    fn mul(&self, a: &BigInt, b: &BigInt) -> BigInt {
        (a * b).mod_floor(self.modulus())
    }

    /// Computes the inverse of `a` in the group, or zero if `a` is not
    /// invertible (no honest element ever is).
    fn inv(&self, a: &BigInt) -> BigInt {
        arith::mod_inverse(a, self.modulus()).unwrap_or_else(BigInt::zero)
    }

    /// Returns a uniformly random group element.
    fn random_element(&self, rng: &mut impl Rng) -> BigInt;

    /// Samples a Σ-protocol mask from the randomness space appropriate to
    /// the group, for a challenge space of `challenge_bits` bits.
    fn sample_mask(&self, rng: &mut impl Rng, challenge_bits: usize) -> BigInt;

    /// Reduces a Σ-protocol response the way the group requires.
    fn reduce_response(&self, z: BigInt) -> BigInt;
}

/// A subgroup of `Z_P^*` of prime order `Q | P - 1`, with generator `G`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrGroup {
    /// The modulus.
    pub p: BigInt,
    /// The (prime) order of the subgroup.
    pub q: BigInt,
    /// A generator of the subgroup.
    pub g: BigInt,
}

impl SchnorrGroup {
    /// Construct a group with an order of exactly `q_bits` bits.
    ///
    /// Finds a prime `Q` of that size, a prime `P = Q*R + 1`, and a
    /// generator `G = H^R != 1` for random `H`.
    pub fn new(rng: &mut impl Rng, q_bits: usize) -> Result<Self, Error> {
        let q = random_prime(rng, q_bits)?;
        for _ in 0..SCHNORR_GROUP_ATTEMPTS {
            // R even keeps P odd; its width fixes |P| at roughly q_bits + 256.
            let r: BigInt = arith::random_bits(rng, 255) << 1usize;
            if r.is_zero() {
                continue;
            }
            let p = &q * &r + 1;
            if !crate::primes::is_probable_prime(&p) {
                continue;
            }
            for _ in 0..GENERATOR_ATTEMPTS {
                let h = random_below(rng, &p);
                let g = exponentiate(&h, &r, &p);
                if !g.is_one() && !g.is_zero() {
                    return Ok(SchnorrGroup { p, q, g });
                }
            }
            return Err(Error::GeneratorSearchFailed);
        }
        Err(Error::PrimeGenerationFailed)
    }
}

impl CyclicGroup for SchnorrGroup {
    fn modulus(&self) -> &BigInt {
        &self.p
    }

    fn exp(&self, base: &BigInt, exponent: &BigInt) -> BigInt {
        exponentiate(base, exponent, &self.p)
    }

    fn random_element(&self, rng: &mut impl Rng) -> BigInt {
        let t = random_below(rng, &self.q);
        self.exp(&self.g, &t)
    }

    fn sample_mask(&self, rng: &mut impl Rng, _challenge_bits: usize) -> BigInt {
        random_below(rng, &self.q)
    }

    fn reduce_response(&self, z: BigInt) -> BigInt {
        z.mod_floor(&self.q)
    }
}

/// The public view of the quadratic-residue subgroup of a special-RSA
/// modulus: carries only `N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrSpecialRsaPublic {
    /// The special-RSA modulus.
    pub n: BigInt,
}

impl QrSpecialRsaPublic {
    /// Wrap a modulus received from the party that generated it.
    pub fn new(n: BigInt) -> Self {
        QrSpecialRsaPublic { n }
    }
}

impl CyclicGroup for QrSpecialRsaPublic {
    fn modulus(&self) -> &BigInt {
        &self.n
    }

    fn exp(&self, base: &BigInt, exponent: &BigInt) -> BigInt {
        exponentiate(base, exponent, &self.n)
    }

    fn random_element(&self, rng: &mut impl Rng) -> BigInt {
        // Squaring lands in the QR subgroup without knowing the order.
        let a = random_below(rng, &self.n);
        (&a * &a).mod_floor(&self.n)
    }

    fn sample_mask(&self, rng: &mut impl Rng, challenge_bits: usize) -> BigInt {
        let bound = pow2(self.n.bits() as usize + challenge_bits);
        random_below(rng, &bound)
    }

    fn reduce_response(&self, z: BigInt) -> BigInt {
        // The subgroup order is secret; responses stay unreduced integers.
        z
    }
}

/// The private view of the quadratic-residue subgroup of a special-RSA
/// modulus: owns the safe-prime factorization.
///
/// The factorization (and with it the subgroup order) is the trapdoor of
/// every commitment scheme built on the modulus and must never leave the
/// party that generated it.
#[derive(Debug, Clone)]
pub struct QrSpecialRsa {
    primes: SpecialRsaPrimes,
    public: QrSpecialRsaPublic,
    order: BigInt,
}

impl QrSpecialRsa {
    /// Generate a fresh group from safe primes of `safe_prime_bits` bits
    /// each; the modulus has `2 * safe_prime_bits` bits.
    pub fn new(rng: &mut impl Rng, safe_prime_bits: usize) -> Result<Self, Error> {
        let primes = SpecialRsaPrimes::generate(rng, safe_prime_bits)?;
        Ok(Self::from_primes(primes))
    }

    /// Reconstruct the group from a stored factorization.
    pub fn from_primes(primes: SpecialRsaPrimes) -> Self {
        let n = &primes.p * &primes.q;
        let order = &primes.p_prime * &primes.q_prime;
        QrSpecialRsa {
            primes,
            public: QrSpecialRsaPublic::new(n),
            order,
        }
    }

    /// The public view of this group.
    pub fn public(&self) -> QrSpecialRsaPublic {
        self.public.clone()
    }

    /// The safe-prime factorization. Trapdoor material.
    pub fn primes(&self) -> &SpecialRsaPrimes {
        &self.primes
    }

    /// The order `p*q` of the QR subgroup. Trapdoor material.
    pub fn subgroup_order(&self) -> &BigInt {
        &self.order
    }

    /// Returns a generator of the QR subgroup, of order exactly `p*q`.
    ///
    /// A uniform `a` in `Z_N` is rejected unless
    /// `gcd(a, P) = gcd(a - 1, P) = gcd(a + 1, P) = 1` and likewise for `Q`;
    /// each failing check would leave `a^2` with one of the smaller possible
    /// orders `{1, p, q}`. The returned element is `a^2 mod N`.
    pub fn random_generator(&self, rng: &mut impl Rng) -> Result<BigInt, Error> {
        let n = &self.public.n;
        for _ in 0..GENERATOR_ATTEMPTS {
            let a = random_below(rng, n);
            if self.is_generator_candidate(&a) {
                return Ok((&a * &a).mod_floor(n));
            }
        }
        Err(Error::GeneratorSearchFailed)
    }

    fn is_generator_candidate(&self, a: &BigInt) -> bool {
        let one = BigInt::one();
        for prime in [&self.primes.p, &self.primes.q] {
            if !a.gcd(prime).is_one() {
                return false;
            }
            if !(a - &one).gcd(prime).is_one() {
                return false;
            }
            if !(a + &one).gcd(prime).is_one() {
                return false;
            }
        }
        true
    }

    /// Returns a generator of the QR subgroup built by the Chinese remainder
    /// theorem from an order-`p` generator modulo `P` and an order-`q`
    /// generator modulo `Q`, together with a second generator `b^alpha` for
    /// a random invertible `alpha`.
    ///
    /// This is the Fujisaki-Okamoto construction; the pair is suitable as
    /// commitment bases with no dlog relation known to anyone but the owner.
    pub fn crt_generator_pair(&self, rng: &mut impl Rng) -> Result<(BigInt, BigInt), Error> {
        let g_p = subgroup_generator(rng, &self.primes.p, &self.primes.p_prime)?;
        let g_q = subgroup_generator(rng, &self.primes.q, &self.primes.q_prime)?;
        let b0 = arith::crt(&g_p, &g_q, &self.primes.p, &self.primes.q)?
            .mod_floor(&self.public.n);
        let alpha = random_invertible(rng, &self.order);
        let b1 = exponentiate(&b0, &alpha, &self.public.n);
        Ok((b0, b1))
    }
}

/// Returns an element of order `subgroup_order` in `Z_modulus^*`, where
/// `subgroup_order` divides `modulus - 1`.
fn subgroup_generator(
    rng: &mut impl Rng,
    modulus: &BigInt,
    subgroup_order: &BigInt,
) -> Result<BigInt, Error> {
    let cofactor = (modulus - 1) / subgroup_order;
    for _ in 0..GENERATOR_ATTEMPTS {
        let h = random_below(rng, modulus);
        let g = exponentiate(&h, &cofactor, modulus);
        if !g.is_one() && !g.is_zero() {
            return Ok(g);
        }
    }
    Err(Error::GeneratorSearchFailed)
}

impl CyclicGroup for QrSpecialRsa {
    fn modulus(&self) -> &BigInt {
        self.public.modulus()
    }

    fn exp(&self, base: &BigInt, exponent: &BigInt) -> BigInt {
        self.public.exp(base, exponent)
    }

    fn random_element(&self, rng: &mut impl Rng) -> BigInt {
        self.public.random_element(rng)
    }

    fn sample_mask(&self, rng: &mut impl Rng, challenge_bits: usize) -> BigInt {
        self.public.sample_mask(rng, challenge_bits)
    }

    fn reduce_response(&self, z: BigInt) -> BigInt {
        self.public.reduce_response(z)
    }
}
