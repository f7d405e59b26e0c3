//! Primality testing and generation of primes and safe-prime pairs.
//!
//! The special-RSA moduli used by the hidden-order groups are products of two
//! *safe primes*: primes `P` such that `(P-1)/2` is also prime. Candidates
//! are filtered by trial division against a table of small primes before
//! running Miller-Rabin, which makes the search practical at the 512-bit
//! sizes the credential scheme uses. All searches are bounded by an attempt
//! budget and report [`Error::PrimeGenerationFailed`] on exhaustion so the
//! caller may retry.

use crate::arith::{pow2, random_bits};
use crate::{Error, Rng};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Number of Miller-Rabin rounds. Error probability is at most `4^-ROUNDS`.
const MILLER_RABIN_ROUNDS: usize = 30;

/// Bases for the Miller-Rabin rounds: the smallest primes. The first twelve
/// make the test deterministic for inputs below 3.3 * 10^24.
const MILLER_RABIN_BASES: [u32; 30] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113,
];

/// Small primes used to cheaply reject composite candidates by trial division.
const TRIAL_DIVISION_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Returns true if `n` is probably prime.
///
/// Trial division against a table of small primes, then [`MILLER_RABIN_ROUNDS`]
/// rounds of Miller-Rabin.
pub fn is_probable_prime(n: &BigInt) -> bool {
    if n < &BigInt::from(2) {
        return false;
    }
    for p in TRIAL_DIVISION_PRIMES {
        let p = BigInt::from(p);
        if (n % &p).is_zero() {
            return *n == p;
        }
    }

    // Write n - 1 = d * 2^s with d odd.
    let n_minus_1: BigInt = n - 1;
    let mut d = n_minus_1.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    'base: for base in MILLER_RABIN_BASES.iter().take(MILLER_RABIN_ROUNDS) {
        let mut x = BigInt::from(*base).modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&BigInt::from(2), n);
            if x == n_minus_1 {
                continue 'base;
            }
        }
        return false;
    }
    true
}

/// Returns a random candidate of exactly `bits` bits with the low bit set.
fn odd_candidate(rng: &mut impl Rng, bits: usize) -> BigInt {
    debug_assert!(bits >= 2);
    random_bits(rng, bits - 1) | pow2(bits - 1) | BigInt::one()
}

/// Returns a uniformly random prime of exactly `bits` bits.
pub fn random_prime(rng: &mut impl Rng, bits: usize) -> Result<BigInt, Error> {
    let budget = 64 * bits;
    for _ in 0..budget {
        let candidate = odd_candidate(rng, bits);
        if is_probable_prime(&candidate) {
            return Ok(candidate);
        }
    }
    Err(Error::PrimeGenerationFailed)
}

/// A pair of safe primes with their Sophie Germain halves.
///
/// Invariants: `p = 2*p_prime + 1`, `q = 2*q_prime + 1`, and all four are
/// prime. The product `p * q` is a special-RSA modulus; `p_prime * q_prime`
/// is the order of its quadratic-residue subgroup. These values are the
/// trapdoor of every scheme built on the modulus and must stay with the
/// party that generated them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialRsaPrimes {
    /// Safe prime `p = 2*p_prime + 1`.
    pub p: BigInt,
    /// Safe prime `q = 2*q_prime + 1`.
    pub q: BigInt,
    /// Sophie Germain prime `(p - 1) / 2`.
    pub p_prime: BigInt,
    /// Sophie Germain prime `(q - 1) / 2`.
    pub q_prime: BigInt,
}

/// Returns a safe prime of exactly `bits` bits together with its Sophie
/// Germain half.
fn safe_prime(rng: &mut impl Rng, bits: usize) -> Result<(BigInt, BigInt), Error> {
    let budget = bits * bits;
    for _ in 0..budget {
        let half = odd_candidate(rng, bits - 1);
        let candidate = (&half << 1) + 1;
        // Trial-divide the safe-prime candidate first; it rejects most halves
        // without a single Miller-Rabin round.
        if trial_division_survivor(&candidate)
            && is_probable_prime(&half)
            && is_probable_prime(&candidate)
        {
            return Ok((candidate, half));
        }
    }
    Err(Error::PrimeGenerationFailed)
}

fn trial_division_survivor(n: &BigInt) -> bool {
    TRIAL_DIVISION_PRIMES
        .iter()
        .all(|p| !(n % BigInt::from(*p)).is_zero())
}

impl SpecialRsaPrimes {
    /// Generate a pair of distinct safe primes, each of exactly `bits` bits.
    pub fn generate(rng: &mut impl Rng, bits: usize) -> Result<Self, Error> {
        let (p, p_prime) = safe_prime(rng, bits)?;
        loop {
            let (q, q_prime) = safe_prime(rng, bits)?;
            if q != p {
                return Ok(SpecialRsaPrimes {
                    p,
                    q,
                    p_prime,
                    q_prime,
                });
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::rng;

    #[test]
    fn miller_rabin_agrees_with_small_primes() {
        let primes = [2u32, 3, 5, 7, 257, 7919, 65537];
        for p in primes {
            assert!(is_probable_prime(&BigInt::from(p)), "{} is prime", p);
        }
        let composites = [1u32, 4, 255, 561, 7921, 65535];
        for c in composites {
            assert!(!is_probable_prime(&BigInt::from(c)), "{} is composite", c);
        }
    }

    #[test]
    fn random_prime_has_exact_bit_length() {
        let mut rng = rng();
        for bits in [32, 64, 128] {
            let p = random_prime(&mut rng, bits).unwrap();
            assert_eq!(p.bits(), bits as u64);
            assert!(is_probable_prime(&p));
        }
    }

    #[test]
    fn special_rsa_primes_satisfy_invariants() {
        let mut rng = rng();
        let primes = SpecialRsaPrimes::generate(&mut rng, 128).unwrap();
        assert_eq!(primes.p.bits(), 128);
        assert_eq!(primes.q.bits(), 128);
        assert_eq!(&primes.p, &(&primes.p_prime * 2 + 1));
        assert_eq!(&primes.q, &(&primes.q_prime * 2 + 1));
        for n in [&primes.p, &primes.q, &primes.p_prime, &primes.q_prime] {
            assert!(is_probable_prime(n));
        }
    }
}
