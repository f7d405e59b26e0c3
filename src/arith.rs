//! Arbitrary-precision modular arithmetic and sampling utilities.
//!
//! Everything in this crate computes over [`BigInt`]; group elements are
//! integers interpreted modulo a group-specific modulus, and Σ-protocol
//! response values are integers that may be negative or unreduced. The
//! helpers here are the shared substrate: the Chinese remainder theorem,
//! least common multiples, modular exponentiation with negative exponents,
//! and the uniform-sampling primitives used by every protocol.

use crate::{Error, Rng};
use num_bigint::{BigInt, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// `2^bits` as a [`BigInt`].
pub(crate) fn pow2(bits: usize) -> BigInt {
    BigInt::one() << bits
}

/// Returns the solution to `x ≡ a0 (mod n0)`, `x ≡ a1 (mod n1)`.
///
/// The moduli `n0` and `n1` must be coprime.
pub fn crt(a0: &BigInt, a1: &BigInt, n0: &BigInt, n1: &BigInt) -> Result<BigInt, Error> {
    // Find k, l such that k*n0 + l*n1 = 1; then x = a0*l*n1 + a1*k*n0.
    let gcd = n0.extended_gcd(n1);
    if !gcd.gcd.is_one() {
        return Err(Error::NotCoprime);
    }
    let x = a0 * &gcd.y * n1 + a1 * &gcd.x * n0;
    Ok(x)
}

/// Returns the least common multiple of `x` and `y`.
pub fn lcm(x: &BigInt, y: &BigInt) -> BigInt {
    (x * y).abs() / x.gcd(y)
}

/// Returns the inverse of `a` modulo `m`, if `gcd(a, m) = 1`.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    let gcd = a.extended_gcd(m);
    if gcd.gcd.is_one() {
        Some(gcd.x.mod_floor(m))
    } else {
        None
    }
}

/// Computes `x^y mod m`. Negative `y` are supported.
///
/// A negative exponent requires `gcd(x, m) = 1`; when the base is not
/// invertible the result is zero, which no honest group element ever equals.
pub fn exponentiate(x: &BigInt, y: &BigInt, m: &BigInt) -> BigInt {
    let base = x.mod_floor(m);
    if y.is_negative() {
        let r = base.modpow(&-y, m);
        mod_inverse(&r, m).unwrap_or_else(BigInt::zero)
    } else {
        base.modpow(y, m)
    }
}

/// Returns a uniformly random integer in `[0, bound)`.
pub fn random_below(rng: &mut impl Rng, bound: &BigInt) -> BigInt {
    debug_assert!(bound.is_positive());
    rng.gen_bigint_range(&BigInt::zero(), bound)
}

/// Returns a uniformly random integer in `[0, 2^bits)`.
pub fn random_bits(rng: &mut impl Rng, bits: usize) -> BigInt {
    BigInt::from(rng.gen_biguint(bits as u64))
}

/// Returns a uniformly random integer in `(-bound, bound)`.
pub fn random_also_neg(rng: &mut impl Rng, bound: &BigInt) -> BigInt {
    debug_assert!(bound.is_positive());
    rng.gen_bigint_range(&(BigInt::one() - bound), bound)
}

/// Returns a uniformly random element of `Z_modulus^*`, by rejection.
pub fn random_invertible(rng: &mut impl Rng, modulus: &BigInt) -> BigInt {
    loop {
        let a = random_below(rng, modulus);
        if a.gcd(modulus).is_one() {
            return a;
        }
    }
}
