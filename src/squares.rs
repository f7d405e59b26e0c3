//! Sum-of-four-squares decomposition of nonnegative integers.
//!
//! The Boudot-style range proof shows `a <= x <= b` by proving that `x - a`
//! and `b - x` are nonnegative, and it does so by expressing each as a sum of
//! at most four squares (Lagrange's theorem guarantees one exists). The
//! decomposition here follows the randomized Rabin-Shallit method: strip
//! powers of four, reduce to a three-square case by residue class modulo
//! eight, and split a prime `p ≡ 1 (mod 4)` into two squares with the
//! Hermite-Serret reduction.

use crate::arith::random_below;
use crate::primes::is_probable_prime;
use crate::{Error, Rng};
use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Retry budget for the randomized prime searches.
const DECOMPOSITION_ATTEMPTS: usize = 10_000;

/// Below this bound, decompose by exhaustive search instead.
const SMALL_BOUND: u64 = 5_000;

/// Writes nonnegative `n` as `w1^2 + w2^2 + w3^2 + w4^2`.
pub fn four_squares(rng: &mut impl Rng, n: &BigInt) -> Result<[BigInt; 4], Error> {
    if n.is_negative() {
        return Err(Error::OutsideRange);
    }
    if let Some(small) = n.to_u64() {
        if small < SMALL_BOUND {
            return Ok(four_squares_small(small));
        }
    }

    // n = 4^k * m with m not divisible by 4; decompose m and scale by 2^k.
    let mut m = n.clone();
    let mut shift = 0usize;
    while (&m % 4u32).is_zero() {
        m >>= 2usize;
        shift += 1;
    }

    let residue = (&m % 8u32).to_u64().expect("residue fits in u64");
    let mut squares = match residue {
        3 => {
            let (w1, w2, w3) = three_squares_3_mod_8(rng, &m)?;
            [w1, w2, w3, BigInt::zero()]
        }
        7 => {
            // Peel off one odd square; the remainder is 6 mod 8, which the
            // three-square case below handles.
            let mut result = None;
            for _ in 0..DECOMPOSITION_ATTEMPTS {
                let w4 = random_below(rng, &(m.sqrt() + 1)) | BigInt::one();
                let rest = &m - &w4 * &w4;
                if !rest.is_positive() {
                    continue;
                }
                if let Ok((w1, w2, w3)) = three_squares_1_2_mod_4(rng, &rest) {
                    result = Some([w1, w2, w3, w4]);
                    break;
                }
            }
            result.ok_or(Error::SquareDecompositionFailed)?
        }
        _ => {
            // m mod 4 is 1 or 2.
            let (w1, w2, w3) = three_squares_1_2_mod_4(rng, &m)?;
            [w1, w2, w3, BigInt::zero()]
        }
    };

    for w in &mut squares {
        *w <<= shift;
    }
    debug_assert_eq!(
        &squares.iter().map(|w| w * w).sum::<BigInt>(),
        n,
        "four-square decomposition must recompose"
    );
    Ok(squares)
}

/// Three squares for `m` with `m mod 4` in `{1, 2}`: find `x` such that
/// `p = m - x^2` is 1 or a prime `≡ 1 (mod 4)`, then split `p`.
fn three_squares_1_2_mod_4(
    rng: &mut impl Rng,
    m: &BigInt,
) -> Result<(BigInt, BigInt, BigInt), Error> {
    let bound = m.sqrt() + 1;
    for _ in 0..DECOMPOSITION_ATTEMPTS {
        let mut x = random_below(rng, &bound);
        // Parity forces p ≡ 1 (mod 4): even x for odd m, odd x for even m.
        if m.is_odd() == x.is_odd() {
            x += BigInt::one();
        }
        let p = m - &x * &x;
        if !p.is_positive() {
            continue;
        }
        if p.is_one() {
            return Ok((x, BigInt::one(), BigInt::zero()));
        }
        if is_probable_prime(&p) {
            let (y, z) = two_squares(rng, &p)?;
            return Ok((x, y, z));
        }
    }
    Err(Error::SquareDecompositionFailed)
}

/// Three squares for `m ≡ 3 (mod 8)`: find odd `x` such that
/// `p = (m - x^2) / 2` is 1 or a prime `≡ 1 (mod 4)`; then with `p = y^2 + z^2`,
/// `m = x^2 + (y + z)^2 + (y - z)^2`.
fn three_squares_3_mod_8(
    rng: &mut impl Rng,
    m: &BigInt,
) -> Result<(BigInt, BigInt, BigInt), Error> {
    let bound = m.sqrt() + 1;
    for _ in 0..DECOMPOSITION_ATTEMPTS {
        let x = random_below(rng, &bound) | BigInt::one();
        let rest = m - &x * &x;
        if !rest.is_positive() {
            continue;
        }
        let p: BigInt = rest >> 1usize;
        if p.is_one() {
            return Ok((x, BigInt::from(2), BigInt::zero()));
        }
        if is_probable_prime(&p) {
            let (y, z) = two_squares(rng, &p)?;
            return Ok((x, &y + &z, (&y - &z).abs()));
        }
    }
    Err(Error::SquareDecompositionFailed)
}

/// Splits a prime `p ≡ 1 (mod 4)` as `y^2 + z^2` (Hermite-Serret).
fn two_squares(rng: &mut impl Rng, p: &BigInt) -> Result<(BigInt, BigInt), Error> {
    debug_assert!((p % 4u32).is_one());
    let exponent: BigInt = (p - 1) >> 2usize;
    let sqrt_p = p.sqrt();
    for _ in 0..DECOMPOSITION_ATTEMPTS {
        // u = b^((p-1)/4) is a square root of -1 exactly when b is a
        // non-residue, which half of all bases are.
        let b: BigInt = random_below(rng, &(p - 1)) + 1;
        let u = b.modpow(&exponent, p);
        if (&u * &u).mod_floor(p) != p - 1 {
            continue;
        }
        // Euclidean descent on (p, u); the first remainder at or below
        // sqrt(p) is one leg of the representation.
        let mut a = p.clone();
        let mut b = u;
        while b > sqrt_p {
            let r = a.mod_floor(&b);
            a = b;
            b = r;
        }
        let rest = p - &b * &b;
        let z = rest.sqrt();
        if &z * &z == rest {
            return Ok((b, z));
        }
    }
    Err(Error::SquareDecompositionFailed)
}

/// Exhaustive decomposition for small inputs.
fn four_squares_small(n: u64) -> [BigInt; 4] {
    let isqrt = |v: u64| (v as f64).sqrt() as u64 + 1;
    for w1 in 0..=isqrt(n) {
        if w1 * w1 > n {
            break;
        }
        let n1 = n - w1 * w1;
        for w2 in 0..=isqrt(n1) {
            if w2 * w2 > n1 {
                break;
            }
            let n2 = n1 - w2 * w2;
            for w3 in 0..=isqrt(n2) {
                if w3 * w3 > n2 {
                    break;
                }
                let n3 = n2 - w3 * w3;
                let w4 = (n3 as f64).sqrt() as u64;
                for candidate in w4.saturating_sub(1)..=w4 + 1 {
                    if candidate * candidate == n3 {
                        return [
                            BigInt::from(w1),
                            BigInt::from(w2),
                            BigInt::from(w3),
                            BigInt::from(candidate),
                        ];
                    }
                }
            }
        }
    }
    unreachable!("every nonnegative integer is a sum of four squares")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arith::random_bits;
    use crate::test::rng;

    fn recomposes(n: &BigInt, squares: &[BigInt; 4]) -> bool {
        &squares.iter().map(|w| w * w).sum::<BigInt>() == n
    }

    #[test]
    fn small_values_decompose() {
        let mut rng = rng();
        for n in 0u64..200 {
            let n = BigInt::from(n);
            let squares = four_squares(&mut rng, &n).unwrap();
            assert!(recomposes(&n, &squares), "failed for {}", n);
        }
    }

    #[test]
    fn large_values_decompose() {
        let mut rng = rng();
        for bits in [64, 128, 256] {
            for _ in 0..3 {
                let n = random_bits(&mut rng, bits);
                let squares = four_squares(&mut rng, &n).unwrap();
                assert!(recomposes(&n, &squares), "failed for {}", n);
            }
        }
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut rng = rng();
        let err = four_squares(&mut rng, &BigInt::from(-1)).unwrap_err();
        assert_eq!(err, Error::OutsideRange);
    }
}
