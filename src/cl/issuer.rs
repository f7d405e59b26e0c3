//! The issuer (organization) side of the credential scheme.
//!
//! The issuer owns the special-RSA modulus the credentials live on — and
//! with it the factorization, which is what lets it compute `e`-th roots —
//! plus the exponents behind `Z` and the attribute bases `R_i`. It also
//! generates the Pedersen parameters users derive pseudonyms under, and a
//! second Damgård-Fujisaki parameter set (on its own modulus) that users
//! place committed attributes in.

use crate::arith::{mod_inverse, pow2, random_below, random_bits};
use crate::challenge::ChallengeBuilder;
use crate::cl::{Credential, CredentialPresentation, CredentialRequest, Params, SignatureProof};
use crate::damgard_fujisaki::{DamgardFujisakiParameters, DamgardFujisakiReceiver};
use crate::groups::{CyclicGroup, QrSpecialRsa, QrSpecialRsaPublic};
use crate::pedersen::{PedersenParameters, PedersenReceiver};
use crate::primes::is_probable_prime;
use crate::proofs::representation::RepresentationProof;
use crate::{Error, Rng};
use num_bigint::{BigInt, Sign};
use num_traits::Signed;
use serde::{Deserialize, Serialize};

/// Attempt budget for the search for the prime exponent `e`.
const EXPONENT_PRIME_ATTEMPTS: usize = 100_000;

/// How many attributes of each kind an issuer key covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCounts {
    /// Attributes the issuer learns in the clear.
    pub known: usize,
    /// Attributes the issuer sees only a commitment to.
    pub committed: usize,
    /// Attributes only the user ever sees.
    pub hidden: usize,
}

/// The public key of an issuer: everything a user needs to request and
/// present credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerPublicKey {
    n: BigInt,
    s: BigInt,
    z: BigInt,
    rs_known: Vec<BigInt>,
    rs_committed: Vec<BigInt>,
    rs_hidden: Vec<BigInt>,
    attr_params: DamgardFujisakiParameters,
    pedersen: PedersenParameters,
}

impl IssuerPublicKey {
    /// The credential modulus `N`.
    pub fn n(&self) -> &BigInt {
        &self.n
    }

    /// The base `S`, a generator of the QR subgroup of `N`.
    pub fn s(&self) -> &BigInt {
        &self.s
    }

    /// The value `Z = S^{x_Z}`.
    pub fn z(&self) -> &BigInt {
        &self.z
    }

    /// Bases for the known attributes.
    pub fn rs_known(&self) -> &[BigInt] {
        &self.rs_known
    }

    /// Bases for the committed attributes.
    pub fn rs_committed(&self) -> &[BigInt] {
        &self.rs_committed
    }

    /// Bases for the hidden attributes.
    pub fn rs_hidden(&self) -> &[BigInt] {
        &self.rs_hidden
    }

    /// Parameters for the commitments to committed attributes.
    pub fn attr_params(&self) -> &DamgardFujisakiParameters {
        &self.attr_params
    }

    /// Parameters for the pseudonym commitments.
    pub fn pedersen(&self) -> &PedersenParameters {
        &self.pedersen
    }

    /// The public view of the credential group.
    pub fn group(&self) -> QrSpecialRsaPublic {
        QrSpecialRsaPublic::new(self.n.clone())
    }

    /// The context value binding all long-lived public parameters: the
    /// concatenated canonical bytes of `N`, `S`, `Z` and every attribute
    /// base, read as one nonnegative integer. Every Fiat-Shamir transcript
    /// in the scheme starts with it.
    pub fn context(&self) -> BigInt {
        let mut bytes = Vec::new();
        let numbers = [&self.n, &self.s, &self.z]
            .into_iter()
            .chain(&self.rs_known)
            .chain(&self.rs_committed)
            .chain(&self.rs_hidden);
        for number in numbers {
            let (_, magnitude) = number.to_bytes_be();
            bytes.extend_from_slice(&magnitude);
        }
        BigInt::from_bytes_be(Sign::Plus, &bytes)
    }

    /// The presentation bases `(R_hidden..., A', S)`.
    pub(crate) fn presentation_bases(&self, a_prime: &BigInt) -> Vec<BigInt> {
        let mut bases = self.rs_hidden.clone();
        bases.push(a_prime.clone());
        bases.push(self.s.clone());
        bases
    }

    /// The issuance bases `(R_hidden..., S)` for the `U` proof.
    pub(crate) fn u_bases(&self) -> Vec<BigInt> {
        let mut bases = self.rs_hidden.clone();
        bases.push(self.s.clone());
        bases
    }

    /// `Z * (prod R_i^{m_i} * prod R_j^{C_j})^{-1}` over the known
    /// attributes and attribute commitments: the public value of the
    /// presentation proof.
    pub(crate) fn presentation_target(
        &self,
        known_attrs: &[BigInt],
        attr_commitments: &[BigInt],
    ) -> BigInt {
        let group = self.group();
        let mut denom = BigInt::from(1);
        for (base, attr) in self.rs_known.iter().zip(known_attrs) {
            denom = group.mul(&denom, &group.exp(base, attr));
        }
        for (base, commitment) in self.rs_committed.iter().zip(attr_commitments) {
            denom = group.mul(&denom, &group.exp(base, commitment));
        }
        group.mul(&self.z, &group.inv(&denom))
    }
}

/// Samples `count` exponents from `[0, order)` and the bases `S^x` they
/// define.
fn sample_bases(
    rng: &mut impl Rng,
    group: &QrSpecialRsa,
    s: &BigInt,
    order: &BigInt,
    count: usize,
) -> (Vec<BigInt>, Vec<BigInt>) {
    let mut exponents = Vec::with_capacity(count);
    let mut bases = Vec::with_capacity(count);
    for _ in 0..count {
        let x = random_below(rng, order);
        bases.push(group.exp(s, &x));
        exponents.push(x);
    }
    (exponents, bases)
}

/// An issuer: the public key plus every trapdoor behind it.
#[derive(Debug)]
pub struct Issuer {
    params: Params,
    group: QrSpecialRsa,
    x_z: BigInt,
    x_rs_known: Vec<BigInt>,
    x_rs_committed: Vec<BigInt>,
    x_rs_hidden: Vec<BigInt>,
    attr_receiver: DamgardFujisakiReceiver,
    pedersen_receiver: PedersenReceiver,
    pub_key: IssuerPublicKey,
}

impl Issuer {
    /// Generate a fresh issuer key for the given attribute partition.
    pub fn new(rng: &mut impl Rng, params: Params, counts: AttributeCounts) -> Result<Self, Error> {
        let group = QrSpecialRsa::new(rng, params.n_bit_len / 2)?;
        let s = group.random_generator(rng)?;
        let order = group.subgroup_order().clone();

        let x_z = random_below(rng, &order);
        let z = group.exp(&s, &x_z);

        let (x_rs_known, rs_known) = sample_bases(&mut *rng, &group, &s, &order, counts.known);
        let (x_rs_committed, rs_committed) =
            sample_bases(&mut *rng, &group, &s, &order, counts.committed);
        let (x_rs_hidden, rs_hidden) = sample_bases(&mut *rng, &group, &s, &order, counts.hidden);

        let attr_receiver =
            DamgardFujisakiReceiver::new(rng, params.n_bit_len / 2, params.sec_param)?;
        let pedersen_receiver = PedersenReceiver::new(rng, params.rho_bit_len)?;

        let pub_key = IssuerPublicKey {
            n: group.modulus().clone(),
            s,
            z,
            rs_known,
            rs_committed,
            rs_hidden,
            attr_params: attr_receiver.params().clone(),
            pedersen: pedersen_receiver.params().clone(),
        };

        Ok(Issuer {
            params,
            group,
            x_z,
            x_rs_known,
            x_rs_committed,
            x_rs_hidden,
            attr_receiver,
            pedersen_receiver,
            pub_key,
        })
    }

    /// The public key.
    pub fn public_key(&self) -> &IssuerPublicKey {
        &self.pub_key
    }

    /// The parameter set this issuer was generated for.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A fresh protocol nonce from `[0, 2^κ)`.
    pub fn generate_nonce(&self, rng: &mut impl Rng) -> BigInt {
        random_bits(rng, self.params.sec_param)
    }

    /// Verify a credential request against the nonce this issuer handed
    /// out: the shared challenge binding, the nym opening proof, the `U`
    /// representation proof, and each committed attribute's opening proof.
    pub fn verify_credential_request(
        &self,
        request: &CredentialRequest,
        nonce: &BigInt,
    ) -> Result<(), Error> {
        let pk = &self.pub_key;
        if request.attr_commitments.len() != pk.rs_committed.len() {
            return Err(Error::LengthMismatch {
                expected: pk.rs_committed.len(),
                got: request.attr_commitments.len(),
            });
        }
        if request.attr_opening_proofs.len() != request.attr_commitments.len() {
            return Err(Error::LengthMismatch {
                expected: request.attr_commitments.len(),
                got: request.attr_opening_proofs.len(),
            });
        }

        let expected = ChallengeBuilder::new()
            .with_integer(&pk.context())
            .with_integer(&request.u)
            .with_integer(&request.nym)
            .with_integer(nonce)
            .finish();
        if request.challenge != expected {
            return Err(Error::VerificationFailed);
        }

        if !request
            .nym_proof
            .verify(&pk.pedersen, &request.nym, &request.challenge)
        {
            return Err(Error::VerificationFailed);
        }

        let group = pk.group();
        if !request
            .u_proof
            .verify(&group, &pk.u_bases(), &request.u, &request.challenge)
        {
            return Err(Error::VerificationFailed);
        }

        for (commitment, opening) in request
            .attr_commitments
            .iter()
            .zip(&request.attr_opening_proofs)
        {
            let expected = ChallengeBuilder::new()
                .with_integer(&pk.context())
                .with_integer(commitment)
                .with_integer(&opening.proof.mask_commitment)
                .with_integer(nonce)
                .finish();
            if opening.challenge != expected {
                return Err(Error::VerificationFailed);
            }
            if !opening
                .proof
                .verify(&pk.attr_params, commitment, &opening.challenge)
            {
                return Err(Error::VerificationFailed);
            }
        }
        Ok(())
    }

    /// Verify the request, then issue a credential over it.
    ///
    /// Picks a prime `e` from `(2^{l_e - 1}, 2^{l_e - 1} + 2^{l_e' - 1})`
    /// and `v''` from `[0, 2^{|N| + κ})`, computes `A = Q^{e^{-1}}` for
    ///
    /// ```text
    /// Q = Z * (U * S^{v''} * prod R_i^{m_i} * prod R_j^{C_j})^{-1}
    /// ```
    ///
    /// and returns the credential together with a proof that `A` was raised
    /// to `e` correctly, bound to the user's nonce.
    pub fn issue_credential(
        &self,
        rng: &mut impl Rng,
        request: &CredentialRequest,
        nonce: &BigInt,
        known_attrs: &[BigInt],
    ) -> Result<(Credential, SignatureProof), Error> {
        self.verify_credential_request(request, nonce)?;
        let pk = &self.pub_key;
        if known_attrs.len() != pk.rs_known.len() {
            return Err(Error::LengthMismatch {
                expected: pk.rs_known.len(),
                got: known_attrs.len(),
            });
        }
        for attr in known_attrs {
            if attr.is_negative() || attr.bits() as usize > self.params.attr_bit_len {
                return Err(Error::AttributeTooWide(self.params.attr_bit_len));
            }
        }

        let e = self.sample_exponent_prime(rng)?;
        let n_bits = pk.n.bits() as usize;
        let v = random_bits(rng, n_bits + self.params.sec_param);

        let group = pk.group();
        let mut denom = group.mul(&request.u, &group.exp(&pk.s, &v));
        for (base, attr) in pk.rs_known.iter().zip(known_attrs) {
            denom = group.mul(&denom, &group.exp(base, attr));
        }
        for (base, commitment) in pk.rs_committed.iter().zip(&request.attr_commitments) {
            denom = group.mul(&denom, &group.exp(base, commitment));
        }
        let q = group.mul(&pk.z, &group.inv(&denom));

        // The e-th root needs the trapdoor: e^{-1} modulo the subgroup order.
        let e_inv = mod_inverse(&e, self.group.subgroup_order()).ok_or(Error::NotCoprime)?;
        let a = group.exp(&q, &e_inv);

        // Representation proof over base Q that A = Q^{e^{-1}}.
        let mask_bound = pow2(n_bits + self.params.sec_param + self.params.hash_bit_len);
        let mask = random_below(rng, &mask_bound);
        let mask_commitment = group.exp(&q, &mask);
        let challenge = ChallengeBuilder::new()
            .with_integer(&pk.context())
            .with_integer(&q)
            .with_integer(&a)
            .with_integer(&mask_commitment)
            .with_integer(&request.nonce)
            .finish();
        let response = mask + challenge.as_integer() * &e_inv;

        let signature_proof = SignatureProof {
            challenge,
            proof: RepresentationProof {
                mask_commitment,
                responses: vec![response],
            },
        };
        Ok((Credential { a, e, v }, signature_proof))
    }

    /// Verify a credential presentation against the nonce this issuer
    /// handed out, the known attributes, and the attribute commitments
    /// retained from issuance.
    pub fn verify_credential_proof(
        &self,
        presentation: &CredentialPresentation,
        nonce: &BigInt,
        known_attrs: &[BigInt],
        attr_commitments: &[BigInt],
    ) -> Result<(), Error> {
        let pk = &self.pub_key;
        if known_attrs.len() != pk.rs_known.len() {
            return Err(Error::LengthMismatch {
                expected: pk.rs_known.len(),
                got: known_attrs.len(),
            });
        }
        if attr_commitments.len() != pk.rs_committed.len() {
            return Err(Error::LengthMismatch {
                expected: pk.rs_committed.len(),
                got: attr_commitments.len(),
            });
        }

        let expected = ChallengeBuilder::new()
            .with_integer(&pk.context())
            .with_integer(&presentation.proof.mask_commitment)
            .with_integer(nonce)
            .finish();
        if presentation.challenge != expected {
            return Err(Error::VerificationFailed);
        }

        let group = pk.group();
        let bases = pk.presentation_bases(&presentation.a_prime);
        let target = pk.presentation_target(known_attrs, attr_commitments);
        if !presentation
            .proof
            .verify(&group, &bases, &target, &presentation.challenge)
        {
            return Err(Error::VerificationFailed);
        }
        Ok(())
    }

    /// A prime `e` with `2^{l_e - 1} < e < 2^{l_e - 1} + 2^{l_e' - 1}`.
    fn sample_exponent_prime(&self, rng: &mut impl Rng) -> Result<BigInt, Error> {
        let base = pow2(self.params.e_bit_len - 1);
        let width = pow2(self.params.e1_bit_len - 1);
        for _ in 0..EXPONENT_PRIME_ATTEMPTS {
            let candidate = &base + random_below(rng, &width);
            if candidate == base {
                continue;
            }
            if is_probable_prime(&candidate) {
                return Ok(candidate);
            }
        }
        Err(Error::PrimeGenerationFailed)
    }

    /// The receiver holding the attribute-commitment trapdoor.
    pub fn attr_receiver(&self) -> &DamgardFujisakiReceiver {
        &self.attr_receiver
    }

    /// The receiver holding the pseudonym trapdoor.
    pub fn pedersen_receiver(&self) -> &PedersenReceiver {
        &self.pedersen_receiver
    }

    /// The exponents behind `Z` and the attribute bases.
    pub fn base_exponents(&self) -> (&BigInt, &[BigInt], &[BigInt], &[BigInt]) {
        (
            &self.x_z,
            &self.x_rs_known,
            &self.x_rs_committed,
            &self.x_rs_hidden,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::rng;

    fn small_params() -> Params {
        Params {
            n_bit_len: 256,
            rho_bit_len: 160,
            attr_bit_len: 32,
            e_bit_len: 40,
            e1_bit_len: 20,
            v_bit_len: 416,
            sec_param: 40,
            hash_bit_len: 512,
        }
    }

    #[test]
    fn issuer_key_structure_is_consistent() {
        let mut rng = rng();
        let issuer = Issuer::new(
            &mut rng,
            small_params(),
            AttributeCounts {
                known: 2,
                committed: 1,
                hidden: 1,
            },
        )
        .unwrap();
        let pk = issuer.public_key();
        let group = pk.group();

        // Z and every base are powers of S under the stored exponents.
        let (x_z, x_known, x_committed, x_hidden) = issuer.base_exponents();
        assert_eq!(pk.z(), &group.exp(pk.s(), x_z));
        for (x, r) in x_known.iter().zip(pk.rs_known()) {
            assert_eq!(r, &group.exp(pk.s(), x));
        }
        for (x, r) in x_committed.iter().zip(pk.rs_committed()) {
            assert_eq!(r, &group.exp(pk.s(), x));
        }
        for (x, r) in x_hidden.iter().zip(pk.rs_hidden()) {
            assert_eq!(r, &group.exp(pk.s(), x));
        }

        // The trapdoors of the auxiliary parameter sets stay with the issuer.
        assert!(issuer.pedersen_receiver().trapdoor().is_some());
        assert_eq!(issuer.attr_receiver().params(), pk.attr_params());

        // The attribute commitments live on their own modulus.
        assert_ne!(pk.attr_params().n(), pk.n());
    }

    #[test]
    fn exponent_prime_is_in_the_prescribed_interval() {
        let mut rng = rng();
        let issuer = Issuer::new(
            &mut rng,
            small_params(),
            AttributeCounts {
                known: 1,
                committed: 0,
                hidden: 0,
            },
        )
        .unwrap();
        let lower = pow2(issuer.params().e_bit_len - 1);
        let upper = &lower + pow2(issuer.params().e1_bit_len - 1);
        for _ in 0..5 {
            let e = issuer.sample_exponent_prime(&mut rng).unwrap();
            assert!(e > lower && e < upper);
            assert!(is_probable_prime(&e));
        }
    }
}
