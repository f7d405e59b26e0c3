//! The user side of the credential scheme.
//!
//! A `CredentialManager` is created per user/issuer pair when a credential
//! is to be issued or proved; a new credential under a new nym needs a new
//! manager. Its session walks a fixed state progression: construction
//! generates the nym, the request phase generates `v'` (exactly once — it
//! is needed again at presentation), and verification or proving before the
//! request phase is an out-of-order usage error. A failed verification is
//! terminal for the session.

use crate::arith::{pow2, random_also_neg, random_bits};
use crate::challenge::ChallengeBuilder;
use crate::cl::{
    AttributeOpeningProof, Credential, CredentialPresentation, CredentialRequest, IssuerPublicKey,
    Params, SignatureProof,
};
use crate::damgard_fujisaki::DamgardFujisakiCommitter;
use crate::groups::CyclicGroup;
use crate::pedersen::PedersenCommitter;
use crate::primes::is_probable_prime;
use crate::proofs::representation::RepresentationProofBuilder;
use crate::proofs::schnorr::CommitmentOpeningProofBuilder;
use crate::proofs::OpeningProofBuilder;
use crate::{Error, Rng};
use num_bigint::BigInt;
use num_traits::Signed;

/// Per-session state a user keeps between requesting, receiving, and
/// presenting one credential.
#[derive(Debug)]
pub struct CredentialManager {
    params: Params,
    pub_key: IssuerPublicKey,
    master_secret: BigInt,
    known_attrs: Vec<BigInt>,
    committed_attrs: Vec<BigInt>,
    hidden_attrs: Vec<BigInt>,
    attr_committers: Vec<DamgardFujisakiCommitter>,
    attr_commitments: Vec<BigInt>,
    nym_committer: PedersenCommitter,
    nym: BigInt,
    /// `v'` is generated exactly once, in the request phase, and preserved
    /// for presentation.
    v_prime: Option<BigInt>,
    cred_req_nonce: Option<BigInt>,
}

impl CredentialManager {
    /// Set up a session: commit to every committed attribute under the
    /// issuer's parameters and derive a fresh nym for the master secret.
    pub fn new(
        rng: &mut impl Rng,
        params: Params,
        pub_key: IssuerPublicKey,
        master_secret: BigInt,
        known_attrs: Vec<BigInt>,
        committed_attrs: Vec<BigInt>,
        hidden_attrs: Vec<BigInt>,
    ) -> Result<Self, Error> {
        for attrs in [&known_attrs, &committed_attrs, &hidden_attrs] {
            for attr in attrs.iter() {
                if attr.is_negative() || attr.bits() as usize > params.attr_bit_len {
                    return Err(Error::AttributeTooWide(params.attr_bit_len));
                }
            }
        }
        for (attrs, expected) in [
            (&known_attrs, pub_key.rs_known().len()),
            (&committed_attrs, pub_key.rs_committed().len()),
            (&hidden_attrs, pub_key.rs_hidden().len()),
        ] {
            if attrs.len() != expected {
                return Err(Error::LengthMismatch {
                    expected,
                    got: attrs.len(),
                });
            }
        }

        let mut attr_committers = Vec::with_capacity(committed_attrs.len());
        let mut attr_commitments = Vec::with_capacity(committed_attrs.len());
        for attr in &committed_attrs {
            let mut committer = DamgardFujisakiCommitter::new(pub_key.attr_params().clone());
            attr_commitments.push(committer.commit(rng, attr.clone())?);
            attr_committers.push(committer);
        }

        let mut nym_committer = PedersenCommitter::new(pub_key.pedersen().clone());
        let nym = nym_committer.commit(rng, master_secret.clone())?;

        Ok(CredentialManager {
            params,
            pub_key,
            master_secret,
            known_attrs,
            committed_attrs,
            hidden_attrs,
            attr_committers,
            attr_commitments,
            nym_committer,
            nym,
            v_prime: None,
            cred_req_nonce: None,
        })
    }

    /// Sample a master secret for the pseudonym group of `pub_key`. The
    /// same master secret backs every nym a user derives.
    pub fn generate_master_secret(rng: &mut impl Rng, pub_key: &IssuerPublicKey) -> BigInt {
        crate::arith::random_below(rng, &pub_key.pedersen().group().q)
    }

    /// The session's pseudonym.
    pub fn nym(&self) -> &BigInt {
        &self.nym
    }

    /// Commitments to the committed attributes, in attribute order.
    pub fn attr_commitments(&self) -> &[BigInt] {
        &self.attr_commitments
    }

    /// Build a credential request against the issuer's nonce `n1`.
    ///
    /// Samples `v'` from `(-2^(|N| + κ), 2^(|N| + κ))`, forms
    /// `U = S^{v'} * prod R_i^{m_i}` over the hidden attributes, and
    /// produces the nym opening proof and the bounded `U` representation
    /// proof under the shared challenge `H(context, U, nym, n1)`, plus one
    /// opening proof per committed attribute.
    pub fn credential_request(
        &mut self,
        rng: &mut impl Rng,
        issuer_nonce: &BigInt,
    ) -> Result<CredentialRequest, Error> {
        if self.v_prime.is_some() {
            return Err(Error::OutOfOrder("credential request already issued"));
        }
        let pk = &self.pub_key;
        let group = pk.group();
        let n_bits = pk.n().bits() as usize;
        let context = pk.context();

        let v_prime = random_also_neg(rng, &pow2(n_bits + self.params.sec_param));
        let mut u = group.exp(pk.s(), &v_prime);
        for (base, attr) in pk.rs_hidden().iter().zip(&self.hidden_attrs) {
            u = group.mul(&u, &group.exp(base, attr));
        }

        let nym_builder = CommitmentOpeningProofBuilder::generate_proof_commitments(
            rng,
            pk.pedersen(),
            self.params.fs_challenge_bits(),
        );

        // Boundaries for the masks of the U proof: hidden attributes and v'.
        let attr_bound = self.params.attr_bit_len + self.params.fs_challenge_bits() + 1;
        let v_bound = n_bits + self.params.sec_param + self.params.fs_challenge_bits();
        let mut bounds = vec![attr_bound; self.hidden_attrs.len()];
        bounds.push(v_bound);
        let u_builder = RepresentationProofBuilder::generate_proof_commitments_with_bounds(
            rng,
            &group,
            &pk.u_bases(),
            &bounds,
            true,
        )?;

        let challenge = ChallengeBuilder::new()
            .with_integer(&context)
            .with_integer(&u)
            .with_integer(&self.nym)
            .with_integer(issuer_nonce)
            .finish();

        let (_, nym_randomness) = self.nym_committer.decommit()?;
        let nym_proof =
            nym_builder.generate_proof_response(&self.master_secret, nym_randomness, &challenge)?;

        let mut u_secrets = self.hidden_attrs.clone();
        u_secrets.push(v_prime.clone());
        let u_proof = u_builder.generate_proof_response(&u_secrets, &challenge)?;

        let mut attr_opening_proofs = Vec::with_capacity(self.attr_committers.len());
        for (committer, commitment) in self.attr_committers.iter().zip(&self.attr_commitments) {
            let builder = OpeningProofBuilder::generate_proof_commitments(
                rng,
                committer.params(),
                self.params.fs_challenge_bits(),
            );
            let attr_challenge = ChallengeBuilder::new()
                .with_integer(&context)
                .with_integer(commitment)
                .with_integer(builder.mask_commitment())
                .with_integer(issuer_nonce)
                .finish();
            let (attr, randomness) = committer.decommit()?;
            attr_opening_proofs.push(AttributeOpeningProof {
                proof: builder.generate_proof_response(attr, randomness, &attr_challenge),
                challenge: attr_challenge,
            });
        }

        let nonce = random_bits(rng, self.params.sec_param);
        self.v_prime = Some(v_prime);
        self.cred_req_nonce = Some(nonce.clone());

        Ok(CredentialRequest {
            nym: self.nym.clone(),
            u,
            attr_commitments: self.attr_commitments.clone(),
            challenge,
            nym_proof,
            u_proof,
            attr_opening_proofs,
            nonce,
        })
    }

    /// Verify a received credential and the issuer's signature proof.
    ///
    /// Checks that `e` is a prime of the prescribed interval, that
    /// `A^e = Q` for the `Q` this session expects, and that the signature
    /// proof binds `(context, Q, A, t_A, n2)` and verifies.
    pub fn verify_credential(
        &self,
        credential: &Credential,
        signature_proof: &SignatureProof,
    ) -> Result<(), Error> {
        let v_prime = self
            .v_prime
            .as_ref()
            .ok_or(Error::OutOfOrder("credential verified before request phase"))?;
        let nonce = self
            .cred_req_nonce
            .as_ref()
            .ok_or(Error::OutOfOrder("credential verified before request phase"))?;
        let pk = &self.pub_key;

        let lower = pow2(self.params.e_bit_len - 1);
        let upper = &lower + pow2(self.params.e1_bit_len - 1);
        if credential.e <= lower || credential.e >= upper {
            return Err(Error::VerificationFailed);
        }
        if !is_probable_prime(&credential.e) {
            return Err(Error::VerificationFailed);
        }

        let group = pk.group();
        let q = self.expected_q(v_prime, &credential.v);
        if group.exp(&credential.a, &credential.e) != q {
            return Err(Error::VerificationFailed);
        }

        let expected = ChallengeBuilder::new()
            .with_integer(&pk.context())
            .with_integer(&q)
            .with_integer(&credential.a)
            .with_integer(&signature_proof.proof.mask_commitment)
            .with_integer(nonce)
            .finish();
        if signature_proof.challenge != expected {
            return Err(Error::VerificationFailed);
        }

        if !signature_proof.proof.verify(
            &group,
            &[q],
            &credential.a,
            &signature_proof.challenge,
        ) {
            return Err(Error::VerificationFailed);
        }
        Ok(())
    }

    /// Present the credential against the verifier's nonce `n3`.
    ///
    /// Randomizes `(A, e, v'')` to `(A * S^r, e, v'' - e*r)` and produces
    /// one bounded representation proof over bases `(R_hidden..., A', S)`
    /// with secrets `(m_hidden..., e, v' + v'' - e*r)` and the challenge
    /// `H(context, t, n3)`.
    pub fn prove_credential(
        &self,
        rng: &mut impl Rng,
        credential: &Credential,
        verifier_nonce: &BigInt,
    ) -> Result<CredentialPresentation, Error> {
        let v_prime = self
            .v_prime
            .as_ref()
            .ok_or(Error::OutOfOrder("credential proved before request phase"))?;
        let pk = &self.pub_key;
        let group = pk.group();
        let n_bits = pk.n().bits() as usize;

        // Randomize the credential; the invariant A^e * S^v * ... = Z is
        // preserved because (A*S^r)^e * S^{v - e*r} = A^e * S^v.
        let r = random_bits(rng, n_bits + self.params.sec_param);
        let a_prime = group.mul(&credential.a, &group.exp(pk.s(), &r));
        let v_tail = &credential.v - &credential.e * &r;

        let bases = pk.presentation_bases(&a_prime);
        let mut secrets = self.hidden_attrs.clone();
        secrets.push(credential.e.clone());
        secrets.push(v_prime + v_tail);

        let attr_bound = self.params.attr_bit_len + self.params.fs_challenge_bits();
        let e_bound = self.params.e_bit_len + self.params.fs_challenge_bits();
        let v_bound = self.params.v_bit_len + self.params.fs_challenge_bits();
        let mut bounds = vec![attr_bound; self.hidden_attrs.len()];
        bounds.push(e_bound);
        bounds.push(v_bound);

        let builder = RepresentationProofBuilder::generate_proof_commitments_with_bounds(
            rng,
            &group,
            &bases,
            &bounds,
            true,
        )?;
        let challenge = ChallengeBuilder::new()
            .with_integer(&pk.context())
            .with_integer(builder.mask_commitment())
            .with_integer(verifier_nonce)
            .finish();
        let proof = builder.generate_proof_response(&secrets, &challenge)?;

        Ok(CredentialPresentation {
            a_prime,
            challenge,
            proof,
        })
    }

    /// The `Q` this session expects the issuer to have signed:
    /// `Z * (S^{v' + v''} * prod R_i^{attr_i})^{-1}` over all attributes,
    /// with attribute commitments standing in for committed attributes.
    fn expected_q(&self, v_prime: &BigInt, v_issuer: &BigInt) -> BigInt {
        let pk = &self.pub_key;
        let group = pk.group();
        let v = v_prime + v_issuer;
        let mut denom = group.exp(pk.s(), &v);
        for (base, attr) in pk.rs_known().iter().zip(&self.known_attrs) {
            denom = group.mul(&denom, &group.exp(base, attr));
        }
        for (base, commitment) in pk.rs_committed().iter().zip(&self.attr_commitments) {
            denom = group.mul(&denom, &group.exp(base, commitment));
        }
        for (base, attr) in pk.rs_hidden().iter().zip(&self.hidden_attrs) {
            denom = group.mul(&denom, &group.exp(base, attr));
        }
        group.mul(pk.z(), &group.inv(&denom))
    }

    /// The committed attributes, in commitment order.
    pub fn committed_attrs(&self) -> &[BigInt] {
        &self.committed_attrs
    }
}
