/*!
Camenisch-Lysyanskaya anonymous credentials with selective disclosure.

A user holds a long-term master secret and derives a per-organization
pseudonym (*nym*) as a Pedersen commitment to it. The issuer signs an
attribute vector — partitioned into *known*, *committed*, and *hidden*
subsets — producing a credential `(A, e, v)` over its special-RSA modulus
satisfying

```text
A^e * S^v * prod R_i^{attr_i} = Z  (mod N)
```

with `e` a prime from a prescribed interval and `v = v' + v''` combining a
user-chosen and an issuer-chosen part. Later the user proves possession of
a valid credential under a randomized `A' = A * S^r` without revealing the
hidden attributes, `e`, or `v`.

The issuance and presentation exchanges are sequenced compositions of the
Σ-protocols in [`proofs`](crate::proofs), made non-interactive with
Fiat-Shamir challenges over a canonical transcript that starts with the
issuer's [context](issuer::IssuerPublicKey::context) (see
[`challenge`](crate::challenge)).

[1] J. Camenisch and A. Lysyanskaya. A signature scheme with efficient
protocols. SCN 2002.
*/

pub mod issuer;
pub mod manager;

pub use issuer::{AttributeCounts, Issuer, IssuerPublicKey};
pub use manager::CredentialManager;

use crate::challenge::Challenge;
use crate::proofs::representation::RepresentationProof;
use crate::proofs::schnorr::CommitmentOpeningProof;
use crate::proofs::OpeningProof;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Bit-length parameters of the credential scheme. All values are in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Bit length of the issuer's RSA modulus.
    pub n_bit_len: usize,
    /// Bit length of the order of the pseudonym (Pedersen) group.
    pub rho_bit_len: usize,
    /// Maximum bit length of an attribute.
    pub attr_bit_len: usize,
    /// Bit length of the prime exponent `e`.
    pub e_bit_len: usize,
    /// Bit length of the interval `e` is drawn from.
    pub e1_bit_len: usize,
    /// Bit length of `v`.
    pub v_bit_len: usize,
    /// Statistical security parameter.
    pub sec_param: usize,
    /// Output length of the challenge hash.
    pub hash_bit_len: usize,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            n_bit_len: 1024,
            rho_bit_len: 256,
            attr_bit_len: 160,
            e_bit_len: 596,
            e1_bit_len: 120,
            v_bit_len: 1184,
            sec_param: 80,
            hash_bit_len: 512,
        }
    }
}

impl Params {
    /// Challenge-space size of the Fiat-Shamir proofs: the hash digest plus
    /// the statistical parameter.
    pub(crate) fn fs_challenge_bits(&self) -> usize {
        self.sec_param + self.hash_bit_len
    }
}

/// A CL credential over an attribute vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The signature value `A`.
    pub a: BigInt,
    /// The prime exponent.
    pub e: BigInt,
    /// The issuer-chosen part `v''` of `v`; the user completes it with its
    /// own `v'`.
    pub v: BigInt,
}

/// A Fiat-Shamir opening proof for one committed attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeOpeningProof {
    /// The challenge, bound to `(context, C_j, t_j, nonce)`.
    pub challenge: Challenge,
    /// The underlying Damgård-Fujisaki opening proof.
    pub proof: OpeningProof,
}

/// A user's request for a credential.
///
/// Carries the pseudonym, the blinded attribute carrier `U`, the committed
/// attributes, and the proofs the issuer verifies before signing: the nym
/// opening proof and the `U` representation proof under one shared
/// challenge, plus one opening proof per committed attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRequest {
    /// The pseudonym, a Pedersen commitment to the master secret.
    pub nym: BigInt,
    /// `U = S^{v'} * prod R_i^{m_i}` over the hidden attributes.
    pub u: BigInt,
    /// Damgård-Fujisaki commitments to the committed attributes.
    pub attr_commitments: Vec<BigInt>,
    /// The shared challenge, bound to `(context, U, nym, n1)`.
    pub challenge: Challenge,
    /// Proof that the nym opens to the master secret.
    pub nym_proof: CommitmentOpeningProof,
    /// Bounded representation proof that `U` has the claimed structure.
    pub u_proof: RepresentationProof,
    /// One opening proof per committed attribute.
    pub attr_opening_proofs: Vec<AttributeOpeningProof>,
    /// Fresh user nonce `n2`, echoed in the issuer's signature proof.
    pub nonce: BigInt,
}

/// The issuer's proof that `A` was computed as `Q^{e^{-1}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureProof {
    /// The challenge, bound to `(context, Q, A, t_A, n2)`.
    pub challenge: Challenge,
    /// Single-base representation proof of `A = Q^{e^{-1}}`.
    pub proof: RepresentationProof,
}

/// A presentation of a credential: the randomized `A'` together with a
/// proof of possession over the hidden attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialPresentation {
    /// The randomized signature value `A' = A * S^r`.
    pub a_prime: BigInt,
    /// The challenge, bound to `(context, t, n3)`.
    pub challenge: Challenge,
    /// Bounded representation proof over bases `(R_hidden..., A', S)`.
    pub proof: RepresentationProof,
}
