/*!
Direct specializations of the [representation
proof](crate::proofs::representation): classic Schnorr proofs of knowledge
of a discrete logarithm, proofs of knowledge of the opening of a Pedersen
commitment (two bases `G, H`), and proofs that two public values share one
discrete logarithm.
*/

use crate::challenge::{Challenge, ChallengeBuilder, ChallengeDigest};
use crate::groups::{CyclicGroup, SchnorrGroup};
use crate::pedersen::PedersenParameters;
use crate::proofs::representation::{RepresentationProof, RepresentationProofBuilder};
use crate::{Error, Rng};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A partially-built [`SchnorrProof`]: knowledge of `x` with `y = g^x` in a
/// prime-order group.
#[derive(Debug)]
pub struct SchnorrProofBuilder<'a> {
    inner: RepresentationProofBuilder<'a, SchnorrGroup>,
}

impl<'a> SchnorrProofBuilder<'a> {
    /// Run the commitment phase over the group's generator.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        group: &'a SchnorrGroup,
        challenge_bits: usize,
    ) -> Self {
        let bases = [group.g.clone()];
        SchnorrProofBuilder {
            inner: RepresentationProofBuilder::generate_proof_commitments(
                rng,
                group,
                &bases,
                challenge_bits,
            ),
        }
    }

    /// Run the response phase to complete the proof.
    pub fn generate_proof_response(
        self,
        secret: &BigInt,
        challenge: &Challenge,
    ) -> Result<SchnorrProof, Error> {
        Ok(SchnorrProof {
            proof: self
                .inner
                .generate_proof_response(&[secret.clone()], challenge)?,
        })
    }
}

/// Proof of knowledge of the discrete logarithm of `y = g^x`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchnorrProof {
    /// The underlying single-base representation proof.
    pub proof: RepresentationProof,
}

impl SchnorrProof {
    /// Verify knowledge of the discrete logarithm of `y`.
    pub fn verify(&self, group: &SchnorrGroup, y: &BigInt, challenge: &Challenge) -> bool {
        let bases = [group.g.clone()];
        self.proof.verify(group, &bases, y, challenge)
    }
}

/// A partially-built [`CommitmentOpeningProof`]: knowledge of `(x, r)` with
/// `c = G^x * H^r` for Pedersen parameters.
#[derive(Debug)]
pub struct CommitmentOpeningProofBuilder<'a> {
    inner: RepresentationProofBuilder<'a, SchnorrGroup>,
}

impl<'a> CommitmentOpeningProofBuilder<'a> {
    /// Run the commitment phase over the bases `(G, H)`.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        params: &'a PedersenParameters,
        challenge_bits: usize,
    ) -> Self {
        let bases = [params.group().g.clone(), params.h().clone()];
        CommitmentOpeningProofBuilder {
            inner: RepresentationProofBuilder::generate_proof_commitments(
                rng,
                params.group(),
                &bases,
                challenge_bits,
            ),
        }
    }

    /// The round-one message `t`.
    pub fn mask_commitment(&self) -> &BigInt {
        self.inner.mask_commitment()
    }

    /// Run the response phase using the opening `(x, r)`.
    pub fn generate_proof_response(
        self,
        x: &BigInt,
        r: &BigInt,
        challenge: &Challenge,
    ) -> Result<CommitmentOpeningProof, Error> {
        Ok(CommitmentOpeningProof {
            proof: self
                .inner
                .generate_proof_response(&[x.clone(), r.clone()], challenge)?,
        })
    }
}

/// Proof of knowledge of the opening of a Pedersen commitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentOpeningProof {
    /// The underlying two-base representation proof.
    pub proof: RepresentationProof,
}

impl CommitmentOpeningProof {
    /// Verify knowledge of an opening of `commitment`.
    pub fn verify(
        &self,
        params: &PedersenParameters,
        commitment: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        let bases = [params.group().g.clone(), params.h().clone()];
        self.proof.verify(params.group(), &bases, commitment, challenge)
    }
}

/// A partially-built [`DlogEqualityProof`]: the prover knows `x` with
/// `y1 = g1^x` and `y2 = g2^x`.
#[derive(Debug)]
pub struct DlogEqualityProofBuilder<'a, G: CyclicGroup> {
    group: &'a G,
    mask: BigInt,
    mask_commitment1: BigInt,
    mask_commitment2: BigInt,
}

impl<'a, G: CyclicGroup> DlogEqualityProofBuilder<'a, G> {
    /// Run the commitment phase: one shared mask, one commitment per base.
    pub fn generate_proof_commitments(
        rng: &mut impl Rng,
        group: &'a G,
        g1: &BigInt,
        g2: &BigInt,
        challenge_bits: usize,
    ) -> Self {
        let mask = group.sample_mask(rng, challenge_bits);
        DlogEqualityProofBuilder {
            group,
            mask_commitment1: group.exp(g1, &mask),
            mask_commitment2: group.exp(g2, &mask),
            mask,
        }
    }

    /// Run the response phase: `z = r + c * x`.
    pub fn generate_proof_response(self, secret: &BigInt, challenge: &Challenge) -> DlogEqualityProof {
        let z = self
            .group
            .reduce_response(&self.mask + challenge.as_integer() * secret);
        DlogEqualityProof {
            mask_commitment1: self.mask_commitment1,
            mask_commitment2: self.mask_commitment2,
            response: z,
        }
    }
}

/// Proof that two public values share one discrete logarithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlogEqualityProof {
    /// Round-one commitment under the first base.
    pub mask_commitment1: BigInt,
    /// Round-one commitment under the second base.
    pub mask_commitment2: BigInt,
    /// The shared response.
    pub response: BigInt,
}

impl DlogEqualityProof {
    /// Verify that `log_{g1} y1 = log_{g2} y2`.
    pub fn verify<G: CyclicGroup>(
        &self,
        group: &G,
        g1: &BigInt,
        y1: &BigInt,
        g2: &BigInt,
        y2: &BigInt,
        challenge: &Challenge,
    ) -> bool {
        let check1 = group.exp(g1, &self.response)
            == group.mul(&group.exp(y1, challenge.as_integer()), &self.mask_commitment1);
        let check2 = group.exp(g2, &self.response)
            == group.mul(&group.exp(y2, challenge.as_integer()), &self.mask_commitment2);
        check1 && check2
    }
}

impl<'a> ChallengeDigest for CommitmentOpeningProofBuilder<'a> {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(self.mask_commitment());
    }
}

impl ChallengeDigest for CommitmentOpeningProof {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_integer(&self.proof.mask_commitment);
    }
}
