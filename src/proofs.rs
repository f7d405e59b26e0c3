//! Zero-knowledge proofs of knowledge, built from one generic Σ-protocol.

pub mod df_equality;
pub mod df_multiplication;
pub mod df_opening;
pub mod df_range;
pub mod representation;
pub mod schnorr;

pub use df_equality::{EqualityProof, EqualityProofBuilder};
pub use df_multiplication::{
    MultiplicationProof, MultiplicationProofBuilder, SquareProof, SquareProofBuilder,
};
pub use df_opening::{OpeningProof, OpeningProofBuilder};
pub use df_range::{RangeProof, RangeProofBuilder};
pub use representation::{RepresentationProof, RepresentationProofBuilder};
pub use schnorr::{
    CommitmentOpeningProof, CommitmentOpeningProofBuilder, DlogEqualityProof,
    DlogEqualityProofBuilder, SchnorrProof, SchnorrProofBuilder,
};
