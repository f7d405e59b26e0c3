use anoncreds_crypto::arith::random_below;
use anoncreds_crypto::challenge::Challenge;
use anoncreds_crypto::damgard_fujisaki::{DamgardFujisakiCommitter, DamgardFujisakiReceiver};
use anoncreds_crypto::proofs::{
    EqualityProofBuilder, MultiplicationProofBuilder, OpeningProofBuilder, RangeProofBuilder,
};
use num_bigint::BigInt;
use num_integer::Roots;
use rand::SeedableRng;

// Seeded rng for replicable tests.
fn rng() -> (impl rand::CryptoRng + rand::RngCore) {
    const TEST_RNG_SEED: [u8; 32] = *b"INSECURE SEED FOR TESTING ONLY!!";
    rand::rngs::StdRng::from_seed(TEST_RNG_SEED)
}

#[test]
fn opening_proof_on_full_size_modulus() {
    let mut rng = rng();
    // |N| = 1024: safe primes of 512 bits each.
    let mut receiver = DamgardFujisakiReceiver::new(&mut rng, 512, 80).unwrap();
    let mut committer = DamgardFujisakiCommitter::new(receiver.params().clone());

    let x = random_below(&mut rng, receiver.params().t());
    let c = committer.commit(&mut rng, x).unwrap();
    receiver.set_commitment(c);

    let builder = OpeningProofBuilder::generate_proof_commitments(&mut rng, committer.params(), 80);
    let challenge = Challenge::random(&mut rng, 80);
    let (x, r) = committer.decommit().unwrap();
    let proof = builder.generate_proof_response(x, r, &challenge);

    assert!(proof.verify(receiver.params(), receiver.commitment().unwrap(), &challenge));
}

#[test]
fn multiplication_proof_accepts_products_and_rejects_others() {
    let mut rng = rng();
    let receiver1 = DamgardFujisakiReceiver::new(&mut rng, 256, 80).unwrap();
    // Shared (N, G, H) across all three commitments.
    let receiver2 = DamgardFujisakiReceiver::from_existing(&receiver1);
    let receiver3 = DamgardFujisakiReceiver::from_existing(&receiver1);
    let mut committer1 = DamgardFujisakiCommitter::new(receiver1.params().clone());
    let mut committer2 = DamgardFujisakiCommitter::new(receiver2.params().clone());

    let half_bound = receiver1.params().t().sqrt();
    let x1 = random_below(&mut rng, &half_bound);
    let x2 = random_below(&mut rng, &half_bound);
    let product = &x1 * &x2;

    let c1 = committer1.commit(&mut rng, x1).unwrap();
    let c2 = committer2.commit(&mut rng, x2).unwrap();

    for offset in [0u32, 1] {
        let mut committer3_run = DamgardFujisakiCommitter::new(receiver3.params().clone());
        let c3 = committer3_run
            .commit(&mut rng, &product + BigInt::from(offset))
            .unwrap();

        let builder = MultiplicationProofBuilder::generate_proof_commitments(
            &mut rng,
            committer1.params(),
            &c2,
            80,
        );
        let challenge = Challenge::random(&mut rng, 80);
        let proof = builder.generate_proof_response(
            committer1.decommit().unwrap(),
            committer2.decommit().unwrap(),
            committer3_run.decommit().unwrap(),
            &challenge,
        );

        let accepted = proof.verify(receiver1.params(), &c1, &c2, &c3, &challenge);
        assert_eq!(accepted, offset == 0, "offset {} misjudged", offset);
    }
}

#[test]
fn equality_proof_across_two_moduli() {
    let mut rng = rng();
    let receiver1 = DamgardFujisakiReceiver::new(&mut rng, 256, 80).unwrap();
    let receiver2 = DamgardFujisakiReceiver::new(&mut rng, 256, 80).unwrap();
    let mut committer1 = DamgardFujisakiCommitter::new(receiver1.params().clone());
    let mut committer2 = DamgardFujisakiCommitter::new(receiver2.params().clone());

    let bound = receiver1.params().t().min(receiver2.params().t()).clone();
    let x = random_below(&mut rng, &bound);
    let c1 = committer1.commit(&mut rng, x.clone()).unwrap();
    let c2 = committer2.commit(&mut rng, x).unwrap();

    let builder = EqualityProofBuilder::generate_proof_commitments(
        &mut rng,
        committer1.params(),
        committer2.params(),
        80,
    );
    let challenge = Challenge::random(&mut rng, 80);
    let (x, r1) = committer1.decommit().unwrap();
    let (_, r2) = committer2.decommit().unwrap();
    let proof = builder.generate_proof_response(x, r1, r2, &challenge);

    assert!(proof.verify(
        committer1.params(),
        committer2.params(),
        &c1,
        &c2,
        &challenge
    ));

    // A tampered response must break both identities' consistency.
    let mut tampered = proof;
    tampered.value_response += BigInt::from(1);
    assert!(!tampered.verify(
        committer1.params(),
        committer2.params(),
        &c1,
        &c2,
        &challenge
    ));
}

#[test]
fn range_proof_around_committed_value() {
    let mut rng = rng();
    let mut receiver = DamgardFujisakiReceiver::new(&mut rng, 256, 80).unwrap();
    let t = receiver.params().n() * receiver.params().n();
    receiver.set_value_bound(t);
    let mut committer = DamgardFujisakiCommitter::new(receiver.params().clone());

    let x = random_below(&mut rng, receiver.params().n());
    let a = &x - 10;
    let b = &x + 10;
    let c = committer.commit(&mut rng, x).unwrap();
    receiver.set_commitment(c.clone());

    let builder =
        RangeProofBuilder::generate_proof_commitments(&mut rng, &committer, &a, &b, 80).unwrap();
    let challenge = Challenge::random(&mut rng, 80);
    let proof = builder.generate_proof_response(&challenge);

    assert!(proof.verify(receiver.params(), &c, &a, &b, &challenge));
}
