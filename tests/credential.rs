use anoncreds_crypto::cl::{AttributeCounts, CredentialManager, Issuer, Params};
use num_bigint::BigInt;
use rand::SeedableRng;

// Seeded rng for replicable tests.
fn rng() -> (impl rand::CryptoRng + rand::RngCore) {
    const TEST_RNG_SEED: [u8; 32] = *b"INSECURE SEED FOR TESTING ONLY!!";
    rand::rngs::StdRng::from_seed(TEST_RNG_SEED)
}

/// Full-size parameters with a 1024-bit credential modulus.
fn params() -> Params {
    Params::default()
}

/// A smaller parameter set for the variants that exercise every attribute
/// kind; sizes keep the invariants of the scheme (l_e > l_attr + 2,
/// l_v = |N| + 2κ).
fn small_params() -> Params {
    Params {
        n_bit_len: 512,
        rho_bit_len: 256,
        attr_bit_len: 64,
        e_bit_len: 120,
        e1_bit_len: 40,
        v_bit_len: 672,
        sec_param: 80,
        hash_bit_len: 512,
    }
}

#[test]
fn issuance_and_presentation_with_known_attributes() {
    let mut rng = rng();
    let params = params();
    let issuer = Issuer::new(
        &mut rng,
        params,
        AttributeCounts {
            known: 3,
            committed: 0,
            hidden: 0,
        },
    )
    .unwrap();

    let known_attrs = vec![BigInt::from(1001), BigInt::from(1002), BigInt::from(1003)];
    let master_secret = CredentialManager::generate_master_secret(&mut rng, issuer.public_key());
    let mut manager = CredentialManager::new(
        &mut rng,
        params,
        issuer.public_key().clone(),
        master_secret,
        known_attrs.clone(),
        vec![],
        vec![],
    )
    .unwrap();

    // Issuance: nonce, request, issue, verify.
    let n1 = issuer.generate_nonce(&mut rng);
    let request = manager.credential_request(&mut rng, &n1).unwrap();
    issuer.verify_credential_request(&request, &n1).unwrap();
    let (credential, signature_proof) = issuer
        .issue_credential(&mut rng, &request, &n1, &known_attrs)
        .unwrap();
    manager
        .verify_credential(&credential, &signature_proof)
        .unwrap();

    // Presentation: nonce, prove, verify.
    let n3 = issuer.generate_nonce(&mut rng);
    let presentation = manager
        .prove_credential(&mut rng, &credential, &n3)
        .unwrap();
    issuer
        .verify_credential_proof(&presentation, &n3, &known_attrs, &[])
        .unwrap();

    // Replacing any attribute in the presentation must be rejected.
    for i in 0..known_attrs.len() {
        let mut tampered = known_attrs.clone();
        tampered[i] += BigInt::from(1);
        assert!(issuer
            .verify_credential_proof(&presentation, &n3, &tampered, &[])
            .is_err());
    }

    // So must replaying under a different nonce.
    let other_nonce = issuer.generate_nonce(&mut rng);
    assert!(issuer
        .verify_credential_proof(&presentation, &other_nonce, &known_attrs, &[])
        .is_err());
}

#[test]
fn issuance_and_presentation_with_all_attribute_kinds() {
    let mut rng = rng();
    let params = small_params();
    let issuer = Issuer::new(
        &mut rng,
        params,
        AttributeCounts {
            known: 2,
            committed: 1,
            hidden: 1,
        },
    )
    .unwrap();

    let known_attrs = vec![BigInt::from(21), BigInt::from(22)];
    let committed_attrs = vec![BigInt::from(33)];
    let hidden_attrs = vec![BigInt::from(44)];
    let master_secret = CredentialManager::generate_master_secret(&mut rng, issuer.public_key());
    let mut manager = CredentialManager::new(
        &mut rng,
        params,
        issuer.public_key().clone(),
        master_secret,
        known_attrs.clone(),
        committed_attrs,
        hidden_attrs,
    )
    .unwrap();

    let n1 = issuer.generate_nonce(&mut rng);
    let request = manager.credential_request(&mut rng, &n1).unwrap();
    issuer.verify_credential_request(&request, &n1).unwrap();

    // A wrong issuer nonce must fail the challenge binding.
    let wrong_nonce = issuer.generate_nonce(&mut rng);
    assert!(issuer
        .verify_credential_request(&request, &wrong_nonce)
        .is_err());

    let (credential, signature_proof) = issuer
        .issue_credential(&mut rng, &request, &n1, &known_attrs)
        .unwrap();
    manager
        .verify_credential(&credential, &signature_proof)
        .unwrap();

    // A credential with a perturbed exponent must not verify.
    let mut bad_credential = credential.clone();
    bad_credential.e += BigInt::from(2);
    assert!(manager
        .verify_credential(&bad_credential, &signature_proof)
        .is_err());

    let n3 = issuer.generate_nonce(&mut rng);
    let presentation = manager
        .prove_credential(&mut rng, &credential, &n3)
        .unwrap();
    issuer
        .verify_credential_proof(&presentation, &n3, &known_attrs, manager.attr_commitments())
        .unwrap();

    // Presentations are unlinkable but single-transcript: tampering the
    // randomized signature value must be rejected.
    let mut tampered = presentation.clone();
    tampered.a_prime += BigInt::from(1);
    assert!(issuer
        .verify_credential_proof(&tampered, &n3, &known_attrs, manager.attr_commitments())
        .is_err());
}
