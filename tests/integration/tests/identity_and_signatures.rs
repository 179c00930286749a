//! Integration test: identities, DIDs and signatures across document
//! boundaries.

use serde_json::json;
use wot_attestation::document::TRUST_RECEIVED;
use wot_attestation::{TrustAttestation, UserDocument};
use wot_core::{SignatureStatus, TrustLevel};
use wot_crypto::{did_to_public_key, generate_identity, public_key_to_did, Identity};
use wot_docstore::DocumentStore;
use wot_integration_tests::Network;

// =========================================================================
// Identity round-trip
// =========================================================================

#[test]
fn test_did_roundtrip_for_many_identities() {
    for _ in 0..32 {
        let identity = generate_identity();
        assert!(identity.did().starts_with("did:key:z6Mk"));
        let key = did_to_public_key(identity.did()).unwrap();
        assert_eq!(&key, identity.public_key());
        assert_eq!(public_key_to_did(&key), identity.did());
    }
}

#[test]
fn test_restored_identity_keeps_did() {
    let original = generate_identity();
    let secret = original.keypair().unwrap().secret_bytes();
    let restored = Identity::from_secret_bytes(&secret[..]).unwrap();
    assert_eq!(restored.did(), original.did());

    let message = b"same key, same signature";
    assert_eq!(
        original.sign(message).unwrap().to_hex(),
        restored.sign(message).unwrap().to_hex()
    );
}

// =========================================================================
// Signatures survive storage and flag tampering
// =========================================================================

#[tokio::test]
async fn test_propagated_attestation_verifies_at_trustee() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;

    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();

    let verified = bob.store.verify_received();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].0.trustor_id, alice.did());
    assert_eq!(verified[0].1, SignatureStatus::Valid);
}

#[tokio::test]
async fn test_forged_attestation_detected() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    let mallory = generate_identity();

    // Mallory writes an attestation claiming to be from Alice, signed with
    // her own key.
    let mut forged = TrustAttestation::new(alice.did(), bob.did(), TrustLevel::Full).unwrap();
    forged.signature = Some(mallory.sign(&forged.signing_payload()).unwrap().to_hex());
    let record = serde_json::to_value(&forged).unwrap();
    let handle = network.documents.find(bob.doc_url()).await.unwrap();
    let alice_did = alice.did().to_string();
    handle
        .change(&mut |doc: &mut serde_json::Value| {
            doc[TRUST_RECEIVED][alice_did.as_str()] = record.clone();
        })
        .unwrap();

    let verified = bob.store.verify_received();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].1, SignatureStatus::Invalid);
}

#[tokio::test]
async fn test_profile_signature_checked_against_owner() {
    let network = Network::new();
    let alice = network.join("Alice").await;

    let doc = alice.store.document();
    assert_eq!(doc.profile_signature_status(), SignatureStatus::Valid);

    let mut value = doc.to_value().unwrap();
    value["profile"]["displayName"] = json!("Not Alice");
    let tampered = UserDocument::from_value(&value).unwrap();
    assert_eq!(tampered.profile_signature_status(), SignatureStatus::Invalid);
}
