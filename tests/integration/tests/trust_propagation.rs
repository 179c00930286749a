//! Integration test: attestations written by one peer reaching another
//! peer's document, and discovery reacting to them.

use wot_core::{DiscoverySource, LoadState, TrustLevel};
use wot_integration_tests::Network;

// =========================================================================
// Propagation
// =========================================================================

#[tokio::test]
async fn test_trust_propagates_and_trust_back_is_mutual() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;

    let outcome = alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    assert!(outcome.propagated);
    assert!(bob.store.trust_received().contains_key(alice.did()));
    assert!(!alice.store.is_mutual(bob.did()));

    let back = bob.store.trust_back(alice.did(), TrustLevel::Limited).await.unwrap();
    assert!(back.propagated);
    assert!(alice.store.is_mutual(bob.did()));
    assert!(bob.store.is_mutual(alice.did()));
    assert_eq!(alice.store.trust_received()[bob.did()].level, TrustLevel::Limited);
}

#[tokio::test]
async fn test_offline_trustee_gets_nothing_but_local_write_stands() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    network.set_online(&bob, false);

    let outcome = alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    assert!(!outcome.propagated);
    assert_eq!(alice.store.trust_level(bob.did()), Some(TrustLevel::Full));
    assert!(bob.store.trust_received().is_empty());

    // Trusting again once Bob is reachable delivers the attestation.
    network.set_online(&bob, true);
    let retry = alice.store.set_trust(bob.did(), TrustLevel::Full, None).await.unwrap();
    assert!(retry.propagated);
    assert!(bob.store.trust_received().contains_key(alice.did()));
}

#[tokio::test]
async fn test_revocation_stays_local() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;

    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    assert!(alice.store.revoke_trust(bob.did()).unwrap().is_some());

    assert!(alice.store.trust_given().is_empty());
    assert!(bob.store.trust_received().contains_key(alice.did()));
}

// =========================================================================
// Discovery follows the trust maps
// =========================================================================

#[tokio::test]
async fn test_received_trust_discovered_by_trustee() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;

    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();

    let discovery = network.discover(&bob).await;
    let seen = discovery.profile(alice.did()).unwrap();
    assert_eq!(seen.discovery_source, DiscoverySource::TrustReceived);
    assert_eq!(seen.display_name.as_deref(), Some("Alice"));
    assert_eq!(seen.load_state, LoadState::Loaded);
    assert!(!discovery.is_loading());
}

#[tokio::test]
async fn test_revocation_evicts_discovered_profile() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;

    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    let discovery = network.discover(&alice).await;
    assert_eq!(
        discovery.profile(bob.did()).unwrap().discovery_source,
        DiscoverySource::TrustGiven
    );

    alice.store.revoke_trust(bob.did()).unwrap();
    discovery.sync_trust(&alice.store.trust_given(), &alice.store.trust_received());
    assert!(discovery.profile(bob.did()).is_none());
}
