//! Integration test: profile discovery across sources, merge ordering and
//! the second-degree cap.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use wot_attestation::{WorkspaceDocument, WorkspaceIdentity};
use wot_core::{
    DiscoveryConfig, DiscoverySource, LoadState, SignatureStatus, TrustLevel, MAX_2ND_DEGREE_PROFILES,
};
use wot_discovery::{DiscoveryPayload, RegisterOutcome, TrackedProfile};
use wot_integration_tests::Network;

// =========================================================================
// Scan, load, trust
// =========================================================================

#[tokio::test]
async fn test_scan_then_load_then_trust() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Robert").await;
    let discovery = network.discovery_for(&alice, DiscoveryConfig::default());

    let payload = DiscoveryPayload::new(bob.did(), bob.doc_url(), Some("Bob"));
    let json = payload.to_json().unwrap();
    discovery
        .register_payload(&DiscoveryPayload::from_json(&json).unwrap())
        .unwrap();

    let scanned = discovery.profile(bob.did()).unwrap();
    assert_eq!(scanned.display_name.as_deref(), Some("Bob"));
    assert_eq!(scanned.load_state, LoadState::Loading);
    assert!(!discovery.is_loading());

    discovery.run_until_idle().await;
    let loaded = discovery.profile(bob.did()).unwrap();
    assert_eq!(loaded.display_name.as_deref(), Some("Robert"));
    assert_eq!(loaded.signature_status, SignatureStatus::Valid);
    assert_eq!(loaded.discovery_source, DiscoverySource::External);

    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    discovery.sync_trust(&alice.store.trust_given(), &alice.store.trust_received());
    let trusted = discovery.profile(bob.did()).unwrap();
    assert_eq!(trusted.discovery_source, DiscoverySource::TrustGiven);
    assert_eq!(trusted.display_name.as_deref(), Some("Robert"));
    assert_eq!(trusted.registered_at, scanned.registered_at);
}

#[tokio::test]
async fn test_trusting_scanned_peer_reveals_their_network() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    let carol = network.join("Carol").await;
    bob.store
        .set_trust(carol.did(), TrustLevel::Full, Some(carol.doc_url()))
        .await
        .unwrap();

    let discovery = network.discovery_for(&alice, DiscoveryConfig::default());
    discovery
        .register_external_doc(bob.doc_url(), Some(bob.did()), Some("Bob"))
        .unwrap();
    discovery.run_until_idle().await;
    assert!(discovery.profile(carol.did()).is_none());

    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    discovery.sync_trust(&alice.store.trust_given(), &alice.store.trust_received());
    discovery.run_until_idle().await;

    let carol_profile = discovery.profile(carol.did()).unwrap();
    assert_eq!(carol_profile.discovery_source, DiscoverySource::Network2nd);
    assert_eq!(carol_profile.display_name.as_deref(), Some("Carol"));
}

#[tokio::test]
async fn test_repeated_scans_register_once() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    let discovery = network.discovery_for(&alice, DiscoveryConfig::default());

    let first = discovery
        .register_external_doc(bob.doc_url(), Some(bob.did()), Some("Bob"))
        .unwrap();
    let second = discovery
        .register_external_doc(bob.doc_url(), Some(bob.did()), Some("Bob"))
        .unwrap();
    assert_eq!(first, RegisterOutcome::Inserted);
    assert_eq!(second, RegisterOutcome::Unchanged);
    let matching = discovery
        .entries()
        .into_iter()
        .filter(|e| e.url == bob.doc_url())
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
async fn test_unreachable_peer_keeps_scanned_name() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Robert").await;
    network.set_online(&bob, false);
    let discovery = network.discovery_for(&alice, DiscoveryConfig::default());

    discovery
        .register_external_doc(bob.doc_url(), Some(bob.did()), Some("Bob"))
        .unwrap();
    discovery.run_until_idle().await;
    let profile = discovery.profile(bob.did()).unwrap();
    assert_eq!(profile.load_state, LoadState::Unavailable);
    assert_eq!(profile.display_name.as_deref(), Some("Bob"));

    network.set_online(&bob, true);
    discovery
        .register_external_doc(bob.doc_url(), Some(bob.did()), Some("Bob"))
        .unwrap();
    discovery.run_until_idle().await;
    assert_eq!(
        discovery.profile(bob.did()).unwrap().display_name.as_deref(),
        Some("Robert")
    );
}

// =========================================================================
// Second degree
// =========================================================================

#[tokio::test]
async fn test_second_degree_capped_to_most_recent() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;

    let mut friends = Vec::new();
    for i in 0..(MAX_2ND_DEGREE_PROFILES + 10) {
        let friend = network.join(&format!("Friend {i:02}")).await;
        bob.store
            .set_trust(friend.did(), TrustLevel::Limited, Some(friend.doc_url()))
            .await
            .unwrap();
        friends.push(friend);
    }
    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();

    let discovery = network.discover(&alice).await;
    assert_eq!(discovery.second_degree_count(), MAX_2ND_DEGREE_PROFILES);

    let second: Vec<_> = discovery
        .entries()
        .into_iter()
        .filter(|e| e.discovery_source == DiscoverySource::Network2nd)
        .collect();
    assert_eq!(second.len(), MAX_2ND_DEGREE_PROFILES);
    // Registration follows the order of Bob's trust map, so the survivors
    // are the last entries of that order.
    let mut by_did: Vec<&str> = friends.iter().map(|f| f.did()).collect();
    by_did.sort();
    let expected: Vec<&str> = by_did[by_did.len() - MAX_2ND_DEGREE_PROFILES..].to_vec();
    for entry in &second {
        assert!(expected.contains(&entry.expected_did.as_deref().unwrap()));
    }
    assert!(discovery.profile(bob.did()).is_some());
}

#[tokio::test]
async fn test_second_degree_promoted_when_trusted() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    let carol = network.join("Carol").await;

    bob.store
        .set_trust(carol.did(), TrustLevel::Full, Some(carol.doc_url()))
        .await
        .unwrap();
    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    let discovery = network.discover(&alice).await;
    assert_eq!(
        discovery.profile(carol.did()).unwrap().discovery_source,
        DiscoverySource::Network2nd
    );

    alice
        .store
        .set_trust(carol.did(), TrustLevel::Limited, Some(carol.doc_url()))
        .await
        .unwrap();
    discovery.sync_trust(&alice.store.trust_given(), &alice.store.trust_received());
    let carol_profile = discovery.profile(carol.did()).unwrap();
    assert_eq!(carol_profile.discovery_source, DiscoverySource::TrustGiven);
    assert_eq!(carol_profile.display_name.as_deref(), Some("Carol"));
    assert_eq!(discovery.second_degree_count(), 0);
}

// =========================================================================
// Workspace fallback
// =========================================================================

#[tokio::test]
async fn test_workspace_identities_fill_gaps() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    let dana = network.join("Dana").await;
    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    let discovery = network.discover(&alice).await;

    let workspace = WorkspaceDocument {
        identities: BTreeMap::from([
            (
                bob.did().to_string(),
                WorkspaceIdentity {
                    display_name: Some("Bobby (workspace)".into()),
                    avatar_url: None,
                },
            ),
            (
                dana.did().to_string(),
                WorkspaceIdentity {
                    display_name: Some("Dana".into()),
                    avatar_url: None,
                },
            ),
        ]),
    };
    assert_eq!(discovery.apply_workspace(&workspace), 1);
    assert_eq!(discovery.profile(bob.did()).unwrap().display_name.as_deref(), Some("Bob"));
    assert_eq!(
        discovery.profile(dana.did()).unwrap().discovery_source,
        DiscoverySource::Workspace
    );
}

// =========================================================================
// Merge ordering
// =========================================================================

#[tokio::test]
async fn test_merge_converges_regardless_of_order() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    let base = Utc::now();

    let update = |source: DiscoverySource, name: &str, offset: i64| {
        let mut profile = TrackedProfile::placeholder(bob.did(), source, LoadState::Loaded)
            .with_display(Some(name.to_string()), None);
        profile.last_updated = base + Duration::seconds(offset);
        profile
    };
    let updates = vec![
        update(DiscoverySource::Workspace, "ws", 100),
        update(DiscoverySource::External, "scan", 5),
        update(DiscoverySource::Network2nd, "friend-of-friend", 50),
        update(DiscoverySource::TrustReceived, "trust-old", 1),
        update(DiscoverySource::TrustGiven, "trust-new", 9),
        update(DiscoverySource::TrustReceived, "trust-mid", 4),
    ];

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let discovery = network.discovery_for(&alice, DiscoveryConfig::default());
        let mut shuffled = updates.clone();
        shuffled.shuffle(&mut rng);
        for profile in shuffled {
            discovery.update_profile(profile, false);
        }
        let merged = discovery.profile(bob.did()).unwrap();
        assert_eq!(merged.discovery_source.priority(), DiscoverySource::TrustGiven.priority());
        assert_eq!(merged.last_updated, base + Duration::seconds(9));
        assert_eq!(merged.discovery_source, DiscoverySource::TrustGiven);
    }
}
