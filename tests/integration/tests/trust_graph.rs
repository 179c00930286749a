//! Integration test: the trust graph built from real personal documents.

use wot_core::{DiscoverySource, LayoutConfig, TrustLevel};
use wot_graph::{build_graph, EdgeKind, EdgeTone};
use wot_integration_tests::Network;

// =========================================================================
// First degree
// =========================================================================

#[tokio::test]
async fn test_mutual_trust_is_one_bidirectional_edge() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    alice
        .store
        .set_trust(bob.did(), TrustLevel::Full, Some(bob.doc_url()))
        .await
        .unwrap();
    bob.store.trust_back(alice.did(), TrustLevel::Full).await.unwrap();

    let discovery = network.discover(&alice).await;
    let graph = build_graph(
        &alice.store.document(),
        &discovery.peer_documents(),
        &discovery.profiles(),
        &LayoutConfig::default(),
    );

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    let edge = graph.edge_between(alice.did(), bob.did()).unwrap();
    assert_eq!(edge.kind, EdgeKind::Bidirectional);
    assert_eq!(edge.tone(), EdgeTone::Mutual);
    assert!(!edge.is_second_degree);

    let me = graph.node(alice.did()).unwrap();
    assert!(me.is_self);
    let config = LayoutConfig::default();
    assert_eq!((me.position.x, me.position.y), config.center());
    let bob_node = graph.node(bob.did()).unwrap();
    assert_eq!(bob_node.label, "Bob");
    assert_eq!(bob_node.discovery_source, Some(DiscoverySource::TrustGiven));
}

#[tokio::test]
async fn test_incoming_only_trust() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let bob = network.join("Bob").await;
    bob.store
        .set_trust(alice.did(), TrustLevel::Limited, Some(alice.doc_url()))
        .await
        .unwrap();

    let discovery = network.discover(&alice).await;
    let graph = build_graph(
        &alice.store.document(),
        &discovery.peer_documents(),
        &discovery.profiles(),
        &LayoutConfig::default(),
    );
    let edge = graph.edge_between(alice.did(), bob.did()).unwrap();
    assert_eq!(edge.source, alice.did());
    assert_eq!(edge.kind, EdgeKind::Incoming);
    assert_eq!(edge.tone(), EdgeTone::Incoming);
}

// =========================================================================
// Second degree
// =========================================================================

#[tokio::test]
async fn test_friends_of_friends_are_second_degree() {
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
    let peers = discovery.peer_documents();
    assert!(peers.contains_key(bob.did()));
    assert!(!peers.contains_key(carol.did()));

    let graph = build_graph(
        &alice.store.document(),
        &peers,
        &discovery.profiles(),
        &LayoutConfig::default(),
    );
    assert_eq!(graph.nodes.len(), 3);
    let carol_node = graph.node(carol.did()).unwrap();
    assert!(carol_node.is_second_degree);
    assert_eq!(carol_node.label, "Carol");
    assert_eq!(carol_node.discovery_source, Some(DiscoverySource::Network2nd));

    let edge = graph.edge_between(bob.did(), carol.did()).unwrap();
    assert!(edge.is_second_degree);
    assert_eq!(edge.source, bob.did());
    assert_eq!(edge.kind, EdgeKind::Outgoing);
    assert_eq!(edge.tone(), EdgeTone::Neutral);
    assert!(graph.edge_between(alice.did(), carol.did()).is_none());
}

#[tokio::test]
async fn test_layout_is_stable_across_rebuilds() {
    let network = Network::new();
    let alice = network.join("Alice").await;
    let mut friends = Vec::new();
    for name in ["Bob", "Carol", "Dave", "Erin"] {
        let friend = network.join(name).await;
        alice
            .store
            .set_trust(friend.did(), TrustLevel::Full, Some(friend.doc_url()))
            .await
            .unwrap();
        friends.push(friend);
    }

    let discovery = network.discover(&alice).await;
    let config = LayoutConfig::default();
    let build = || {
        build_graph(
            &alice.store.document(),
            &discovery.peer_documents(),
            &discovery.profiles(),
            &config,
        )
    };
    let first = build();
    let second = build();
    assert_eq!(first.nodes.len(), 1 + friends.len());
    for (a, b) in first.nodes.iter().zip(&second.nodes) {
        assert_eq!(a.did, b.did);
        assert_eq!(a.position, b.position);
        assert!(a.position.x >= 0.0 && a.position.x <= config.width);
        assert!(a.position.y >= 0.0 && a.position.y <= config.height);
    }
}
