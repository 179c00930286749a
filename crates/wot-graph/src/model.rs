use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use wot_attestation::UserDocument;
use wot_core::{DiscoverySource, LayoutConfig, SignatureStatus};
use wot_crypto::short_did;
use wot_discovery::TrackedProfile;

use crate::layout::{layout, Point};

/// Direction of trust between the two ends of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Bidirectional,
    /// `source` trusts `target`.
    Outgoing,
    /// `target` trusts `source`.
    Incoming,
}

/// How an edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeTone {
    Mutual,
    Outgoing,
    Incoming,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustNode {
    pub did: String,
    pub label: String,
    pub position: Point,
    pub is_self: bool,
    /// Not directly connected to the local user.
    pub is_second_degree: bool,
    pub discovery_source: Option<DiscoverySource>,
    pub signature_status: Option<SignatureStatus>,
}

/// One edge per unordered pair of DIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustEdge {
    /// The local user for 1st-degree edges, otherwise the truster (or the
    /// smaller DID of a mutual pair).
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub is_second_degree: bool,
}

impl TrustEdge {
    pub fn tone(&self) -> EdgeTone {
        if self.is_second_degree {
            return EdgeTone::Neutral;
        }
        match self.kind {
            EdgeKind::Bidirectional => EdgeTone::Mutual,
            EdgeKind::Outgoing => EdgeTone::Outgoing,
            EdgeKind::Incoming => EdgeTone::Incoming,
        }
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn touches(&self, did: &str) -> bool {
        self.source == did || self.target == did
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustGraphView {
    pub nodes: Vec<TrustNode>,
    pub edges: Vec<TrustEdge>,
}

impl TrustGraphView {
    pub fn node(&self, did: &str) -> Option<&TrustNode> {
        self.nodes.iter().find(|n| n.did == did)
    }

    pub fn edge_between(&self, a: &str, b: &str) -> Option<&TrustEdge> {
        self.edges.iter().find(|e| e.connects(a, b))
    }

    pub fn edges_of<'a>(&'a self, did: &'a str) -> impl Iterator<Item = &'a TrustEdge> + 'a {
        self.edges.iter().filter(move |e| e.touches(did))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the graph seen by the owner of `self_doc`.
///
/// Directions come from the local document's `trustGiven`/`trustReceived`
/// plus every loaded peer document. Pairs that do not include the local user
/// are second degree.
pub fn build_graph(
    self_doc: &UserDocument,
    peer_docs: &BTreeMap<String, UserDocument>,
    profiles: &[TrackedProfile],
    config: &LayoutConfig,
) -> TrustGraphView {
    let me = self_doc.did.as_str();

    let mut directed: BTreeSet<(String, String)> = BTreeSet::new();
    for doc in std::iter::once(self_doc).chain(peer_docs.values().filter(|d| d.did != me)) {
        for trustee in doc.attestations_given().into_keys() {
            directed.insert((doc.did.clone(), trustee));
        }
        for trustor in doc.attestations_received().into_keys() {
            directed.insert((trustor, doc.did.clone()));
        }
    }

    let mut dids: BTreeSet<&str> = BTreeSet::new();
    for (from, to) in &directed {
        dids.insert(from.as_str());
        dids.insert(to.as_str());
    }
    dids.remove(me);
    let ordered: Vec<&str> = std::iter::once(me).chain(dids).collect();
    let index: HashMap<&str, usize> = ordered.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut pairs: BTreeSet<(&str, &str)> = BTreeSet::new();
    for (from, to) in &directed {
        let (a, b) = if from <= to { (from, to) } else { (to, from) };
        pairs.insert((a.as_str(), b.as_str()));
    }

    let has = |from: &str, to: &str| directed.contains(&(from.to_string(), to.to_string()));
    let mut edges = Vec::with_capacity(pairs.len());
    for (a, b) in pairs {
        let forward = has(a, b);
        let backward = has(b, a);
        let edge = if a == me || b == me {
            let other = if a == me { b } else { a };
            let kind = match (has(me, other), has(other, me)) {
                (true, true) => EdgeKind::Bidirectional,
                (true, false) => EdgeKind::Outgoing,
                _ => EdgeKind::Incoming,
            };
            TrustEdge {
                source: me.to_string(),
                target: other.to_string(),
                kind,
                is_second_degree: false,
            }
        } else if forward && backward {
            TrustEdge {
                source: a.to_string(),
                target: b.to_string(),
                kind: EdgeKind::Bidirectional,
                is_second_degree: true,
            }
        } else {
            let (source, target) = if forward { (a, b) } else { (b, a) };
            TrustEdge {
                source: source.to_string(),
                target: target.to_string(),
                kind: EdgeKind::Outgoing,
                is_second_degree: true,
            }
        };
        edges.push(edge);
    }

    let links: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|e| Some((*index.get(e.source.as_str())?, *index.get(e.target.as_str())?)))
        .collect();
    let positions = layout(ordered.len(), &links, Some(0), me, config);

    let by_did: HashMap<&str, &TrackedProfile> = profiles.iter().map(|p| (p.did.as_str(), p)).collect();
    let first_degree: BTreeSet<&str> = edges
        .iter()
        .filter(|e| !e.is_second_degree)
        .map(|e| e.target.as_str())
        .collect();

    let nodes: Vec<TrustNode> = ordered
        .iter()
        .zip(positions)
        .map(|(did, position)| {
            let profile = by_did.get(did);
            let label = profile
                .and_then(|p| p.display_name.clone())
                .unwrap_or_else(|| short_did(did));
            TrustNode {
                did: did.to_string(),
                label,
                position,
                is_self: *did == me,
                is_second_degree: *did != me && !first_degree.contains(did),
                discovery_source: profile.map(|p| p.discovery_source),
                signature_status: profile.map(|p| p.signature_status),
            }
        })
        .collect();

    tracing::debug!(did = %me, nodes = nodes.len(), edges = edges.len(), "trust graph built");
    TrustGraphView { nodes, edges }
}
