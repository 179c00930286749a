//! Trust graph derived from attestations, laid out for display.
//!
//! Recomputed from scratch whenever its inputs change; nothing here is
//! persisted.

pub mod layout;
pub mod model;

pub use layout::{layout, Point};
pub use model::{build_graph, EdgeKind, EdgeTone, TrustEdge, TrustGraphView, TrustNode};
