//! `wot graph`: Print the trust graph.

use clap::Args;
use wot_graph::build_graph;

use crate::config::WotConfig;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Print JSON (nodes with positions, edges) instead of text.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: &GraphArgs, config: &WotConfig) -> anyhow::Result<()> {
    let session = Session::open(config)?;
    let discovery = session.discover().await?;
    let graph = build_graph(
        &session.trust().document(),
        &discovery.peer_documents(),
        &discovery.profiles(),
        &config.layout,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!("Nodes ({}):", graph.nodes.len());
    for node in &graph.nodes {
        let marker = if node.is_self {
            "*"
        } else if node.is_second_degree {
            "."
        } else {
            " "
        };
        println!(
            " {} {:<24} ({:>6.1}, {:>6.1})",
            marker, node.label, node.position.x, node.position.y
        );
    }
    println!("Edges ({}):", graph.edges.len());
    for edge in &graph.edges {
        let label = |did: &str| {
            graph
                .node(did)
                .map(|n| n.label.clone())
                .unwrap_or_else(|| did.to_string())
        };
        let arrow = match edge.kind {
            wot_graph::EdgeKind::Bidirectional => "<->",
            wot_graph::EdgeKind::Outgoing => "-->",
            wot_graph::EdgeKind::Incoming => "<--",
        };
        println!(
            "  {} {} {}{}",
            label(&edge.source),
            arrow,
            label(&edge.target),
            if edge.is_second_degree { "  (2nd degree)" } else { "" }
        );
    }
    Ok(())
}
