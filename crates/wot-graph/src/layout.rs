use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use wot_core::LayoutConfig;

/// Canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Smallest distance used in force computations.
const MIN_SEPARATION: f64 = 0.01;

/// Run the force simulation.
///
/// `nodes` must be in a stable order; index `pinned` (if any) stays at the
/// canvas centre. Initial positions come from an RNG seeded with BLAKE3 of
/// `seed`, so the same inputs always produce the same layout.
pub fn layout(
    nodes: usize,
    edges: &[(usize, usize)],
    pinned: Option<usize>,
    seed: &str,
    config: &LayoutConfig,
) -> Vec<Point> {
    let (cx, cy) = config.center();
    let mut rng = StdRng::from_seed(*blake3::hash(seed.as_bytes()).as_bytes());

    let mut positions: Vec<Point> = (0..nodes)
        .map(|i| {
            // Draw for every node so the pinned index does not shift the
            // sequence seen by the others.
            let x = rng.gen_range(0.0..config.width);
            let y = rng.gen_range(0.0..config.height);
            if Some(i) == pinned {
                Point { x: cx, y: cy }
            } else {
                Point { x, y }
            }
        })
        .collect();
    let mut velocities = vec![Point { x: 0.0, y: 0.0 }; nodes];

    for _ in 0..config.iterations {
        let mut forces = vec![Point { x: 0.0, y: 0.0 }; nodes];

        // Repulsion between every pair, 1/d², tripled when too close.
        for i in 0..nodes {
            for j in (i + 1)..nodes {
                let (mut dx, mut dy) = (positions[i].x - positions[j].x, positions[i].y - positions[j].y);
                let mut dist = (dx * dx + dy * dy).sqrt();
                if dist < MIN_SEPARATION {
                    // Coincident nodes: push apart along a fixed diagonal.
                    dx = MIN_SEPARATION * (j - i) as f64;
                    dy = MIN_SEPARATION;
                    dist = (dx * dx + dy * dy).sqrt();
                }
                let mut strength = config.repulsion / (dist * dist);
                if dist < config.min_distance {
                    strength *= 3.0;
                }
                let (fx, fy) = (dx / dist * strength, dy / dist * strength);
                forces[i].x += fx;
                forces[i].y += fy;
                forces[j].x -= fx;
                forces[j].y -= fy;
            }
        }

        // Springs pull only when stretched past the ideal length.
        for &(a, b) in edges {
            let (dx, dy) = (positions[b].x - positions[a].x, positions[b].y - positions[a].y);
            let dist = (dx * dx + dy * dy).sqrt().max(MIN_SEPARATION);
            if dist <= config.ideal_edge_length {
                continue;
            }
            let strength = config.attraction * (dist - config.ideal_edge_length);
            let (fx, fy) = (dx / dist * strength, dy / dist * strength);
            forces[a].x += fx;
            forces[a].y += fy;
            forces[b].x -= fx;
            forces[b].y -= fy;
        }

        for i in 0..nodes {
            if Some(i) == pinned {
                positions[i] = Point { x: cx, y: cy };
                velocities[i] = Point { x: 0.0, y: 0.0 };
                continue;
            }
            forces[i].x += (cx - positions[i].x) * config.center_gravity;
            forces[i].y += (cy - positions[i].y) * config.center_gravity;

            velocities[i].x = (velocities[i].x + forces[i].x) * config.damping;
            velocities[i].y = (velocities[i].y + forces[i].y) * config.damping;
            positions[i].x = (positions[i].x + velocities[i].x).clamp(0.0, config.width);
            positions[i].y = (positions[i].y + velocities[i].y).clamp(0.0, config.height);
        }
    }

    positions
}
