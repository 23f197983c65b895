use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    core::rigidbody::RigidBody,
    utils::allocator::{Arena, BodyId},
};

/// Uniform grid spatial hash keyed by cell coordinates.
pub struct SpatialGrid {
    cell_size: f32,
    grid: HashMap<(i32, i32), Vec<BodyId>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            grid: HashMap::new(),
        }
    }

    fn world_to_grid(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, body: BodyId, position: Vec2, radius: f32) {
        let min_cell = self.world_to_grid(position - Vec2::splat(radius));
        let max_cell = self.world_to_grid(position + Vec2::splat(radius));

        for x in min_cell.0..=max_cell.0 {
            for y in min_cell.1..=max_cell.1 {
                let cell = self.grid.entry((x, y)).or_default();
                if cell.last() != Some(&body) {
                    cell.push(body);
                }
            }
        }
    }

    pub fn query(&self, position: Vec2, radius: f32) -> Vec<BodyId> {
        let mut results = Vec::new();
        let min_cell = self.world_to_grid(position - Vec2::splat(radius));
        let max_cell = self.world_to_grid(position + Vec2::splat(radius));

        for x in min_cell.0..=max_cell.0 {
            for y in min_cell.1..=max_cell.1 {
                if let Some(bodies) = self.grid.get(&(x, y)) {
                    results.extend(bodies);
                }
            }
        }

        results.sort();
        results.dedup();
        results
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Rebuilds the grid from every collider's bounding circle.
    pub fn update(&mut self, bodies: &Arena<RigidBody>) {
        self.clear();
        for (id, body) in bodies.iter() {
            for collider in body.colliders() {
                self.insert(
                    id,
                    collider.position(&body.transform),
                    collider.bounding_radius(),
                );
            }
        }
    }
}

/// Strategy used to produce candidate body pairs for the narrow phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum BroadPhase {
    /// Every unordered pair of bodies.
    #[default]
    BruteForce,
    /// Pairs whose collider bounding circles share a grid cell.
    SpatialGrid { cell_size: f32 },
}

impl BroadPhase {
    /// Candidate pairs `(a, b)` with `a.index < b.index`, in ascending order.
    pub fn candidate_pairs(&self, bodies: &Arena<RigidBody>) -> Vec<(BodyId, BodyId)> {
        match *self {
            BroadPhase::BruteForce => {
                let ids: Vec<BodyId> = bodies.ids().collect();
                let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
                for (i, a) in ids.iter().enumerate() {
                    for b in &ids[i + 1..] {
                        pairs.push((*a, *b));
                    }
                }
                pairs
            }
            BroadPhase::SpatialGrid { cell_size } => {
                let mut grid = SpatialGrid::new(cell_size);
                grid.update(bodies);
                Self::grid_pairs(&grid, bodies)
            }
        }
    }

    fn grid_pairs(grid: &SpatialGrid, bodies: &Arena<RigidBody>) -> Vec<(BodyId, BodyId)> {
        let mut checked = HashSet::new();
        let mut pairs = Vec::new();

        for (id, body) in bodies.iter() {
            for collider in body.colliders() {
                let nearby = grid.query(
                    collider.position(&body.transform),
                    collider.bounding_radius(),
                );
                for other in nearby {
                    if other == id {
                        continue;
                    }
                    let key = if id.index() < other.index() {
                        (id, other)
                    } else {
                        (other, id)
                    };
                    if checked.insert(key) {
                        pairs.push(key);
                    }
                }
            }
        }

        pairs.sort_by_key(|(a, b)| (a.index(), b.index()));
        pairs
    }
}
