use std::collections::VecDeque;

use super::{HexGrid, TileId};

/// Cost marker for tiles with no route to the destination.
pub const UNREACHABLE: u32 = u32::MAX;

/// Potential field towards one destination tile plus the steering table
/// derived from it.
///
/// `next_hop[t]` is the neighbour of `t` with the lowest cost. The destination
/// points at itself, and so does every unreachable tile.
#[derive(Debug, Clone)]
pub struct FlowField {
    destination: TileId,
    cost: Vec<u32>,
    next_hop: Vec<TileId>,
}

impl FlowField {
    pub fn compute(grid: &HexGrid, destination: TileId) -> Self {
        let cost = potential(grid, destination);
        let next_hop = steering(grid, destination, &cost);
        Self {
            destination,
            cost,
            next_hop,
        }
    }

    pub fn destination(&self) -> TileId {
        self.destination
    }

    pub fn cost(&self, tile: TileId) -> u32 {
        self.cost[tile as usize]
    }

    pub fn next_hop(&self, tile: TileId) -> TileId {
        self.next_hop[tile as usize]
    }

    pub fn is_reachable(&self, tile: TileId) -> bool {
        self.cost[tile as usize] != UNREACHABLE
    }

    /// Tiles visited when following the steering table from `start`, both
    /// ends included. Stops at the first tile that points at itself.
    pub fn path_from(&self, start: TileId) -> Vec<TileId> {
        let mut path = vec![start];
        let mut current = start;
        while path.len() <= self.next_hop.len() {
            let hop = self.next_hop(current);
            if hop == current {
                break;
            }
            path.push(hop);
            current = hop;
        }
        path
    }
}

// Queue relaxation: a tile is re-enqueued whenever its cost improves, so the
// result matches Dijkstra without needing a priority queue.
fn potential(grid: &HexGrid, destination: TileId) -> Vec<u32> {
    let count = grid.tile_count() as usize;
    let mut cost = vec![UNREACHABLE; count];
    let mut queued = vec![false; count];
    let mut queue = VecDeque::with_capacity(count);

    cost[destination as usize] = 0;
    queue.push_back(destination);
    queued[destination as usize] = true;

    while let Some(current) = queue.pop_front() {
        queued[current as usize] = false;
        let base = cost[current as usize];
        for &neighbor in grid.neighbors(current) {
            let step = grid.tile(neighbor).terrain.traversal_cost();
            let candidate = base.saturating_add(step);
            if candidate < cost[neighbor as usize] {
                cost[neighbor as usize] = candidate;
                if !queued[neighbor as usize] {
                    queued[neighbor as usize] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }
    cost
}

fn steering(grid: &HexGrid, destination: TileId, cost: &[u32]) -> Vec<TileId> {
    (0..grid.tile_count())
        .map(|tile| {
            if tile == destination || cost[tile as usize] == UNREACHABLE {
                return tile;
            }
            let mut best = tile;
            let mut best_cost = UNREACHABLE;
            for &neighbor in grid.neighbors(tile) {
                if cost[neighbor as usize] < best_cost {
                    best = neighbor;
                    best_cost = cost[neighbor as usize];
                }
            }
            best
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{Terrain, TilePos};

    #[test]
    fn destination_points_at_itself() {
        let grid = HexGrid::new(3, 3, |_| Terrain::Grass).unwrap();
        let dest = grid.pos_to_id(TilePos::new(1, 1)).unwrap();
        let field = FlowField::compute(&grid, dest);
        assert_eq!(field.cost(dest), 0);
        assert_eq!(field.next_hop(dest), dest);
        assert_eq!(field.path_from(dest), vec![dest]);
    }

    #[test]
    fn costs_follow_hex_adjacency_and_terrain() {
        // row 0: G S G
        // row 1: G G M
        // row 2: W G G
        let grid = HexGrid::from_rows(&["GSG", "GGM", "WGG"]).unwrap();
        let dest = grid.pos_to_id(TilePos::new(1, 1)).unwrap();
        let field = FlowField::compute(&grid, dest);

        // (1,1) is an odd row, so (0,0) is not adjacent; the cheapest route
        // enters (0,1) or (1,0) first.
        let corner = grid.pos_to_id(TilePos::new(0, 0)).unwrap();
        assert_eq!(field.cost(grid.pos_to_id(TilePos::new(0, 1)).unwrap()), 1);
        assert_eq!(field.cost(grid.pos_to_id(TilePos::new(1, 0)).unwrap()), 2);
        assert_eq!(field.cost(corner), 2);
        assert_eq!(field.next_hop(corner), grid.pos_to_id(TilePos::new(0, 1)).unwrap());

        // (2,0) and (2,2) touch (1,1) diagonally
        assert_eq!(field.cost(grid.pos_to_id(TilePos::new(2, 0)).unwrap()), 1);
        assert_eq!(field.cost(grid.pos_to_id(TilePos::new(2, 2)).unwrap()), 1);
        assert_eq!(field.cost(grid.pos_to_id(TilePos::new(0, 2)).unwrap()), 31);
    }

    #[test]
    fn water_detours_are_cheaper_than_crossing() {
        let grid = HexGrid::from_rows(&["GGGGG", "GWWWG", "GGGGG"]).unwrap();
        let dest = grid.pos_to_id(TilePos::new(0, 1)).unwrap();
        let field = FlowField::compute(&grid, dest);
        let start = grid.pos_to_id(TilePos::new(4, 1)).unwrap();
        assert!(field.cost(start) < 30);
        let path = field.path_from(start);
        assert_eq!(*path.last().unwrap(), dest);
        assert!(path
            .iter()
            .all(|t| grid.tile(*t).terrain != Terrain::Water));
    }

    #[test]
    fn lone_tile_is_its_own_destination() {
        let grid = HexGrid::new(1, 1, |_| Terrain::Stone).unwrap();
        let field = FlowField::compute(&grid, 0);
        assert_eq!(field.next_hop(0), 0);
        assert!(field.is_reachable(0));
    }
}
