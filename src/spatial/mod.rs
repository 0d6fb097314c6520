//! Spatial model - pointy-top offset hex grid

mod flow_field;

pub use flow_field::{FlowField, UNREACHABLE};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::building::BuildingId;

pub type TileId = u32;

/// Tile position in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub col: u32,
    pub row: u32,
}

impl TilePos {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Water,
    Sand,
    Grass,
    Forest,
    Stone,
    Mountain,
}

impl Terrain {
    /// Cost of stepping onto a tile of this terrain.
    pub fn traversal_cost(self) -> u32 {
        match self {
            Terrain::Water => 30,
            Terrain::Sand => 2,
            Terrain::Grass => 1,
            Terrain::Forest => 2,
            Terrain::Stone => 1,
            Terrain::Mountain => 3,
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'W' => Some(Terrain::Water),
            'S' => Some(Terrain::Sand),
            'G' => Some(Terrain::Grass),
            'F' => Some(Terrain::Forest),
            'T' => Some(Terrain::Stone),
            'M' => Some(Terrain::Mountain),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Terrain::Water => 'W',
            Terrain::Sand => 'S',
            Terrain::Grass => 'G',
            Terrain::Forest => 'F',
            Terrain::Stone => 'T',
            Terrain::Mountain => 'M',
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("map must contain at least one tile")]
    Empty,
    #[error("map row {row} has {found} tiles, expected {expected}")]
    Ragged { row: u32, found: u32, expected: u32 },
    #[error("unknown terrain symbol '{symbol}' at column {col}, row {row}")]
    UnknownTerrain { symbol: char, col: u32, row: u32 },
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub pos: TilePos,
    pub terrain: Terrain,
    building: Option<BuildingId>,
    neighbors: Vec<TileId>,
}

impl Tile {
    pub fn building(&self) -> Option<BuildingId> {
        self.building
    }

    pub fn neighbors(&self) -> &[TileId] {
        &self.neighbors
    }
}

/// Offset-coordinate hex neighbours of `pos` on a `width` x `height` map.
///
/// Cardinal neighbours come first, then the two diagonals picked by row
/// parity: even rows lean left, odd rows lean right.
pub fn hex_neighbors(pos: TilePos, width: u32, height: u32) -> Vec<TilePos> {
    let TilePos { col: w, row: h } = pos;
    let has_up = h + 1 < height;
    let has_down = h > 0;
    let has_left = w > 0;
    let has_right = w + 1 < width;

    let mut result = Vec::with_capacity(6);
    if has_up {
        result.push(TilePos::new(w, h + 1));
    }
    if has_down {
        result.push(TilePos::new(w, h - 1));
    }
    if has_left {
        result.push(TilePos::new(w - 1, h));
    }
    if has_right {
        result.push(TilePos::new(w + 1, h));
    }
    if h % 2 == 0 {
        if has_up && has_left {
            result.push(TilePos::new(w - 1, h + 1));
        }
        if has_down && has_left {
            result.push(TilePos::new(w - 1, h - 1));
        }
    } else {
        if has_up && has_right {
            result.push(TilePos::new(w + 1, h + 1));
        }
        if has_down && has_right {
            result.push(TilePos::new(w + 1, h - 1));
        }
    }
    result
}

/// Tile grid representing the map. Terrain and adjacency are fixed once built;
/// only the building back-reference changes.
#[derive(Debug, Clone)]
pub struct HexGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl HexGrid {
    pub fn new(width: u32, height: u32, terrain: impl Fn(TilePos) -> Terrain) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            for col in 0..width {
                let pos = TilePos::new(col, row);
                tiles.push(Tile {
                    pos,
                    terrain: terrain(pos),
                    building: None,
                    neighbors: Vec::new(),
                });
            }
        }
        let mut grid = Self {
            width,
            height,
            tiles,
        };
        grid.link_neighbors();
        Ok(grid)
    }

    /// Builds a grid from one string per row, one terrain symbol per tile.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.as_ref().chars().count() as u32).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        let mut terrain = Vec::with_capacity((width * height) as usize);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count() as u32;
            if found != width {
                return Err(GridError::Ragged {
                    row: row as u32,
                    found,
                    expected: width,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let kind = Terrain::from_symbol(symbol).ok_or(GridError::UnknownTerrain {
                    symbol,
                    col: col as u32,
                    row: row as u32,
                })?;
                terrain.push(kind);
            }
        }
        Self::new(width, height, |pos| terrain[(pos.row * width + pos.col) as usize])
    }

    fn link_neighbors(&mut self) {
        for index in 0..self.tiles.len() {
            let pos = self.tiles[index].pos;
            let neighbors = hex_neighbors(pos, self.width, self.height)
                .into_iter()
                .map(|p| p.row * self.width + p.col)
                .collect();
            self.tiles[index].neighbors = neighbors;
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> u32 {
        self.width * self.height
    }

    /// Convert tile position to tile ID
    pub fn pos_to_id(&self, pos: TilePos) -> Option<TileId> {
        if pos.col < self.width && pos.row < self.height {
            Some(pos.row * self.width + pos.col)
        } else {
            None
        }
    }

    /// Convert tile ID to position
    pub fn id_to_pos(&self, id: TileId) -> Option<TilePos> {
        self.tiles.get(id as usize).map(|tile| tile.pos)
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id as usize]
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id as usize)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles.iter().enumerate().map(|(i, t)| (i as TileId, t))
    }

    pub fn neighbors(&self, id: TileId) -> &[TileId] {
        &self.tiles[id as usize].neighbors
    }

    /// Neighbours of `id` with the given terrain and no building on them.
    pub fn free_neighbors_of(&self, id: TileId, terrain: Terrain) -> usize {
        self.neighbors(id)
            .iter()
            .map(|n| &self.tiles[*n as usize])
            .filter(|t| t.terrain == terrain && t.building.is_none())
            .count()
    }

    pub(crate) fn set_building(&mut self, id: TileId, building: Option<BuildingId>) {
        self.tiles[id as usize].building = building;
    }
}
