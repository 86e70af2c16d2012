use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Where the mines are, together with the neighbor counts derived from them.
///
/// Deserializing goes through [`MineLayout::from_mine_mask`]: the mask shape is checked and the counts
/// are recomputed rather than trusted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MineMask")]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    adjacent_mines: Array2<u8>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        if mine_mask.dim() != (BOARD_SIZE as usize, BOARD_SIZE as usize) {
            return Err(GameError::InvalidBoardShape);
        }
        Ok(Self::from_board_mask(mine_mask))
    }

    /// Builds a layout from a mask already known to be `BOARD_SIZE` square.
    pub(crate) fn from_board_mask(mine_mask: Array2<bool>) -> Self {
        let mut mine_count: CellCount = 0;
        let mut adjacent_mines = Array2::<u8>::zeros(board_dim());
        for coords in all_coords() {
            if !mine_mask[coords.to_nd_index()] {
                continue;
            }
            mine_count += 1;
            for pos in neighbors(coords) {
                adjacent_mines[pos.to_nd_index()] += 1;
            }
        }

        Self {
            mine_mask,
            adjacent_mines,
            mine_count,
        }
    }

    pub fn from_mine_coords(mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask = Array2::from_elem(board_dim(), false);
        for &coords in mine_coords {
            if !is_in_bounds(coords) {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }
        Ok(Self::from_board_mask(mine_mask))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if is_in_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub const fn size(&self) -> Coord2 {
        (BOARD_SIZE, BOARD_SIZE)
    }

    pub const fn total_cells(&self) -> CellCount {
        (BOARD_SIZE as CellCount) * (BOARD_SIZE as CellCount)
    }

    pub const fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.adjacent_mines[coords.to_nd_index()]
    }

    pub fn mine_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        all_coords().filter(|&coords| self[coords])
    }
}

#[derive(Deserialize)]
struct MineMask {
    mine_mask: Array2<bool>,
}

impl TryFrom<MineMask> for MineLayout {
    type Error = GameError;

    fn try_from(raw: MineMask) -> Result<Self> {
        Self::from_mine_mask(raw.mine_mask)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}
