/// Single coordinate axis used for board positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Width and height of the board, which is always square.
pub const BOARD_SIZE: Coord = 9;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// Shape of every board array, usable directly with `Array2` constructors.
pub const fn board_dim() -> [usize; 2] {
    [BOARD_SIZE as usize, BOARD_SIZE as usize]
}

pub const fn is_in_bounds((x, y): Coord2) -> bool {
    x < BOARD_SIZE && y < BOARD_SIZE
}

/// Offsets of the eight surrounding cells, row by row.
const OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Iterates the in-bounds neighbors of `center`, never `center` itself.
pub fn neighbors(center: Coord2) -> impl Iterator<Item = Coord2> + Clone {
    let (x, y) = center;
    OFFSETS.into_iter().filter_map(move |(dx, dy)| {
        let pos = (x.checked_add_signed(dx)?, y.checked_add_signed(dy)?);
        is_in_bounds(pos).then_some(pos)
    })
}

/// Iterates every board coordinate, column by column.
pub fn all_coords() -> impl Iterator<Item = Coord2> {
    (0..BOARD_SIZE).flat_map(|x| (0..BOARD_SIZE).map(move |y| (x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_edge_and_center_neighbor_counts() {
        let last = BOARD_SIZE - 1;

        assert_eq!(neighbors((0, 0)).count(), 3);
        assert_eq!(neighbors((last, last)).count(), 3);
        assert_eq!(neighbors((0, 4)).count(), 5);
        assert_eq!(neighbors((4, last)).count(), 5);
        assert_eq!(neighbors((4, 4)).count(), 8);
    }

    #[test]
    fn neighbors_exclude_center_and_stay_adjacent() {
        for center in all_coords() {
            for pos in neighbors(center) {
                assert_ne!(pos, center);
                assert!(is_in_bounds(pos));
                assert!(pos.0.abs_diff(center.0) <= 1 && pos.1.abs_diff(center.1) <= 1);
            }
        }
    }

    #[test]
    fn all_coords_covers_board_once() {
        assert_eq!(all_coords().count(), 81);
        assert_eq!(all_coords().next(), Some((0, 0)));
        assert_eq!(all_coords().last(), Some((8, 8)));
    }
}
