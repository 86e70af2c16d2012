use alloc::collections::{BTreeSet, VecDeque};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Gameplay state over a fixed mine layout: what the player has opened and flagged, and whether it is over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EngineSnapshot")]
pub struct PlayEngine {
    mine_layout: MineLayout,
    board: Array2<EngineCell>,
    revealed_count: CellCount,
    flag_count: CellCount,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

#[derive(Deserialize)]
struct EngineSnapshot {
    mine_layout: MineLayout,
    board: Array2<EngineCell>,
    revealed_count: CellCount,
    flag_count: CellCount,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

impl TryFrom<EngineSnapshot> for PlayEngine {
    type Error = GameError;

    fn try_from(snapshot: EngineSnapshot) -> Result<Self> {
        if snapshot.board.dim() != (BOARD_SIZE as usize, BOARD_SIZE as usize) {
            return Err(GameError::InvalidBoardShape);
        }
        if let Some(coords) = snapshot.triggered_mine {
            snapshot.mine_layout.validate_coords(coords)?;
        }
        Ok(Self {
            mine_layout: snapshot.mine_layout,
            board: snapshot.board,
            revealed_count: snapshot.revealed_count,
            flag_count: snapshot.flag_count,
            state: snapshot.state,
            triggered_mine: snapshot.triggered_mine,
        })
    }
}

impl PlayEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        // with nothing safe to open, every unopened square already is a mine
        let state = if mine_layout.safe_cell_count() == 0 {
            log::debug!("Board has no safe squares, game starts won");
            EngineState::Won
        } else {
            EngineState::Ready
        };
        Self {
            mine_layout,
            board: Array2::default(board_dim()),
            revealed_count: 0,
            flag_count: 0,
            state,
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.mine_layout.mine_count()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub fn mine_layout(&self) -> &MineLayout {
        &self.mine_layout
    }

    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.board[coords.to_nd_index()]
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.mine_layout.contains_mine(coords)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use EngineCell::*;
        use MarkOutcome::*;

        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        let cell = &mut self.board[coords.to_nd_index()];
        Ok(match *cell {
            Hidden => {
                *cell = Flagged;
                self.flag_count += 1;
                Changed
            }
            Flagged => {
                *cell = Hidden;
                self.flag_count -= 1;
                Changed
            }
            Revealed(_) => NoChange,
        })
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        // a flag only marks a square, clicking it still opens it
        if !self.cell_at(coords).is_unrevealed() {
            return Ok(RevealOutcome::NoChange);
        }

        if self.mine_layout.contains_mine(coords) {
            log::debug!("Mine hit at {:?}", coords);
            self.triggered_mine = Some(coords);
            self.state = EngineState::Lost;
            return Ok(RevealOutcome::HitMine);
        }

        self.flood_reveal(coords);

        if self.revealed_count == self.mine_layout.safe_cell_count() {
            log::debug!("All {} safe squares revealed", self.revealed_count);
            self.state = EngineState::Won;
            Ok(RevealOutcome::Won)
        } else {
            self.state = EngineState::Active;
            Ok(RevealOutcome::Revealed)
        }
    }

    /// Opens `start`, an unrevealed safe square, and keeps spreading through unrevealed neighbors of every zero it
    /// uncovers.
    ///
    /// Flagged squares are opened like hidden ones and lose their flag.
    fn flood_reveal(&mut self, start: Coord2) {
        let mut visited = BTreeSet::from([start]);
        let mut to_visit = VecDeque::from([start]);

        while let Some(coords) = to_visit.pop_front() {
            log::trace!("flood visit {:?}", coords);
            let count = self.mine_layout.adjacent_mine_count(coords);
            let cell = &mut self.board[coords.to_nd_index()];
            if cell.is_flagged() {
                self.flag_count -= 1;
            }
            *cell = EngineCell::Revealed(count);
            self.revealed_count += 1;

            if count > 0 {
                continue;
            }

            // a zero square has no mined neighbors, so everything queued here is safe
            for pos in neighbors(coords) {
                if self.cell_at(pos).is_unrevealed() && visited.insert(pos) {
                    to_visit.push_back(pos);
                }
            }
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn engine(mines: &[Coord2]) -> PlayEngine {
        PlayEngine::new(MineLayout::from_mine_coords(mines).unwrap())
    }

    fn revealed_cells(engine: &PlayEngine) -> usize {
        all_coords()
            .filter(|&pos| matches!(engine.cell_at(pos), EngineCell::Revealed(_)))
            .count()
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_cell() {
        let mut engine = engine(&[(3, 3), (5, 5)]);

        let outcome = engine.reveal((3, 3)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.triggered_mine(), Some((3, 3)));
        assert_eq!(engine.cell_at((3, 3)), EngineCell::Hidden);
    }

    #[test]
    fn numbered_square_opens_alone() {
        let mut engine = engine(&[(0, 0), (8, 8)]);

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(engine.cell_at((1, 1)), EngineCell::Revealed(1));
        assert_eq!(engine.revealed_count(), 1);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn flood_fill_stops_at_numbered_border() {
        // a wall of mines down column 3 splits the board
        let wall: alloc::vec::Vec<Coord2> = (0..BOARD_SIZE).map(|y| (3, y)).collect();
        let mut engine = engine(&wall);

        assert_eq!(engine.reveal((0, 4)).unwrap(), RevealOutcome::Revealed);

        for y in 0..BOARD_SIZE {
            assert!(matches!(engine.cell_at((0, y)), EngineCell::Revealed(0)));
            assert!(matches!(engine.cell_at((1, y)), EngineCell::Revealed(0)));
            assert!(matches!(engine.cell_at((2, y)), EngineCell::Revealed(2 | 3)));
            assert_eq!(engine.cell_at((4, y)), EngineCell::Hidden);
        }
        assert_eq!(engine.revealed_count(), 27);
        assert_eq!(revealed_cells(&engine), 27);
    }

    #[test]
    fn flood_fill_clears_mine_free_board_in_one_move() {
        let mut engine = engine(&[]);

        assert_eq!(engine.reveal((4, 4)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.revealed_count(), 81);
        assert!(all_coords().all(|pos| engine.cell_at(pos) == EngineCell::Revealed(0)));
    }

    #[test]
    fn clicking_a_flag_opens_the_square() {
        let mut engine = engine(&[(8, 8)]);

        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.toggle_flag((0, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.flag_count(), 2);

        // (0, 0) is a zero, so the fill also runs through the flag on (0, 1)
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((0, 1)), EngineCell::Revealed(0));
        assert_eq!(engine.flag_count(), 0);
        assert_eq!(engine.revealed_count(), 80);
    }

    #[test]
    fn flood_fill_opens_flagged_squares_and_drops_their_flags() {
        let wall: alloc::vec::Vec<Coord2> = (0..BOARD_SIZE).map(|y| (3, y)).collect();
        let mut engine = engine(&wall);
        engine.toggle_flag((1, 1)).unwrap();
        engine.toggle_flag((2, 5)).unwrap();
        engine.toggle_flag((3, 0)).unwrap();

        assert_eq!(engine.reveal((0, 4)).unwrap(), RevealOutcome::Revealed);

        assert_eq!(engine.cell_at((1, 1)), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((2, 5)), EngineCell::Revealed(3));
        // mines are never reached by the fill, flagged or not
        assert_eq!(engine.cell_at((3, 0)), EngineCell::Flagged);
        assert_eq!(engine.flag_count(), 1);
        assert_eq!(engine.revealed_count(), 27);
    }

    #[test]
    fn clicking_a_flagged_mine_loses() {
        let mut engine = engine(&[(4, 4)]);
        engine.toggle_flag((4, 4)).unwrap();

        assert_eq!(engine.reveal((4, 4)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.triggered_mine(), Some((4, 4)));
    }

    #[test]
    fn toggle_flag_round_trips_and_ignores_revealed() {
        let mut engine = engine(&[(0, 0)]);

        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(engine.flag_count(), 1);
        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(engine.flag_count(), 0);
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Hidden);

        engine.reveal((1, 0)).unwrap();
        assert_eq!(engine.toggle_flag((1, 0)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(engine.flag_count(), 0);
    }

    #[test]
    fn revealing_twice_is_a_no_op() {
        let mut engine = engine(&[(0, 0)]);

        engine.reveal((1, 0)).unwrap();
        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.revealed_count(), 1);
    }

    #[test]
    fn winning_board_transitions_to_won_state() {
        let mut engine = engine(&[(0, 0)]);

        for pos in [(1, 0), (0, 1), (1, 1)] {
            assert_eq!(engine.reveal(pos).unwrap(), RevealOutcome::Revealed);
        }
        assert_eq!(engine.reveal((5, 5)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.triggered_mine(), None);
        assert!(engine.is_finished());
    }

    #[test]
    fn finished_game_rejects_moves() {
        let mut engine = engine(&[(0, 0)]);
        engine.reveal((0, 0)).unwrap();

        assert_eq!(engine.reveal((5, 5)), Err(GameError::AlreadyEnded));
        assert_eq!(engine.toggle_flag((5, 5)), Err(GameError::AlreadyEnded));
        assert_eq!(engine.cell_at((5, 5)), EngineCell::Hidden);
    }

    #[test]
    fn out_of_range_moves_are_rejected() {
        let mut engine = engine(&[]);

        assert_eq!(engine.reveal((9, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((0, 200)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn all_mine_board_starts_won() {
        let all: alloc::vec::Vec<Coord2> = all_coords().collect();
        let engine = engine(&all);

        assert_eq!(engine.state(), EngineState::Won);
    }

    #[test]
    fn engine_snapshot_survives_json() {
        let wall: alloc::vec::Vec<Coord2> = (0..BOARD_SIZE).map(|y| (3, y)).collect();
        let mut engine = engine(&wall);
        engine.toggle_flag((3, 4)).unwrap();
        engine.reveal((0, 0)).unwrap();
        assert_eq!(engine.state(), EngineState::Active);

        let json = serde_json::to_string(&engine).unwrap();
        let restored: PlayEngine = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, engine);
        assert_eq!(restored.flag_count(), 1);
        assert_eq!(restored.revealed_count(), 27);
    }

    #[test]
    fn snapshot_with_wrong_board_shape_is_rejected() {
        let engine = engine(&[(8, 8)]);
        let mut value = serde_json::to_value(&engine).unwrap();
        value["board"]["dim"] = serde_json::json!([3, 27]);

        let err = serde_json::from_value::<PlayEngine>(value).unwrap_err();
        assert!(err.to_string().contains("9x9"), "{err}");
    }
}
