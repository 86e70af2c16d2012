use super::*;
use ndarray::Array2;

/// Rolls every square independently: each one draws a category in `0..mine_proportion` and category `0` is a mine.
///
/// The mine count is not fixed, only its expectation is.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
    mine_proportion: u8,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            mine_proportion: MINE_PROPORTION,
        }
    }

    pub fn with_mine_proportion(self, mine_proportion: u8) -> Self {
        if mine_proportion == 0 {
            log::warn!("Mine proportion cannot be zero, using 1 (every square is a mine)");
        }
        Self {
            mine_proportion: mine_proportion.max(1),
            ..self
        }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self) -> MineLayout {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(board_dim());
        for is_mine in mine_mask.iter_mut() {
            *is_mine = rng.random_range(0..self.mine_proportion) == 0;
        }

        let layout = MineLayout::from_board_mask(mine_mask);
        log::debug!(
            "Generated board from seed {}: {} mines, {} safe squares",
            self.seed,
            layout.mine_count(),
            layout.safe_cell_count()
        );
        layout
    }
}
