use crate::*;
pub use random::*;

mod random;

/// One in this many squares is a mine, on average.
pub const MINE_PROPORTION: u8 = 9;

pub trait LayoutGenerator {
    fn generate(self) -> MineLayout;
}
