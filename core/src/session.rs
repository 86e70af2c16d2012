use serde::{Deserialize, Serialize};

use crate::*;

/// A game in progress plus what it takes to start the next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    engine: PlayEngine,
    seed: u64,
    games_played: u32,
}

impl GameSession {
    pub fn new(seed: u64) -> Self {
        Self {
            engine: PlayEngine::new(RandomLayoutGenerator::new(seed).generate()),
            seed,
            games_played: 0,
        }
    }

    /// Starts over on a freshly generated board: no reveals, no flags, no result.
    pub fn reset(&mut self, seed: u64) {
        log::debug!("Reset after {:?}, next seed {}", self.engine.state(), seed);
        self.engine = PlayEngine::new(RandomLayoutGenerator::new(seed).generate());
        self.seed = seed;
        self.games_played = self.games_played.saturating_add(1);
    }

    pub fn engine(&self) -> &PlayEngine {
        &self.engine
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of resets so far; the first board is game zero.
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.engine.reveal(coords)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.engine.toggle_flag(coords)
    }

    pub fn banner(&self) -> Option<&'static str> {
        match self.engine.state() {
            EngineState::Ready | EngineState::Active => None,
            EngineState::Won => Some("You win!"),
            EngineState::Lost => Some("Game over!"),
        }
    }
}
