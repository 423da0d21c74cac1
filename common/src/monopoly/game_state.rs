use crate::monopoly::player::Player;
use serde::Serialize;
use thiserror::Error;

pub const MAX_PLAYERS: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GameStateError {
    #[error("Roster with no players given")]
    Empty,
    #[error("Roster of {count} players exceeds the maximum of {max}")]
    TooManyPlayers { count: usize, max: usize },
    #[error("Player name {0} appears more than once in the roster")]
    DuplicateName(String),
    #[error("No player named {0} in the roster")]
    NotFound(String),
}

/// Immutable copy of the roster and turn pointer, safe to hand to any reader.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    players: Vec<Player>,
    current: usize,
}

impl Snapshot {
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }
}

/// The authoritative roster (in turn order) and whose turn it is.
#[derive(Debug)]
pub struct GameState {
    players: Vec<Player>,
    current: usize,
}

impl GameState {
    // Enforce the following constraints:
    // - At least one and at most MAX_PLAYERS players
    // - Player names are unique
    pub fn new(players: Vec<Player>) -> Result<Self, GameStateError> {
        if players.is_empty() {
            return Err(GameStateError::Empty);
        }
        if players.len() > MAX_PLAYERS {
            return Err(GameStateError::TooManyPlayers {
                count: players.len(),
                max: MAX_PLAYERS,
            });
        }
        for (i, player) in players.iter().enumerate() {
            if players[..i].iter().any(|p| p.name() == player.name()) {
                return Err(GameStateError::DuplicateName(player.name().to_string()));
            }
        }
        Ok(GameState {
            players,
            current: 0,
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            players: self.players.clone(),
            current: self.current,
        }
    }

    /// Overwrites a player's position and balance. Turn pointer and property
    /// ownership are left alone.
    pub fn apply_move(
        &mut self,
        name: &str,
        position: usize,
        balance: i64,
    ) -> Result<(), GameStateError> {
        let player = self
            .player_mut(name)
            .ok_or_else(|| GameStateError::NotFound(name.to_string()))?;
        player.set_position(position);
        player.set_balance(balance);
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub(crate) fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name() == name)
    }

    pub(crate) fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.current]
    }

    pub(crate) fn advance_turn(&mut self) {
        self.current = (self.current + 1) % self.players.len();
    }
}
