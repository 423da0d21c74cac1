mod board;
mod card;
mod game_state;
mod player;
mod turn;

pub use board::{Board, BoardError, Property};
pub use card::{Card, CardDeck, CardEffect};
pub use game_state::{GameState, GameStateError, Snapshot, MAX_PLAYERS};
pub use player::{Player, STARTING_BALANCE};
pub use turn::{Dice, DiceRng, DiceRoll, Landing, TurnEngine, TurnReport};
