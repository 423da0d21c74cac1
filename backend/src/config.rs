use crate::game::Game;
use clap::Parser;
use common::{Board, BoardError, CardDeck, Dice, GameState, GameStateError, Player, TurnEngine};
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const GAME_PATH: &str = "game";
pub const PING_INTERVAL: Duration = Duration::from_secs(15);
// How long past a missed ping a silent connection is kept open
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Could not read board file {path:?}: {source}")]
    BoardFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid board: {0}")]
    Board(#[from] BoardError),
    #[error("Invalid roster: {0}")]
    Roster(#[from] GameStateError),
    #[error("Invalid listen address: {0}")]
    Address(#[from] AddrParseError),
    #[error("Could not install log subscriber: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Board game sync server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,
    /// Server port to listen on
    #[clap(short, long, default_value = "8080")]
    pub port: u16,
    /// Player in turn order, as `name` or `name:piece`. Repeat for each player.
    #[clap(long = "player", default_values = ["Player 1", "Player 2"])]
    pub players: Vec<String>,
    /// JSON file with the board spaces, in order
    #[clap(long)]
    pub board: Option<PathBuf>,
    /// Directory for the daily rolling log file
    #[clap(long, default_value = "./logs")]
    pub log_dir: PathBuf,
    /// Draw a card when landing on Chance or Community Chest
    #[clap(long)]
    pub cards: bool,
}

impl Args {
    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn roster(&self) -> Vec<Player> {
        self.players
            .iter()
            .map(|p| match p.split_once(':') {
                Some((name, piece)) => Player::new(name.trim()).with_piece(piece.trim()),
                None => Player::new(p.trim()),
            })
            .collect()
    }

    pub fn board(&self) -> Result<Board, StartupError> {
        match &self.board {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| {
                    StartupError::BoardFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                Ok(Board::from_json(&json)?)
            }
            None => Ok(Board::default()),
        }
    }

    pub fn new_game(&self) -> Result<Game<Dice>, StartupError> {
        let state = GameState::new(self.roster())?;
        let board = self.board()?;
        let engine = TurnEngine::new(Dice::default());
        let engine = if self.cards {
            engine.with_cards(CardDeck::default())
        } else {
            engine
        };
        Ok(Game::new(state, board, engine))
    }
}
