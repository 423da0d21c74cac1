use crate::client::SendMsg;
use crate::util;
use common::messages::{decode_updates, encode_snapshot};
use common::{Board, Dice, DiceRng, GameState, Snapshot, TurnEngine, TurnReport};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

// Held across snapshot, mutation and broadcast so updates never interleave
pub type SharedGame = Arc<Mutex<Game<Dice>>>;

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("Failed to deserialize message into player update: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("No player in the roster named {0:?}")]
    NotFound(Vec<String>),
}

#[derive(Debug)]
pub struct Game<R: DiceRng + Debug> {
    state: GameState,
    board: Board,
    engine: TurnEngine<R>,
}

impl<R: DiceRng + Debug> Game<R> {
    pub fn new(state: GameState, board: Board, engine: TurnEngine<R>) -> Self {
        Game {
            state,
            board,
            engine,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    // Trusted clients: whatever position and balance they assert is taken as-is,
    // apart from wrapping the position onto the board.
    pub fn handle_message(&mut self, msg: &str) -> Result<Snapshot, MessageError> {
        let updates = decode_updates(msg)?;
        let mut missing = Vec::new();
        for update in updates.iter() {
            let position = self.board.wrap(update.position);
            if self
                .state
                .apply_move(&update.name, position, update.balance)
                .is_err()
            {
                missing.push(update.name.clone());
            }
        }
        if missing.len() == updates.len() {
            return Err(MessageError::NotFound(missing));
        }
        if !missing.is_empty() {
            warn!("Skipped updates for unknown players {:?}", missing);
        }
        Ok(self.state.snapshot())
    }

    /// Applies an inbound message and, if anything changed, sends the new
    /// roster to every recipient. Returns how many recipients were reached.
    pub fn apply_and_broadcast<'a, S: SendMsg + 'a>(
        &mut self,
        msg: &str,
        recipients: impl IntoIterator<Item = &'a S>,
    ) -> Result<usize, MessageError> {
        let snapshot = self.handle_message(msg)?;
        Ok(broadcast(&snapshot, recipients))
    }

    pub fn roll(&mut self) -> TurnReport {
        let report = self.engine.take_turn(&mut self.state, &mut self.board);
        info!(
            "{} rolled {} and moved from {} to {}: {:?}",
            report.player,
            report.roll.map(|r| r.total()).unwrap_or_default(),
            report.from,
            report.to,
            report.landing
        );
        report
    }
}

pub fn broadcast<'a, S: SendMsg + 'a>(
    snapshot: &Snapshot,
    recipients: impl IntoIterator<Item = &'a S>,
) -> usize {
    let message = match encode_snapshot(snapshot) {
        Ok(message) => message,
        Err(err) => {
            error!("Failed to serialize snapshot: {}", err);
            return 0;
        }
    };
    recipients
        .into_iter()
        // If the message fails to send even after retries, there's not much we can do but proceed
        .filter(|recipient| util::retry(1, || recipient.send(&message)).is_ok())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SendError;
    use common::Player;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MockSender {
        sent: RefCell<Vec<String>>,
    }

    impl SendMsg for MockSender {
        fn send(&self, msg: &str) -> Result<(), SendError> {
            self.sent.borrow_mut().push(msg.to_string());
            Ok(())
        }
    }

    struct ClosedSender;

    impl SendMsg for ClosedSender {
        fn send(&self, _msg: &str) -> Result<(), SendError> {
            Err(SendError)
        }
    }

    #[derive(Debug)]
    struct MockDice;

    impl DiceRng for MockDice {
        fn roll_die(&mut self) -> u8 {
            1
        }
    }

    fn game() -> Game<MockDice> {
        Game::new(
            GameState::new(vec![Player::new("A"), Player::new("B")]).unwrap(),
            Board::default(),
            TurnEngine::new(MockDice),
        )
    }

    #[test]
    fn test_handle_update() {
        let mut game = game();
        let snapshot = game
            .handle_message(r#"{"name":"B","position":5,"balance":1200,"properties":[]}"#)
            .unwrap();
        let b = &snapshot.players()[1];
        assert_eq!(b.position(), 5);
        assert_eq!(b.balance(), 1200);
        assert_eq!(snapshot.current_index(), 0);
        assert_eq!(snapshot, game.snapshot());
    }

    #[test]
    fn test_handle_roster_update() {
        let mut game = game();
        let snapshot = game
            .handle_message(
                r#"[{"name":"A","position":30,"balance":1,"properties":[]},
                    {"name":"B","position":-1,"balance":-7,"properties":[]}]"#,
            )
            .unwrap();
        assert_eq!(snapshot.players()[0].position(), 2);
        assert_eq!(snapshot.players()[1].position(), 27);
        assert_eq!(snapshot.players()[1].balance(), -7);
    }

    #[test]
    fn test_handle_partially_unknown_roster() {
        let mut game = game();
        let snapshot = game
            .handle_message(
                r#"[{"name":"Z","position":3,"balance":1},{"name":"A","position":3,"balance":1}]"#,
            )
            .unwrap();
        assert_eq!(snapshot.players()[0].position(), 3);
    }

    #[test]
    fn test_unknown_player_not_broadcast() {
        let mut game = game();
        let before = game.snapshot();
        let a = MockSender::default();
        let b = MockSender::default();
        let result = game.apply_and_broadcast(
            r#"{"name":"Z","position":3,"balance":100,"properties":[]}"#,
            [&a, &b],
        );
        assert!(matches!(result, Err(MessageError::NotFound(ref names)) if names == &["Z"]));
        assert_eq!(before, game.snapshot());
        assert!(a.sent.borrow().is_empty());
        assert!(b.sent.borrow().is_empty());
    }

    #[test]
    fn test_malformed_message_not_broadcast() {
        let mut game = game();
        let before = game.snapshot();
        let a = MockSender::default();
        for msg in ["join", "", "[1, 2]", r#"{"name":"A","position":1}"#] {
            let result = game.apply_and_broadcast(msg, [&a]);
            assert!(matches!(result, Err(MessageError::Decode(_))), "{}", msg);
        }
        assert_eq!(before, game.snapshot());
        assert!(a.sent.borrow().is_empty());
    }

    #[test]
    fn test_empty_roster_message_not_broadcast() {
        let mut game = game();
        let a = MockSender::default();
        let result = game.apply_and_broadcast("[]", [&a]);
        assert!(matches!(result, Err(MessageError::NotFound(ref names)) if names.is_empty()));
        assert!(a.sent.borrow().is_empty());
    }

    #[test]
    fn test_update_broadcast_to_all() {
        let mut game = game();
        let a = MockSender::default();
        let b = MockSender::default();
        let sent = game
            .apply_and_broadcast(r#"{"name":"A","position":1,"balance":1440}"#, [&a, &b])
            .unwrap();
        assert_eq!(sent, 2);
        let expected = encode_snapshot(&game.snapshot()).unwrap();
        assert_eq!(*a.sent.borrow(), vec![expected.clone()]);
        assert_eq!(*b.sent.borrow(), vec![expected]);

        let players: Vec<Player> = serde_json::from_str(&a.sent.borrow()[0]).unwrap();
        assert_eq!(players[0].position(), 1);
        assert_eq!(players[0].balance(), 1440);
    }

    #[test]
    fn test_broadcast_skips_closed_connections() {
        let snapshot = game().snapshot();
        assert_eq!(broadcast(&snapshot, [&ClosedSender, &ClosedSender]), 0);
        let open = MockSender::default();
        assert_eq!(broadcast(&snapshot, [&open]), 1);
    }

    #[test]
    fn test_roll() {
        let mut game = game();
        let report = game.roll();
        assert_eq!(report.player, "A");
        assert_eq!(report.to, 2);
        assert_eq!(report.next_player, "B");
        let snapshot = game.snapshot();
        assert_eq!(snapshot.players()[0].balance(), 1500 - 60);
        assert_eq!(
            snapshot.players()[0].properties(),
            &[game.board.space(2).clone()]
        );
        assert_eq!(game.board.space(2).owner(), Some("A"));
    }

    #[tokio::test]
    async fn test_concurrent_updates_not_lost() {
        let game: Arc<Mutex<Game<MockDice>>> = Arc::new(Mutex::new(game()));
        let clients = 8;
        let updates = 50;
        let mut handles = Vec::new();
        for i in 0..clients {
            let game = Arc::clone(&game);
            handles.push(tokio::spawn(async move {
                let name = if i % 2 == 0 { "A" } else { "B" };
                for _ in 0..updates {
                    let mut game = game.lock().await;
                    let balance = game.snapshot().players()[i % 2].balance();
                    let msg = format!(
                        r#"{{"name":"{}","position":{},"balance":{}}}"#,
                        name,
                        i,
                        balance + 1
                    );
                    let recipients: [&ClosedSender; 0] = [];
                    game.apply_and_broadcast(&msg, recipients).unwrap();
                    drop(game);
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let snapshot = game.lock().await.snapshot();
        let per_player = (clients * updates / 2) as i64;
        assert_eq!(snapshot.players()[0].balance(), 1500 + per_player);
        assert_eq!(snapshot.players()[1].balance(), 1500 + per_player);
        assert_eq!(snapshot.players()[0].position() % 2, 0);
        assert_eq!(snapshot.players()[1].position() % 2, 1);
    }

    #[tokio::test]
    async fn test_concurrent_rolls_serialized() {
        let game: SharedGame = Arc::new(Mutex::new(Game::new(
            GameState::new(vec![Player::new("A"), Player::new("B"), Player::new("C")]).unwrap(),
            Board::default(),
            TurnEngine::new(Dice::default()),
        )));
        let mut handles = Vec::new();
        for _ in 0..6 {
            let game = Arc::clone(&game);
            handles.push(tokio::spawn(async move {
                for _ in 0..20 {
                    game.lock().await.roll();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let game = game.lock().await;
        // 120 turns over three players
        assert_eq!(game.snapshot().current_index(), 0);
        let cash: i64 = game.snapshot().players().iter().map(|p| p.balance()).sum();
        let deeds: i64 = game
            .board
            .spaces()
            .iter()
            .filter(|s| s.owner().is_some())
            .map(|s| i64::from(s.cost()))
            .sum();
        assert_eq!(cash + deeds, 4500);
    }
}
