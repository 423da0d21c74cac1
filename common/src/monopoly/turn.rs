use crate::monopoly::board::Board;
use crate::monopoly::card::{Card, CardDeck, CardEffect};
use crate::monopoly::game_state::GameState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt::Debug;

pub trait DiceRng {
    // A single die face in 1..=6
    fn roll_die(&mut self) -> u8;
}

#[derive(Debug)]
pub struct Dice {
    rng: StdRng,
}

impl Default for Dice {
    fn default() -> Self {
        Dice {
            rng: StdRng::from_entropy(),
        }
    }
}

impl DiceRng for Dice {
    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

// Two independent dice, so totals follow a triangular distribution over 2..=12
#[derive(Serialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiceRoll {
    first: u8,
    second: u8,
}

impl DiceRoll {
    pub fn roll<R: DiceRng>(rng: &mut R) -> Self {
        DiceRoll {
            first: rng.roll_die(),
            second: rng.roll_die(),
        }
    }

    pub fn total(&self) -> usize {
        usize::from(self.first) + usize::from(self.second)
    }
}

/// What happened on the space a player landed on. Skipped transactions are
/// reported rather than dropped silently.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Landing {
    Purchased {
        property: String,
        cost: u32,
    },
    PurchaseSkippedInsufficientFunds {
        property: String,
        cost: u32,
        balance: i64,
    },
    RentPaid {
        property: String,
        rent: u32,
        owner: String,
    },
    OwnProperty {
        property: String,
    },
    NotPurchasable {
        property: String,
    },
    Card {
        property: String,
        card: Card,
    },
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub player: String,
    pub roll: Option<DiceRoll>,
    pub from: usize,
    pub to: usize,
    pub landing: Landing,
    pub next_player: String,
}

/// Applies the rules of a single turn to the state it is handed.
#[derive(Debug)]
pub struct TurnEngine<R: DiceRng + Debug> {
    rng: R,
    // Chance and Community Chest only draw cards when a deck is present
    cards: Option<CardDeck>,
}

impl<R: DiceRng + Debug> TurnEngine<R> {
    pub fn new(rng: R) -> Self {
        TurnEngine { rng, cards: None }
    }

    pub fn with_cards(mut self, deck: CardDeck) -> Self {
        self.cards = Some(deck);
        self
    }

    /// Rolls for the current player, moves them, settles the landing and
    /// passes the turn on.
    pub fn take_turn(&mut self, state: &mut GameState, board: &mut Board) -> TurnReport {
        let roll = DiceRoll::roll(&mut self.rng);
        let mut report = self.advance(state, board, roll.total());
        report.roll = Some(roll);
        report
    }

    /// Same as `take_turn` with the step count already decided.
    pub fn advance(
        &mut self,
        state: &mut GameState,
        board: &mut Board,
        steps: usize,
    ) -> TurnReport {
        let player = state.current_player_mut();
        let from = player.position();
        let to = (from + steps) % board.len();
        player.set_position(to);
        let name = player.name().to_string();

        let landing = self.resolve_landing(state, board, to);
        state.advance_turn();

        TurnReport {
            player: name,
            roll: None,
            from,
            to,
            landing,
            next_player: state.current_player().name().to_string(),
        }
    }

    fn resolve_landing(
        &mut self,
        state: &mut GameState,
        board: &mut Board,
        index: usize,
    ) -> Landing {
        let board_len = board.len();
        let space = board.space_mut(index);
        let property = space.name().to_string();

        if space.is_purchasable() {
            let cost = space.cost();
            let player = state.current_player_mut();
            if player.balance() < i64::from(cost) {
                return Landing::PurchaseSkippedInsufficientFunds {
                    property,
                    cost,
                    balance: player.balance(),
                };
            }
            player.debit(i64::from(cost));
            space.set_owner(player.name());
            player.add_property(space.clone());
            return Landing::Purchased { property, cost };
        }

        match space.owner() {
            Some(owner) if owner != state.current_player().name() => {
                let owner = owner.to_string();
                let rent = space.rent();
                state.current_player_mut().debit(i64::from(rent));
                // Boards loaded from a file may name an owner who isn't playing
                if let Some(landlord) = state.player_mut(&owner) {
                    landlord.credit(i64::from(rent));
                }
                Landing::RentPaid {
                    property,
                    rent,
                    owner,
                }
            }
            Some(_) => Landing::OwnProperty { property },
            None => match self.cards.as_mut().filter(|_| space.draws_card()) {
                Some(deck) => match deck.draw() {
                    Some(card) => {
                        apply_card(state, board_len, &card);
                        Landing::Card { property, card }
                    }
                    None => Landing::NotPurchasable { property },
                },
                None => Landing::NotPurchasable { property },
            },
        }
    }
}

fn apply_card(state: &mut GameState, board_len: usize, card: &Card) {
    let player = state.current_player_mut();
    match card.effect() {
        CardEffect::MoveTo(index) => player.set_position(index % board_len),
        CardEffect::Collect(amount) => player.credit(amount),
        CardEffect::Pay(amount) => player.debit(amount),
        CardEffect::None => (),
    }
}
