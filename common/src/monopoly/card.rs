use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum CardEffect {
    // Board index to move to. No landing is resolved there.
    MoveTo(usize),
    Collect(i64),
    Pay(i64),
    None,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Card {
    description: String,
    effect: CardEffect,
}

impl Card {
    pub fn new(description: &str, effect: CardEffect) -> Self {
        Card {
            description: description.to_string(),
            effect,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn effect(&self) -> CardEffect {
        self.effect
    }
}

/// Cards are dealt in order and the deck cycles once exhausted.
#[derive(Clone, Debug)]
pub struct CardDeck {
    cards: Vec<Card>,
    next: usize,
}

impl CardDeck {
    // A deck with no cards deals nothing
    pub fn new(cards: Vec<Card>) -> Self {
        CardDeck { cards, next: 0 }
    }

    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            return None;
        }
        let card = self.cards[self.next].clone();
        self.next = (self.next + 1) % self.cards.len();
        Some(card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for CardDeck {
    fn default() -> Self {
        CardDeck::new(vec![
            Card::new("Advance to Go", CardEffect::MoveTo(0)),
            Card::new("Bank pays you dividend of $50", CardEffect::Collect(50)),
            Card::new("Pay poor tax of $15", CardEffect::Pay(15)),
            Card::new("Go to Jail", CardEffect::MoveTo(6)),
            Card::new("You have won second prize in a beauty contest", CardEffect::Collect(10)),
            Card::new("Doctor's fees. Pay $50", CardEffect::Pay(50)),
            Card::new("Take a walk on the Boardwalk", CardEffect::MoveTo(27)),
            Card::new("Get out of Jail free. Keep until needed", CardEffect::None),
        ])
    }
}
