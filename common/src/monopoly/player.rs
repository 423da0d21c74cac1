use crate::monopoly::board::Property;
use serde::{Deserialize, Serialize};

pub const STARTING_BALANCE: i64 = 1500;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Player {
    name: String,
    #[serde(default)]
    position: usize,
    #[serde(default = "starting_balance")]
    balance: i64,
    #[serde(default)]
    properties: Vec<Property>,
    // Display-only token for the presentation layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    piece: Option<String>,
}

fn starting_balance() -> i64 {
    STARTING_BALANCE
}

impl Player {
    pub fn new(name: &str) -> Self {
        Player {
            name: name.to_string(),
            position: 0,
            balance: STARTING_BALANCE,
            properties: Vec::new(),
            piece: None,
        }
    }

    pub fn with_piece(mut self, piece: &str) -> Self {
        self.piece = Some(piece.to_string());
        self
    }

    pub fn with_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn piece(&self) -> Option<&str> {
        self.piece.as_deref()
    }

    pub fn owns(&self, property_name: &str) -> bool {
        self.properties.iter().any(|p| p.name() == property_name)
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    // Clients may assert any balance, so both directions saturate at the i64 bounds
    pub(crate) fn credit(&mut self, amount: i64) {
        self.balance = self.balance.saturating_add(amount);
    }

    // No lower bound other than i64::MIN: balances may go negative
    pub(crate) fn debit(&mut self, amount: i64) {
        self.balance = self.balance.saturating_sub(amount);
    }

    pub(crate) fn set_balance(&mut self, balance: i64) {
        self.balance = balance;
    }

    pub(crate) fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }
}
