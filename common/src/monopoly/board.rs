use serde::{Deserialize, Serialize};
use thiserror::Error;

// Cost-0 spaces with these names draw a card when the engine holds a deck
const CARD_SPACES: [&str; 2] = ["Chance", "Community Chest"];

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Board with no spaces given")]
    Empty,
    #[error("Space {index} ({name}) costs nothing but has owner {owner}")]
    OwnedFreeSpace {
        index: usize,
        name: String,
        owner: String,
    },
    #[error("Board definition could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Property {
    name: String,
    cost: u32,
    rent: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
}

impl Property {
    pub fn new(name: &str, cost: u32, rent: u32) -> Self {
        Property {
            name: name.to_string(),
            cost,
            rent,
            owner: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn rent(&self) -> u32 {
        self.rent
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn is_purchasable(&self) -> bool {
        self.cost > 0 && self.owner.is_none()
    }

    pub fn draws_card(&self) -> bool {
        self.cost == 0 && CARD_SPACES.contains(&self.name.as_str())
    }

    // Ownership is set once; there is no resale.
    pub(crate) fn set_owner(&mut self, owner: &str) {
        debug_assert!(self.is_purchasable());
        self.owner = Some(owner.to_string());
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Board(Vec<Property>);

impl Board {
    pub fn new(spaces: Vec<Property>) -> Result<Self, BoardError> {
        if spaces.is_empty() {
            return Err(BoardError::Empty);
        }
        if let Some((index, space)) = spaces
            .iter()
            .enumerate()
            .find(|(_, s)| s.cost == 0 && s.owner.is_some())
        {
            return Err(BoardError::OwnedFreeSpace {
                index,
                name: space.name.clone(),
                owner: space.owner.clone().unwrap_or_default(),
            });
        }
        Ok(Board(spaces))
    }

    // Expects a JSON array of `{name, cost, rent}` records
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        let spaces: Vec<Property> = serde_json::from_str(json)?;
        Board::new(spaces)
    }

    // Never zero: `new` rejects an empty board
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn spaces(&self) -> &[Property] {
        &self.0
    }

    pub fn space(&self, index: usize) -> &Property {
        &self.0[index % self.0.len()]
    }

    pub(crate) fn space_mut(&mut self, index: usize) -> &mut Property {
        let len = self.0.len();
        &mut self.0[index % len]
    }

    // Client-asserted positions may be negative or past the end of the board
    pub fn wrap(&self, position: i64) -> usize {
        position.rem_euclid(self.0.len() as i64) as usize
    }
}

impl Default for Board {
    fn default() -> Self {
        Board(vec![
            Property::new("Go", 0, 0),
            Property::new("Mediterranean Avenue", 60, 2),
            Property::new("Baltic Avenue", 60, 4),
            Property::new("Oriental Avenue", 100, 6),
            Property::new("Chance", 0, 0),
            Property::new("Vermont Avenue", 100, 6),
            Property::new("Jail", 0, 0),
            Property::new("St. Charles Place", 140, 10),
            Property::new("States Avenue", 140, 10),
            Property::new("Virginia Avenue", 160, 12),
            Property::new("Community Chest", 0, 0),
            Property::new("St. James Place", 180, 14),
            Property::new("Tennessee Avenue", 180, 14),
            Property::new("New York Avenue", 200, 16),
            Property::new("Free Parking", 0, 0),
            Property::new("Kentucky Avenue", 220, 18),
            Property::new("Indiana Avenue", 220, 18),
            Property::new("Illinois Avenue", 240, 20),
            Property::new("Go to Jail", 0, 0),
            Property::new("Atlantic Avenue", 260, 22),
            Property::new("Ventnor Avenue", 260, 22),
            Property::new("Marvin Gardens", 280, 24),
            Property::new("Pacific Avenue", 300, 26),
            Property::new("North Carolina Avenue", 300, 26),
            Property::new("Pennsylvania Avenue", 320, 28),
            Property::new("Chance", 0, 0),
            Property::new("Park Place", 350, 35),
            Property::new("Boardwalk", 400, 50),
        ])
    }
}
