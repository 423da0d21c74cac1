pub mod messages;
mod monopoly;

pub use monopoly::*;
