//! Game core: cards, shuffling, the turn engine, the round timer and the
//! controller that wires them to a presentation layer.

pub mod card;
pub mod controller;
pub mod deck;
pub mod engine;
pub mod presentation;
pub mod schedule;
pub mod session;
pub mod timer;

pub use card::{Card, CardId, CardState};
pub use controller::{ControllerHandle, Event, GameController, StartRoundError};
pub use deck::ValidationError;
pub use presentation::{Outcome, Presentation, Transition};
pub use session::{Epoch, RoundInfo, RoundSnapshot, RoundStatus};
