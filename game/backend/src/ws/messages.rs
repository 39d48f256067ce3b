//! JSON messages exchanged with the browser.

use serde::{Deserialize, Serialize};

use crate::game::{CardId, Epoch};

use super::layout::Slot;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerToClient {
    Welcome { room_id: String },
    RoundStarted { epoch: Epoch, pair_count: usize, time_remaining: u32, layout: Vec<Slot> },
    Reveal { card_id: CardId, letter: char },
    Hide { card_id: CardId },
    Matched { card_id: CardId },
    Score { matched_pairs: usize },
    Timer { time_remaining: u32 },
    Outcome { won: bool, message: String },
    Error { message: String },
    Pong,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientToServer {
    Ping,
    StartRound { pairs: usize },
    SelectCard { card_id: CardId },
}
