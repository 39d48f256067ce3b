//! One round's worth of owned game state.

use std::time::Duration;

use serde::Serialize;

use super::card::{Card, CardId, CardRegistry, CardState};
use super::engine::{Command, InvalidSelection, Ticket, TurnEngine};
use super::timer::{RoundTimer, Tick};

/// Round identifier. Strictly increasing per controller.
pub type Epoch = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    NotStarted,
    Running,
    Won,
    Lost,
}

/// A callback scheduled for an earlier round fired after that round was replaced.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("callback from round {fired} arrived during round {current}")]
pub struct StaleCallback {
    pub fired: Epoch,
    pub current: Epoch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundInfo {
    pub epoch: Epoch,
    pub pair_count: usize,
    pub total_cards: usize,
    pub time_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub state: CardState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<char>,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        CardView { id: card.id, state: card.state, letter: card.is_face_up().then_some(card.letter) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSnapshot {
    pub epoch: Epoch,
    pub status: RoundStatus,
    pub pair_count: usize,
    pub matched_pairs: usize,
    pub time_remaining: u32,
    pub cards: Vec<CardView>,
}

impl RoundSnapshot {
    pub fn not_started() -> Self {
        Self {
            epoch: 0,
            status: RoundStatus::NotStarted,
            pair_count: 0,
            matched_pairs: 0,
            time_remaining: 0,
            cards: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct GameSession {
    epoch: Epoch,
    cards: CardRegistry,
    engine: TurnEngine,
    timer: RoundTimer,
    status: RoundStatus,
}

impl GameSession {
    /// Starts a running round over an already validated, shuffled deck.
    pub fn new(epoch: Epoch, letters: &[char], reversal_delay: Duration) -> Self {
        let mut cards = CardRegistry::new();
        cards.create_round(letters);
        Self {
            epoch,
            engine: TurnEngine::new(letters.len() / 2, reversal_delay),
            timer: RoundTimer::for_cards(cards.len()),
            cards,
            status: RoundStatus::Running,
        }
    }

    pub fn epoch(&self) -> Epoch { self.epoch }

    pub fn status(&self) -> RoundStatus { self.status }

    pub fn card(&self, id: CardId) -> Option<&Card> { self.cards.find_by_id(id).ok() }

    pub fn cards(&self) -> &CardRegistry { &self.cards }

    pub fn engine(&self) -> &TurnEngine { &self.engine }

    pub fn info(&self) -> RoundInfo {
        RoundInfo {
            epoch: self.epoch,
            pair_count: self.engine.pair_count(),
            total_cards: self.cards.len(),
            time_remaining: self.timer.remaining(),
        }
    }

    fn check_epoch(&self, fired: Epoch) -> Result<(), StaleCallback> {
        if fired == self.epoch { Ok(()) } else { Err(StaleCallback { fired, current: self.epoch }) }
    }

    fn is_running(&self) -> bool { self.status == RoundStatus::Running }

    pub fn select(&mut self, id: CardId) -> Result<Vec<Command>, InvalidSelection> {
        if !self.is_running() {
            return Err(InvalidSelection::NotRunning);
        }
        self.engine.select(&mut self.cards, id)
    }

    /// A finished round no longer reacts to transitions; the picture on screen
    /// completes but the state stays frozen.
    pub fn transition_finished(&mut self, epoch: Epoch, ticket: Ticket) -> Result<Vec<Command>, StaleCallback> {
        self.check_epoch(epoch)?;
        if !self.is_running() {
            return Ok(Vec::new());
        }
        Ok(self.engine.transition_finished(&mut self.cards, ticket))
    }

    pub fn reversal_due(&mut self, epoch: Epoch, ticket: Ticket) -> Result<Vec<Command>, StaleCallback> {
        self.check_epoch(epoch)?;
        if !self.is_running() {
            return Ok(Vec::new());
        }
        Ok(self.engine.reversal_due(&mut self.cards, ticket))
    }

    pub fn tick(&mut self, epoch: Epoch) -> Result<Tick, StaleCallback> {
        self.check_epoch(epoch)?;
        if !self.is_running() {
            return Ok(Tick::Stopped);
        }
        Ok(self.timer.tick())
    }

    /// Moves a running round to its terminal status. Returns false when the
    /// round had already ended, leaving it untouched.
    pub fn finish(&mut self, won: bool) -> bool {
        if !self.is_running() {
            return false;
        }
        self.timer.stop();
        self.status = if won { RoundStatus::Won } else { RoundStatus::Lost };
        true
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            epoch: self.epoch,
            status: self.status,
            pair_count: self.engine.pair_count(),
            matched_pairs: self.engine.matched_pairs(),
            time_remaining: self.timer.remaining(),
            cards: self.cards.cards().iter().map(CardView::from).collect(),
        }
    }
}
