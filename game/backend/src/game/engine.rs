//! Turn engine: selection, match checking and mismatch reversal.
//!
//! The engine never performs I/O. Every operation mutates card state and
//! returns the [`Command`]s the caller has to carry out: play a transition,
//! schedule or cancel the reversal, update the score. Asynchronous results
//! come back in through [`TurnEngine::transition_finished`] and
//! [`TurnEngine::reversal_due`], keyed by the [`Ticket`] handed out with the
//! command. A ticket that is not the one the engine is waiting for is ignored,
//! so late or duplicated callbacks cannot move the state machine.

use std::time::Duration;

use tracing::{debug, trace};

use super::card::{CardId, CardRegistry, CardState, LookupError};

/// Identifies one transition or one scheduled reversal.
pub type Ticket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// One card is face up, waiting for its partner.
    AwaitingResolution { first: CardId },
    /// A mismatched pair is on display until `reversal` fires.
    Locked { pair: [CardId; 2], reversal: Ticket },
    /// A transition is in flight; selections are dropped.
    Animating { ticket: Ticket, then: AfterTransition },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterTransition {
    /// `card` finished flipping up. `first` is the card already up this turn.
    Revealed { card: CardId, first: Option<CardId> },
    /// A mismatched pair finished flipping back down.
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Flip `card` face up and report `ticket` once the transition ends.
    Reveal { card: CardId, ticket: Ticket },
    /// Flip both cards face down. Only a scheduled reversal waits for the
    /// transition; a forced one carries no ticket.
    Hide { cards: [CardId; 2], ticket: Option<Ticket> },
    Match { cards: [CardId; 2] },
    ScheduleReversal { ticket: Ticket, delay: Duration },
    CancelReversal { ticket: Ticket },
    Score { matched_pairs: usize },
    AllMatched,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSelection {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("a transition is still in flight")]
    Busy,
    #[error("card {0} is already face up")]
    AlreadyRevealed(CardId),
    #[error("card {0} is already matched")]
    AlreadyMatched(CardId),
    #[error("no round is running")]
    NotRunning,
}

#[derive(Debug)]
pub struct TurnEngine {
    phase: Phase,
    pair_count: usize,
    matched_pairs: usize,
    last_ticket: Ticket,
    reversal_delay: Duration,
}

impl TurnEngine {
    pub fn new(pair_count: usize, reversal_delay: Duration) -> Self {
        Self { phase: Phase::Idle, pair_count, matched_pairs: 0, last_ticket: 0, reversal_delay }
    }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn matched_pairs(&self) -> usize { self.matched_pairs }

    pub fn pair_count(&self) -> usize { self.pair_count }

    /// Ticket of the reversal currently waiting to fire, if any.
    pub fn pending_reversal(&self) -> Option<Ticket> {
        match self.phase {
            Phase::Locked { reversal, .. } => Some(reversal),
            _ => None,
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        self.last_ticket
    }

    pub fn select(&mut self, cards: &mut CardRegistry, id: CardId) -> Result<Vec<Command>, InvalidSelection> {
        if matches!(self.phase, Phase::Animating { .. }) {
            return Err(InvalidSelection::Busy);
        }
        match cards.find_by_id(id)?.state {
            CardState::Hidden => {}
            CardState::Revealed => return Err(InvalidSelection::AlreadyRevealed(id)),
            CardState::Matched => return Err(InvalidSelection::AlreadyMatched(id)),
        }

        let mut commands = Vec::with_capacity(3);
        if let Phase::Locked { pair, reversal } = self.phase {
            trace!(?pair, reversal, "forcing early reversal");
            commands.push(Command::CancelReversal { ticket: reversal });
            set_state(cards, pair, CardState::Hidden);
            commands.push(Command::Hide { cards: pair, ticket: None });
            self.phase = Phase::Idle;
        }

        let first = match self.phase {
            Phase::AwaitingResolution { first } => Some(first),
            _ => None,
        };
        cards.find_by_id_mut(id)?.state = CardState::Revealed;
        let ticket = self.issue_ticket();
        self.phase = Phase::Animating { ticket, then: AfterTransition::Revealed { card: id, first } };
        commands.push(Command::Reveal { card: id, ticket });
        trace!(card = id, ticket, "revealing");
        Ok(commands)
    }

    pub fn transition_finished(&mut self, cards: &mut CardRegistry, ticket: Ticket) -> Vec<Command> {
        let then = match self.phase {
            Phase::Animating { ticket: current, then } if current == ticket => then,
            phase => {
                debug!(ticket, ?phase, "ignoring transition that is no longer awaited");
                return Vec::new();
            }
        };
        match then {
            AfterTransition::Revealed { card, first: None } => {
                self.phase = Phase::AwaitingResolution { first: card };
                Vec::new()
            }
            AfterTransition::Revealed { card, first: Some(first) } => self.resolve(cards, first, card),
            AfterTransition::Hidden => {
                self.phase = Phase::Idle;
                Vec::new()
            }
        }
    }

    fn resolve(&mut self, cards: &mut CardRegistry, first: CardId, second: CardId) -> Vec<Command> {
        let letters = (cards.find_by_id(first).map(|c| c.letter), cards.find_by_id(second).map(|c| c.letter));
        let pair = [first, second];
        match letters {
            (Ok(a), Ok(b)) if a == b => {
                set_state(cards, pair, CardState::Matched);
                self.matched_pairs += 1;
                self.phase = Phase::Idle;
                trace!(?pair, matched = self.matched_pairs, "pair matched");
                let mut commands = vec![
                    Command::Match { cards: pair },
                    Command::Score { matched_pairs: self.matched_pairs },
                ];
                if self.matched_pairs == self.pair_count {
                    commands.push(Command::AllMatched);
                }
                commands
            }
            _ => {
                let ticket = self.issue_ticket();
                self.phase = Phase::Locked { pair, reversal: ticket };
                trace!(?pair, ticket, "mismatch locked");
                vec![Command::ScheduleReversal { ticket, delay: self.reversal_delay }]
            }
        }
    }

    pub fn reversal_due(&mut self, cards: &mut CardRegistry, ticket: Ticket) -> Vec<Command> {
        let pair = match self.phase {
            Phase::Locked { pair, reversal } if reversal == ticket => pair,
            phase => {
                debug!(ticket, ?phase, "ignoring reversal that was already resolved");
                return Vec::new();
            }
        };
        set_state(cards, pair, CardState::Hidden);
        let hide = self.issue_ticket();
        self.phase = Phase::Animating { ticket: hide, then: AfterTransition::Hidden };
        vec![Command::Hide { cards: pair, ticket: Some(hide) }]
    }
}

fn set_state(cards: &mut CardRegistry, ids: [CardId; 2], state: CardState) {
    for id in ids {
        if let Ok(card) = cards.find_by_id_mut(id) {
            card.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(1000);

    // A B C D E A B C D E
    fn setup() -> (TurnEngine, CardRegistry) {
        let mut cards = CardRegistry::new();
        cards.create_round(&['A', 'B', 'C', 'D', 'E', 'A', 'B', 'C', 'D', 'E']);
        (TurnEngine::new(5, DELAY), cards)
    }

    fn reveal_ticket(commands: &[Command]) -> Ticket {
        commands
            .iter()
            .find_map(|c| match c { Command::Reveal { ticket, .. } => Some(*ticket), _ => None })
            .expect("reveal command")
    }

    /// Select `id` and let its flip finish.
    fn flip(engine: &mut TurnEngine, cards: &mut CardRegistry, id: CardId) -> Vec<Command> {
        let commands = engine.select(cards, id).unwrap();
        let ticket = reveal_ticket(&commands);
        let mut out = commands;
        out.extend(engine.transition_finished(cards, ticket));
        out
    }

    #[test]
    fn first_flip_waits_for_partner() {
        let (mut engine, mut cards) = setup();
        let commands = engine.select(&mut cards, 0).unwrap();
        assert_eq!(commands, vec![Command::Reveal { card: 0, ticket: 1 }]);
        assert!(matches!(engine.phase(), Phase::Animating { .. }));

        assert!(engine.transition_finished(&mut cards, 1).is_empty());
        assert_eq!(engine.phase(), Phase::AwaitingResolution { first: 0 });
        assert_eq!(cards.find_by_id(0).unwrap().state, CardState::Revealed);
    }

    #[test]
    fn selections_during_a_flip_are_dropped() {
        let (mut engine, mut cards) = setup();
        engine.select(&mut cards, 0).unwrap();
        assert_eq!(engine.select(&mut cards, 1), Err(InvalidSelection::Busy));
        assert_eq!(cards.find_by_id(1).unwrap().state, CardState::Hidden);
    }

    #[test]
    fn matching_pair_is_kept_without_a_reversal() {
        let (mut engine, mut cards) = setup();
        flip(&mut engine, &mut cards, 0);
        let commands = flip(&mut engine, &mut cards, 5);

        assert!(commands.contains(&Command::Match { cards: [0, 5] }));
        assert!(commands.contains(&Command::Score { matched_pairs: 1 }));
        assert!(!commands.iter().any(|c| matches!(c, Command::ScheduleReversal { .. })));
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.matched_pairs(), 1);
        assert_eq!(cards.count_in(CardState::Matched), 2);
    }

    #[test]
    fn mismatch_locks_and_reverses_once() {
        let (mut engine, mut cards) = setup();
        flip(&mut engine, &mut cards, 0);
        let commands = flip(&mut engine, &mut cards, 1);
        let scheduled: Vec<_> = commands
            .iter()
            .filter_map(|c| match c { Command::ScheduleReversal { ticket, delay } => Some((*ticket, *delay)), _ => None })
            .collect();
        assert_eq!(scheduled.len(), 1);
        let (ticket, delay) = scheduled[0];
        assert_eq!(delay, DELAY);
        assert_eq!(engine.pending_reversal(), Some(ticket));

        let hide = engine.reversal_due(&mut cards, ticket);
        assert!(matches!(hide.as_slice(), [Command::Hide { cards: [0, 1], ticket: Some(_) }]));
        assert_eq!(cards.count_in(CardState::Hidden), 10);

        // a duplicate firing changes nothing
        assert!(engine.reversal_due(&mut cards, ticket).is_empty());

        let Command::Hide { ticket: Some(hide_ticket), .. } = hide[0] else { unreachable!() };
        engine.transition_finished(&mut cards, hide_ticket);
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.matched_pairs(), 0);
    }

    #[test]
    fn third_selection_forces_the_reversal_early() {
        let (mut engine, mut cards) = setup();
        flip(&mut engine, &mut cards, 0);
        flip(&mut engine, &mut cards, 1);
        let pending = engine.pending_reversal().unwrap();

        let commands = engine.select(&mut cards, 2).unwrap();
        assert_eq!(commands[0], Command::CancelReversal { ticket: pending });
        assert_eq!(commands[1], Command::Hide { cards: [0, 1], ticket: None });
        assert!(matches!(commands[2], Command::Reveal { card: 2, .. }));
        assert_eq!(cards.count_in(CardState::Revealed), 1);

        // the cancelled reversal arriving late must not hide card 2 or re-hide 0/1
        assert!(engine.reversal_due(&mut cards, pending).is_empty());
        assert_eq!(cards.find_by_id(2).unwrap().state, CardState::Revealed);
    }

    #[test]
    fn forced_reversal_starts_a_clean_turn() {
        let (mut engine, mut cards) = setup();
        flip(&mut engine, &mut cards, 0);
        flip(&mut engine, &mut cards, 1);
        // card 6 is a B, but its partner was just hidden again
        flip(&mut engine, &mut cards, 6);
        assert_eq!(engine.phase(), Phase::AwaitingResolution { first: 6 });
        let commands = flip(&mut engine, &mut cards, 1);
        assert!(commands.contains(&Command::Match { cards: [6, 1] }));
    }

    #[test]
    fn face_up_cards_are_silent_no_ops() {
        let (mut engine, mut cards) = setup();
        flip(&mut engine, &mut cards, 0);
        flip(&mut engine, &mut cards, 5);
        let before = engine.phase();
        assert_eq!(engine.select(&mut cards, 0), Err(InvalidSelection::AlreadyMatched(0)));
        assert_eq!(engine.phase(), before);

        flip(&mut engine, &mut cards, 1);
        assert_eq!(engine.select(&mut cards, 1), Err(InvalidSelection::AlreadyRevealed(1)));
        assert_eq!(engine.phase(), Phase::AwaitingResolution { first: 1 });
    }

    #[test]
    fn reselecting_a_locked_card_keeps_the_lock() {
        let (mut engine, mut cards) = setup();
        flip(&mut engine, &mut cards, 0);
        flip(&mut engine, &mut cards, 1);
        let locked = engine.phase();
        assert_eq!(engine.select(&mut cards, 1), Err(InvalidSelection::AlreadyRevealed(1)));
        assert_eq!(engine.phase(), locked);
    }

    #[test]
    fn unknown_card_is_rejected() {
        let (mut engine, mut cards) = setup();
        assert_eq!(
            engine.select(&mut cards, 10),
            Err(InvalidSelection::Lookup(LookupError::NotFound(10)))
        );
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn stale_transition_ticket_is_ignored() {
        let (mut engine, mut cards) = setup();
        let ticket = reveal_ticket(&engine.select(&mut cards, 0).unwrap());
        assert!(engine.transition_finished(&mut cards, ticket + 7).is_empty());
        assert!(matches!(engine.phase(), Phase::Animating { .. }));
    }

    #[test]
    fn last_pair_signals_all_matched_once() {
        let (mut engine, mut cards) = setup();
        let mut signals = 0;
        for id in 0..5 {
            for c in flip(&mut engine, &mut cards, id).into_iter().chain(flip(&mut engine, &mut cards, id + 5)) {
                if c == Command::AllMatched {
                    signals += 1;
                }
            }
        }
        assert_eq!(signals, 1);
        assert_eq!(engine.matched_pairs(), 5);
        assert_eq!(cards.count_in(CardState::Matched), 10);
    }
}
