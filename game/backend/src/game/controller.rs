//! Round lifecycle orchestration on a single event queue.
//!
//! Player input, timer ticks, reversal deadlines and transition completions
//! all arrive as [`Event`]s on one channel and are applied one at a time by
//! [`GameController::run`], so no two of them ever interleave mid-update.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::config::GameSettings;

use super::card::CardId;
use super::deck::{self, ValidationError};
use super::engine::{Command, Ticket};
use super::presentation::{Outcome, Presentation, Transition};
use super::schedule::{Scheduler, TaskHandle};
use super::session::{Epoch, GameSession, RoundInfo, RoundSnapshot};
use super::timer::{TICK, Tick};

#[derive(Debug)]
pub enum Event {
    StartRound {
        pair_count: usize,
        reply: oneshot::Sender<Result<RoundInfo, ValidationError>>,
    },
    CardSelected(CardId),
    TransitionFinished { epoch: Epoch, ticket: Ticket },
    ReversalDue { epoch: Epoch, ticket: Ticket },
    Tick { epoch: Epoch },
    Shutdown,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StartRoundError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("game controller has shut down")]
    Closed,
}

/// Presentation-side entry point into a running controller.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl ControllerHandle {
    pub async fn start_round(&self, pair_count: usize) -> Result<RoundInfo, StartRoundError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Event::StartRound { pair_count, reply })
            .map_err(|_| StartRoundError::Closed)?;
        Ok(rx.await.map_err(|_| StartRoundError::Closed)??)
    }

    pub fn select(&self, card: CardId) {
        let _ = self.tx.send(Event::CardSelected(card));
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Event::Shutdown);
    }
}

pub struct GameController<P> {
    presentation: P,
    settings: GameSettings,
    rng: StdRng,
    session: Option<GameSession>,
    epoch: Epoch,
    scheduler: Scheduler<Event>,
    reversal: Option<TaskHandle>,
    events: mpsc::UnboundedReceiver<Event>,
    snapshot: watch::Sender<RoundSnapshot>,
}

impl<P: Presentation> GameController<P> {
    pub fn new(presentation: P, settings: GameSettings) -> (Self, ControllerHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (snapshot, _) = watch::channel(RoundSnapshot::not_started());
        let controller = Self {
            presentation,
            settings,
            rng,
            session: None,
            epoch: 0,
            scheduler: Scheduler::new(tx.clone()),
            reversal: None,
            events,
            snapshot,
        };
        (controller, ControllerHandle { tx })
    }

    pub fn subscribe(&self) -> watch::Receiver<RoundSnapshot> { self.snapshot.subscribe() }

    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            if matches!(event, Event::Shutdown) {
                break;
            }
            self.handle(event);
        }
        self.scheduler.cancel_all();
        debug!(epoch = self.epoch, "controller stopped");
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::StartRound { pair_count, reply } => {
                let result = self.start_round(pair_count);
                if let Err(err) = &result {
                    info!(%err, "round not started");
                }
                // Readers of the snapshot see the new round before the caller does.
                self.publish();
                let _ = reply.send(result);
                return;
            }
            Event::CardSelected(card) => self.on_card_selected(card),
            Event::TransitionFinished { epoch, ticket } => {
                let Some(session) = self.session.as_mut() else { return };
                match session.transition_finished(epoch, ticket) {
                    Ok(commands) => self.apply(commands),
                    Err(stale) => debug!(%stale, "transition callback discarded"),
                }
            }
            Event::ReversalDue { epoch, ticket } => {
                let Some(session) = self.session.as_mut() else { return };
                match session.reversal_due(epoch, ticket) {
                    Ok(commands) => {
                        self.reversal = None;
                        self.apply(commands);
                    }
                    Err(stale) => debug!(%stale, "reversal callback discarded"),
                }
            }
            Event::Tick { epoch } => self.on_tick(epoch),
            Event::Shutdown => {}
        }
        self.publish();
    }

    /// Replaces the current round. A rejected pair count leaves everything,
    /// including a round in progress, untouched.
    pub fn start_round(&mut self, pair_count: usize) -> Result<RoundInfo, ValidationError> {
        let letters = deck::shuffle(pair_count, &mut self.rng)?;

        self.scheduler.reset();
        self.reversal = None;
        self.epoch += 1;
        let epoch = self.epoch;

        let session = GameSession::new(epoch, &letters, self.settings.mismatch_delay);
        let round = session.info();
        self.presentation.round_started(&round, session.cards().cards());
        self.presentation.update_score_display(0);
        self.presentation.update_timer_display(round.time_remaining);
        self.session = Some(session);
        self.scheduler.every(TICK, move || Event::Tick { epoch });

        info!(epoch, pair_count, time = round.time_remaining, "round started");
        Ok(round)
    }

    pub fn on_card_selected(&mut self, card: CardId) {
        let Some(session) = self.session.as_mut() else {
            debug!(card, "selection without a round");
            return;
        };
        match session.select(card) {
            Ok(commands) => self.apply(commands),
            Err(err) => debug!(card, %err, "selection ignored"),
        }
    }

    fn on_tick(&mut self, epoch: Epoch) {
        let Some(session) = self.session.as_mut() else { return };
        match session.tick(epoch) {
            Ok(Tick::Running(remaining)) => self.presentation.update_timer_display(remaining),
            Ok(Tick::Expired) => {
                self.presentation.update_timer_display(0);
                self.end_round(false);
            }
            Ok(Tick::Stopped) => {}
            Err(stale) => debug!(%stale, "tick discarded"),
        }
    }

    /// Freezes the round. Only the first call per round has any effect.
    pub fn end_round(&mut self, won: bool) {
        let Some(session) = self.session.as_mut() else { return };
        if !session.finish(won) {
            return;
        }
        self.scheduler.cancel_all();
        self.reversal = None;
        let outcome = if won { Outcome::Won } else { Outcome::Lost };
        info!(epoch = session.epoch(), ?outcome, "round over");
        self.presentation.announce_outcome(outcome);
    }

    fn apply(&mut self, commands: Vec<Command>) {
        let Some(session) = self.session.as_ref() else { return };
        let epoch = session.epoch();
        let mut won = false;
        for command in commands {
            match command {
                Command::Reveal { card, ticket } => {
                    let Some(card) = session.card(card) else { continue };
                    let transition = self.presentation.render_reveal(card);
                    self.scheduler.when_done(transition, Event::TransitionFinished { epoch, ticket });
                }
                Command::Hide { cards, ticket } => {
                    let mut transition = Transition::instant();
                    for card in cards.iter().filter_map(|id| session.card(*id)) {
                        transition = transition.join(self.presentation.render_hide(card));
                    }
                    if let Some(ticket) = ticket {
                        self.scheduler.when_done(transition, Event::TransitionFinished { epoch, ticket });
                    }
                }
                Command::Match { cards } => {
                    for card in cards.iter().filter_map(|id| session.card(*id)) {
                        drop(self.presentation.render_matched(card));
                    }
                }
                Command::ScheduleReversal { ticket, delay } => {
                    self.reversal = Some(self.scheduler.after(delay, Event::ReversalDue { epoch, ticket }));
                }
                Command::CancelReversal { ticket } => {
                    if let Some(pending) = self.reversal.take() {
                        pending.cancel();
                    }
                    debug!(epoch, ticket, "reversal cancelled");
                }
                Command::Score { matched_pairs } => self.presentation.update_score_display(matched_pairs),
                Command::AllMatched => won = true,
            }
        }
        if won {
            self.end_round(true);
        }
    }

    fn publish(&self) {
        let snapshot = match &self.session {
            Some(session) => session.snapshot(),
            None => RoundSnapshot::not_started(),
        };
        self.snapshot.send_replace(snapshot);
    }
}
