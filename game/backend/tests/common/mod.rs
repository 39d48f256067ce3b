#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pairs::config::GameSettings;
use pairs::game::deck;
use pairs::game::{Card, CardId, ControllerHandle, GameController, Outcome, Presentation, RoundInfo, RoundSnapshot, Transition};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const FLIP: Duration = Duration::from_millis(500);
pub const SEED: u64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Started(RoundInfo),
    Reveal(CardId),
    Hide(CardId),
    Matched(CardId),
    Score(usize),
    Timer(u32),
    Outcome(Outcome),
}

/// Presentation that records every call and takes `FLIP` per transition.
#[derive(Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<Rendered>>>,
}

impl Recorder {
    fn push(&self, rendered: Rendered) { self.log.lock().unwrap().push(rendered); }

    pub fn log(&self) -> Vec<Rendered> { self.log.lock().unwrap().clone() }

    pub fn count(&self, wanted: &Rendered) -> usize {
        self.log.lock().unwrap().iter().filter(|r| *r == wanted).count()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.log()
            .into_iter()
            .filter_map(|r| match r { Rendered::Outcome(o) => Some(o), _ => None })
            .collect()
    }

    /// Everything rendered after the most recent round start.
    pub fn since_last_start(&self) -> Vec<Rendered> {
        let log = self.log();
        let start = log.iter().rposition(|r| matches!(r, Rendered::Started(_))).unwrap_or(0);
        log[start..].to_vec()
    }
}

impl Presentation for Recorder {
    fn round_started(&mut self, round: &RoundInfo, _cards: &[Card]) { self.push(Rendered::Started(round.clone())); }

    fn render_reveal(&mut self, card: &Card) -> Transition {
        self.push(Rendered::Reveal(card.id));
        Transition::after(FLIP)
    }

    fn render_hide(&mut self, card: &Card) -> Transition {
        self.push(Rendered::Hide(card.id));
        Transition::after(FLIP)
    }

    fn render_matched(&mut self, card: &Card) -> Transition {
        self.push(Rendered::Matched(card.id));
        Transition::instant()
    }

    fn update_score_display(&mut self, matched_pairs: usize) { self.push(Rendered::Score(matched_pairs)); }

    fn update_timer_display(&mut self, time_remaining: u32) { self.push(Rendered::Timer(time_remaining)); }

    fn announce_outcome(&mut self, outcome: Outcome) { self.push(Rendered::Outcome(outcome)); }
}

pub struct Harness {
    pub handle: ControllerHandle,
    pub recorder: Recorder,
    pub snapshots: watch::Receiver<RoundSnapshot>,
    pub task: JoinHandle<()>,
    rng: StdRng,
}

impl Harness {
    /// Spawns a seeded controller. Must run inside a tokio runtime.
    pub fn spawn() -> Self {
        pairs::telemetry::init_for_tests();
        let settings = GameSettings { seed: Some(SEED), flip_duration: FLIP, ..GameSettings::default() };
        let recorder = Recorder::default();
        let (controller, handle) = GameController::new(recorder.clone(), settings);
        let snapshots = controller.subscribe();
        let task = tokio::spawn(controller.run());
        Self { handle, recorder, snapshots, task, rng: StdRng::seed_from_u64(SEED) }
    }

    /// The deck the controller will deal for its next valid round.
    pub fn next_deck(&mut self, pairs: usize) -> Vec<char> {
        deck::shuffle(pairs, &mut self.rng).unwrap()
    }

    pub fn snapshot(&self) -> RoundSnapshot { self.snapshots.borrow().clone() }

    /// Selects `card` and waits for its flip to finish.
    pub async fn flip(&self, card: CardId) {
        self.handle.select(card);
        settle(FLIP + Duration::from_millis(50)).await;
    }
}

pub async fn settle(duration: Duration) { tokio::time::sleep(duration).await; }

pub fn partner(deck: &[char], card: CardId) -> CardId {
    (0..deck.len()).find(|&i| i != card && deck[i] == deck[card]).unwrap()
}

pub fn non_partner(deck: &[char], card: CardId) -> CardId {
    (0..deck.len()).find(|&i| deck[i] != deck[card]).unwrap()
}
