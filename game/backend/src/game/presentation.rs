//! The narrow interface the core drives the presentation layer through.

use std::future::Future;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use super::card::Card;
use super::session::RoundInfo;

/// A visual transition that completes at some later point: after a fixed
/// duration, on the next frame, or when a renderer signals it.
pub struct Transition(BoxFuture<'static, ()>);

impl Transition {
    pub fn instant() -> Self { Self(future::ready(()).boxed()) }

    /// Must be called from within a tokio runtime.
    pub fn after(duration: Duration) -> Self { Self(tokio::time::sleep(duration).boxed()) }

    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(fut.boxed())
    }

    /// Completes once both transitions have completed.
    pub fn join(self, other: Transition) -> Self {
        Self(future::join(self.0, other.0).map(|_| ()).boxed())
    }

    pub async fn finished(self) { self.0.await }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Transition")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    pub fn won(self) -> bool { matches!(self, Outcome::Won) }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::Won => "Winner Winner Chicken Dinner!",
            Outcome::Lost => "It looks that we have a loser!",
        }
    }
}

pub trait Presentation: Send + 'static {
    /// A new round replaced whatever was on screen.
    fn round_started(&mut self, _round: &RoundInfo, _cards: &[Card]) {}

    fn render_reveal(&mut self, card: &Card) -> Transition;

    fn render_hide(&mut self, card: &Card) -> Transition;

    fn render_matched(&mut self, card: &Card) -> Transition;

    fn update_score_display(&mut self, matched_pairs: usize);

    fn update_timer_display(&mut self, time_remaining: u32);

    fn announce_outcome(&mut self, outcome: Outcome);
}
