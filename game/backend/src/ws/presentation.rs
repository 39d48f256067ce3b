//! Presentation layer backed by a browser on the other end of a WebSocket.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::game::{Card, Outcome, Presentation, RoundInfo, Transition};

use super::layout;
use super::messages::ServerToClient;

/// Forwards render calls to the socket writer. The browser animates flips
/// itself; the server assumes they take `flip` and does not wait for an ack.
pub struct WsPresentation {
    tx: UnboundedSender<ServerToClient>,
    flip: Duration,
}

impl WsPresentation {
    pub fn new(tx: UnboundedSender<ServerToClient>, flip: Duration) -> Self { Self { tx, flip } }

    fn send(&self, msg: ServerToClient) {
        // The socket closing is noticed by the read loop; nothing to do here.
        let _ = self.tx.send(msg);
    }
}

impl Presentation for WsPresentation {
    fn round_started(&mut self, round: &RoundInfo, cards: &[Card]) {
        self.send(ServerToClient::RoundStarted {
            epoch: round.epoch,
            pair_count: round.pair_count,
            time_remaining: round.time_remaining,
            layout: layout::grid(cards.len()),
        });
    }

    fn render_reveal(&mut self, card: &Card) -> Transition {
        self.send(ServerToClient::Reveal { card_id: card.id, letter: card.letter });
        Transition::after(self.flip)
    }

    fn render_hide(&mut self, card: &Card) -> Transition {
        self.send(ServerToClient::Hide { card_id: card.id });
        Transition::after(self.flip)
    }

    fn render_matched(&mut self, card: &Card) -> Transition {
        self.send(ServerToClient::Matched { card_id: card.id });
        Transition::instant()
    }

    fn update_score_display(&mut self, matched_pairs: usize) {
        self.send(ServerToClient::Score { matched_pairs });
    }

    fn update_timer_display(&mut self, time_remaining: u32) {
        self.send(ServerToClient::Timer { time_remaining });
    }

    fn announce_outcome(&mut self, outcome: Outcome) {
        self.send(ServerToClient::Outcome { won: outcome.won(), message: outcome.message().to_string() });
    }
}
