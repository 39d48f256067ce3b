//! Cancellable scheduled callbacks that post back into the event queue.
//!
//! Every task is a child of the current round's cancellation token, so
//! [`Scheduler::reset`] tears down everything a round left running. Events
//! still carry their round epoch: a task that already posted before being
//! cancelled is filtered out by the session.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::presentation::Transition;

#[derive(Debug)]
pub struct TaskHandle {
    token: CancellationToken,
}

impl TaskHandle {
    pub fn cancel(&self) { self.token.cancel(); }

    pub fn is_cancelled(&self) -> bool { self.token.is_cancelled() }
}

#[derive(Debug)]
pub struct Scheduler<E> {
    tx: UnboundedSender<E>,
    round: CancellationToken,
}

impl<E: Send + 'static> Scheduler<E> {
    pub fn new(tx: UnboundedSender<E>) -> Self {
        Self { tx, round: CancellationToken::new() }
    }

    /// Cancels every task of the current round and opens a fresh scope.
    pub fn reset(&mut self) {
        self.round.cancel();
        self.round = CancellationToken::new();
    }

    /// Cancels every task of the current round.
    pub fn cancel_all(&self) { self.round.cancel(); }

    /// Posts `event` once `delay` has passed.
    pub fn after(&self, delay: Duration, event: E) -> TaskHandle {
        let token = self.round.child_token();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = time::sleep(delay) => { let _ = tx.send(event); }
            }
        });
        TaskHandle { token }
    }

    /// Posts `make()` every `period`, first after one full period.
    pub fn every<F>(&self, period: Duration, make: F) -> TaskHandle
    where
        F: Fn() -> E + Send + 'static,
    {
        let token = self.round.child_token();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(make()).is_err() { break; }
                    }
                }
            }
        });
        TaskHandle { token }
    }

    /// Posts `event` when `transition` completes.
    pub fn when_done(&self, transition: Transition, event: E) -> TaskHandle {
        let token = self.round.child_token();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = transition.finished() => { let _ = tx.send(event); }
            }
        });
        TaskHandle { token }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn delayed_event_arrives_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        scheduler.after(Duration::from_millis(1000), 7u32);

        time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());
        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv(), Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let handle = scheduler.after(Duration::from_millis(100), 1u32);
        handle.cancel();
        assert!(handle.is_cancelled());
        time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_the_whole_round() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tx);
        scheduler.every(Duration::from_secs(1), || "old tick");
        scheduler.after(Duration::from_millis(500), "old reversal");
        scheduler.reset();
        scheduler.after(Duration::from_millis(700), "new reversal");

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(rx.try_recv(), Ok("new reversal"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_posts_every_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let ticker = scheduler.every(Duration::from_secs(1), || ());
        time::sleep(Duration::from_millis(3500)).await;
        ticker.cancel();
        time::sleep(Duration::from_secs(2)).await;
        let mut ticks = 0;
        while rx.try_recv().is_ok() {
            ticks += 1;
        }
        assert_eq!(ticks, 3);
    }
}
