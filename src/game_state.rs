use crate::generator::WordGenerator;
use crate::round::Timer;
use crate::session::{Effect, Scoreboard, Session};
use crate::wordbank::WordEntry;
use crate::{debug_log, info_log};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Upper bound on how long the loop waits for input before re-checking timers.
const IDLE_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Tap tile `n` (0-based).
    Place(usize),
    /// Clear slot `n` (0-based).
    Remove(usize),
    Next,
    MoreWords,
    Speak,
    Exit,
}

/// Presentation side of the game: shows the session and collects actions.
pub trait GameInterface {
    fn render(&mut self, session: &Session);

    /// Wait up to `wait` for the player. `None` on timeout or unusable input.
    fn next_action(&mut self, wait: Duration) -> Option<UserAction>;

    /// True when `next_action` blocks until the player answers, whatever `wait` says.
    /// The loop then lets pending timers run out before asking.
    fn blocks_on_input(&self) -> bool {
        false
    }
}

/// Pending timers, fired in deadline order.
#[derive(Debug, Default)]
struct TimerQueue {
    pending: Vec<(Instant, Timer)>,
}

impl TimerQueue {
    fn push(&mut self, deadline: Instant, timer: Timer) {
        self.pending.push((deadline, timer));
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(deadline, _)| *deadline).min()
    }

    fn pop_due(&mut self, now: Instant) -> Option<Timer> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .min_by_key(|(_, (deadline, _))| *deadline)?;
        Some(self.pending.remove(index).1)
    }
}

/// Carries out the effects a session asks for.
struct Driver<G> {
    generator: Arc<G>,
    runtime: Handle,
    results: UnboundedSender<Vec<WordEntry>>,
    timers: TimerQueue,
}

impl<G: WordGenerator + 'static> Driver<G> {
    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { timer, delay } => {
                    self.timers.push(Instant::now() + delay, timer);
                }
                Effect::Fetch { count } => {
                    info_log!("Driver::run() - fetching {} words", count);
                    let generator = Arc::clone(&self.generator);
                    let results = self.results.clone();
                    self.runtime.spawn(async move {
                        let batch = generator.generate(count).await;
                        // The loop may be gone already; the batch is simply dropped then.
                        let _ = results.send(batch);
                    });
                }
            }
        }
    }

    fn fire_due(&mut self, session: &mut Session) {
        while let Some(timer) = self.timers.pop_due(Instant::now()) {
            let effects = session.fire(timer);
            self.run(effects);
        }
    }
}

fn drain_results(session: &mut Session, results: &mut UnboundedReceiver<Vec<WordEntry>>) {
    while let Ok(batch) = results.try_recv() {
        session.finish_fetch(batch);
    }
}

/// Run the game until the player exits. Returns the final score.
///
/// Must be called outside of the tokio runtime; fetches are spawned onto `runtime`.
pub fn game_loop<I, G>(
    session: &mut Session,
    interface: &mut I,
    generator: Arc<G>,
    runtime: &Handle,
) -> Scoreboard
where
    I: GameInterface,
    G: WordGenerator + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut driver = Driver {
        generator,
        runtime: runtime.clone(),
        results: tx,
        timers: TimerQueue::default(),
    };

    loop {
        drain_results(session, &mut rx);
        driver.fire_due(session);

        if session.awaiting_batch() {
            interface.render(session);
            debug_log!("game_loop() - waiting for word batch");
            if interface.blocks_on_input() {
                match rx.blocking_recv() {
                    Some(batch) => session.finish_fetch(batch),
                    None => break,
                }
            } else if interface.next_action(IDLE_WAIT) == Some(UserAction::Exit) {
                break;
            }
            continue;
        }

        interface.render(session);

        let now = Instant::now();
        if interface.blocks_on_input()
            && let Some(deadline) = driver.timers.next_deadline()
        {
            std::thread::sleep(deadline.saturating_duration_since(now));
            continue;
        }

        let wait = driver
            .timers
            .next_deadline()
            .map_or(IDLE_WAIT, |deadline| deadline.saturating_duration_since(now))
            .min(IDLE_WAIT);
        let Some(action) = interface.next_action(wait) else {
            continue;
        };
        debug_log!("game_loop() - action {:?}", action);

        let effects = match action {
            UserAction::Exit => break,
            UserAction::Place(tile) => session.place(tile),
            UserAction::Remove(slot) => {
                session.remove(slot);
                Vec::new()
            }
            UserAction::Next => session.advance(),
            UserAction::MoreWords => session.request_more(),
            UserAction::Speak => {
                session.speak();
                Vec::new()
            }
        };
        driver.run(effects);
    }

    let scoreboard = session.scoreboard();
    info_log!(
        "game_loop() - finished with score {} after {} rounds",
        scoreboard.score,
        session.history().len()
    );
    scoreboard
}
