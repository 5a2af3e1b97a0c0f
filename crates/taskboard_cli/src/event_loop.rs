use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Line(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wake {
    Input(String),
    Timer,
    Closed,
}

/// Forwards stdin lines to the loop thread, then `Event::Closed` at EOF.
pub fn spawn_stdin_reader() -> Receiver<Event> {
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if sender.send(Event::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "stdin read failed, closing session");
                    break;
                }
            }
        }
        let _ = sender.send(Event::Closed);
    });
    receiver
}

/// How long to wait before the next hide is due; `None` waits for input only.
pub fn timer_wait(now: OffsetDateTime, next_hide_at: Option<OffsetDateTime>) -> Option<Duration> {
    let remaining = next_hide_at? - now;
    if remaining.is_negative() {
        return Some(Duration::ZERO);
    }
    Some(Duration::try_from(remaining).unwrap_or(Duration::ZERO))
}

/// Blocks until a line arrives, the input closes, or the timer runs out.
/// Input already queued wins over an expired timer.
pub fn next_wake(receiver: &Receiver<Event>, wait: Option<Duration>) -> Wake {
    let received = match wait {
        Some(wait) => receiver.recv_timeout(wait),
        None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };

    match received {
        Ok(Event::Line(line)) => Wake::Input(line),
        Ok(Event::Closed) | Err(RecvTimeoutError::Disconnected) => Wake::Closed,
        Err(RecvTimeoutError::Timeout) => Wake::Timer,
    }
}
