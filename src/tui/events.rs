use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Polls the terminal on a background thread and interleaves key presses with
/// a fixed tick. The thread exits once the receiver is dropped.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || poll_loop(tx, tick_rate));
        Self { rx }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

fn poll_loop(tx: mpsc::Sender<Event>, tick_rate: Duration) {
    let mut last_tick = Instant::now();
    loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).unwrap_or(false) {
            let forwarded = match event::read() {
                Ok(CEvent::Key(key)) => tx.send(Event::Key(key)),
                Ok(CEvent::Resize(..)) => tx.send(Event::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    log::error!("terminal event read failed: {}", e);
                    return;
                }
            };
            if forwarded.is_err() {
                return;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if tx.send(Event::Tick).is_err() {
                return;
            }
            last_tick = Instant::now();
        }
    }
}
