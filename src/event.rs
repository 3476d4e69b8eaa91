use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
}

/// Polls the terminal on a background thread. A tick is sent whenever no
/// input arrives within `tick_rate`, which drives timeout checks and the
/// countdown redraw.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    let sent = match event::read() {
                        // Presses only; some platforms also report releases.
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            tx.send(AppEvent::Key(key))
                        }
                        Ok(Event::Resize(w, h)) => tx.send(AppEvent::Resize(w, h)),
                        _ => Ok(()),
                    };
                    if sent.is_err() {
                        return;
                    }
                } else if tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
