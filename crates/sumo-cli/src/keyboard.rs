//! Host keyboard channel – feeds stdin to the controller one byte per tick.
//!
//! The terminal stays in line mode: type `w`, `a`, `s`, `d`, space or `x`
//! and press Enter.  A background thread does the blocking reads; the
//! controller only ever polls the channel.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use sumo_hal::ConsoleInput;
use tracing::debug;

/// [`ConsoleInput`] backed by a channel of characters.
pub struct StdinKeys {
    rx: Receiver<char>,
}

impl StdinKeys {
    /// Start the stdin reader thread.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                for c in line.chars().filter(|c| *c != '\r') {
                    if tx.send(c).is_err() {
                        return;
                    }
                }
            }
            debug!("stdin closed");
        });
        Self::from_receiver(rx)
    }

    pub(crate) fn from_receiver(rx: Receiver<char>) -> Self {
        Self { rx }
    }
}

impl ConsoleInput for StdinKeys {
    fn poll(&mut self) -> Option<char> {
        match self.rx.try_recv() {
            Ok(c) => Some(c),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}
