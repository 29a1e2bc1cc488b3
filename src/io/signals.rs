//! Signal handling for the running clock.
//!
//! - SIGUSR1: manual refresh (sent by `sunset-clock refresh`)
//! - SIGINT, SIGTERM, SIGHUP: shutdown
//!
//! A background thread turns signals into [`SignalMessage`]s on a channel
//! that the main loop waits on between ticks.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, Sender},
    thread,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    /// Re-resolve today's sunset, bypassing the cache (SIGUSR1)
    Refresh,
    /// Shutdown signal (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared once a shutdown signal arrives
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Kept so the channel stays open and tests can inject messages
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Register handlers and spawn the signal thread.
pub fn setup_signal_handler() -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = std::sync::mpsc::channel::<SignalMessage>();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();
    let sender_clone = signal_sender.clone();

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let message = match sig {
                    SIGUSR1 => {
                        log_pipe!();
                        log_info!("Received refresh signal");
                        SignalMessage::Refresh
                    }
                    SIGINT | SIGTERM | SIGHUP => {
                        log_pipe!();
                        log_info!("Received shutdown signal ({})", signal_name(sig));
                        running_clone.store(false, Ordering::SeqCst);
                        SignalMessage::Shutdown
                    }
                    _ => continue,
                };

                let shutdown = message == SignalMessage::Shutdown;
                if sender_clone.send(message).is_err() || shutdown {
                    break;
                }
            }
        })
        .context("failed to spawn signal thread")?;

    Ok(SignalState {
        running,
        signal_receiver,
        signal_sender,
    })
}

fn signal_name(sig: i32) -> &'static str {
    match sig {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        SIGUSR1 => "SIGUSR1",
        _ => "unknown",
    }
}
