//! Panel simulator over stdin/stdout.
//!
//! Runs the interpreter with a logging keyboard so the wire protocol can be
//! exercised by hand or through a pty. A line `#press <n>[/<n>...]` presses
//! buttons for one tick instead of being sent to the interpreter.
//!
//! Environment: `NOTIFIER_PROTOCOL` (`v1`/`v2`), `NOTIFIER_BUTTON_COUNT`.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use notifier_device::{keyboard_report, run, DeviceIo, Interpreter};
use notifier_domain::constants::{DEFAULT_BUTTON_COUNT, DEVICE_TICK_PERIOD};
use notifier_domain::{Button, Colour, Keycode, ProtocolVersion};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const PRESS_PREFIX: &str = "#press ";

struct StdioPanel {
    lines: Receiver<String>,
    pending_presses: Vec<Button>,
    closed: Arc<AtomicBool>,
}

impl StdioPanel {
    fn spawn(closed: Arc<AtomicBool>) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        Self { lines: rx, pending_presses: Vec::new(), closed }
    }
}

impl DeviceIo for StdioPanel {
    fn poll_line(&mut self) -> Option<String> {
        loop {
            match self.lines.try_recv() {
                Ok(line) => match line.trim().strip_prefix(PRESS_PREFIX) {
                    Some(buttons) => {
                        self.pending_presses
                            .extend(buttons.split('/').filter_map(|b| b.trim().parse::<Button>().ok()));
                    }
                    None => return Some(line),
                },
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.closed.store(true, Ordering::SeqCst);
                    return None;
                }
            }
        }
    }

    fn write_line(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{line}").and_then(|()| stdout.flush()) {
            warn!(error = %err, "Failed to write to stdout");
        }
    }

    fn pressed_buttons(&mut self) -> Vec<Button> {
        std::mem::take(&mut self.pending_presses)
    }

    fn press_keys(&mut self, keys: &[Keycode]) {
        let names: Vec<&str> = keys.iter().map(Keycode::name).collect();
        let report = keyboard_report(keys);
        info!(keys = %names.join("+"), report = ?report, "Key press");
    }

    fn write_text(&mut self, text: &str) {
        info!(%text, "Type text");
    }

    fn delay(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn show_leds(&mut self, leds: &[Colour]) {
        let lit: Vec<String> = leds
            .iter()
            .enumerate()
            .filter(|(_, colour)| !colour.is_off())
            .map(|(button, c)| format!("{button}=({},{},{})", c.r, c.g, c.b))
            .collect();
        debug!(lit = %lit.join(" "), "LEDs");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let version = match std::env::var("NOTIFIER_PROTOCOL") {
        Ok(value) => value.parse::<ProtocolVersion>().map_err(anyhow::Error::msg)?,
        Err(_) => ProtocolVersion::default(),
    };
    let button_count = match std::env::var("NOTIFIER_BUTTON_COUNT") {
        Ok(value) => value.parse::<usize>().context("NOTIFIER_BUTTON_COUNT must be a number")?,
        Err(_) => DEFAULT_BUTTON_COUNT,
    };

    info!(%version, button_count, "Starting panel simulator");

    let closed = Arc::new(AtomicBool::new(false));
    let mut panel = StdioPanel::spawn(Arc::clone(&closed));
    let mut interpreter = Interpreter::new(button_count, version);

    run(&mut interpreter, &mut panel, DEVICE_TICK_PERIOD, || !closed.load(Ordering::SeqCst));

    Ok(())
}
