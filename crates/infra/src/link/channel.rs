//! Line-oriented duplex channels

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// A duplex byte stream read one line at a time.
pub trait SerialChannel: Send {
    /// Next line without its terminator, or `None` when the short read
    /// timeout elapsed before a full line arrived.
    ///
    /// # Errors
    /// Any I/O failure other than the read timeout, including a closed stream.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

type Responder = Box<dyn FnMut(&str) -> Vec<String> + Send>;

struct LoopbackState {
    inbound: VecDeque<String>,
    written: Vec<String>,
    partial: String,
    responder: Option<Responder>,
    closed: bool,
}

/// In-memory channel. Every complete line written is recorded and, when a
/// responder is installed, answered with the lines it returns.
///
/// Clones share state so a test can keep a handle for inspection.
#[derive(Clone)]
pub struct LoopbackChannel {
    state: Arc<Mutex<LoopbackState>>,
    idle_read: Duration,
}

impl LoopbackChannel {
    /// A channel with nothing to read.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LoopbackState {
                inbound: VecDeque::new(),
                written: Vec::new(),
                partial: String::new(),
                responder: None,
                closed: false,
            })),
            idle_read: Duration::from_millis(1),
        }
    }

    /// A channel answering each written line with `responder(line)`.
    pub fn with_responder(responder: impl FnMut(&str) -> Vec<String> + Send + 'static) -> Self {
        let channel = Self::new();
        channel.state.lock().responder = Some(Box::new(responder));
        channel
    }

    /// Queue a line for the reader.
    pub fn push_line(&self, line: impl Into<String>) {
        self.state.lock().inbound.push_back(line.into());
    }

    /// Complete lines written so far, terminators stripped.
    pub fn written(&self) -> Vec<String> {
        self.state.lock().written.clone()
    }

    /// Make every further read fail as if the device disconnected.
    pub fn close(&self) {
        self.state.lock().closed = true;
    }
}

impl Default for LoopbackChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialChannel for LoopbackChannel {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let line = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
            }
            state.inbound.pop_front()
        };
        if line.is_none() {
            std::thread::sleep(self.idle_read);
        }
        Ok(line)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        state.partial.push_str(&String::from_utf8_lossy(bytes));

        while let Some(end) = state.partial.find(['\r', '\n']) {
            let line: String = state.partial.drain(..=end).collect();
            let line = line.trim_end_matches(['\r', '\n']).to_string();
            if line.is_empty() {
                continue;
            }
            let replies = match state.responder.as_mut() {
                Some(responder) => responder(&line),
                None => Vec::new(),
            };
            state.written.push(line);
            state.inbound.extend(replies);
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
