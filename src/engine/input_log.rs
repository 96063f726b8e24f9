//! The input log: ordered, append-only record of every answer the engine has
//! ever consumed. The game state at any point is a pure function of the
//! initial configuration and a prefix of this log, which makes save/resume
//! and undo the same mechanism — replay from an empty cursor.

use super::{EngineError, EngineResult};
use crate::action::persistence::FileWriter;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct LogInner {
    entries: Vec<String>,
    /// Next entry to replay. `cursor < entries.len()` means replay mode.
    cursor: usize,
    /// Entries up to here are committed and undo-proof.
    watermark: usize,
    writer: Option<FileWriter>,
}

/// Shared handle to one game's input log. The engine thread is the only
/// writer; the HTTP surface reads snapshots through its own clone.
#[derive(Debug, Clone, Default)]
pub struct InputLog {
    inner: Arc<Mutex<LogInner>>,
}

impl InputLog {
    pub fn new() -> Self {
        InputLog::default()
    }

    pub fn from_entries(entries: Vec<String>) -> Self {
        InputLog {
            inner: Arc::new(Mutex::new(LogInner {
                entries,
                ..LogInner::default()
            })),
        }
    }

    /// Load a saved log for resume: every line is one answer, cursor at zero,
    /// so the whole game replays from the start. A trailing empty line is
    /// not an entry.
    pub fn load_from_file(path: &Path) -> Result<InputLog, String> {
        let file = File::open(path).map_err(|e| e.to_string())?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|e| e.to_string())?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(line);
        }
        Ok(InputLog::from_entries(entries))
    }

    pub fn set_writer(&self, writer: Option<FileWriter>) {
        self.lock().writer = writer;
    }

    fn lock(&self) -> MutexGuard<'_, LogInner> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    /// Append a live answer and advance the cursor past it. Appending while
    /// the cursor is still inside the log would interleave live input with
    /// history, an unrecoverable consistency failure.
    pub fn append(&self, answer: &str) -> EngineResult<()> {
        let mut inner = self.lock();
        if inner.cursor < inner.entries.len() {
            return Err(EngineError::LiveInputDuringReplay {
                position: inner.cursor,
            });
        }
        if let Some(w) = &inner.writer {
            w.send(answer);
        }
        inner.entries.push(answer.to_string());
        inner.cursor = inner.entries.len();
        Ok(())
    }

    /// The buffered entry at the cursor, advancing past it, or `None` when
    /// the log is exhausted and the caller must solicit live input.
    pub fn next(&self) -> Option<String> {
        let mut inner = self.lock();
        if inner.cursor < inner.entries.len() {
            let entry = inner.entries[inner.cursor].clone();
            inner.cursor += 1;
            Some(entry)
        } else {
            None
        }
    }

    /// Governing predicate for the whole engine: while true, live-audience
    /// messages are suppressed and originating new live input is an error.
    pub fn in_replay(&self) -> bool {
        let inner = self.lock();
        inner.cursor < inner.entries.len()
    }

    /// Mark the current cursor as an undo boundary.
    pub fn commit(&self) {
        let mut inner = self.lock();
        inner.watermark = inner.cursor;
    }

    pub fn can_rewind(&self) -> bool {
        let inner = self.lock();
        inner.entries.len() > inner.watermark
    }

    /// Discard the single most recent entry and reset the cursor to zero so
    /// the engine re-executes from the start: everything before the removed
    /// entry replays identically, then play resumes at the first live
    /// solicitation.
    pub fn rewind(&self) -> EngineResult<()> {
        let mut inner = self.lock();
        if inner.entries.len() <= inner.watermark {
            return Err(EngineError::NothingToRewind);
        }
        inner.entries.pop();
        inner.cursor = 0;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cursor position (index of the next entry to replay).
    pub fn position(&self) -> usize {
        self.lock().cursor
    }

    pub fn watermark(&self) -> usize {
        self.lock().watermark
    }

    /// Cloned snapshot of all entries, for inspection and the log endpoint.
    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    pub fn shutdown(&self) {
        let inner = self.lock();
        if let Some(w) = &inner.writer {
            w.close();
        }
    }
}
