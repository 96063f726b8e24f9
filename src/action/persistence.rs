use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

/// Background writer mirroring the input log to a file, one answer per line,
/// in solicitation order. Appends are forwarded over a channel so the engine
/// never blocks on disk; `close()` drains and joins so a clean shutdown
/// cannot lose entries.
#[derive(Clone, Debug)]
pub struct FileWriter {
    // Shared optional sender so close() can take the sender and drop it.
    sender: Arc<Mutex<Option<Sender<String>>>>,
    // Keep a handle to the writer thread so it doesn't get dropped
    _handle: Arc<Mutex<Option<thread::JoinHandle<()>>>>,
}

impl FileWriter {
    pub fn new(path: PathBuf) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<String>();
        let sender = Arc::new(Mutex::new(Some(tx)));
        let handle = thread::spawn(move || {
            let file = OpenOptions::new().create(true).append(true).open(&path);
            let file = match file {
                Ok(f) => f,
                Err(e) => {
                    log::error!("input log FileWriter: failed to open {path:?}: {e}");
                    return;
                }
            };
            let mut writer = BufWriter::new(file);
            for line in rx {
                if let Err(e) = writeln!(writer, "{line}") {
                    log::error!("input log FileWriter: write failed: {e}");
                }
                if let Err(e) = writer.flush() {
                    log::error!("input log FileWriter: flush failed: {e}");
                }
            }
            // rx closed, flush and exit
            let _ = writer.flush();
        });

        Ok(FileWriter {
            sender,
            _handle: Arc::new(Mutex::new(Some(handle))),
        })
    }

    /// Best-effort send; ignores failures if the writer thread is gone.
    pub fn send(&self, line: &str) {
        let guard = match self.sender.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        if let Some(tx) = &*guard {
            let _ = tx.send(line.to_string());
        }
    }

    /// Drop the sender and join the writer thread so pending writes flush.
    /// Idempotent.
    pub fn close(&self) {
        {
            let mut guard = match self.sender.lock() {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
            *guard = None;
        }
        let handle_opt = {
            let mut h = match self._handle.lock() {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
            h.take()
        };
        if let Some(h) = handle_opt {
            let _ = h.join();
        }
    }
}
