//! One hosted game: the engine runs on its own thread, suspended at each
//! solicitation, and the HTTP surface feeds it answers through a pipe that
//! satisfies the same solicit/message contract as any live actor. Undo sends
//! a rewind signal; the engine unwinds, the log is truncated by one entry,
//! and a fresh state is replayed from the start.

use crate::engine::game_state::GameState;
use crate::engine::reference::RefData;
use crate::engine::types::Faction;
use crate::engine::{turn, Actor, Channel, EngineError, EngineResult, GameView, InputLog, Presenter};
use rand::SeedableRng;
use rand_pcg::Lcg64Xsh32;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

const MESSAGE_BACKLOG: usize = 200;

/// The solicitation currently waiting for a live answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PendingPrompt {
    pub actor: Faction,
    pub prompt: String,
    pub hints: Vec<String>,
    /// Input log position this answer will occupy.
    pub position: usize,
}

/// One informational message for the live audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct MessageView {
    pub to: Faction,
    pub text: String,
}

enum Reply {
    Answer(String),
    Rewind,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(e) => e.into_inner(),
    }
}

/// State shared between the engine thread and the endpoints.
#[derive(Default)]
pub struct SessionShared {
    view: Mutex<Option<GameView>>,
    prompt: Mutex<Option<PendingPrompt>>,
    messages: Mutex<Vec<MessageView>>,
    fatal: Mutex<Option<String>>,
}

/// Live actor backed by the reply pipe: publishes the prompt, blocks until
/// an answer (or a rewind) arrives.
struct PipeActor {
    shared: Arc<SessionShared>,
    rx: Receiver<Reply>,
    log: InputLog,
}

impl Actor for PipeActor {
    fn solicit(&mut self, actor: Faction, prompt: &str, hints: &[String]) -> EngineResult<String> {
        *lock(&self.shared.prompt) = Some(PendingPrompt {
            actor,
            prompt: prompt.to_string(),
            hints: hints.to_vec(),
            position: self.log.len(),
        });
        match self.rx.recv() {
            Ok(Reply::Answer(text)) => {
                *lock(&self.shared.prompt) = None;
                Ok(text)
            }
            Ok(Reply::Rewind) => {
                *lock(&self.shared.prompt) = None;
                Err(EngineError::RewindRequested)
            }
            Err(_) => Err(EngineError::ChannelClosed),
        }
    }

    fn message(&mut self, actor: Faction, text: &str) {
        let mut messages = lock(&self.shared.messages);
        messages.push(MessageView {
            to: actor,
            text: text.to_string(),
        });
        if messages.len() > MESSAGE_BACKLOG {
            let excess = messages.len() - MESSAGE_BACKLOG;
            messages.drain(..excess);
        }
    }
}

struct SharedPresenter {
    shared: Arc<SessionShared>,
}

impl Presenter for SharedPresenter {
    fn redraw(&self, view: &GameView) {
        *lock(&self.shared.view) = Some(view.clone());
    }
}

/// Handle to a hosted game, managed by Rocket.
pub struct Session {
    pub shared: Arc<SessionShared>,
    pub log: InputLog,
    tx: Sender<Reply>,
    _handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Session {
    pub fn start(refs: Arc<RefData>, seed: u64, log: InputLog) -> Arc<Session> {
        let shared = Arc::new(SessionShared::default());
        let (tx, rx) = mpsc::channel::<Reply>();
        let pipe = PipeActor {
            shared: shared.clone(),
            rx,
            log: log.clone(),
        };
        let presenter = SharedPresenter {
            shared: shared.clone(),
        };
        let thread_shared = shared.clone();
        let thread_log = log.clone();
        let handle = thread::spawn(move || {
            run_session(refs, seed, thread_log, pipe, presenter, thread_shared);
        });
        Arc::new(Session {
            shared,
            log,
            tx,
            _handle: Mutex::new(Some(handle)),
        })
    }

    /// Feed the pending solicitation a live answer.
    pub fn answer(&self, text: &str) -> Result<(), String> {
        let mut prompt = lock(&self.shared.prompt);
        if prompt.is_none() {
            return Err("no pending solicitation".to_string());
        }
        self.tx
            .send(Reply::Answer(text.to_string()))
            .map_err(|_| "the game session has ended".to_string())?;
        *prompt = None;
        Ok(())
    }

    /// Undo one answer: rewind the log by a single entry and replay.
    pub fn undo(&self) -> Result<(), String> {
        if !self.log.can_rewind() {
            return Err("nothing past the last commit to undo".to_string());
        }
        self.tx
            .send(Reply::Rewind)
            .map_err(|_| "the game session has ended".to_string())?;
        *lock(&self.shared.prompt) = None;
        Ok(())
    }

    pub fn view(&self) -> Option<GameView> {
        lock(&self.shared.view).clone()
    }

    pub fn prompt(&self) -> Option<PendingPrompt> {
        lock(&self.shared.prompt).clone()
    }

    pub fn messages(&self) -> Vec<MessageView> {
        lock(&self.shared.messages).clone()
    }

    pub fn fatal(&self) -> Option<String> {
        lock(&self.shared.fatal).clone()
    }

    /// Flush the log's file mirror on shutdown.
    pub fn shutdown(&self) {
        self.log.shutdown();
    }
}

fn run_session(
    refs: Arc<RefData>,
    seed: u64,
    log: InputLog,
    pipe: PipeActor,
    presenter: SharedPresenter,
    shared: Arc<SessionShared>,
) {
    let rng = Lcg64Xsh32::seed_from_u64(seed);
    let mut chan = Channel::new(log.clone(), Box::new(pipe), rng);
    loop {
        let mut state = GameState::new(refs.clone());
        match turn::run_game(&mut state, &mut chan, &presenter) {
            Ok(outcome) => {
                log::info!("game over: {outcome:?}");
                break;
            }
            Err(EngineError::RewindRequested) => match log.rewind() {
                Ok(()) => {
                    log::info!("rewound to {} entries, replaying", log.len());
                    continue;
                }
                Err(e) => {
                    log::error!("rewind refused: {e}");
                    *lock(&shared.fatal) = Some(e.to_string());
                    break;
                }
            },
            Err(EngineError::ChannelClosed) => {
                log::info!("live channel closed, session ends");
                break;
            }
            Err(e) => {
                log::error!("fatal engine error: {e}");
                *lock(&shared.fatal) = Some(e.to_string());
                break;
            }
        }
    }
}
