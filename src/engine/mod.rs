//! Deterministic command-log engine for a two-superpower card game.
//!
//! Every decision the game ever consumes flows through the solicitation
//! channel and is recorded in the input log; replaying the log from an empty
//! cursor reconstructs the game byte for byte. Undo truncates the log and
//! re-executes from scratch.

pub mod cards;
pub mod channel;
pub mod codec;
mod endpoints;
pub mod game_state;
pub mod input_log;
pub mod map;
pub mod ops;
pub mod reference;
pub mod scoring;
pub mod selection;
pub mod turn;
pub mod types;

pub use channel::{Actor, Answer, Channel, NullPresenter, Presenter, ScriptedActor};
pub use endpoints::{
    get_cards, get_countries, get_game, get_log, get_messages, get_prompt,
    okapi_add_operation_for_get_cards_, okapi_add_operation_for_get_countries_,
    okapi_add_operation_for_get_game_, okapi_add_operation_for_get_log_,
    okapi_add_operation_for_get_messages_, okapi_add_operation_for_get_prompt_, CardZoneEntry,
    InputLogResponse, LogEntryView,
};
pub use game_state::{GameState, GameView};
pub use input_log::InputLog;

use std::fmt;

/// Fatal engine failures. Everything user-correctable (a rejected selection
/// candidate, an unknown name typed at a live prompt) stays a plain
/// `Result<_, String>` and turns into a message plus a repeated prompt; these
/// variants are the unrecoverable remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The log claimed to be in replay but had no entry left to serve.
    LogExhausted { position: usize },
    /// A replayed entry could not be decoded as the expected record shape.
    /// Live input never produces this: a malformed live answer is rejected
    /// and re-solicited, and the rejection itself is part of the log.
    MalformedLogEntry {
        position: usize,
        entry: String,
        expected: &'static str,
    },
    /// An append was attempted while the cursor was still inside the log.
    LiveInputDuringReplay { position: usize },
    /// `rewind` was called with nothing past the watermark.
    NothingToRewind,
    /// The live actor asked for an undo; the session loop catches this,
    /// truncates the log and re-runs from the start.
    RewindRequested,
    /// The live actor hung up (session over, script exhausted).
    ChannelClosed,
    /// A card routine asked for an operation its card cannot perform. This is
    /// a bug in the caller, not a user-input problem.
    WrongOperation { card: String, operation: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::LogExhausted { position } => {
                write!(f, "input log exhausted during replay at entry {position}")
            }
            EngineError::MalformedLogEntry {
                position,
                entry,
                expected,
            } => write!(
                f,
                "input log entry {position} ({entry:?}) does not decode as {expected}"
            ),
            EngineError::LiveInputDuringReplay { position } => {
                write!(f, "live input originated during replay at entry {position}")
            }
            EngineError::NothingToRewind => write!(f, "nothing past the watermark to rewind"),
            EngineError::RewindRequested => write!(f, "rewind requested by the live actor"),
            EngineError::ChannelClosed => write!(f, "live input channel closed"),
            EngineError::WrongOperation { card, operation } => {
                write!(f, "card {card} cannot resolve operation {operation}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
