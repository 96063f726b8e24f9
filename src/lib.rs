//! # Coldwar Cardgame
//!
//! A deterministic engine for a two-superpower, card-driven strategy game,
//! exposed as a web API.
//!
//! ## Overview
//!
//! Every decision a game consumes — card choices, target countries, die
//! rolls, shuffle orders — flows through one solicitation channel and is
//! recorded in an append-only input log. The game state at any moment is a
//! pure function of the initial configuration and a prefix of that log:
//! saving is keeping the log, resuming is replaying it, and undo is
//! truncating it by one entry and replaying from scratch.
//!
//! ## Architecture
//!
//! The engine runs on a dedicated thread and suspends at each decision
//! point; the Rocket surface publishes the pending prompt and feeds answers
//! (or undo signals) back through a pipe that satisfies the same contract as
//! any live actor. OpenAPI documentation is served under `/swagger`.

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub mod action;
pub mod engine;
pub mod session;
pub mod status_messages;

use crate::engine::{reference, InputLog};
use crate::session::Session;
use std::sync::Arc;

const DEFAULT_SEED: u64 = 1962;

/// Initializes the Rocket server for a fresh or resumed game, driven by the
/// environment: `GAME_SEED` seeds the live RNG, `INPUT_LOG_FILE` names a log
/// to resume from and mirror appends into.
pub fn rocket_initialize() -> rocket::Rocket<rocket::Build> {
    let seed = std::env::var("GAME_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let log = match std::env::var("INPUT_LOG_FILE") {
        Ok(path) => {
            let path = std::path::PathBuf::from(path);
            let log = if path.exists() {
                match InputLog::load_from_file(&path) {
                    Ok(l) => l,
                    Err(e) => {
                        log::error!("could not load input log {path:?}: {e}");
                        InputLog::new()
                    }
                }
            } else {
                InputLog::new()
            };
            if let Ok(writer) = crate::action::persistence::FileWriter::new(path) {
                log.set_writer(Some(writer));
            }
            log
        }
        Err(_) => InputLog::new(),
    };

    rocket_initialize_with(seed, log)
}

/// Initializes the Rocket server with an explicit seed and input log. Tests
/// use this to get deterministic sessions without touching the environment.
pub fn rocket_initialize_with(seed: u64, log: InputLog) -> rocket::Rocket<rocket::Build> {
    use crate::action::{okapi_add_operation_for_play_, play};
    use crate::engine::{
        get_cards, get_countries, get_game, get_log, get_messages, get_prompt,
        okapi_add_operation_for_get_cards_, okapi_add_operation_for_get_countries_,
        okapi_add_operation_for_get_game_, okapi_add_operation_for_get_log_,
        okapi_add_operation_for_get_messages_, okapi_add_operation_for_get_prompt_,
    };

    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    use rocket::fairing::AdHoc;

    let refs = Arc::new(reference::standard());
    let session = Session::start(refs, seed, log);

    rocket::build()
        .mount(
            "/",
            openapi_get_routes![
                get_game,
                get_prompt,
                get_messages,
                get_log,
                get_countries,
                get_cards,
                play
            ],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
        .manage(session)
        .attach(AdHoc::on_liftoff("inputlog-shutdown", |rocket| {
            Box::pin(async move {
                // Flush the input log's file mirror when the process is told
                // to stop (SIGINT/SIGTERM or ctrl-c).
                if let Some(session) = rocket.state::<Arc<Session>>().cloned() {
                    rocket::tokio::spawn(async move {
                        #[cfg(unix)]
                        {
                            use rocket::tokio::signal::unix::{signal, SignalKind};
                            let mut sigterm = signal(SignalKind::terminate())
                                .expect("failed to set SIGTERM handler");
                            let mut sigint = signal(SignalKind::interrupt())
                                .expect("failed to set SIGINT handler");
                            rocket::tokio::select! {
                                _ = sigterm.recv() => {},
                                _ = sigint.recv() => {},
                            }
                        }
                        #[cfg(not(unix))]
                        {
                            let _ = rocket::tokio::signal::ctrl_c().await;
                        }

                        session.shutdown();
                    });
                }
            })
        }))
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}
