use either::{Either, Left, Right};
use rocket::response::status::{BadRequest, NotFound};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};
use std::sync::Arc;

pub mod persistence;

use crate::session::Session;
use crate::status_messages::{new_status, Status};

/// Player actions
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema, Hash)]
#[serde(crate = "rocket::serde", tag = "action_type")]
pub enum PlayerActions {
    /// Answer the pending solicitation.
    Answer { text: String },
    /// Rewind the single most recent answer and replay.
    Undo,
}

/// Acknowledgement for an accepted action.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ActionAck {
    pub accepted: bool,
    /// Input log length after the action was queued.
    pub log_length: usize,
}

#[openapi]
#[post("/action", format = "json", data = "<player_action>")]
pub async fn play(
    session: &State<Arc<Session>>,
    player_action: Json<PlayerActions>,
) -> Result<
    (rocket::http::Status, Json<ActionAck>),
    Either<NotFound<Json<Status>>, BadRequest<Json<Status>>>,
> {
    match player_action.0 {
        PlayerActions::Answer { text } => match session.answer(&text) {
            Ok(()) => Ok((
                rocket::http::Status::Accepted,
                Json(ActionAck {
                    accepted: true,
                    log_length: session.log.len(),
                }),
            )),
            Err(e) if e.starts_with("no pending") => Err(Left(NotFound(new_status(e)))),
            Err(e) => Err(Right(BadRequest(new_status(e)))),
        },
        PlayerActions::Undo => match session.undo() {
            Ok(()) => Ok((
                rocket::http::Status::Accepted,
                Json(ActionAck {
                    accepted: true,
                    log_length: session.log.len(),
                }),
            )),
            Err(e) => Err(Right(BadRequest(new_status(e)))),
        },
    }
}
