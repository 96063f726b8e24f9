use super::game_state::GameView;
use super::map::CountryView;
use crate::session::{MessageView, PendingPrompt, Session};
use crate::status_messages::{new_status, Status};
use rocket::response::status::NotFound;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::{openapi, JsonSchema};
use std::sync::Arc;

/// Current game snapshot, as last published by the engine.
#[openapi]
#[get("/game")]
pub async fn get_game(
    session: &rocket::State<Arc<Session>>,
) -> Result<Json<GameView>, NotFound<Json<Status>>> {
    match session.fatal() {
        Some(e) => Err(NotFound(new_status(format!("session failed: {e}")))),
        None => session
            .view()
            .map(Json)
            .ok_or_else(|| NotFound(new_status("game not started yet".to_string()))),
    }
}

/// The solicitation currently waiting for an answer, if any.
#[openapi]
#[get("/game/prompt")]
pub async fn get_prompt(session: &rocket::State<Arc<Session>>) -> Json<Option<PendingPrompt>> {
    Json(session.prompt())
}

/// Messages emitted to the live audience, oldest first.
#[openapi]
#[get("/game/messages")]
pub async fn get_messages(session: &rocket::State<Arc<Session>>) -> Json<Vec<MessageView>> {
    Json(session.messages())
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct LogEntryView {
    pub position: usize,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct InputLogResponse {
    pub entries: Vec<LogEntryView>,
    pub next_position: Option<usize>,
    pub limit: usize,
}

/// Input log entries with paging: every answer ever consumed, in order.
#[openapi]
#[get("/game/log?<from>&<limit>")]
pub async fn get_log(
    from: Option<usize>,
    limit: Option<usize>,
    session: &rocket::State<Arc<Session>>,
) -> Json<InputLogResponse> {
    let start = from.unwrap_or(0);
    let max = limit.unwrap_or(1000);
    let all = session.log.entries();
    let entries: Vec<LogEntryView> = all
        .iter()
        .enumerate()
        .skip(start)
        .take(max)
        .map(|(position, answer)| LogEntryView {
            position,
            answer: answer.clone(),
        })
        .collect();
    let next_position = match entries.last() {
        Some(last) if last.position + 1 < all.len() => Some(last.position + 1),
        _ => None,
    };
    Json(InputLogResponse {
        entries,
        next_position,
        limit: max,
    })
}

/// Countries with live influence and derived control.
#[openapi]
#[get("/game/countries")]
pub async fn get_countries(
    session: &rocket::State<Arc<Session>>,
) -> Result<Json<Vec<CountryView>>, NotFound<Json<Status>>> {
    session
        .view()
        .map(|v| Json(v.countries))
        .ok_or_else(|| NotFound(new_status("game not started yet".to_string())))
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CardZoneEntry {
    pub name: String,
    pub zone: String,
}

/// Visible cards by zone. Optionally filter by ?zone= (HandUsa, HandUssr,
/// Discard, Removed). The draw pile stays hidden; only its count shows in
/// the game view.
#[openapi]
#[get("/game/cards?<zone>")]
pub async fn get_cards(
    zone: Option<String>,
    session: &rocket::State<Arc<Session>>,
) -> Result<Json<Vec<CardZoneEntry>>, NotFound<Json<Status>>> {
    let view = session
        .view()
        .ok_or_else(|| NotFound(new_status("game not started yet".to_string())))?;
    let mut entries = Vec::new();
    let mut push_all = |names: &[String], zone_name: &str| {
        for name in names {
            entries.push(CardZoneEntry {
                name: name.clone(),
                zone: zone_name.to_string(),
            });
        }
    };
    push_all(&view.hands.usa, "HandUsa");
    push_all(&view.hands.ussr, "HandUssr");
    push_all(&view.discard, "Discard");
    push_all(&view.removed, "Removed");
    if let Some(filter) = zone {
        entries.retain(|e| e.zone.eq_ignore_ascii_case(&filter));
    }
    Ok(Json(entries))
}
