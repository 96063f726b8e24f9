//! The constrained-selection primitive: gather picks from one actor under a
//! numeric budget and a list of composable admissibility predicates, applying
//! an effect per accepted pick. One invocation corresponds to one semantic
//! "place/remove/choose N things" card clause; multi-clause cards compose
//! sequential invocations.
//!
//! A candidate either fully passes parsing, cost, every predicate, and the
//! mutation — or the state is untouched for that candidate and the actor is
//! re-prompted. Rejected answers stay in the log and replay identically.

use super::channel::Channel;
use super::game_state::GameState;
use super::types::Faction;
use super::EngineResult;

/// Sentinel answer ending a selection early.
pub const DONE: &str = "done";

/// Admissibility predicate: pure in the state, the candidate, and the picks
/// accepted so far in this invocation (which carry per-operation accounting
/// such as "at most 2 per country").
pub type Predicate<'a, T> = &'a dyn Fn(&GameState, &T, &[T]) -> Result<(), String>;

#[allow(clippy::too_many_arguments)]
pub fn select<T, PF, CF, MF>(
    chan: &mut Channel,
    state: &mut GameState,
    actor: Faction,
    prompt: &str,
    budget: u32,
    exactly: bool,
    hints: &[String],
    parse: PF,
    cost: CF,
    predicates: &[Predicate<'_, T>],
    mut apply: MF,
) -> EngineResult<Vec<T>>
where
    T: Clone,
    PF: Fn(&GameState, &str) -> Result<T, String>,
    CF: Fn(&GameState, &T) -> u32,
    MF: FnMut(&mut GameState, &T) -> Result<(), String>,
{
    let mut picks: Vec<T> = Vec::new();
    let mut used: u32 = 0;

    // A zero budget is satisfied immediately; nothing to solicit.
    if budget == 0 {
        return Ok(picks);
    }

    loop {
        let line = format!("{prompt} [{used}/{budget}, '{DONE}' ends]");
        let answer = chan.solicit(actor, &line, hints)?;
        let text = answer.text.trim();

        if text.eq_ignore_ascii_case(DONE) {
            if exactly && used < budget {
                chan.message(
                    actor,
                    &format!("the full budget must be used ({used} of {budget} so far)"),
                );
                continue;
            }
            return Ok(picks);
        }

        let candidate = match parse(state, text) {
            Ok(c) => c,
            Err(e) => {
                chan.message(actor, &e);
                continue;
            }
        };

        let c = cost(state, &candidate);
        if used + c > budget {
            chan.message(
                actor,
                &format!("that choice costs {c}, only {} left", budget - used),
            );
            continue;
        }

        if let Some(err) = predicates
            .iter()
            .find_map(|p| p(state, &candidate, &picks).err())
        {
            chan.message(actor, &err);
            continue;
        }

        if let Err(e) = apply(state, &candidate) {
            chan.message(actor, &e);
            continue;
        }

        used += c;
        picks.push(candidate);
        if used == budget {
            return Ok(picks);
        }
    }
}

/// Select at most one candidate, applying no mutation; `None` if the actor
/// ends the selection instead. Used for target acquisition where resolution
/// happens separately.
pub fn choose_one<T, PF>(
    chan: &mut Channel,
    state: &mut GameState,
    actor: Faction,
    prompt: &str,
    hints: &[String],
    parse: PF,
    predicates: &[Predicate<'_, T>],
) -> EngineResult<Option<T>>
where
    T: Clone,
    PF: Fn(&GameState, &str) -> Result<T, String>,
{
    let picks = select(
        chan,
        state,
        actor,
        prompt,
        1,
        false,
        hints,
        parse,
        |_, _| 1,
        predicates,
        |_, _| Ok(()),
    )?;
    Ok(picks.into_iter().next())
}
