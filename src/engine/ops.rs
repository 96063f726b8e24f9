//! The operations resolver: coup, realignment, and influence placement cost,
//! as pure computations over fully-resolved inputs, plus the generic
//! "conduct operations" dispatcher that solicits targets and loops the
//! resolver over them.

use super::channel::Channel;
use super::game_state::GameState;
use super::selection::{self, Predicate};
use super::types::{ByFaction, CountryId, Effect, Faction};
use super::EngineResult;

/// Result of one coup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoupOutcome {
    pub delta: i32,
    pub removed: u32,
    pub gained: u32,
    pub defcon_degraded: bool,
}

/// Result of one realignment roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealignOutcome {
    pub totals: ByFaction<u32>,
    pub loser: Option<Faction>,
    pub removed: u32,
}

/// Coup eligibility. `free` coups (granted by events) ignore the tension
/// restriction but never the zero-influence or protection rules.
pub fn can_coup(
    state: &GameState,
    attacker: Faction,
    target: CountryId,
    free: bool,
) -> Result<(), String> {
    let country = state.country(target);
    let defender = attacker.opponent();
    if country.influence(defender) == 0 {
        return Err(format!("no {defender} influence in {} to coup", country.name));
    }
    if let Some(owner) = state.effect_owner(Effect::RegionPact {
        region: country.region,
    }) {
        if owner == defender && country.controlled_by(owner) {
            return Err(format!("{} is protected by a standing pact", country.name));
        }
    }
    if !free && country.region.volatility() >= state.defcon {
        return Err(format!(
            "tension too high to coup in {} (DEFCON {})",
            country.region, state.defcon
        ));
    }
    Ok(())
}

/// Realignment eligibility mirrors coup eligibility minus the stability-based
/// threshold.
pub fn can_realign(
    state: &GameState,
    attacker: Faction,
    target: CountryId,
    free: bool,
) -> Result<(), String> {
    can_coup(state, attacker, target, free)
}

/// Resolve a coup attempt: `delta = roll + bonus + ops − 2×stability`. A
/// non-positive delta fails without touching the map; otherwise influence is
/// removed from the defender up to the delta and any remainder becomes the
/// attacker's. A battleground target degrades DEFCON (unless the attacker
/// has the shielding effect in play); a non-free attempt feeds the attacker's
/// military-operations track regardless of success.
pub fn coup(
    state: &mut GameState,
    attacker: Faction,
    target: CountryId,
    ops: u32,
    roll: u32,
    bonus: i32,
    free: bool,
) -> CoupOutcome {
    let defender = attacker.opponent();
    let (stability, battleground) = {
        let c = state.country(target);
        (c.stability, c.battleground)
    };
    let delta = roll as i32 + bonus + ops as i32 - 2 * stability as i32;

    let (removed, gained) = if delta > 0 {
        let country = state.country_mut(target);
        let removed = country
            .remove_influence(defender, delta as u32)
            .unwrap_or(0);
        let gained = delta as u32 - removed;
        country.add_influence(attacker, gained);
        (removed, gained)
    } else {
        (0, 0)
    };

    let defcon_degraded =
        battleground && !state.effect_active_for(Effect::DefconShield, attacker);
    if defcon_degraded {
        state.degrade_defcon();
    }
    if !free {
        *state.milops.get_mut(attacker) += ops;
    }

    CoupOutcome {
        delta,
        removed,
        gained,
        defcon_degraded,
    }
}

/// Per-side realignment modifiers: +1 to whichever faction already leads in
/// the target, and +1 per adjacent country controlled by either side,
/// credited to that side. Computed once from the current map.
pub fn realign_modifiers(state: &GameState, target: CountryId) -> ByFaction<u32> {
    let country = state.country(target);
    let mut mods = ByFaction::default();
    for f in Faction::all() {
        if country.influence(f) > country.influence(f.opponent()) {
            *mods.get_mut(f) += 1;
        }
    }
    for neighbor in &country.adjacency {
        if let Some(controller) = state.country(*neighbor).controller() {
            *mods.get_mut(controller) += 1;
        }
    }
    mods
}

/// Resolve one realignment: each side's die plus its modifiers; the higher
/// total removes the margin from the loser, capped at what is present; a tie
/// changes nothing.
pub fn realign(state: &mut GameState, target: CountryId, rolls: ByFaction<u32>) -> RealignOutcome {
    let mods = realign_modifiers(state, target);
    let totals = ByFaction {
        usa: rolls.usa + mods.usa,
        ussr: rolls.ussr + mods.ussr,
    };
    let (loser, margin) = if totals.usa > totals.ussr {
        (Some(Faction::Ussr), totals.usa - totals.ussr)
    } else if totals.ussr > totals.usa {
        (Some(Faction::Usa), totals.ussr - totals.usa)
    } else {
        (None, 0)
    };
    let removed = match loser {
        Some(f) => state
            .country_mut(target)
            .remove_influence(f, margin)
            .unwrap_or(0),
        None => 0,
    };
    RealignOutcome {
        totals,
        loser,
        removed,
    }
}

/// Placing one influence point into an opponent-controlled country costs 2
/// budget units; anywhere else costs 1. Control is re-derived per point, so
/// flipping a country mid-operation cheapens the rest.
pub fn influence_cost(state: &GameState, f: Faction, target: CountryId) -> u32 {
    if state.country(target).controlled_by(f.opponent()) {
        2
    } else {
        1
    }
}

/// Influence may only be placed where the faction already reaches: a country
/// bordering its superpower, one it holds influence in, or one adjacent to
/// its influence.
pub fn can_place_influence(state: &GameState, f: Faction, target: CountryId) -> Result<(), String> {
    let country = state.country(target);
    if country.superpower == Some(f) || country.influence(f) > 0 {
        return Ok(());
    }
    let reachable = country
        .adjacency
        .iter()
        .any(|n| state.country(*n).influence(f) > 0);
    if reachable {
        Ok(())
    } else {
        Err(format!("{} is out of reach for {f}", country.name))
    }
}

fn parse_country(state: &GameState, text: &str) -> Result<CountryId, String> {
    state.refs.country_id(text)
}

/// The generic "conduct operations" dispatcher: solicit a choice of
/// operation, then gather targets (one selection per acquisition) and apply
/// the resolver (one call per application) until the ops budget is spent.
pub fn conduct_operations(
    chan: &mut Channel,
    state: &mut GameState,
    actor: Faction,
    ops: u32,
) -> EngineResult<()> {
    let kinds = [
        "influence".to_string(),
        "coup".to_string(),
        "realign".to_string(),
    ];
    loop {
        let answer = chan.solicit(
            actor,
            &format!("conduct operations ({ops} ops): choose an operation"),
            &kinds,
        )?;
        match answer.text.to_ascii_lowercase().as_str() {
            "influence" => {
                place_influence(chan, state, actor, ops)?;
                return Ok(());
            }
            "coup" => {
                if coup_operation(chan, state, actor, ops)? {
                    return Ok(());
                }
                // target selection was abandoned; choose again
            }
            "realign" => {
                realign_operation(chan, state, actor, ops)?;
                return Ok(());
            }
            other => chan.message(actor, &format!("unknown operation {other:?}")),
        }
    }
}

/// Spend the full ops budget placing influence, one point per pick.
pub fn place_influence(
    chan: &mut Channel,
    state: &mut GameState,
    actor: Faction,
    ops: u32,
) -> EngineResult<()> {
    let reachable: Predicate<'_, CountryId> =
        &|s, id, _picks| can_place_influence(s, actor, *id);
    selection::select(
        chan,
        state,
        actor,
        "place influence: country",
        ops,
        true,
        &[],
        parse_country,
        |s, id| influence_cost(s, actor, *id),
        &[reachable],
        |s, id| {
            s.country_mut(*id).add_influence(actor, 1);
            Ok(())
        },
    )?;
    Ok(())
}

fn coup_operation(
    chan: &mut Channel,
    state: &mut GameState,
    actor: Faction,
    ops: u32,
) -> EngineResult<bool> {
    let eligible: Predicate<'_, CountryId> = &|s, id, _picks| can_coup(s, actor, *id, false);
    let target = selection::choose_one(
        chan,
        state,
        actor,
        "coup: target country",
        &[],
        parse_country,
        &[eligible],
    )?;
    let Some(target) = target else {
        return Ok(false);
    };
    let roll = chan.roll_die(actor, "coup roll")?;
    let outcome = coup(state, actor, target, ops, roll, 0, false);
    let name = &state.country(target).name;
    if outcome.delta > 0 {
        chan.message(
            actor,
            &format!(
                "coup in {name}: removed {}, gained {}",
                outcome.removed, outcome.gained
            ),
        );
    } else {
        chan.message(actor, &format!("coup in {name} failed"));
    }
    Ok(true)
}

fn realign_operation(
    chan: &mut Channel,
    state: &mut GameState,
    actor: Faction,
    ops: u32,
) -> EngineResult<()> {
    let eligible: Predicate<'_, CountryId> = &|s, id, _picks| can_realign(s, actor, *id, false);
    for _ in 0..ops {
        let target = selection::choose_one(
            chan,
            state,
            actor,
            "realignment: target country",
            &[],
            parse_country,
            &[eligible],
        )?;
        let Some(target) = target else {
            return Ok(());
        };
        let rolls = ByFaction {
            usa: chan.roll_die(Faction::Usa, "realignment roll")?,
            ussr: chan.roll_die(Faction::Ussr, "realignment roll")?,
        };
        let outcome = realign(state, target, rolls);
        let name = &state.country(target).name;
        match outcome.loser {
            Some(loser) => chan.message(
                actor,
                &format!("realignment in {name}: {loser} loses {}", outcome.removed),
            ),
            None => chan.message(actor, &format!("realignment in {name}: stand-off")),
        }
    }
    Ok(())
}
