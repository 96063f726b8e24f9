//! Region scoring tiers and the space-race track: stateless, derived
//! computations over the country map and the track positions.

use super::game_state::GameState;
use super::types::{ByFaction, Faction, Region};

/// VP values for the three scoring tiers of one region.
#[derive(Debug, Clone, Copy)]
pub struct RegionValues {
    pub presence: u32,
    pub domination: u32,
    pub control: u32,
}

pub fn region_values(region: Region) -> RegionValues {
    match region {
        Region::Europe => RegionValues {
            presence: 3,
            domination: 7,
            control: 20,
        },
        Region::Asia => RegionValues {
            presence: 3,
            domination: 7,
            control: 9,
        },
        Region::MiddleEast => RegionValues {
            presence: 3,
            domination: 5,
            control: 7,
        },
        Region::Africa => RegionValues {
            presence: 1,
            domination: 4,
            control: 6,
        },
        Region::CentralAmerica => RegionValues {
            presence: 1,
            domination: 3,
            control: 5,
        },
        Region::SouthAmerica => RegionValues {
            presence: 2,
            domination: 5,
            control: 6,
        },
    }
}

/// Ordered scoring tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    None,
    Presence,
    Domination,
    Control,
}

#[derive(Debug, Clone, Copy, Default)]
struct RegionCount {
    countries: u32,
    battlegrounds: u32,
    non_battlegrounds: u32,
}

fn count(state: &GameState, region: Region, f: Faction) -> RegionCount {
    let mut n = RegionCount::default();
    for c in state.map.iter().filter(|c| c.region == region) {
        if c.controlled_by(f) {
            n.countries += 1;
            if c.battleground {
                n.battlegrounds += 1;
            } else {
                n.non_battlegrounds += 1;
            }
        }
    }
    n
}

/// Derive one faction's scoring tier in a region.
pub fn region_tier(state: &GameState, region: Region, f: Faction) -> Tier {
    let total_bg = state
        .map
        .iter()
        .filter(|c| c.region == region && c.battleground)
        .count() as u32;
    let own = count(state, region, f);
    let opp = count(state, region, f.opponent());

    if own.countries == 0 {
        return Tier::None;
    }
    if own.countries > opp.countries && own.battlegrounds == total_bg && total_bg > 0 {
        return Tier::Control;
    }
    if own.countries > opp.countries
        && own.battlegrounds > opp.battlegrounds
        && own.non_battlegrounds > 0
    {
        return Tier::Domination;
    }
    Tier::Presence
}

/// Score a region for both factions: tier value, one VP per controlled
/// battleground, one VP per controlled country bordering the enemy
/// superpower. Returns the gross awards (the VP balance nets them).
pub fn score_region(state: &mut GameState, region: Region) -> ByFaction<u32> {
    let values = region_values(region);
    let mut awards = ByFaction::default();
    for f in Faction::all() {
        let mut total = match region_tier(state, region, f) {
            Tier::None => 0,
            Tier::Presence => values.presence,
            Tier::Domination => values.domination,
            Tier::Control => values.control,
        };
        for c in state.map.iter().filter(|c| c.region == region) {
            if c.controlled_by(f) {
                if c.battleground {
                    total += 1;
                }
                if c.superpower == Some(f.opponent()) {
                    total += 1;
                }
            }
        }
        *awards.get_mut(f) = total;
    }
    for f in Faction::all() {
        state.award_vp(f, *awards.get(f));
    }
    awards
}

/// One box of the space-race track, attempted with a card of at least
/// `ops_needed` and succeeding on a roll of `max_roll` or less.
#[derive(Debug, Clone, Copy)]
pub struct SpaceBox {
    pub ops_needed: u32,
    pub max_roll: u32,
    pub vp_first: u32,
    pub vp_second: u32,
}

pub const SPACE_TRACK: [SpaceBox; 8] = [
    SpaceBox { ops_needed: 2, max_roll: 3, vp_first: 2, vp_second: 1 },
    SpaceBox { ops_needed: 2, max_roll: 4, vp_first: 0, vp_second: 0 },
    SpaceBox { ops_needed: 2, max_roll: 3, vp_first: 2, vp_second: 0 },
    SpaceBox { ops_needed: 2, max_roll: 4, vp_first: 0, vp_second: 0 },
    SpaceBox { ops_needed: 3, max_roll: 3, vp_first: 3, vp_second: 1 },
    SpaceBox { ops_needed: 3, max_roll: 4, vp_first: 0, vp_second: 0 },
    SpaceBox { ops_needed: 3, max_roll: 3, vp_first: 4, vp_second: 2 },
    SpaceBox { ops_needed: 4, max_roll: 2, vp_first: 2, vp_second: 0 },
];

/// Attempts allowed per turn: one, or two while ahead of the second box
/// before the opponent.
pub fn space_attempts_allowed(state: &GameState, f: Faction) -> u32 {
    if *state.space.get(f) >= 2 && *state.space.get(f.opponent()) < 2 {
        2
    } else {
        1
    }
}

/// While ahead of the fourth box, the opponent must commit their headline
/// first and show it.
pub fn headline_advantage(state: &GameState, f: Faction) -> bool {
    *state.space.get(f) >= 4 && *state.space.get(f.opponent()) < 4
}

pub fn can_space(state: &GameState, f: Faction, ops: u32) -> Result<(), String> {
    let position = *state.space.get(f);
    if position as usize >= SPACE_TRACK.len() {
        return Err("the space race track is complete".to_string());
    }
    if *state.space_attempts.get(f) >= space_attempts_allowed(state, f) {
        return Err("no space-race attempt left this turn".to_string());
    }
    let needed = SPACE_TRACK[position as usize].ops_needed;
    if ops < needed {
        return Err(format!("the next box needs a card of {needed} ops"));
    }
    Ok(())
}

/// Resolve a space-race attempt with an already-drawn roll. Advancing awards
/// the first- or second-arrival VP for the reached box.
pub fn attempt_space(state: &mut GameState, f: Faction, roll: u32) -> bool {
    *state.space_attempts.get_mut(f) += 1;
    let position = *state.space.get(f);
    let space_box = SPACE_TRACK[position as usize];
    if roll > space_box.max_roll {
        return false;
    }
    let reached = position + 1;
    *state.space.get_mut(f) = reached;
    let award = if *state.space.get(f.opponent()) >= reached {
        space_box.vp_second
    } else {
        space_box.vp_first
    };
    state.award_vp(f, award);
    true
}
