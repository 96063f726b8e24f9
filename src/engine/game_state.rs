//! The single mutable aggregate. Everything here is a pure function of the
//! initial configuration and the input log prefix consumed so far.

use super::cards::Zones;
use super::map::{Country, CountryView};
use super::reference::RefData;
use super::types::{
    ByFaction, CardId, CountryId, Effect, Faction, Outcome, Phase, VictoryReason,
};
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;
use std::collections::HashMap;
use std::sync::Arc;

/// Victory-point lead that ends the game immediately.
pub const VP_THRESHOLD: i32 = 20;
/// DEFCON floor; reaching it ends the game against the phasing faction.
pub const DEFCON_FLOOR: u32 = 1;
pub const DEFCON_CEILING: u32 = 5;

#[derive(Debug, Clone)]
pub struct GameState {
    pub refs: Arc<RefData>,
    pub map: Vec<Country>,
    pub zones: Zones,
    /// Signed, zero-centered: positive favors the USA, negative the USSR.
    pub vp: i32,
    pub defcon: u32,
    pub milops: ByFaction<u32>,
    pub space: ByFaction<u32>,
    /// Space-race attempts used this turn.
    pub space_attempts: ByFaction<u32>,
    pub turn: u32,
    pub round: u32,
    /// Whose action is on the clock; DEFCON collapse is charged to them.
    pub phasing: Faction,
    pub phase: Phase,
    /// Holder of the privileged always-in-play card, and whether it is
    /// currently playable (face up).
    pub pivot_holder: Faction,
    pub pivot_face_up: bool,
    /// Event effects that persist for the rest of the game.
    pub permanent_effects: HashMap<Effect, Faction>,
    /// Event effects cleared at the top of every turn.
    pub turn_effects: HashMap<Effect, Faction>,
    pub outcome: Option<Outcome>,
}

impl GameState {
    pub fn new(refs: Arc<RefData>) -> Self {
        let map = refs.build_map();
        GameState {
            refs,
            map,
            zones: Zones::new(),
            vp: 0,
            defcon: DEFCON_CEILING,
            milops: ByFaction::default(),
            space: ByFaction::default(),
            space_attempts: ByFaction::default(),
            turn: 0,
            round: 0,
            phasing: Faction::Ussr,
            phase: Phase::Setup,
            pivot_holder: Faction::Ussr,
            pivot_face_up: true,
            permanent_effects: HashMap::new(),
            turn_effects: HashMap::new(),
            outcome: None,
        }
    }

    pub fn country(&self, id: CountryId) -> &Country {
        &self.map[id.0]
    }

    pub fn country_mut(&mut self, id: CountryId) -> &mut Country {
        &mut self.map[id.0]
    }

    /// Who owns an in-play effect, checking the turn table first.
    pub fn effect_owner(&self, effect: Effect) -> Option<Faction> {
        self.turn_effects
            .get(&effect)
            .or_else(|| self.permanent_effects.get(&effect))
            .copied()
    }

    pub fn effect_active_for(&self, effect: Effect, f: Faction) -> bool {
        self.effect_owner(effect) == Some(f)
    }

    /// Award victory points to a faction. The balance is zero-sum: one
    /// faction's gain is the other's loss.
    pub fn award_vp(&mut self, to: Faction, amount: u32) {
        let signed = amount as i32;
        self.vp += match to {
            Faction::Usa => signed,
            Faction::Ussr => -signed,
        };
        if self.outcome.is_none() && self.vp.abs() >= VP_THRESHOLD {
            let winner = if self.vp > 0 {
                Faction::Usa
            } else {
                Faction::Ussr
            };
            self.outcome = Some(Outcome::Victory {
                winner,
                reason: VictoryReason::VpThreshold,
            });
        }
    }

    /// Degrade DEFCON by one step; at the floor the phasing faction loses.
    pub fn degrade_defcon(&mut self) {
        if self.defcon > DEFCON_FLOOR {
            self.defcon -= 1;
        }
        if self.defcon == DEFCON_FLOOR && self.outcome.is_none() {
            self.outcome = Some(Outcome::Victory {
                winner: self.phasing.opponent(),
                reason: VictoryReason::DefconCollapse,
            });
        }
    }

    pub fn improve_defcon(&mut self) {
        if self.defcon < DEFCON_CEILING {
            self.defcon += 1;
        }
    }

    pub fn concede(&mut self, loser: Faction) {
        if self.outcome.is_none() {
            self.outcome = Some(Outcome::Victory {
                winner: loser.opponent(),
                reason: VictoryReason::Concession,
            });
        }
    }

    pub fn over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Serializable snapshot for the presentation boundary.
    pub fn view(&self) -> GameView {
        let name = |id: &CardId| self.refs.card(*id).name.clone();
        GameView {
            turn: self.turn,
            round: self.round,
            phase: self.phase,
            phasing: self.phasing,
            vp: self.vp,
            defcon: self.defcon,
            milops: self.milops,
            space: self.space,
            pivot_holder: self.pivot_holder,
            pivot_face_up: self.pivot_face_up,
            hands: ByFaction {
                usa: self.zones.hand(Faction::Usa).iter().map(name).collect(),
                ussr: self.zones.hand(Faction::Ussr).iter().map(name).collect(),
            },
            draw_count: self.zones.draw.len(),
            discard: self.zones.discard.iter().map(name).collect(),
            removed: self.zones.removed.iter().map(name).collect(),
            effects: {
                let mut effects: Vec<EffectView> = self
                    .permanent_effects
                    .iter()
                    .map(|(e, f)| EffectView {
                        effect: format!("{e:?}"),
                        owner: *f,
                        permanent: true,
                    })
                    .chain(self.turn_effects.iter().map(|(e, f)| EffectView {
                        effect: format!("{e:?}"),
                        owner: *f,
                        permanent: false,
                    }))
                    .collect();
                // Table iteration order is not stable; the view must be.
                effects.sort_by(|a, b| (&a.effect, a.permanent).cmp(&(&b.effect, b.permanent)));
                effects
            },
            countries: self.map.iter().map(Country::view).collect(),
            outcome: self.outcome,
        }
    }
}

/// One in-play effect, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct EffectView {
    pub effect: String,
    pub owner: Faction,
    pub permanent: bool,
}

/// Full snapshot handed to the presentation boundary and the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct GameView {
    pub turn: u32,
    pub round: u32,
    pub phase: Phase,
    pub phasing: Faction,
    pub vp: i32,
    pub defcon: u32,
    pub milops: ByFaction<u32>,
    pub space: ByFaction<u32>,
    pub pivot_holder: Faction,
    pub pivot_face_up: bool,
    pub hands: ByFaction<Vec<String>>,
    pub draw_count: usize,
    pub discard: Vec<String>,
    pub removed: Vec<String>,
    pub effects: Vec<EffectView>,
    pub countries: Vec<CountryView>,
    pub outcome: Option<Outcome>,
}
