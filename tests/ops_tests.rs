// The operations resolver: coup and realignment formulas, eligibility, and
// the conduct-operations dispatcher driven from a recorded log.
use coldwar_cardgame::engine::game_state::GameState;
use coldwar_cardgame::engine::types::{ByFaction, CountryId, Effect, Faction, Region};
use coldwar_cardgame::engine::{ops, reference, Channel, InputLog, ScriptedActor};
use rand::SeedableRng;
use rand_pcg::Lcg64Xsh32;
use std::sync::Arc;

fn state() -> GameState {
    GameState::new(Arc::new(reference::standard()))
}

fn country(gs: &GameState, name: &str) -> CountryId {
    gs.refs.country_id(name).unwrap()
}

#[test]
fn coup_formula_moves_exactly_the_delta() {
    let mut gs = state();
    let france = country(&gs, "France");
    gs.country_mut(france).add_influence(Faction::Usa, 2);

    // stability 3, roll 4, ops 3: delta = 4 + 3 - 6 = 1.
    let outcome = ops::coup(&mut gs, Faction::Ussr, france, 3, 4, 0, false);
    assert_eq!(outcome.delta, 1);
    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.gained, 0);
    assert_eq!(gs.country(france).influence(Faction::Usa), 1);
    assert_eq!(gs.country(france).influence(Faction::Ussr), 0);

    // A battleground coup degrades DEFCON and feeds the milops track.
    assert!(outcome.defcon_degraded);
    assert_eq!(gs.defcon, 4);
    assert_eq!(*gs.milops.get(Faction::Ussr), 3);
}

#[test]
fn coup_overflow_becomes_attacker_influence() {
    let mut gs = state();
    let nicaragua = country(&gs, "Nicaragua");
    gs.country_mut(nicaragua).add_influence(Faction::Ussr, 1);

    // stability 1, roll 5, ops 2: delta = 5 + 2 - 2 = 5; one removed, four gained.
    let outcome = ops::coup(&mut gs, Faction::Usa, nicaragua, 2, 5, 0, false);
    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.gained, 4);
    assert_eq!(gs.country(nicaragua).influence(Faction::Usa), 4);
    // Nicaragua is no battleground: DEFCON holds.
    assert!(!outcome.defcon_degraded);
    assert_eq!(gs.defcon, 5);
}

#[test]
fn failed_coup_changes_no_influence() {
    let mut gs = state();
    let nicaragua = country(&gs, "Nicaragua");

    // stability 1, no defender influence, roll 1, ops 0: delta = 1 - 2 = -1.
    let outcome = ops::coup(&mut gs, Faction::Usa, nicaragua, 0, 1, 0, true);
    assert_eq!(outcome.delta, -1);
    assert_eq!(outcome.removed, 0);
    assert_eq!(outcome.gained, 0);
    assert_eq!(gs.country(nicaragua).influence(Faction::Usa), 0);
    assert_eq!(gs.country(nicaragua).influence(Faction::Ussr), 0);
    assert_eq!(gs.defcon, 5);
}

#[test]
fn coup_eligibility_rules() {
    let mut gs = state();
    // EastGermany holds USSR influence; a USA coup there is legal at DEFCON 5.
    let eg = country(&gs, "EastGermany");
    assert!(ops::can_coup(&gs, Faction::Usa, eg, false).is_ok());

    // Europe's volatility is 4: one step of tension forbids it.
    gs.degrade_defcon();
    assert!(ops::can_coup(&gs, Faction::Usa, eg, false).is_err());
    // A free coup ignores the tension restriction.
    assert!(ops::can_coup(&gs, Faction::Usa, eg, true).is_ok());

    // No opposing influence, no coup — free or not.
    let france = country(&gs, "France");
    assert!(ops::can_coup(&gs, Faction::Usa, france, true).is_err());
}

#[test]
fn standing_pact_protects_controlled_countries() {
    let mut gs = state();
    let eg = country(&gs, "EastGermany");
    gs.permanent_effects.insert(
        Effect::RegionPact {
            region: Region::Europe,
        },
        Faction::Ussr,
    );
    // EastGermany is USSR-controlled, so the pact shields it.
    assert!(ops::can_coup(&gs, Faction::Usa, eg, true).is_err());

    // Poland holds USSR influence without control: not shielded.
    let poland = country(&gs, "Poland");
    assert!(ops::can_coup(&gs, Faction::Usa, poland, true).is_ok());
}

#[test]
fn defcon_shield_suppresses_the_battleground_hit() {
    let mut gs = state();
    let france = country(&gs, "France");
    gs.country_mut(france).add_influence(Faction::Usa, 1);
    gs.permanent_effects
        .insert(Effect::DefconShield, Faction::Ussr);

    let outcome = ops::coup(&mut gs, Faction::Ussr, france, 3, 6, 0, false);
    assert!(!outcome.defcon_degraded);
    assert_eq!(gs.defcon, 5);
}

#[test]
fn realignment_tie_changes_nothing() {
    let mut gs = state();
    // Thailand: equal influence, only neighbor (India) uncontrolled.
    let thailand = country(&gs, "Thailand");
    gs.country_mut(thailand).add_influence(Faction::Usa, 2);
    gs.country_mut(thailand).add_influence(Faction::Ussr, 2);

    let outcome = ops::realign(&mut gs, thailand, ByFaction { usa: 3, ussr: 3 });
    assert_eq!(outcome.loser, None);
    assert_eq!(outcome.removed, 0);
    assert_eq!(gs.country(thailand).influence(Faction::Usa), 2);
    assert_eq!(gs.country(thailand).influence(Faction::Ussr), 2);
}

#[test]
fn realignment_modifiers_credit_lean_and_neighbors() {
    let mut gs = state();
    // The USSR starts ahead 1-0 in Iraq; give the USA a controlled neighbor.
    let iraq = country(&gs, "Iraq");
    let iran = country(&gs, "Iran");
    gs.country_mut(iran).add_influence(Faction::Usa, 1); // 2-0, stability 2

    let mods = ops::realign_modifiers(&gs, iraq);
    assert_eq!(*mods.get(Faction::Ussr), 1); // lean
    assert_eq!(*mods.get(Faction::Usa), 1); // Iran

    // Equal dice: modifiers cancel out, nothing moves.
    let outcome = ops::realign(&mut gs, iraq, ByFaction { usa: 2, ussr: 2 });
    assert_eq!(outcome.loser, None);

    // A big USA roll removes the margin, capped at what is present.
    let outcome = ops::realign(&mut gs, iraq, ByFaction { usa: 6, ussr: 1 });
    assert_eq!(outcome.loser, Some(Faction::Ussr));
    assert_eq!(outcome.removed, 1);
    assert_eq!(gs.country(iraq).influence(Faction::Ussr), 0);
}

#[test]
fn influence_cost_doubles_into_enemy_control() {
    let gs = state();
    let eg = country(&gs, "EastGermany");
    assert_eq!(ops::influence_cost(&gs, Faction::Usa, eg), 2);
    assert_eq!(ops::influence_cost(&gs, Faction::Ussr, eg), 1);
    let poland = country(&gs, "Poland");
    assert_eq!(ops::influence_cost(&gs, Faction::Usa, poland), 1);
}

#[test]
fn placement_requires_reach() {
    let mut gs = state();
    // Thailand borders nothing the USA holds at start.
    let thailand = country(&gs, "Thailand");
    assert!(ops::can_place_influence(&gs, Faction::Usa, thailand).is_err());
    // Presence opens the country itself and its neighbors.
    gs.country_mut(thailand).add_influence(Faction::Usa, 1);
    assert!(ops::can_place_influence(&gs, Faction::Usa, thailand).is_ok());
    let india = country(&gs, "India");
    assert!(ops::can_place_influence(&gs, Faction::Usa, india).is_ok());

    // A superpower border is always in reach.
    let cuba = country(&gs, "Cuba");
    assert!(ops::can_place_influence(&gs, Faction::Usa, cuba).is_ok());
}

#[test]
fn replayed_coup_records_and_consumes_the_roll() {
    let mut gs = state();
    let nicaragua = country(&gs, "Nicaragua");
    gs.country_mut(nicaragua).add_influence(Faction::Ussr, 1);

    // A recorded log drives the dispatcher: operation, target, then the
    // logged die roll of 1. delta = 1 + 1 - 2 = 0, so the attempt fails.
    let log = InputLog::from_entries(vec![
        "coup".to_string(),
        "Nicaragua".to_string(),
        "1".to_string(),
    ]);
    let mut chan = Channel::new(
        log.clone(),
        Box::new(ScriptedActor::new(Vec::<String>::new())),
        Lcg64Xsh32::seed_from_u64(3),
    );
    ops::conduct_operations(&mut chan, &mut gs, Faction::Usa, 1).unwrap();

    assert_eq!(gs.country(nicaragua).influence(Faction::Ussr), 1);
    assert_eq!(gs.country(nicaragua).influence(Faction::Usa), 0);
    assert_eq!(gs.defcon, 5);
    // The roll stays in the log and the cursor sits right after it.
    assert_eq!(log.entries(), vec!["coup", "Nicaragua", "1"]);
    assert_eq!(log.position(), 3);
    assert!(!log.in_replay());
}
