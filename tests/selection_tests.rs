// The selection engine: budget enforcement, predicate composition, atomic
// mutations, sentinel handling.
use coldwar_cardgame::engine::game_state::GameState;
use coldwar_cardgame::engine::selection::{self, Predicate};
use coldwar_cardgame::engine::types::{CountryId, Faction};
use coldwar_cardgame::engine::{ops, reference, Channel, InputLog, ScriptedActor};
use rand::SeedableRng;
use rand_pcg::Lcg64Xsh32;
use std::sync::Arc;

fn channel(script: &[&str]) -> Channel {
    Channel::new(
        InputLog::new(),
        Box::new(ScriptedActor::new(script.iter().copied())),
        Lcg64Xsh32::seed_from_u64(1),
    )
}

fn state() -> GameState {
    GameState::new(Arc::new(reference::standard()))
}

fn parse_country(s: &GameState, text: &str) -> Result<CountryId, String> {
    s.refs.country_id(text)
}

#[test]
fn exact_budget_must_be_spent_in_full() {
    let mut gs = state();
    let mut chan = channel(&["Poland", "done", "Poland", "Poland"]);
    let picks = selection::select(
        &mut chan,
        &mut gs,
        Faction::Ussr,
        "place influence",
        3,
        true,
        &[],
        parse_country,
        |_, _| 1,
        &[],
        |s, id| {
            s.country_mut(*id).add_influence(Faction::Ussr, 1);
            Ok(())
        },
    )
    .unwrap();

    // The early "done" was rejected; all three points landed.
    assert_eq!(picks.len(), 3);
    let poland = gs.refs.country_id("Poland").unwrap();
    assert_eq!(gs.country(poland).influence(Faction::Ussr), 5);
}

#[test]
fn loose_budget_may_stop_early() {
    let mut gs = state();
    let mut chan = channel(&["Poland", "done"]);
    let picks = selection::select(
        &mut chan,
        &mut gs,
        Faction::Ussr,
        "place influence",
        3,
        false,
        &[],
        parse_country,
        |_, _| 1,
        &[],
        |s, id| {
            s.country_mut(*id).add_influence(Faction::Ussr, 1);
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(picks.len(), 1);
}

#[test]
fn opponent_controlled_candidates_cost_double() {
    let mut gs = state();
    // EastGermany starts USSR-controlled: 2 budget buys one USA point there.
    let mut chan = channel(&["EastGermany"]);
    let picks = selection::select(
        &mut chan,
        &mut gs,
        Faction::Usa,
        "place influence",
        2,
        true,
        &[],
        parse_country,
        |s, id| ops::influence_cost(s, Faction::Usa, *id),
        &[],
        |s, id| {
            s.country_mut(*id).add_influence(Faction::Usa, 1);
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(picks.len(), 1);
    let eg = gs.refs.country_id("EastGermany").unwrap();
    assert_eq!(gs.country(eg).influence(Faction::Usa), 1);
}

#[test]
fn over_budget_candidates_are_rejected_not_fatal() {
    let mut gs = state();
    // One budget unit: the double-cost EastGermany bounces, Nicaragua lands.
    let mut chan = channel(&["EastGermany", "Nicaragua"]);
    let picks = selection::select(
        &mut chan,
        &mut gs,
        Faction::Usa,
        "place influence",
        1,
        true,
        &[],
        parse_country,
        |s, id| ops::influence_cost(s, Faction::Usa, *id),
        &[],
        |s, id| {
            s.country_mut(*id).add_influence(Faction::Usa, 1);
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(picks.len(), 1);
    let eg = gs.refs.country_id("EastGermany").unwrap();
    assert_eq!(gs.country(eg).influence(Faction::Usa), 0);
}

#[test]
fn predicates_see_the_picks_so_far() {
    let mut gs = state();
    let cap: Predicate<'_, CountryId> = &|_, id, picks| {
        if picks.iter().filter(|p| **p == *id).count() >= 2 {
            Err("at most 2 per country".to_string())
        } else {
            Ok(())
        }
    };
    let mut chan = channel(&["Poland", "Poland", "Poland", "done"]);
    let picks = selection::select(
        &mut chan,
        &mut gs,
        Faction::Ussr,
        "place influence",
        3,
        false,
        &[],
        parse_country,
        |_, _| 1,
        &[cap],
        |s, id| {
            s.country_mut(*id).add_influence(Faction::Ussr, 1);
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(picks.len(), 2);
}

#[test]
fn mutation_domain_errors_leave_state_untouched() {
    let mut gs = state();
    let france = gs.refs.country_id("France").unwrap();
    let before = gs.country(france).influence(Faction::Ussr);
    assert_eq!(before, 0);

    let mut chan = channel(&["France", "done"]);
    let picks = selection::select(
        &mut chan,
        &mut gs,
        Faction::Usa,
        "remove influence",
        2,
        false,
        &[],
        parse_country,
        |_, _| 1,
        &[],
        |s, id| s.country_mut(*id).remove_influence(Faction::Ussr, 1).map(|_| ()),
    )
    .unwrap();
    assert!(picks.is_empty());
    assert_eq!(gs.country(france).influence(Faction::Ussr), 0);
}

#[test]
fn unknown_names_reprompt_instead_of_failing() {
    let mut gs = state();
    let mut chan = channel(&["Atlantis", "Poland"]);
    let picks = selection::select(
        &mut chan,
        &mut gs,
        Faction::Ussr,
        "place influence",
        1,
        true,
        &[],
        parse_country,
        |_, _| 1,
        &[],
        |s, id| {
            s.country_mut(*id).add_influence(Faction::Ussr, 1);
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(picks.len(), 1);
    // Both answers — the rejected and the accepted — are in the log.
    assert_eq!(chan.log().entries(), vec!["Atlantis", "Poland"]);
}

#[test]
fn zero_budget_selections_never_solicit() {
    let mut gs = state();
    // An empty script would close the channel on any solicitation.
    let mut chan = channel(&[]);
    let picks = selection::select(
        &mut chan,
        &mut gs,
        Faction::Ussr,
        "place influence",
        0,
        true,
        &[],
        parse_country,
        |_, _| 1,
        &[],
        |_, _| Ok(()),
    )
    .unwrap();
    assert!(picks.is_empty());
}

#[test]
fn removal_clauses_cap_per_country_spend() {
    use coldwar_cardgame::engine::turn;

    let mut gs = state();
    // USSR holds 3 in EastGermany and 2 in Poland at start.
    let mut chan = channel(&[
        "EastGermany",
        "EastGermany",
        "EastGermany",
        "Poland",
        "done",
    ]);
    turn::remove_influence_clause(&mut chan, &mut gs, Faction::Usa, Faction::Ussr, 4, 2)
        .unwrap();

    let eg = gs.refs.country_id("EastGermany").unwrap();
    let poland = gs.refs.country_id("Poland").unwrap();
    // The third EastGermany pick was over the per-country cap.
    assert_eq!(gs.country(eg).influence(Faction::Ussr), 1);
    assert_eq!(gs.country(poland).influence(Faction::Ussr), 1);
}

#[test]
fn choose_one_returns_none_on_the_sentinel() {
    let mut gs = state();
    let mut chan = channel(&["done"]);
    let pick = selection::choose_one(
        &mut chan,
        &mut gs,
        Faction::Usa,
        "target",
        &[],
        parse_country,
        &[],
    )
    .unwrap();
    assert!(pick.is_none());
}
