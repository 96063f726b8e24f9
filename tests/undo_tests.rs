// Undo is not a snapshot restore: the log is truncated by one entry and the
// whole game re-executes from scratch, stopping at the first live
// solicitation.
use coldwar_cardgame::engine::game_state::GameState;
use coldwar_cardgame::engine::types::Faction;
use coldwar_cardgame::engine::{
    reference, turn, Channel, EngineError, InputLog, NullPresenter, ScriptedActor,
};
use rand::SeedableRng;
use rand_pcg::Lcg64Xsh32;
use std::sync::Arc;

fn run_with(log: InputLog, script: &[String], seed: u64) -> GameState {
    let refs = Arc::new(reference::standard());
    let mut state = GameState::new(refs);
    let mut chan = Channel::new(
        log,
        Box::new(ScriptedActor::new(script.iter().cloned())),
        Lcg64Xsh32::seed_from_u64(seed),
    );
    let _ = turn::run_game(&mut state, &mut chan, &NullPresenter);
    state
}

fn headline_script(seed: u64) -> Vec<String> {
    let s0 = run_with(InputLog::new(), &[], seed);
    let mut script = vec![s0.refs.card(s0.zones.hand(Faction::Ussr)[0]).name.clone()];
    let s1 = run_with(InputLog::new(), &script, seed);
    script.push(s1.refs.card(s1.zones.hand(Faction::Usa)[0]).name.clone());
    script
}

/// Headlines plus the start of a USSR influence operation, ending in the
/// middle of the selection so entries exist past the last commit. `None` if
/// this seed dealt the USSR no card worth at least 2 ops.
fn opening_script(seed: u64) -> Option<(Vec<String>, u32)> {
    let mut script = headline_script(seed);
    let s2 = run_with(InputLog::new(), &script, seed);
    let card = *s2.zones.hand(Faction::Ussr).iter().find(|c| {
        let spec = s2.refs.card(**c);
        !spec.is_scoring() && spec.ops >= 2
    })?;
    let ops = s2.refs.card(card).ops;
    script.push(s2.refs.card(card).name.clone());
    script.push("ops".to_string());
    script.push("influence".to_string());
    // Stop one pick short of the budget: the selection stays open.
    for _ in 0..ops - 1 {
        script.push("Poland".to_string());
    }
    Some((script, ops))
}

fn workable_opening() -> (u64, Vec<String>, u32) {
    (11..64)
        .find_map(|seed| opening_script(seed).map(|(script, ops)| (seed, script, ops)))
        .expect("some seed deals the USSR a 2-ops card")
}

#[test]
fn rewind_then_same_answer_reaches_the_same_state() {
    let (seed, script, _ops) = workable_opening();
    let log = InputLog::new();
    let before = run_with(log.clone(), &script, seed);

    // The last entry is a live influence pick, past the post-headline commit.
    assert!(log.can_rewind());
    log.rewind().unwrap();
    assert_eq!(log.position(), 0);

    // Resume, supplying the same pick again. Replay covers everything else.
    let after = run_with(log.clone(), &["Poland".to_string()], 1234);
    assert_eq!(before.view(), after.view());
}

#[test]
fn each_rewind_drops_exactly_one_entry() {
    let (seed, script, _ops) = workable_opening();
    let log = InputLog::new();
    let _ = run_with(log.clone(), &script, seed);

    let len = log.len();
    log.rewind().unwrap();
    assert_eq!(log.len(), len - 1);
    log.rewind().unwrap();
    assert_eq!(log.len(), len - 2);
}

#[test]
fn rewind_stops_at_the_watermark() {
    // Play only the headlines; the post-headline commit protects them.
    let script = headline_script(11);
    let log = InputLog::new();
    let _ = run_with(log.clone(), &script, 11);
    assert!(!log.can_rewind());
    assert_eq!(log.rewind(), Err(EngineError::NothingToRewind));
}

#[test]
fn undone_influence_is_actually_gone() {
    let (seed, script, ops) = workable_opening();
    let log = InputLog::new();
    let before = run_with(log.clone(), &script, seed);
    let poland = before.refs.country_id("Poland").unwrap();
    let placed = before.country(poland).influence(Faction::Ussr);
    assert_eq!(placed, 2 + (ops - 1));

    log.rewind().unwrap();
    let after = run_with(log.clone(), &[], 4321);
    assert_eq!(after.country(poland).influence(Faction::Ussr), placed - 1);
}
