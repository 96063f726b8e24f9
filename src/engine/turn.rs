//! The turn state machine: headline, action rounds, housekeeping, terminal
//! conditions. Each decision point goes through the solicitation channel or
//! the selection engine, so a recorded log drives the whole machine
//! identically to a live session.

use super::cards::Zone;
use super::channel::{Channel, Presenter};
use super::game_state::GameState;
use super::ops;
use super::scoring;
use super::selection;
use super::types::{CardId, Era, EventMark, Faction, Outcome, Phase, VictoryReason};
use super::EngineResult;

/// Last turn; after its housekeeping every region is scored once more.
pub const FINAL_TURN: u32 = 10;

const CONCEDE: &str = "concede";

/// Drive a game to its terminal condition. The caller owns the channel; on a
/// rewind request the error unwinds out of here, the log is truncated, and a
/// fresh state is run through again.
pub fn run_game(
    state: &mut GameState,
    chan: &mut Channel,
    presenter: &dyn Presenter,
) -> EngineResult<Outcome> {
    setup(state, chan)?;
    chan.commit();
    presenter.redraw(&state.view());

    while !state.over() {
        start_turn(state, chan)?;
        headline(state, chan)?;
        chan.commit();
        presenter.redraw(&state.view());

        let mut round = 1;
        while !state.over() && round <= rounds_this_turn(state) {
            state.round = round;
            for f in [Faction::Ussr, Faction::Usa] {
                if state.over() {
                    break;
                }
                action_round(state, chan, f)?;
                chan.commit();
                presenter.redraw(&state.view());
            }
            round += 1;
        }

        if !state.over() {
            housekeeping(state, chan)?;
            chan.commit();
            presenter.redraw(&state.view());
        }
        if !state.over() && state.turn >= FINAL_TURN {
            final_scoring(state);
        }
    }

    state.phase = Phase::Over;
    presenter.redraw(&state.view());
    Ok(state.outcome.unwrap_or(Outcome::Draw))
}

/// Paired action rounds this turn: six in the early era, seven after, plus
/// one while an extra-round effect is in play.
fn rounds_this_turn(state: &GameState) -> u32 {
    let base = if state.turn <= 3 { 6 } else { 7 };
    if state
        .effect_owner(super::types::Effect::ExtraRound)
        .is_some()
    {
        base + 1
    } else {
        base
    }
}

fn hand_size(state: &GameState) -> usize {
    if state.turn <= 3 {
        8
    } else {
        9
    }
}

fn setup(state: &mut GameState, chan: &mut Channel) -> EngineResult<()> {
    state.phase = Phase::Setup;
    let refs = state.refs.clone();
    let early = chan.shuffled(refs.era_release(Era::Early), refs.as_ref())?;
    state.zones.release(&early);
    Ok(())
}

fn start_turn(state: &mut GameState, chan: &mut Channel) -> EngineResult<()> {
    state.turn += 1;
    state.round = 0;
    state.turn_effects.clear();
    state.space_attempts = Default::default();
    state.pivot_face_up = true;

    match state.turn {
        4 => release_era(state, chan, Era::Mid)?,
        8 => release_era(state, chan, Era::Late)?,
        _ => {}
    }
    deal(state, chan)
}

/// Shuffle an era's cards into whatever is left of the draw pile.
fn release_era(state: &mut GameState, chan: &mut Channel, era: Era) -> EngineResult<()> {
    let refs = state.refs.clone();
    state.zones.release(&refs.era_release(era));
    let pool = std::mem::take(&mut state.zones.draw);
    state.zones.draw = chan.shuffled(pool, refs.as_ref())?;
    Ok(())
}

/// Alternate drawing until both hands are full, reshuffling the discard pile
/// under the draw pile when it runs dry.
fn deal(state: &mut GameState, chan: &mut Channel) -> EngineResult<()> {
    let target = hand_size(state);
    loop {
        let mut progressed = false;
        for f in [Faction::Ussr, Faction::Usa] {
            if state.zones.hand(f).len() >= target {
                continue;
            }
            if state.zones.draw.is_empty() {
                let refs = state.refs.clone();
                let recycled = state.zones.recycle_discard();
                if recycled.is_empty() {
                    return Ok(());
                }
                state.zones.draw = chan.shuffled(recycled, refs.as_ref())?;
            }
            let _ = state.zones.draw_top(f);
            progressed = true;
        }
        if !progressed {
            return Ok(());
        }
    }
}

/// Both factions commit a card before either resolves. A space-race
/// advantage makes the opponent commit first and shows the committed card;
/// a cancellation event discards both cards unresolved. Resolution order is
/// by operations value, USA first on ties.
fn headline(state: &mut GameState, chan: &mut Channel) -> EngineResult<()> {
    state.phase = Phase::Headline;
    state.round = 0;

    let order = if scoring::headline_advantage(state, Faction::Ussr) {
        [Faction::Usa, Faction::Ussr]
    } else {
        // Default order; commits are revealed only after both are in.
        [Faction::Ussr, Faction::Usa]
    };
    let advantage = Faction::all()
        .into_iter()
        .find(|f| scoring::headline_advantage(state, *f));

    let mut committed: Vec<(Faction, CardId)> = Vec::new();
    for f in order {
        let prompt = match (advantage, committed.first()) {
            (Some(holder), Some((_, card))) if holder == f => format!(
                "headline: commit a card (opponent committed {})",
                state.refs.card(*card).name
            ),
            _ => "headline: commit a card".to_string(),
        };
        let hints: Vec<String> = state
            .zones
            .hand(f)
            .iter()
            .map(|c| state.refs.card(*c).name.clone())
            .collect();
        let card = solicit_hand_card(state, chan, f, &prompt, &hints)?;
        committed.push((f, card));
    }

    for (f, card) in &committed {
        chan.message(
            f.opponent(),
            &format!("{f} headlines {}", state.refs.card(*card).name),
        );
    }

    let cancelled = committed.iter().any(|(_, c)| {
        matches!(state.refs.card(*c).event, Some(EventMark::HeadlineCancel))
    });
    if cancelled {
        for (f, card) in committed {
            discard_played(state, card, f, false)?;
            chan.message(f, "headline cancelled: both cards are discarded");
        }
        return Ok(());
    }

    committed.sort_by_key(|(f, c)| {
        // Higher ops first; USA wins ties.
        (
            std::cmp::Reverse(state.refs.card(*c).ops),
            *f != Faction::Usa,
        )
    });
    for (f, card) in committed {
        if state.over() {
            // The loser's headline never resolves once the game has ended.
            discard_played(state, card, f, false)?;
            continue;
        }
        state.phasing = f;
        // An event always works for its affinity faction, whoever headlined it.
        let owner = state.refs.card(card).affinity.faction().unwrap_or(f);
        let resolved = resolve_event(state, chan, card, owner)?;
        discard_played(state, card, f, resolved)?;
    }
    Ok(())
}

/// Solicit one card from the actor's hand, re-prompting until valid.
fn solicit_hand_card(
    state: &GameState,
    chan: &mut Channel,
    actor: Faction,
    prompt: &str,
    hints: &[String],
) -> EngineResult<CardId> {
    loop {
        let answer = chan.solicit(actor, prompt, hints)?;
        match state.refs.card_id(answer.text.trim()) {
            Ok(card) if state.zones.hand_contains(actor, card) => return Ok(card),
            Ok(_) => chan.message(actor, "that card is not in your hand"),
            Err(e) => chan.message(actor, &e),
        }
    }
}

/// One faction's action round: choose a card (or concede), choose how to
/// play it, resolve.
fn action_round(state: &mut GameState, chan: &mut Channel, actor: Faction) -> EngineResult<()> {
    state.phase = Phase::ActionRound;
    state.phasing = actor;

    let pivot = state.refs.pivot();
    let pivot_available = state.pivot_holder == actor && state.pivot_face_up;
    if state.zones.hand(actor).is_empty() && !pivot_available {
        chan.message(actor, "no card to play this round");
        return Ok(());
    }

    let mut hints: Vec<String> = state
        .zones
        .hand(actor)
        .iter()
        .map(|c| state.refs.card(*c).name.clone())
        .collect();
    if pivot_available {
        hints.push(state.refs.card(pivot).name.clone());
    }
    hints.push(CONCEDE.to_string());

    let card = loop {
        let answer = chan.solicit(
            actor,
            &format!("action round {}: choose a card", state.round),
            &hints,
        )?;
        let text = answer.text.trim();
        if text.eq_ignore_ascii_case(CONCEDE) {
            state.concede(actor);
            return Ok(());
        }
        match state.refs.card_id(text) {
            Ok(c) if c == pivot && pivot_available => break c,
            Ok(c) if state.zones.hand_contains(actor, c) => break c,
            Ok(_) => chan.message(actor, "that card is not available to you"),
            Err(e) => chan.message(actor, &e),
        }
    };

    if card == pivot {
        let ops_value = effective_ops(state, actor, state.refs.card(pivot).ops);
        ops::conduct_operations(chan, state, actor, ops_value)?;
        state.pivot_holder = actor.opponent();
        state.pivot_face_up = false;
        return Ok(());
    }

    let (is_scoring, affinity, card_ops) = {
        let spec = state.refs.card(card);
        (spec.is_scoring(), spec.affinity.faction(), spec.ops)
    };
    if is_scoring {
        let resolved = resolve_event(state, chan, card, actor)?;
        return discard_played(state, card, actor, resolved);
    }
    loop {
        let kinds = [
            "ops".to_string(),
            "event".to_string(),
            "space".to_string(),
        ];
        let answer = chan.solicit(
            actor,
            &format!("play {} as", state.refs.card(card).name),
            &kinds,
        )?;
        match answer.text.to_ascii_lowercase().as_str() {
            "ops" => {
                let ops_value = effective_ops(state, actor, card_ops);
                ops::conduct_operations(chan, state, actor, ops_value)?;
                // Playing the opponent's card for ops triggers their event.
                let mut resolved = false;
                if affinity == Some(actor.opponent()) && !state.over() {
                    resolved = resolve_event(state, chan, card, actor.opponent())?;
                }
                return discard_played(state, card, actor, resolved);
            }
            "event" => {
                if affinity == Some(actor.opponent()) {
                    chan.message(actor, "an opponent card resolves its event only via ops");
                    continue;
                }
                let resolved = resolve_event(state, chan, card, actor)?;
                return discard_played(state, card, actor, resolved);
            }
            "space" => {
                if let Err(e) = scoring::can_space(state, actor, card_ops) {
                    chan.message(actor, &e);
                    continue;
                }
                let roll = chan.roll_die(actor, "space race roll")?;
                let advanced = scoring::attempt_space(state, actor, roll);
                chan.message(
                    actor,
                    if advanced {
                        "space race: advanced"
                    } else {
                        "space race: failure"
                    },
                );
                return discard_played(state, card, actor, false);
            }
            other => chan.message(actor, &format!("unknown play {other:?}")),
        }
    }
}

/// Card operations value after this-turn modifiers, clamped to the 1..=4
/// range cards can carry.
fn effective_ops(state: &GameState, f: Faction, card_ops: u32) -> u32 {
    if state.effect_active_for(super::types::Effect::OpsBoost, f) {
        (card_ops + 1).min(4)
    } else {
        card_ops
    }
}

/// Resolve a card's event (or scoring region). Returns whether anything
/// actually resolved, which decides discard versus removed.
fn resolve_event(
    state: &mut GameState,
    chan: &mut Channel,
    card: CardId,
    by: Faction,
) -> EngineResult<bool> {
    let spec = state.refs.card(card).clone();
    if let Some(region) = spec.scoring {
        let awards = scoring::score_region(state, region);
        for f in Faction::all() {
            chan.message(f, &format!("{region} scored: {} VP to {f}", awards.get(f)));
        }
        return Ok(true);
    }
    match spec.event {
        None => {
            chan.message(by, &format!("{} has no event effect", spec.name));
            Ok(false)
        }
        Some(EventMark::HeadlineCancel) => {
            // Only meaningful while headlines are being committed.
            chan.message(by, &format!("{} has no effect now", spec.name));
            Ok(false)
        }
        Some(EventMark::GrantPermanent { effect }) => {
            state.permanent_effects.insert(effect, by);
            chan.message(by, &format!("{} is now in play", spec.name));
            Ok(true)
        }
        Some(EventMark::GrantTurn { effect }) => {
            state.turn_effects.insert(effect, by);
            chan.message(by, &format!("{} is in play this turn", spec.name));
            Ok(true)
        }
        Some(EventMark::DefconDrop) => {
            state.degrade_defcon();
            chan.message(by, &format!("DEFCON degrades to {}", state.defcon));
            Ok(true)
        }
        Some(EventMark::VpAward { amount }) => {
            let to = spec.affinity.faction().unwrap_or(by);
            state.award_vp(to, amount);
            chan.message(by, &format!("{amount} VP to {to}"));
            Ok(true)
        }
    }
}

/// Move a played card out of the hand: removed from the game if its resolved
/// event says so, otherwise to the discard pile.
fn discard_played(
    state: &mut GameState,
    card: CardId,
    from: Faction,
    event_resolved: bool,
) -> EngineResult<()> {
    let to = if event_resolved && state.refs.card(card).remove_after_event {
        Zone::Removed
    } else {
        Zone::Discard
    };
    state
        .zones
        .transfer(card, Zone::Hand(from), to)
        .map_err(|e| {
            // A played card that is not in the hand is a caller bug.
            super::EngineError::WrongOperation {
                card: state.refs.card(card).name.clone(),
                operation: format!("discard ({e})"),
            }
        })
}

/// End-of-turn housekeeping: military-operations shortfall against DEFCON,
/// DEFCON recovery, held scoring cards, expiry of turn effects.
fn housekeeping(state: &mut GameState, chan: &mut Channel) -> EngineResult<()> {
    state.phase = Phase::Housekeeping;

    for f in Faction::all() {
        let shortfall = state.defcon.saturating_sub(*state.milops.get(f));
        if shortfall > 0 {
            state.award_vp(f.opponent(), shortfall);
            chan.message(
                f,
                &format!("military operations shortfall: {shortfall} VP to {}", f.opponent()),
            );
        }
    }
    state.milops = Default::default();
    state.improve_defcon();

    // Scoring cards cannot be held across a turn boundary.
    let held: Vec<(Faction, CardId)> = Faction::all()
        .into_iter()
        .flat_map(|f| {
            state
                .zones
                .hand(f)
                .iter()
                .copied()
                .filter(|c| state.refs.card(*c).is_scoring())
                .map(move |c| (f, c))
                .collect::<Vec<_>>()
        })
        .collect();
    for (f, card) in held {
        if state.over() {
            break;
        }
        state.phasing = f;
        let resolved = resolve_event(state, chan, card, f)?;
        discard_played(state, card, f, resolved)?;
    }
    Ok(())
}

/// After the final turn, every region is scored once more and the VP balance
/// decides the game.
fn final_scoring(state: &mut GameState) {
    for region in super::types::Region::all() {
        if state.over() {
            return;
        }
        scoring::score_region(state, region);
    }
    if state.over() {
        return;
    }
    state.outcome = Some(match state.vp.cmp(&0) {
        std::cmp::Ordering::Greater => Outcome::Victory {
            winner: Faction::Usa,
            reason: VictoryReason::FinalScoring,
        },
        std::cmp::Ordering::Less => Outcome::Victory {
            winner: Faction::Ussr,
            reason: VictoryReason::FinalScoring,
        },
        std::cmp::Ordering::Equal => Outcome::Draw,
    });
}

/// Run a one-clause influence removal on behalf of a card routine: remove up
/// to `budget` points of `from`'s influence, at most `per_country` from any
/// one country. Kept here because multi-clause cards compose these calls.
pub fn remove_influence_clause(
    chan: &mut Channel,
    state: &mut GameState,
    actor: Faction,
    from: Faction,
    budget: u32,
    per_country: u32,
) -> EngineResult<()> {
    let cap: selection::Predicate<'_, super::types::CountryId> = &move |_s, id, picks| {
        let already = picks.iter().filter(|p| **p == *id).count() as u32;
        if already >= per_country {
            Err(format!("at most {per_country} from one country"))
        } else {
            Ok(())
        }
    };
    selection::select(
        chan,
        state,
        actor,
        "remove influence: country",
        budget,
        false,
        &[],
        |s, text| s.refs.country_id(text),
        |_, _| 1,
        &[cap],
        |s, id| s.country_mut(*id).remove_influence(from, 1).map(|_| ()),
    )?;
    Ok(())
}
