//! The solicitation channel: the single choke point through which every
//! decision flows. In replay mode answers come from the input log without
//! touching the live side; in live mode they come from the actor and are
//! appended to the log before anyone sees them — validation happens above
//! this layer, so rejected answers are part of history and replay
//! identically.

use super::codec;
use super::game_state::GameView;
use super::input_log::InputLog;
use super::reference::RefData;
use super::types::{CardId, Faction};
use super::{EngineError, EngineResult};
use rand::Rng;
use rand_pcg::Lcg64Xsh32;
use std::collections::VecDeque;

/// A source of live decisions: a terminal, a network session, a test script.
/// Never invoked during replay. Implementations must not validate answers —
/// that is the selection engine's job one layer up.
pub trait Actor: Send {
    fn solicit(&mut self, actor: Faction, prompt: &str, hints: &[String]) -> EngineResult<String>;

    /// Informational, one-way, fire-and-forget.
    fn message(&mut self, actor: Faction, text: &str);
}

/// Presentation boundary: invoked after state-changing operations with a full
/// snapshot. The core assumes nothing about what it does and never blocks on
/// it.
pub trait Presenter: Send {
    fn redraw(&self, view: &GameView);
}

/// Presenter that drops every snapshot, for engine-level tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn redraw(&self, _view: &GameView) {}
}

/// One answer, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub replayed: bool,
}

/// Couples the input log with the live actor and the RNG. The RNG feeds only
/// the live paths (`roll_die`, `shuffled`); what it produced is logged as a
/// value, so replay never re-rolls.
pub struct Channel {
    log: InputLog,
    live: Box<dyn Actor>,
    rng: Lcg64Xsh32,
}

impl Channel {
    pub fn new(log: InputLog, live: Box<dyn Actor>, rng: Lcg64Xsh32) -> Self {
        Channel { log, live, rng }
    }

    pub fn log(&self) -> &InputLog {
        &self.log
    }

    pub fn in_replay(&self) -> bool {
        self.log.in_replay()
    }

    /// Mark the current position as an undo boundary.
    pub fn commit(&self) {
        self.log.commit();
    }

    pub fn solicit(
        &mut self,
        actor: Faction,
        prompt: &str,
        hints: &[String],
    ) -> EngineResult<Answer> {
        if self.log.in_replay() {
            let text = self.log.next().ok_or(EngineError::LogExhausted {
                position: self.log.position(),
            })?;
            return Ok(Answer {
                text,
                replayed: true,
            });
        }
        let text = self.live.solicit(actor, prompt, hints)?;
        let text = text.trim().to_string();
        self.log.append(&text)?;
        Ok(Answer {
            text,
            replayed: false,
        })
    }

    /// Suppressed during replay: a live audience should not see history
    /// re-flushed while the engine fast-forwards.
    pub fn message(&mut self, actor: Faction, text: &str) {
        if self.log.in_replay() {
            return;
        }
        self.live.message(actor, text);
    }

    /// A die roll is a solicitation whose live source is the RNG. The drawn
    /// value is logged once and never re-rolled on replay.
    pub fn roll_die(&mut self, actor: Faction, label: &str) -> EngineResult<u32> {
        if self.log.in_replay() {
            let position = self.log.position();
            let entry = self.log.next().ok_or(EngineError::LogExhausted { position })?;
            return entry
                .parse::<u32>()
                .ok()
                .filter(|v| (1..=6).contains(v))
                .ok_or(EngineError::MalformedLogEntry {
                    position,
                    entry,
                    expected: "die roll 1-6",
                });
        }
        let roll: u32 = self.rng.gen_range(1..=6);
        self.log.append(&roll.to_string())?;
        self.live.message(actor, &format!("{label}: rolled {roll}"));
        Ok(roll)
    }

    /// Shuffle a pile and log the resulting order — never the seed, so the
    /// log alone reproduces the deck.
    pub fn shuffled(&mut self, mut cards: Vec<CardId>, refs: &RefData) -> EngineResult<Vec<CardId>> {
        if self.log.in_replay() {
            let position = self.log.position();
            let entry = self.log.next().ok_or(EngineError::LogExhausted { position })?;
            let order: Vec<CardId> = match codec::decode_line(&entry, refs) {
                Ok(order) => order,
                Err(_) => {
                    return Err(EngineError::MalformedLogEntry {
                        position,
                        entry,
                        expected: "card list",
                    })
                }
            };
            let mut expected = cards.clone();
            let mut got = order.clone();
            expected.sort();
            got.sort();
            if expected != got {
                return Err(EngineError::MalformedLogEntry {
                    position,
                    entry,
                    expected: "permutation of the shuffled pile",
                });
            }
            return Ok(order);
        }
        use rand::seq::SliceRandom;
        cards.shuffle(&mut self.rng);
        self.log.append(&codec::encode_line(&cards, refs))?;
        Ok(cards)
    }
}

/// Actor that replays a canned script; used by tests and useful for bots.
/// Exhausting the script closes the channel.
#[derive(Debug, Default)]
pub struct ScriptedActor {
    script: VecDeque<String>,
    pub messages: Vec<(Faction, String)>,
}

impl ScriptedActor {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedActor {
            script: answers.into_iter().map(Into::into).collect(),
            messages: Vec::new(),
        }
    }
}

impl Actor for ScriptedActor {
    fn solicit(&mut self, _actor: Faction, _prompt: &str, _hints: &[String]) -> EngineResult<String> {
        self.script.pop_front().ok_or(EngineError::ChannelClosed)
    }

    fn message(&mut self, actor: Faction, text: &str) {
        self.messages.push((actor, text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reference;
    use rand::SeedableRng;

    fn channel_with(log: InputLog, script: &[&str]) -> Channel {
        Channel::new(
            log,
            Box::new(ScriptedActor::new(script.iter().copied())),
            Lcg64Xsh32::seed_from_u64(7),
        )
    }

    #[test]
    fn live_answers_are_logged_then_replayed() {
        let mut chan = channel_with(InputLog::new(), &["Cuba", "done"]);
        let a = chan.solicit(Faction::Ussr, "target", &[]).unwrap();
        assert_eq!(a.text, "Cuba");
        assert!(!a.replayed);

        let replay = InputLog::from_entries(chan.log().entries());
        let mut chan2 = channel_with(replay, &[]);
        let b = chan2.solicit(Faction::Ussr, "target", &[]).unwrap();
        assert_eq!(b.text, "Cuba");
        assert!(b.replayed);
    }

    #[test]
    fn die_rolls_replay_as_logged_values() {
        let mut chan = channel_with(InputLog::new(), &[]);
        let roll = chan.roll_die(Faction::Usa, "coup").unwrap();
        assert!((1..=6).contains(&roll));

        let mut chan2 = channel_with(InputLog::from_entries(chan.log().entries()), &[]);
        assert_eq!(chan2.roll_die(Faction::Usa, "coup").unwrap(), roll);
    }

    #[test]
    fn corrupt_roll_entry_is_fatal_on_replay() {
        let mut chan = channel_with(InputLog::from_entries(vec!["eleven".into()]), &[]);
        assert!(matches!(
            chan.roll_die(Faction::Usa, "coup"),
            Err(EngineError::MalformedLogEntry { position: 0, .. })
        ));
    }

    #[test]
    fn shuffle_logs_the_order_not_the_seed() {
        let refs = reference::standard();
        let pile: Vec<_> = (0..6).map(crate::engine::types::CardId).collect();

        let mut chan = channel_with(InputLog::new(), &[]);
        let order = chan.shuffled(pile.clone(), &refs).unwrap();

        // A differently seeded channel still reproduces the order from the log.
        let mut chan2 = Channel::new(
            InputLog::from_entries(chan.log().entries()),
            Box::new(ScriptedActor::new(Vec::<String>::new())),
            Lcg64Xsh32::seed_from_u64(999),
        );
        assert_eq!(chan2.shuffled(pile, &refs).unwrap(), order);
    }
}
