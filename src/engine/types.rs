use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

/// One of the two superpowers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Faction {
    Usa,
    Ussr,
}

impl Faction {
    pub fn all() -> [Faction; 2] {
        [Faction::Usa, Faction::Ussr]
    }

    pub fn opponent(self) -> Faction {
        match self {
            Faction::Usa => Faction::Ussr,
            Faction::Ussr => Faction::Usa,
        }
    }

    /// Index into per-faction arrays ([USA, USSR]).
    pub fn idx(self) -> usize {
        match self {
            Faction::Usa => 0,
            Faction::Ussr => 1,
        }
    }

    pub fn parse(token: &str) -> Result<Faction, String> {
        match token.to_ascii_lowercase().as_str() {
            "usa" | "us" => Ok(Faction::Usa),
            "ussr" => Ok(Faction::Ussr),
            other => Err(format!("unknown faction {other:?}")),
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Usa => write!(f, "USA"),
            Faction::Ussr => write!(f, "USSR"),
        }
    }
}

/// A pair of per-faction values, serialized with named fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ByFaction<T> {
    pub usa: T,
    pub ussr: T,
}

impl<T> ByFaction<T> {
    pub fn get(&self, f: Faction) -> &T {
        match f {
            Faction::Usa => &self.usa,
            Faction::Ussr => &self.ussr,
        }
    }

    pub fn get_mut(&mut self, f: Faction) -> &mut T {
        match f {
            Faction::Usa => &mut self.usa,
            Faction::Ussr => &mut self.ussr,
        }
    }
}

/// Geographic scoring regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Region {
    Europe,
    Asia,
    MiddleEast,
    Africa,
    CentralAmerica,
    SouthAmerica,
}

impl Region {
    pub fn all() -> [Region; 6] {
        [
            Region::Europe,
            Region::Asia,
            Region::MiddleEast,
            Region::Africa,
            Region::CentralAmerica,
            Region::SouthAmerica,
        ]
    }

    /// How tense the world must stay for coups and realignments here.
    /// A region is off-limits while its volatility meets or exceeds the
    /// current DEFCON level.
    pub fn volatility(self) -> u32 {
        match self {
            Region::Europe => 4,
            Region::Asia => 3,
            Region::MiddleEast => 2,
            Region::Africa | Region::CentralAmerica | Region::SouthAmerica => 1,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Region::Europe => "Europe",
            Region::Asia => "Asia",
            Region::MiddleEast => "MiddleEast",
            Region::Africa => "Africa",
            Region::CentralAmerica => "CentralAmerica",
            Region::SouthAmerica => "SouthAmerica",
        };
        write!(f, "{name}")
    }
}

/// Which deck a card belongs to, released into the draw pile at era start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Era {
    Early,
    Mid,
    Late,
}

/// Which faction a card or event favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Affinity {
    Usa,
    Ussr,
    Neutral,
}

impl Affinity {
    pub fn faction(self) -> Option<Faction> {
        match self {
            Affinity::Usa => Some(Faction::Usa),
            Affinity::Ussr => Some(Faction::Ussr),
            Affinity::Neutral => None,
        }
    }
}

/// Index into the reference country table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(crate = "rocket::serde")]
pub struct CountryId(pub usize);

/// Index into the reference card table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(crate = "rocket::serde")]
pub struct CardId(pub usize);

/// In-play event markers. Card rule text lives outside the core; these
/// markers are the effects the turn machine and the operations resolver
/// consult directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "effect")]
pub enum Effect {
    /// The owner's battleground coups no longer degrade DEFCON.
    DefconShield,
    /// The owner's controlled countries in the region cannot be couped or
    /// realigned.
    RegionPact { region: Region },
    /// The owner's cards count one extra operations point this turn.
    OpsBoost,
    /// One additional paired action round this turn.
    ExtraRound,
}

/// What a card's event does when resolved. `None` on a `CardSpec` means the
/// event has no effect the core models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "event")]
pub enum EventMark {
    /// Played in the headline: both committed cards are discarded unresolved.
    HeadlineCancel,
    /// Put a lasting effect into play for the resolving faction.
    GrantPermanent { effect: Effect },
    /// Put a this-turn-only effect into play for the resolving faction.
    GrantTurn { effect: Effect },
    /// Degrade DEFCON by one step.
    DefconDrop,
    /// Award victory points to the card's affinity faction.
    VpAward { amount: u32 },
}

/// Phase of the turn state machine, for the presentation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Phase {
    Setup,
    Headline,
    ActionRound,
    Housekeeping,
    Over,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum VictoryReason {
    VpThreshold,
    DefconCollapse,
    Concession,
    FinalScoring,
}

/// Terminal game result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "result")]
pub enum Outcome {
    Victory {
        winner: Faction,
        reason: VictoryReason,
    },
    Draw,
}
