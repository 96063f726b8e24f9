//! Immutable reference data: the country table, the adjacency graph, and the
//! card set. Constructed once at startup and passed by shared reference into
//! the game state and every component that needs lookup — never global
//! mutable state. Names are single tokens so they can travel through the
//! log's token grammar.

use super::map::Country;
use super::types::{Affinity, CardId, CountryId, Effect, Era, EventMark, Faction, Region};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CountrySpec {
    pub name: String,
    pub region: Region,
    pub stability: u32,
    pub battleground: bool,
    pub superpower: Option<Faction>,
    /// Starting influence, [USA, USSR].
    pub start: [u32; 2],
}

#[derive(Debug, Clone)]
pub struct CardSpec {
    pub name: String,
    pub affinity: Affinity,
    pub ops: u32,
    pub era: Era,
    pub event: Option<EventMark>,
    /// Star events leave the game after resolving.
    pub remove_after_event: bool,
    pub scoring: Option<Region>,
}

impl CardSpec {
    pub fn is_scoring(&self) -> bool {
        self.scoring.is_some()
    }
}

#[derive(Debug)]
pub struct RefData {
    countries: Vec<CountrySpec>,
    adjacency: Vec<Vec<CountryId>>,
    cards: Vec<CardSpec>,
    pivot: CardId,
    country_index: HashMap<String, CountryId>,
    card_index: HashMap<String, CardId>,
}

impl RefData {
    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn country_spec(&self, id: CountryId) -> &CountrySpec {
        &self.countries[id.0]
    }

    pub fn country_id(&self, name: &str) -> Result<CountryId, String> {
        self.country_index
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| format!("unknown country {name:?}"))
    }

    pub fn cards(&self) -> &[CardSpec] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> &CardSpec {
        &self.cards[id.0]
    }

    pub fn card_id(&self, name: &str) -> Result<CardId, String> {
        self.card_index
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| format!("unknown card {name:?}"))
    }

    /// The privileged always-in-play card. Lives outside the five zones.
    pub fn pivot(&self) -> CardId {
        self.pivot
    }

    /// Deck cards released at the given era's start (the pivot is not dealt).
    pub fn era_release(&self, era: Era) -> Vec<CardId> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(i, c)| c.era == era && CardId(*i) != self.pivot)
            .map(|(i, _)| CardId(i))
            .collect()
    }

    /// Materialize the mutable country map from the static table.
    pub fn build_map(&self) -> Vec<Country> {
        self.countries
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                Country::new(
                    CountryId(i),
                    spec.name.clone(),
                    spec.region,
                    spec.stability,
                    spec.battleground,
                    spec.superpower,
                    self.adjacency[i].clone(),
                    spec.start,
                )
            })
            .collect()
    }
}

struct RefBuilder {
    countries: Vec<CountrySpec>,
    edges: Vec<(String, String)>,
    cards: Vec<CardSpec>,
}

impl RefBuilder {
    fn country(
        &mut self,
        name: &str,
        region: Region,
        stability: u32,
        battleground: bool,
        superpower: Option<Faction>,
        start: [u32; 2],
    ) {
        self.countries.push(CountrySpec {
            name: name.to_string(),
            region,
            stability,
            battleground,
            superpower,
            start,
        });
    }

    fn edge(&mut self, a: &str, b: &str) {
        self.edges.push((a.to_string(), b.to_string()));
    }

    fn card(
        &mut self,
        name: &str,
        affinity: Affinity,
        ops: u32,
        era: Era,
        event: Option<EventMark>,
        remove_after_event: bool,
    ) {
        self.cards.push(CardSpec {
            name: name.to_string(),
            affinity,
            ops,
            era,
            event,
            remove_after_event,
            scoring: None,
        });
    }

    fn scoring_card(&mut self, name: &str, era: Era, region: Region) {
        self.cards.push(CardSpec {
            name: name.to_string(),
            affinity: Affinity::Neutral,
            ops: 0,
            era,
            event: None,
            remove_after_event: false,
            scoring: Some(region),
        });
    }

    fn finish(self, pivot_name: &str) -> RefData {
        let country_index: HashMap<String, CountryId> = self
            .countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_ascii_lowercase(), CountryId(i)))
            .collect();
        let card_index: HashMap<String, CardId> = self
            .cards
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_ascii_lowercase(), CardId(i)))
            .collect();
        assert_eq!(
            country_index.len(),
            self.countries.len(),
            "duplicate country name in reference data"
        );
        assert_eq!(
            card_index.len(),
            self.cards.len(),
            "duplicate card name in reference data"
        );

        let mut adjacency = vec![Vec::new(); self.countries.len()];
        for (a, b) in &self.edges {
            let ia = country_index[&a.to_ascii_lowercase()];
            let ib = country_index[&b.to_ascii_lowercase()];
            adjacency[ia.0].push(ib);
            adjacency[ib.0].push(ia);
        }

        let pivot = card_index[&pivot_name.to_ascii_lowercase()];
        RefData {
            countries: self.countries,
            adjacency,
            cards: self.cards,
            pivot,
            country_index,
            card_index,
        }
    }
}

/// The standard map and deck.
pub fn standard() -> RefData {
    use Affinity::{Neutral, Ussr as R, Usa as U};
    use Era::{Early, Late, Mid};
    use Region::*;

    let mut b = RefBuilder {
        countries: Vec::new(),
        edges: Vec::new(),
        cards: Vec::new(),
    };

    // Countries: name, region, stability, battleground, superpower border,
    // starting influence [USA, USSR].
    b.country("Canada", Europe, 4, false, Some(Faction::Usa), [2, 0]);
    b.country("UnitedKingdom", Europe, 5, false, None, [5, 0]);
    b.country("France", Europe, 3, true, None, [0, 0]);
    b.country("WestGermany", Europe, 4, true, None, [0, 0]);
    b.country("EastGermany", Europe, 3, true, None, [0, 3]);
    b.country("Poland", Europe, 3, true, Some(Faction::Ussr), [0, 2]);
    b.country("Italy", Europe, 2, true, None, [0, 0]);
    b.country("Finland", Europe, 4, false, Some(Faction::Ussr), [0, 1]);

    b.country("Japan", Asia, 4, true, Some(Faction::Usa), [1, 0]);
    b.country("SouthKorea", Asia, 3, true, None, [1, 0]);
    b.country("NorthKorea", Asia, 3, true, Some(Faction::Ussr), [0, 3]);
    b.country("India", Asia, 3, true, None, [0, 0]);
    b.country("Pakistan", Asia, 2, true, None, [0, 0]);
    b.country("Thailand", Asia, 2, true, None, [0, 0]);
    b.country("Afghanistan", Asia, 2, false, Some(Faction::Ussr), [0, 0]);

    b.country("Israel", MiddleEast, 4, true, None, [1, 0]);
    b.country("Egypt", MiddleEast, 2, true, None, [0, 0]);
    b.country("Iran", MiddleEast, 2, true, None, [1, 0]);
    b.country("Iraq", MiddleEast, 3, true, None, [0, 1]);
    b.country("Syria", MiddleEast, 2, false, None, [0, 1]);

    b.country("Nigeria", Africa, 1, true, None, [0, 0]);
    b.country("Zaire", Africa, 1, true, None, [0, 0]);
    b.country("Angola", Africa, 1, true, None, [0, 0]);
    b.country("SouthAfrica", Africa, 3, true, None, [1, 0]);

    b.country("Cuba", CentralAmerica, 3, true, Some(Faction::Usa), [0, 0]);
    b.country("Mexico", CentralAmerica, 2, true, Some(Faction::Usa), [0, 0]);
    b.country("Panama", CentralAmerica, 2, true, None, [1, 0]);
    b.country("Nicaragua", CentralAmerica, 1, false, None, [0, 0]);

    b.country("Venezuela", SouthAmerica, 2, true, None, [0, 0]);
    b.country("Brazil", SouthAmerica, 2, true, None, [0, 0]);
    b.country("Argentina", SouthAmerica, 2, true, None, [0, 0]);

    b.edge("Canada", "UnitedKingdom");
    b.edge("UnitedKingdom", "France");
    b.edge("France", "WestGermany");
    b.edge("France", "Italy");
    b.edge("WestGermany", "EastGermany");
    b.edge("EastGermany", "Poland");
    b.edge("Poland", "Finland");
    b.edge("Egypt", "Israel");
    b.edge("Israel", "Syria");
    b.edge("Syria", "Iraq");
    b.edge("Iraq", "Iran");
    b.edge("Iran", "Afghanistan");
    b.edge("Iran", "Pakistan");
    b.edge("Pakistan", "India");
    b.edge("India", "Thailand");
    b.edge("Japan", "SouthKorea");
    b.edge("SouthKorea", "NorthKorea");
    b.edge("Egypt", "Nigeria");
    b.edge("Nigeria", "Zaire");
    b.edge("Zaire", "Angola");
    b.edge("Angola", "SouthAfrica");
    b.edge("Cuba", "Nicaragua");
    b.edge("Nicaragua", "Panama");
    b.edge("Mexico", "Panama");
    b.edge("Panama", "Venezuela");
    b.edge("Venezuela", "Brazil");
    b.edge("Brazil", "Argentina");

    // Early deck.
    b.scoring_card("EuropeScoring", Early, Europe);
    b.scoring_card("AsiaScoring", Early, Asia);
    b.scoring_card("MiddleEastScoring", Early, MiddleEast);
    b.card(
        "Turncoats",
        U,
        2,
        Early,
        Some(EventMark::HeadlineCancel),
        false,
    );
    b.card(
        "AtlanticTreaty",
        U,
        4,
        Early,
        Some(EventMark::GrantPermanent {
            effect: Effect::RegionPact { region: Europe },
        }),
        true,
    );
    b.card(
        "BorderClash",
        Neutral,
        1,
        Early,
        Some(EventMark::DefconDrop),
        false,
    );
    b.card(
        "CulturalOffensive",
        R,
        2,
        Early,
        Some(EventMark::VpAward { amount: 1 }),
        false,
    );
    b.card("TradeMission", Neutral, 2, Early, None, false);
    b.card("ArmsShipment", Neutral, 3, Early, None, false);
    b.card("PropagandaBlitz", R, 2, Early, None, false);
    b.card("ForeignAid", U, 2, Early, None, false);
    b.card("CovertAction", Neutral, 1, Early, None, false);
    b.card("NavalPatrol", U, 1, Early, None, false);
    b.card("BorderGarrison", R, 1, Early, None, false);
    b.card("FishingDispute", Neutral, 1, Early, None, false);
    b.card("YouthFestival", R, 2, Early, None, false);
    b.card("ReliefFund", U, 3, Early, None, false);
    // The privileged always-in-play card; never shuffled into the draw pile.
    b.card("NonAlignedBloc", Neutral, 4, Early, None, false);

    // Mid-war additions.
    b.scoring_card("AfricaScoring", Mid, Africa);
    b.scoring_card("CentralAmericaScoring", Mid, CentralAmerica);
    b.card(
        "SilentRunning",
        U,
        2,
        Mid,
        Some(EventMark::GrantPermanent {
            effect: Effect::DefconShield,
        }),
        true,
    );
    b.card(
        "CrashProgram",
        Neutral,
        2,
        Mid,
        Some(EventMark::GrantTurn {
            effect: Effect::OpsBoost,
        }),
        true,
    );
    b.card(
        "OlympicBoycott",
        Neutral,
        2,
        Mid,
        Some(EventMark::VpAward { amount: 2 }),
        false,
    );
    b.card("ProxyWar", Neutral, 3, Mid, None, false);
    b.card("SummitTalks", Neutral, 4, Mid, None, false);
    b.card("OilShock", R, 3, Mid, None, false);
    b.card("TechnologyTransfer", U, 3, Mid, None, false);

    // Late-war additions.
    b.scoring_card("SouthAmericaScoring", Late, SouthAmerica);
    b.card(
        "Mobilization",
        R,
        3,
        Late,
        Some(EventMark::GrantTurn {
            effect: Effect::ExtraRound,
        }),
        true,
    );
    b.card("ReformWave", R, 3, Late, None, false);
    b.card("MediaOffensive", U, 3, Late, None, false);
    b.card("DebtCrisis", Neutral, 2, Late, None, false);

    b.finish("NonAlignedBloc")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_resolve_by_name_case_insensitively() {
        let refs = standard();
        let id = refs.country_id("westgermany").unwrap();
        assert_eq!(refs.country_spec(id).name, "WestGermany");
        assert!(refs.country_id("Atlantis").is_err());
        assert!(refs.card_id("tradeMISSION").is_ok());
    }

    #[test]
    fn adjacency_is_undirected() {
        let refs = standard();
        let map = refs.build_map();
        for c in &map {
            for n in &c.adjacency {
                assert!(
                    map[n.0].adjacency.contains(&c.id),
                    "{} -> {} is one-way",
                    c.name,
                    map[n.0].name
                );
            }
        }
    }

    #[test]
    fn pivot_is_not_released_with_any_era() {
        let refs = standard();
        for era in [Era::Early, Era::Mid, Era::Late] {
            assert!(!refs.era_release(era).contains(&refs.pivot()));
        }
    }
}
