//! Countries and the influence map. Countries are built once from the
//! reference table at game start and never destroyed; only the influence
//! vector mutates. Control is derived, never stored.

use super::types::{ByFaction, CountryId, Faction, Region};
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

#[derive(Debug, Clone)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub region: Region,
    pub stability: u32,
    pub battleground: bool,
    /// The superpower this country borders, if any.
    pub superpower: Option<Faction>,
    /// Undirected adjacency, resolved once from the reference edge list.
    pub adjacency: Vec<CountryId>,
    influence: [u32; 2],
}

impl Country {
    pub fn new(
        id: CountryId,
        name: String,
        region: Region,
        stability: u32,
        battleground: bool,
        superpower: Option<Faction>,
        adjacency: Vec<CountryId>,
        influence: [u32; 2],
    ) -> Self {
        Country {
            id,
            name,
            region,
            stability,
            battleground,
            superpower,
            adjacency,
            influence,
        }
    }

    pub fn influence(&self, f: Faction) -> u32 {
        self.influence[f.idx()]
    }

    /// A faction controls a country iff its influence exceeds the opponent's
    /// by at least the stability rating.
    pub fn controller(&self) -> Option<Faction> {
        for f in Faction::all() {
            if self.influence(f) >= self.influence(f.opponent()) + self.stability {
                return Some(f);
            }
        }
        None
    }

    pub fn controlled_by(&self, f: Faction) -> bool {
        self.controller() == Some(f)
    }

    pub fn add_influence(&mut self, f: Faction, amount: u32) {
        self.influence[f.idx()] += amount;
    }

    /// Remove up to `amount`, reporting how much actually came off. A domain
    /// error if there is nothing of that faction's to remove.
    pub fn remove_influence(&mut self, f: Faction, amount: u32) -> Result<u32, String> {
        let present = self.influence[f.idx()];
        if present == 0 {
            return Err(format!("no {f} influence in {} to remove", self.name));
        }
        let removed = present.min(amount);
        self.influence[f.idx()] = present - removed;
        Ok(removed)
    }

    pub fn double_influence(&mut self, f: Faction) -> Result<(), String> {
        let present = self.influence[f.idx()];
        if present == 0 {
            return Err(format!("no {f} influence in {} to double", self.name));
        }
        self.influence[f.idx()] = present * 2;
        Ok(())
    }

    pub fn zero_influence(&mut self, f: Faction) -> Result<(), String> {
        if self.influence[f.idx()] == 0 {
            return Err(format!("no {f} influence in {} to clear", self.name));
        }
        self.influence[f.idx()] = 0;
        Ok(())
    }

    /// Raise `f`'s influence to match the opponent's.
    pub fn match_influence(&mut self, f: Faction) -> Result<(), String> {
        let other = self.influence[f.opponent().idx()];
        if self.influence[f.idx()] >= other {
            return Err(format!("{f} already matches or leads in {}", self.name));
        }
        self.influence[f.idx()] = other;
        Ok(())
    }

    pub fn view(&self) -> CountryView {
        CountryView {
            name: self.name.clone(),
            region: self.region,
            stability: self.stability,
            battleground: self.battleground,
            influence: ByFaction {
                usa: self.influence(Faction::Usa),
                ussr: self.influence(Faction::Ussr),
            },
            controller: self.controller(),
        }
    }
}

/// Serializable snapshot of one country for the presentation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CountryView {
    pub name: String,
    pub region: Region,
    pub stability: u32,
    pub battleground: bool,
    pub influence: ByFaction<u32>,
    pub controller: Option<Faction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(stability: u32, usa: u32, ussr: u32) -> Country {
        Country::new(
            CountryId(0),
            "Testland".to_string(),
            Region::Africa,
            stability,
            false,
            None,
            Vec::new(),
            [usa, ussr],
        )
    }

    #[test]
    fn control_requires_margin_at_least_stability() {
        assert_eq!(country(2, 3, 0).controller(), Some(Faction::Usa));
        assert_eq!(country(2, 2, 1).controller(), None);
        assert_eq!(country(1, 2, 3).controller(), Some(Faction::Ussr));
    }

    #[test]
    fn influence_mutations_report_domain_errors() {
        let mut c = country(2, 0, 3);
        assert!(c.remove_influence(Faction::Usa, 1).is_err());
        assert_eq!(c.remove_influence(Faction::Ussr, 5), Ok(3));
        assert!(c.double_influence(Faction::Ussr).is_err());

        let mut c = country(2, 1, 4);
        c.match_influence(Faction::Usa).unwrap();
        assert_eq!(c.influence(Faction::Usa), 4);
        assert!(c.match_influence(Faction::Usa).is_err());
        c.zero_influence(Faction::Ussr).unwrap();
        assert_eq!(c.influence(Faction::Ussr), 0);
    }
}
