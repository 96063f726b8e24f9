//! Card zones. Cards themselves are immutable reference data; only their
//! location changes. Every move goes through `Zones`, which refuses to move
//! a card that is not where the caller claims — the card multiset is
//! conserved across any sequence of moves.

use super::types::{CardId, Faction};

/// Where a card copy can reside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Draw,
    Hand(Faction),
    Discard,
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Zones {
    pub draw: Vec<CardId>,
    pub hands: [Vec<CardId>; 2],
    pub discard: Vec<CardId>,
    pub removed: Vec<CardId>,
}

impl Zones {
    pub fn new() -> Self {
        Zones::default()
    }

    /// Bring cards into circulation (era release). The only operation that
    /// grows the multiset.
    pub fn release(&mut self, cards: &[CardId]) {
        self.draw.extend_from_slice(cards);
    }

    pub fn hand(&self, f: Faction) -> &[CardId] {
        &self.hands[f.idx()]
    }

    pub fn pile(&self, zone: Zone) -> &Vec<CardId> {
        match zone {
            Zone::Draw => &self.draw,
            Zone::Hand(f) => &self.hands[f.idx()],
            Zone::Discard => &self.discard,
            Zone::Removed => &self.removed,
        }
    }

    fn pile_mut(&mut self, zone: Zone) -> &mut Vec<CardId> {
        match zone {
            Zone::Draw => &mut self.draw,
            Zone::Hand(f) => &mut self.hands[f.idx()],
            Zone::Discard => &mut self.discard,
            Zone::Removed => &mut self.removed,
        }
    }

    /// Move one copy between zones. Error if the card is not in `from`.
    pub fn transfer(&mut self, card: CardId, from: Zone, to: Zone) -> Result<(), String> {
        let source = self.pile_mut(from);
        let pos = source
            .iter()
            .position(|c| *c == card)
            .ok_or_else(|| format!("card {} is not in {from:?}", card.0))?;
        source.remove(pos);
        self.pile_mut(to).push(card);
        Ok(())
    }

    /// Draw from the top of the draw pile into a hand.
    pub fn draw_top(&mut self, to: Faction) -> Option<CardId> {
        let card = self.draw.pop()?;
        self.hands[to.idx()].push(card);
        Some(card)
    }

    /// Move the whole discard pile back under the draw pile (reshuffle feed).
    pub fn recycle_discard(&mut self) -> Vec<CardId> {
        std::mem::take(&mut self.discard)
    }

    pub fn total(&self) -> usize {
        self.draw.len()
            + self.hands[0].len()
            + self.hands[1].len()
            + self.discard.len()
            + self.removed.len()
    }

    pub fn hand_contains(&self, f: Faction, card: CardId) -> bool {
        self.hands[f.idx()].contains(&card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_conserves_the_multiset() {
        let mut z = Zones::new();
        z.release(&[CardId(0), CardId(1), CardId(2)]);
        let total = z.total();

        z.draw_top(Faction::Usa).unwrap();
        z.transfer(CardId(2), Zone::Hand(Faction::Usa), Zone::Discard)
            .unwrap();
        z.transfer(CardId(2), Zone::Discard, Zone::Removed).unwrap();
        assert_eq!(z.total(), total);
    }

    #[test]
    fn transfer_from_wrong_zone_fails_without_mutation() {
        let mut z = Zones::new();
        z.release(&[CardId(0)]);
        let before = z.clone();
        assert!(z
            .transfer(CardId(0), Zone::Discard, Zone::Removed)
            .is_err());
        assert_eq!(z, before);
    }
}
