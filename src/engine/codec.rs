//! Token codec for structured log answers.
//!
//! Every record type used as a solicitation answer encodes to and decodes
//! from a flat sequence of whitespace-separated tokens; `[` and `]` delimit
//! lists. References (countries, cards) travel by name and are resolved
//! against the immutable reference table, never by index.

use super::reference::RefData;
use super::types::{CardId, CountryId, Faction};

/// Cursor over the tokens of one log line.
pub struct TokenReader<'a> {
    toks: Vec<&'a str>,
    pos: usize,
}

impl<'a> TokenReader<'a> {
    pub fn new(line: &'a str) -> Self {
        TokenReader {
            toks: line.split_whitespace().collect(),
            pos: 0,
        }
    }

    pub fn next_tok(&mut self) -> Result<&'a str, String> {
        let tok = self
            .toks
            .get(self.pos)
            .copied()
            .ok_or_else(|| "unexpected end of record".to_string())?;
        self.pos += 1;
        Ok(tok)
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.toks.get(self.pos).copied()
    }

    pub fn finished(&self) -> bool {
        self.pos == self.toks.len()
    }
}

/// Explicit per-record encode/decode contract. No runtime type inspection:
/// each field's encoding is the impl chosen at compile time. The reference
/// table resolves names in both directions.
pub trait Tokenize: Sized {
    fn encode(&self, refs: &RefData, out: &mut Vec<String>);
    fn decode(r: &mut TokenReader<'_>, refs: &RefData) -> Result<Self, String>;
}

pub fn encode_line<T: Tokenize>(value: &T, refs: &RefData) -> String {
    let mut out = Vec::new();
    value.encode(refs, &mut out);
    out.join(" ")
}

pub fn decode_line<T: Tokenize>(line: &str, refs: &RefData) -> Result<T, String> {
    let mut r = TokenReader::new(line);
    let value = T::decode(&mut r, refs)?;
    if !r.finished() {
        return Err(format!("trailing tokens in record {line:?}"));
    }
    Ok(value)
}

impl Tokenize for u32 {
    fn encode(&self, _refs: &RefData, out: &mut Vec<String>) {
        out.push(self.to_string());
    }

    fn decode(r: &mut TokenReader<'_>, _refs: &RefData) -> Result<Self, String> {
        let tok = r.next_tok()?;
        tok.parse::<u32>()
            .map_err(|_| format!("{tok:?} is not an unsigned integer"))
    }
}

impl Tokenize for i32 {
    fn encode(&self, _refs: &RefData, out: &mut Vec<String>) {
        out.push(self.to_string());
    }

    fn decode(r: &mut TokenReader<'_>, _refs: &RefData) -> Result<Self, String> {
        let tok = r.next_tok()?;
        tok.parse::<i32>()
            .map_err(|_| format!("{tok:?} is not an integer"))
    }
}

impl Tokenize for Faction {
    fn encode(&self, _refs: &RefData, out: &mut Vec<String>) {
        out.push(self.to_string());
    }

    fn decode(r: &mut TokenReader<'_>, _refs: &RefData) -> Result<Self, String> {
        Faction::parse(r.next_tok()?)
    }
}

impl Tokenize for CountryId {
    fn encode(&self, refs: &RefData, out: &mut Vec<String>) {
        out.push(refs.country_spec(*self).name.clone());
    }

    fn decode(r: &mut TokenReader<'_>, refs: &RefData) -> Result<Self, String> {
        refs.country_id(r.next_tok()?)
    }
}

impl Tokenize for CardId {
    fn encode(&self, refs: &RefData, out: &mut Vec<String>) {
        out.push(refs.card(*self).name.clone());
    }

    fn decode(r: &mut TokenReader<'_>, refs: &RefData) -> Result<Self, String> {
        refs.card_id(r.next_tok()?)
    }
}

impl<T: Tokenize> Tokenize for Vec<T> {
    fn encode(&self, refs: &RefData, out: &mut Vec<String>) {
        out.push("[".to_string());
        for item in self {
            item.encode(refs, out);
        }
        out.push("]".to_string());
    }

    fn decode(r: &mut TokenReader<'_>, refs: &RefData) -> Result<Self, String> {
        let open = r.next_tok()?;
        if open != "[" {
            return Err(format!("expected '[', found {open:?}"));
        }
        let mut items = Vec::new();
        loop {
            match r.peek() {
                Some("]") => {
                    let _ = r.next_tok();
                    return Ok(items);
                }
                Some(_) => items.push(T::decode(r, refs)?),
                None => return Err("unterminated list".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reference;

    #[test]
    fn scalar_round_trip() {
        let refs = reference::standard();
        assert_eq!(decode_line::<u32>(&encode_line(&7u32, &refs), &refs), Ok(7));
        assert_eq!(
            decode_line::<i32>(&encode_line(&-3i32, &refs), &refs),
            Ok(-3)
        );
        assert_eq!(decode_line::<Faction>("USSR", &refs), Ok(Faction::Ussr));
    }

    #[test]
    fn references_travel_by_name() {
        let refs = reference::standard();
        let id = refs.country_id("Poland").unwrap();
        assert_eq!(encode_line(&id, &refs), "Poland");
        let cards: Vec<CardId> = (0..4).map(CardId).collect();
        let line = encode_line(&cards, &refs);
        assert!(line.starts_with("[ "));
        let decoded: Vec<CardId> = decode_line(&line, &refs).unwrap();
        assert_eq!(decoded, cards);
    }

    #[test]
    fn rejects_trailing_tokens_and_bad_names() {
        let refs = reference::standard();
        assert!(decode_line::<u32>("4 5", &refs).is_err());
        assert!(decode_line::<Vec<CardId>>("[ NoSuchCard ]", &refs).is_err());
        assert!(decode_line::<Vec<CardId>>("[", &refs).is_err());
    }
}
