use std::borrow::Cow;

use quick_xml::escape::{unescape, unescape_with, EscapeError};
use rustc_hash::FxHashMap;

const ENTITY_DECL: &str = "<!ENTITY";

/// General entities declared in the internal subset of a document type
/// declaration. External and parameter entities are not supported and are
/// skipped.
#[derive(Debug, Default)]
pub struct EntityTable {
    entities: FxHashMap<String, String>,
}

impl EntityTable {
    /// Collects the `<!ENTITY name "value">` declarations from the content of
    /// a `<!DOCTYPE ...>`. If an entity is declared more than once, the first
    /// declaration is binding.
    pub fn declare_from(&mut self, doctype: &str) {
        let mut rest = doctype;
        while let Some(i) = rest.find(ENTITY_DECL) {
            rest = rest[i + ENTITY_DECL.len()..].trim_start();

            // parameter entity
            if rest.starts_with('%') {
                continue;
            }

            let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (name, after) = rest.split_at(name_end);
            let after = after.trim_start();

            // external entities (SYSTEM or PUBLIC) have no literal value
            let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                rest = after;
                continue;
            };
            let Some(len) = after[1..].find(quote) else {
                break;
            };
            let value = &after[1..1 + len];
            rest = &after[len + 2..];

            if name.is_empty() {
                continue;
            }

            // character references in the literal are replaced right away
            let value = match unescape(value) {
                Ok(v) => v.into_owned(),
                Err(_) => value.to_string(),
            };
            self.entities.entry(name.to_string()).or_insert(value);
        }
    }

    /// Returns the replacement text of the entity with the given name.
    /// The five predefined entities are always known.
    pub fn get(&self, name: &str) -> Option<&str> {
        let predefined = match name {
            "lt" => Some("<"),
            "gt" => Some(">"),
            "amp" => Some("&"),
            "apos" => Some("'"),
            "quot" => Some("\""),
            _ => None,
        };
        predefined.or_else(|| self.entities.get(name).map(String::as_str))
    }

    /// Returns the number of declared entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Replaces predefined, declared and character references in `raw`
    pub fn unescape<'r>(&self, raw: &'r str) -> Result<Cow<'r, str>, EscapeError> {
        unescape_with(raw, |name| self.get(name))
    }
}
