//! Taunt message catalog.
//!
//! One entry per line in `{id}{sound}{text}` form; lines starting with `#`
//! and anything outside braces are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::TauntEvent;

use crate::loaders::{LoadResult, read_file};

#[derive(Clone, Debug, Default)]
pub struct MessageCatalog {
    entries: BTreeMap<i32, String>,
    bad_words: Vec<String>,
}

impl MessageCatalog {
    pub fn load(path: &Path) -> LoadResult<Self> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load messages {}: {}", path.display(), e))
    }

    pub fn parse(source: &str) -> LoadResult<Self> {
        let mut entries = BTreeMap::new();

        for (number, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields = braced_fields(line);
            let [id, _sound, text] = fields.as_slice() else {
                anyhow::bail!("line {}: expected {{id}}{{sound}}{{text}}", number + 1);
            };
            let id: i32 = id
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("line {}: bad message id '{}'", number + 1, id))?;
            if entries.insert(id, (*text).to_string()).is_some() {
                tracing::warn!("duplicate message id {}", id);
            }
        }

        Ok(Self {
            entries,
            bad_words: Vec::new(),
        })
    }

    /// Words masked when the language filter is on.
    #[must_use]
    pub fn with_bad_words(mut self, words: impl IntoIterator<Item = String>) -> Self {
        self.bad_words = words
            .into_iter()
            .map(|word| word.trim().to_ascii_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Text for a taunt, censored if the event asks for it.
    pub fn render(&self, event: &TauntEvent) -> Option<String> {
        let text = self.get(event.message_id)?;
        if !event.filtered {
            return Some(text.to_string());
        }
        Some(
            text.split(' ')
                .map(|word| {
                    let bare = word
                        .trim_matches(|c: char| !c.is_alphanumeric())
                        .to_ascii_lowercase();
                    if self.bad_words.contains(&bare) {
                        "*".repeat(word.len())
                    } else {
                        word.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

fn braced_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        fields.push(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
    }
    fields
}

#[cfg(test)]
mod tests {
    use combat_core::{CombatantId, MessageKind};

    use super::*;

    fn event(message_id: i32, filtered: bool) -> TauntEvent {
        TauntEvent {
            speaker: CombatantId(4),
            kind: MessageKind::Attack,
            message_id,
            font: 101,
            color: 0,
            outline_color: 0,
            filtered,
        }
    }

    #[test]
    fn parses_entries_and_skips_comments() {
        let catalog =
            MessageCatalog::parse("# taunts\n{100}{}{Die, scum!}\n{101}{snd}{Eat lead!}\n")
                .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(101), Some("Eat lead!"));
    }

    #[test]
    fn filter_masks_listed_words() {
        let catalog = MessageCatalog::parse("{5}{}{Die, scum!}")
            .unwrap()
            .with_bad_words(["Scum".to_string()]);
        assert_eq!(catalog.render(&event(5, false)).as_deref(), Some("Die, scum!"));
        assert_eq!(catalog.render(&event(5, true)).as_deref(), Some("Die, *****"));
        assert_eq!(catalog.render(&event(6, true)), None);
    }

    #[test]
    fn malformed_line_is_rejected() {
        assert!(MessageCatalog::parse("{abc}{}{text}").is_err());
        assert!(MessageCatalog::parse("{100}{text}").is_err());
    }
}
