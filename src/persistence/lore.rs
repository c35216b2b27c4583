//! Lore records and codex
//!
//! The lore store is an external collaborator with two operations:
//! list everything (oldest first) and create one record. A record is unique
//! by (title, content, biome); creating a duplicate is a conflict, which the
//! game treats as "already discovered" rather than an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::LoreDiscovery;

/// A persisted lore record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoreEntry {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub biome: String,
    /// ISO-8601 timestamp; lexicographic order is chronological
    pub discovered_at: String,
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewLore {
    pub title: String,
    pub content: String,
    pub biome: String,
}

impl From<LoreDiscovery> for NewLore {
    fn from(discovery: LoreDiscovery) -> Self {
        Self {
            title: discovery.title.to_string(),
            content: discovery.content.to_string(),
            biome: discovery.biome.to_string(),
        }
    }
}

impl NewLore {
    fn matches(&self, entry: &LoreEntry) -> bool {
        self.title == entry.title && self.content == entry.content && self.biome == entry.biome
    }
}

#[derive(Debug, Error)]
pub enum LoreError {
    #[error("lore fragment already discovered")]
    Conflict,
    #[error("lore endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid lore payload: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("could not encode lore: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Synchronous lore store
pub trait LoreStore {
    /// All records, oldest discovery first
    fn list_lore(&self) -> Result<Vec<LoreEntry>, LoreError>;
    /// Persist a discovery; `LoreError::Conflict` if it already exists
    fn create_lore(&mut self, lore: &NewLore) -> Result<LoreEntry, LoreError>;
}

/// In-process store with the same contract as the HTTP endpoint
#[derive(Debug, Clone, Default)]
pub struct MemoryLoreStore {
    entries: Vec<LoreEntry>,
    next_id: u64,
    clock_ms: u64,
}

impl MemoryLoreStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            clock_ms: 0,
        }
    }

    /// Timestamp (unix ms) stamped on the next created record
    pub fn set_clock(&mut self, now_ms: u64) {
        self.clock_ms = now_ms;
    }
}

impl LoreStore for MemoryLoreStore {
    fn list_lore(&self) -> Result<Vec<LoreEntry>, LoreError> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.discovered_at.cmp(&b.discovered_at));
        Ok(entries)
    }

    fn create_lore(&mut self, lore: &NewLore) -> Result<LoreEntry, LoreError> {
        if self.entries.iter().any(|e| lore.matches(e)) {
            return Err(LoreError::Conflict);
        }
        let entry = LoreEntry {
            id: self.next_id.max(1),
            title: lore.title.clone(),
            content: lore.content.clone(),
            biome: lore.biome.clone(),
            discovered_at: iso8601_from_millis(self.clock_ms),
        };
        self.next_id = entry.id + 1;
        self.entries.push(entry.clone());
        Ok(entry)
    }
}

/// Interpret a `GET` response from the lore endpoint
pub fn parse_list_response(status: u16, body: &str) -> Result<Vec<LoreEntry>, LoreError> {
    if !(200..300).contains(&status) {
        return Err(LoreError::Status {
            status,
            body: body.to_string(),
        });
    }
    let mut entries: Vec<LoreEntry> = serde_json::from_str(body).map_err(LoreError::Decode)?;
    entries.sort_by(|a, b| a.discovered_at.cmp(&b.discovered_at));
    Ok(entries)
}

/// Interpret a `POST` response from the lore endpoint
pub fn parse_create_response(status: u16, body: &str) -> Result<LoreEntry, LoreError> {
    match status {
        200 | 201 => serde_json::from_str(body).map_err(LoreError::Decode),
        409 => Err(LoreError::Conflict),
        _ => Err(LoreError::Status {
            status,
            body: body.to_string(),
        }),
    }
}

/// Result of trying to persist a discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    AlreadyKnown,
    Failed,
}

/// Discovered lore shown on the game-over screen
///
/// Only holds records the store confirmed. The in-run pickup counter is
/// optimistic and never rolled back when a save fails.
#[derive(Debug, Clone, Default)]
pub struct Codex {
    entries: Vec<LoreEntry>,
}

impl Codex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the result of the startup fetch
    pub fn record_fetch(&mut self, result: Result<Vec<LoreEntry>, LoreError>) {
        match result {
            Ok(mut entries) => {
                entries.sort_by(|a, b| a.discovered_at.cmp(&b.discovered_at));
                log::info!("Loaded {} lore entries", entries.len());
                self.entries = entries;
            }
            Err(err) => log::error!("Failed to fetch lore: {err}"),
        }
    }

    /// Apply the result of saving one discovery
    pub fn record_save(&mut self, result: Result<LoreEntry, LoreError>) -> SaveOutcome {
        match result {
            Ok(entry) => {
                log::info!("Lore discovered: {} ({})", entry.title, entry.biome);
                let at = self
                    .entries
                    .partition_point(|e| e.discovered_at <= entry.discovered_at);
                self.entries.insert(at, entry);
                SaveOutcome::Created
            }
            Err(LoreError::Conflict) => {
                log::debug!("Lore already discovered");
                SaveOutcome::AlreadyKnown
            }
            Err(err) => {
                log::error!("Error saving lore: {err}");
                SaveOutcome::Failed
            }
        }
    }
}

/// Format unix milliseconds as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn iso8601_from_millis(ms: u64) -> String {
    let millis = ms % 1000;
    let secs = ms / 1000;
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (hour, minute, second) = (rem / 3600, (rem % 3600) / 60, rem % 60);

    // Civil date from days since 1970-01-01
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };

    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{millis:03}Z")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> NewLore {
        NewLore::from(LoreDiscovery {
            title: "Mirage of Time",
            content: "Travelers speak of seeing cities in the sand that were never there.",
            biome: "Desert of Illusions",
        })
    }

    fn entry(id: u64, title: &str, at: &str) -> LoreEntry {
        LoreEntry {
            id,
            title: title.to_string(),
            content: String::new(),
            biome: "Deep Jungle".to_string(),
            discovered_at: at.to_string(),
        }
    }

    #[test]
    fn test_memory_store_conflicts_on_duplicate() {
        let mut store = MemoryLoreStore::new();
        let created = store.create_lore(&discovery()).unwrap();
        assert_eq!(created.id, 1);
        assert!(matches!(
            store.create_lore(&discovery()),
            Err(LoreError::Conflict)
        ));
        assert_eq!(store.list_lore().unwrap().len(), 1);
    }

    #[test]
    fn test_memory_store_lists_oldest_first() {
        let mut store = MemoryLoreStore::new();
        store.set_clock(2_000);
        store.create_lore(&discovery()).unwrap();
        store.set_clock(1_000);
        let mut other = discovery();
        other.title = "The Long Winter".to_string();
        store.create_lore(&other).unwrap();

        let titles: Vec<_> = store
            .list_lore()
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["The Long Winter", "Mirage of Time"]);
    }

    #[test]
    fn test_create_payload_shape() {
        let json = serde_json::to_value(discovery()).unwrap();
        assert_eq!(json["title"], "Mirage of Time");
        assert_eq!(json["biome"], "Desert of Illusions");
        assert_eq!(json.as_object().map(|o| o.len()), Some(3));
    }

    #[test]
    fn test_parse_create_response() {
        let body = r#"{"id":7,"title":"T","content":"C","biome":"B","discoveredAt":"2024-05-01T10:00:00.000Z"}"#;
        let entry = parse_create_response(201, body).unwrap();
        assert_eq!(entry.id, 7);
        assert_eq!(entry.discovered_at, "2024-05-01T10:00:00.000Z");

        assert!(matches!(
            parse_create_response(409, r#"{"message":"Lore fragment already discovered."}"#),
            Err(LoreError::Conflict)
        ));
        assert!(matches!(
            parse_create_response(500, r#"{"error":"Failed to save lore"}"#),
            Err(LoreError::Status { status: 500, .. })
        ));
        assert!(matches!(
            parse_create_response(201, "not json"),
            Err(LoreError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_list_response_sorts() {
        let body = r#"[
            {"id":2,"title":"B","content":"","biome":"x","discoveredAt":"2024-05-02T00:00:00.000Z"},
            {"id":1,"title":"A","content":"","biome":"x","discoveredAt":"2024-05-01T00:00:00.000Z"}
        ]"#;
        let entries = parse_list_response(200, body).unwrap();
        assert_eq!(entries[0].title, "A");
        assert!(parse_list_response(500, "").is_err());
    }

    #[test]
    fn test_codex_reconciles_saves() {
        let mut codex = Codex::new();
        codex.record_fetch(Ok(vec![
            entry(2, "later", "2024-05-02T00:00:00.000Z"),
            entry(1, "earlier", "2024-05-01T00:00:00.000Z"),
        ]));
        assert_eq!(codex.entries()[0].title, "earlier");

        let outcome = codex.record_save(Ok(entry(3, "middle", "2024-05-01T12:00:00.000Z")));
        assert_eq!(outcome, SaveOutcome::Created);
        let titles: Vec<_> = codex.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["earlier", "middle", "later"]);

        assert_eq!(
            codex.record_save(Err(LoreError::Conflict)),
            SaveOutcome::AlreadyKnown
        );
        assert_eq!(
            codex.record_save(Err(LoreError::Network("offline".into()))),
            SaveOutcome::Failed
        );
        assert_eq!(codex.len(), 3);
    }

    #[test]
    fn test_failed_fetch_keeps_codex() {
        let mut codex = Codex::new();
        codex.record_save(Ok(entry(1, "kept", "2024-05-01T00:00:00.000Z")));
        codex.record_fetch(Err(LoreError::Network("offline".into())));
        assert_eq!(codex.len(), 1);
    }

    #[test]
    fn test_iso8601_from_millis() {
        assert_eq!(iso8601_from_millis(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601_from_millis(951_782_400_000), "2000-02-29T00:00:00.000Z");
        assert_eq!(
            iso8601_from_millis(1_714_557_600_123),
            "2024-05-01T10:00:00.123Z"
        );
    }
}
