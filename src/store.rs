// 🗄️ Trip Store - Owned application state + versioned single-record persistence
// One explicit state object; every mutation is followed by an explicit
// save_state call. The store itself never mutates state behind the caller.

use crate::dedup::DuplicateDetector;
use crate::fields::{parse_mdy_date, parse_money, parse_number, round2};
use crate::normalize::{canonical_key, display_dealer};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Versioned key the live state record is stored under.
pub const STATE_KEY: &str = "harvest-ledger-v2";

/// Prior version's key, migrated forward on first load.
pub const LEGACY_STATE_KEY: &str = "harvest-ledger-v1";

// ============================================================================
// TRIP RECORD
// ============================================================================

/// How a trip entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Typed in by hand
    #[default]
    Manual,
    /// Started from an extracted draft, then confirmed by the operator
    Parsed,
}

/// A persisted harvest-sale event.
///
/// Only ever persisted with a valid calendar date, pounds > 0 and
/// amount > 0. Created on operator confirmation, mutated only by explicit
/// edit, removed only by explicit delete or full-store erase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Stable identity - assigned once, never recycled
    pub id: String,

    #[serde(rename = "dateISO")]
    pub harvest_date: NaiveDate,

    pub dealer: String,

    pub pounds: f64,

    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,

    #[serde(rename = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub provenance: Provenance,

    /// The pasted text a parsed trip came from, kept for review
    #[serde(rename = "rawText", default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl TripRecord {
    /// Area tag for keying; empty when untagged.
    pub fn area_str(&self) -> &str {
        self.area.as_deref().unwrap_or("")
    }
}

/// Fresh trip identity.
pub fn new_trip_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// The single shared mutable resource: live collections plus UI bookkeeping.
/// Accessed only from the main execution context; persisted as one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub trips: Vec<TripRecord>,

    #[serde(default)]
    pub areas: Vec<String>,

    #[serde(default)]
    pub dealers: Vec<String>,

    #[serde(default)]
    pub settings: Map<String, Value>,

    #[serde(default = "default_view")]
    pub view: String,

    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_view() -> String {
    "home".to_string()
}

fn default_filter() -> String {
    "YTD".to_string()
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            trips: Vec::new(),
            areas: Vec::new(),
            dealers: Vec::new(),
            settings: Map::new(),
            view: default_view(),
            filter: default_filter(),
        }
    }
}

impl AppState {
    /// Anything worth a safety export before a destructive replace?
    pub fn has_data(&self) -> bool {
        !self.trips.is_empty() || !self.areas.is_empty() || !self.dealers.is_empty()
    }

    /// Normalize + de-dupe the area list by canonical key.
    pub fn ensure_areas(&mut self) {
        self.areas = dedupe_by_canonical(&self.areas);
    }

    /// Normalize + de-dupe the dealer list by canonical key.
    pub fn ensure_dealers(&mut self) {
        self.dealers = dedupe_by_canonical(&self.dealers);
    }

    /// Explicit add; returns false when the canonical key already exists.
    pub fn add_area(&mut self, name: &str) -> bool {
        add_to_list(&mut self.areas, name)
    }

    pub fn remove_area(&mut self, name: &str) -> bool {
        remove_from_list(&mut self.areas, name)
    }

    pub fn add_dealer(&mut self, name: &str) -> bool {
        add_to_list(&mut self.dealers, name)
    }

    pub fn remove_dealer(&mut self, name: &str) -> bool {
        remove_from_list(&mut self.dealers, name)
    }

    /// Explicit delete of a single trip.
    pub fn delete_trip(&mut self, id: &str) -> bool {
        let before = self.trips.len();
        self.trips.retain(|t| t.id != id);
        self.trips.len() != before
    }

    /// Full-store erase.
    pub fn erase(&mut self) {
        *self = AppState::default();
    }
}

/// Keep first occurrence per canonical key, preserving order.
pub fn dedupe_by_canonical(list: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for item in list {
        let v = item.trim();
        if v.is_empty() {
            continue;
        }
        let key = canonical_key(v);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(v.to_string());
    }
    out
}

fn add_to_list(list: &mut Vec<String>, name: &str) -> bool {
    let v = name.trim();
    if v.is_empty() {
        return false;
    }
    let key = canonical_key(v);
    if list.iter().any(|x| canonical_key(x) == key) {
        return false;
    }
    list.push(v.to_string());
    true
}

fn remove_from_list(list: &mut Vec<String>, name: &str) -> bool {
    let key = canonical_key(name);
    let before = list.len();
    list.retain(|x| canonical_key(x) != key);
    list.len() != before
}

// ============================================================================
// QUERIES
// ============================================================================

/// Trips newest first by date, id as tie-break, for display.
pub fn trips_sorted(state: &AppState) -> Vec<TripRecord> {
    let mut trips = state.trips.clone();
    trips.sort_by(|a, b| {
        b.harvest_date
            .cmp(&a.harvest_date)
            .then_with(|| b.id.cmp(&a.id))
    });
    trips
}

/// Inclusive date-range filter; no bounds means no filtering.
pub fn filter_by_range(
    trips: &[TripRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<TripRecord> {
    let (Some(s), Some(e)) = (start, end) else {
        return trips.to_vec();
    };
    trips
        .iter()
        .filter(|t| t.harvest_date >= s && t.harvest_date <= e)
        .cloned()
        .collect()
}

/// Last `max_n` distinct dealers seen in trips, newest entry first.
pub fn recent_dealers(state: &AppState, max_n: usize) -> Vec<String> {
    recent_unique(state.trips.iter().map(|t| t.dealer.as_str()), max_n)
}

/// Last `max_n` distinct areas seen in trips, newest entry first.
pub fn recent_areas(state: &AppState, max_n: usize) -> Vec<String> {
    recent_unique(state.trips.iter().map(|t| t.area_str()), max_n)
}

fn recent_unique<'a>(values: impl DoubleEndedIterator<Item = &'a str>, max_n: usize) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for raw in values.rev() {
        let v = raw.trim();
        if v.is_empty() {
            continue;
        }
        let key = v.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(v.to_string());
        if out.len() >= max_n {
            break;
        }
    }
    out
}

// ============================================================================
// COMMIT (review form -> persisted trip)
// ============================================================================

/// Raw review-form fields, exactly as the operator left them.
#[derive(Debug, Clone, Default)]
pub struct TripInput {
    pub date: String,
    pub dealer: String,
    pub pounds: String,
    pub amount: String,
    pub area: String,
    pub provenance: Provenance,
    pub raw_text: Option<String>,
}

#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// Written into the state; caller persists next
    Saved(TripRecord),
    /// Nothing written: the operator must confirm before this saves
    DuplicateConflict {
        candidate: TripRecord,
        existing: TripRecord,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitError {
    /// Names of the fields that failed validation
    InvalidFields(Vec<String>),
    /// Edit target vanished out from under the form
    TripNotFound(String),
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitError::InvalidFields(fields) => {
                write!(f, "Missing/invalid: {}", fields.join(", "))
            }
            CommitError::TripNotFound(id) => write!(f, "Trip not found: {}", id),
        }
    }
}

impl std::error::Error for CommitError {}

/// Validate and commit a confirmed draft into the state.
///
/// Runs the duplicate scan (excluding the record being edited) before
/// anything is written. On a match with `allow_duplicate` false the state
/// stays untouched and the conflict goes back to the operator; a repeat
/// call with `allow_duplicate` true records their confirmation.
pub fn commit_trip(
    state: &mut AppState,
    detector: &DuplicateDetector,
    input: &TripInput,
    edit_id: Option<&str>,
    allow_duplicate: bool,
) -> Result<CommitOutcome, CommitError> {
    let date = parse_mdy_date(&input.date);
    let dealer = display_dealer(&input.dealer);
    let pounds = parse_number(&input.pounds);
    let amount = parse_money(&input.amount);
    let area = input.area.trim();

    let mut invalid = Vec::new();
    if date.is_none() {
        invalid.push("Date".to_string());
    }
    if dealer.is_empty() {
        invalid.push("Dealer".to_string());
    }
    if pounds <= 0.0 {
        invalid.push("Pounds".to_string());
    }
    if amount <= 0.0 {
        invalid.push("Amount".to_string());
    }
    if !invalid.is_empty() {
        return Err(CommitError::InvalidFields(invalid));
    }
    let Some(harvest_date) = date else {
        return Err(CommitError::InvalidFields(vec!["Date".to_string()]));
    };

    let existing_pos = match edit_id {
        Some(id) => match state.trips.iter().position(|t| t.id == id) {
            Some(pos) => Some(pos),
            None => return Err(CommitError::TripNotFound(id.to_string())),
        },
        None => None,
    };

    let candidate = match existing_pos {
        Some(pos) => {
            let existing = &state.trips[pos];
            TripRecord {
                id: existing.id.clone(),
                harvest_date,
                dealer,
                pounds: round2(pounds),
                amount: round2(amount),
                area: if area.is_empty() {
                    None
                } else {
                    Some(area.to_string())
                },
                created_at: existing.created_at,
                provenance: existing.provenance,
                raw_text: existing.raw_text.clone(),
            }
        }
        None => TripRecord {
            id: new_trip_id(),
            harvest_date,
            dealer,
            pounds: round2(pounds),
            amount: round2(amount),
            area: if area.is_empty() {
                None
            } else {
                Some(area.to_string())
            },
            created_at: Utc::now(),
            provenance: input.provenance,
            raw_text: input.raw_text.clone(),
        },
    };

    if !allow_duplicate {
        if let Some(existing) = detector.find_duplicate(&state.trips, &candidate, edit_id) {
            return Ok(CommitOutcome::DuplicateConflict {
                candidate,
                existing: existing.clone(),
            });
        }
    }

    match existing_pos {
        Some(pos) => state.trips[pos] = candidate.clone(),
        None => state.trips.push(candidate.clone()),
    }
    Ok(CommitOutcome::Saved(candidate))
}

// ============================================================================
// PERSISTENCE (versioned single-record key-value store)
// ============================================================================

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the on-device store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open store: {:?}", path.as_ref()))?;
        Self::setup(&conn)?;
        Ok(Store { conn })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory store")?;
        Self::setup(&conn)?;
        Ok(Store { conn })
    }

    fn setup(conn: &Connection) -> Result<()> {
        // WAL for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(())
    }

    /// Load the live state record, migrating from the prior version's key
    /// when needed. A corrupt record degrades to the empty default rather
    /// than failing startup.
    pub fn load_state(&self) -> Result<AppState> {
        let (raw, migrated) = match self.read_key(STATE_KEY)? {
            Some(raw) => (Some(raw), false),
            None => (self.read_key(LEGACY_STATE_KEY)?, true),
        };

        let mut state = match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => AppState::default(),
        };
        state.ensure_areas();
        state.ensure_dealers();

        if migrated && state.has_data() {
            self.save_state(&state)?;
        }
        Ok(state)
    }

    /// Persist the full state record. Called explicitly after each
    /// mutation; never an implicit side effect of mutating.
    pub fn save_state(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string(state).context("Failed to serialize state")?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
                params![STATE_KEY, json],
            )
            .context("Failed to write state")?;
        Ok(())
    }

    fn read_key(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to read state")?;
        Ok(value)
    }

    #[cfg(test)]
    fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
