// 📦 Backup Reconciler - Validate a snapshot, then merge or replace
// Validation completes fully before any mutation begins; a structural
// error refuses the whole import. Warnings skip individual entries only.

use crate::dedup::DuplicateDetector;
use crate::fields::{parse_mdy_date, parse_number, round2};
use crate::normalize::canonical_key;
use crate::store::{new_trip_id, AppState, Provenance, TripRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Name stamped into exported payloads.
pub const APP_NAME: &str = "Harvest Ledger";

/// Version of the backup payload layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Trip counts above this draw a slow-import warning.
pub const DEFAULT_OVERSIZE_TRIP_WARNING: usize = 20_000;

// ============================================================================
// BACKUP PAYLOAD (export side)
// ============================================================================

/// Versioned immutable snapshot of the live dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupPayload {
    pub app: String,

    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,

    #[serde(rename = "appVersion")]
    pub app_version: String,

    #[serde(rename = "exportedAt")]
    pub exported_at: String,

    pub data: BackupData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupData {
    pub trips: Vec<TripRecord>,
    pub areas: Vec<String>,
    pub dealers: Vec<String>,
    pub settings: Map<String, Value>,
}

/// Snapshot the current state for export (or for a safety copy before a
/// destructive replace).
pub fn build_backup_payload(state: &AppState, exported_at: DateTime<Utc>) -> BackupPayload {
    BackupPayload {
        app: APP_NAME.to_string(),
        schema_version: SCHEMA_VERSION,
        app_version: crate::VERSION.to_string(),
        exported_at: exported_at.to_rfc3339(),
        data: BackupData {
            trips: state.trips.clone(),
            areas: state.areas.clone(),
            dealers: state.dealers.clone(),
            settings: state.settings.clone(),
        },
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

/// Structural problems found in an imported payload. Any error refuses
/// the import in full; warnings let it proceed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errors.join("; "))
    }
}

impl std::error::Error for ValidationReport {}

/// A payload that passed structural validation, with entries already
/// normalized and per-entry rejects folded into warnings.
#[derive(Debug, Clone)]
pub struct NormalizedBackup {
    pub schema_version: u64,
    pub app_version: String,
    pub exported_at: String,
    pub trips: Vec<TripRecord>,
    pub areas: Vec<String>,
    pub dealers: Vec<String>,
    pub settings: Map<String, Value>,
    pub warnings: Vec<String>,
}

// ============================================================================
// IMPORT MODE & SUMMARY
// ============================================================================

/// Operator-selected policy for applying a validated snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Live lists and settings are fully replaced by the imported ones
    Replace,
    /// Imported entries are appended, skipping likely duplicates
    Merge,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Replace => "replace",
            ImportMode::Merge => "merge",
        }
    }
}

/// Rendered to the operator after an import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub trips_in_file: usize,
    pub trips_added: usize,
    pub areas_in_file: usize,
    pub dealers_in_file: usize,
    pub warnings: Vec<String>,
}

impl ImportSummary {
    pub fn summary(&self) -> String {
        format!(
            "Import ({}): {} of {} trips added, {} areas and {} dealers in file",
            self.mode.as_str(),
            self.trips_added,
            self.trips_in_file,
            self.areas_in_file,
            self.dealers_in_file
        )
    }
}

// ============================================================================
// COMPOSITE KEY
// ============================================================================

/// One canonical string identifying a trip for merge de-duplication:
/// date | dealer | area | pounds to 2dp | amount to 2dp.
pub fn composite_trip_key(t: &TripRecord) -> String {
    canonical_key(&format!(
        "{}|{}|{}|{:.2}|{:.2}",
        t.harvest_date,
        t.dealer,
        t.area_str(),
        round2(t.pounds),
        round2(t.amount)
    ))
}

// ============================================================================
// RECONCILER
// ============================================================================

pub struct BackupReconciler {
    /// Trip counts above this warn about slow imports
    pub oversize_trip_warning: usize,

    /// Detector used for merge de-duplication
    pub detector: DuplicateDetector,
}

impl BackupReconciler {
    pub fn new() -> Self {
        BackupReconciler {
            oversize_trip_warning: DEFAULT_OVERSIZE_TRIP_WARNING,
            detector: DuplicateDetector::new(),
        }
    }

    /// Validate and normalize a raw payload. Errors refuse the import in
    /// full - the caller must not touch the state. This is the only core
    /// operation allowed to fail, and it runs strictly before mutation.
    ///
    /// Accepts legacy spellings (`schema`, `version`) and payloads whose
    /// data section is the document root.
    pub fn normalize(&self, raw: &Value) -> Result<NormalizedBackup, ValidationReport> {
        let mut report = ValidationReport::default();

        let Some(obj) = raw.as_object() else {
            report
                .errors
                .push("Backup file is not a JSON object".to_string());
            return Err(report);
        };

        let schema_version = obj
            .get("schemaVersion")
            .or_else(|| obj.get("schema"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let app_version = obj
            .get("appVersion")
            .or_else(|| obj.get("version"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let exported_at = obj
            .get("exportedAt")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        // Older exports put the collections at the document root
        let data = match obj.get("data").and_then(Value::as_object) {
            Some(d) => d,
            None => obj,
        };

        let trips_raw = data.get("trips").and_then(Value::as_array);
        if trips_raw.is_none() {
            report.errors.push("Backup trips must be an array".to_string());
        }
        let areas_raw = data.get("areas").and_then(Value::as_array);
        if areas_raw.is_none() {
            report.errors.push("Backup areas must be an array".to_string());
        }
        let dealers_raw = data.get("dealers").and_then(Value::as_array);
        if dealers_raw.is_none() {
            report
                .errors
                .push("Backup dealers must be an array".to_string());
        }
        let settings = match data.get("settings") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(m)) => m.clone(),
            Some(_) => {
                report
                    .errors
                    .push("Backup settings must be an object".to_string());
                Map::new()
            }
        };

        let (Some(trips_raw), Some(areas_raw), Some(dealers_raw)) =
            (trips_raw, areas_raw, dealers_raw)
        else {
            return Err(report);
        };
        if !report.errors.is_empty() {
            return Err(report);
        }

        if trips_raw.len() > self.oversize_trip_warning {
            report.warnings.push(format!(
                "Large backup ({} trips) may be slow to import",
                trips_raw.len()
            ));
        }
        if areas_raw.iter().any(|a| !a.is_string()) {
            report
                .warnings
                .push("Some areas were not strings and will be skipped".to_string());
        }
        if dealers_raw.iter().any(|d| !d.is_string()) {
            report
                .warnings
                .push("Some dealers were not strings and will be skipped".to_string());
        }

        let areas = clean_string_list(areas_raw);
        let dealers = clean_string_list(dealers_raw);

        let mut trips = Vec::new();
        let mut skipped_dates = false;
        for entry in trips_raw {
            match normalize_trip_entry(entry) {
                TripEntry::Trip(t) => trips.push(t),
                TripEntry::BadDate => skipped_dates = true,
                TripEntry::Empty => {}
            }
        }
        if skipped_dates {
            report
                .warnings
                .push("Some trips had missing or invalid dates and were skipped".to_string());
        }

        Ok(NormalizedBackup {
            schema_version,
            app_version,
            exported_at,
            trips,
            areas,
            dealers,
            settings,
            warnings: report.warnings,
        })
    }

    /// Apply a validated snapshot under the chosen policy. Runs to
    /// completion with no interleaved I/O; the caller persists afterwards.
    ///
    /// Before a replace of a non-empty store the caller is expected to
    /// have offered the operator a safety export (`AppState::has_data` +
    /// `build_backup_payload`).
    pub fn import(
        &self,
        state: &mut AppState,
        backup: &NormalizedBackup,
        mode: ImportMode,
    ) -> ImportSummary {
        let mut next_trips = match mode {
            ImportMode::Replace => Vec::new(),
            ImportMode::Merge => state.trips.clone(),
        };
        let mut seen: HashSet<String> = next_trips.iter().map(composite_trip_key).collect();

        let mut added = 0usize;
        for trip in &backup.trips {
            let key = composite_trip_key(trip);
            if mode == ImportMode::Merge {
                let dup_key = seen.contains(&key);
                let dup_likely = next_trips
                    .iter()
                    .any(|x| self.detector.likely_duplicate(x, trip));
                if dup_key || dup_likely {
                    continue;
                }
            }
            let mut trip = trip.clone();
            // Imported ids must stay globally unique
            if next_trips.iter().any(|x| x.id == trip.id) {
                trip.id = new_trip_id();
            }
            next_trips.push(trip);
            seen.insert(key);
            added += 1;
        }

        let mut next_areas = match mode {
            ImportMode::Replace => Vec::new(),
            ImportMode::Merge => state.areas.clone(),
        };
        append_missing(&mut next_areas, &backup.areas);

        let mut next_dealers = match mode {
            ImportMode::Replace => Vec::new(),
            ImportMode::Merge => state.dealers.clone(),
        };
        append_missing(&mut next_dealers, &backup.dealers);

        state.trips = next_trips;
        state.areas = next_areas;
        state.dealers = next_dealers;

        // Replace takes the imported settings wholesale; merge keeps the
        // existing values and only fills keys that are absent
        match mode {
            ImportMode::Replace => state.settings = backup.settings.clone(),
            ImportMode::Merge => {
                for (k, v) in &backup.settings {
                    if !state.settings.contains_key(k) {
                        state.settings.insert(k.clone(), v.clone());
                    }
                }
            }
        }

        state.ensure_areas();
        state.ensure_dealers();

        ImportSummary {
            mode,
            trips_in_file: backup.trips.len(),
            trips_added: added,
            areas_in_file: backup.areas.len(),
            dealers_in_file: backup.dealers.len(),
            warnings: backup.warnings.clone(),
        }
    }
}

impl Default for BackupReconciler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ENTRY NORMALIZATION
// ============================================================================

enum TripEntry {
    Trip(TripRecord),
    /// Carried data but no usable calendar date
    BadDate,
    /// Nothing worth keeping
    Empty,
}

fn normalize_trip_entry(entry: &Value) -> TripEntry {
    let Some(o) = entry.as_object() else {
        return TripEntry::Empty;
    };

    let id = string_field(o, "id");
    let mut date_raw = string_field(o, "dateISO");
    if date_raw.is_empty() {
        // legacy field name
        date_raw = string_field(o, "date");
    }
    let dealer = string_field(o, "dealer");
    let area = string_field(o, "area");
    let pounds = number_field(o, "pounds");
    let amount = number_field(o, "amount");

    if date_raw.is_empty() && dealer.is_empty() && pounds == 0.0 && amount == 0.0 {
        return TripEntry::Empty;
    }
    let Some(harvest_date) = parse_mdy_date(&date_raw) else {
        return TripEntry::BadDate;
    };

    let created_at = o
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let provenance = match o.get("provenance").and_then(Value::as_str) {
        Some("parsed") => Provenance::Parsed,
        _ => Provenance::Manual,
    };
    let raw_text = o
        .get("rawText")
        .and_then(Value::as_str)
        .map(str::to_string);

    TripEntry::Trip(TripRecord {
        id: if id.is_empty() { new_trip_id() } else { id },
        harvest_date,
        dealer,
        pounds,
        amount,
        area: if area.is_empty() { None } else { Some(area) },
        created_at,
        provenance,
        raw_text,
    })
}

fn string_field(o: &Map<String, Value>, key: &str) -> String {
    o.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn number_field(o: &Map<String, Value>, key: &str) -> f64 {
    let v = match o.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_number(s),
        _ => 0.0,
    };
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn clean_string_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn append_missing(list: &mut Vec<String>, incoming: &[String]) {
    let mut keys: HashSet<String> = list.iter().map(|s| canonical_key(s)).collect();
    for item in incoming {
        if keys.insert(canonical_key(item)) {
            list.push(item.clone());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{commit_trip, CommitOutcome, TripInput};
    use serde_json::json;

    fn seeded_state() -> AppState {
        let mut state = AppState::default();
        let input = TripInput {
            date: "01/15/2024".to_string(),
            dealer: "Acme Seafood".to_string(),
            pounds: "43.5".to_string(),
            amount: "152.25".to_string(),
            area: "South Bay".to_string(),
            ..TripInput::default()
        };
        match commit_trip(&mut state, &DuplicateDetector::new(), &input, None, false) {
            Ok(CommitOutcome::Saved(_)) => {}
            other => panic!("seed failed: {:?}", other),
        }
        state.add_area("South Bay");
        state.add_dealer("Acme Seafood");
        state
    }

    fn payload_value(state: &AppState) -> Value {
        serde_json::to_value(build_backup_payload(state, Utc::now())).unwrap()
    }

    #[test]
    fn test_normalize_accepts_own_export() {
        let state = seeded_state();
        let raw = payload_value(&state);
        let backup = BackupReconciler::new().normalize(&raw).unwrap();
        assert_eq!(backup.schema_version, SCHEMA_VERSION as u64);
        assert_eq!(backup.trips.len(), 1);
        assert_eq!(backup.areas, vec!["South Bay"]);
        assert_eq!(backup.dealers, vec!["Acme Seafood"]);
        assert!(backup.warnings.is_empty());
    }

    #[test]
    fn test_normalize_accepts_root_level_data_and_legacy_keys() {
        let raw = json!({
            "schema": 1,
            "version": "0.9.0",
            "trips": [],
            "areas": ["South Bay"],
            "dealers": []
        });
        let backup = BackupReconciler::new().normalize(&raw).unwrap();
        assert_eq!(backup.schema_version, 1);
        assert_eq!(backup.app_version, "0.9.0");
        assert_eq!(backup.areas, vec!["South Bay"]);
    }

    #[test]
    fn test_missing_trips_array_is_refused() {
        let raw = json!({"data": {"areas": [], "dealers": [], "settings": {}}});
        let report = BackupReconciler::new().normalize(&raw).unwrap_err();
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("trips must be an array")));
    }

    #[test]
    fn test_non_object_payload_is_refused() {
        let report = BackupReconciler::new()
            .normalize(&json!("just a string"))
            .unwrap_err();
        assert!(!report.errors.is_empty());
    }

    #[test]
    fn test_bad_settings_is_refused() {
        let raw = json!({"data": {"trips": [], "areas": [], "dealers": [], "settings": 5}});
        let report = BackupReconciler::new().normalize(&raw).unwrap_err();
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("settings must be an object")));
    }

    #[test]
    fn test_non_string_list_entries_warn_and_skip() {
        let raw = json!({
            "data": {
                "trips": [],
                "areas": ["South Bay", 7, null],
                "dealers": [{"x": 1}, "Acme"],
                "settings": {}
            }
        });
        let backup = BackupReconciler::new().normalize(&raw).unwrap();
        assert_eq!(backup.areas, vec!["South Bay"]);
        assert_eq!(backup.dealers, vec!["Acme"]);
        assert_eq!(backup.warnings.len(), 2);
    }

    #[test]
    fn test_oversize_trip_count_warns_but_proceeds() {
        let mut reconciler = BackupReconciler::new();
        reconciler.oversize_trip_warning = 2;
        let trip = json!({"dateISO": "2024-01-15", "dealer": "A", "pounds": 1, "amount": 2});
        let raw = json!({
            "data": {
                "trips": [trip.clone(), trip.clone(), trip],
                "areas": [], "dealers": [], "settings": {}
            }
        });
        let backup = reconciler.normalize(&raw).unwrap();
        assert_eq!(backup.trips.len(), 3);
        assert!(backup.warnings.iter().any(|w| w.contains("Large backup")));
    }

    #[test]
    fn test_invalid_date_entries_are_skipped_with_warning() {
        let raw = json!({
            "data": {
                "trips": [
                    {"dateISO": "2024-01-15", "dealer": "Acme", "pounds": 10, "amount": 40},
                    {"dateISO": "not-a-date", "dealer": "Broken", "pounds": 10, "amount": 40},
                    {}
                ],
                "areas": [], "dealers": [], "settings": {}
            }
        });
        let backup = BackupReconciler::new().normalize(&raw).unwrap();
        assert_eq!(backup.trips.len(), 1);
        assert!(backup.warnings.iter().any(|w| w.contains("invalid dates")));
    }

    #[test]
    fn test_merge_suppresses_composite_key_duplicates() {
        let mut state = seeded_state();
        let raw = payload_value(&state);
        let reconciler = BackupReconciler::new();
        let backup = reconciler.normalize(&raw).unwrap();

        let summary = reconciler.import(&mut state, &backup, ImportMode::Merge);
        assert_eq!(summary.trips_in_file, 1);
        assert_eq!(summary.trips_added, 0);
        assert_eq!(state.trips.len(), 1);
    }

    #[test]
    fn test_merge_suppresses_near_duplicates_via_detector() {
        let mut state = seeded_state();
        let raw = json!({
            "data": {
                "trips": [
                    // Same sale, transcribed with rounding noise
                    {"dateISO": "2024-01-15", "dealer": "ACME SEAFOOD", "pounds": 43.6, "amount": 153.0}
                ],
                "areas": [], "dealers": [], "settings": {}
            }
        });
        let reconciler = BackupReconciler::new();
        let backup = reconciler.normalize(&raw).unwrap();

        let summary = reconciler.import(&mut state, &backup, ImportMode::Merge);
        assert_eq!(summary.trips_added, 0);
        assert_eq!(state.trips.len(), 1);
    }

    #[test]
    fn test_merge_never_reduces_trip_count() {
        let mut state = seeded_state();
        let before = state.trips.len();
        let raw = json!({
            "data": {
                "trips": [
                    {"dateISO": "2024-02-01", "dealer": "Eastport", "pounds": 20, "amount": 80}
                ],
                "areas": ["North Cove"], "dealers": ["Eastport"], "settings": {}
            }
        });
        let reconciler = BackupReconciler::new();
        let backup = reconciler.normalize(&raw).unwrap();
        let summary = reconciler.import(&mut state, &backup, ImportMode::Merge);

        assert!(state.trips.len() >= before);
        assert_eq!(summary.trips_added, 1);
        assert_eq!(state.areas, vec!["South Bay", "North Cove"]);
        assert_eq!(state.dealers, vec!["Acme Seafood", "Eastport"]);
    }

    #[test]
    fn test_merge_rekeys_colliding_ids() {
        let mut state = seeded_state();
        let existing_id = state.trips[0].id.clone();
        let raw = json!({
            "data": {
                "trips": [
                    {"id": existing_id, "dateISO": "2024-03-01", "dealer": "Other", "pounds": 5, "amount": 20}
                ],
                "areas": [], "dealers": [], "settings": {}
            }
        });
        let reconciler = BackupReconciler::new();
        let backup = reconciler.normalize(&raw).unwrap();
        reconciler.import(&mut state, &backup, ImportMode::Merge);

        assert_eq!(state.trips.len(), 2);
        assert_ne!(state.trips[0].id, state.trips[1].id);
    }

    #[test]
    fn test_merge_settings_fill_only_absent_keys() {
        let mut state = seeded_state();
        state
            .settings
            .insert("units".to_string(), json!("lbs"));
        let raw = json!({
            "data": {
                "trips": [], "areas": [], "dealers": [],
                "settings": {"units": "kg", "theme": "dark"}
            }
        });
        let reconciler = BackupReconciler::new();
        let backup = reconciler.normalize(&raw).unwrap();
        reconciler.import(&mut state, &backup, ImportMode::Merge);

        assert_eq!(state.settings["units"], json!("lbs"));
        assert_eq!(state.settings["theme"], json!("dark"));
    }

    #[test]
    fn test_merge_skips_areas_already_present_by_canonical_key() {
        let mut state = seeded_state();
        let raw = json!({
            "data": {
                "trips": [], "areas": ["SOUTH   BAY", "North Cove"], "dealers": ["acme seafood"],
                "settings": {}
            }
        });
        let reconciler = BackupReconciler::new();
        let backup = reconciler.normalize(&raw).unwrap();
        reconciler.import(&mut state, &backup, ImportMode::Merge);

        assert_eq!(state.areas, vec!["South Bay", "North Cove"]);
        assert_eq!(state.dealers, vec!["Acme Seafood"]);
    }

    #[test]
    fn test_replace_swaps_everything() {
        let mut state = seeded_state();
        state.settings.insert("units".to_string(), json!("lbs"));
        let raw = json!({
            "data": {
                "trips": [
                    {"dateISO": "2024-05-01", "dealer": "Eastport", "pounds": 12, "amount": 48},
                    {"dateISO": "2024-05-02", "dealer": "Eastport", "pounds": 14, "amount": 52}
                ],
                "areas": ["North Cove"],
                "dealers": ["Eastport"],
                "settings": {"theme": "dark"}
            }
        });
        let reconciler = BackupReconciler::new();
        let backup = reconciler.normalize(&raw).unwrap();
        let summary = reconciler.import(&mut state, &backup, ImportMode::Replace);

        // Replace completeness: exactly the validated payload's trips
        assert_eq!(state.trips.len(), backup.trips.len());
        assert_eq!(summary.trips_added, 2);
        assert_eq!(state.areas, vec!["North Cove"]);
        assert_eq!(state.dealers, vec!["Eastport"]);
        assert!(state.settings.get("units").is_none());
        assert_eq!(state.settings["theme"], json!("dark"));
    }

    #[test]
    fn test_refused_import_leaves_state_untouched() {
        let mut state = seeded_state();
        let before = state.clone();
        let raw = json!({"data": {"areas": [], "dealers": [], "settings": {}}});

        let result = BackupReconciler::new().normalize(&raw);
        assert!(result.is_err());
        // Validation failed before any mutation could begin
        assert_eq!(state.trips, before.trips);
        assert_eq!(state.areas, before.areas);
        assert_eq!(state.dealers, before.dealers);
    }

    #[test]
    fn test_composite_key_rounds_to_cents() {
        let state = seeded_state();
        let a = state.trips[0].clone();
        let mut b = a.clone();
        b.pounds = 43.504; // rounds to the same 2dp key
        assert_eq!(composite_trip_key(&a), composite_trip_key(&b));

        b.pounds = 44.0;
        assert_ne!(composite_trip_key(&a), composite_trip_key(&b));
    }

    #[test]
    fn test_summary_line() {
        let summary = ImportSummary {
            mode: ImportMode::Merge,
            trips_in_file: 15,
            trips_added: 12,
            areas_in_file: 3,
            dealers_in_file: 2,
            warnings: vec![],
        };
        assert_eq!(
            summary.summary(),
            "Import (merge): 12 of 15 trips added, 3 areas and 2 dealers in file"
        );
    }
}
