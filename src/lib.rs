// Harvest Ledger - Core Library
// Exposes all modules for use in the CLI and tests

pub mod backup;
pub mod dedup;
pub mod extract;
pub mod fields;
pub mod normalize;
pub mod store;

// Re-export commonly used types
pub use backup::{
    build_backup_payload, composite_trip_key, BackupPayload, BackupReconciler, ImportMode,
    ImportSummary, NormalizedBackup, ValidationReport, APP_NAME, SCHEMA_VERSION,
};
pub use dedup::{DuplicateDetector, DEFAULT_AMOUNT_TOLERANCE, DEFAULT_POUNDS_TOLERANCE};
pub use extract::{Confidence, Extractor, ExtractorRules, Field, ParsedDraft};
pub use fields::{parse_mdy_date, parse_money, parse_number, price_per_pound, round2};
pub use normalize::{canonical_key, display_dealer, same_entity};
pub use store::{
    commit_trip, filter_by_range, new_trip_id, recent_areas, recent_dealers, trips_sorted,
    AppState, CommitError, CommitOutcome, Provenance, Store, TripInput, TripRecord,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
