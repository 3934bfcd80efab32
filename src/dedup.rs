// 🔁 Duplicate Detector - Is this trip the same real-world sale?
// Pure predicate over two trip records; tolerances absorb transcription
// rounding noise. A positive match is a question for the operator, not a
// verdict: the detector never blocks and never skips on its own.

use crate::normalize::canonical_key;
use crate::store::TripRecord;

/// Weight slack between two renditions of the same sale.
pub const DEFAULT_POUNDS_TOLERANCE: f64 = 0.25;

/// Dollar slack between two renditions of the same sale.
pub const DEFAULT_AMOUNT_TOLERANCE: f64 = 2.00;

pub struct DuplicateDetector {
    /// Pounds tolerance (default: 0.25 lb)
    pub pounds_tolerance: f64,

    /// Amount tolerance (default: $2.00)
    pub amount_tolerance: f64,
}

impl DuplicateDetector {
    /// Detector with default tolerances.
    pub fn new() -> Self {
        DuplicateDetector {
            pounds_tolerance: DEFAULT_POUNDS_TOLERANCE,
            amount_tolerance: DEFAULT_AMOUNT_TOLERANCE,
        }
    }

    pub fn with_tolerances(pounds_tolerance: f64, amount_tolerance: f64) -> Self {
        DuplicateDetector {
            pounds_tolerance,
            amount_tolerance,
        }
    }

    /// True iff the two records likely describe the same sale:
    /// exactly equal dates, equal canonical dealer keys, and pounds and
    /// amount within tolerance. Symmetric in its arguments.
    pub fn likely_duplicate(&self, a: &TripRecord, b: &TripRecord) -> bool {
        if a.harvest_date != b.harvest_date {
            return false;
        }
        if canonical_key(&a.dealer) != canonical_key(&b.dealer) {
            return false;
        }
        (a.pounds - b.pounds).abs() <= self.pounds_tolerance
            && (a.amount - b.amount).abs() <= self.amount_tolerance
    }

    /// O(n) scan for the first stored trip the candidate likely duplicates.
    /// `exclude_id` skips the record currently being edited.
    pub fn find_duplicate<'a>(
        &self,
        trips: &'a [TripRecord],
        candidate: &TripRecord,
        exclude_id: Option<&str>,
    ) -> Option<&'a TripRecord> {
        trips.iter().find(|t| {
            exclude_id.map_or(true, |id| t.id != id) && self.likely_duplicate(t, candidate)
        })
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{new_trip_id, Provenance};
    use chrono::{NaiveDate, Utc};

    fn trip(date: &str, dealer: &str, pounds: f64, amount: f64) -> TripRecord {
        TripRecord {
            id: new_trip_id(),
            harvest_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            dealer: dealer.to_string(),
            pounds,
            amount,
            area: None,
            created_at: Utc::now(),
            provenance: Provenance::Manual,
            raw_text: None,
        }
    }

    #[test]
    fn test_duplicate_within_tolerances() {
        let detector = DuplicateDetector::new();
        let a = trip("2024-01-15", "Acme Seafood", 43.50, 152.25);
        let b = trip("2024-01-15", "ACME SEAFOOD", 43.60, 153.00);
        assert!(detector.likely_duplicate(&a, &b));
    }

    #[test]
    fn test_symmetry() {
        let detector = DuplicateDetector::new();
        let a = trip("2024-01-15", "Acme Seafood", 43.50, 152.25);
        let b = trip("2024-01-15", "ACME SEAFOOD", 43.60, 153.00);
        let c = trip("2024-01-16", "Acme Seafood", 43.50, 152.25);
        assert_eq!(detector.likely_duplicate(&a, &b), detector.likely_duplicate(&b, &a));
        assert_eq!(detector.likely_duplicate(&a, &c), detector.likely_duplicate(&c, &a));
    }

    #[test]
    fn test_tolerances_are_inclusive() {
        let detector = DuplicateDetector::new();
        let a = trip("2024-01-15", "Acme", 43.50, 152.25);
        let at_edge = trip("2024-01-15", "Acme", 43.75, 154.25);
        assert!(detector.likely_duplicate(&a, &at_edge));

        let past_pounds = trip("2024-01-15", "Acme", 44.00, 152.25);
        assert!(!detector.likely_duplicate(&a, &past_pounds));

        let past_amount = trip("2024-01-15", "Acme", 43.50, 155.00);
        assert!(!detector.likely_duplicate(&a, &past_amount));
    }

    #[test]
    fn test_date_must_match_exactly() {
        let detector = DuplicateDetector::new();
        let a = trip("2024-01-15", "Acme", 43.50, 152.25);
        let b = trip("2024-01-16", "Acme", 43.50, 152.25);
        assert!(!detector.likely_duplicate(&a, &b));
    }

    #[test]
    fn test_dealer_compared_by_canonical_key() {
        let detector = DuplicateDetector::new();
        let a = trip("2024-01-15", "Acme  Seafood, Inc.", 43.50, 152.25);
        let b = trip("2024-01-15", "acme seafood inc", 43.50, 152.25);
        assert!(detector.likely_duplicate(&a, &b));

        let c = trip("2024-01-15", "Eastport Shellfish", 43.50, 152.25);
        assert!(!detector.likely_duplicate(&a, &c));
    }

    #[test]
    fn test_find_duplicate_skips_edited_record() {
        let detector = DuplicateDetector::new();
        let stored = trip("2024-01-15", "Acme", 43.50, 152.25);
        let trips = vec![stored.clone()];

        // Editing the record itself is not a self-duplicate
        let edited = TripRecord {
            pounds: 43.60,
            ..stored.clone()
        };
        assert!(detector.find_duplicate(&trips, &edited, Some(&stored.id)).is_none());

        // A different record with the same shape is
        let candidate = trip("2024-01-15", "Acme", 43.60, 152.25);
        assert!(detector.find_duplicate(&trips, &candidate, None).is_some());
    }

    #[test]
    fn test_custom_tolerances() {
        let detector = DuplicateDetector::with_tolerances(1.0, 10.0);
        let a = trip("2024-01-15", "Acme", 43.0, 150.0);
        let b = trip("2024-01-15", "Acme", 44.0, 158.0);
        assert!(detector.likely_duplicate(&a, &b));
    }
}
