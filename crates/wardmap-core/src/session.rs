//! Collector session state.
//!
//! The UI owns exactly one of these per sitting; the locator itself stays
//! stateless. Click widgets tend to re-deliver the most recent click on
//! every refresh, so consecutive duplicates are suppressed here rather
//! than in every caller.

use std::collections::VecDeque;

use serde::Serialize;

use crate::districts::DistrictMap;
use crate::geometry::Point;

/// How many clicks the recent-history panel keeps.
const RECENT_CAP: usize = 10;

/// One accepted click, for the recent-history display.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickRecord {
    pub district: String,
    pub point: Point,
}

/// Accumulated boundary points and click history for one sitting.
#[derive(Debug, Clone, Default)]
pub struct CollectorSession {
    boundaries: DistrictMap,
    recent: VecDeque<ClickRecord>,
    last_click: Option<Point>,
}

/// Export wrapper so district order survives serialization.
#[derive(Serialize)]
struct ExportDocument<'a> {
    exported_at: &'a str,
    districts: &'a DistrictMap,
}

impl CollectorSession {
    /// Fresh session with no boundaries collected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with already-collected boundaries (resuming work).
    pub fn with_boundaries(boundaries: DistrictMap) -> Self {
        Self {
            boundaries,
            recent: VecDeque::new(),
            last_click: None,
        }
    }

    pub fn boundaries(&self) -> &DistrictMap {
        &self.boundaries
    }

    /// Record a click against a district (original image space).
    ///
    /// Returns false when the click repeats the immediately preceding one
    /// - the widget re-delivered it and nothing was added.
    pub fn record_click(&mut self, district: &str, point: Point) -> bool {
        if self.last_click == Some(point) {
            return false;
        }
        self.last_click = Some(point);
        self.boundaries.push_point(district, point);
        self.push_recent(district, point);
        true
    }

    /// Manually-entered point: no duplicate suppression, the operator
    /// typed it on purpose.
    pub fn add_manual(&mut self, district: &str, point: Point) {
        self.boundaries.push_point(district, point);
        self.push_recent(district, point);
    }

    fn push_recent(&mut self, district: &str, point: Point) {
        self.recent.push_back(ClickRecord {
            district: district.to_string(),
            point,
        });
        while self.recent.len() > RECENT_CAP {
            self.recent.pop_front();
        }
    }

    /// Remove and return the last collected point of a district.
    pub fn undo_last(&mut self, district: &str) -> Option<Point> {
        let removed = self.boundaries.remove_last_point(district);
        if removed.is_some() {
            // The removed point must not block an identical re-click
            self.last_click = None;
        }
        removed
    }

    /// Drop all collected points for one district.
    pub fn clear_district(&mut self, district: &str) {
        self.boundaries.clear_district(district);
        self.last_click = None;
    }

    /// Wipe the whole session.
    pub fn reset(&mut self) {
        self.boundaries = DistrictMap::new();
        self.recent.clear();
        self.last_click = None;
    }

    /// Recent accepted clicks, oldest first, at most 10.
    pub fn recent(&self) -> impl DoubleEndedIterator<Item = &ClickRecord> {
        self.recent.iter()
    }

    /// Points collected so far for a district.
    pub fn point_count(&self, district: &str) -> usize {
        self.boundaries
            .get(district)
            .map(|d| d.boundary.len())
            .unwrap_or(0)
    }

    /// Human-readable export of one district: `(x, y), (x, y), ...`.
    pub fn export_human(&self, district: &str) -> Option<String> {
        self.boundaries.get(district).map(|d| {
            d.boundary
                .points
                .iter()
                .map(|p| format!("({}, {})", p.x.round() as i64, p.y.round() as i64))
                .collect::<Vec<_>>()
                .join(", ")
        })
    }

    /// JSON export of all collected boundaries, declaration order kept.
    /// The caller supplies the timestamp so this stays clock-free.
    pub fn export_json(&self, exported_at: &str) -> String {
        let doc = ExportDocument {
            exported_at,
            districts: &self.boundaries,
        };
        serde_json::to_string_pretty(&doc).expect("session export serialization is infallible")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_click_suppresses_repeat_delivery() {
        let mut session = CollectorSession::new();
        assert!(session.record_click("Watson", Point::new(10.0, 20.0)));
        // Widget refresh re-delivers the same click
        assert!(!session.record_click("Watson", Point::new(10.0, 20.0)));
        assert_eq!(session.point_count("Watson"), 1);

        // A genuinely new point is accepted
        assert!(session.record_click("Watson", Point::new(11.0, 20.0)));
        assert_eq!(session.point_count("Watson"), 2);
    }

    #[test]
    fn manual_entry_bypasses_suppression() {
        let mut session = CollectorSession::new();
        session.add_manual("Watson", Point::new(5.0, 5.0));
        session.add_manual("Watson", Point::new(5.0, 5.0));
        assert_eq!(session.point_count("Watson"), 2);
    }

    #[test]
    fn undo_then_reclick_same_point_works() {
        let mut session = CollectorSession::new();
        session.record_click("Watson", Point::new(10.0, 20.0));
        assert_eq!(session.undo_last("Watson"), Some(Point::new(10.0, 20.0)));
        assert_eq!(session.point_count("Watson"), 0);

        // After undo, clicking the same spot again must register
        assert!(session.record_click("Watson", Point::new(10.0, 20.0)));
    }

    #[test]
    fn clear_and_reset() {
        let mut session = CollectorSession::new();
        session.record_click("Watson", Point::new(1.0, 1.0));
        session.record_click("Heywood", Point::new(2.0, 2.0));

        session.clear_district("Watson");
        assert_eq!(session.point_count("Watson"), 0);
        assert_eq!(session.point_count("Heywood"), 1);

        session.reset();
        assert_eq!(session.point_count("Heywood"), 0);
        assert_eq!(session.recent().count(), 0);
    }

    #[test]
    fn recent_history_caps_at_ten() {
        let mut session = CollectorSession::new();
        for i in 0..15 {
            session.record_click("Watson", Point::new(i as f64, 0.0));
        }
        let recent: Vec<_> = session.recent().collect();
        assert_eq!(recent.len(), 10);
        // Oldest kept entry is click #5
        assert_eq!(recent[0].point, Point::new(5.0, 0.0));
        assert_eq!(recent[9].point, Point::new(14.0, 0.0));
    }

    #[test]
    fn export_human_format() {
        let mut session = CollectorSession::new();
        session.record_click("Watson", Point::new(116.0, 39.0));
        session.record_click("Watson", Point::new(887.0, 36.0));

        assert_eq!(
            session.export_human("Watson").as_deref(),
            Some("(116, 39), (887, 36)")
        );
        assert_eq!(session.export_human("Pacifica"), None);
    }

    #[test]
    fn export_json_keeps_collection_order() {
        let mut session = CollectorSession::new();
        session.record_click("Zeta", Point::new(1.0, 2.0));
        session.record_click("Alpha", Point::new(3.0, 4.0));

        let json = session.export_json("2026-02-11T10:00:00Z");
        assert!(json.contains("\"exported_at\""));
        assert!(json.find("Zeta").unwrap() < json.find("Alpha").unwrap());

        // The districts payload must parse back into an ordered map
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("districts").is_some());
    }
}
