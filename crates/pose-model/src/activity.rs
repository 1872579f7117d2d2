//! Per-second activity log.
//!
//! One row per second of video that had at least one detected frame. Rows are
//! ordered by second; seconds without detections are absent, never zero-filled.

use serde::{Deserialize, Serialize};

use crate::motion::{Motion, MotionSet};

/// Column header for the second index in CSV output.
pub const TIME_COLUMN: &str = "Time (s)";

/// Aggregated flags for one second of video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRow {
    /// Second index (`floor(frame_index / fps)`).
    pub second: u64,
    /// Categories that fired on any frame of this second.
    pub flags: MotionSet,
}

/// Finalized activity log of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    rows: Vec<ActivityRow>,
}

impl ActivityLog {
    /// Build a log from rows in any order. Rows sharing a second are merged
    /// with logical OR.
    pub fn new(mut rows: Vec<ActivityRow>) -> Self {
        rows.sort_by_key(|row| row.second);
        let mut merged: Vec<ActivityRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match merged.last_mut() {
                Some(last) if last.second == row.second => last.flags |= &row.flags,
                _ => merged.push(row),
            }
        }
        Self { rows: merged }
    }

    /// Rows ascending by second.
    pub fn rows(&self) -> &[ActivityRow] {
        &self.rows
    }

    /// Row for a second, if any frame of that second was detected.
    pub fn get(&self, second: u64) -> Option<&ActivityRow> {
        self.rows
            .binary_search_by_key(&second, |row| row.second)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of seconds in which a category fired.
    pub fn seconds_with(&self, motion: Motion) -> usize {
        self.rows
            .iter()
            .filter(|row| row.flags.contains(motion))
            .count()
    }

    /// Render as CSV: a header row of category names, then one `0/1` row per
    /// logged second.
    pub fn to_csv(&self) -> String {
        let mut output = String::from(TIME_COLUMN);
        for motion in Motion::ALL {
            output.push(',');
            output.push_str(motion.name());
        }
        output.push('\n');

        for row in &self.rows {
            output.push_str(&row.second.to_string());
            for (_, active) in row.flags.iter() {
                output.push_str(if active { ",1" } else { ",0" });
            }
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(second: u64, motions: &[Motion]) -> ActivityRow {
        ActivityRow {
            second,
            flags: motions.iter().copied().collect(),
        }
    }

    #[test]
    fn test_rows_sorted_and_merged() {
        let log = ActivityLog::new(vec![
            row(3, &[Motion::Gliding]),
            row(1, &[Motion::Advancing]),
            row(3, &[Motion::Punching]),
        ]);
        assert_eq!(log.len(), 2);
        assert_eq!(log.rows()[0].second, 1);
        assert_eq!(log.rows()[1].flags.labels(), vec!["Gliding", "Punching"]);
    }

    #[test]
    fn test_gaps_are_absent() {
        let log = ActivityLog::new(vec![row(0, &[]), row(4, &[Motion::Directing])]);
        assert!(log.get(0).is_some());
        assert!(log.get(2).is_none());
        assert!(log.get(4).unwrap().flags.contains(Motion::Directing));
    }

    #[test]
    fn test_csv_layout() {
        let log = ActivityLog::new(vec![
            row(0, &[Motion::Advancing]),
            row(2, &[Motion::Pressing, Motion::Gliding]),
        ]);
        let csv = log.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Time (s),Advancing,Retreating,Enclosing,Spreading,Directing,Indirecting,Gliding,Punching,Dabbing,Flicking,Slashing,Wringing,Pressing"
        );
        assert_eq!(lines[1], "0,1,0,0,0,0,0,0,0,0,0,0,0,0");
        assert_eq!(lines[2], "2,0,0,0,0,0,0,1,0,0,0,0,0,1");
    }

    proptest::proptest! {
        #[test]
        fn prop_rows_are_strictly_ascending(
            seconds in proptest::collection::vec(0u64..20, 0..40),
        ) {
            let log = ActivityLog::new(seconds.iter().map(|s| row(*s, &[])).collect());
            for pair in log.rows().windows(2) {
                proptest::prop_assert!(pair[0].second < pair[1].second);
            }
            proptest::prop_assert_eq!(log.to_csv().lines().count(), log.len() + 1);
        }
    }

    #[test]
    fn test_seconds_with() {
        let log = ActivityLog::new(vec![
            row(0, &[Motion::Gliding]),
            row(1, &[Motion::Gliding, Motion::Punching]),
            row(2, &[]),
        ]);
        assert_eq!(log.seconds_with(Motion::Gliding), 2);
        assert_eq!(log.seconds_with(Motion::Punching), 1);
        assert_eq!(log.seconds_with(Motion::Advancing), 0);
    }
}
