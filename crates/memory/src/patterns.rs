//! Mood pattern aggregation over stored turns.

use chrono::Timelike;
use niyati_core::{MoodPatterns, TurnRecord};

/// Build mood aggregates from turn rows.
///
/// Rows must be in chronological order; transitions are counted between
/// consecutive rows.
pub fn compute_patterns(rows: &[TurnRecord]) -> MoodPatterns {
    let mut patterns = MoodPatterns::default();

    for row in rows {
        *patterns
            .mood_histogram
            .entry(row.detected_mood)
            .or_insert(0) += 1;
        *patterns
            .hour_histogram
            .entry(row.timestamp.hour() as u8)
            .or_insert(0) += 1;
    }

    for pair in rows.windows(2) {
        *patterns
            .transitions
            .entry(pair[0].detected_mood)
            .or_default()
            .entry(pair[1].detected_mood)
            .or_insert(0) += 1;
    }

    patterns
}
