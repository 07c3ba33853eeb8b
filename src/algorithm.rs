use crate::traits::{ProgressRecord, Rating, TermId};
use std::time::{Duration, SystemTime};

// SM-2 spaced repetition, as described in
// https://www.supermemo.com/en/blog/application-of-a-computer-to-improve-the-results-obtained-in-working-with-the-supermemo-method
//
// Intervals grow with an ease factor that is nudged up or down by the
// quality of each recall. A failed recall restarts the short-term schedule
// but keeps the (lowered) ease factor, so a difficult term keeps growing
// slower than an easy one even after it recovers.

/// Ease factor assigned to a term on its first rating.
pub const INITIAL_EASE: f64 = 2.5;

/// Floor for the ease factor, intervals never grow slower than this.
pub const MIN_EASE: f64 = 1.3;

const DAY: Duration = Duration::from_secs(60 * 60 * 24);

/// Advance the spaced repetition state of one term by a single rating.
///
/// `previous` is the persisted record, absent if the term was never studied.
/// `now` is explicit so scheduling stays deterministic and testable.
pub fn advance(
    term: TermId,
    previous: Option<&ProgressRecord>,
    rating: Rating,
    now: SystemTime,
) -> ProgressRecord {
    let (mut repetition, mut interval, mut ease_factor) = match previous {
        Some(p) => (p.repetition, p.interval, p.ease_factor),
        None => (0, 0, INITIAL_EASE),
    };

    if rating.is_success() {
        interval = match repetition {
            // A head start on the very first review, but only on a perfect recall.
            0 => {
                if rating == Rating::Perfect {
                    4
                } else {
                    1
                }
            }
            1 => 6,
            _ => (interval as f64 * ease_factor).round() as u32,
        };
        repetition += 1;
    } else {
        // Failed recall restarts short-term, the term is not dropped.
        repetition = 0;
        interval = 1;
    }

    let q = rating.value() as f64;
    ease_factor += 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    ease_factor = ease_factor.max(MIN_EASE);

    ProgressRecord {
        term,
        interval,
        repetition,
        ease_factor,
        next_review: now + DAY * interval,
    }
}

/// Whether a term is eligible for review at `now`.
///
/// A term without progress has never been studied and is always due.
pub fn is_due(progress: Option<&ProgressRecord>, now: SystemTime) -> bool {
    match progress {
        None => true,
        Some(p) => now >= p.next_review,
    }
}
