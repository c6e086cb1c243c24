//! Resin regeneration math.
//!
//! A record stores the last confirmed count and when it was confirmed; the
//! count then grows at a fixed rate of one unit per 8 minutes. Everything the
//! bot does — projecting the current count, scheduling reminders, picking a
//! record's expiry — reduces to the two functions here.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Hard cap on a stored or displayed resin count.
pub const RESIN_CAP: u32 = 160;

/// Fixed regeneration rate: one unit every 8 minutes.
pub const REGEN_MINUTES_PER_UNIT: i64 = 8;

/// Soft high-water mark — at or above this the query reply suggests spending.
pub const HIGH_WATER: u32 = 120;

/// Advisory cooldown between accepted updates from the same user, in seconds.
pub const COOLDOWN_SECS: u64 = 3600;

/// Grace period after the count reaches the cap, before the overflow reminder
/// fires and before a stored record may expire.
pub fn overflow_grace() -> Duration {
    Duration::hours(1)
}

/// One user's last confirmed resin count and when it was confirmed.
///
/// `value` is within `0..=RESIN_CAP` at write time; only an explicit user
/// update ever writes it. Projections computed later may exceed the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResinRecord {
    pub value: u32,
    pub recorded_at: DateTime<Utc>,
}

impl ResinRecord {
    pub fn new(value: u32, recorded_at: DateTime<Utc>) -> Self {
        Self { value, recorded_at }
    }
}

/// Project a record forward to `now` at the fixed regeneration rate.
///
/// Elapsed time is rounded to the nearest whole unit (half up). The result is
/// deliberately not clamped at [`RESIN_CAP`] — display clamping is the
/// caller's concern. Elapsed time before `recorded_at` counts as zero.
pub fn project(record: &ResinRecord, now: DateTime<Utc>) -> u32 {
    let elapsed = (now - record.recorded_at).max(Duration::zero());
    let units = elapsed.num_seconds() as f64 / 60.0 / REGEN_MINUTES_PER_UNIT as f64;
    record.value.saturating_add(units.round() as u32)
}

/// How long until a count of `current` regenerates up to `target`.
///
/// Negative when the target is already met or passed — callers treat that as
/// "fire immediately".
pub fn time_to_reach(current: u32, target: u32) -> Duration {
    Duration::minutes((target as i64 - current as i64) * REGEN_MINUTES_PER_UNIT)
}

/// Clamp a projected value for display.
///
/// Returns the shown count and the overflow beyond the cap.
pub fn clamp_display(projected: u32) -> (u32, u32) {
    if projected > RESIN_CAP {
        (RESIN_CAP, projected - RESIN_CAP)
    } else {
        (projected, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: u32, minutes_ago: i64) -> ResinRecord {
        ResinRecord::new(value, Utc::now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn projection_is_monotonic() {
        let rec = record(40, 0);
        let mut last = 0;
        for minutes in [0i64, 7, 8, 9, 60, 480, 1600] {
            let projected = project(&rec, rec.recorded_at + Duration::minutes(minutes));
            assert!(projected >= rec.value);
            assert!(projected >= last, "projection decreased at {minutes}min");
            last = projected;
        }
    }

    #[test]
    fn projection_rounds_to_nearest_unit() {
        let rec = record(10, 0);
        // 3 minutes is less than half a unit, 5 is more.
        assert_eq!(project(&rec, rec.recorded_at + Duration::minutes(3)), 10);
        assert_eq!(project(&rec, rec.recorded_at + Duration::minutes(5)), 11);
        assert_eq!(project(&rec, rec.recorded_at + Duration::minutes(8)), 11);
    }

    #[test]
    fn projection_ignores_time_before_record() {
        let rec = record(42, 0);
        assert_eq!(project(&rec, rec.recorded_at - Duration::hours(2)), 42);
    }

    #[test]
    fn projection_is_idempotent_within_a_unit() {
        let rec = record(77, 100);
        let now = Utc::now();
        assert_eq!(project(&rec, now), project(&rec, now));
    }

    #[test]
    fn spec_scenario_800_minutes() {
        // value 100 recorded 800 minutes ago projects to 200, shown as the
        // cap plus 40 units of overflow.
        let rec = record(100, 800);
        let projected = project(&rec, Utc::now());
        assert_eq!(projected, 200);
        assert_eq!(clamp_display(projected), (160, 40));
    }

    #[test]
    fn time_to_reach_threshold() {
        // 10 -> 150 takes (150 - 10) * 8 = 1120 minutes.
        assert_eq!(time_to_reach(10, 150), Duration::minutes(1120));
    }

    #[test]
    fn time_to_reach_is_negative_past_target() {
        assert!(time_to_reach(155, 150) < Duration::zero());
        assert_eq!(time_to_reach(150, 150), Duration::zero());
    }

    #[test]
    fn round_trip_reprojection_lands_on_target() {
        let rec = record(10, 0);
        let target = 150;
        let reach_at = rec.recorded_at + time_to_reach(rec.value, target);
        let landed = project(&rec, reach_at);
        assert!(
            landed.abs_diff(target) <= 1,
            "re-projection landed on {landed}, expected ~{target}"
        );
    }

    #[test]
    fn clamp_display_below_cap_is_identity() {
        assert_eq!(clamp_display(0), (0, 0));
        assert_eq!(clamp_display(160), (160, 0));
        assert_eq!(clamp_display(161), (160, 1));
    }
}
