//! User-facing reply texts — the one place message wording lives.

use chrono::{DateTime, Local, Utc};

use resinbot_core::error::ResinBotError;
use resinbot_core::regen::{HIGH_WATER, RESIN_CAP};
use resinbot_scheduler::Reminder;

/// Confirmation for an accepted update.
pub fn saved(value: u32, threshold: u32, reach_at: DateTime<Utc>) -> String {
    let local = reach_at.with_timezone(&Local);
    let day = if local.date_naive() == Local::now().date_naive() {
        "today"
    } else {
        "tomorrow"
    };
    format!(
        "Recorded {value} resin. You will reach {threshold} {day} around {}.",
        local.format("%H:%M")
    )
}

/// Query reply for a projected count at or below the cap.
pub fn status(projected: u32) -> String {
    if projected >= HIGH_WATER {
        format!("You have about {projected} resin — already piling up, consider spending some.")
    } else {
        format!("You have about {projected} resin.")
    }
}

/// Query reply once the projection has passed the cap.
pub fn overflowed(excess: u32) -> String {
    format!(
        "Your resin is capped at {RESIN_CAP} — {excess} unit(s) have gone to waste. Go spend it!"
    )
}

/// Reminder text for a fired threshold task.
pub fn threshold_reached(reminder: &Reminder) -> String {
    with_mention(
        reminder,
        format!("your resin has reached {} — time to spend it.", reminder.target),
    )
}

/// Reminder text for a fired overflow task.
pub fn overflow_reminder(reminder: &Reminder) -> String {
    with_mention(
        reminder,
        format!(
            "your resin passed {} over an hour ago and is overflowing. Update your record once you spend it.",
            reminder.target
        ),
    )
}

fn with_mention(reminder: &Reminder, text: String) -> String {
    match &reminder.mention {
        Some(name) => format!("{name}, {text}"),
        None => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => text,
            }
        }
    }
}

/// Map a validation error onto its reply. Infrastructure errors get a
/// generic apology and a log line.
pub fn rejection(err: &ResinBotError) -> String {
    match err {
        ResinBotError::OutOfRange { value } => {
            format!("{value} is not a valid resin count (0-{RESIN_CAP}).")
        }
        ResinBotError::AboveThreshold { value, threshold } => format!(
            "{value} is already at or above the reminder threshold of {threshold} — nothing to wait for."
        ),
        ResinBotError::TooSoon => {
            "Your record was updated less than an hour ago. Try again later.".into()
        }
        ResinBotError::NoRecord => {
            "No resin record yet. Send `resin <count>` first to start tracking.".into()
        }
        other => {
            tracing::error!("command failed: {other}");
            "Something went wrong handling that command.".into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use resinbot_core::ResinRecord;

    #[test]
    fn saved_mentions_value_and_threshold() {
        let text = saved(10, 150, Utc::now() + Duration::minutes(1120));
        assert!(text.contains("10"));
        assert!(text.contains("150"));
    }

    #[test]
    fn status_suggests_spending_at_high_water() {
        assert!(!status(119).contains("consider spending"));
        assert!(status(120).contains("consider spending"));
    }

    #[test]
    fn reminders_address_the_user_in_groups() {
        let record = ResinRecord::new(10, Utc::now());
        let mut reminder = Reminder::threshold("u", "c", Some("Aether".into()), &record, 150);
        assert!(threshold_reached(&reminder).starts_with("Aether, "));

        reminder.mention = None;
        assert!(threshold_reached(&reminder).starts_with("Your resin"));
    }

    #[test]
    fn rejection_texts_name_the_limit() {
        let text = rejection(&ResinBotError::OutOfRange { value: 161 });
        assert!(text.contains("161"));
        assert!(text.contains("160"));
    }
}
