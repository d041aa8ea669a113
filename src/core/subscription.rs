//! Subscription activity and extension arithmetic.
//!
//! A subscription is a single expiry instant on the user record. Extending
//! while the window is still open stacks on top of the remaining time;
//! extending after it lapsed starts counting from the current moment.

use chrono::{DateTime, Duration, Utc};

use crate::core::error::{AppError, AppResult};

/// Returns true when the subscription window is open at `now`.
///
/// A missing expiry means the subscription was never activated; an expiry
/// equal to `now` is already inactive.
pub fn is_active(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_some_and(|t| t > now)
}

/// Computes the expiry after an extension by `days` whole UTC days.
///
/// `days` must be positive; zero or negative values are rejected so callers
/// never mutate state on bad input.
pub fn extend(expires_at: Option<DateTime<Utc>>, days: i64, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    if days <= 0 {
        return Err(AppError::Validation(format!(
            "subscription days must be positive, got {days}"
        )));
    }

    let base = match expires_at {
        Some(current) if current > now => current,
        _ => now,
    };

    let span = Duration::try_days(days).ok_or_else(|| AppError::Validation(format!("days out of range: {days}")))?;
    base.checked_add_signed(span)
        .ok_or_else(|| AppError::Validation(format!("expiry overflow for {days} days")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_is_active_none() {
        assert!(!is_active(None, now()));
    }

    #[test]
    fn test_is_active_past_expiry() {
        let expired = now() - Duration::days(1);
        assert!(!is_active(Some(expired), now()));
    }

    #[test]
    fn test_is_active_exact_boundary_is_inactive() {
        assert!(!is_active(Some(now()), now()));
    }

    #[test]
    fn test_is_active_future_expiry() {
        let active = now() + Duration::seconds(1);
        assert!(is_active(Some(active), now()));
    }

    #[test]
    fn test_extend_stacks_while_active() {
        let current = now() + Duration::days(5);
        let next = extend(Some(current), 10, now()).unwrap();
        assert_eq!(next, now() + Duration::days(15));
    }

    #[test]
    fn test_extend_resets_after_lapse() {
        let lapsed = now() - Duration::days(1);
        let next = extend(Some(lapsed), 10, now()).unwrap();
        assert_eq!(next, now() + Duration::days(10));
    }

    #[test]
    fn test_extend_from_never_subscribed() {
        let next = extend(None, 30, now()).unwrap();
        assert_eq!(next, now() + Duration::days(30));
    }

    #[test]
    fn test_extend_rejects_zero_days() {
        assert!(extend(None, 0, now()).is_err());
    }

    #[test]
    fn test_extend_rejects_negative_days() {
        assert!(extend(Some(now() + Duration::days(5)), -3, now()).is_err());
    }
}
