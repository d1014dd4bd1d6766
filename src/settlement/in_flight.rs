use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use uuid::Uuid;

type RoundKey = (Uuid, NaiveDate);

/// Rounds currently being settled by this process.
///
/// A reservation is held for the whole settle call so a second request for
/// the same round is rejected instead of racing to the commit. It is released
/// when the returned guard drops, on success and on every error path.
#[derive(Clone, Default)]
pub struct InFlightRounds {
    inner: Arc<Mutex<HashSet<RoundKey>>>,
}

impl InFlightRounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a round. Returns `None` if it is already reserved.
    pub fn reserve(&self, chart_id: Uuid, round_date: NaiveDate) -> Option<RoundReservation> {
        let mut rounds = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !rounds.insert((chart_id, round_date)) {
            tracing::warn!(
                chart_id = %chart_id,
                round_date = %round_date,
                "Settlement already in flight"
            );
            return None;
        }

        tracing::debug!(chart_id = %chart_id, round_date = %round_date, "Round reserved");
        Some(RoundReservation {
            rounds: Arc::clone(&self.inner),
            key: (chart_id, round_date),
        })
    }

    pub fn is_reserved(&self, chart_id: Uuid, round_date: NaiveDate) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(chart_id, round_date))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held while a round settles; releases the round on drop.
pub struct RoundReservation {
    rounds: Arc<Mutex<HashSet<RoundKey>>>,
    key: RoundKey,
}

impl Drop for RoundReservation {
    fn drop(&mut self) {
        self.rounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
        tracing::debug!(chart_id = %self.key.0, round_date = %self.key.1, "Round released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_and_release() {
        let rounds = InFlightRounds::new();
        let chart = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();

        let guard = rounds.reserve(chart, date).unwrap();
        assert!(rounds.is_reserved(chart, date));

        // Same round cannot be reserved twice
        assert!(rounds.reserve(chart, date).is_none());

        // Another round of the same chart is independent
        let other = rounds.reserve(chart, date.succ_opt().unwrap()).unwrap();
        assert_eq!(rounds.len(), 2);

        drop(guard);
        assert!(!rounds.is_reserved(chart, date));
        assert!(rounds.reserve(chart, date).is_some());

        drop(other);
        assert!(rounds.is_empty());
    }
}
