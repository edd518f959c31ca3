//! Bounded rolling history of readings
//!
//! Insertion order is chronological order. Once the store reaches its
//! capacity every append evicts the oldest reading.

use std::collections::VecDeque;

use crate::models::Reading;

/// Default capacity: 30 days of hourly readings
pub const DEFAULT_MAX_READINGS: usize = 720;

#[derive(Debug, Clone)]
pub struct ObservationStore {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl Default for ObservationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_READINGS)
    }
}

impl ObservationStore {
    /// Create an empty store holding at most `capacity` readings
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest one if the store is full.
    ///
    /// Returns the evicted reading, if any.
    pub fn append(&mut self, reading: Reading) -> Option<Reading> {
        let evicted = if self.readings.len() >= self.capacity {
            self.readings.pop_front()
        } else {
            None
        };
        self.readings.push_back(reading);
        evicted
    }

    /// Discard all stored readings and replace them with `readings`.
    ///
    /// Only the most recent `capacity` readings of the input are kept.
    pub fn replace_all(&mut self, readings: Vec<Reading>) {
        let skip = readings.len().saturating_sub(self.capacity);
        self.readings.clear();
        self.readings.extend(readings.into_iter().skip(skip));
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Reading> + ExactSizeIterator {
        self.readings.iter()
    }

    /// The most recent `n` readings in chronological order
    #[must_use]
    pub fn recent_window(&self, n: usize) -> Vec<Reading> {
        let skip = self.readings.len().saturating_sub(n);
        self.readings.iter().skip(skip).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn reading(i: i64) -> Reading {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Reading::new(start + Duration::hours(i), i as f64, 50.0, 1010.0)
    }

    #[test]
    fn test_append_below_capacity() {
        let mut store = ObservationStore::new(3);
        assert!(store.append(reading(0)).is_none());
        assert!(store.append(reading(1)).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.latest().unwrap().temperature, 1.0);
    }

    #[test]
    fn test_append_evicts_oldest_when_full() {
        let mut store = ObservationStore::new(3);
        for i in 0..3 {
            store.append(reading(i));
        }
        let evicted = store.append(reading(3));
        assert_eq!(evicted.unwrap().temperature, 0.0);
        assert_eq!(store.len(), 3);

        let temps: Vec<f64> = store.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_store_keeps_most_recent_in_order() {
        let mut store = ObservationStore::default();
        for i in 0..2000 {
            store.append(reading(i));
            assert!(store.len() <= DEFAULT_MAX_READINGS);
        }

        assert_eq!(store.len(), DEFAULT_MAX_READINGS);
        let temps: Vec<f64> = store.iter().map(|r| r.temperature).collect();
        let expected: Vec<f64> = (1280..2000).map(|i| i as f64).collect();
        assert_eq!(temps, expected);
    }

    #[test]
    fn test_duplicate_timestamps_are_kept() {
        let mut store = ObservationStore::new(5);
        store.append(reading(1));
        store.append(reading(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_all_discards_previous_contents() {
        let mut store = ObservationStore::new(4);
        store.append(reading(100));
        store.replace_all((0..3).map(reading).collect());

        let temps: Vec<f64> = store.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_replace_all_truncates_to_capacity() {
        let mut store = ObservationStore::new(4);
        store.replace_all((0..10).map(reading).collect());

        let temps: Vec<f64> = store.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_recent_window() {
        let mut store = ObservationStore::new(10);
        store.replace_all((0..6).map(reading).collect());

        let window = store.recent_window(3);
        let temps: Vec<f64> = window.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![3.0, 4.0, 5.0]);
        assert_eq!(store.recent_window(50).len(), 6);
    }
}
