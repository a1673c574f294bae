//! Preferred connection parameters and the schedule for requesting them.
//!
//! After a link comes up the peripheral asks the central for
//! [`PREFERRED`], first after a delay, then at a slower pace for a bounded
//! number of retries. Running out of attempts keeps the link.

use crate::config::{
    BLE_CONN_INTERVAL_MAX, BLE_CONN_INTERVAL_MIN, BLE_SLAVE_LATENCY, BLE_SUP_TIMEOUT,
    FIRST_CONN_PARAMS_UPDATE_DELAY_MS, MAX_CONN_PARAMS_UPDATE_COUNT,
    NEXT_CONN_PARAMS_UPDATE_DELAY_MS,
};

/// Connection parameters in Bluetooth units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnParams {
    /// 1.25 ms units.
    pub min_interval: u16,
    /// 1.25 ms units.
    pub max_interval: u16,
    pub slave_latency: u16,
    /// 10 ms units.
    pub supervision_timeout: u16,
}

pub const PREFERRED: ConnParams = ConnParams {
    min_interval: BLE_CONN_INTERVAL_MIN,
    max_interval: BLE_CONN_INTERVAL_MAX,
    slave_latency: BLE_SLAVE_LATENCY,
    supervision_timeout: BLE_SUP_TIMEOUT,
};

impl ConnParams {
    /// Whether a central could accept these parameters: intervals within
    /// 7.5 ms..4 s and ordered, and a supervision timeout longer than
    /// `(1 + latency) * max_interval * 2`.
    pub const fn is_valid(&self) -> bool {
        if self.min_interval < 6 || self.max_interval > 3200 {
            return false;
        }
        if self.min_interval > self.max_interval {
            return false;
        }
        if self.supervision_timeout < 10 || self.supervision_timeout > 3200 {
            return false;
        }
        // Compare in 1.25 ms units: timeout * 10 ms = timeout * 8 units.
        let timeout = self.supervision_timeout as u32 * 8;
        let span = (1 + self.slave_latency as u32) * self.max_interval as u32 * 2;
        timeout > span
    }
}

/// Delays (ms) to wait before each update request on one link.
#[derive(Clone, Debug, Default)]
pub struct UpdateSchedule {
    attempts: u8,
}

impl UpdateSchedule {
    pub const fn new() -> Self {
        Self { attempts: 0 }
    }

    /// Requests made so far.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }
}

impl Iterator for UpdateSchedule {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.attempts >= MAX_CONN_PARAMS_UPDATE_COUNT {
            return None;
        }
        let delay = if self.attempts == 0 {
            FIRST_CONN_PARAMS_UPDATE_DELAY_MS
        } else {
            NEXT_CONN_PARAMS_UPDATE_DELAY_MS
        };
        self.attempts += 1;
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_parameters_are_acceptable() {
        assert!(PREFERRED.is_valid());
    }

    #[test]
    fn supervision_timeout_must_cover_latency() {
        let tight = ConnParams {
            min_interval: 80,
            max_interval: 160,
            slave_latency: 9,
            // 4 s is not longer than (1 + 9) * 200 ms * 2
            supervision_timeout: 400,
        };
        assert!(!tight.is_valid());

        let swapped = ConnParams {
            min_interval: 160,
            max_interval: 80,
            ..PREFERRED
        };
        assert!(!swapped.is_valid());
    }

    #[test]
    fn first_request_waits_then_retries_are_spaced() {
        let delays: Vec<u64> = UpdateSchedule::new().collect();
        assert_eq!(delays.len(), MAX_CONN_PARAMS_UPDATE_COUNT as usize);
        assert_eq!(delays[0], FIRST_CONN_PARAMS_UPDATE_DELAY_MS);
        assert!(delays[1..]
            .iter()
            .all(|&d| d == NEXT_CONN_PARAMS_UPDATE_DELAY_MS));
    }

    #[test]
    fn schedule_is_bounded() {
        let mut schedule = UpdateSchedule::new();
        while schedule.next().is_some() {}
        assert_eq!(schedule.attempts(), MAX_CONN_PARAMS_UPDATE_COUNT);
        assert_eq!(schedule.next(), None);
    }
}
