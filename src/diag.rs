//! Buffered diagnostic log of mode transitions.
//!
//! The main loop records every mode change here and flushes one record per
//! iteration through the logger, so logging never delays event handling.
//! When the buffer is full the oldest record is dropped and counted.

use heapless::Deque;

use crate::mode::BeaconMode;
use crate::traits::LogSink;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: BeaconMode,
    pub to: BeaconMode,
}

pub struct DiagnosticLog<const N: usize> {
    records: Deque<Transition, N>,
    dropped: u32,
    written: u32,
}

impl<const N: usize> DiagnosticLog<N> {
    pub const fn new() -> Self {
        Self {
            records: Deque::new(),
            dropped: 0,
            written: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.records.len()
    }

    /// Records discarded because the buffer was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Records flushed so far.
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Oldest buffered record.
    pub fn peek(&self) -> Option<&Transition> {
        self.records.front()
    }
}

impl<const N: usize> Default for DiagnosticLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LogSink for DiagnosticLog<N> {
    fn record(&mut self, from: BeaconMode, to: BeaconMode) {
        if self.records.is_full() {
            self.records.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Cannot fail: a slot was freed above.
        let _ = self.records.push_back(Transition { from, to });
    }

    fn has_pending(&self) -> bool {
        !self.records.is_empty()
    }

    fn flush_one(&mut self) {
        if let Some(t) = self.records.pop_front() {
            info!("[diag] {} -> {} (dropped {})", t.from, t.to, self.dropped);
            self.written = self.written.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flushes_one_record_at_a_time() {
        let mut log: DiagnosticLog<4> = DiagnosticLog::new();
        log.record(
            BeaconMode::NonConnectableAdvertising,
            BeaconMode::ConnectableAdvertising,
        );
        log.record(BeaconMode::ConnectableAdvertising, BeaconMode::Connected);
        assert!(log.has_pending());
        assert_eq!(log.pending(), 2);

        log.flush_one();
        assert_eq!(log.pending(), 1);
        assert_eq!(
            log.peek(),
            Some(&Transition {
                from: BeaconMode::ConnectableAdvertising,
                to: BeaconMode::Connected
            })
        );

        log.flush_one();
        assert!(!log.has_pending());
        assert_eq!(log.written(), 2);

        // Flushing an empty log is harmless.
        log.flush_one();
        assert_eq!(log.written(), 2);
    }

    #[test]
    fn full_log_drops_oldest() {
        let mut log: DiagnosticLog<2> = DiagnosticLog::new();
        log.record(BeaconMode::Idle, BeaconMode::NonConnectableAdvertising);
        log.record(
            BeaconMode::NonConnectableAdvertising,
            BeaconMode::ConnectableAdvertising,
        );
        log.record(BeaconMode::ConnectableAdvertising, BeaconMode::Connected);

        assert_eq!(log.pending(), 2);
        assert_eq!(log.dropped(), 1);
        assert_eq!(
            log.peek().map(|t| t.from),
            Some(BeaconMode::NonConnectableAdvertising)
        );
    }
}
