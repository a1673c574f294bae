//! The main scheduling loop.
//!
//! One iteration:
//! 1. drain every queued work item, in FIFO order, to completion;
//! 2. if the diagnostic sink still holds output, flush one unit and start
//!    over without sleeping;
//! 3. otherwise switch the awake indicator off, park the processor until the
//!    next interrupt, and switch it back on.
//!
//! Nothing in here blocks except step 3. The loop never ends on its own; it
//! only returns the fatal error that stopped it.

use core::convert::Infallible;

use crate::coordinator::Coordinator;
use crate::dispatch::{dispatch, Targets};
use crate::error::Result;
use crate::events::WorkItem;
use crate::mode::Indicator;
use crate::queue::WorkSource;
use crate::traits::{IndicatorSink, LogSink, Platform, ProtocolEngine, StackObserver, StackReplies};

/// Counters kept by the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopStats {
    /// Work items processed.
    pub items: u32,
    /// Diagnostic units flushed.
    pub flushes: u32,
    /// Low-power waits entered.
    pub sleeps: u32,
}

/// What a single iteration ended with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Iteration {
    /// Flushed one diagnostic unit; the next iteration starts right away.
    Flushed,
    /// Slept and woke up on an interrupt.
    Slept,
}

/// The loop and the process-lifetime context it owns.
pub struct MainLoop<CP, R, E, AD, S, L, P> {
    pub coordinator: Coordinator,
    pub conn_params: CP,
    pub replies: R,
    pub engine: E,
    pub advertising: AD,
    pub indicators: S,
    pub log: L,
    pub platform: P,
    stats: LoopStats,
}

impl<CP, R, E, AD, S, L, P> MainLoop<CP, R, E, AD, S, L, P>
where
    CP: StackObserver,
    R: StackReplies,
    E: ProtocolEngine,
    AD: StackObserver,
    S: IndicatorSink,
    L: LogSink,
    P: Platform,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coordinator: Coordinator,
        conn_params: CP,
        replies: R,
        engine: E,
        advertising: AD,
        indicators: S,
        log: L,
        platform: P,
    ) -> Self {
        Self {
            coordinator,
            conn_params,
            replies,
            engine,
            advertising,
            indicators,
            log,
            platform,
            stats: LoopStats::default(),
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Run forever; returns only with the error that halted the loop.
    pub fn run(&mut self, work: &mut impl WorkSource) -> Result<Infallible> {
        loop {
            self.iterate(work)?;
        }
    }

    /// One pass: drain, then flush one log unit or sleep.
    pub fn iterate(&mut self, work: &mut impl WorkSource) -> Result<Iteration> {
        self.drain(work)?;

        if self.log.has_pending() {
            self.log.flush_one();
            self.stats.flushes = self.stats.flushes.wrapping_add(1);
            return Ok(Iteration::Flushed);
        }

        self.indicators.set(Indicator::Awake, false);
        self.stats.sleeps = self.stats.sleeps.wrapping_add(1);
        let woke = self.platform.wait_for_event();
        self.indicators.set(Indicator::Awake, true);
        woke?;
        Ok(Iteration::Slept)
    }

    /// Process every queued item to completion, logging mode changes.
    pub fn drain(&mut self, work: &mut impl WorkSource) -> Result<()> {
        while let Some(item) = work.next()? {
            let before = self.coordinator.mode();
            self.handle(&item)?;
            let after = self.coordinator.mode();
            if before != after {
                self.log.record(before, after);
            }
            self.stats.items = self.stats.items.wrapping_add(1);
        }
        Ok(())
    }

    fn handle(&mut self, item: &WorkItem) -> Result<()> {
        match item {
            WorkItem::Stack(event) => {
                let mut targets = Targets {
                    conn_params: &mut self.conn_params,
                    coordinator: &mut self.coordinator,
                    replies: &mut self.replies,
                    engine: &mut self.engine,
                    advertising: &mut self.advertising,
                    indicators: &mut self.indicators,
                };
                dispatch(event, &mut targets)
            }
            WorkItem::Button(event) => {
                self.coordinator
                    .on_button(event, &mut self.engine, &mut self.indicators)
            }
            WorkItem::Protocol(note) => {
                self.coordinator.on_notification(note, &mut self.indicators);
                Ok(())
            }
        }
    }
}
