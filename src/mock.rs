//! Recording doubles for the trait seams, shared by the unit tests.

use crate::error::{Error, Result, StackError};
use crate::events::{ConnHandle, ProtocolNotification, StackEvent};
use crate::mode::{BeaconMode, Indicator};
use crate::traits::{IndicatorSink, LogSink, Platform, ProtocolEngine, StackObserver, StackReplies};

#[derive(Default)]
pub struct Recorder {
    pub sets: Vec<(Indicator, bool)>,
}

impl IndicatorSink for Recorder {
    fn set(&mut self, indicator: Indicator, on: bool) {
        self.sets.push((indicator, on));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    PairingRejected(ConnHandle),
    EmptySystemAttributes(ConnHandle),
    Mtu(ConnHandle, u16),
}

#[derive(Default)]
pub struct Replies {
    pub sent: Vec<Reply>,
    pub fail_with: Option<StackError>,
}

impl Replies {
    fn record(&mut self, reply: Reply) -> Result<()> {
        if let Some(e) = self.fail_with {
            return Err(Error::Stack(e));
        }
        self.sent.push(reply);
        Ok(())
    }
}

impl StackReplies for Replies {
    fn reject_pairing(&mut self, conn: ConnHandle) -> Result<()> {
        self.record(Reply::PairingRejected(conn))
    }

    fn set_empty_system_attributes(&mut self, conn: ConnHandle) -> Result<()> {
        self.record(Reply::EmptySystemAttributes(conn))
    }

    fn reply_mtu(&mut self, conn: ConnHandle, server_mtu: u16) -> Result<()> {
        self.record(Reply::Mtu(conn, server_mtu))
    }
}

#[derive(Default)]
pub struct Engine {
    pub start_commands: usize,
    pub seen: Vec<StackEvent>,
    /// Report `ConnectableModeEntered` from inside the start command.
    pub enter_immediately: bool,
    /// Notification to return from every `on_stack_event`.
    pub on_event: Option<ProtocolNotification>,
    /// Fail every start command with this error.
    pub refuse: Option<Error>,
}

impl ProtocolEngine for Engine {
    fn start_connectable_advertising(&mut self) -> Result<Option<ProtocolNotification>> {
        self.start_commands += 1;
        if let Some(e) = self.refuse {
            return Err(e);
        }
        Ok(self
            .enter_immediately
            .then_some(ProtocolNotification::ConnectableModeEntered))
    }

    fn on_stack_event(&mut self, event: &StackEvent) -> Result<Option<ProtocolNotification>> {
        self.seen.push(*event);
        Ok(self.on_event)
    }
}

#[derive(Default)]
pub struct Observer {
    pub seen: Vec<StackEvent>,
}

impl StackObserver for Observer {
    fn on_stack_event(&mut self, event: &StackEvent) -> Result<()> {
        self.seen.push(*event);
        Ok(())
    }
}

/// Counts sleeps; optionally fails the wait call.
#[derive(Default)]
pub struct Cpu {
    pub sleeps: usize,
    pub fail_with: Option<u32>,
}

impl Platform for Cpu {
    fn wait_for_event(&mut self) -> Result<()> {
        if let Some(code) = self.fail_with {
            return Err(Error::Wait(code));
        }
        self.sleeps += 1;
        Ok(())
    }
}

/// A log sink that counts units instead of storing them.
#[derive(Default)]
pub struct Backlog {
    pub pending: usize,
    pub flushed: usize,
    pub transitions: Vec<(BeaconMode, BeaconMode)>,
}

impl LogSink for Backlog {
    fn record(&mut self, from: BeaconMode, to: BeaconMode) {
        self.transitions.push((from, to));
        self.pending += 1;
    }

    fn has_pending(&self) -> bool {
        self.pending > 0
    }

    fn flush_one(&mut self) {
        self.pending -= 1;
        self.flushed += 1;
    }
}
