//! Seams between the coordinator and the hardware / external subsystems.
//!
//! The library only talks to the outside world through these traits; the
//! embedded binary implements them on top of GPIO, the SoftDevice and the
//! advertising task, and the tests implement them with recorders.

use crate::error::Result;
use crate::events::{ConnHandle, ProtocolNotification, StackEvent};
use crate::mode::{BeaconMode, Indicator};

/// Level-set commands for the indicator lights. No acknowledgement.
pub trait IndicatorSink {
    fn set(&mut self, indicator: Indicator, on: bool);
}

/// Synchronous replies to the radio stack. Each call is made at most once
/// per received event; a failure means the stack is inconsistent.
pub trait StackReplies {
    /// Reject pairing (`BLE_GAP_SEC_STATUS_PAIRING_NOT_SUPP`).
    fn reject_pairing(&mut self, conn: ConnHandle) -> Result<()>;

    /// Tell the stack there are no persisted system attributes.
    fn set_empty_system_attributes(&mut self, conn: ConnHandle) -> Result<()>;

    /// Answer an MTU exchange with our server MTU.
    fn reply_mtu(&mut self, conn: ConnHandle, server_mtu: u16) -> Result<()>;
}

/// A subsystem that observes every dispatched stack event.
pub trait StackObserver {
    fn on_stack_event(&mut self, event: &StackEvent) -> Result<()>;
}

/// The beacon protocol engine: owns payload content and advertising timing.
///
/// Notifications it can produce synchronously are returned and delivered to
/// the coordinator right away; asynchronous ones arrive through the
/// deferred-work queue.
pub trait ProtocolEngine {
    /// Begin connectable advertising. Idempotent on the engine side.
    fn start_connectable_advertising(&mut self) -> Result<Option<ProtocolNotification>>;

    /// Observe a dispatched stack event.
    fn on_stack_event(&mut self, event: &StackEvent) -> Result<Option<ProtocolNotification>>;
}

/// A secondary diagnostic sink with buffered output.
pub trait LogSink {
    /// Buffer a mode transition for later output.
    fn record(&mut self, from: BeaconMode, to: BeaconMode);

    /// Whether buffered output remains.
    fn has_pending(&self) -> bool;

    /// Flush one unit of buffered output.
    fn flush_one(&mut self);
}

/// Processor power control.
pub trait Platform {
    /// Park the processor until the next interrupt.
    fn wait_for_event(&mut self) -> Result<()>;
}
