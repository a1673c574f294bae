//! The mode coordinator - the beacon's state machine.
//!
//! Sole owner of [`BeaconMode`] and the indicator levels derived from it.
//! The transition function is total: any (mode, event) pair without a rule
//! leaves the mode untouched.
//!
//! | From                        | Trigger                          | To                          |
//! |-----------------------------|----------------------------------|-----------------------------|
//! | `NonConnectableAdvertising` | registration button pressed      | unchanged, engine commanded |
//! | any                         | `ConnectableModeEntered`         | `ConnectableAdvertising`    |
//! | `ConnectableAdvertising`    | `ConnectableModeTimedOut`        | `NonConnectableAdvertising` |
//! | `ConnectableAdvertising`    | `ConnectionEstablished`          | `Connected`                 |
//! | `Connected`                 | `ConnectionLost`                 | `NonConnectableAdvertising` |
//!
//! Security, system-attribute and MTU requests are answered in every mode
//! without a transition.

use crate::config::{CoordinatorConfig, GATT_MTU_SIZE_DEFAULT};
use crate::error::Result;
use crate::events::{ButtonEvent, ControlId, ProtocolNotification, StackEvent};
use crate::mode::{BeaconMode, Indicator, IndicatorState};
use crate::traits::{IndicatorSink, ProtocolEngine, StackReplies};

pub struct Coordinator {
    mode: BeaconMode,
    indicators: IndicatorState,
    registration_control: ControlId,
    /// The engine was told to open a connectable window and has not yet
    /// reported it open or timed out.
    connectable_requested: bool,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            mode: config.start_mode,
            indicators: IndicatorState::for_mode(config.start_mode),
            registration_control: config.registration_control,
            connectable_requested: false,
        }
    }

    pub fn mode(&self) -> BeaconMode {
        self.mode
    }

    pub fn indicators(&self) -> IndicatorState {
        self.indicators
    }

    /// Drive both mode indicators to their initial levels. Called once at
    /// bring-up, before any event is processed.
    pub fn apply_initial_indicators(&self, sink: &mut impl IndicatorSink) {
        sink.set(Indicator::Connected, self.indicators.connected_indicator);
        sink.set(Indicator::Advertising, self.indicators.advertising_indicator);
    }

    /// Handle a dispatched stack event, replying to the stack where the
    /// event requires it.
    pub fn on_stack_event(
        &mut self,
        event: &StackEvent,
        replies: &mut impl StackReplies,
        sink: &mut impl IndicatorSink,
    ) -> Result<()> {
        match *event {
            StackEvent::ConnectionEstablished { conn } => {
                if self.mode == BeaconMode::ConnectableAdvertising {
                    info!("link {} up", conn.0);
                    self.transition(BeaconMode::Connected, sink);
                } else {
                    debug!("link {} up in {}, ignored", conn.0, self.mode);
                }
            }
            StackEvent::ConnectionLost { conn } => {
                if self.mode == BeaconMode::Connected {
                    info!("link {} down", conn.0);
                    self.transition(BeaconMode::NonConnectableAdvertising, sink);
                }
            }
            StackEvent::SecurityParamsRequested { conn } => {
                // Pairing not supported.
                replies.reject_pairing(conn)?;
            }
            StackEvent::SystemAttributesMissing { conn } => {
                // No system attributes have been stored.
                replies.set_empty_system_attributes(conn)?;
            }
            StackEvent::MtuExchangeRequested { conn, client_mtu } => {
                debug!("mtu request {} on link {}", client_mtu, conn.0);
                replies.reply_mtu(conn, GATT_MTU_SIZE_DEFAULT)?;
            }
        }
        Ok(())
    }

    /// Handle a debounced button edge.
    ///
    /// Only a press of the registration control while broadcasting
    /// non-connectably does anything. A second press while the command is
    /// in flight or already served is dropped.
    pub fn on_button(
        &mut self,
        event: &ButtonEvent,
        engine: &mut impl ProtocolEngine,
        sink: &mut impl IndicatorSink,
    ) -> Result<()> {
        let ButtonEvent::Pressed(control) = *event else {
            return Ok(());
        };
        if control != self.registration_control {
            return Ok(());
        }
        if self.mode != BeaconMode::NonConnectableAdvertising {
            debug!("registration press in {}, ignored", self.mode);
            return Ok(());
        }
        if self.connectable_requested {
            debug!("registration press while command in flight, ignored");
            return Ok(());
        }

        info!("registration press: starting connectable advertising");
        self.connectable_requested = true;
        match engine.start_connectable_advertising() {
            Ok(Some(note)) => self.on_notification(&note, sink),
            Ok(None) => {}
            Err(e) => {
                self.connectable_requested = false;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Handle a notification from the protocol engine.
    pub fn on_notification(&mut self, note: &ProtocolNotification, sink: &mut impl IndicatorSink) {
        match note {
            ProtocolNotification::AdvertisementTransmitted => {}
            ProtocolNotification::ConnectableModeEntered => {
                self.connectable_requested = false;
                self.transition(BeaconMode::ConnectableAdvertising, sink);
            }
            ProtocolNotification::ConnectableModeTimedOut => {
                self.connectable_requested = false;
                if self.mode == BeaconMode::ConnectableAdvertising {
                    self.transition(BeaconMode::NonConnectableAdvertising, sink);
                }
            }
        }
    }

    fn transition(&mut self, next: BeaconMode, sink: &mut impl IndicatorSink) {
        if next != self.mode {
            info!("mode {} -> {}", self.mode, next);
        }
        self.mode = next;

        let target = IndicatorState::for_mode(next);
        for (indicator, on) in self.indicators.changes_to(target) {
            sink.set(indicator, on);
        }
        self.indicators = target;
    }
}
