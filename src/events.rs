//! Event records flowing into the coordinator.
//!
//! Everything here is `Copy` and owns no references: producers running in
//! interrupt context build these records and hand them to the deferred-work
//! queue, and the main loop consumes them later.

/// SoftDevice event ids we classify. Values match the S132/S140 headers.
pub mod evt_id {
    pub const BLE_GAP_EVT_CONNECTED: u16 = 0x10;
    pub const BLE_GAP_EVT_DISCONNECTED: u16 = 0x11;
    pub const BLE_GAP_EVT_SEC_PARAMS_REQUEST: u16 = 0x13;
    pub const BLE_GATTS_EVT_SYS_ATTR_MISSING: u16 = 0x52;
    pub const BLE_GATTS_EVT_EXCHANGE_MTU_REQUEST: u16 = 0x55;
}

/// Radio-stack connection handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnHandle(pub u16);

/// Identifier of a physical control (button).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlId(pub u8);

/// Opaque event record as delivered by the radio stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawStackEvent {
    pub evt_id: u16,
    pub conn_handle: u16,
    /// Client RX MTU; only meaningful for MTU exchange requests.
    pub client_mtu: u16,
}

/// Connection lifecycle events the coordinator cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackEvent {
    ConnectionEstablished { conn: ConnHandle },
    ConnectionLost { conn: ConnHandle },
    SecurityParamsRequested { conn: ConnHandle },
    SystemAttributesMissing { conn: ConnHandle },
    MtuExchangeRequested { conn: ConnHandle, client_mtu: u16 },
}

impl StackEvent {
    /// Classify a raw stack record. Unknown event kinds yield `None` and are
    /// dropped by the caller, so newer stacks can add events freely.
    pub fn classify(raw: &RawStackEvent) -> Option<Self> {
        let conn = ConnHandle(raw.conn_handle);
        let event = match raw.evt_id {
            evt_id::BLE_GAP_EVT_CONNECTED => StackEvent::ConnectionEstablished { conn },
            evt_id::BLE_GAP_EVT_DISCONNECTED => StackEvent::ConnectionLost { conn },
            evt_id::BLE_GAP_EVT_SEC_PARAMS_REQUEST => StackEvent::SecurityParamsRequested { conn },
            evt_id::BLE_GATTS_EVT_SYS_ATTR_MISSING => StackEvent::SystemAttributesMissing { conn },
            evt_id::BLE_GATTS_EVT_EXCHANGE_MTU_REQUEST => StackEvent::MtuExchangeRequested {
                conn,
                client_mtu: raw.client_mtu,
            },
            _ => return None,
        };
        Some(event)
    }

    pub fn conn(&self) -> ConnHandle {
        match *self {
            StackEvent::ConnectionEstablished { conn }
            | StackEvent::ConnectionLost { conn }
            | StackEvent::SecurityParamsRequested { conn }
            | StackEvent::SystemAttributesMissing { conn }
            | StackEvent::MtuExchangeRequested { conn, .. } => conn,
        }
    }
}

/// Notifications from the beacon protocol engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolNotification {
    /// A non-connectable advertising window completed.
    AdvertisementTransmitted,
    /// Connectable advertising started.
    ConnectableModeEntered,
    /// Connectable advertising ended without a connection; broadcasting
    /// resumed.
    ConnectableModeTimedOut,
}

/// Debounced button edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Pressed(ControlId),
    Released(ControlId),
}

/// One unit of deferred work, posted from interrupt context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkItem {
    Stack(StackEvent),
    Button(ButtonEvent),
    Protocol(ProtocolNotification),
}

impl From<StackEvent> for WorkItem {
    fn from(e: StackEvent) -> Self {
        WorkItem::Stack(e)
    }
}

impl From<ButtonEvent> for WorkItem {
    fn from(e: ButtonEvent) -> Self {
        WorkItem::Button(e)
    }
}

impl From<ProtocolNotification> for WorkItem {
    fn from(n: ProtocolNotification) -> Self {
        WorkItem::Protocol(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(evt_id: u16) -> RawStackEvent {
        RawStackEvent {
            evt_id,
            conn_handle: 7,
            client_mtu: 0,
        }
    }

    #[test]
    fn classify_known_events() {
        let conn = ConnHandle(7);
        assert_eq!(
            StackEvent::classify(&raw(evt_id::BLE_GAP_EVT_CONNECTED)),
            Some(StackEvent::ConnectionEstablished { conn })
        );
        assert_eq!(
            StackEvent::classify(&raw(evt_id::BLE_GAP_EVT_DISCONNECTED)),
            Some(StackEvent::ConnectionLost { conn })
        );
        assert_eq!(
            StackEvent::classify(&raw(evt_id::BLE_GAP_EVT_SEC_PARAMS_REQUEST)),
            Some(StackEvent::SecurityParamsRequested { conn })
        );
        assert_eq!(
            StackEvent::classify(&raw(evt_id::BLE_GATTS_EVT_SYS_ATTR_MISSING)),
            Some(StackEvent::SystemAttributesMissing { conn })
        );
    }

    #[test]
    fn classify_mtu_request_keeps_client_mtu() {
        let evt = RawStackEvent {
            evt_id: evt_id::BLE_GATTS_EVT_EXCHANGE_MTU_REQUEST,
            conn_handle: 1,
            client_mtu: 247,
        };
        assert_eq!(
            StackEvent::classify(&evt),
            Some(StackEvent::MtuExchangeRequested {
                conn: ConnHandle(1),
                client_mtu: 247
            })
        );
    }

    #[test]
    fn classify_ignores_unknown_events() {
        // Connection parameter update, HVN TX complete, vendor range.
        for id in [0x12, 0x57, 0xFFFF] {
            assert_eq!(StackEvent::classify(&raw(id)), None);
        }
    }

    #[test]
    fn conn_handle_accessor() {
        let evt = StackEvent::MtuExchangeRequested {
            conn: ConnHandle(3),
            client_mtu: 23,
        };
        assert_eq!(evt.conn(), ConnHandle(3));
    }
}
