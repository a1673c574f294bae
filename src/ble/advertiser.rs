//! Beacon advertising engine.
//!
//! Runs on the high-priority executor. The main loop talks to it through
//! [`RadioEngine`] (a command signal); the task answers through the
//! deferred-work queue:
//!
//! - `AdvertisementTransmitted` after every non-connectable window,
//! - `ConnectableModeEntered` / `ConnectableModeTimedOut` around the
//!   connectable window,
//! - `ConnectionEstablished` / `ConnectionLost` for the one link it serves.
//!
//! While a link is up the task also requests the preferred connection
//! parameters on it.

use beacon_fw::config::{
    BEACON_ADV_INTERVAL, BEACON_ADV_WINDOW, CONNECTABLE_ADV_INTERVAL, CONNECTABLE_ADV_TIMEOUT,
};
use beacon_fw::conn_params::UpdateSchedule;
use beacon_fw::error::Result;
use beacon_fw::events::{evt_id, ProtocolNotification, RawStackEvent, StackEvent};
use beacon_fw::traits::ProtocolEngine;
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::{peripheral, Connection};
use nrf_softdevice::Softdevice;

use crate::{ble, post};

/// How often the served link is polled for disconnection.
const LINK_POLL_MS: u64 = 250;

/// Back-off after the SoftDevice refuses to advertise.
const RETRY_MS: u64 = 1000;

/// Eddystone-URL frame: flags, service UUID 0xFEAA, `https://ruuvi.com`.
#[rustfmt::skip]
static BEACON_FRAME: [u8; 20] = [
    0x02, 0x01, 0x06,
    0x03, 0x03, 0xAA, 0xFE,
    0x0C, 0x16, 0xAA, 0xFE, 0x10, 0xEE, 0x03, b'r', b'u', b'u', b'v', b'i', 0x07,
];

/// Connectable advertising data: flags and the complete local name.
#[rustfmt::skip]
static CONNECTABLE_ADV_DATA: [u8; 12] = [
    0x02, 0x01, 0x06,
    0x08, 0x09, b'R', b'u', b'u', b'v', b'i', b'E', b'B',
];

#[rustfmt::skip]
static SCAN_DATA: [u8; 4] = [
    0x03, 0x03, 0xAA, 0xFE,
];

#[derive(Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum EngineCommand {
    StartConnectable,
}

pub static ENGINE_COMMAND: Signal<CriticalSectionRawMutex, EngineCommand> = Signal::new();

/// Main-loop side of the engine.
pub struct RadioEngine;

impl ProtocolEngine for RadioEngine {
    fn start_connectable_advertising(&mut self) -> Result<Option<ProtocolNotification>> {
        ENGINE_COMMAND.signal(EngineCommand::StartConnectable);
        // The task reports ConnectableModeEntered once the window is up.
        Ok(None)
    }

    fn on_stack_event(&mut self, event: &StackEvent) -> Result<Option<ProtocolNotification>> {
        debug!("engine saw {}", event);
        Ok(None)
    }
}

fn post_raw(evt_id: u16, conn_handle: u16) {
    let raw = RawStackEvent {
        evt_id,
        conn_handle,
        client_mtu: 0,
    };
    if let Some(event) = StackEvent::classify(&raw) {
        post(event);
    }
}

/// The advertising engine task.
///
/// With `broadcast` false the beacon stays silent until the first command.
#[embassy_executor::task]
pub async fn advertiser_task(sd: &'static Softdevice, broadcast: bool) -> ! {
    if !broadcast {
        ENGINE_COMMAND.wait().await;
        connectable_window(sd).await;
    }

    let config = peripheral::Config {
        interval: BEACON_ADV_INTERVAL,
        timeout: Some(BEACON_ADV_WINDOW),
        ..Default::default()
    };

    loop {
        let adv = peripheral::NonconnectableAdvertisement::NonscannableUndirected {
            adv_data: &BEACON_FRAME,
        };
        match select(peripheral::advertise(sd, adv, &config), ENGINE_COMMAND.wait()).await {
            Either::First(Ok(())) | Either::First(Err(peripheral::AdvertiseError::Timeout)) => {
                post(ProtocolNotification::AdvertisementTransmitted);
            }
            Either::First(Err(e)) => {
                warn!("beacon advertising failed: {}", e);
                Timer::after(Duration::from_millis(RETRY_MS)).await;
            }
            Either::Second(EngineCommand::StartConnectable) => {
                connectable_window(sd).await;
            }
        }
    }
}

async fn connectable_window(sd: &'static Softdevice) {
    // Repeated commands while the window is pending collapse into one.
    ENGINE_COMMAND.reset();

    let config = peripheral::Config {
        interval: CONNECTABLE_ADV_INTERVAL,
        timeout: Some(CONNECTABLE_ADV_TIMEOUT),
        ..Default::default()
    };
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &CONNECTABLE_ADV_DATA,
        scan_data: &SCAN_DATA,
    };

    info!("connectable advertising started");
    post(ProtocolNotification::ConnectableModeEntered);

    match peripheral::advertise_connectable(sd, adv, &config).await {
        Ok(conn) => serve(conn).await,
        Err(peripheral::AdvertiseError::Timeout) => {
            info!("connectable advertising timed out");
            post(ProtocolNotification::ConnectableModeTimedOut);
        }
        Err(e) => {
            warn!("connectable advertising failed: {}", e);
            post(ProtocolNotification::ConnectableModeTimedOut);
        }
    }

    ENGINE_COMMAND.reset();
}

async fn serve(conn: Connection) {
    let Some(handle) = conn.handle() else {
        // Link dropped before we saw it; fall back to beaconing.
        post(ProtocolNotification::ConnectableModeTimedOut);
        return;
    };
    post_raw(evt_id::BLE_GAP_EVT_CONNECTED, handle);

    select(negotiate(&conn), link_closed(&conn)).await;

    post_raw(evt_id::BLE_GAP_EVT_DISCONNECTED, handle);
}

async fn link_closed(conn: &Connection) {
    while conn.handle().is_some() {
        Timer::after(Duration::from_millis(LINK_POLL_MS)).await;
    }
}

/// Request the preferred connection parameters, retrying on failure.
/// Never completes; the link outlives a failed negotiation.
async fn negotiate(conn: &Connection) {
    let mut schedule = UpdateSchedule::new();
    while let Some(delay) = schedule.next() {
        Timer::after(Duration::from_millis(delay)).await;
        match conn.set_conn_params(ble::preferred_conn_params()) {
            Ok(()) => {
                debug!("conn params requested (attempt {})", schedule.attempts());
                break;
            }
            Err(e) => warn!("conn params attempt {} failed: {}", schedule.attempts(), e),
        }
    }
    core::future::pending::<()>().await
}
