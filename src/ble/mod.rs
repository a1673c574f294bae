//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S132 in **Peripheral** role:
//!
//! 1. **Advertiser** - the beacon protocol engine: broadcasts beacon frames
//!    and, on command, a connectable window (see [`advertiser`]).
//! 2. **Stack replies** - raw SoftDevice calls answering pairing, system
//!    attribute and MTU requests (see [`replies`]).
//! 3. **Link monitors** - the connection-parameter and advertising observers
//!    that sit first and last in the dispatch order.
//!
//! Connection parameters are requested on each new link by the advertiser,
//! following [`beacon_fw::conn_params::UpdateSchedule`].
//!
//! Events are handed to the main loop through the deferred-work queue
//! defined in `main.rs`.

pub mod advertiser;
pub mod replies;

use beacon_fw::config::{DEVICE_NAME, GATT_MTU_SIZE_DEFAULT};
use beacon_fw::conn_params::PREFERRED;
use beacon_fw::error::Result;
use beacon_fw::events::{ConnHandle, StackEvent};
use beacon_fw::traits::StackObserver;
use defmt::info;
use nrf_softdevice::{raw, Softdevice};

#[embassy_executor::task]
pub async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// SoftDevice configuration: LF crystal, one peripheral link, default MTU.
pub fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 6,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: GATT_MTU_SIZE_DEFAULT,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// [`PREFERRED`] in SoftDevice layout.
pub fn preferred_conn_params() -> raw::ble_gap_conn_params_t {
    raw::ble_gap_conn_params_t {
        min_conn_interval: PREFERRED.min_interval,
        max_conn_interval: PREFERRED.max_interval,
        slave_latency: PREFERRED.slave_latency,
        conn_sup_timeout: PREFERRED.supervision_timeout,
    }
}

/// Publish our preferred connection parameters (PPCP).
///
/// Returns the SoftDevice error code on failure.
pub fn set_preferred_conn_params() -> core::result::Result<(), u32> {
    let params = preferred_conn_params();
    let ret = unsafe { raw::sd_ble_gap_ppcp_set(&params) };
    if ret == raw::NRF_SUCCESS {
        Ok(())
    } else {
        Err(ret)
    }
}

/// First consumer in the dispatch order: tracks the link whose parameters
/// the advertiser is negotiating (see [`advertiser`]).
#[derive(Default)]
pub struct ConnParamsMonitor {
    link: Option<ConnHandle>,
}

impl StackObserver for ConnParamsMonitor {
    fn on_stack_event(&mut self, event: &StackEvent) -> Result<()> {
        match *event {
            StackEvent::ConnectionEstablished { conn } => {
                info!(
                    "link {}: negotiating interval {}..{} x1.25ms",
                    conn.0, PREFERRED.min_interval, PREFERRED.max_interval
                );
                self.link = Some(conn);
            }
            StackEvent::ConnectionLost { conn } if self.link == Some(conn) => {
                self.link = None;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Last consumer in the dispatch order: counts the links served by the
/// connectable advertising window.
#[derive(Default)]
pub struct AdvertisingMonitor {
    links_served: u32,
}

impl StackObserver for AdvertisingMonitor {
    fn on_stack_event(&mut self, event: &StackEvent) -> Result<()> {
        if let StackEvent::ConnectionLost { conn } = event {
            self.links_served = self.links_served.wrapping_add(1);
            info!("link {} closed, {} served", conn.0, self.links_served);
        }
        Ok(())
    }
}
