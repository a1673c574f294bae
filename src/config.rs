//! Application-wide constants and compile-time configuration.
//!
//! All pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

use crate::events::ControlId;
use crate::mode::BeaconMode;

// Scheduling

/// Capacity of the deferred-work queue shared with interrupt-context producers.
pub const WORK_QUEUE_CAPACITY: usize = 16;

/// Number of mode-transition records the diagnostic log can buffer.
pub const DIAG_LOG_CAPACITY: usize = 8;

// BLE

/// GAP device name shown while connectable.
pub const DEVICE_NAME: &str = "RuuviEB";

/// Default ATT MTU (`GATT_MTU_SIZE_DEFAULT`); we never negotiate a larger one.
pub const GATT_MTU_SIZE_DEFAULT: u16 = 23;

/// Preferred connection interval range (in 1.25 ms units).
/// 80 = 100 ms, 160 = 200 ms.
pub const BLE_CONN_INTERVAL_MIN: u16 = 80;
pub const BLE_CONN_INTERVAL_MAX: u16 = 160;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// Delay after a link comes up before the first connection-parameter
/// update request (ms).
pub const FIRST_CONN_PARAMS_UPDATE_DELAY_MS: u64 = 5_000;

/// Delay between a failed update request and the next attempt (ms).
pub const NEXT_CONN_PARAMS_UPDATE_DELAY_MS: u64 = 30_000;

/// Update requests made per link before giving up (the link stays up).
pub const MAX_CONN_PARAMS_UPDATE_COUNT: u8 = 3;

/// Non-connectable advertising interval (in 0.625 ms units). 1600 = 1 s.
pub const BEACON_ADV_INTERVAL: u32 = 1600;

/// Length of one non-connectable advertising window (in 10 ms units).
/// The engine reports `AdvertisementTransmitted` at the end of each window.
pub const BEACON_ADV_WINDOW: u16 = 1000;

/// Connectable advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const CONNECTABLE_ADV_INTERVAL: u32 = 160;

/// How long connectable advertising stays up without a connection
/// (in 10 ms units). 6000 = 60 s.
pub const CONNECTABLE_ADV_TIMEOUT: u16 = 6000;

// GPIO pin assignments (RuuviTag rev B defaults)
//
// These are logical names; the `embassy_nrf::peripherals::*` pins are
// selected in `main.rs`.  Adjust for other boards.
//
//   Button 1 (registration) → P0.13
//   LED 0 (red)   - connection / connectable indicator → P0.17
//   LED 1 (green) - awake indicator                    → P0.19
//   SPI CS humidity sensor → P0.03
//   SPI CS accelerometer   → P0.08

/// Control id of the registration button (button 1).
pub const REGISTRATION_CONTROL: ControlId = ControlId(1);

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 100;

/// Runtime configuration of the mode coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoordinatorConfig {
    /// Mode entered at bring-up: `NonConnectableAdvertising` to start
    /// broadcasting immediately, `Idle` to stay silent.
    pub start_mode: BeaconMode,
    /// The control whose press requests connectable advertising.
    pub registration_control: ControlId,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            start_mode: BeaconMode::NonConnectableAdvertising,
            registration_control: REGISTRATION_CONTROL,
        }
    }
}
