//! Low-power wait.
//!
//! nRF52832 with the SoftDevice enabled must not execute WFE directly;
//! `sd_app_evt_wait` parks the CPU in System ON idle until the next
//! application interrupt (or returns at once if one is already pending).

use beacon_fw::error::{Error, Result};
use beacon_fw::traits::Platform;
use nrf_softdevice::raw;

pub struct SoftDevicePower;

impl Platform for SoftDevicePower {
    fn wait_for_event(&mut self) -> Result<()> {
        let ret = unsafe { raw::sd_app_evt_wait() };
        if ret == raw::NRF_SUCCESS {
            Ok(())
        } else {
            Err(Error::Wait(ret))
        }
    }
}
