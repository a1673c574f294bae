//! Synchronous replies to the SoftDevice.
//!
//! Each call maps one-to-one onto an `sd_*` function; anything but
//! `NRF_SUCCESS` becomes a fatal [`StackError`].
//!
//! On this target `nrf-softdevice` answers security-parameter,
//! system-attribute and MTU requests itself inside `Softdevice::run`, and the
//! advertiser only forwards connect / disconnect. These replies therefore
//! never fire here; they are the coordinator's reply seam, covered by the
//! library tests, for producers that forward the raw requests.

use beacon_fw::error::{Result, StackError};
use beacon_fw::events::ConnHandle;
use beacon_fw::traits::StackReplies;
use core::ptr;
use nrf_softdevice::raw;

pub struct SoftDeviceReplies;

fn check(ret: u32, wrap: fn(u32) -> StackError) -> Result<()> {
    if ret == raw::NRF_SUCCESS {
        Ok(())
    } else {
        Err(wrap(ret).into())
    }
}

impl StackReplies for SoftDeviceReplies {
    fn reject_pairing(&mut self, conn: ConnHandle) -> Result<()> {
        let ret = unsafe {
            raw::sd_ble_gap_sec_params_reply(
                conn.0,
                raw::BLE_GAP_SEC_STATUS_PAIRING_NOT_SUPP as u8,
                ptr::null(),
                ptr::null(),
            )
        };
        check(ret, StackError::SecParamsReply)
    }

    fn set_empty_system_attributes(&mut self, conn: ConnHandle) -> Result<()> {
        let ret = unsafe { raw::sd_ble_gatts_sys_attr_set(conn.0, ptr::null(), 0, 0) };
        check(ret, StackError::SysAttrSet)
    }

    fn reply_mtu(&mut self, conn: ConnHandle, server_mtu: u16) -> Result<()> {
        let ret = unsafe { raw::sd_ble_gatts_exchange_mtu_reply(conn.0, server_mtu) };
        check(ret, StackError::MtuReply)
    }
}
