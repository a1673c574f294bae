//! Unified error type for beacon-fw.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Every variant is fatal: the main loop stops on the first one and the
//! firmware resets, since indicator state can no longer be trusted.

/// Top-level error type used across the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Radio stack
    /// A synchronous reply to the radio stack was rejected.
    Stack(StackError),

    // Scheduling
    /// The deferred-work queue overflowed and an interrupt-sourced
    /// event was lost.
    QueueFull,

    /// The low-power wait call returned an error code.
    Wait(u32),
}

/// Which stack reply failed, with the raw SoftDevice error code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackError {
    /// `sd_ble_gap_sec_params_reply` failed.
    SecParamsReply(u32),
    /// `sd_ble_gatts_sys_attr_set` failed.
    SysAttrSet(u32),
    /// `sd_ble_gatts_exchange_mtu_reply` failed.
    MtuReply(u32),
}

// Convenience conversions

impl From<StackError> for Error {
    fn from(e: StackError) -> Self {
        Error::Stack(e)
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
