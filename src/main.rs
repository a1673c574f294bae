//! beacon-fw - RuuviTag (nRF52832 + S132) beacon firmware.
//!
//! Radio, button and timer work runs on an interrupt-priority executor and
//! only ever posts [`WorkItem`]s into the deferred-work queue. Thread mode
//! runs the coordinator's main loop: drain the queue, flush diagnostics,
//! sleep in `sd_app_evt_wait` until the next interrupt.

#![no_std]
#![no_main]

mod ble;
mod power;
mod ui;

use core::cell::RefCell;

use beacon_fw::config::{
    CoordinatorConfig, DIAG_LOG_CAPACITY, REGISTRATION_CONTROL, WORK_QUEUE_CAPACITY,
};
use beacon_fw::diag::DiagnosticLog;
use beacon_fw::error::Result;
use beacon_fw::queue::{WorkQueue, WorkSource};
use beacon_fw::{Coordinator, MainLoop, WorkItem};
use cortex_m::peripheral::SCB;
use cortex_m_rt::entry;
use defmt::{error, info, unwrap};
use embassy_executor::InterruptExecutor;
use embassy_nrf::gpio::{Level, Output, OutputDrive, Pin};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::ble::advertiser::RadioEngine;
use crate::ble::replies::SoftDeviceReplies;
use crate::ble::{AdvertisingMonitor, ConnParamsMonitor};
use crate::power::SoftDevicePower;
use crate::ui::leds::Leds;

// - Deferred work --------------------------

static WORK_QUEUE: Mutex<CriticalSectionRawMutex, RefCell<WorkQueue<WORK_QUEUE_CAPACITY>>> =
    Mutex::new(RefCell::new(WorkQueue::new()));

/// Enqueue work from any context. Overflow is latched by the queue and
/// halts the main loop on its next read.
pub fn post(item: impl Into<WorkItem>) {
    let item = item.into();
    WORK_QUEUE.lock(|q| {
        let _ = q.borrow_mut().post(item);
    });
}

/// Thread-mode view of [`WORK_QUEUE`].
struct SharedQueue;

impl WorkSource for SharedQueue {
    fn next(&mut self) -> Result<Option<WorkItem>> {
        WORK_QUEUE.lock(|q| q.borrow_mut().next())
    }
}

// - Executors ----------------------------

static EXECUTOR_RADIO: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn EGU1_SWI1() {
    EXECUTOR_RADIO.on_interrupt()
}

type BeaconLoop = MainLoop<
    ConnParamsMonitor,
    SoftDeviceReplies,
    RadioEngine,
    AdvertisingMonitor,
    Leds,
    DiagnosticLog<DIAG_LOG_CAPACITY>,
    SoftDevicePower,
>;

static MAIN_LOOP: StaticCell<BeaconLoop> = StaticCell::new();

#[entry]
fn main() -> ! {
    info!("beacon-fw starting");

    // - Peripherals --------------------------
    // SoftDevice reserves priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    // Hold the SPI sensors deselected so they stay in standby.
    let _cs_humidity = Output::new(p.P0_03, Level::High, OutputDrive::Standard);
    let _cs_accel = Output::new(p.P0_08, Level::High, OutputDrive::Standard);

    let mut leds = Leds::new(
        Output::new(p.P0_17.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_19.degrade(), Level::High, OutputDrive::Standard),
    );

    // - BLE ----------------------------
    let sd: &'static Softdevice = Softdevice::enable(&ble::softdevice_config());
    unwrap!(ble::set_preferred_conn_params());

    // - Coordinator --------------------------
    let coordinator_config = CoordinatorConfig::default();
    let coordinator = Coordinator::new(coordinator_config);
    coordinator.apply_initial_indicators(&mut leds);
    info!("start mode: {}", coordinator.mode());

    // - Producers ----------------------------
    interrupt::EGU1_SWI1.set_priority(Priority::P6);
    let spawner = EXECUTOR_RADIO.start(interrupt::EGU1_SWI1);
    unwrap!(spawner.spawn(ble::softdevice_task(sd)));
    unwrap!(spawner.spawn(ble::advertiser::advertiser_task(
        sd,
        coordinator_config.start_mode.is_advertising(),
    )));
    unwrap!(spawner.spawn(ui::buttons::button_task(
        p.P0_13.degrade(),
        REGISTRATION_CONTROL,
    )));

    // - Main loop ----------------------------
    let main_loop = MAIN_LOOP.init(MainLoop::new(
        coordinator,
        ConnParamsMonitor::default(),
        SoftDeviceReplies,
        RadioEngine,
        AdvertisingMonitor::default(),
        leds,
        DiagnosticLog::new(),
        SoftDevicePower,
    ));

    info!("Start!");
    match main_loop.run(&mut SharedQueue) {
        Ok(never) => match never {},
        Err(e) => {
            error!("main loop halted: {}, resetting", e);
            SCB::sys_reset()
        }
    }
}
