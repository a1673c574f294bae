//! GPIO button input with async debouncing.
//!
//! The RuuviTag has a single active-low button (internal pull-up). Its task
//! waits for a GPIO edge, debounces it, and posts `Pressed` / `Released`
//! for its control id to the deferred-work queue.

use beacon_fw::config::BUTTON_DEBOUNCE_MS;
use beacon_fw::events::{ButtonEvent, ControlId};
use defmt::info;
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Timer};

use crate::post;

/// Run a single button polling loop.
///
/// Waits for the pin to go low (pressed), debounces, posts the press,
/// then waits for release and posts that too.
#[embassy_executor::task]
pub async fn button_task(pin: AnyPin, control: ControlId) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            info!("Button {} pressed", control.0);
            post(ButtonEvent::Pressed(control));

            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
            post(ButtonEvent::Released(control));
        }
    }
}
