//! Indicator LEDs (active-low).
//!
//! The board has two LEDs. The red one is shared by the connection and the
//! advertising indicators, which are never on together, so it is lit while
//! either is on. The green one shows the processor is awake.

use beacon_fw::mode::Indicator;
use beacon_fw::traits::IndicatorSink;
use embassy_nrf::gpio::Output;

pub struct Leds {
    red: Output<'static>,
    green: Output<'static>,
    connected: bool,
    advertising: bool,
}

impl Leds {
    /// Both LEDs start dark.
    pub fn new(mut red: Output<'static>, mut green: Output<'static>) -> Self {
        red.set_high();
        green.set_high();
        Self {
            red,
            green,
            connected: false,
            advertising: false,
        }
    }

    fn drive(pin: &mut Output<'static>, on: bool) {
        if on {
            pin.set_low();
        } else {
            pin.set_high();
        }
    }
}

impl IndicatorSink for Leds {
    fn set(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Connected => self.connected = on,
            Indicator::Advertising => self.advertising = on,
            Indicator::Awake => {
                Self::drive(&mut self.green, on);
                return;
            }
        }
        Self::drive(&mut self.red, self.connected || self.advertising);
    }
}
