//! User interface - one button and two indicator LEDs.

pub mod buttons;
pub mod leds;
