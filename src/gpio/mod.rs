//! Line drivers for real hardware
//!
//! Only BCM2835-family SoCs (Raspberry Pi) through `/dev/gpiomem` for now.

mod bcm2835;
mod mapped;
mod pin;

pub use self::bcm2835::open_gpiomem;

pub use self::pin::GpioPin;
