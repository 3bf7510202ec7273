//! 1440 dot watchface for the PineTime
//!
//! The face shows one dot per ten minutes of the day, 144 in total. Every
//! completed ten-minute interval since midnight enlarges one more dot.
//!
//! The watchface logic in [`ui`] and [`system`] is target independent and
//! tested on the host. The firmware shell (display, BLE, flash) is compiled
//! with the `nrf52832` feature.

#![no_std]

#[cfg(test)]
extern crate std;

#[cfg(feature = "nrf52832")]
pub mod peripherals;
pub mod system;
pub mod ui;
