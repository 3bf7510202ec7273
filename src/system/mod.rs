pub mod app;
pub mod message;
pub mod settings;
pub mod storage;
pub mod time;

#[cfg(feature = "nrf52832")]
pub mod bluetooth;
#[cfg(feature = "nrf52832")]
pub mod clock;
#[cfg(feature = "nrf52832")]
pub mod config;
#[cfg(feature = "nrf52832")]
pub mod flash;
