//! General system configuration

use embassy_nrf::{
    config::{Config, Debug, HfclkSource, LfclkSource},
    interrupt::Priority,
};

pub struct SystemConfig {}

impl SystemConfig {
    /// Create the embassy-nrf configuration for running next to the SoftDevice
    pub fn new() -> Config {
        // Generate default config, required because Config is set as
        // `non_exhaustive`
        let mut config = Config::default();

        // Once enabled the SoftDevice owns both clocks: it requests the
        // crystal on demand and calibrates the 32 kHz RC oscillator itself
        // (`NRF_CLOCK_LF_SRC_RC` in `bluetooth::generate_config`). Until then
        // embassy has to start the same RC source, so the RTC time driver
        // keeps ticking across the hand-over.
        config.hfclk_source = HfclkSource::Internal;
        config.lfclk_source = LfclkSource::InternalRC;

        // Enable DC/DC regulator to massively reduce runtime current consumption
        config.dcdc.reg1 = true;

        // Configure interrupt priorities to exclude 0 (default), 1, and 4,
        // which are reserved for the nrf SoftDevice
        config.gpiote_interrupt_priority = Priority::P2;
        config.time_interrupt_priority = Priority::P2;

        // Allow debugging
        config.debug = Debug::Allowed;

        config
    }
}
