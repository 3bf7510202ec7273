//! Display control module for PineTime

use embassy_nrf::{
    gpio::{Output, Pin},
    peripherals::{P0_14, P0_18, P0_22, P0_23, P0_25, P0_26},
    spim::{self, Spim},
};

use display_interface_spi::SPIInterface;
use embassy_time::Delay;
use mipidsi::{models::ST7789, Builder, Orientation};

use crate::ui::{DotWatchface, WatchFace, WatchFaceState};

const LCD_W: u16 = 240;
const LCD_H: u16 = 240;

#[allow(unused)]
#[derive(Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Brightness {
    LEVEL0 = 0,
    LEVEL1 = 1,
    LEVEL2 = 2,
    LEVEL3 = 3,
    LEVEL4 = 4,
    LEVEL5 = 5,
    LEVEL6 = 6,
    LEVEL7 = 7,
}

#[derive(Debug, defmt::Format)]
pub enum Error {
    /// LCD controller did not come up
    Init,
    /// Writing to the LCD failed
    Draw,
}

/// Control the backlight.
///
/// There are three active-low backlight pins, each connected to a FET that
/// toggles backlight power through a resistor.
///
/// - Low: 2.2 kΩ
/// - Mid: 100 Ω
/// - High: 30 Ω
///
/// Through combinations of these pins, 7 brightness levels (+ off) can be
/// configured.
pub struct BacklightPins<'a> {
    low: Output<'a, P0_14>,
    mid: Output<'a, P0_22>,
    high: Output<'a, P0_23>,
}

impl BacklightPins<'_> {
    /// Configure backlight pins on boot
    pub fn init(
        low: Output<'static, P0_14>,
        mid: Output<'static, P0_22>,
        high: Output<'static, P0_23>,
    ) -> BacklightPins<'static> {
        BacklightPins { low, mid, high }
    }

    fn apply(&mut self, level: Brightness) {
        let level = level as u8;
        drive(&mut self.low, level & 0x01 > 0);
        drive(&mut self.mid, level & 0x02 > 0);
        drive(&mut self.high, level & 0x04 > 0);
    }
}

/// Backlight pins are active low
fn drive<P: Pin>(pin: &mut Output<'_, P>, on: bool) {
    if on {
        pin.set_low();
    } else {
        pin.set_high();
    }
}

struct DisplayConfig<'a, SPI>
where
    SPI: spim::Instance,
{
    /// Display instance
    display: mipidsi::Display<
        SPIInterface<Spim<'a, SPI>, Output<'a, P0_18>, Output<'a, P0_25>>,
        ST7789,
        Output<'a, P0_26>,
    >,
    // Backlight pins
    pins_backlight: BacklightPins<'a>,
}

pub struct Display<SPI>
where
    SPI: spim::Instance,
{
    /// Display configuration
    config: DisplayConfig<'static, SPI>,
    /// Backlight brightness
    brightness: Brightness,
}

impl<SPI> Display<SPI>
where
    SPI: spim::Instance,
{
    /// Configure display settings on boot
    pub fn init(
        spim: Spim<'static, SPI>,
        cs_pin: Output<'static, P0_25>,
        dc_pin: Output<'static, P0_18>,
        rst_pin: Output<'static, P0_26>,
        backlight: BacklightPins<'static>,
    ) -> Result<Self, Error> {
        let display = Builder::st7789(SPIInterface::new(spim, dc_pin, cs_pin))
            .with_display_size(LCD_W, LCD_H)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst_pin))
            .map_err(|_| Error::Init)?;

        let mut display = Self {
            config: DisplayConfig {
                display,
                pins_backlight: backlight,
            },
            brightness: Brightness::LEVEL0,
        };
        display.set_brightness(Brightness::LEVEL0);
        Ok(display)
    }

    /// Paint the watchface
    pub fn draw_face(
        &mut self,
        face: &mut DotWatchface,
        state: &WatchFaceState,
    ) -> Result<(), Error> {
        face.draw(state, &mut self.config.display)
            .map_err(|_| Error::Draw)
    }

    /// Brightness of the display backlight
    #[allow(unused)]
    pub fn get_brightness(&self) -> Brightness {
        self.brightness
    }

    /// Set the backlight brightness
    pub fn set_brightness(&mut self, level: Brightness) {
        defmt::debug!("Setting backlight brightness to {}", level);
        self.config.pins_backlight.apply(level);
        self.brightness = level;
    }
}
