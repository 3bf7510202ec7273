//! User settings of the watchface

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};

use crate::ui::FillDirection;

/// Color as sent by the companion app, `0xAARRGGBB`.
///
/// The alpha byte is kept as received but not used for drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub const WHITE: PackedColor = PackedColor::from_rgb(0xff, 0xff, 0xff);
    pub const DARK_RED: PackedColor = PackedColor::from_rgb(0xaa, 0x00, 0x00);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self((r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub fn to_rgb888(self) -> Rgb888 {
        let [_, r, g, b] = self.0.to_be_bytes();
        Rgb888::new(r, g, b)
    }

    pub fn to_rgb565(self) -> Rgb565 {
        self.to_rgb888().into()
    }
}

/// Settings the companion app can change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub background_color: PackedColor,
    pub dot_color: PackedColor,
    pub fill_direction: FillDirection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_color: PackedColor::DARK_RED,
            dot_color: PackedColor::WHITE,
            fill_direction: FillDirection::Top,
        }
    }
}

/// Fields of a settings message, `None` where the message left a field out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingsUpdate {
    pub background_color: Option<PackedColor>,
    pub dot_color: Option<PackedColor>,
    pub fill_direction: Option<FillDirection>,
}

impl Settings {
    /// Overwrite every field present in `update`.
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(color) = update.background_color {
            self.background_color = color;
        }
        if let Some(color) = update.dot_color {
            self.dot_color = color;
        }
        if let Some(direction) = update.fill_direction {
            self.fill_direction = direction;
        }
    }
}
