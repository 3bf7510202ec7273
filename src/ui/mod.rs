//! UI definitions module
//! Based on: https://github.com/lupyuen/pinetime-watchface/blob/master/src/lib.rs

use chrono::NaiveDateTime;
use embedded_graphics::{draw_target::DrawTarget, geometry::Size, pixelcolor::Rgb565};

use crate::system::settings::Settings;

mod dot_watchface;
pub mod fill;
pub mod layout;

pub use dot_watchface::{DotSizes, DotWatchface, DrawCommand, Frame};
pub use fill::FillDirection;
pub use layout::DisplayShape;

/// Dots per side of the conceptual grid
pub const GRID_SIDE: usize = 12;
/// Dots on the face, one per ten minutes of the day
pub const GRID_CELLS: usize = GRID_SIDE * GRID_SIDE;

pub trait WatchFace {
    /// Compute what to paint on a panel of the given size
    fn render(&mut self, state: &WatchFaceState, panel: Size) -> Frame;

    /// Paint the watchface onto a display
    fn draw<D>(&mut self, state: &WatchFaceState, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>;
}

/// State for the watch face
#[derive(Clone, Debug)]
pub struct WatchFaceState {
    /// Local wall clock time
    pub time: NaiveDateTime,
    /// Colors and fill direction
    pub settings: Settings,
    /// Seed for the random fill, should change with every redraw
    pub seed: u64,
}

/// Static appearance of the face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchfaceConfig {
    pub shape: DisplayShape,
    pub sizes: DotSizes,
}

impl WatchfaceConfig {
    pub const fn new(shape: DisplayShape) -> Self {
        Self {
            shape,
            sizes: DotSizes::for_shape(shape),
        }
    }
}

impl Default for WatchfaceConfig {
    fn default() -> Self {
        Self::new(DisplayShape::default())
    }
}

/// Position of a dot in the 12 x 12 grid.
///
/// On the rectangular layout `i` is the column and `j` the row. The round
/// layout places the dots by their column-major index instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridIndex {
    pub i: u8,
    pub j: u8,
}

impl GridIndex {
    /// `i` and `j` must both be below [`GRID_SIDE`]
    pub const fn new(i: u8, j: u8) -> Self {
        debug_assert!((i as usize) < GRID_SIDE && (j as usize) < GRID_SIDE);
        Self { i, j }
    }

    /// Inverse of [`GridIndex::column_major`]
    pub const fn from_column_major(linear: usize) -> Self {
        Self {
            i: (linear / GRID_SIDE) as u8,
            j: (linear % GRID_SIDE) as u8,
        }
    }

    /// `i * 12 + j`
    pub const fn column_major(self) -> usize {
        self.i as usize * GRID_SIDE + self.j as usize
    }

    /// `j * 12 + i`
    pub const fn row_major(self) -> usize {
        self.j as usize * GRID_SIDE + self.i as usize
    }

    /// All 144 indices, `i` outermost
    pub fn all() -> impl Iterator<Item = GridIndex> {
        (0..GRID_CELLS).map(GridIndex::from_column_major)
    }
}
