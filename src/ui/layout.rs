//! Dot placement on the panel

use core::f32::consts::TAU;

use embedded_graphics::geometry::{Point, Size};

use super::{GridIndex, GRID_CELLS};

/// Dots per ring of the round layout, innermost first
pub const RING_DOT_COUNTS: [usize; 8] = [6, 9, 12, 15, 18, 21, 27, 36];

/// Diameter of the empty disc in the middle of the round layout, in pixels
pub const CENTER_VOID: f32 = 40.0;

/// Share of the panel kept free on each side of the rectangular grid
const MARGIN: f32 = 0.1;

/// Arrangement of the 144 dots on the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayShape {
    /// 12 x 12 grid with even spacing
    Rectangular,
    /// Eight concentric rings around the panel center
    Round,
}

impl Default for DisplayShape {
    fn default() -> Self {
        if cfg!(feature = "round") {
            DisplayShape::Round
        } else {
            DisplayShape::Rectangular
        }
    }
}

/// Sub-pixel position of a dot center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Snap to the nearest pixel
    pub fn to_point(self) -> Point {
        Point::new(libm::roundf(self.x) as i32, libm::roundf(self.y) as i32)
    }
}

/// Location of a linear index within the round layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingSlot {
    /// Ring number, 0 is innermost
    pub ring: usize,
    /// Offset within the ring
    pub index: usize,
}

/// Center of the dot at `index` on a panel of the given size.
pub fn dot_center(index: GridIndex, panel: Size, shape: DisplayShape) -> Position {
    match shape {
        DisplayShape::Rectangular => grid_center(index, panel),
        DisplayShape::Round => ring_center(index, panel),
    }
}

fn grid_center(index: GridIndex, panel: Size) -> Position {
    let width = panel.width as f32;
    let height = panel.height as f32;

    let x_step = width * (1.0 - 2.0 * MARGIN) / 11.0;
    let y_step = height * (1.0 - 2.0 * MARGIN) / 11.0;

    Position {
        x: width * MARGIN + x_step * index.i as f32,
        y: height * MARGIN + y_step * index.j as f32,
    }
}

fn ring_center(index: GridIndex, panel: Size) -> Position {
    let slot = ring_slot(index.column_major());
    let dots = RING_DOT_COUNTS[slot.ring];

    let ring_height = (panel.height as f32 - CENTER_VOID) / 16.0;
    let radius = CENTER_VOID / 2.0 + ring_height * slot.ring as f32;
    let angle = TAU / dots as f32 * slot.index as f32;

    Position {
        x: panel.width as f32 / 2.0 + radius * libm::sinf(angle),
        y: panel.height as f32 / 2.0 + radius * libm::cosf(angle),
    }
}

/// Find the ring holding the linear index `linear` (0..144).
///
/// Indices past the last ring fall back to the first slot of ring 0.
pub fn ring_slot(linear: usize) -> RingSlot {
    let mut start = 0;
    for (ring, &dots) in RING_DOT_COUNTS.iter().enumerate() {
        if linear < start + dots {
            return RingSlot {
                ring,
                index: linear - start,
            };
        }
        start += dots;
    }
    RingSlot { ring: 0, index: 0 }
}

const _: () = {
    let mut total = 0;
    let mut ring = 0;
    while ring < RING_DOT_COUNTS.len() {
        total += RING_DOT_COUNTS[ring];
        ring += 1;
    }
    assert!(total == GRID_CELLS);
};
