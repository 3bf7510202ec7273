//! Which dots are lit for a given time of day

use rand::{Rng, RngCore};

use super::{GridIndex, GRID_CELLS, GRID_SIDE};

/// Order in which dots light up over the day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FillDirection {
    /// Row by row from the top
    #[default]
    Top = 0,
    /// Row by row from the bottom
    Bottom = 1,
    /// Column by column from the left
    Left = 2,
    /// Column by column from the right
    Right = 3,
    /// Left fill with the lit dots scattered over the face
    Random = 4,
}

impl FillDirection {
    pub const ALL: [FillDirection; 5] = [
        FillDirection::Top,
        FillDirection::Bottom,
        FillDirection::Left,
        FillDirection::Right,
        FillDirection::Random,
    ];

    /// Parse the name used by the companion app.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(FillDirection::Top),
            "bottom" => Some(FillDirection::Bottom),
            "left" => Some(FillDirection::Left),
            "right" => Some(FillDirection::Right),
            "random" => Some(FillDirection::Random),
            _ => None,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Lit state of every dot, indexed column-major.
#[derive(Clone, PartialEq, Eq)]
pub struct LitMap {
    cells: [bool; GRID_CELLS],
}

impl LitMap {
    /// Light `elapsed` dots in the order given by `direction`.
    ///
    /// `rng` is only drawn from for [`FillDirection::Random`].
    pub fn new<R: RngCore>(elapsed: u8, direction: FillDirection, rng: &mut R) -> Self {
        match direction {
            FillDirection::Random => Self::scattered(elapsed, rng),
            _ => Self::ordered(elapsed, direction),
        }
    }

    /// Monotonic fill. [`FillDirection::Random`] falls back to the left fill it
    /// is shuffled from.
    pub fn ordered(elapsed: u8, direction: FillDirection) -> Self {
        let mut cells = [false; GRID_CELLS];
        for (linear, cell) in cells.iter_mut().enumerate() {
            *cell = is_lit(GridIndex::from_column_major(linear), elapsed, direction);
        }
        Self { cells }
    }

    /// Left fill followed by one random swap per dot.
    pub fn scattered<R: RngCore>(elapsed: u8, rng: &mut R) -> Self {
        let mut map = Self::ordered(elapsed, FillDirection::Left);
        for _ in 0..GRID_CELLS {
            let a = rng.gen_range(0..GRID_CELLS);
            let b = rng.gen_range(0..GRID_CELLS);
            map.cells.swap(a, b);
        }
        map
    }

    pub fn is_lit(&self, index: GridIndex) -> bool {
        self.cells[index.column_major()]
    }

    /// Number of lit dots
    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&lit| lit).count()
    }
}

/// Lit state of a single dot under a monotonic fill.
///
/// [`FillDirection::Random`] has no per-dot rule; it answers with the left
/// fill, see [`LitMap::scattered`].
pub fn is_lit(index: GridIndex, elapsed: u8, direction: FillDirection) -> bool {
    let last = GRID_CELLS - 1;
    let rank = match direction {
        FillDirection::Top => index.row_major(),
        FillDirection::Bottom => last - index.row_major(),
        FillDirection::Left | FillDirection::Random => index.column_major(),
        FillDirection::Right => {
            (GRID_SIDE - 1 - index.i as usize) * GRID_SIDE + index.j as usize
        }
    };
    rank < elapsed as usize
}
