//! Dot grid watchface

use embedded_graphics::{
    geometry::{Point, Size},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use rand::{rngs::SmallRng, SeedableRng};

use super::{
    fill::LitMap, layout, DisplayShape, GridIndex, WatchFace, WatchFaceState, WatchfaceConfig,
    GRID_CELLS,
};
use crate::system::time::elapsed_units;

/// Side lengths of the dot squares in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DotSizes {
    /// Interval not reached yet
    pub small: u32,
    /// Interval elapsed
    pub large: u32,
}

impl DotSizes {
    pub const fn for_shape(shape: DisplayShape) -> Self {
        match shape {
            DisplayShape::Rectangular => Self { small: 3, large: 11 },
            // Outer rings are packed tighter
            DisplayShape::Round => Self { small: 3, large: 9 },
        }
    }
}

/// One filled square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCommand {
    pub center: Point,
    pub side: u32,
    pub lit: bool,
}

impl DrawCommand {
    /// Square of `side` pixels centered on `center`
    pub fn area(&self) -> Rectangle {
        let offset = (self.side as i32 - 1) / 2;
        Rectangle::new(
            self.center - Point::new(offset, offset),
            Size::new(self.side, self.side),
        )
    }
}

/// Everything needed to paint one redraw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub background: Rgb565,
    pub dot_color: Rgb565,
    /// Elapsed ten-minute intervals
    pub elapsed: u8,
    pub dots: [DrawCommand; GRID_CELLS],
}

impl Frame {
    pub fn lit_count(&self) -> usize {
        self.dots.iter().filter(|dot| dot.lit).count()
    }
}

/// Watchface drawing one dot per ten minutes of the day
pub struct DotWatchface {
    config: WatchfaceConfig,
}

impl DotWatchface {
    pub fn new(config: WatchfaceConfig) -> Self {
        Self { config }
    }
}

impl Default for DotWatchface {
    fn default() -> Self {
        Self::new(WatchfaceConfig::default())
    }
}

impl WatchFace for DotWatchface {
    fn render(&mut self, state: &WatchFaceState, panel: Size) -> Frame {
        let elapsed = elapsed_units(&state.time);
        let mut rng = SmallRng::seed_from_u64(state.seed);
        let lit = LitMap::new(elapsed, state.settings.fill_direction, &mut rng);

        let WatchfaceConfig { shape, sizes } = self.config;
        let dots = core::array::from_fn(|linear| {
            let index = GridIndex::from_column_major(linear);
            let lit = lit.is_lit(index);
            DrawCommand {
                center: layout::dot_center(index, panel, shape).to_point(),
                side: if lit { sizes.large } else { sizes.small },
                lit,
            }
        });

        Frame {
            background: state.settings.background_color.to_rgb565(),
            dot_color: state.settings.dot_color.to_rgb565(),
            elapsed,
            dots,
        }
    }

    fn draw<D>(&mut self, state: &WatchFaceState, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let panel = target.bounding_box().size;
        let frame = self.render(state, panel);

        target.clear(frame.background)?;

        let style = PrimitiveStyle::with_fill(frame.dot_color);
        for dot in frame.dots.iter() {
            dot.area().into_styled(style).draw(target)?;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Painted {} of {} dots ({})",
            frame.lit_count(),
            GRID_CELLS,
            state.settings.fill_direction
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::settings::{PackedColor, Settings};
    use crate::ui::FillDirection;
    use chrono::NaiveDate;
    use core::convert::Infallible;
    use embedded_graphics::Pixel;
    use std::vec::Vec;

    /// Records solid fills instead of setting pixels
    struct Recorder {
        size: Size,
        fills: Vec<(Rectangle, Rgb565)>,
    }

    impl Recorder {
        fn new(size: Size) -> Self {
            Self {
                size,
                fills: Vec::new(),
            }
        }
    }

    impl OriginDimensions for Recorder {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for Recorder {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, _pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            Ok(())
        }

        fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
            self.fills.push((*area, color));
            Ok(())
        }
    }

    fn state(hour: u32, minute: u32, fill_direction: FillDirection) -> WatchFaceState {
        WatchFaceState {
            time: NaiveDate::from_ymd_opt(2024, 3, 3)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
            settings: Settings {
                fill_direction,
                ..Settings::default()
            },
            seed: 42,
        }
    }

    #[test]
    fn render_sizes_dots_by_elapsed_time() {
        let mut face = DotWatchface::new(WatchfaceConfig::new(DisplayShape::Rectangular));
        let frame = face.render(&state(14, 30, FillDirection::Top), Size::new(240, 240));

        assert_eq!(frame.elapsed, 87);
        assert_eq!(frame.lit_count(), 87);
        let sizes = DotSizes::for_shape(DisplayShape::Rectangular);
        for dot in frame.dots.iter() {
            assert_eq!(dot.side, if dot.lit { sizes.large } else { sizes.small });
        }
    }

    #[test]
    fn render_random_keeps_count() {
        let mut face = DotWatchface::default();
        let frame = face.render(&state(23, 59, FillDirection::Random), Size::new(240, 240));
        assert_eq!(frame.lit_count(), 143);
    }

    #[test]
    fn draw_clears_then_paints_every_dot() {
        let mut face = DotWatchface::new(WatchfaceConfig::new(DisplayShape::Round));
        let mut state = state(0, 25, FillDirection::Left);
        state.settings.background_color = PackedColor::from_rgb(0, 0, 0xff);
        state.settings.dot_color = PackedColor::from_rgb(0xff, 0xff, 0);

        let mut display = Recorder::new(Size::new(240, 240));
        face.draw(&state, &mut display).unwrap();

        assert_eq!(display.fills.len(), 1 + GRID_CELLS);
        let (background, color) = display.fills[0];
        assert_eq!(background, Rectangle::new(Point::zero(), Size::new(240, 240)));
        assert_eq!(color, Rgb565::BLUE);

        let large = DotSizes::for_shape(DisplayShape::Round).large;
        let dots = &display.fills[1..];
        assert!(dots.iter().all(|(_, color)| *color == Rgb565::YELLOW));
        assert_eq!(dots.iter().filter(|(area, _)| area.size.width == large).count(), 2);
    }

    #[test]
    fn dots_stay_on_panel() {
        let panel = Rectangle::new(Point::zero(), Size::new(240, 240));
        for shape in [DisplayShape::Rectangular, DisplayShape::Round] {
            let mut face = DotWatchface::new(WatchfaceConfig::new(shape));
            let frame = face.render(&state(23, 50, FillDirection::Bottom), panel.size);
            for dot in frame.dots.iter() {
                let area = dot.area();
                assert!(panel.contains(area.top_left));
                assert!(area.bottom_right().map_or(false, |p| panel.contains(p)));
            }
        }
    }

    #[test]
    fn square_is_centered_on_dot() {
        let dot = DrawCommand {
            center: Point::new(20, 30),
            side: 11,
            lit: true,
        };
        assert_eq!(dot.area(), Rectangle::new(Point::new(15, 25), Size::new(11, 11)));

        let small = DrawCommand { side: 3, ..dot };
        assert_eq!(small.area().top_left, Point::new(19, 29));
    }
}
