//! Settings flow from companion message to painted face

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};

use pinetime_1440::{
    system::{
        app::App,
        message::{encode, keys, Tuple, Value, MAX_MESSAGE_LEN},
        settings::{PackedColor, Settings},
        storage::MemoryStore,
        time::elapsed_units,
    },
    ui::{DisplayShape, DotWatchface, FillDirection, WatchFace, WatchfaceConfig, GRID_CELLS},
};

/// 240x240 panel that keeps the filled rectangles instead of pixels
struct Recorder {
    clears: Vec<Rgb565>,
    fills: Vec<(Rectangle, Rgb565)>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            clears: Vec::new(),
            fills: Vec::new(),
        }
    }
}

impl OriginDimensions for Recorder {
    fn size(&self) -> Size {
        Size::new(240, 240)
    }
}

impl DrawTarget for Recorder {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

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

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clears.push(color);
        Ok(())
    }
}

fn message(tuples: &[Tuple<'_>]) -> Vec<u8> {
    let mut buf = [0; MAX_MESSAGE_LEN];
    let len = encode(tuples, &mut buf).unwrap();
    buf[..len].to_vec()
}

fn direction(name: &str) -> Vec<u8> {
    message(&[Tuple {
        key: keys::FILL_DIRECTION,
        value: Value::Str(name),
    }])
}

fn today_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 3)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
fn settings_survive_restart() {
    let mut app = App::new(MemoryStore::<2>::new());
    app.on_settings_message(&message(&[
        Tuple {
            key: keys::BACKGROUND_COLOR,
            value: Value::Uint(0x12_3451),
        },
        Tuple {
            key: keys::DOT_COLOR,
            value: Value::Uint(0x12_3452),
        },
        Tuple {
            key: keys::FILL_DIRECTION,
            value: Value::Str("left"),
        },
    ]))
    .unwrap();

    let restarted = App::new(app.into_store());
    assert_eq!(
        *restarted.settings(),
        Settings {
            background_color: PackedColor(0x12_3451),
            dot_color: PackedColor(0x12_3452),
            fill_direction: FillDirection::Left,
        }
    );
}

#[test]
fn direction_only_message_keeps_colors() {
    let mut app = App::new(MemoryStore::<2>::new());
    app.on_settings_message(&direction("right")).unwrap();

    let settings = app.settings();
    assert_eq!(settings.fill_direction, FillDirection::Right);
    assert_eq!(settings.background_color, PackedColor::DARK_RED);
    assert_eq!(settings.dot_color, PackedColor::WHITE);
}

#[test]
fn unknown_direction_is_ignored() {
    let mut app = App::new(MemoryStore::<2>::new());
    app.on_settings_message(&direction("bottom")).unwrap();
    app.on_settings_message(&direction("diagonal")).unwrap();
    assert_eq!(app.settings().fill_direction, FillDirection::Bottom);
}

#[test]
fn repaints_on_ten_minute_boundaries() {
    let mut app = App::new(MemoryStore::<2>::new());
    let mut face = DotWatchface::default();
    let mut panel = Recorder::new();

    // Startup paint
    assert!(app.take_redraw());

    app.on_minute_tick(&today_at(14, 30));
    assert!(app.take_redraw());
    let time = today_at(14, 30);
    face.draw(&app.watchface_state(time, 1), &mut panel).unwrap();
    assert_eq!(panel.clears, vec![PackedColor::DARK_RED.to_rgb565()]);
    assert_eq!(panel.fills.len(), GRID_CELLS);

    app.on_minute_tick(&today_at(14, 31));
    assert!(!app.take_redraw());
}

#[test]
fn lit_dots_match_elapsed_intervals() {
    let sizes = WatchfaceConfig::new(DisplayShape::Rectangular).sizes;
    let mut face = DotWatchface::new(WatchfaceConfig::new(DisplayShape::Rectangular));
    let mut app = App::new(MemoryStore::<2>::new());

    for name in ["top", "bottom", "left", "right", "random"] {
        app.on_settings_message(&direction(name)).unwrap();
        for (hour, minute) in [(0, 0), (0, 10), (14, 30), (23, 59)] {
            let time = today_at(hour, minute);
            let mut panel = Recorder::new();
            face.draw(&app.watchface_state(time, 7), &mut panel).unwrap();

            let large = panel
                .fills
                .iter()
                .filter(|(area, _)| area.size == Size::new(sizes.large, sizes.large))
                .count();
            let elapsed = elapsed_units(&NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
            assert_eq!(large, elapsed as usize);
            assert_eq!(panel.fills.len(), GRID_CELLS);
            assert!(panel
                .fills
                .iter()
                .all(|(_, color)| *color == PackedColor::WHITE.to_rgb565()));
        }
    }
}
