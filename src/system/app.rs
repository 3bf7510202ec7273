//! Watchface application state
//!
//! The firmware shell owns one [`App`] and feeds it the events of its event
//! loop one at a time: minute ticks, clock adjustments and settings messages.
//! After each event it asks [`App::take_redraw`] whether to repaint.

use chrono::{NaiveDateTime, Timelike};

use super::{
    message::{decode_settings, DecodeError},
    settings::{Settings, SettingsUpdate},
    storage::{load_settings, save_settings, KeyValueStore},
    time::is_redraw_minute,
};
use crate::ui::WatchFaceState;

pub struct App<S: KeyValueStore> {
    /// Current settings
    settings: Settings,
    /// Persistence backend for the settings
    store: S,
    /// Face needs repainting
    dirty: bool,
}

impl<S: KeyValueStore> App<S> {
    /// Restore the stored settings. The face starts out dirty, so it is
    /// painted once at boot whatever minute the first tick lands on.
    pub fn new(mut store: S) -> Self {
        let settings = load_settings(&mut store);
        Self {
            settings,
            store,
            dirty: true,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Minute tick from the clock. Returns whether this minute starts a new
    /// ten-minute interval, in which case the face is marked dirty.
    pub fn on_minute_tick<T: Timelike>(&mut self, time: &T) -> bool {
        let redraw = is_redraw_minute(time);
        if redraw {
            self.dirty = true;
        }
        redraw
    }

    /// The wall clock was set, the elapsed count may have jumped.
    pub fn on_time_adjusted(&mut self) {
        self.dirty = true;
    }

    /// Settings message from the companion app.
    ///
    /// A malformed message is dropped as a whole and nothing is stored.
    pub fn on_settings_message(&mut self, message: &[u8]) -> Result<(), DecodeError> {
        let update = match decode_settings(message) {
            Ok(update) => update,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Dropping settings message: {}", e);
                return Err(e);
            }
        };
        self.apply(&update);
        Ok(())
    }

    /// Apply the fields present in `update`, persist the result and mark the
    /// face dirty.
    pub fn apply(&mut self, update: &SettingsUpdate) {
        self.settings.apply(update);
        self.dirty = true;

        match save_settings(&mut self.store, &self.settings) {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Settings saved: {}", self.settings);
            }
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Saving settings failed");
            }
        }
    }

    /// Whether the face has to be repainted. Clears the request.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Inputs for painting the face at `time`
    pub fn watchface_state(&self, time: NaiveDateTime, seed: u64) -> WatchFaceState {
        WatchFaceState {
            time,
            settings: self.settings,
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{
        message::{encode, keys, Tuple, Value, MAX_MESSAGE_LEN},
        settings::PackedColor,
        storage::{MemoryStore, MAX_VALUE_LEN, RECORD_LEN, SETTINGS_KEY},
    };
    use crate::ui::FillDirection;
    use chrono::NaiveTime;

    fn message(tuples: &[Tuple<'_>]) -> ([u8; MAX_MESSAGE_LEN], usize) {
        let mut buf = [0; MAX_MESSAGE_LEN];
        let len = encode(tuples, &mut buf).unwrap();
        (buf, len)
    }

    #[test]
    fn first_paint_is_pending() {
        let mut app = App::new(MemoryStore::<2>::new());
        assert!(app.take_redraw());
        assert!(!app.take_redraw());
    }

    fn stored_record(app: App<MemoryStore<2>>) -> Option<usize> {
        let mut buf = [0; MAX_VALUE_LEN];
        app.into_store().read(SETTINGS_KEY, &mut buf).unwrap()
    }

    #[test]
    fn first_tick_after_boot_paints_off_boundary() {
        let mut app = App::new(MemoryStore::<2>::new());
        assert!(!app.on_minute_tick(&NaiveTime::from_hms_opt(14, 31, 0).unwrap()));
        assert!(app.take_redraw());

        assert!(!app.on_minute_tick(&NaiveTime::from_hms_opt(14, 32, 0).unwrap()));
        assert!(!app.take_redraw());
    }

    #[test]
    fn ticks_mark_dirty_on_boundaries() {
        let mut app = App::new(MemoryStore::<2>::new());
        app.take_redraw();

        assert!(app.on_minute_tick(&NaiveTime::from_hms_opt(14, 30, 0).unwrap()));
        assert!(app.take_redraw());

        assert!(!app.on_minute_tick(&NaiveTime::from_hms_opt(14, 31, 0).unwrap()));
        assert!(!app.take_redraw());

        app.on_time_adjusted();
        assert!(app.take_redraw());
    }

    #[test]
    fn settings_message_updates_and_persists() {
        let mut app = App::new(MemoryStore::<2>::new());
        app.take_redraw();

        let (buf, len) = message(&[Tuple {
            key: keys::FILL_DIRECTION,
            value: Value::Str("right"),
        }]);
        app.on_settings_message(&buf[..len]).unwrap();

        assert_eq!(app.settings().fill_direction, FillDirection::Right);
        assert_eq!(app.settings().background_color, PackedColor::DARK_RED);
        assert_eq!(app.settings().dot_color, PackedColor::WHITE);
        assert!(app.take_redraw());
        assert_eq!(stored_record(app), Some(RECORD_LEN));
    }

    #[test]
    fn malformed_message_changes_nothing() {
        let mut app = App::new(MemoryStore::<2>::new());
        app.take_redraw();

        assert!(app.on_settings_message(&[2, 0, 0]).is_err());
        assert_eq!(*app.settings(), Settings::default());
        assert!(!app.take_redraw());
        assert_eq!(stored_record(app), None);
    }
}
