//! Persisted settings record

use heapless::{LinearMap, Vec};

use super::settings::{PackedColor, Settings};
use crate::ui::FillDirection;

/// Key of the settings record
pub const SETTINGS_KEY: u32 = 1;

/// Background color, dot color, fill direction
pub const RECORD_LEN: usize = 9;

/// Largest value a store has to hold
pub const MAX_VALUE_LEN: usize = 16;

/// Key-value persistence backend.
pub trait KeyValueStore {
    type Error;

    /// Copy the value stored under `key` into `buf`.
    ///
    /// Returns the length of the value, or `None` if nothing is stored.
    fn read(&mut self, key: u32, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&mut self, key: u32, value: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Stored value has the wrong size
    InvalidLength(usize),
    /// Fill direction out of range
    InvalidDirection(u8),
}

pub fn encode_record(settings: &Settings) -> [u8; RECORD_LEN] {
    let mut record = [0; RECORD_LEN];
    record[0..4].copy_from_slice(&settings.background_color.0.to_le_bytes());
    record[4..8].copy_from_slice(&settings.dot_color.0.to_le_bytes());
    record[8] = settings.fill_direction.as_u8();
    record
}

pub fn decode_record(bytes: &[u8]) -> Result<Settings, RecordError> {
    let record: &[u8; RECORD_LEN] = bytes
        .try_into()
        .map_err(|_| RecordError::InvalidLength(bytes.len()))?;

    let word = |at: usize| {
        u32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]])
    };

    Ok(Settings {
        background_color: PackedColor(word(0)),
        dot_color: PackedColor(word(4)),
        fill_direction: FillDirection::from_u8(record[8])
            .ok_or(RecordError::InvalidDirection(record[8]))?,
    })
}

/// Slot header: key (u32 LE), value length (u32 LE)
pub const SLOT_HEADER_LEN: usize = 8;

/// Header and value, a whole number of flash words
pub const SLOT_LEN: usize = SLOT_HEADER_LEN + MAX_VALUE_LEN;

/// Single key-value pair as laid out in flash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    pub key: u32,
    len: usize,
    value: [u8; MAX_VALUE_LEN],
}

impl Slot {
    /// `None` if `value` is longer than [`MAX_VALUE_LEN`]
    pub fn new(key: u32, value: &[u8]) -> Option<Self> {
        let mut slot = Self {
            key,
            len: value.len(),
            value: [0; MAX_VALUE_LEN],
        };
        slot.value.get_mut(..value.len())?.copy_from_slice(value);
        Some(slot)
    }

    pub fn value(&self) -> &[u8] {
        &self.value[..self.len]
    }
}

/// Lay out a slot for writing, unused value bytes stay erased (0xFF).
pub fn encode_slot(slot: &Slot) -> [u8; SLOT_LEN] {
    let mut bytes = [0xff; SLOT_LEN];
    bytes[0..4].copy_from_slice(&slot.key.to_le_bytes());
    bytes[4..8].copy_from_slice(&(slot.len as u32).to_le_bytes());
    bytes[SLOT_HEADER_LEN..SLOT_HEADER_LEN + slot.len].copy_from_slice(slot.value());
    bytes
}

/// Read back a slot of the settings key. Erased flash reads as 0xFF and
/// gives `None`, as does any other key or an oversized length.
pub fn decode_slot(bytes: &[u8; SLOT_LEN]) -> Option<Slot> {
    let key = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    if key != SETTINGS_KEY || len > MAX_VALUE_LEN {
        return None;
    }
    Slot::new(key, &bytes[SLOT_HEADER_LEN..SLOT_HEADER_LEN + len])
}

/// Load the stored settings, falling back to the defaults if there are none
/// or they can't be read.
pub fn load_settings<S: KeyValueStore>(store: &mut S) -> Settings {
    let mut buf = [0; MAX_VALUE_LEN];
    match store.read(SETTINGS_KEY, &mut buf) {
        Ok(Some(len)) => match decode_record(&buf[..len.min(MAX_VALUE_LEN)]) {
            Ok(settings) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Loaded settings: {}", settings);
                settings
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Stored settings unreadable ({}), using defaults", _e);
                Settings::default()
            }
        },
        Ok(None) => {
            #[cfg(feature = "defmt")]
            defmt::info!("No stored settings, using defaults");
            Settings::default()
        }
        Err(_) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Reading stored settings failed, using defaults");
            Settings::default()
        }
    }
}

/// Overwrite the stored settings record.
pub fn save_settings<S: KeyValueStore>(store: &mut S, settings: &Settings) -> Result<(), S::Error> {
    store.write(SETTINGS_KEY, &encode_record(settings))
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryStoreError {
    /// No free slot for another key
    Full,
    /// Value longer than [`MAX_VALUE_LEN`]
    ValueTooLong(usize),
    /// Read buffer shorter than the stored value
    BufferTooSmall(usize),
}

/// RAM backed store with room for `N` keys.
#[derive(Debug)]
pub struct MemoryStore<const N: usize> {
    entries: LinearMap<u32, Vec<u8, MAX_VALUE_LEN>, N>,
}

impl<const N: usize> MemoryStore<N> {
    pub fn new() -> Self {
        Self {
            entries: LinearMap::new(),
        }
    }
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> KeyValueStore for MemoryStore<N> {
    type Error = MemoryStoreError;

    fn read(&mut self, key: u32, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        let Some(value) = self.entries.get(&key) else {
            return Ok(None);
        };
        let dest = buf
            .get_mut(..value.len())
            .ok_or(MemoryStoreError::BufferTooSmall(value.len()))?;
        dest.copy_from_slice(value);
        Ok(Some(value.len()))
    }

    fn write(&mut self, key: u32, value: &[u8]) -> Result<(), Self::Error> {
        let value =
            Vec::from_slice(value).map_err(|_| MemoryStoreError::ValueTooLong(value.len()))?;
        self.entries
            .insert(key, value)
            .map_err(|_| MemoryStoreError::Full)?;
        Ok(())
    }
}
