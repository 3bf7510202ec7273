//! Settings storage in internal flash
//!
//! The last flash page holds a single slot laid out by
//! [`encode_slot`](super::storage::encode_slot). The SoftDevice owns the flash
//! controller, so writes are queued and flushed by a separate task.

use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, signal::Signal};
use embedded_storage_async::nor_flash::{NorFlash, ReadNorFlash};
use nrf_softdevice::Flash;

use super::storage::{decode_slot, encode_slot, KeyValueStore, Slot, SETTINGS_KEY, SLOT_LEN};

/// Start of the page reserved in `memory.x`
pub const SETTINGS_PAGE: u32 = 0x7_F000;
const PAGE_SIZE: u32 = 4096;

/// Slot waiting to be written to flash
pub static PENDING_WRITE: Signal<ThreadModeRawMutex, Slot> = Signal::new();

#[derive(Debug, defmt::Format)]
pub enum FlashError {
    /// Only the settings key is stored
    UnsupportedKey(u32),
    /// Value longer than a slot
    ValueTooLong(usize),
    /// Read buffer shorter than the stored value
    BufferTooSmall(usize),
    /// SoftDevice flash operation failed
    Failed,
}

/// Settings store backed by the reserved flash page
pub struct FlashStore {
    /// Slot as last read or written
    slot: Option<Slot>,
}

impl FlashStore {
    /// Read the slot from flash
    pub async fn load(flash: &mut Flash) -> Self {
        let mut bytes = [0; SLOT_LEN];
        let slot = match flash.read(SETTINGS_PAGE, &mut bytes).await {
            Ok(()) => decode_slot(&bytes),
            Err(_) => {
                defmt::warn!("Reading settings page failed");
                None
            }
        };
        Self { slot }
    }
}

impl KeyValueStore for FlashStore {
    type Error = FlashError;

    fn read(&mut self, key: u32, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        match &self.slot {
            Some(slot) if slot.key == key => {
                let value = slot.value();
                buf.get_mut(..value.len())
                    .ok_or(FlashError::BufferTooSmall(value.len()))?
                    .copy_from_slice(value);
                Ok(Some(value.len()))
            }
            _ => Ok(None),
        }
    }

    fn write(&mut self, key: u32, value: &[u8]) -> Result<(), Self::Error> {
        if key != SETTINGS_KEY {
            return Err(FlashError::UnsupportedKey(key));
        }
        let slot = Slot::new(key, value).ok_or(FlashError::ValueTooLong(value.len()))?;
        self.slot = Some(slot);
        PENDING_WRITE.signal(slot);
        Ok(())
    }
}

/// Write a slot to the reserved page
pub async fn flush(flash: &mut Flash, slot: &Slot) -> Result<(), FlashError> {
    flash
        .erase(SETTINGS_PAGE, SETTINGS_PAGE + PAGE_SIZE)
        .await
        .map_err(|_| FlashError::Failed)?;
    flash
        .write(SETTINGS_PAGE, &encode_slot(slot))
        .await
        .map_err(|_| FlashError::Failed)
}
