//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage
//! in the last 64KB of flash. Only the node record lives there, so the
//! scratch buffers are small.
//!
//! Implements the `FlashStorage` trait from `superpixie-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from superpixie-hal
pub use superpixie_hal::flash::{FlashError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB QSPI flash
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024;

/// Scratch buffer for one stored item
pub const ITEM_BUFFER_SIZE: usize = 128;
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

// sequential-storage works in whole erase pages
const _: () = assert!(CONFIG_PARTITION_SIZE % ERASE_SIZE == 0);

/// Flash range for the config partition
pub const CONFIG_RANGE: core::ops::Range<u32> =
    (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// RP2040 Flash storage implementation
///
/// Wear-leveled key/blob storage on top of sequential-storage.
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// 64-bit unique id of the flash chip, distinct for every board
    pub fn unique_id(&mut self) -> Result<u64, FlashError> {
        let mut uid = [0u8; 8];
        self.flash.blocking_unique_id(&mut uid).map_err(|_| FlashError::Flash)?;
        Ok(u64::from_be_bytes(uid))
    }
}

// Implement the shared FlashStorage trait
impl<'d> superpixie_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        matches!(
            map::fetch_item::<StorageKey, &[u8], _>(
                &mut self.flash,
                CONFIG_RANGE,
                &mut NoCache::new(),
                &mut data_buffer,
                &key,
            )
            .await,
            Ok(Some(_))
        )
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        let start = CONFIG_PARTITION_START as u32;
        let end = FLASH_SIZE as u32;

        self.flash
            .erase(start, end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}
