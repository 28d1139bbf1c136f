//! Node record persistence
//!
//! Loads and saves the touch calibration record in flash.

use defmt::*;

use superpixie_core::config::{RecordError, StorageRecord, MAX_RECORD_SIZE};
use superpixie_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use superpixie_hal_rp2040::FlashStorageTrait;

/// Storage errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Flash operation failed
    Flash(FlashError),
    /// Stored bytes are not a valid record
    Record(RecordError),
}

impl From<FlashError> for StorageError {
    fn from(e: FlashError) -> Self {
        StorageError::Flash(e)
    }
}

impl From<RecordError> for StorageError {
    fn from(e: RecordError) -> Self {
        StorageError::Record(e)
    }
}

/// Load the node record
///
/// Returns the compiled-in defaults if nothing is stored or the stored
/// record does not validate.
pub async fn load_record(storage: &mut Rp2040FlashStorage<'_>) -> StorageRecord {
    match load_record_inner(storage).await {
        Ok(record) => {
            info!(
                "Loaded node record: threshold={} high={} low={}",
                record.touch_threshold, record.touch_high, record.touch_low
            );
            record
        }
        Err(StorageError::Flash(FlashError::NotFound)) => {
            debug!("No node record in flash, using defaults");
            StorageRecord::new()
        }
        Err(e) => {
            warn!("Failed to load node record: {:?}, using defaults", e);
            StorageRecord::new()
        }
    }
}

async fn load_record_inner(storage: &mut Rp2040FlashStorage<'_>) -> Result<StorageRecord, StorageError> {
    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let len = storage.read(StorageKey::NodeStorage, &mut buffer).await?;
    trace!("Read {} bytes of node record", len);

    Ok(StorageRecord::from_bytes(&buffer[..len])?)
}

/// Save the node record
pub async fn save_record(storage: &mut Rp2040FlashStorage<'_>, record: &StorageRecord) -> Result<(), StorageError> {
    let mut record = *record;
    record.update_crc();

    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let bytes = record.to_bytes(&mut buffer)?;
    storage.write(StorageKey::NodeStorage, bytes).await?;

    info!("Saved node record ({} bytes)", bytes.len());
    Ok(())
}
