//! Storage persistence task
//!
//! Flash writes stall the bus for milliseconds, so they run here instead
//! of inside the tick.

use defmt::*;

use superpixie_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::SAVE_REQUEST;
use crate::storage::save_record;

#[embassy_executor::task]
pub async fn storage_task(mut storage: Rp2040FlashStorage<'static>) {
    info!("Storage task started");

    loop {
        let record = SAVE_REQUEST.wait().await;
        if let Err(e) = save_record(&mut storage, &record).await {
            error!("Failed to save node record: {:?}", e);
        }
    }
}
