//! Persistent node record
//!
//! Touch calibration survives power cycles. The record is postcard
//! serialized with a magic/version header and a CRC32 over its fields.
//! Anything that fails validation is replaced by the compiled-in defaults.

use serde::{Deserialize, Serialize};

use crate::compose::TouchCalibration;

/// Magic number identifying a node record ("SPXS")
pub const STORAGE_MAGIC: u32 = 0x5350_5853;

/// Current record layout version
pub const STORAGE_VERSION: u8 = 1;

/// Upper bound of the serialized record
pub const MAX_RECORD_SIZE: usize = 32;

/// Why a stored record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Output buffer too small or encoder failure
    Serialize,
    /// Bytes do not parse as a record
    Deserialize,
    /// Magic number does not match
    BadMagic,
    /// Written by a different firmware layout
    VersionMismatch,
    /// Fields do not match the stored checksum
    CrcMismatch,
}

/// Settings stored in flash
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageRecord {
    pub magic: u32,
    pub version: u8,
    /// Filtered touch level that counts as a press, 0.0..=1.0
    pub touch_threshold: f32,
    /// Raw reading with a finger on the pad
    pub touch_high: f32,
    /// Raw reading with the pad untouched
    pub touch_low: f32,
    /// CRC32 over magic..touch_low
    pub crc: u32,
}

impl Default for StorageRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageRecord {
    /// Compiled-in defaults with a valid checksum
    pub fn new() -> Self {
        let mut record = Self {
            magic: STORAGE_MAGIC,
            version: STORAGE_VERSION,
            touch_threshold: 0.5,
            touch_high: 0.01,
            touch_low: 0.01,
            crc: 0,
        };
        record.update_crc();
        record
    }

    /// Record holding the given calibration
    pub fn from_calibration(calibration: &TouchCalibration) -> Self {
        let mut record = Self {
            touch_threshold: calibration.threshold,
            touch_high: calibration.high,
            touch_low: calibration.low,
            ..Self::new()
        };
        record.update_crc();
        record
    }

    pub fn calibration(&self) -> TouchCalibration {
        TouchCalibration {
            threshold: self.touch_threshold,
            high: self.touch_high,
            low: self.touch_low,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == STORAGE_MAGIC && self.version == STORAGE_VERSION
    }

    /// CRC32 of every field but the checksum itself
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.touch_threshold.to_le_bytes());
        crc = crc32_update(crc, &self.touch_high.to_le_bytes());
        crc = crc32_update(crc, &self.touch_low.to_le_bytes());
        !crc
    }

    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Serialize into `buffer`, returning the used prefix
    pub fn to_bytes<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a [u8], RecordError> {
        let used = postcard::to_slice(self, buffer).map_err(|_| RecordError::Serialize)?;
        Ok(used)
    }

    /// Parse and validate a stored record
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let record: StorageRecord =
            postcard::from_bytes(bytes).map_err(|_| RecordError::Deserialize)?;

        if record.magic != STORAGE_MAGIC {
            return Err(RecordError::BadMagic);
        }
        if record.version != STORAGE_VERSION {
            return Err(RecordError::VersionMismatch);
        }
        if !record.verify_crc() {
            return Err(RecordError::CrcMismatch);
        }
        Ok(record)
    }
}

/// CRC32 update, IEEE 802.3 polynomial (reflected)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let record = StorageRecord::new();
        assert!(record.is_valid());
        assert!(record.verify_crc());
        assert_eq!(record.touch_threshold, 0.5);
        assert_eq!(record.calibration(), TouchCalibration::default());
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard check input for CRC-32/ISO-HDLC
        assert_eq!(!crc32_update(0xFFFF_FFFF, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let calibration = TouchCalibration {
            threshold: 0.3,
            high: 812.0,
            low: 140.0,
        };
        let record = StorageRecord::from_calibration(&calibration);
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = record.to_bytes(&mut buffer).unwrap();
        let loaded = StorageRecord::from_bytes(bytes).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.calibration(), calibration);
    }

    #[test]
    fn test_tampered_field_fails_crc() {
        let mut record = StorageRecord::new();
        record.touch_high = 900.0;
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = record.to_bytes(&mut buffer).unwrap();
        assert_eq!(StorageRecord::from_bytes(bytes), Err(RecordError::CrcMismatch));
    }

    #[test]
    fn test_rejects_foreign_records() {
        let mut record = StorageRecord::new();
        record.magic = 0x5049_4443;
        record.update_crc();
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = record.to_bytes(&mut buffer).unwrap();
        assert_eq!(StorageRecord::from_bytes(bytes), Err(RecordError::BadMagic));

        let mut record = StorageRecord::new();
        record.version = STORAGE_VERSION + 1;
        record.update_crc();
        let bytes = record.to_bytes(&mut buffer).unwrap();
        assert_eq!(StorageRecord::from_bytes(bytes), Err(RecordError::VersionMismatch));

        assert_eq!(StorageRecord::from_bytes(&[0x01]), Err(RecordError::Deserialize));
    }

    #[test]
    fn test_small_buffer() {
        let mut buffer = [0u8; 4];
        assert_eq!(
            StorageRecord::new().to_bytes(&mut buffer),
            Err(RecordError::Serialize)
        );
    }
}
