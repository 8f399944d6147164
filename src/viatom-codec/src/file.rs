use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

use crate::{error::ViatomError, helpers::BufferReader};

/// One resampled grid point, 4 seconds apart from its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViatomRecord {
    pub time: NaiveDateTime,
    pub spo2: u8,
    pub bpm: u8,
}

/// One size-capped chunk of records, serialized as a single `.bin` file.
#[derive(Debug, Clone)]
pub struct ViatomFile {
    records: Vec<ViatomRecord>,
}

impl ViatomFile {
    /// The header's size field is `records * 5 + 40` in a u32 but the
    /// duration field is 16-bit, which caps a file at 4095 records.
    pub const MAX_RECORDS: usize = 4095;
    pub const HEADER_SIZE: usize = 40;
    pub const RECORD_SIZE: usize = 5;
    pub const GRID_SECONDS: i64 = 4;
    const MAGIC: [u8; 2] = [0x05, 0x00];
    const SPO2_INVALID: u8 = 0xFF;
    const SPO2_MAX: u8 = 99;

    pub fn new(records: Vec<ViatomRecord>) -> Result<Self, ViatomError> {
        if records.is_empty() {
            return Err(ViatomError::EmptyChunk);
        }

        if records.len() > Self::MAX_RECORDS {
            return Err(ViatomError::ChunkTooLong(records.len()));
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[ViatomRecord] {
        &self.records
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.records[0].time
    }

    /// File name of the serialized chunk, e.g. `20240115083000.bin`.
    pub fn file_name(&self) -> String {
        format!("{}.bin", self.start_time().format("%Y%m%d%H%M%S"))
    }

    pub fn byte_size(&self) -> usize {
        self.records.len() * Self::RECORD_SIZE + Self::HEADER_SIZE
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::seconds(self.records.len() as i64 * Self::GRID_SECONDS)
    }

    pub fn encode(&self) -> Vec<u8> {
        let start = self.start_time();
        let mut buf = Vec::with_capacity(self.byte_size());

        buf.extend_from_slice(&Self::MAGIC);
        buf.extend_from_slice(&(start.year() as u16).to_le_bytes());
        buf.push(start.month() as u8);
        buf.push(start.day() as u8);
        buf.push(start.hour() as u8);
        buf.push(start.minute() as u8);
        buf.push(start.second() as u8);
        buf.extend_from_slice(&(self.byte_size() as u32).to_le_bytes());
        buf.extend_from_slice(&(self.duration().num_seconds() as u16).to_le_bytes());
        buf.extend_from_slice(&[0u8; 25]);

        for record in &self.records {
            if record.spo2 <= 61 {
                // Sensor floor, flagged invalid; the heart-rate byte stays real.
                buf.push(Self::SPO2_INVALID);
                buf.push(record.bpm);
                buf.extend_from_slice(&[0xFF, 0x00, 0x00]);
            } else {
                buf.push(record.spo2.min(Self::SPO2_MAX));
                buf.push(record.bpm);
                buf.extend_from_slice(&[0x00, 0x00, 0x00]);
            }
        }

        buf
    }
}

/// Decoded fixed-size header of a Viatom file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViatomHeader {
    pub start: NaiveDateTime,
    pub file_size: u32,
    pub duration_secs: u16,
}

impl ViatomHeader {
    pub fn decode(mut data: Vec<u8>) -> Result<Self, ViatomError> {
        if data.len() < ViatomFile::HEADER_SIZE {
            return Err(ViatomError::HeaderTooShort);
        }

        let magic = data.read::<2>()?;
        if magic != ViatomFile::MAGIC {
            return Err(ViatomError::InvalidMagic);
        }

        let year = data.read_u16_le()?;
        let month = data.pop_front()?;
        let day = data.pop_front()?;
        let hour = data.pop_front()?;
        let minute = data.pop_front()?;
        let second = data.pop_front()?;
        let file_size = data.read_u32_le()?;
        let duration_secs = data.read_u16_le()?;

        let start = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            .and_then(|d| d.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second)))
            .ok_or(ViatomError::InvalidTimestamp)?;

        Ok(Self {
            start,
            file_size,
            duration_secs,
        })
    }

    pub fn record_count(&self) -> usize {
        (self.file_size as usize).saturating_sub(ViatomFile::HEADER_SIZE) / ViatomFile::RECORD_SIZE
    }
}
