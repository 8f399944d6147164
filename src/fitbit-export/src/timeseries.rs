use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use fitbit_algos::VitalSeries;
use serde::Deserialize;

const SPO2_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const BPM_TIMESTAMP_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// Rounded SpO2 readings below this are sensor noise (off-wrist, bad
/// contact) and never real saturation values.
const MIN_VALID_SPO2: i64 = 61;

#[derive(Debug, Deserialize)]
struct SpO2Row {
    timestamp: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct HeartRateEntry {
    #[serde(rename = "dateTime")]
    date_time: String,
    value: HeartRateValue,
}

#[derive(Debug, Deserialize)]
struct HeartRateValue {
    bpm: u8,
}

/// Both sample streams merged into one series, plus what the segmenter
/// needs on the side: SpO2 timestamps in input order and the last
/// heart-rate timestamp observed anywhere.
#[derive(Debug, Default)]
pub struct AlignedSeries {
    pub series: VitalSeries,
    pub spo2_times: Vec<NaiveDateTime>,
    pub last_bpm_time: Option<NaiveDateTime>,
}

impl AlignedSeries {
    pub fn read(
        spo2_files: &[impl AsRef<Path>],
        bpm_files: &[impl AsRef<Path>],
        timezone: Tz,
    ) -> anyhow::Result<Self> {
        let mut aligned = Self::default();

        for file in spo2_files {
            aligned.read_spo2_csv(file.as_ref(), timezone)?;
        }
        for file in bpm_files {
            aligned.read_heart_rate_json(file.as_ref(), timezone)?;
        }

        Ok(aligned)
    }

    fn read_spo2_csv(&mut self, path: &Path, timezone: Tz) -> anyhow::Result<()> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;

        for row in reader.deserialize() {
            let row: SpO2Row = row.with_context(|| format!("reading {}", path.display()))?;
            let time = to_local(&row.timestamp, SPO2_TIMESTAMP_FORMAT, timezone)?;

            let value = row.value.round() as i64;
            if value < MIN_VALID_SPO2 {
                continue;
            }

            // 100 is reserved by the binary format as a sentinel.
            let value = if value == 100 { 99 } else { value as u8 };

            self.series.insert_spo2(time, value);
            self.spo2_times.push(time);
        }

        Ok(())
    }

    fn read_heart_rate_json(&mut self, path: &Path, timezone: Tz) -> anyhow::Result<()> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let entries: Vec<HeartRateEntry> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("reading {}", path.display()))?;

        for entry in entries {
            let time = to_local(&entry.date_time, BPM_TIMESTAMP_FORMAT, timezone)?;
            self.series.insert_bpm(time, entry.value.bpm);
            self.last_bpm_time = Some(time);
        }

        Ok(())
    }
}

/// Fitbit timestamps are UTC; the rest of the pipeline works in the
/// profile timezone's wall time.
fn to_local(raw: &str, format: &str, timezone: Tz) -> anyhow::Result<NaiveDateTime> {
    let utc = NaiveDateTime::parse_from_str(raw, format)
        .with_context(|| format!("invalid timestamp `{raw}`"))?;

    Ok(utc.and_utc().with_timezone(&timezone).naive_local())
}
