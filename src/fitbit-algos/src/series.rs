use std::collections::BTreeMap;

use chrono::NaiveDateTime;

/// One slot of the sparse series. A field is `None` until that stream has
/// produced a sample for this timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VitalReading {
    pub spo2: Option<u8>,
    pub bpm: Option<u8>,
}

/// Time-indexed union of the SpO2 and heart-rate streams. Inserting a
/// sample only writes its own field, so both streams can share a timestamp
/// without clobbering each other.
#[derive(Clone, Debug, Default)]
pub struct VitalSeries {
    readings: BTreeMap<NaiveDateTime, VitalReading>,
}

impl VitalSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_spo2(&mut self, time: NaiveDateTime, spo2: u8) {
        self.readings.entry(time).or_default().spo2 = Some(spo2);
    }

    pub fn insert_bpm(&mut self, time: NaiveDateTime, bpm: u8) {
        self.readings.entry(time).or_default().bpm = Some(bpm);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Chronological snapshot of the series for indexed pairwise walks.
    pub fn entries(&self) -> Vec<(NaiveDateTime, VitalReading)> {
        self.readings.iter().map(|(&t, &r)| (t, r)).collect()
    }
}
