use chrono::{NaiveDateTime, TimeDelta};
use viatom_codec::{ViatomFile, ViatomRecord};

use crate::{
    series::{VitalReading, VitalSeries},
    sessions::SpO2Session,
};

/// Spacing of synthetic samples on the output grid.
pub const GRID_STEP: TimeDelta = TimeDelta::seconds(ViatomFile::GRID_SECONDS);

/// Most recent value observed per stream while walking the series. A field
/// stays unset until the walk has passed at least one sample of that
/// stream; no record is emitted while either field is unset.
#[derive(Clone, Copy, Debug, Default)]
struct CarriedVitals {
    spo2: Option<u8>,
    bpm: Option<u8>,
}

impl CarriedVitals {
    fn observe(&mut self, reading: VitalReading) {
        if let Some(spo2) = reading.spo2 {
            self.spo2 = Some(spo2);
        }
        if let Some(bpm) = reading.bpm {
            self.bpm = Some(bpm);
        }
    }
}

/// Resamples the sparse series onto the 4-second grid inside each session
/// and splits the result into chunks of at most
/// [`ViatomFile::MAX_RECORDS`] records.
pub struct GridResampler<'a> {
    series: &'a VitalSeries,
    sessions: &'a [SpO2Session],
}

impl<'a> GridResampler<'a> {
    pub fn new(series: &'a VitalSeries, sessions: &'a [SpO2Session]) -> Self {
        Self { series, sessions }
    }

    pub fn chunks(&self) -> Vec<Vec<ViatomRecord>> {
        let entries = self.series.entries();
        let mut chunks = Vec::new();
        let mut chunk: Vec<ViatomRecord> = Vec::new();
        let mut carried = CarriedVitals::default();

        for session in self.sessions {
            // The grid cursor continues from wherever the previous
            // interval stopped, so spacing stays 4 s across entries.
            let mut cursor: Option<NaiveDateTime> = None;

            for pair in entries.windows(2) {
                let (entry_time, reading) = pair[0];
                let end_time = pair[1].0;

                carried.observe(reading);

                let mut time = cursor.unwrap_or(entry_time);
                if !session.contains(time) {
                    continue;
                }

                while time < end_time {
                    if session.contains(time) {
                        if let (Some(spo2), Some(bpm)) = (carried.spo2, carried.bpm) {
                            if chunk.len() >= ViatomFile::MAX_RECORDS {
                                chunks.push(std::mem::take(&mut chunk));
                            }
                            chunk.push(ViatomRecord { time, spo2, bpm });
                        }
                    }
                    time += GRID_STEP;
                }

                cursor = Some(time);
            }

            if !chunk.is_empty() {
                chunks.push(std::mem::take(&mut chunk));
            }
        }

        if !chunk.is_empty() {
            chunks.push(chunk);
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn session(start: NaiveDateTime, end: NaiveDateTime) -> SpO2Session {
        SpO2Session { start, end }
    }

    #[test]
    fn empty_series_produces_no_chunks() {
        let series = VitalSeries::new();
        let sessions = [session(at(8, 0, 0), at(8, 4, 0))];
        let chunks = GridResampler::new(&series, &sessions).chunks();
        assert!(chunks.is_empty());
    }

    #[test]
    fn two_sessions_fill_each_window() {
        // SpO2 runs 08:00-08:04 and 08:10-08:12, heart rate from 07:59
        // through 08:15.
        let mut series = VitalSeries::new();
        series.insert_bpm(at(7, 59, 0), 58);
        for m in [0, 1, 2, 3, 4, 10, 11, 12] {
            series.insert_spo2(at(8, m, 0), 95);
        }
        series.insert_bpm(at(8, 15, 0), 60);

        let spo2_times: Vec<_> = [0, 1, 2, 3, 4, 10, 11, 12]
            .iter()
            .map(|&m| at(8, m, 0))
            .collect();
        let sessions = SpO2Session::retain_covered(
            SpO2Session::detect(&spo2_times),
            at(8, 15, 0),
        );
        assert_eq!(sessions.len(), 2);

        let chunks = GridResampler::new(&series, &sessions).chunks();
        assert_eq!(chunks.len(), 2);

        // 4 minutes at 4 s spacing, both endpoints included.
        assert_eq!(chunks[0].len(), 61);
        assert_eq!(chunks[0][0].time, at(8, 0, 0));
        assert_eq!(chunks[0].last().unwrap().time, at(8, 4, 0));

        assert_eq!(chunks[1].len(), 31);
        assert_eq!(chunks[1][0].time, at(8, 10, 0));
        assert_eq!(chunks[1].last().unwrap().time, at(8, 12, 0));

        // Nothing lands in the 08:04-08:10 gap.
        for record in chunks.iter().flatten() {
            assert!(record.time <= at(8, 4, 0) || record.time >= at(8, 10, 0));
        }
    }

    #[test]
    fn records_are_four_seconds_apart() {
        let mut series = VitalSeries::new();
        series.insert_bpm(at(7, 59, 0), 58);
        series.insert_spo2(at(8, 0, 0), 95);
        series.insert_spo2(at(8, 1, 0), 96);

        let sessions = [session(at(8, 0, 0), at(8, 1, 0))];
        let chunks = GridResampler::new(&series, &sessions).chunks();

        assert_eq!(chunks.len(), 1);
        for pair in chunks[0].windows(2) {
            assert_eq!(pair[1].time - pair[0].time, GRID_STEP);
        }
    }

    #[test]
    fn values_carry_forward_between_samples() {
        let mut series = VitalSeries::new();
        series.insert_bpm(at(7, 59, 0), 58);
        series.insert_spo2(at(8, 0, 0), 95);
        series.insert_bpm(at(8, 2, 0), 62);
        series.insert_spo2(at(8, 4, 0), 97);

        let sessions = [session(at(8, 0, 0), at(8, 4, 0))];
        let chunks = GridResampler::new(&series, &sessions).chunks();
        assert_eq!(chunks.len(), 1);

        for record in &chunks[0] {
            if record.time < at(8, 2, 0) {
                assert_eq!((record.spo2, record.bpm), (95, 58));
            } else {
                assert_eq!((record.spo2, record.bpm), (95, 62));
            }
        }
    }

    #[test]
    fn no_records_until_both_streams_observed() {
        // Heart rate only shows up mid-session; grid points before the
        // first bpm sample are skipped, not emitted with garbage.
        let mut series = VitalSeries::new();
        for m in 0..=4 {
            series.insert_spo2(at(8, m, 0), 95);
        }
        series.insert_bpm(at(8, 2, 30), 60);

        let sessions = [session(at(8, 0, 0), at(8, 4, 0))];
        let chunks = GridResampler::new(&series, &sessions).chunks();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0][0].time, at(8, 2, 32));
        assert!(chunks[0].iter().all(|r| r.bpm == 60));
    }

    #[test]
    fn chunk_splits_at_cap_with_contiguous_timestamps() {
        // One long interval: 08:00:00 to 12:40:00 is 4200 grid points.
        let mut series = VitalSeries::new();
        series.insert_bpm(at(7, 59, 0), 58);
        series.insert_spo2(at(8, 0, 0), 95);
        series.insert_spo2(at(12, 40, 0), 96);

        let sessions = [session(at(8, 0, 0), at(12, 40, 0))];
        let chunks = GridResampler::new(&series, &sessions).chunks();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), ViatomFile::MAX_RECORDS);
        assert_eq!(chunks[1].len(), 4200 - ViatomFile::MAX_RECORDS);
        assert_eq!(
            chunks[1][0].time - chunks[0].last().unwrap().time,
            GRID_STEP
        );
    }

    #[test]
    fn session_bounds_clip_emitted_records() {
        // Entries extend past the session on both sides.
        let mut series = VitalSeries::new();
        series.insert_bpm(at(7, 50, 0), 58);
        series.insert_spo2(at(7, 55, 0), 94);
        series.insert_spo2(at(8, 0, 0), 95);
        series.insert_spo2(at(8, 2, 0), 96);
        series.insert_bpm(at(8, 30, 0), 60);

        let sessions = [session(at(8, 0, 0), at(8, 2, 0))];
        let chunks = GridResampler::new(&series, &sessions).chunks();

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].iter().all(|r| sessions[0].contains(r.time)));
        assert_eq!(chunks[0][0].time, at(8, 0, 0));
        assert_eq!(chunks[0].last().unwrap().time, at(8, 2, 0));
    }
}
