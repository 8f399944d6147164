use chrono::{Duration, NaiveDateTime, TimeDelta};

/// Gap between consecutive SpO2 samples that closes a session.
pub const MAX_SESSION_GAP: Duration = Duration::minutes(5);

/// Maximal interval of near-continuous SpO2 sampling, bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpO2Session {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SpO2Session {
    /// Splits chronological SpO2 timestamps into sessions wherever two
    /// consecutive samples are more than [`MAX_SESSION_GAP`] apart.
    pub fn detect(timestamps: &[NaiveDateTime]) -> Vec<SpO2Session> {
        let mut sessions = Vec::new();
        let mut iter = timestamps.iter().copied();

        if let Some(first) = iter.next() {
            let mut start_time = first;
            let mut last_time = first;

            for time in iter {
                if time - last_time > MAX_SESSION_GAP {
                    sessions.push(SpO2Session {
                        start: start_time,
                        end: last_time,
                    });

                    start_time = time;
                }
                last_time = time;
            }

            sessions.push(SpO2Session {
                start: start_time,
                end: last_time,
            });
        }

        sessions
    }

    /// Keeps only sessions with heart-rate coverage through their end,
    /// i.e. sessions ending strictly before the last heart-rate sample.
    pub fn retain_covered(
        sessions: Vec<SpO2Session>,
        last_bpm: NaiveDateTime,
    ) -> Vec<SpO2Session> {
        sessions.into_iter().filter(|s| s.end < last_bpm).collect()
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}
