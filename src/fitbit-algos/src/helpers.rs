/// Formats a possibly fractional minute count as `HH:MM:SS`.
///
/// Fitbit reports stage durations in minutes; Dreem wants clock-style
/// durations. Fractional minutes truncate to whole seconds.
pub fn minutes_to_hms(minutes: f64) -> String {
    let h = (minutes / 60.0) as i64;
    let m = (minutes % 60.0) as i64;
    let s = (minutes.fract() * 60.0) as i64;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_hours() {
        assert_eq!(minutes_to_hms(450.0), "07:30:00");
    }

    #[test]
    fn fractional_minutes_become_seconds() {
        assert_eq!(minutes_to_hms(90.5), "01:30:30");
        assert_eq!(minutes_to_hms(0.25), "00:00:15");
    }

    #[test]
    fn zero() {
        assert_eq!(minutes_to_hms(0.0), "00:00:00");
    }

    #[test]
    fn full_viatom_chunk_duration() {
        // 4095 records at 4 s each is 273 minutes.
        assert_eq!(minutes_to_hms(4095.0 / 15.0), "04:33:00");
    }

    #[test]
    fn milliseconds_duration_path() {
        // 8h 24m reported as milliseconds / 60000.
        assert_eq!(minutes_to_hms(30_240_000.0 / 60_000.0), "08:24:00");
    }
}
