/// Sleep stage as labelled in a Dreem hypnogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepStage {
    Wake,
    Rem,
    Light,
    Deep,
}

impl SleepStage {
    /// A hypnogram carries one label per 30 seconds of a stage span.
    pub const INTERVAL_SECONDS: u32 = 30;

    /// Maps a Fitbit stage level to a stage, `None` for labels the format
    /// does not know (e.g. classic-log levels like "restless").
    pub fn parse(level: &str) -> Option<Self> {
        match level {
            "wake" => Some(Self::Wake),
            "rem" => Some(Self::Rem),
            "light" => Some(Self::Light),
            "deep" => Some(Self::Deep),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wake => "WAKE",
            Self::Rem => "REM",
            Self::Light => "Light",
            Self::Deep => "Deep",
        }
    }

    /// Labels for one stage span, one per full 30-second interval.
    pub fn expand(self, seconds: u32) -> impl Iterator<Item = &'static str> {
        let intervals = (seconds / Self::INTERVAL_SECONDS) as usize;
        std::iter::repeat(self.label()).take(intervals)
    }
}
