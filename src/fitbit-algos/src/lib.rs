pub(crate) mod series;
pub use series::{VitalReading, VitalSeries};

pub(crate) mod sessions;
pub use sessions::{SpO2Session, MAX_SESSION_GAP};

pub(crate) mod resample;
pub use resample::{GridResampler, GRID_STEP};

pub(crate) mod hypnogram;
pub use hypnogram::SleepStage;

pub mod helpers;
