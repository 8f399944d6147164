#[macro_use]
extern crate log;

mod export;
pub use export::FitbitExport;

mod timeseries;
pub use timeseries::AlignedSeries;

mod dreem;
