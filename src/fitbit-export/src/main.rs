use std::path::PathBuf;

use clap::Parser;
use fitbit_export::FitbitExport;

/// Converts a Fitbit Takeout export into Viatom pulse-oximetry `.bin`
/// files and a Dreem-style `sleep.csv`.
#[derive(Parser)]
pub struct FitbitExportCli {
    /// Export root containing `Fitbit` or `Takeout/Fitbit`
    pub fitbit_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = FitbitExportCli::parse();
    let export = FitbitExport::locate(&cli.fitbit_path, std::env::current_dir()?)?;

    export.export_spo2_as_viatom()?;
    export.export_sleep_phases_as_dreem()?;

    Ok(())
}
