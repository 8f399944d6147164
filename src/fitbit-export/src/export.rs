use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use chrono_tz::Tz;
use fitbit_algos::{helpers::minutes_to_hms, GridResampler, SpO2Session};
use serde::Deserialize;
use viatom_codec::{ViatomFile, ViatomRecord};

use crate::{dreem, timeseries::AlignedSeries};

const SPO2_DIR: &str = "Oxygen Saturation (SpO2)";
const GLOBAL_EXPORT_DIR: &str = "Global Export Data";

#[derive(Debug, Deserialize)]
struct ProfileRow {
    timezone: String,
}

/// Handle on a located Fitbit export directory. Owns the export path and
/// the output directory so nothing downstream reaches for global state.
pub struct FitbitExport {
    path: PathBuf,
    out_dir: PathBuf,
}

impl FitbitExport {
    /// Accepts a Takeout root and finds the Fitbit directory directly
    /// under it or nested under `Takeout/`.
    pub fn locate(root: &Path, out_dir: PathBuf) -> anyhow::Result<Self> {
        if !root.exists() {
            bail!("The path {} is not a valid directory", root.display());
        }

        for candidate in [root.join("Fitbit"), root.join("Takeout").join("Fitbit")] {
            if candidate.exists() {
                return Ok(Self {
                    path: candidate,
                    out_dir,
                });
            }
        }

        bail!(
            "The path {} does not contain a Takeout/Fitbit directory",
            root.display()
        )
    }

    pub fn export_spo2_as_viatom(&self) -> anyhow::Result<()> {
        let timezone = self.read_profile_timezone()?;
        let spo2_files = self.find_files(SPO2_DIR, "Minute SpO2", ".csv")?;
        let bpm_files = self.find_files(GLOBAL_EXPORT_DIR, "heart_rate-", ".json")?;
        if spo2_files.is_empty() || bpm_files.is_empty() {
            bail!("No SpO2 or heart rate data detected!");
        }

        let aligned = AlignedSeries::read(&spo2_files, &bpm_files, timezone)?;

        let sessions = SpO2Session::detect(&aligned.spo2_times);
        if sessions.is_empty() {
            bail!("No SpO2 night sessions detected!");
        }

        let last_bpm = aligned
            .last_bpm_time
            .context("No SpO2 or heart rate data detected!")?;
        let sessions = SpO2Session::retain_covered(sessions, last_bpm);

        info!("Detected SpO2 sessions:");
        for session in &sessions {
            info!(
                "{} - {}",
                session.start.format("%Y-%m-%d %H:%M:%S"),
                session.end.format("%Y-%m-%d %H:%M:%S")
            );
        }

        for chunk in GridResampler::new(&aligned.series, &sessions).chunks() {
            self.write_viatom_file(chunk)?;
        }

        Ok(())
    }

    pub fn export_sleep_phases_as_dreem(&self) -> anyhow::Result<()> {
        let sleep_files = self.find_files(GLOBAL_EXPORT_DIR, "sleep-", ".json")?;
        if sleep_files.is_empty() {
            bail!("No sleep data detected!");
        }

        dreem::export_sleep(&sleep_files, &self.out_dir.join("sleep.csv"))
    }

    fn write_viatom_file(&self, chunk: Vec<ViatomRecord>) -> anyhow::Result<()> {
        for record in chunk.iter().filter(|r| r.spo2 > 99) {
            warn!("SpO2 value {} above valid range, clamping to 99", record.spo2);
        }

        let file = ViatomFile::new(chunk)?;
        let path = self.out_dir.join(file.file_name());
        if path.exists() {
            bail!(
                "Output file {} already exists, refusing to overwrite",
                path.display()
            );
        }

        fs::write(&path, file.encode()).with_context(|| format!("writing {}", path.display()))?;

        // One record per 4 seconds, so records / 15 minutes of coverage.
        let minutes = file.records().len() as f64 / 15.0;
        info!(
            "Exported {} (size: {}, duration: {})",
            path.display(),
            file.byte_size(),
            minutes_to_hms(minutes)
        );

        Ok(())
    }

    fn read_profile_timezone(&self) -> anyhow::Result<Tz> {
        let path = self.path.join("Your Profile").join("Profile.csv");
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("opening {}", path.display()))?;

        let mut timezone = None;
        for row in reader.deserialize() {
            let row: ProfileRow = row.with_context(|| format!("reading {}", path.display()))?;
            timezone = Some(row.timezone);
        }

        let Some(timezone) = timezone else {
            bail!("Profile not detected!");
        };

        let timezone: Tz = timezone
            .parse()
            .map_err(|_| anyhow!("Unknown profile timezone: {timezone}"))?;
        info!("Timezone: {}", timezone);

        Ok(timezone)
    }

    fn find_files(&self, dir: &str, prefix: &str, suffix: &str) -> anyhow::Result<Vec<PathBuf>> {
        let dir = self.path.join(dir);
        let mut files = Vec::new();
        if !dir.exists() {
            return Ok(files);
        }

        for entry in fs::read_dir(&dir).with_context(|| format!("listing {}", dir.display()))? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(prefix) && name.ends_with(suffix) {
                files.push(entry.path());
            }
        }

        // Fitbit names these files by date, so this keeps samples in
        // chronological order across files.
        files.sort();
        Ok(files)
    }
}
