use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use anyhow::Context;
use fitbit_algos::{helpers::minutes_to_hms, SleepStage};
use serde::Deserialize;

const CSV_HEADER: [&str; 10] = [
    "Start Time",
    "Stop Time",
    "Sleep Onset Duration",
    "Light Sleep Duration",
    "Deep Sleep Duration",
    "REM Duration",
    "Wake After Sleep Onset Duration",
    "Number of awakenings",
    "Sleep efficiency",
    "Hypnogram",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SleepSession {
    start_time: String,
    end_time: String,
    /// Total duration in milliseconds.
    duration: f64,
    minutes_awake: f64,
    efficiency: i64,
    levels: SleepLevels,
}

#[derive(Debug, Deserialize)]
struct SleepLevels {
    summary: HashMap<String, StageSummary>,
    data: Vec<StageSpan>,
}

#[derive(Debug, Deserialize)]
struct StageSummary {
    minutes: f64,
    #[serde(default)]
    count: u32,
}

#[derive(Debug, Deserialize)]
struct StageSpan {
    level: String,
    seconds: u32,
}

impl SleepSession {
    /// Stage-level summaries only exist for full nights; naps are logged
    /// with classic levels (asleep/restless/awake) and carry no `light`
    /// entry.
    fn is_full_night(&self) -> bool {
        self.levels
            .summary
            .keys()
            .any(|k| k.eq_ignore_ascii_case("light"))
    }

    fn summary_minutes(&self, stage: &str) -> anyhow::Result<f64> {
        self.levels
            .summary
            .get(stage)
            .map(|s| s.minutes)
            .with_context(|| format!("sleep summary missing `{stage}` stage"))
    }

    fn awakening_count(&self) -> anyhow::Result<u32> {
        self.levels
            .summary
            .get("wake")
            .map(|s| s.count)
            .context("sleep summary missing `wake` stage")
    }

    fn hypnogram(&self) -> String {
        let mut labels = Vec::new();
        for span in &self.levels.data {
            match SleepStage::parse(&span.level) {
                Some(stage) => labels.extend(stage.expand(span.seconds)),
                None => warn!("Sleep stage '{}' is not recognized", span.level),
            }
        }

        format!("[{}]", labels.join(","))
    }

    fn to_row(&self) -> anyhow::Result<Vec<String>> {
        Ok(vec![
            self.start_time.clone(),
            self.end_time.clone(),
            minutes_to_hms(self.duration / 60_000.0),
            minutes_to_hms(self.summary_minutes("light")?),
            minutes_to_hms(self.summary_minutes("deep")?),
            minutes_to_hms(self.summary_minutes("rem")?),
            minutes_to_hms(self.minutes_awake),
            self.awakening_count()?.to_string(),
            self.efficiency.to_string(),
            self.hypnogram(),
        ])
    }
}

/// Writes one semicolon-delimited CSV row per full-night sleep session
/// found in the given Fitbit sleep logs.
pub fn export_sleep(json_files: &[impl AsRef<Path>], output: &Path) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(output)
        .with_context(|| format!("creating {}", output.display()))?;

    writer.write_record(CSV_HEADER)?;

    for path in json_files {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let sessions: Vec<SleepSession> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("reading {}", path.display()))?;

        for session in sessions.iter().filter(|s| s.is_full_night()) {
            info!(
                "Export to dreem sleep: {} - {}",
                session.start_time, session.end_time
            );
            writer.write_record(session.to_row()?)?;
        }
    }

    writer.flush()?;
    Ok(())
}
