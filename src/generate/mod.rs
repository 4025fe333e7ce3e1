use crate::query::DATETIME_FORMAT;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::source::record::METRIC_COUNT;

/// App names sampled by the generator.
pub const APPS: [&str; 8] = [
    "facebook",
    "twitter",
    "youtube",
    "instagram",
    "tiktok",
    "whatsapp",
    "telegram",
    "snapchat",
];

/// Users sampled by the generator: `user1` through `user99`.
pub const USER_COUNT: u32 = 99;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub days: u32,
    pub logs_per_day: u64,
    pub start_date: NaiveDate,
    pub threads: usize,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateSummary {
    pub files_written: u64,
    pub rows_written: u64,
}

#[derive(Debug, Clone)]
struct GeneratedRow {
    timestamp: NaiveDateTime,
    user: String,
    app: String,
    metrics: [u32; METRIC_COUNT],
}

/// Write `days` synthetic day files starting at `start_date`, each holding
/// `logs_per_day` random rows sorted by user.
pub async fn generate_logs(opts: &GenerateOptions) -> Result<GenerateSummary, GenerateError> {
    std::fs::create_dir_all(&opts.output_dir)?;

    let mut summary = GenerateSummary::default();
    for day_offset in 0..opts.days {
        let date = opts.start_date + Duration::days(day_offset as i64);
        let rows = generate_day(date, opts.logs_per_day, opts.threads).await?;

        let path = opts.output_dir.join(format!("{}.log.csv", date.format("%Y-%m-%d")));
        write_day_file(&path, &rows)?;

        summary.files_written += 1;
        summary.rows_written += rows.len() as u64;
        debug!(path = %path.display(), rows = rows.len(), "day file written");
    }

    info!(
        files = summary.files_written,
        rows = summary.rows_written,
        output_dir = %opts.output_dir.display(),
        "generation complete"
    );
    Ok(summary)
}

/// Generate one day's rows, split across worker tasks with a private RNG
/// each, then sorted by user to match the production file layout.
async fn generate_day(
    date: NaiveDate,
    count: u64,
    threads: usize,
) -> Result<Vec<GeneratedRow>, GenerateError> {
    let workers = threads.max(1);
    let per_worker = count / workers as u64;
    let remainder = count % workers as u64;

    let mut handles = Vec::with_capacity(workers);
    for i in 0..workers {
        let batch = per_worker + if (i as u64) < remainder { 1 } else { 0 };
        handles.push(tokio::task::spawn_blocking(move || {
            generate_batch(date, batch)
        }));
    }

    let mut rows = Vec::with_capacity(count as usize);
    for handle in handles {
        rows.extend(handle.await?);
    }

    rows.sort_by(|a, b| a.user.cmp(&b.user));
    Ok(rows)
}

fn generate_batch(date: NaiveDate, count: u64) -> Vec<GeneratedRow> {
    let mut rng = SmallRng::from_entropy();
    let mut rows = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let time = NaiveTime::from_hms_opt(
            rng.gen_range(0..24),
            rng.gen_range(0..60),
            rng.gen_range(0..60),
        )
        .unwrap();

        let mut metrics = [0u32; METRIC_COUNT];
        for slot in metrics.iter_mut() {
            *slot = rng.gen_range(1..=1000);
        }

        rows.push(GeneratedRow {
            timestamp: date.and_time(time),
            user: format!("user{}", rng.gen_range(1..=USER_COUNT)),
            app: APPS[rng.gen_range(0..APPS.len())].to_string(),
            metrics,
        });
    }

    rows
}

fn write_day_file(path: &Path, rows: &[GeneratedRow]) -> Result<(), GenerateError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        let mut fields: Vec<String> = vec![
            row.timestamp.format(DATETIME_FORMAT).to_string(),
            row.user.clone(),
            row.app.clone(),
        ];
        fields.extend(row.metrics.iter().map(|m| m.to_string()));
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}
