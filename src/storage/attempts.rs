//! Execution attempt storage

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::info;
use crate::types::ExecutionAttempt;

pub fn save_attempt(attempt: &ExecutionAttempt) -> Result<()> {
    let filename = format!(
        "output/attempts/attempts_{}.jsonl",
        Utc::now().format("%Y-%m-%d")
    );

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(attempt)?)?;

    info!(
        attempt_id = %attempt.id,
        outcome = ?attempt.outcome,
        duration_ms = attempt.duration_ms,
        "Saved execution attempt"
    );

    Ok(())
}
