//! Per-run CSV reports and the aggregate `index.json`.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use nestegg_core::{MonteCarloSummary, RunResult};

/// Summary file name inside the output directory.
pub const SUMMARY_FILE: &str = "index.json";

/// Writes report files for each finished run into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    transactions: bool,
}

impl ReportWriter {
    /// `transactions` also exports each run's cash ledger.
    pub fn new(dir: &Path, transactions: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            transactions,
        }
    }

    fn run_path(&self, kind: &str, index: usize) -> PathBuf {
        self.dir.join(format!("{kind}-{index:06}.csv"))
    }

    pub fn write_run(&self, run: &RunResult) -> Result<(), csv::Error> {
        self.write_balances(run)?;
        self.write_events(run)?;
        if self.transactions {
            self.write_transactions(run)?;
        }
        tracing::trace!(index = run.index, "run reports written");
        Ok(())
    }

    /// One row per month: the date, then every balance name that appears
    /// anywhere in the run, blank where the balance was zero.
    pub fn write_balances(&self, run: &RunResult) -> Result<PathBuf, csv::Error> {
        let path = self.run_path("balances", run.index);
        let names = run.balance_names();
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = Vec::with_capacity(names.len() + 1);
        header.push("date");
        header.extend(names.iter().copied());
        writer.write_record(&header)?;

        for snapshot in &run.balances {
            let mut row = Vec::with_capacity(header.len());
            row.push(snapshot.date.to_string());
            row.extend(
                names
                    .iter()
                    .map(|name| snapshot.get(name).map(|v| format!("{v:.2}")).unwrap_or_default()),
            );
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_events(&self, run: &RunResult) -> Result<PathBuf, csv::Error> {
        let path = self.run_path("events", run.index);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["date", "severity", "value"])?;
        for event in &run.events {
            writer.write_record([
                event.date.to_string(),
                event.severity.to_string(),
                event.value.clone(),
            ])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_transactions(&self, run: &RunResult) -> Result<PathBuf, csv::Error> {
        let path = self.run_path("transactions", run.index);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["date", "amount", "memo"])?;
        for t in &run.transactions {
            writer.write_record([t.date.to_string(), format!("{:.2}", t.amount), t.memo.clone()])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_summary(&self, summary: &MonteCarloSummary) -> color_eyre::Result<PathBuf> {
        let path = self.dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(summary).wrap_err("serializing summary")?;
        fs::write(&path, json).wrap_err_with(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}
