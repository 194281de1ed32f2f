use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::world::WorldSnapshot;

const CM_PER_INCH: f32 = 2.54;

pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * (5.0 / 9.0)
}

pub fn inches_to_cm(inches: f32) -> f32 {
    inches * CM_PER_INCH
}

/// One line of monthly output, in metric units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: u32,
    pub year: i32,
    pub temp_celsius: f32,
    pub precip_cm: f32,
    pub height_cm: f32,
    pub deer: u32,
    pub wolves: u32,
}

impl MonthlyReport {
    pub fn from_snapshot(snapshot: &WorldSnapshot) -> Self {
        Self {
            month: snapshot.month,
            year: snapshot.year,
            temp_celsius: fahrenheit_to_celsius(snapshot.temperature),
            precip_cm: inches_to_cm(snapshot.precipitation),
            height_cm: inches_to_cm(snapshot.grain_height),
            deer: snapshot.deer,
            wolves: snapshot.wolves,
        }
    }

    /// `month, year, tempC, precipCm, heightCm, deer, wolves`, reals to two
    /// decimals.
    pub fn csv_line(&self) -> String {
        format!(
            "{}, {}, {:.2}, {:.2}, {:.2}, {}, {}",
            self.month,
            self.year,
            self.temp_celsius,
            self.precip_cm,
            self.height_cm,
            self.deer,
            self.wolves
        )
    }
}

/// Receives one report per simulated month, in month order.
pub trait Reporter: Send {
    fn emit(&mut self, report: &MonthlyReport);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

pub const CSV_HEADER: &str = "month, year, temp_c, precip_cm, height_cm, deer, wolves";

/// Writes reports to stdout.
pub struct ConsoleReporter {
    format: ReportFormat,
    header_pending: bool,
}

impl ConsoleReporter {
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            header_pending: false,
        }
    }

    /// Prints the CSV header before the first record. Ignored for JSON.
    pub fn with_header(mut self) -> Self {
        self.header_pending = self.format == ReportFormat::Csv;
        self
    }

    fn render(&mut self, report: &MonthlyReport) -> Option<String> {
        match self.format {
            ReportFormat::Csv => {
                let line = report.csv_line();
                if self.header_pending {
                    self.header_pending = false;
                    Some(format!("{CSV_HEADER}\n{line}"))
                } else {
                    Some(line)
                }
            }
            ReportFormat::Json => match serde_json::to_string(report) {
                Ok(line) => Some(line),
                Err(err) => {
                    warn!(%err, "failed to encode report");
                    None
                }
            },
        }
    }
}

impl Reporter for ConsoleReporter {
    fn emit(&mut self, report: &MonthlyReport) {
        let Some(line) = self.render(report) else {
            return;
        };
        let mut out = io::stdout().lock();
        if let Err(err) = writeln!(out, "{line}") {
            warn!(%err, "failed to write report");
        }
    }
}

/// Keeps every report in memory. Clones share the same buffer, so one clone
/// can be handed to the simulation and the other read afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    reports: Arc<Mutex<Vec<MonthlyReport>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<MonthlyReport> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl Reporter for MemoryReporter {
    fn emit(&mut self, report: &MonthlyReport) {
        self.reports.lock().push(*report);
    }
}
