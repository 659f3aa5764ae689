use super::*;
use crate::analysis::RunReport;
use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use super::table::TableGenerator;

pub struct Reporter {
    format: OutputFormat,
    output_path: Option<String>,
    top: usize,
}

impl Reporter {
    /// Without an `output_path` the report goes to stdout.
    pub fn new(format: &str, output_path: Option<&str>, top: usize) -> Self {
        let format = OutputFormat::from(format);
        let output_path = output_path.map(|p| add_file_extension(p, &format));

        Self {
            format,
            output_path,
            top,
        }
    }

    pub fn render(&self, report: &RunReport) -> Result<String> {
        let content = match self.format {
            OutputFormat::Table => TableGenerator::new(self.top).generate(report),
            OutputFormat::Json => serde_json::to_string_pretty(report)?,
        };
        Ok(content)
    }

    pub fn generate_report(&self, report: &RunReport) -> Result<()> {
        match &self.output_path {
            Some(path) => {
                // Files should not carry terminal escape codes.
                colored::control::set_override(false);
                let content = self.render(report)?;
                colored::control::unset_override();

                fs::write(path, content)
                    .with_context(|| format!("Failed to write report to {}", path))?;
                info!("Report saved to {}", path);
            }
            None => println!("{}", self.render(report)?),
        }
        Ok(())
    }
}
