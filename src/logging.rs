//! Custom logging setup for contigorf

use crate::prediction::{NoPredictionReason, OrfPrediction};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Logger writing colored messages to the console and plain ones to an
/// optional log file
pub struct ContigOrfLogger {
    console_level: LevelFilter,
    file_writer: Option<Mutex<Box<dyn Write + Send>>>,
}

impl ContigOrfLogger {
    pub fn new(verbose: bool, log_file: Option<&Path>) -> Result<Self, std::io::Error> {
        let console_level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };

        let file_writer = match log_file {
            Some(log_path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(log_path)?;
                Some(Mutex::new(Box::new(file) as Box<dyn Write + Send>))
            }
            None => None,
        };

        Ok(ContigOrfLogger {
            console_level,
            file_writer,
        })
    }

    /// Warnings and errors always reach the console; debug output only
    /// when verbose
    fn on_console(&self, level: Level) -> bool {
        level <= self.console_level
    }

    fn write_file(&self, line: &str) {
        if let Some(file_writer) = &self.file_writer {
            if let Ok(mut writer) = file_writer.lock() {
                let _ = writeln!(writer, "{}", line);
                let _ = writer.flush();
            }
        }
    }
}

fn level_label(level: Level) -> ColoredString {
    let label = format!("{:<5}", level);
    let label = label.as_str();
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow().bold(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}

impl log::Log for ContigOrfLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.file_writer.is_some() || self.on_console(metadata.level())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let level = record.level();

        // stderr only; stdout may carry output files
        if self.on_console(level) {
            eprintln!(
                "{} {} {} {}",
                timestamp.to_string().dimmed(),
                level_label(level),
                record.target().cyan(),
                record.args()
            );
        }

        self.write_file(&format!(
            "{} {:<5} {} {}",
            timestamp,
            level,
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {
        if let Some(file_writer) = &self.file_writer {
            if let Ok(mut writer) = file_writer.lock() {
                let _ = writer.flush();
            }
        }
    }
}

/// Initialize the custom logger
pub fn init_logger(verbose: bool, log_file: Option<&Path>) -> Result<(), anyhow::Error> {
    let logger = ContigOrfLogger::new(verbose, log_file)
        .map_err(|e| anyhow::anyhow!("Failed to create logger: {}", e))?;

    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
    log::set_max_level(LevelFilter::Debug);

    Ok(())
}

/// Log a predicted ORF
pub fn log_prediction(contig_id: &str, orf: &OrfPrediction) {
    log::debug!(
        target: "contigorf::prediction",
        "ORF: Contig={}, Relative={}, Frame={}, Interval={}-{}({}), Start={}, Stop={}, Missing5'={}",
        contig_id,
        orf.relative,
        orf.frame,
        orf.orf.start,
        orf.orf.end,
        orf.orf.strand,
        orf.start_boundary,
        orf.stop_codon,
        orf.missing_5prime
    );
    if orf.majority_frameshift {
        log::warn!(
            target: "contigorf::prediction",
            "FRAMESHIFT: Contig={}, frame taken from 5' anchor of {}",
            contig_id, orf.relative
        );
    }
}

/// Log a contig left without prediction
pub fn log_no_prediction(contig_id: &str, reason: &NoPredictionReason) {
    match reason {
        NoPredictionReason::InternalStopCodon { position } => log::warn!(
            target: "contigorf::prediction",
            "NO_ORF: Contig={}, Reason={}, Position={}",
            contig_id, reason, position
        ),
        _ => log::debug!(
            target: "contigorf::prediction",
            "NO_ORF: Contig={}, Reason={}",
            contig_id, reason
        ),
    }
}

/// Log an alignment whose HSPs broke the input contract
pub fn log_rejected_alignment(contig_id: &str, relative: &str, error: &dyn std::fmt::Display) {
    log::warn!(
        target: "contigorf::evidence",
        "REJECTED: Contig={}, Relative={}, Error={}",
        contig_id, relative, error
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use tempfile::NamedTempFile;

    #[test]
    fn test_warnings_reach_console_without_verbose() {
        let logger = ContigOrfLogger::new(false, None).unwrap();
        assert!(logger.on_console(Level::Error));
        assert!(logger.on_console(Level::Warn));
        assert!(logger.on_console(Level::Info));
        assert!(!logger.on_console(Level::Debug));

        let verbose = ContigOrfLogger::new(true, None).unwrap();
        assert!(verbose.on_console(Level::Debug));
        assert!(!verbose.on_console(Level::Trace));
    }

    #[test]
    fn test_log_file_receives_debug_records() {
        let log_file = NamedTempFile::new().unwrap();
        let logger = ContigOrfLogger::new(false, Some(log_file.path())).unwrap();
        assert!(logger.enabled(&Metadata::builder().level(Level::Debug).build()));

        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("contigorf::prediction")
                .args(format_args!("NO_ORF: Contig=c1"))
                .build(),
        );
        logger.flush();

        let text = std::fs::read_to_string(log_file.path()).unwrap();
        assert!(text.contains("DEBUG contigorf::prediction NO_ORF: Contig=c1"));
    }
}
