//! Output of predicted ORFs: GFF3 features, protein FASTA and a per-contig
//! summary table

use crate::prediction::{ContigPrediction, OrfPrediction, Prediction};
use crate::types::{ContigOrfError, Result};
use bio::io::fasta;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const SOURCE: &str = "contigorf";

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        ContigOrfError::Output(format!("Failed to create {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// GFF3 writer for predicted ORFs
pub struct Gff3Writer<W: Write> {
    writer: W,
}

impl Gff3Writer<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Creating GFF3 output file: {}", path.display());
        Self::new(create_file(path)?)
    }
}

impl<W: Write> Gff3Writer<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(writer, "##gff-version 3")?;
        writeln!(writer, "##generated-by {} v{}", SOURCE, env!("CARGO_PKG_VERSION"))?;
        Ok(Gff3Writer { writer })
    }

    /// Write one CDS feature per predicted ORF, in input order
    pub fn write_predictions(&mut self, predictions: &[ContigPrediction]) -> Result<usize> {
        let mut written = 0;
        for prediction in predictions {
            if let Ok(Prediction::Predicted(orf)) = &prediction.outcome {
                self.write_orf(&prediction.contig_id, orf)?;
                written += 1;
            }
        }
        self.writer.flush()?;
        info!("Wrote {} ORFs to GFF3", written);
        Ok(written)
    }

    fn write_orf(&mut self, contig_id: &str, orf: &OrfPrediction) -> Result<()> {
        debug!("Writing ORF for contig: {}", contig_id);

        let mut attributes: HashMap<String, Vec<String>> = HashMap::new();
        attributes.insert("ID".to_string(), vec![format!("{}.orf", contig_id)]);
        attributes.insert("relative".to_string(), vec![orf.relative.clone()]);
        attributes.insert("frame".to_string(), vec![orf.frame.to_string()]);
        attributes.insert(
            "start_codon".to_string(),
            vec![orf.start_boundary.to_string()],
        );
        attributes.insert("stop_codon".to_string(), vec![orf.stop_codon.to_string()]);
        attributes.insert(
            "missing_5prime".to_string(),
            vec![orf.missing_5prime.to_string()],
        );
        attributes.insert(
            "frameshift".to_string(),
            vec![orf.majority_frameshift.to_string()],
        );
        attributes.insert("policy".to_string(), vec![orf.policy.to_string()]);

        // GFF3 is 1-based inclusive
        writeln!(
            self.writer,
            "{}\t{}\tCDS\t{}\t{}\t.\t{}\t0\t{}",
            contig_id,
            SOURCE,
            orf.orf.start + 1,
            orf.orf.end,
            orf.orf.strand,
            format_attributes(&attributes)
        )?;
        Ok(())
    }
}

/// Format GFF3 attributes with `ID` first and the rest sorted
fn format_attributes(attributes: &HashMap<String, Vec<String>>) -> String {
    if attributes.is_empty() {
        return ".".to_string();
    }

    let mut attr_strings = Vec::new();
    if let Some(id_values) = attributes.get("ID") {
        attr_strings.push(format!("ID={}", id_values.join(",")));
    }

    let mut other_keys: Vec<_> = attributes.keys().filter(|k| *k != "ID").collect();
    other_keys.sort();
    for key in other_keys {
        attr_strings.push(format!("{}={}", key, attributes[key].join(",")));
    }

    attr_strings.join(";")
}

/// Protein FASTA writer for translated ORFs
pub struct ProteinWriter<W: Write> {
    writer: fasta::Writer<W>,
}

impl ProteinWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Creating protein FASTA file: {}", path.display());
        Ok(Self::new(create_file(path)?))
    }
}

impl<W: Write> ProteinWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: fasta::Writer::new(writer),
        }
    }

    pub fn write_predictions(&mut self, predictions: &[ContigPrediction]) -> Result<usize> {
        let mut written = 0;
        for prediction in predictions {
            if let Ok(Prediction::Predicted(orf)) = &prediction.outcome {
                let protein = orf.protein.trim_end_matches('*');
                let description = format!(
                    "frame={} relative={} start={} missing_5prime={}",
                    orf.frame, orf.relative, orf.start_boundary, orf.missing_5prime
                );
                self.writer.write(
                    &format!("{}.orf", prediction.contig_id),
                    Some(&description),
                    protein.as_bytes(),
                )?;
                written += 1;
            }
        }
        self.writer.flush()?;
        info!("Wrote {} protein sequences", written);
        Ok(written)
    }
}

/// Tab-separated per-contig summary, including contigs without prediction
pub struct SummaryWriter<W: Write> {
    writer: W,
}

impl SummaryWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Creating summary file: {}", path.display());
        Self::new(create_file(path)?)
    }
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(
            writer,
            "contig\tstatus\treason\trelative\tstrand\tframe\tstart\tend\t\
             start_boundary\tstop_codon\tmissing_5prime\tany_frameshift\tmajority_frameshift\tprotein_length"
        )?;
        Ok(Self { writer })
    }

    pub fn write_predictions(&mut self, predictions: &[ContigPrediction]) -> Result<()> {
        for prediction in predictions {
            let id = &prediction.contig_id;
            match &prediction.outcome {
                Ok(Prediction::Predicted(orf)) => writeln!(
                    self.writer,
                    "{}\tpredicted\t.\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    id,
                    orf.relative,
                    orf.strand,
                    orf.frame,
                    orf.orf.start + 1,
                    orf.orf.end,
                    orf.start_boundary,
                    orf.stop_codon,
                    orf.missing_5prime,
                    orf.any_frameshift,
                    orf.majority_frameshift,
                    orf.protein.trim_end_matches('*').len()
                )?,
                Ok(Prediction::NoPrediction(reason)) => writeln!(
                    self.writer,
                    "{}\tno_prediction\t{}\t.\t.\t.\t.\t.\t.\t.\t.\t.\t.\t.",
                    id, reason
                )?,
                Err(e) => writeln!(
                    self.writer,
                    "{}\terror\t{}\t.\t.\t.\t.\t.\t.\t.\t.\t.\t.\t.",
                    id,
                    e.to_string().replace('\t', " ")
                )?,
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsp::QueryInterval;
    use crate::prediction::{NoPredictionReason, StartBoundary};
    use crate::types::{BoundaryPolicy, Frame, Strand};

    fn predictions() -> Vec<ContigPrediction> {
        let orf = OrfPrediction {
            relative: "athaliana".to_string(),
            strand: Strand::Reverse,
            frame: Frame::new(-2).unwrap(),
            orf: QueryInterval::new(27, 270, Strand::Reverse, 300).unwrap(),
            missing_5prime: false,
            start_boundary: StartBoundary::StartCodon,
            stop_codon: true,
            any_frameshift: false,
            majority_frameshift: false,
            policy: BoundaryPolicy::ConservativeInclusive,
            protein: "MPPK*".to_string(),
        };
        vec![
            ContigPrediction {
                contig_id: "contig1".to_string(),
                outcome: Ok(Prediction::Predicted(orf)),
            },
            ContigPrediction {
                contig_id: "contig2".to_string(),
                outcome: Ok(Prediction::NoPrediction(
                    NoPredictionReason::InternalStopCodon { position: 12 },
                )),
            },
            ContigPrediction {
                contig_id: "contig3".to_string(),
                outcome: Err(ContigOrfError::Inconsistency("bad".to_string())),
            },
        ]
    }

    #[test]
    fn test_gff3_output() {
        let mut buffer = Vec::new();
        let written = Gff3Writer::new(&mut buffer)
            .unwrap()
            .write_predictions(&predictions())
            .unwrap();
        assert_eq!(written, 1);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "##gff-version 3");
        assert_eq!(lines.len(), 3);
        let fields: Vec<&str> = lines[2].split('\t').collect();
        assert_eq!(&fields[..8], &["contig1", "contigorf", "CDS", "28", "270", ".", "-", "0"]);
        assert!(fields[8].starts_with("ID=contig1.orf;"));
        assert!(fields[8].contains("frame=-2"));
        assert!(fields[8].contains("start_codon=start_codon"));
    }

    #[test]
    fn test_protein_output() {
        let mut buffer = Vec::new();
        let written = ProteinWriter::new(&mut buffer)
            .write_predictions(&predictions())
            .unwrap();
        assert_eq!(written, 1);
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with(">contig1.orf frame=-2 relative=athaliana"));
        assert!(text.contains("\nMPPK\n"));
    }

    #[test]
    fn test_summary_output() {
        let mut buffer = Vec::new();
        SummaryWriter::new(&mut buffer)
            .unwrap()
            .write_predictions(&predictions())
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("contig1\tpredicted\t.\tathaliana\t-\t-2\t28\t270"));
        assert!(lines[1].ends_with("\t4"));
        assert!(lines[2].starts_with("contig2\tno_prediction\tinternal_stop_codon"));
        assert!(lines[3].starts_with("contig3\terror\tInconsistent evidence: bad"));
        for line in &lines {
            assert_eq!(line.split('\t').count(), 14);
        }
    }

    #[test]
    fn test_format_attributes_orders_id_first() {
        let mut attributes = HashMap::new();
        attributes.insert("zeta".to_string(), vec!["1".to_string()]);
        attributes.insert("ID".to_string(), vec!["x".to_string()]);
        attributes.insert("alpha".to_string(), vec!["2".to_string(), "3".to_string()]);
        assert_eq!(format_attributes(&attributes), "ID=x;alpha=2,3;zeta=1");
        assert_eq!(format_attributes(&HashMap::new()), ".");
    }
}
