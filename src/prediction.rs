//! ORF prediction: combines strand, frame, anchors and the missing 5' flag
//! into start/end boundaries on the contig

use crate::anchors::AnchorHsps;
use crate::contig::Contig;
use crate::hsp::QueryInterval;
use crate::logging::{log_no_prediction, log_prediction};
use crate::translation::{align_to_frame, reverse_complement, CodonClass, GeneticCode};
use crate::truncation::anchor_missing_5prime;
use crate::types::{BoundaryPolicy, ContigOrfError, Frame, PredictionConfig, Result, Strand};

use log::{debug, info, warn};
use rayon::prelude::*;
use std::borrow::Cow;

/// Why a contig received no ORF prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPredictionReason {
    /// No relative contributed any alignment
    NoRelative,
    /// No HSP passed the expect threshold
    NoEvidence,
    /// Most relatives hit the contig on both strands
    InconsistentStrand,
    /// Relatives disagree on the strand
    MixedStrands,
    /// The frame leaves no complete codon on the contig
    NoReadingFrame,
    /// In-frame stop codon inside the candidate ORF; `position` is the
    /// 0-based start of the codon on the contig
    InternalStopCodon { position: usize },
}

impl std::fmt::Display for NoPredictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoPredictionReason::NoRelative => write!(f, "no_relative"),
            NoPredictionReason::NoEvidence => write!(f, "no_evidence"),
            NoPredictionReason::InconsistentStrand => write!(f, "inconsistent_strand"),
            NoPredictionReason::MixedStrands => write!(f, "mixed_strands"),
            NoPredictionReason::NoReadingFrame => write!(f, "no_reading_frame"),
            NoPredictionReason::InternalStopCodon { .. } => write!(f, "internal_stop_codon"),
        }
    }
}

/// How the 5' end of a predicted ORF was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBoundary {
    /// Begins at an in-frame start codon
    StartCodon,
    /// No start codon before the upstream stop or the contig end; the ORF
    /// begins at the 5'-most in-frame codon reached
    Open,
    /// Evidence indicates the contig is missing its 5' coding region; no
    /// start codon is asserted
    Truncated,
}

impl std::fmt::Display for StartBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartBoundary::StartCodon => write!(f, "start_codon"),
            StartBoundary::Open => write!(f, "open"),
            StartBoundary::Truncated => write!(f, "truncated"),
        }
    }
}

/// A predicted ORF
#[derive(Debug, Clone, PartialEq)]
pub struct OrfPrediction {
    /// Relative of the 5' anchor
    pub relative: String,
    pub strand: Strand,
    pub frame: Frame,
    /// Half-open interval on the contig; `orf.strand` is the coding strand
    pub orf: QueryInterval,
    pub missing_5prime: bool,
    pub start_boundary: StartBoundary,
    /// Whether the ORF ends in a stop codon (false: runs off the 3' end)
    pub stop_codon: bool,
    pub any_frameshift: bool,
    pub majority_frameshift: bool,
    pub policy: BoundaryPolicy,
    pub protein: String,
}

impl OrfPrediction {
    pub fn length(&self) -> usize {
        self.orf.width()
    }
}

/// Outcome of predicting one contig
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    NoPrediction(NoPredictionReason),
    Predicted(OrfPrediction),
}

impl Prediction {
    pub fn orf(&self) -> Option<&OrfPrediction> {
        match self {
            Prediction::Predicted(orf) => Some(orf),
            Prediction::NoPrediction(_) => None,
        }
    }
}

/// Prediction outcome for one contig of a batch
#[derive(Debug)]
pub struct ContigPrediction {
    pub contig_id: String,
    pub outcome: Result<Prediction>,
}

/// Result of walking upstream from the 5' anchor
struct UpstreamScan {
    /// 5'-most in-frame codon reached before a stop codon or the contig end
    furthest: usize,
    /// 5'-most start codon among the codons walked
    five_most_start: Option<usize>,
    /// Start codon closest to the anchor
    nearest_start: Option<usize>,
}

/// Main ORF prediction engine
pub struct OrfPredictor {
    config: PredictionConfig,
    code: GeneticCode,
}

impl OrfPredictor {
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            config,
            code: GeneticCode::standard(),
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Predict the ORF of a single contig.
    ///
    /// Lack of evidence and internal stop codons are reported as
    /// `Prediction::NoPrediction`; an error means the evidence contradicts
    /// itself in a way aggregation should never produce.
    pub fn predict(&self, contig: &Contig) -> Result<Prediction> {
        let min_expect = self.config.min_expect;

        if !contig.has_relative {
            return Ok(Prediction::NoPrediction(NoPredictionReason::NoRelative));
        }
        match contig.inconsistent_strand(min_expect) {
            None => return Ok(Prediction::NoPrediction(NoPredictionReason::NoEvidence)),
            Some(true) => {
                return Ok(Prediction::NoPrediction(
                    NoPredictionReason::InconsistentStrand,
                ))
            }
            Some(false) => {}
        }
        let strand = match contig.strand(min_expect) {
            Some(strand) => strand,
            None => return Ok(Prediction::NoPrediction(NoPredictionReason::MixedStrands)),
        };
        let anchors = contig.anchors(min_expect).ok_or_else(|| {
            ContigOrfError::Inconsistency(format!(
                "Contig {} has filtered evidence but no anchor HSPs",
                contig.id
            ))
        })?;

        let majority_frameshift = contig.majority_frameshift(min_expect).unwrap_or(false);
        let any_frameshift = contig.any_frameshift(min_expect).unwrap_or(false);
        let frame = if majority_frameshift {
            debug!(
                "Contig {}: majority frameshift, using frame {} of 5' anchor",
                contig.id, anchors.most_5prime.frame
            );
            anchors.most_5prime.frame
        } else {
            contig.majority_frame(min_expect).ok_or_else(|| {
                ContigOrfError::Inconsistency(format!(
                    "Contig {} has filtered evidence but no majority frame",
                    contig.id
                ))
            })?
        };

        if frame.sign() != strand.to_sign() {
            return Err(ContigOrfError::Inconsistency(format!(
                "Contig {}: frame {} disagrees with strand {}",
                contig.id, frame, strand
            )));
        }

        let missing_5prime = anchor_missing_5prime(
            anchors.most_5prime,
            self.config.qs_thresh,
            self.config.ss_thresh,
        );

        let outcome = self.place_orf(contig, &anchors, frame, missing_5prime)?;
        Ok(match outcome {
            Ok(placed) => Prediction::Predicted(OrfPrediction {
                relative: anchors.relative.to_string(),
                strand,
                frame,
                orf: placed.orf,
                missing_5prime,
                start_boundary: placed.start_boundary,
                stop_codon: placed.stop_codon,
                any_frameshift,
                majority_frameshift,
                policy: self.config.policy,
                protein: placed.protein,
            }),
            Err(reason) => Prediction::NoPrediction(reason),
        })
    }

    /// Boundary selection on the coding strand. Reverse-frame anchors are
    /// reflected so the arithmetic below only deals with forward coordinates.
    fn place_orf(
        &self,
        contig: &Contig,
        anchors: &AnchorHsps<'_>,
        frame: Frame,
        missing_5prime: bool,
    ) -> Result<std::result::Result<PlacedOrf, NoPredictionReason>> {
        let reverse = frame.strand() == Strand::Reverse;
        let (five, three) = if reverse {
            (
                anchors.most_5prime.query.forward_transform(),
                anchors.most_3prime.query.forward_transform(),
            )
        } else {
            (anchors.most_5prime.query, anchors.most_3prime.query)
        };

        let sequence: Cow<[u8]> = if reverse {
            Cow::Owned(reverse_complement(&contig.sequence))
        } else {
            Cow::Borrowed(contig.sequence.as_slice())
        };
        let length = sequence.len();
        let offset = frame.offset();

        if offset + 3 > length {
            return Ok(Err(NoPredictionReason::NoReadingFrame));
        }

        let anchor_pos = align_to_frame(five.start, offset).unwrap_or(offset);
        let upstream = self.scan_upstream(&sequence, anchor_pos, offset);

        let (start, start_boundary) = if missing_5prime {
            (upstream.furthest, StartBoundary::Truncated)
        } else {
            let chosen = match self.config.policy {
                BoundaryPolicy::ConservativeInclusive => upstream.five_most_start,
                BoundaryPolicy::CanonicalStart => upstream.nearest_start,
            };
            match chosen {
                Some(pos) => (pos, StartBoundary::StartCodon),
                None => (upstream.furthest, StartBoundary::Open),
            }
        };

        let scan_from = align_to_frame(three.end, offset).unwrap_or(offset).max(start);
        let (end, stop_codon) = self.scan_downstream(&sequence, scan_from);

        if end <= start {
            return Ok(Err(NoPredictionReason::NoReadingFrame));
        }
        if let Some(&stop) = self.code.internal_stops(&sequence, start, end).first() {
            let position = if reverse { length - stop - 3 } else { stop };
            return Ok(Err(NoPredictionReason::InternalStopCodon { position }));
        }

        let coding = QueryInterval::new(start, end, Strand::Forward, length)?;
        let orf = if reverse {
            coding.forward_transform()
        } else {
            coding
        };

        Ok(Ok(PlacedOrf {
            orf,
            start_boundary,
            stop_codon,
            protein: self.code.translate(&sequence[start..end]),
        }))
    }

    fn scan_upstream(&self, sequence: &[u8], anchor_pos: usize, offset: usize) -> UpstreamScan {
        let mut scan = UpstreamScan {
            furthest: anchor_pos,
            five_most_start: None,
            nearest_start: None,
        };
        let mut pos = anchor_pos;
        loop {
            match self.code.classify_at(sequence, pos) {
                CodonClass::Stop => break,
                CodonClass::Start => {
                    scan.five_most_start = Some(pos);
                    scan.nearest_start.get_or_insert(pos);
                }
                CodonClass::Other => {}
            }
            scan.furthest = pos;
            if pos < offset + 3 {
                break;
            }
            pos -= 3;
        }
        scan
    }

    /// End of the ORF: through the first in-frame stop at or after `from`,
    /// else the last complete codon
    fn scan_downstream(&self, sequence: &[u8], from: usize) -> (usize, bool) {
        let mut pos = from;
        while pos + 3 <= sequence.len() {
            if self.code.classify_at(sequence, pos) == CodonClass::Stop {
                return (pos + 3, true);
            }
            pos += 3;
        }
        (pos.min(sequence.len()), false)
    }

    /// Predict every contig in parallel. A failing contig is logged and
    /// counted without affecting the others; results keep input order.
    pub fn predict_all(&self, contigs: &[Contig]) -> (Vec<ContigPrediction>, PredictionSummary) {
        info!("Predicting ORFs for {} contigs", contigs.len());

        let results: Vec<ContigPrediction> = contigs
            .par_iter()
            .map(|contig| {
                let outcome = self.predict(contig);
                match &outcome {
                    Ok(Prediction::Predicted(orf)) => log_prediction(&contig.id, orf),
                    Ok(Prediction::NoPrediction(reason)) => log_no_prediction(&contig.id, reason),
                    Err(e) => warn!("Failed to predict ORF for contig {}: {}", contig.id, e),
                }
                ContigPrediction {
                    contig_id: contig.id.clone(),
                    outcome,
                }
            })
            .collect();

        let mut summary = PredictionSummary::default();
        for result in &results {
            summary.record(&result.outcome);
        }

        info!("Prediction complete: {}", summary);
        (results, summary)
    }
}

struct PlacedOrf {
    orf: QueryInterval,
    start_boundary: StartBoundary,
    stop_codon: bool,
    protein: String,
}

/// Summary of prediction results
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PredictionSummary {
    pub contigs_processed: u32,
    pub predicted: u32,
    pub failed: u32,
    pub no_relative: u32,
    pub no_evidence: u32,
    pub inconsistent_strand: u32,
    pub mixed_strands: u32,
    pub no_reading_frame: u32,
    pub internal_stop: u32,
    pub missing_5prime: u32,
    pub majority_frameshift: u32,
    pub missing_stop: u32,
}

impl PredictionSummary {
    fn record(&mut self, outcome: &Result<Prediction>) {
        self.contigs_processed += 1;
        match outcome {
            Ok(Prediction::Predicted(orf)) => {
                self.predicted += 1;
                if orf.missing_5prime {
                    self.missing_5prime += 1;
                }
                if orf.majority_frameshift {
                    self.majority_frameshift += 1;
                }
                if !orf.stop_codon {
                    self.missing_stop += 1;
                }
            }
            Ok(Prediction::NoPrediction(reason)) => match reason {
                NoPredictionReason::NoRelative => self.no_relative += 1,
                NoPredictionReason::NoEvidence => self.no_evidence += 1,
                NoPredictionReason::InconsistentStrand => self.inconsistent_strand += 1,
                NoPredictionReason::MixedStrands => self.mixed_strands += 1,
                NoPredictionReason::NoReadingFrame => self.no_reading_frame += 1,
                NoPredictionReason::InternalStopCodon { .. } => self.internal_stop += 1,
            },
            Err(_) => self.failed += 1,
        }
    }
}

impl std::fmt::Display for PredictionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Contigs: {}, Predicted: {}, Failed: {}, No relative: {}, No evidence: {}, \
             Inconsistent strand: {}, Mixed strands: {}, Internal stop: {}, \
             Missing 5': {}, Majority frameshift: {}, No stop codon: {}",
            self.contigs_processed,
            self.predicted,
            self.failed,
            self.no_relative,
            self.no_evidence,
            self.inconsistent_strand,
            self.mixed_strands,
            self.internal_stop,
            self.missing_5prime,
            self.majority_frameshift,
            self.missing_stop
        )
    }
}
