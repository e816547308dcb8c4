//! HSP records: BLASTX search output as consumed by the pipeline, and the
//! validated per-contig interval record built from it

use crate::types::{ContigOrfError, Frame, Result, Strand};

/// One HSP as reported by the alignment search (1-based, inclusive)
#[derive(Debug, Clone, PartialEq)]
pub struct BlastHsp {
    pub query_start: usize,
    pub query_end: usize,
    pub sbjct_start: usize,
    pub sbjct_end: usize,
    /// (query frame, subject frame); the subject frame is always 0 for BLASTX
    pub frame: (i32, i32),
    pub expect: f64,
    pub identities: u32,
    pub align_length: u32,
}

/// One subject hit with its HSPs, in the order the search reported them
#[derive(Debug, Clone, PartialEq)]
pub struct BlastAlignment {
    pub title: String,
    pub hsps: Vec<BlastHsp>,
}

/// All alignments for one query against one relative, ranked best-first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlastRecord {
    pub alignments: Vec<BlastAlignment>,
}

impl BlastRecord {
    pub fn best_alignment(&self) -> Option<&BlastAlignment> {
        self.alignments.first()
    }
}

/// Half-open 0-based interval on a contig, with the contig length needed
/// to reflect it onto the other strand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryInterval {
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
    pub seq_length: usize,
}

impl QueryInterval {
    pub fn new(start: usize, end: usize, strand: Strand, seq_length: usize) -> Result<Self> {
        if start > end || end > seq_length {
            return Err(ContigOrfError::InvalidHsp(format!(
                "Query interval [{}, {}) does not fit a contig of length {}",
                start, end, seq_length
            )));
        }
        Ok(Self {
            start,
            end,
            strand,
            seq_length,
        })
    }

    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// Reflect the interval onto the opposite strand. Applied to a
    /// reverse-strand interval this yields its forward coordinates, and
    /// applying it twice gives back the original interval.
    pub fn forward_transform(&self) -> Self {
        Self {
            start: self.seq_length - self.end,
            end: self.seq_length - self.start,
            strand: self.strand.flip(),
            seq_length: self.seq_length,
        }
    }
}

/// 1-based inclusive interval on the protein subject, start < end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectInterval {
    pub start: usize,
    pub end: usize,
}

/// A validated HSP anchored in one contig's query coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Hsp {
    pub query: QueryInterval,
    pub subject: SubjectInterval,
    pub frame: Frame,
    pub expect: f64,
    pub identities: u32,
    pub align_length: u32,
    pub relative: String,
    pub title: String,
}

impl Hsp {
    /// Validate a search HSP and convert it onto the contig's 0-based axis
    pub fn from_blast(
        hsp: &BlastHsp,
        relative: &str,
        title: &str,
        seq_length: usize,
    ) -> Result<Self> {
        if hsp.frame.1 != 0 {
            return Err(ContigOrfError::InvalidHsp(format!(
                "Subject frame must be 0 for BLASTX, got {}",
                hsp.frame.1
            )));
        }
        if hsp.sbjct_start >= hsp.sbjct_end {
            return Err(ContigOrfError::InvalidHsp(format!(
                "Subject start {} is not before subject end {}",
                hsp.sbjct_start, hsp.sbjct_end
            )));
        }
        if hsp.identities == 0 || hsp.align_length == 0 {
            return Err(ContigOrfError::InvalidHsp(format!(
                "Identities ({}) and alignment length ({}) must be positive",
                hsp.identities, hsp.align_length
            )));
        }
        if hsp.expect.is_nan() || hsp.expect < 0.0 {
            return Err(ContigOrfError::InvalidHsp(format!(
                "Expect value must be non-negative, got {}",
                hsp.expect
            )));
        }
        if hsp.query_start == 0 || hsp.query_end == 0 {
            return Err(ContigOrfError::InvalidHsp(
                "Query coordinates must be 1-based".to_string(),
            ));
        }

        let frame = Frame::new(hsp.frame.0)?;

        // Only reverse frames may be reported high-to-low
        let (low, high) = if hsp.query_start <= hsp.query_end {
            (hsp.query_start, hsp.query_end)
        } else if frame.strand() == Strand::Reverse {
            (hsp.query_end, hsp.query_start)
        } else {
            return Err(ContigOrfError::InvalidHsp(format!(
                "Query start {} is after query end {} in forward frame {}",
                hsp.query_start, hsp.query_end, frame
            )));
        };
        let query = QueryInterval::new(low - 1, high, frame.strand(), seq_length)?;

        Ok(Self {
            query,
            subject: SubjectInterval {
                start: hsp.sbjct_start,
                end: hsp.sbjct_end,
            },
            frame,
            expect: hsp.expect,
            identities: hsp.identities,
            align_length: hsp.align_length,
            relative: relative.to_string(),
            title: title.to_string(),
        })
    }

    pub fn strand(&self) -> Strand {
        self.query.strand
    }

    pub fn percent_identity(&self) -> f64 {
        self.identities as f64 / self.align_length as f64
    }

    /// Copy of this record with its query interval reflected; every other
    /// field is unchanged
    pub fn forward_transform(&self) -> Self {
        Self {
            query: self.query.forward_transform(),
            ..self.clone()
        }
    }
}
