//! Core data structures shared across the ORF inference pipeline

use thiserror::Error;

/// Errors that can occur while loading evidence or predicting ORFs
#[derive(Error, Debug)]
pub enum ContigOrfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FASTA parsing error: {0}")]
    FastaParse(String),

    #[error("Hits parsing error: {0}")]
    HitsParse(String),

    #[error("Invalid HSP: {0}")]
    InvalidHsp(String),

    #[error("Inconsistent evidence: {0}")]
    Inconsistency(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, ContigOrfError>;

/// Default expect-value threshold used by every evidence query
pub const DEFAULT_MIN_EXPECT: f64 = 10.0;

/// Default query-start threshold for missing 5' detection (amino acids)
pub const DEFAULT_QS_THRESH: usize = 16;

/// Default subject-start threshold for missing 5' detection (amino acids)
pub const DEFAULT_SS_THRESH: usize = 40;

/// DNA strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// +1 for the forward strand, -1 for the reverse strand
    pub fn to_sign(self) -> i8 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

impl std::str::FromStr for Strand {
    type Err = ContigOrfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(ContigOrfError::InvalidHsp(format!("Invalid strand: {}", s))),
        }
    }
}

/// Signed reading frame: the sign encodes the strand, the magnitude (1-3)
/// the nucleotide offset of the first codon on that strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Frame(i8);

impl Frame {
    pub fn new(value: i32) -> Result<Self> {
        if value == 0 || value.abs() > 3 {
            return Err(ContigOrfError::InvalidHsp(format!(
                "Frame must be one of -3..=-1 or 1..=3, got {}",
                value
            )));
        }
        Ok(Frame(value as i8))
    }

    pub fn value(self) -> i8 {
        self.0
    }

    pub fn strand(self) -> Strand {
        if self.0 < 0 {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    /// Sign of the frame, matching `Strand::to_sign`
    pub fn sign(self) -> i8 {
        self.0.signum()
    }

    /// 0-based offset of the first in-frame codon on the frame's own strand
    pub fn offset(self) -> usize {
        (self.0.unsigned_abs() - 1) as usize
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

/// How the 5' boundary of a predicted ORF is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// 5'-most in-frame start codon upstream of the 5' anchor that is not
    /// separated from it by an in-frame stop codon
    ConservativeInclusive,
    /// In-frame start codon closest to the 5' anchor, at or upstream of it,
    /// without crossing an in-frame stop codon
    CanonicalStart,
}

impl std::fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryPolicy::ConservativeInclusive => write!(f, "inclusive"),
            BoundaryPolicy::CanonicalStart => write!(f, "canonical"),
        }
    }
}

impl std::str::FromStr for BoundaryPolicy {
    type Err = ContigOrfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inclusive" | "A" => Ok(BoundaryPolicy::ConservativeInclusive),
            "canonical" | "B" => Ok(BoundaryPolicy::CanonicalStart),
            _ => Err(ContigOrfError::Inconsistency(format!(
                "Unknown boundary policy: {} (expected 'inclusive' or 'canonical')",
                s
            ))),
        }
    }
}

/// Configuration parameters for ORF prediction
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    pub min_expect: f64,
    pub qs_thresh: usize,
    pub ss_thresh: usize,
    pub policy: BoundaryPolicy,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            min_expect: DEFAULT_MIN_EXPECT,
            qs_thresh: DEFAULT_QS_THRESH,
            ss_thresh: DEFAULT_SS_THRESH,
            policy: BoundaryPolicy::ConservativeInclusive,
        }
    }
}
