//! contigorf: ORF inference on assembled contigs from BLASTX evidence
//!
//! Each contig collects the HSPs of its best alignment against one or more
//! related proteomes. The evidence decides strand and reading frame, the
//! extremal HSPs anchor the ORF, and the 5' anchor tells whether the
//! assembly is likely truncated before the true start codon.

pub mod anchors;
pub mod contig;
pub mod evidence;
pub mod fasta;
pub mod hits;
pub mod hsp;
pub mod intervals;
pub mod logging;
pub mod output;
pub mod prediction;
pub mod translation;
pub mod truncation;
pub mod types;

// Re-export main types for library usage
pub use anchors::AnchorHsps;
pub use contig::Contig;
pub use fasta::*;
pub use hits::*;
pub use hsp::*;
pub use intervals::HspCollection;
pub use output::*;
pub use prediction::*;
pub use types::*;
