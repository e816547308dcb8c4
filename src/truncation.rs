//! Detection of contigs assembled without the 5' end of their coding region
//!
//! An anchor that starts near the contig's 5' end in the query but late in
//! the subject protein suggests the protein's N-terminus extends past the
//! assembled sequence:
//!
//! ```text
//!                query start
//!               |   HSP
//!          |------------------------------------------| contig
//!               |||||||||||
//!       |.......|---------| subject
//!    subject
//!     start
//! ```

use crate::contig::Contig;
use crate::hsp::Hsp;
use crate::types::Strand;

/// Whether a 5' anchor HSP indicates a missing 5' end.
///
/// Thresholds are in the same units BLAST reports (amino acids for the
/// subject). Query starts on the forward strand are measured as
/// `|start - contig_length| + 1`.
pub fn anchor_missing_5prime(most_5prime: &Hsp, qs_thresh: usize, ss_thresh: usize) -> bool {
    let late_in_subject = most_5prime.subject.start >= ss_thresh;
    match most_5prime.strand() {
        Strand::Reverse => most_5prime.query.start <= qs_thresh && late_in_subject,
        Strand::Forward => {
            let qs = most_5prime.query.start.abs_diff(most_5prime.query.seq_length) + 1;
            qs <= qs_thresh && late_in_subject
        }
    }
}

impl Contig {
    /// `None` when there is no relative evidence passing `min_expect`
    pub fn missing_5prime(&self, qs_thresh: usize, ss_thresh: usize, min_expect: f64) -> Option<bool> {
        let anchors = self.anchors(min_expect)?;
        Some(anchor_missing_5prime(anchors.most_5prime, qs_thresh, ss_thresh))
    }
}
