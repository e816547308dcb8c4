//! Assembled contigs and the relative evidence attached to them

use crate::hsp::{BlastRecord, Hsp};
use crate::intervals::HspCollection;
use crate::types::Result;
use log::debug;

/// An assembled contig together with the HSPs its relatives contributed
#[derive(Debug, Clone)]
pub struct Contig {
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
    pub has_relative: bool,
    pub hsps: HspCollection,
}

impl Contig {
    pub fn new(id: impl Into<String>, description: Option<String>, sequence: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            description,
            sequence,
            has_relative: false,
            hsps: HspCollection::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Add the best-ranked alignment of one relative's search record.
    ///
    /// Lower-ranked alignments are ignored. Every HSP is validated before
    /// any is appended, so a malformed HSP leaves the contig untouched.
    pub fn add_alignment(&mut self, relative: &str, record: &BlastRecord) -> Result<usize> {
        let best = match record.best_alignment() {
            Some(alignment) => alignment,
            None => return Ok(0),
        };

        let hsps = best
            .hsps
            .iter()
            .map(|hsp| Hsp::from_blast(hsp, relative, &best.title, self.sequence.len()))
            .collect::<Result<Vec<_>>>()?;

        if hsps.is_empty() {
            return Ok(0);
        }

        let added = hsps.len();
        for hsp in hsps {
            self.hsps.append(hsp);
        }
        self.has_relative = true;

        debug!(
            "Contig {}: added {} HSPs from relative {} ({})",
            self.id, added, relative, best.title
        );
        Ok(added)
    }
}
