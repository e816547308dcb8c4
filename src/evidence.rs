//! Evidence aggregation over a contig's expect-filtered HSPs: strand
//! consensus, identity-weighted frame votes and frameshift detection.
//!
//! The free functions are pure over any HSP iterator. The `Contig` methods
//! apply the expect filter first and return `None` when no relative
//! evidence is available.

use crate::contig::Contig;
use crate::hsp::Hsp;
use crate::types::{Frame, Strand};
use std::collections::HashMap;

/// Identity-weighted frame votes, kept in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameTally {
    votes: Vec<(Frame, u64)>,
}

impl FrameTally {
    pub fn from_hsps<'a, I>(hsps: I) -> Self
    where
        I: IntoIterator<Item = &'a Hsp>,
    {
        let mut tally = FrameTally::default();
        for hsp in hsps {
            tally.add(hsp.frame, hsp.identities as u64);
        }
        tally
    }

    fn add(&mut self, frame: Frame, identities: u64) {
        match self.votes.iter_mut().find(|(f, _)| *f == frame) {
            Some((_, total)) => *total += identities,
            None => self.votes.push((frame, identities)),
        }
    }

    pub fn get(&self, frame: Frame) -> u64 {
        self.votes
            .iter()
            .find(|(f, _)| *f == frame)
            .map(|(_, total)| *total)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Frame with the most identities; the first-seen frame wins ties
    pub fn majority(&self) -> Option<Frame> {
        let mut best: Option<(Frame, u64)> = None;
        for &(frame, total) in &self.votes {
            match best {
                Some((_, best_total)) if total <= best_total => {}
                _ => best = Some((frame, total)),
            }
        }
        best.map(|(frame, _)| frame)
    }
}

/// Group HSPs by relative, keeping relatives in first-seen order
pub fn group_by_relative<'a, I>(hsps: I) -> Vec<(&'a str, Vec<&'a Hsp>)>
where
    I: IntoIterator<Item = &'a Hsp>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, Vec<&'a Hsp>)> = Vec::new();
    for hsp in hsps {
        let slot = *index.entry(hsp.relative.as_str()).or_insert_with(|| {
            groups.push((hsp.relative.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(hsp);
    }
    groups
}

/// Counts of relatives hitting the contig on both strands vs. one strand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrandSplit {
    pub split: usize,
    pub unsplit: usize,
}

impl StrandSplit {
    /// Split relatives strictly outnumber consistent ones
    pub fn is_inconsistent(&self) -> bool {
        self.split > self.unsplit
    }
}

pub fn strand_split<'a, I>(hsps: I) -> StrandSplit
where
    I: IntoIterator<Item = &'a Hsp>,
{
    let mut counts = StrandSplit::default();
    for (_, group) in group_by_relative(hsps) {
        let first = group[0].frame.sign();
        if group.iter().any(|hsp| hsp.frame.sign() != first) {
            counts.split += 1;
        } else {
            counts.unsplit += 1;
        }
    }
    counts
}

/// Identities backing relatives with and without an internal frameshift
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameshiftSupport {
    pub shifted: u64,
    pub unshifted: u64,
}

impl FrameshiftSupport {
    pub fn is_majority(&self) -> bool {
        self.shifted >= self.unshifted
    }
}

pub fn frameshift_support<'a, I>(hsps: I) -> FrameshiftSupport
where
    I: IntoIterator<Item = &'a Hsp>,
{
    let mut support = FrameshiftSupport::default();
    for (_, group) in group_by_relative(hsps) {
        let first = group[0].frame;
        let identities: u64 = group.iter().map(|hsp| hsp.identities as u64).sum();
        if group.iter().any(|hsp| hsp.frame != first) {
            support.shifted += identities;
        } else {
            support.unshifted += identities;
        }
    }
    support
}

/// The strand every HSP agrees on, if they do
pub fn shared_strand<'a, I>(hsps: I) -> Option<Strand>
where
    I: IntoIterator<Item = &'a Hsp>,
{
    let mut strands = hsps.into_iter().map(|hsp| hsp.strand());
    let first = strands.next()?;
    strands.all(|strand| strand == first).then_some(first)
}

impl Contig {
    /// Expect-filtered HSPs, or `None` when there is no relative evidence
    fn evidence(&self, min_expect: f64) -> Option<impl Iterator<Item = &Hsp> + Clone> {
        if !self.has_relative {
            return None;
        }
        let hsps = self.hsps.passing(min_expect);
        hsps.clone().next()?;
        Some(hsps)
    }

    /// Consensus strand of the filtered evidence.
    ///
    /// `None` without evidence, when split relatives dominate, or when the
    /// filtered HSPs use both strands.
    pub fn strand(&self, min_expect: f64) -> Option<Strand> {
        let hsps = self.evidence(min_expect)?;
        if strand_split(hsps.clone()).is_inconsistent() {
            return None;
        }
        shared_strand(hsps)
    }

    /// Identity-weighted frame votes; empty without evidence
    pub fn frame_tally(&self, min_expect: f64) -> FrameTally {
        match self.evidence(min_expect) {
            Some(hsps) => FrameTally::from_hsps(hsps),
            None => FrameTally::default(),
        }
    }

    pub fn majority_frame(&self, min_expect: f64) -> Option<Frame> {
        self.frame_tally(min_expect).majority()
    }

    pub fn any_frameshift(&self, min_expect: f64) -> Option<bool> {
        let tally = self.frame_tally(min_expect);
        if tally.is_empty() {
            return None;
        }
        Some(tally.len() > 1)
    }

    /// Whether relatives hitting both strands are the majority
    pub fn inconsistent_strand(&self, min_expect: f64) -> Option<bool> {
        let hsps = self.evidence(min_expect)?;
        Some(strand_split(hsps).is_inconsistent())
    }

    /// Whether frameshifted relatives carry at least as many identities as
    /// relatives with a single frame
    pub fn majority_frameshift(&self, min_expect: f64) -> Option<bool> {
        let hsps = self.evidence(min_expect)?;
        Some(frameshift_support(hsps).is_majority())
    }
}
