//! Selection of the extremal (5'-most and 3'-most) HSPs along the query

use crate::contig::Contig;
use crate::hsp::Hsp;
use crate::types::Strand;
use std::cmp::Ordering;

/// The outermost HSPs of a contig, with the relative of the 5' anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorHsps<'a> {
    pub relative: &'a str,
    pub most_5prime: &'a Hsp,
    pub most_3prime: &'a Hsp,
}

/// Record with the smallest query start and record with the largest query
/// end. Ties go to the higher identity count, then to the earlier record.
pub fn extremal_hsps<'a, I>(hsps: I) -> Option<(&'a Hsp, &'a Hsp)>
where
    I: IntoIterator<Item = &'a Hsp>,
{
    let mut min_start: Option<&'a Hsp> = None;
    let mut max_end: Option<&'a Hsp> = None;

    for hsp in hsps {
        let replace_start = match min_start {
            None => true,
            Some(best) => match hsp.query.start.cmp(&best.query.start) {
                Ordering::Less => true,
                Ordering::Equal => hsp.identities > best.identities,
                Ordering::Greater => false,
            },
        };
        if replace_start {
            min_start = Some(hsp);
        }

        let replace_end = match max_end {
            None => true,
            Some(best) => match hsp.query.end.cmp(&best.query.end) {
                Ordering::Greater => true,
                Ordering::Equal => hsp.identities > best.identities,
                Ordering::Less => false,
            },
        };
        if replace_end {
            max_end = Some(hsp);
        }
    }

    Some((min_start?, max_end?))
}

impl Contig {
    /// Anchor HSPs among the expect-filtered evidence.
    ///
    /// On the reverse strand the contig's 5' end is at high coordinates, so
    /// the record with the largest query end is the 5' anchor.
    pub fn anchors(&self, min_expect: f64) -> Option<AnchorHsps<'_>> {
        if !self.has_relative {
            return None;
        }

        let (min_start, max_end) = extremal_hsps(self.hsps.passing(min_expect))?;

        let (most_5prime, most_3prime) = match self.strand(min_expect) {
            Some(Strand::Reverse) => (max_end, min_start),
            _ => (min_start, max_end),
        };

        Some(AnchorHsps {
            relative: most_5prime.relative.as_str(),
            most_5prime,
            most_3prime,
        })
    }
}
