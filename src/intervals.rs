//! Arrival-ordered collection of HSPs on one contig's query axis

use crate::hsp::Hsp;

#[derive(Debug, Clone, Default)]
pub struct HspCollection {
    hsps: Vec<Hsp>,
}

impl HspCollection {
    pub fn new() -> Self {
        Self { hsps: Vec::new() }
    }

    pub fn append(&mut self, hsp: Hsp) {
        self.hsps.push(hsp);
    }

    pub fn len(&self) -> usize {
        self.hsps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hsps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hsp> {
        self.hsps.iter()
    }

    /// Lazy view over the records matching `predicate`. Clone the iterator
    /// to walk the same view more than once.
    pub fn filter<P>(&self, predicate: P) -> impl Iterator<Item = &Hsp> + Clone
    where
        P: Fn(&Hsp) -> bool + Clone,
    {
        self.hsps.iter().filter(move |hsp| predicate(*hsp))
    }

    /// Records whose expect value passes `min_expect`
    pub fn passing(&self, min_expect: f64) -> impl Iterator<Item = &Hsp> + Clone {
        self.filter(move |hsp: &Hsp| hsp.expect <= min_expect)
    }

    pub fn forward_transform(&self, hsp: &Hsp) -> Hsp {
        hsp.forward_transform()
    }
}

impl<'a> IntoIterator for &'a HspCollection {
    type Item = &'a Hsp;
    type IntoIter = std::slice::Iter<'a, Hsp>;

    fn into_iter(self) -> Self::IntoIter {
        self.hsps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsp::{QueryInterval, SubjectInterval};
    use crate::types::{Frame, Strand};

    fn hsp(start: usize, end: usize, expect: f64) -> Hsp {
        Hsp {
            query: QueryInterval::new(start, end, Strand::Forward, 500).unwrap(),
            subject: SubjectInterval { start: 1, end: 50 },
            frame: Frame::new(1).unwrap(),
            expect,
            identities: 40,
            align_length: 50,
            relative: "rel".to_string(),
            title: "protein".to_string(),
        }
    }

    #[test]
    fn test_append_keeps_arrival_order() {
        let mut collection = HspCollection::new();
        collection.append(hsp(200, 300, 1e-5));
        collection.append(hsp(0, 100, 1e-5));
        let starts: Vec<usize> = collection.iter().map(|h| h.query.start).collect();
        assert_eq!(starts, vec![200, 0]);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_filter_is_restartable() {
        let mut collection = HspCollection::new();
        collection.append(hsp(0, 100, 1e-30));
        collection.append(hsp(100, 200, 50.0));
        collection.append(hsp(200, 300, 10.0));

        let view = collection.passing(10.0);
        assert_eq!(view.clone().count(), 2);
        assert_eq!(view.count(), 2);
        assert_eq!(collection.passing(1e-3).count(), 1);
    }

    #[test]
    fn test_forward_transform_leaves_fields_intact() {
        let mut record = hsp(10, 40, 1e-5);
        record.query = QueryInterval::new(10, 40, Strand::Reverse, 500).unwrap();
        record.frame = Frame::new(-3).unwrap();

        let collection = HspCollection::new();
        let forward = collection.forward_transform(&record);
        assert_eq!((forward.query.start, forward.query.end), (460, 490));
        assert_eq!(forward.query.strand, Strand::Forward);
        assert_eq!(forward.frame, record.frame);
        assert_eq!(forward.subject, record.subject);
        assert_eq!(forward.identities, record.identities);
    }
}
