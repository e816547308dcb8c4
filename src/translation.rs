//! Genetic code lookups and in-frame codon scanning

use std::collections::HashMap;

/// Start/stop classification of a single codon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodonClass {
    Start,
    Stop,
    Other,
}

/// Standard genetic code table (NCBI table 1)
pub struct GeneticCode {
    codon_table: HashMap<[u8; 3], u8>,
    start_codons: Vec<[u8; 3]>,
    stop_codons: Vec<[u8; 3]>,
}

impl GeneticCode {
    /// Create the standard genetic code (NCBI table 1)
    pub fn standard() -> Self {
        const BASES: [u8; 4] = [b'T', b'C', b'A', b'G'];
        // Amino acids in TCAG order of first, second, third base
        const AMINO_ACIDS: &[u8; 64] =
            b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

        let mut codon_table = HashMap::with_capacity(64);
        let mut i = 0;
        for first in BASES {
            for second in BASES {
                for third in BASES {
                    codon_table.insert([first, second, third], AMINO_ACIDS[i]);
                    i += 1;
                }
            }
        }

        Self {
            codon_table,
            start_codons: vec![*b"ATG"],
            stop_codons: vec![*b"TAA", *b"TAG", *b"TGA"],
        }
    }

    fn normalise(codon: &[u8]) -> Option<[u8; 3]> {
        match codon {
            [a, b, c] => Some([
                normalise_base(*a),
                normalise_base(*b),
                normalise_base(*c),
            ]),
            _ => None,
        }
    }

    /// Translate a codon to amino acid; ambiguous codons give `None`
    pub fn translate_codon(&self, codon: &[u8]) -> Option<u8> {
        Self::normalise(codon).and_then(|c| self.codon_table.get(&c).copied())
    }

    pub fn is_start_codon(&self, codon: &[u8]) -> bool {
        Self::normalise(codon).map_or(false, |c| self.start_codons.contains(&c))
    }

    pub fn is_stop_codon(&self, codon: &[u8]) -> bool {
        Self::normalise(codon).map_or(false, |c| self.stop_codons.contains(&c))
    }

    pub fn classify(&self, codon: &[u8]) -> CodonClass {
        if self.is_start_codon(codon) {
            CodonClass::Start
        } else if self.is_stop_codon(codon) {
            CodonClass::Stop
        } else {
            CodonClass::Other
        }
    }

    /// Classify the codon starting at `pos`; `Other` if it runs off the end
    pub fn classify_at(&self, sequence: &[u8], pos: usize) -> CodonClass {
        match sequence.get(pos..pos + 3) {
            Some(codon) => self.classify(codon),
            None => CodonClass::Other,
        }
    }

    /// Translate every complete codon of `sequence`; unknown codons become 'X'
    pub fn translate(&self, sequence: &[u8]) -> String {
        sequence
            .chunks_exact(3)
            .map(|codon| self.translate_codon(codon).unwrap_or(b'X') as char)
            .collect()
    }

    /// Positions of in-frame stop codons in `[start, end)` other than a stop
    /// occupying the final codon
    pub fn internal_stops(&self, sequence: &[u8], start: usize, end: usize) -> Vec<usize> {
        let mut stops = Vec::new();
        let mut pos = start;
        while pos + 3 < end {
            if self.classify_at(sequence, pos) == CodonClass::Stop {
                stops.push(pos);
            }
            pos += 3;
        }
        stops
    }
}

fn normalise_base(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'U' => b'T',
        other => other,
    }
}

/// Largest position `<= pos` in phase with `offset`, if any
pub fn align_to_frame(pos: usize, offset: usize) -> Option<usize> {
    if pos < offset {
        return None;
    }
    Some(pos - (pos - offset) % 3)
}

/// Reverse complement a DNA sequence
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&base| match base.to_ascii_uppercase() {
            b'A' => b'T',
            b'T' | b'U' => b'A',
            b'G' => b'C',
            b'C' => b'G',
            b'N' => b'N',
            _ => base,
        })
        .collect()
}
