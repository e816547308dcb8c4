use contigorf::translation::reverse_complement;
use contigorf::{
    add_relative_hits, parse_fasta_file, parse_hits_file, BoundaryPolicy, Gff3Writer,
    NoPredictionReason, OrfPredictor, Prediction, PredictionConfig, ProteinWriter, StartBoundary,
    Strand, SummaryWriter,
};
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// `CCC` filler with codons written at the given positions
fn sequence(length: usize, codons: &[(usize, &[u8; 3])]) -> Vec<u8> {
    let mut seq = b"CCC".repeat(length / 3 + 1);
    seq.truncate(length);
    for (pos, codon) in codons {
        seq[*pos..*pos + 3].copy_from_slice(*codon);
    }
    seq
}

fn write_inputs() -> (NamedTempFile, NamedTempFile, NamedTempFile) {
    let forward = sequence(300, &[(30, b"ATG"), (270, b"TAA")]);
    let reverse = reverse_complement(&sequence(300, &[(30, b"ATG"), (270, b"TAG")]));

    let mut fasta = NamedTempFile::new().unwrap();
    writeln!(fasta, ">contig1 forward gene").unwrap();
    writeln!(fasta, "{}", String::from_utf8(forward).unwrap()).unwrap();
    writeln!(fasta, ">contig2 no hits").unwrap();
    writeln!(fasta, "{}", String::from_utf8(sequence(120, &[])).unwrap()).unwrap();
    writeln!(fasta, ">contig3 reverse gene").unwrap();
    writeln!(fasta, "{}", String::from_utf8(reverse).unwrap()).unwrap();

    let mut athaliana = NamedTempFile::new().unwrap();
    writeln!(athaliana, "# BLASTX 2.14.0+").unwrap();
    writeln!(athaliana, "contig1\tAT1G01010\t61\t150\t11\t40\t1\t0\t1e-20\t28\t30\tkinase").unwrap();
    writeln!(athaliana, "contig1\tAT1G01010\t151\t240\t41\t70\t1\t0\t1e-18\t20\t30\tkinase").unwrap();
    writeln!(athaliana, "contig1\tAT5G00001\t61\t240\t11\t70\t1\t0\t1e-5\t10\t60\tother").unwrap();
    writeln!(athaliana, "contig3\tAT2G02020\t240\t61\t11\t70\t-1\t0\t1e-30\t50\t60\tligase").unwrap();

    let mut osativa = NamedTempFile::new().unwrap();
    writeln!(osativa, "contig9\tOs01g0100\t1\t90\t1\t30\t1\t0\t1e-10\t25\t30").unwrap();

    (fasta, athaliana, osativa)
}

#[test]
fn test_pipeline_predicts_both_strands() {
    let (fasta, athaliana, osativa) = write_inputs();

    let mut contigs = parse_fasta_file(fasta.path()).unwrap();
    assert_eq!(contigs.len(), 3);

    let hits = parse_hits_file(athaliana.path(), "athaliana").unwrap();
    let stats = add_relative_hits(&mut contigs, &hits);
    assert_eq!(stats.contigs_with_hits, 2);
    // only the best-ranked subject of contig1 is kept
    assert_eq!(stats.hsps_added, 3);

    let hits = parse_hits_file(osativa.path(), "osativa").unwrap();
    let stats = add_relative_hits(&mut contigs, &hits);
    assert_eq!(stats.unknown_contigs, 1);

    let predictor = OrfPredictor::new(PredictionConfig::default());
    let (predictions, summary) = predictor.predict_all(contigs.contigs());
    assert_eq!(summary.contigs_processed, 3);
    assert_eq!(summary.predicted, 2);
    assert_eq!(summary.no_relative, 1);
    assert_eq!(summary.failed, 0);

    let ids: Vec<&str> = predictions.iter().map(|p| p.contig_id.as_str()).collect();
    assert_eq!(ids, vec!["contig1", "contig2", "contig3"]);

    let first = predictions[0].outcome.as_ref().unwrap().orf().unwrap();
    assert_eq!(first.relative, "athaliana");
    assert_eq!((first.orf.start, first.orf.end), (30, 273));
    assert_eq!(first.start_boundary, StartBoundary::StartCodon);

    assert!(matches!(
        predictions[1].outcome,
        Ok(Prediction::NoPrediction(NoPredictionReason::NoRelative))
    ));

    let third = predictions[2].outcome.as_ref().unwrap().orf().unwrap();
    assert_eq!(third.strand, Strand::Reverse);
    assert_eq!((third.orf.start, third.orf.end), (27, 270));
    assert!(third.protein.starts_with('M'));
}

#[test]
fn test_pipeline_writes_outputs() {
    let (fasta, athaliana, _) = write_inputs();
    let mut contigs = parse_fasta_file(fasta.path()).unwrap();
    add_relative_hits(
        &mut contigs,
        &parse_hits_file(athaliana.path(), "athaliana").unwrap(),
    );

    let predictor = OrfPredictor::new(PredictionConfig {
        policy: BoundaryPolicy::CanonicalStart,
        ..PredictionConfig::default()
    });
    let (predictions, _) = predictor.predict_all(contigs.contigs());

    let dir = tempdir().unwrap();
    let gff3_path = dir.path().join("orfs.gff3");
    let protein_path = dir.path().join("orfs.faa");
    let summary_path = dir.path().join("summary.tsv");

    let written = Gff3Writer::create(&gff3_path)
        .unwrap()
        .write_predictions(&predictions)
        .unwrap();
    assert_eq!(written, 2);
    ProteinWriter::create(&protein_path)
        .unwrap()
        .write_predictions(&predictions)
        .unwrap();
    SummaryWriter::create(&summary_path)
        .unwrap()
        .write_predictions(&predictions)
        .unwrap();

    let gff3 = fs::read_to_string(&gff3_path).unwrap();
    let features: Vec<&str> = gff3.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(features.len(), 2);
    assert!(features[0].starts_with("contig1\tcontigorf\tCDS\t31\t273\t.\t+\t0\t"));
    assert!(features[0].contains("policy=canonical"));
    assert!(features[1].starts_with("contig3\tcontigorf\tCDS\t28\t270\t.\t-\t0\t"));

    let proteins = fs::read_to_string(&protein_path).unwrap();
    assert_eq!(proteins.matches('>').count(), 2);
    assert!(!proteins.contains('*'));

    let summary = fs::read_to_string(&summary_path).unwrap();
    assert_eq!(summary.lines().count(), 4);
    assert!(summary.contains("contig2\tno_prediction\tno_relative"));
}
