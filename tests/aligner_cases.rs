use hapgen::builder::best_offsets;
use hapgen::{BandedAligner, Overlap, PairwiseAligner};
use test_case::test_case;

// (edit distance, reference start, reference end, query end)
#[test_case(b"ACGTACGTAA", b"GTAC", 2, 2 => (0, 2, 6, 4); "exact match on anchor")]
#[test_case(b"ACGTACGTAA", b"GTTC", 2, 2 => (1, 2, 6, 4); "single mismatch")]
#[test_case(b"ACGTACGTAA", b"GTAAC", 2, 2 => (1, 2, 6, 5); "inserted query base")]
#[test_case(b"ACGTACGTAA", b"GTCG", 2, 2 => (1, 2, 7, 4); "deleted query base")]
#[test_case(b"ACGTACGTAA", b"GTCG", 2, 0 => (2, 2, 6, 4); "zero budget forbids gaps")]
#[test_case(b"ACGTACGT", b"CGTTTT", 5, 2 => (0, 5, 8, 3); "query overhangs reference end")]
fn banded_alignment(reference: &[u8], query: &[u8], anchor: usize, gap_budget: usize) -> (usize, usize, usize, usize) {
    let Overlap {
        edit_distance,
        reference_start,
        reference_end,
        query_end,
        ..
    } = BandedAligner::new()
        .align(reference, query, anchor, gap_budget)
        .expect("alignment exists");
    (edit_distance, reference_start, reference_end, query_end)
}

#[test_case(b"ACGTACGT", b"ACGTACGTACGT" => vec![0]; "read longer than haplotype")]
#[test_case(b"ACGTACGT", b"ACGT" => vec![0, 4]; "periodic haplotype ties")]
#[test_case(b"ACGTACGT", b"TTTTTTTT" => vec![0, 1, 2, 3]; "unrelated read")]
#[test_case(b"AAAA", b"AA" => vec![0, 1, 2]; "overhang counts as mismatch")]
fn hamming_offsets(haplotype: &[u8], read: &[u8]) -> Vec<usize> {
    best_offsets(haplotype, read)
}
