mod common;

use common::{ScriptedIndex, REFERENCE};
use hapgen::builder::{cull, place_read, score_haplotype, SupportingReads};
use hapgen::{BandedAligner, BuilderConfig, CullSummary, Haplotype, HaplotypeBuilder};

fn params() -> hapgen::CullParams {
    BuilderConfig::new(15).expect("valid config").cull_params()
}

fn run(index: &ScriptedIndex, config: BuilderConfig, seed: &[u8]) -> (Vec<Vec<u8>>, hapgen::RunReport) {
    let mut builder = HaplotypeBuilder::configure(config, index, seed).expect("builder ready");
    let haplotypes = builder.run().expect("run succeeds");
    (haplotypes, builder.report().clone())
}

#[test]
fn default_budget_runs_one_hundred_rounds_and_ten_culls() {
    let index = ScriptedIndex::extending([0, 0, 0, 0]);
    let config = BuilderConfig::new(4).expect("valid config");

    let (haplotypes, report) = run(&index, config, b"ACGTAC");

    assert_eq!(haplotypes, vec![b"ACGTAC".to_vec()]);
    assert_eq!(report.rounds, 100);
    assert_eq!(report.culls, 10);
    assert_eq!(report.forced_culls, 0);
    assert_eq!(report.stalls, 200);
}

#[test]
fn single_supported_base_grows_both_ends_every_round() {
    let index = ScriptedIndex::extending([0, 0, 0, 7]);
    let config = BuilderConfig::new(3).expect("valid config").with_max_rounds(12);

    let (haplotypes, report) = run(&index, config, b"GCA");

    let mut expected = vec![b'T'; 12];
    expected.extend_from_slice(b"GCA");
    expected.extend(std::iter::repeat(b'T').take(12));
    assert_eq!(haplotypes, vec![expected]);
    assert_eq!(report.culls, 1);
    assert_eq!(report.branches, 0);
}

#[test]
fn fan_out_follows_alphabet_and_parent_order() {
    let index = ScriptedIndex::extending([1, 1, 0, 0]);
    let config = BuilderConfig::new(2).expect("valid config").with_max_rounds(1);

    let (haplotypes, report) = run(&index, config, b"GG");

    assert_eq!(
        haplotypes,
        vec![
            b"AGGA".to_vec(),
            b"AGGC".to_vec(),
            b"CGGA".to_vec(),
            b"CGGC".to_vec(),
        ]
    );
    assert_eq!(report.branches, 3);
    assert_eq!(report.culls, 0);
}

#[test]
fn candidate_cap_triggers_extra_culls_without_shifting_cadence() {
    let index = ScriptedIndex::extending([1, 1, 1, 1]);
    let config = BuilderConfig::new(2)
        .expect("valid config")
        .with_max_rounds(1)
        .with_max_candidates(Some(3));

    let (haplotypes, report) = run(&index, config, b"AC");

    // Nothing is incoherent without reads, so the cap only forces scoring.
    assert_eq!(haplotypes.len(), 16);
    assert_eq!(report.forced_culls, 2);
    assert_eq!(report.culls, 0);
    assert_eq!(report.removed, 0);
}

#[test]
fn wide_placement_gap_removes_candidate() {
    let haplotype = &REFERENCE[..80];
    let index = ScriptedIndex::serving(vec![REFERENCE[..20].to_vec(), REFERENCE[50..70].to_vec()]);
    let mut haplotypes = vec![Haplotype::new(haplotype)];

    let summary = cull(&mut haplotypes, &index, &BandedAligner, &params());

    assert_eq!(summary, CullSummary { examined: 1, removed: 1, supporting_reads: 2 });
    assert!(haplotypes.is_empty());
}

#[test]
fn gap_equal_to_threshold_is_tolerated() {
    let haplotype = &REFERENCE[..80];
    let reads = SupportingReads::from_reads(vec![
        REFERENCE[..20].to_vec(),
        REFERENCE[15..35].to_vec(),
        REFERENCE[30..50].to_vec(),
        REFERENCE[50..70].to_vec(),
    ]);

    assert_eq!(score_haplotype(haplotype, &reads, &BandedAligner, &params()), 20);
}

#[test]
fn cull_is_idempotent_and_keeps_survivor_order() {
    let index = ScriptedIndex::serving(vec![REFERENCE[..20].to_vec(), REFERENCE[50..70].to_vec()]);
    let mut haplotypes = vec![
        Haplotype::new(&REFERENCE[..30]),
        Haplotype::new(&REFERENCE[..80]),
        Haplotype::new(b"TTTTTTTTTTTTTTTTTTTT"),
    ];

    let first = cull(&mut haplotypes, &index, &BandedAligner, &params());
    let survivors: Vec<Vec<u8>> = haplotypes.iter().map(Haplotype::to_vec).collect();
    let second = cull(&mut haplotypes, &index, &BandedAligner, &params());

    assert_eq!(first.removed, 1);
    assert_eq!(second.removed, 0);
    assert_eq!(
        survivors,
        vec![REFERENCE[..30].to_vec(), b"TTTTTTTTTTTTTTTTTTTT".to_vec()]
    );
    assert_eq!(haplotypes.len(), 2);
}

#[test]
fn placement_accepts_edit_distance_up_to_budget_only() {
    let haplotype = &REFERENCE[..80];
    let mut one_substitution = REFERENCE[20..50].to_vec();
    one_substitution[10] = b'A';
    let mut two_substitutions = one_substitution.clone();
    two_substitutions[20] = b'A';

    let accepted = place_read(haplotype, &one_substitution, &BandedAligner, &params());
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].edit_distance, 1);
    assert_eq!(accepted[0].reference_start, 20);

    assert!(place_read(haplotype, &two_substitutions, &BandedAligner, &params()).is_empty());

    let relaxed = BuilderConfig::new(15)
        .expect("valid config")
        .with_max_edit_distance(2)
        .cull_params();
    assert_eq!(place_read(haplotype, &two_substitutions, &BandedAligner, &relaxed).len(), 1);
}
