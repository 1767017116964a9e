use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hapgen::{
    BuilderConfig, Direction, DnaBase, HaplotypeBuilder, ReadIndex, SequenceIndex,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hapgen", about = "Read-coherent haplotype construction")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Grow candidate haplotypes from a seed and print the survivors.
    Build {
        /// Reads file (one sequence per line, `>` header lines ignored).
        reads: PathBuf,
        /// Seed haplotype.
        #[arg(long)]
        seed: String,
        /// Anchor k-mer length.
        #[arg(short, long)]
        k: usize,
        /// Number of extension rounds.
        #[arg(long, default_value_t = hapgen::builder::DEFAULT_MAX_ROUNDS)]
        rounds: usize,
        /// Rounds between cull steps.
        #[arg(long, default_value_t = hapgen::builder::DEFAULT_CULL_INTERVAL)]
        cull_interval: usize,
        /// Largest tolerated gap between read placements.
        #[arg(long, default_value_t = hapgen::builder::DEFAULT_MAX_INCOHERENCY_GAP)]
        max_gap: usize,
        /// Largest accepted placement edit distance.
        #[arg(long, default_value_t = hapgen::builder::DEFAULT_MAX_EDIT_DISTANCE)]
        max_edit: usize,
        /// Supporting reads fetched per orientation.
        #[arg(long, default_value_t = hapgen::builder::DEFAULT_MAX_SUPPORTING_READS)]
        max_reads: usize,
        /// Cull early once more candidates than this exist.
        #[arg(long)]
        max_candidates: Option<usize>,
    },
    /// Print the both-strand k-mer count profile of a sequence.
    ///
    /// Counts are clipped at 9. The summary line reports whether every k-mer
    /// of the sequence occurs in this single read index.
    Profile {
        /// Reads file (one sequence per line, `>` header lines ignored).
        reads: PathBuf,
        /// Sequence to profile.
        #[arg(long)]
        sequence: String,
        /// K-mer length.
        #[arg(short, long)]
        k: usize,
    },
    /// Print extension counts of an anchor in both directions.
    Extensions {
        /// Reads file (one sequence per line, `>` header lines ignored).
        reads: PathBuf,
        /// Anchor k-mer.
        #[arg(long)]
        anchor: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            reads,
            seed,
            k,
            rounds,
            cull_interval,
            max_gap,
            max_edit,
            max_reads,
            max_candidates,
        } => {
            let config = BuilderConfig::new(k)
                .context("invalid anchor length")?
                .with_max_rounds(rounds)
                .with_cull_interval(cull_interval)
                .with_max_incoherency_gap(max_gap)
                .with_max_edit_distance(max_edit)
                .with_max_supporting_reads(max_reads)
                .with_max_candidates(max_candidates);
            run_build(reads, seed, config)?
        }
        Commands::Profile { reads, sequence, k } => run_profile(reads, sequence, k)?,
        Commands::Extensions { reads, anchor } => run_extensions(reads, anchor)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_build(reads_path: PathBuf, seed: String, config: BuilderConfig) -> Result<()> {
    let k = config.anchor_length;
    let index = load_index(&reads_path)?
        .with_seed_length(k)
        .context("invalid seed length")?;

    let seed = seed.trim().to_ascii_uppercase();
    let mut builder = HaplotypeBuilder::configure(config, &index, seed.as_bytes())
        .context("failed to configure haplotype builder")?;
    let haplotypes = builder.run().context("haplotype construction failed")?;

    for (idx, haplotype) in haplotypes.iter().enumerate() {
        println!(">haplotype_{}\n{}", idx + 1, String::from_utf8_lossy(haplotype));
    }

    let report = builder.report();
    eprintln!(
        "rounds={}\tculls={}\tforced_culls={}\tbranches={}\tremoved={}\tfingerprint={}",
        report.rounds,
        report.culls,
        report.forced_culls,
        report.branches,
        report.removed,
        report.fingerprint
    );
    Ok(())
}

fn run_profile(reads_path: PathBuf, sequence: String, k: usize) -> Result<()> {
    anyhow::ensure!(k > 0, "k must be greater than zero");
    let index = load_index(&reads_path)?;
    let sequence = sequence.trim().to_ascii_uppercase();

    let profile = index.kmer_profile(sequence.as_bytes(), k);
    let fully_covered = all_kmers_present(&profile);

    println!("{}", sequence);
    println!("{}", profile_digits(&profile));
    println!(
        "all k-mers present: {}",
        if fully_covered { "yes" } else { "no" }
    );
    Ok(())
}

/// One digit per k-mer count, clipped at 9.
fn profile_digits(profile: &[u32]) -> String {
    profile
        .iter()
        .map(|&count| char::from(b'0' + count.min(9) as u8))
        .collect()
}

/// Whether a non-empty profile has no zero counts.
fn all_kmers_present(profile: &[u32]) -> bool {
    !profile.is_empty() && profile.iter().all(|&count| count > 0)
}

fn run_extensions(reads_path: PathBuf, anchor: String) -> Result<()> {
    let index = load_index(&reads_path)?;
    let anchor = anchor.trim().to_ascii_uppercase();

    for direction in Direction::ROUND_ORDER {
        let counts = index.extension_counts(anchor.as_bytes(), direction);
        let fields: Vec<String> = DnaBase::ALL
            .iter()
            .map(|&base| format!("{}={}", base.to_ascii() as char, counts.get(base)))
            .collect();
        println!("{:?}\t{}", direction, fields.join("\t"));
    }
    Ok(())
}

fn load_index(path: &PathBuf) -> Result<ReadIndex> {
    let reads = read_reads_file(path)
        .with_context(|| format!("failed to read reads from {}", path.display()))?;
    ReadIndex::build(&reads).context("failed to build read index")
}

fn read_reads_file(path: &PathBuf) -> Result<Vec<Vec<u8>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut reads = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('>') {
            continue;
        }
        reads.push(line.to_ascii_uppercase().into_bytes());
    }
    Ok(reads)
}
