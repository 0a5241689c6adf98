//! K-means Binary
//!
//! Loads a labeled dataset and clusters it once per requested k, printing
//! sum of distances and purity per iteration and entropy per cluster.
//!
//! Without `-k` it prompts for k until `-1` is entered.

use clap::Parser;
use dialoguer::Input;
use kclust::{Dataset, Delimiter, KMeans, report};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Cluster a labeled dataset with k-means", long_about = None)]
struct Args {
    /// Dataset file: numeric fields followed by one label per line
    #[arg(required = true)]
    path: PathBuf,
    /// Field separator: comma or whitespace
    #[arg(short, long, default_value = "comma")]
    delimiter: Delimiter,
    /// Seed for centroid initialization; drawn at random when omitted
    #[arg(short, long)]
    seed: Option<u64>,
    /// Iteration cap per run
    #[arg(long, default_value_t = 300)]
    max_iter: usize,
    /// Cluster counts to run in order, skipping the prompt
    #[arg(short)]
    k: Vec<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let data = Dataset::from_path(&args.path, args.delimiter).inspect_err(|e| {
        log::error!("failed to load {}: {}", args.path.display(), e);
    })?;

    if args.k.is_empty() {
        while let Some(k) = prompt(data.n_samples())? {
            cluster(&data, k, &args);
        }
    } else {
        for &k in &args.k {
            cluster(&data, k, &args);
        }
    }

    Ok(())
}

fn cluster(data: &Dataset, k: usize, args: &Args) {
    if let Err(e) = run(data, k, args) {
        log::error!("k={}: {}", k, e);
    }
}

fn run(data: &Dataset, k: usize, args: &Args) -> kclust::Result<()> {
    let mut kmeans = KMeans::new(k).max_iter(args.max_iter);
    if let Some(seed) = args.seed {
        kmeans = kmeans.random_state(seed);
    }
    kmeans.fit(data)?;

    for step in &kmeans.history {
        println!("{}\n", report::iteration(step));
    }
    println!("{}", report::entropy(&kmeans.entropy(data)?));

    if kmeans.converged == Some(false) {
        println!(
            "Stopped after {} iterations without converging",
            kmeans.n_iter.unwrap_or_default()
        );
    }
    println!();

    Ok(())
}

/// Ask for k until a value in `1..n_samples` or `-1` is entered. `-1` yields `None`.
fn prompt(n_samples: usize) -> Result<Option<usize>, dialoguer::Error> {
    let max = n_samples.saturating_sub(1);
    let k = Input::<i64>::new()
        .with_prompt(format!("Enter k (1..={}) or -1 to quit", max))
        .validate_with(move |k: &i64| -> Result<(), String> {
            match usize::try_from(*k) {
                _ if *k == -1 => Ok(()),
                Ok(k) if k > 0 && k < n_samples => Ok(()),
                _ => Err(format!("k must be between 1 and {}", max)),
            }
        })
        .interact_text()?;

    Ok(usize::try_from(k).ok())
}
