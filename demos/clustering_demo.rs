use kclust::{Dataset, Delimiter, KMeans, report};

const DATA: &str = "
1.5 1.8 north
2.0 2.2 north
2.3 1.9 north
1.8 2.5 north
2.1 1.7 north
7.8 8.2 east
8.1 7.9 east
8.3 8.1 east
7,9 8,4 east
8.2 7.7 north
1.9 7.8 west
2.2 8.1 west
1.7 8.3 west
2.4 7.9 east
2.0 8.2 west
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== K-Means with Label Diagnostics ===\n");

    let data = Dataset::parse(DATA, Delimiter::Whitespace)?;
    println!(
        "Dataset: {} samples, {} features, labels {:?}\n",
        data.n_samples(),
        data.n_features(),
        data.classes()
    );

    for &k in &[2, 3, 4] {
        match summarize(&data, k) {
            Ok(result) => println!("{}", result),
            Err(e) => println!("K-Means(k={}) failed: {}", k, e),
        }
    }

    println!("\n=== Detailed Run (k=3) ===\n");
    let mut kmeans = KMeans::new(3).random_state(42);
    kmeans.fit(&data)?;

    for step in &kmeans.history {
        println!("Iteration {}", step.iteration);
        println!("{}\n", report::iteration(step));
    }
    println!("{}", report::entropy(&kmeans.entropy(&data)?));

    println!("\nMajority label per cluster:");
    if let Some(last) = kmeans.history.last() {
        for (cluster, purity) in last.purity.iter().enumerate() {
            if let Some((label, pct)) = purity.dominant() {
                println!("  Cluster {}: {} ({:.2}% of {} points)", cluster + 1, label, pct, purity.size);
            }
        }
    }

    Ok(())
}

fn summarize(data: &Dataset, k: usize) -> kclust::Result<String> {
    let mut kmeans = KMeans::new(k).random_state(7);
    kmeans.fit(data)?;

    let entropy = kmeans.entropy(data)?;
    let mean_entropy = entropy.iter().sum::<f64>() / entropy.len() as f64;

    Ok(format!(
        "K-Means(k={}): {} iterations, sum of distances {:.4}, mean entropy {:.4}",
        k,
        kmeans.n_iter.unwrap_or_default(),
        kmeans.sum_of_distances.unwrap_or_default(),
        mean_entropy
    ))
}
