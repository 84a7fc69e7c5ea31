use mailcluster::{ClusteringSession, Dbscan, DbscanParams, FeatureSchema, Label, NOISE};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("=== DBSCAN over email features ===\n");

    let schema = FeatureSchema::new(["links", "attachments", "exclamations", "subject_len"]);

    // Three kinds of mail plus a few odd ones
    let records = vec![
        // Newsletters: many links, long subjects
        vec![("links", 24.0), ("subject_len", 61.0), ("exclamations", 1.0)],
        vec![("links", 21.0), ("subject_len", 58.0), ("exclamations", 2.0)],
        vec![("links", 26.0), ("subject_len", 64.0), ("exclamations", 1.0)],
        vec![("links", 23.0), ("subject_len", 60.0)],
        // Personal mail: few links, short subjects
        vec![("links", 0.0), ("subject_len", 12.0)],
        vec![("links", 1.0), ("subject_len", 9.0)],
        vec![("subject_len", 14.0), ("attachments", 1.0)],
        vec![("links", 1.0), ("subject_len", 11.0)],
        // Invoices: attachments, medium subjects
        vec![("attachments", 2.0), ("subject_len", 30.0), ("links", 2.0)],
        vec![("attachments", 2.0), ("subject_len", 33.0), ("links", 1.0)],
        vec![("attachments", 3.0), ("subject_len", 31.0), ("links", 2.0)],
        vec![("attachments", 2.0), ("subject_len", 29.0), ("links", 2.0)],
        // Odd ones
        vec![("exclamations", 14.0), ("links", 9.0), ("subject_len", 90.0)],
        vec![("attachments", 9.0), ("subject_len", 2.0)],
    ];

    let x = schema.matrix(&records);
    println!("Dataset: {} records, {} features ({:?})\n", x.nrows(), x.ncols(), schema.names());

    let configs = [
        (r#"{"eps": 0.5, "min_pts": 3}"#, "Tight clusters"),
        (r#"{"eps": 1.0, "min_pts": 3}"#, "Medium density"),
        (r#"{"eps": 2.0}"#, "Defaults for min_pts"),
        (r#"{"eps": 1.0, "min_pts": 0}"#, "Rejected parameters"),
    ];

    for (doc, description) in configs {
        match DbscanParams::from_json(doc).and_then(|params| Dbscan::from_params(params).fit(&x)) {
            Ok(session) => println!(
                "{doc}: {description} - {} clusters, {} noise, {} core points",
                session.n_clusters(),
                session.n_noise(),
                session.core_points().len()
            ),
            Err(e) => println!("{doc}: {description} - failed: {e}"),
        }
    }

    println!("\n=== Detailed Analysis ===");

    let session = Dbscan::new(1.0, 3).fit(&x)?;
    print_cluster_summary(&session);

    println!("\nSummary as JSON: {}", serde_json::to_string(session.summary())?);

    Ok(())
}

fn print_cluster_summary(session: &ClusteringSession) {
    println!("  Cluster assignments:");
    for (&label, &count) in &session.summary().counts {
        let members = session.cluster_members(label);
        if label == NOISE {
            println!("    Noise: {count} records {members:?}");
        } else {
            let core = members.iter().filter(|&&i| session.is_core(i)).count();
            println!("    Cluster {label}: {count} records ({core} core) {members:?}");
        }
    }

    let conflicts = session.noise_core_conflicts();
    if !conflicts.is_empty() {
        let labels: Vec<Label> = conflicts.iter().map(|&i| session.labels()[i]).collect();
        println!("  Warning: core points labeled noise: {conflicts:?} {labels:?}");
    }
}
