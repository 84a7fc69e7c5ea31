use mailcluster::{Dbscan, Matrix, SessionStore};
use ndarray::{Axis, array, concatenate};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Normal;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn blob(rng: &mut StdRng, n: usize, center: [f64; 2], spread: f64) -> Result<Matrix, Box<dyn std::error::Error>> {
    let noise = Matrix::random_using((n, 2), Normal::new(0.0, spread)?, rng);
    Ok(noise + &array![center[0], center[1]])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("=== Incremental Assignment ===\n");

    let mut rng = StdRng::seed_from_u64(42);
    let x = concatenate![
        Axis(0),
        blob(&mut rng, 40, [2.0, 2.0], 0.3)?,
        blob(&mut rng, 40, [8.0, 8.0], 0.3)?,
        blob(&mut rng, 40, [2.0, 8.0], 0.3)?
    ];

    let store = SessionStore::new();
    let session = store.cluster(&Dbscan::new(0.3, 4), &x)?;
    println!(
        "Clustered {} points: {} clusters, {} noise",
        session.len(),
        session.n_clusters(),
        session.n_noise()
    );

    let incoming = array![[2.1, 1.9], [7.8, 8.2], [2.0, 7.7], [5.0, 5.0], [40.0, -3.0]];
    for row in incoming.outer_iter() {
        if let Some(hit) = store.assign(row) {
            println!("  {:?} -> {}", row.to_vec(), serde_json::to_string(&hit)?);
        }
    }

    // A fresh run replaces the session; snapshots taken earlier stay valid
    let narrow = store.cluster(&Dbscan::new(0.1, 8), &x)?;
    println!(
        "\nAfter re-clustering with eps=0.1: {} clusters, {} noise (old snapshot still has {} clusters)",
        narrow.n_clusters(),
        narrow.n_noise(),
        session.n_clusters()
    );

    Ok(())
}
