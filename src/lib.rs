//! Density-based clustering of email feature vectors.
//!
//! The crate takes numeric feature matrices (one row per record, produced by an
//! external feature builder), standardizes them, clusters them with DBSCAN and
//! later places unseen records into an existing clustering by nearest core point.
//!
//! ```rust
//! use mailcluster::{Dbscan, NOISE};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0]];
//!
//! let session = Dbscan::new(1.5, 3).fit(&x).unwrap();
//! assert_eq!(session.labels(), &[0, 0, 0, NOISE]);
//!
//! let hit = session.assign(array![0.0, 0.0].view());
//! assert_eq!(hit.cluster, 0);
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod cluster;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod preprocessing;

pub use cluster::{Assignment, ClusterSummary, ClusteringSession, Dbscan, DbscanParams, SessionStore};
pub use dataset::FeatureSchema;
pub use error::{Error, Result};
pub use preprocessing::StandardScaler;

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;

/// Cluster label. `NOISE` or a cluster id in discovery order starting at 0.
pub type Label = i32;

/// Label carried by points that no core point reaches.
pub const NOISE: Label = -1;
