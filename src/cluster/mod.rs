//! Density-based clustering and incremental assignment.
//!
//! This module provides:
//! - `Dbscan`: standardizes a feature matrix and clusters it into a `ClusteringSession`
//! - `ClusteringSession::assign`: places a new record by its nearest core point
//! - `SessionStore`: swaps sessions atomically for callers that share one
//!
//! # Examples
//!
//! ## Clustering
//! ```rust
//! use mailcluster::{Dbscan, NOISE};
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.2, 1.1],
//!     [1.1, 1.2],
//!     [8.0, 8.0],
//!     [8.1, 8.1],
//!     [8.2, 7.9],
//!     [15.0, 1.0] // Outlier
//! ];
//!
//! let session = Dbscan::new(0.5, 3).fit(&x).unwrap();
//!
//! assert_eq!(session.n_clusters(), 2);
//! assert_eq!(session.labels()[6], NOISE);
//! println!("Summary: {:?}", session.summary().counts);
//! ```
//!
//! ## Assigning a new record
//! ```rust
//! use mailcluster::{Dbscan, NOISE};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0]];
//! let session = Dbscan::new(1.5, 3).fit(&x).unwrap();
//!
//! let near = session.assign(array![0.2, 0.3].view());
//! assert_eq!(near.cluster, 0);
//!
//! let far = session.assign(array![100.0, 100.0].view());
//! assert_eq!(far.cluster, NOISE);
//! ```

mod assign;
mod dbscan;
mod session;
mod store;

pub use assign::{Assignment, assign};
pub use dbscan::{Dbscan, DbscanParams, cluster, core_points};
pub use session::{ClusterSummary, ClusteringSession};
pub use store::SessionStore;
