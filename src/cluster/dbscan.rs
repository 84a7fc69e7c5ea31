use super::session::{ClusterSummary, ClusteringSession};
use crate::dataset::sanitize;
use crate::error::{Error, Result};
use crate::metrics::euclidean_distance;
use crate::preprocessing::StandardScaler;
use crate::{Label, Matrix, NOISE};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::VecDeque;
use tracing::{debug, info};

// Label slot before a point is visited.
const UNCLASSIFIED: Label = -2;

/// DBSCAN parameters.
///
/// Deserializes from partial documents; missing fields take the defaults
/// (`eps = 2.0`, `min_pts = 4`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbscanParams {
    /// Neighborhood radius in scaled feature space.
    pub eps: f64,
    /// Neighborhood size, counting the point itself, that makes a core point.
    pub min_pts: usize,
}

impl Default for DbscanParams {
    fn default() -> Self {
        Self { eps: 2.0, min_pts: 4 }
    }
}

/// `eps` must be finite and non-negative.
pub(crate) fn validate_eps(eps: f64) -> Result<()> {
    if !eps.is_finite() || eps < 0.0 {
        return Err(Error::InvalidParameter {
            name: "eps",
            message: format!("must be finite and >= 0, got {eps}"),
        });
    }
    Ok(())
}

impl DbscanParams {
    pub fn validate(&self) -> Result<()> {
        validate_eps(self.eps)?;
        if self.min_pts == 0 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON parameter document such as `{"eps": 1.5}`.
    pub fn from_json(doc: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(doc)?;
        params.validate()?;
        Ok(params)
    }

    #[inline]
    fn is_dense(&self, n_neighbors: usize) -> bool {
        // The point itself counts toward min_pts
        n_neighbors + 1 >= self.min_pts
    }
}

/// Indices of every other point within `eps` of `point_idx`, ascending.
fn region_query(data: &ArrayView2<f64>, point_idx: usize, eps: f64) -> Vec<usize> {
    let point = data.row(point_idx);
    data.outer_iter()
        .enumerate()
        .filter(|(i, other)| *i != point_idx && euclidean_distance(&point, other) <= eps)
        .map(|(i, _)| i)
        .collect()
}

/// Neighborhood lookups over one immutable scaled matrix.
///
/// With the `parallel` feature every neighborhood is computed up front across
/// threads; otherwise each query scans the matrix on demand.
struct RegionIndex<'a> {
    data: ArrayView2<'a, f64>,
    eps: f64,
    table: Option<Vec<Vec<usize>>>,
}

impl<'a> RegionIndex<'a> {
    fn new(data: ArrayView2<'a, f64>, eps: f64) -> Self {
        let table = Self::precompute(&data, eps);
        Self { data, eps, table }
    }

    #[cfg(feature = "parallel")]
    fn precompute(data: &ArrayView2<'a, f64>, eps: f64) -> Option<Vec<Vec<usize>>> {
        use rayon::prelude::*;

        Some(
            (0..data.nrows())
                .into_par_iter()
                .map(|i| region_query(data, i, eps))
                .collect(),
        )
    }

    #[cfg(not(feature = "parallel"))]
    fn precompute(_data: &ArrayView2<'a, f64>, _eps: f64) -> Option<Vec<Vec<usize>>> {
        None
    }

    fn neighbors(&self, point_idx: usize) -> Cow<'_, [usize]> {
        match &self.table {
            Some(table) => Cow::Borrowed(&table[point_idx]),
            None => Cow::Owned(region_query(&self.data, point_idx, self.eps)),
        }
    }
}

/// Mutable state of one labeling pass.
struct Walk {
    labels: Vec<Label>,
    visited: Vec<bool>,
    is_core: Vec<bool>,
    // Membership of the current expansion queue
    queued: Vec<bool>,
}

impl Walk {
    fn new(n: usize) -> Self {
        Self {
            labels: vec![UNCLASSIFIED; n],
            visited: vec![false; n],
            is_core: vec![false; n],
            queued: vec![false; n],
        }
    }

    fn enqueue(&mut self, queue: &mut VecDeque<usize>, idx: usize) {
        if !self.queued[idx] {
            self.queued[idx] = true;
            queue.push_back(idx);
        }
    }
}

/// DBSCAN over standardized features.
///
/// Points are visited in index order and cluster ids are handed out in the
/// order their seed is expanded, so numbering is reproducible for a given
/// row order.
#[derive(Clone, Debug, Default)]
pub struct Dbscan {
    params: DbscanParams,
}

impl Dbscan {
    pub fn new(eps: f64, min_pts: usize) -> Self {
        Self {
            params: DbscanParams { eps, min_pts },
        }
    }

    pub fn from_params(params: DbscanParams) -> Self {
        Self { params }
    }

    pub fn eps(mut self, eps: f64) -> Self {
        self.params.eps = eps;
        self
    }

    pub fn min_pts(mut self, min_pts: usize) -> Self {
        self.params.min_pts = min_pts;
        self
    }

    pub fn params(&self) -> &DbscanParams {
        &self.params
    }

    /// Standardize `x`, cluster it and return the resulting session.
    ///
    /// Fails only on invalid parameters. An empty matrix gives an empty
    /// session with no scaler.
    pub fn fit(&self, x: &Matrix) -> Result<ClusteringSession> {
        self.params.validate()?;
        let DbscanParams { eps, min_pts } = self.params;

        if x.nrows() == 0 {
            debug!("empty input, returning empty session");
            return Ok(ClusteringSession::empty(eps, min_pts));
        }

        debug!(rows = x.nrows(), cols = x.ncols(), eps, min_pts, "clustering");

        let raw = sanitize(x);
        let (scaler, scaled) = StandardScaler::fit_transform(&raw);
        let index = RegionIndex::new(scaled.view(), eps);

        let mut walk = Walk::new(raw.nrows());
        let n_clusters = self.label_points(&index, &mut walk);

        let core_points: Vec<usize> = walk
            .is_core
            .iter()
            .enumerate()
            .filter(|&(_, &core)| core)
            .map(|(i, _)| i)
            .collect();
        let summary = ClusterSummary::from_labels(&walk.labels, core_points.len());
        debug_assert_eq!(summary.n_clusters, n_clusters);

        info!(
            clusters = summary.n_clusters,
            noise = summary.n_noise,
            core_points = summary.n_core,
            "clustering finished"
        );

        Ok(ClusteringSession {
            raw,
            scaler: Some(scaler),
            scaled,
            labels: walk.labels,
            core_points,
            eps,
            min_pts,
            summary,
        })
    }

    /// Cluster and return only the labels.
    pub fn fit_predict(&self, x: &Matrix) -> Result<Vec<Label>> {
        Ok(self.fit(x)?.labels().to_vec())
    }

    /// Label every point. Returns the number of clusters found.
    fn label_points(&self, index: &RegionIndex<'_>, walk: &mut Walk) -> usize {
        let mut cluster_id: Label = 0;

        for point_idx in 0..walk.labels.len() {
            if walk.visited[point_idx] {
                continue;
            }
            walk.visited[point_idx] = true;

            let neighbors = index.neighbors(point_idx);
            if !self.params.is_dense(neighbors.len()) {
                // Tentative: a later cluster may still claim it as a border point
                walk.labels[point_idx] = NOISE;
                continue;
            }

            walk.is_core[point_idx] = true;
            self.expand_cluster(index, point_idx, &neighbors, cluster_id, walk);
            cluster_id += 1;
        }

        cluster_id as usize
    }

    /// Breadth-first expansion from a core seed.
    fn expand_cluster(
        &self,
        index: &RegionIndex<'_>,
        seed: usize,
        neighbors: &[usize],
        cluster_id: Label,
        walk: &mut Walk,
    ) {
        walk.labels[seed] = cluster_id;

        let mut queue = VecDeque::with_capacity(neighbors.len());
        for &idx in neighbors {
            walk.enqueue(&mut queue, idx);
        }

        while let Some(idx) = queue.pop_front() {
            walk.queued[idx] = false;

            if !walk.visited[idx] {
                walk.visited[idx] = true;
                let reachable = index.neighbors(idx);
                if self.params.is_dense(reachable.len()) {
                    walk.is_core[idx] = true;
                    for &next in reachable.iter() {
                        walk.enqueue(&mut queue, next);
                    }
                }
            }

            // First cluster to reach a point keeps it; noise can still be claimed
            if walk.labels[idx] == UNCLASSIFIED || walk.labels[idx] == NOISE {
                walk.labels[idx] = cluster_id;
            }
        }
    }
}

/// Cluster `x` with the given parameters.
pub fn cluster(x: &Matrix, eps: f64, min_pts: usize) -> Result<ClusteringSession> {
    Dbscan::new(eps, min_pts).fit(x)
}

/// Core points of an already scaled matrix, computed as a standalone pass.
///
/// Uses the same neighborhood rule as [`Dbscan::fit`]; the result should
/// equal the session's own core point list.
pub fn core_points(scaled: &Matrix, eps: f64, min_pts: usize) -> Vec<usize> {
    let view = scaled.view();
    (0..scaled.nrows())
        .filter(|&i| region_query(&view, i, eps).len() + 1 >= min_pts)
        .collect()
}
