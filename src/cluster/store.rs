use super::assign::Assignment;
use super::dbscan::Dbscan;
use super::session::ClusteringSession;
use crate::Matrix;
use crate::error::Result;
use ndarray::ArrayView1;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Holder of the current clustering session for callers that share one
/// across threads.
///
/// Sessions are swapped wholesale under the write lock. Readers take an
/// `Arc` snapshot, so an assignment in flight keeps using the session it
/// started with even if a newer one is installed meanwhile.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Arc<ClusteringSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn swap(&self, session: Arc<ClusteringSession>) -> Option<Arc<ClusteringSession>> {
        info!(
            points = session.len(),
            clusters = session.n_clusters(),
            "installing clustering session"
        );
        self.current.write().replace(session)
    }

    /// Replace the current session, returning the one it supersedes.
    pub fn install(&self, session: ClusteringSession) -> Option<Arc<ClusteringSession>> {
        self.swap(Arc::new(session))
    }

    /// Cluster `x` outside the lock and install the result.
    pub fn cluster(&self, dbscan: &Dbscan, x: &Matrix) -> Result<Arc<ClusteringSession>> {
        let session = Arc::new(dbscan.fit(x)?);
        self.swap(Arc::clone(&session));
        Ok(session)
    }

    pub fn current(&self) -> Option<Arc<ClusteringSession>> {
        self.current.read().clone()
    }

    pub fn clear(&self) -> Option<Arc<ClusteringSession>> {
        self.current.write().take()
    }

    /// Assign against the current session; `None` when nothing is installed.
    pub fn assign(&self, vector: ArrayView1<f64>) -> Option<Assignment> {
        self.current().map(|session| session.assign(vector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NOISE;
    use ndarray::array;

    #[test]
    fn test_store_starts_empty() {
        let store = SessionStore::new();

        assert!(store.current().is_none());
        assert!(store.assign(array![0.0].view()).is_none());
    }

    #[test]
    fn test_install_replaces_wholesale() {
        let store = SessionStore::new();
        let first = Dbscan::new(1.5, 3)
            .fit(&array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0]])
            .unwrap();
        let second = Dbscan::new(0.1, 2).fit(&array![[0.0], [100.0]]).unwrap();

        assert!(store.install(first).is_none());
        let previous = store.install(second).unwrap();

        assert_eq!(previous.len(), 4);
        assert_eq!(store.current().unwrap().len(), 2);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_cluster_installs_like_install() {
        let store = SessionStore::new();
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0]];

        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let clustered = tracing::subscriber::with_default(subscriber, || {
            store.cluster(&Dbscan::new(1.5, 3), &x).unwrap()
        });

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        assert!(output.contains("installing clustering session"));
        assert!(Arc::ptr_eq(&clustered, &store.current().unwrap()));

        let replacement = Dbscan::new(0.1, 2).fit(&array![[0.0], [100.0]]).unwrap();
        let previous = store.install(replacement).unwrap();
        assert!(Arc::ptr_eq(&clustered, &previous));
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let store = SessionStore::new();
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0]];
        store.cluster(&Dbscan::new(1.5, 3), &x).unwrap();

        let snapshot = store.current().unwrap();
        store.clear();

        assert!(store.current().is_none());
        assert_eq!(snapshot.assign(array![0.0, 0.0].view()).cluster, 0);
    }

    #[test]
    fn test_cluster_rejects_bad_params_and_keeps_session() {
        let store = SessionStore::new();
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0]];
        store.cluster(&Dbscan::new(1.5, 3), &x).unwrap();

        assert!(store.cluster(&Dbscan::new(-1.0, 3), &x).is_err());
        assert_eq!(store.current().unwrap().labels(), &[0, 0, 0, NOISE]);
    }

    #[test]
    fn test_concurrent_assign() {
        let store = SessionStore::new();
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0]];
        store.cluster(&Dbscan::new(1.5, 3), &x).unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let hit = store.assign(array![0.0, 1.0].view()).unwrap();
                    assert_eq!(hit.cluster, 0);
                });
            }
        });
    }
}
