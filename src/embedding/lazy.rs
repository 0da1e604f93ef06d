//! Deferred model construction with an at-most-once guard.
//!
//! Concurrent first callers block on the same initializer; the loser of the race
//! never builds a second copy. A failed load leaves the cell empty so a later
//! call can retry.

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use super::error::EmbeddingError;
use super::model::{CrossEncoderModel, EmbeddingModel};
use super::reranker::RerankerError;

type Loader<M, E> = Box<dyn Fn() -> Result<M, E> + Send + Sync>;

pub struct LazyModel<M, E> {
    label: &'static str,
    cell: OnceCell<M>,
    loader: Loader<M, E>,
}

impl<M, E> LazyModel<M, E> {
    pub fn new<F>(label: &'static str, loader: F) -> Self
    where
        F: Fn() -> Result<M, E> + Send + Sync + 'static,
    {
        Self {
            label,
            cell: OnceCell::new(),
            loader: Box::new(loader),
        }
    }

    /// Returns the model, loading it on first use.
    pub fn get(&self) -> Result<&M, E> {
        if let Some(model) = self.cell.get() {
            return Ok(model);
        }

        self.cell.get_or_try_init(|| {
            info!(model = self.label, "Loading model on first use");
            let model = (self.loader)()?;
            debug!(model = self.label, "Model ready");
            Ok(model)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<M, E> std::fmt::Debug for LazyModel<M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyModel")
            .field("label", &self.label)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl<M: EmbeddingModel> EmbeddingModel for LazyModel<M, EmbeddingError> {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.get()?.encode(texts)
    }
}

impl<M: CrossEncoderModel> CrossEncoderModel for LazyModel<M, RerankerError> {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankerError> {
        self.get()?.predict(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_loads_once_under_concurrent_first_access() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let lazy: Arc<LazyModel<u32, EmbeddingError>> = Arc::new(LazyModel::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(7)
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lazy = Arc::clone(&lazy);
                thread::spawn(move || *lazy.get().unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_can_retry() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let lazy: LazyModel<u32, EmbeddingError> = LazyModel::new("flaky", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(EmbeddingError::ModelLoadFailed {
                    reason: "first attempt".to_string(),
                })
            } else {
                Ok(1)
            }
        });

        assert!(lazy.get().is_err());
        assert!(!lazy.is_loaded());
        assert_eq!(*lazy.get().unwrap(), 1);
        assert!(lazy.is_loaded());
    }
}
