//! Batch runner with a record cache and an error budget.

use std::future::Future;

use futures::stream::{self, StreamExt};
use log::{debug, error, info};

use crate::error::{FontMetaError, Result};
use crate::record::Stamped;
use crate::store::Dataset;

/// Failures tolerated mid-run before the batch is abandoned.
pub const LOOP_LIMIT: usize = 5;

/// One unit of work keyed by font id.
pub trait Job {
    fn id(&self) -> String;

    /// Upstream `lastModified` of the entry this job was built from.
    fn last_modified(&self) -> &str;

    /// Whether a persisted record stamped `previous` can be reused as is.
    fn is_fresh(&self, previous: &str) -> bool {
        previous == self.last_modified()
    }
}

#[derive(Debug, Clone)]
pub struct RunReport<R> {
    pub data: Dataset<R>,
    pub built: usize,
    pub reused: usize,
}

#[derive(Debug, Clone)]
pub struct Runner<'a, R> {
    previous: &'a Dataset<R>,
    concurrency: usize,
    loop_limit: usize,
    force: bool,
}

impl<'a, R: Clone + Stamped> Runner<'a, R> {
    pub fn new(previous: &'a Dataset<R>) -> Self {
        Self {
            previous,
            concurrency: 1,
            loop_limit: LOOP_LIMIT,
            force: false,
        }
    }

    pub fn concurrency(mut self, jobs: usize) -> Self {
        self.concurrency = jobs.max(1);
        self
    }

    pub fn loop_limit(mut self, limit: usize) -> Self {
        self.loop_limit = limit;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Run `worker` over every item that has no fresh persisted record.
    ///
    /// Fails with [`FontMetaError::BatchAbort`] as soon as more than
    /// `loop_limit` items have failed, and again after draining if any item
    /// failed at all. The returned dataset is keyed (and so ordered) by id.
    pub async fn run<T, I, F, Fut>(&self, items: I, worker: F) -> Result<RunReport<R>>
    where
        T: Job,
        I: IntoIterator<Item = T>,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let mut data = Dataset::new();
        let mut reused = 0;
        let mut pending = Vec::new();

        for item in items {
            let id = item.id();
            if let Some(previous) = self.reusable(&item, &id) {
                debug!("{id}: unchanged since {}, reusing", previous.last_modified());
                data.insert(id, previous.clone());
                reused += 1;
            } else {
                pending.push((id, item));
            }
        }

        let mut outcomes = stream::iter(pending)
            .map(|(id, item)| {
                let fut = worker(item);
                async move { (id, fut.await) }
            })
            .buffer_unordered(self.concurrency);

        let mut built = 0;
        let mut errors = Vec::new();
        while let Some((id, outcome)) = outcomes.next().await {
            match outcome {
                Ok(record) => {
                    data.insert(id, record);
                    built += 1;
                }
                Err(err) => {
                    error!("{id}: {err}");
                    errors.push(format!("{id}: {err}"));
                    if errors.len() > self.loop_limit {
                        return Err(FontMetaError::BatchAbort { errors });
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(FontMetaError::BatchAbort { errors });
        }

        info!("built {built} record(s), reused {reused}");
        Ok(RunReport {
            data,
            built,
            reused,
        })
    }

    fn reusable<T: Job>(&self, item: &T, id: &str) -> Option<&'a R> {
        if self.force {
            return None;
        }
        self.previous
            .get(id)
            .filter(|previous| item.is_fresh(previous.last_modified()))
    }
}
