use crate::foundation::error::{ReelError, ReelResult};

/// Where chunked parallel work runs: the global rayon pool or a dedicated one.
pub(crate) enum WorkerPool {
    Global,
    Dedicated(rayon::ThreadPool),
}

impl WorkerPool {
    pub(crate) fn new(threads: Option<usize>) -> ReelResult<Self> {
        match threads {
            None => Ok(Self::Global),
            Some(n) => Ok(Self::Dedicated(build_thread_pool(n)?)),
        }
    }

    pub(crate) fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self {
            Self::Global => f(),
            Self::Dedicated(pool) => pool.install(f),
        }
    }
}

fn build_thread_pool(threads: usize) -> ReelResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(ReelError::validation("'threads' must be >= 1 when set"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ReelError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

pub(crate) fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/threading.rs"]
mod tests;
