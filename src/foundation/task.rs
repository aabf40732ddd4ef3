use anyhow::Context;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

/// Run `work` on a dedicated thread and resolve once it finishes.
///
/// The thread starts immediately, so the work makes progress even if the returned future is
/// not polled until later.
pub(crate) fn spawn_blocking<T, F>(name: &str, work: F) -> LocalBoxFuture<'static, anyhow::Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    let (tx, rx) = futures::channel::oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let _ = tx.send(work());
        });

    async move {
        spawned.context("spawn worker thread")?;
        rx.await.context("worker thread exited without a result")?
    }
    .boxed_local()
}

/// Run `work` on `pool`, or on rayon's global pool when `pool` is `None`, and resolve once it
/// finishes.
///
/// The job is queued immediately; at most the pool's thread count run at the same time.
pub(crate) fn spawn_pooled<T, F>(
    pool: Option<&rayon::ThreadPool>,
    work: F,
) -> LocalBoxFuture<'static, anyhow::Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    let (tx, rx) = futures::channel::oneshot::channel();
    let job = move || {
        let _ = tx.send(work());
    };
    match pool {
        Some(pool) => pool.spawn(job),
        None => rayon::spawn(job),
    }

    async move { rx.await.context("pool worker dropped the job")? }.boxed_local()
}

/// Build a rayon pool for background loads. `None` uses rayon's default thread count.
pub(crate) fn build_thread_pool(threads: Option<usize>) -> anyhow::Result<rayon::ThreadPool> {
    if threads == Some(0) {
        anyhow::bail!("loader threads must be >= 1 when set");
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("posterkit-load-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().context("build rayon thread pool")
}
