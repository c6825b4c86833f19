use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc::{RecvTimeoutError, sync_channel},
    },
    time::Duration,
};

use rayon::prelude::*;

use crate::{
    analysis::stats::compute_region_statistics,
    assets::{
        logo::PreparedLogo,
        source::{SourceImage, asset_file_name},
        store::PreparedAssets,
    },
    batch::job::RenderJob,
    batch::summary::{BatchSummary, FailureKind, JobFailure, JobOutcome},
    compose::composer::compose_template,
    compose::template::{ImageRef, LogoRef, Template},
    foundation::error::{PanelError, PanelResult},
    model::catalog::Catalog,
    model::format::OutputFormat,
    placement::decision::decide_placement,
    placement::overrides::OverrideTable,
    render::backend::{EncodedImage, Rasterizer, RasterizerFactory, write_encoded},
};

/// Worker pool and failure-handling knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Worker threads; `None` uses rayon's default (one per core).
    pub threads: Option<usize>,
    /// Per-job render deadline; `None` waits indefinitely.
    ///
    /// A render that misses the deadline cannot be interrupted: its thread keeps running detached
    /// with the old rasterizer until it returns, while the worker moves on with a fresh one. Each
    /// hung render therefore holds one extra thread and rasterizer on top of `threads`, so pick a
    /// deadline well above the slowest expected render.
    pub render_timeout: Option<Duration>,
    /// Extra attempts after a resource exhaustion or a crashed render.
    pub max_retries: u32,
    /// Jobs a rasterizer serves before its worker replaces it; `0` never recycles.
    pub recycle_after: usize,
    /// Cancel the remaining jobs once this many have failed.
    pub max_failures: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            threads: None,
            render_timeout: Some(Duration::from_secs(60)),
            max_retries: 1,
            recycle_after: 64,
            max_failures: None,
        }
    }
}

/// Cooperative cancellation flag shared between the caller and the workers.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Jobs already rendering finish; jobs not yet started are skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs planned jobs on a bounded worker pool.
///
/// Catalog, overrides and logo are shared read-only; each worker owns its rasterizer.
pub struct Orchestrator {
    catalog: Arc<Catalog>,
    overrides: Arc<OverrideTable>,
    factory: Arc<dyn RasterizerFactory>,
    logo: Option<Arc<PreparedLogo>>,
    config: BatchConfig,
}

#[derive(Default)]
struct Worker {
    rasterizer: Option<Arc<dyn Rasterizer>>,
    served: usize,
}

impl Worker {
    fn rasterizer(
        &mut self,
        factory: &dyn RasterizerFactory,
        recycle_after: usize,
    ) -> PanelResult<Arc<dyn Rasterizer>> {
        if recycle_after > 0 && self.served >= recycle_after && self.rasterizer.is_some() {
            tracing::debug!(served = self.served, "recycling rasterizer");
            self.reset();
        }
        let rasterizer = match &self.rasterizer {
            Some(r) => r.clone(),
            None => {
                let r = factory.create()?;
                self.rasterizer = Some(r.clone());
                self.served = 0;
                r
            }
        };
        self.served += 1;
        Ok(rasterizer)
    }

    fn reset(&mut self) {
        self.rasterizer = None;
        self.served = 0;
    }
}

impl Orchestrator {
    /// Orchestrator over injected tables and a rasterizer factory.
    pub fn new(
        catalog: Arc<Catalog>,
        overrides: Arc<OverrideTable>,
        factory: Arc<dyn RasterizerFactory>,
        config: BatchConfig,
    ) -> Self {
        Self {
            catalog,
            overrides,
            factory,
            logo: None,
            config,
        }
    }

    /// Draw `logo` on every output.
    pub fn with_logo(mut self, logo: Option<Arc<PreparedLogo>>) -> Self {
        self.logo = logo;
        self
    }

    /// Run every job and aggregate the outcomes in job order.
    ///
    /// Only configuration problems (unknown campaign/format ids, a zero-sized pool) fail the call;
    /// they are detected before any job runs. Everything else is recorded per job.
    pub fn run_batch(&self, jobs: &[RenderJob], cancel: &CancelToken) -> PanelResult<BatchSummary> {
        for job in jobs {
            self.catalog.campaign(&job.campaign_id)?;
            self.catalog.format(&job.format_id)?;
        }
        let pool = build_thread_pool(self.config.threads)?;
        let failures = AtomicUsize::new(0);

        tracing::info!(jobs = jobs.len(), threads = pool.current_num_threads(), "batch started");
        let outcomes = pool.install(|| {
            jobs.par_iter()
                .map_init(Worker::default, |worker, job| {
                    let outcome = self.run_job(worker, job, cancel);
                    if let JobOutcome::Failed(f) = &outcome {
                        if f.kind != FailureKind::Cancelled {
                            tracing::warn!(
                                source = %job.source_id,
                                format = %job.format_id,
                                reason = %f.reason,
                                "job failed"
                            );
                        }
                        let n = failures.fetch_add(1, Ordering::SeqCst) + 1;
                        if let Some(max) = self.config.max_failures
                            && n >= max
                            && !cancel.is_cancelled()
                        {
                            tracing::warn!(failures = n, "failure limit reached, cancelling batch");
                            cancel.cancel();
                        }
                    }
                    outcome
                })
                .collect::<Vec<_>>()
        });

        let summary = BatchSummary::from_outcomes(outcomes);
        tracing::info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            status = ?summary.status(),
            "batch finished"
        );
        Ok(summary)
    }

    fn run_job(&self, worker: &mut Worker, job: &RenderJob, cancel: &CancelToken) -> JobOutcome {
        let fail = |kind, reason: String| {
            JobOutcome::Failed(JobFailure {
                job: job.clone(),
                kind,
                reason,
            })
        };
        if cancel.is_cancelled() {
            return fail(FailureKind::Cancelled, "batch cancelled before job started".into());
        }
        match self.process(worker, job) {
            Ok(()) => JobOutcome::Succeeded(job.clone()),
            Err(e) => fail(FailureKind::of(&e), e.to_string()),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(source = %job.source_id, format = %job.format_id))]
    fn process(&self, worker: &mut Worker, job: &RenderJob) -> PanelResult<()> {
        let campaign = self.catalog.campaign(&job.campaign_id)?;
        let format = self.catalog.format(&job.format_id)?;

        let source = job.asset.as_deref().and_then(|path| match SourceImage::open(path) {
            Ok(img) => Some(Arc::new(img)),
            Err(e) => {
                tracing::warn!(error = %e, "source unusable, rendering on brand color");
                None
            }
        });
        let stats = source
            .as_deref()
            .and_then(|img| match compute_region_statistics(img) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::warn!(error = %e, "analysis failed, using fallback placement");
                    None
                }
            });

        let rule = job
            .asset
            .as_deref()
            .and_then(|path| self.overrides.get(&asset_file_name(path)));
        let decision = decide_placement(stats.as_ref(), rule, format);

        let background = source.as_deref().map(|img| ImageRef {
            id: img.id.clone(),
            width: img.width,
            height: img.height,
        });
        let logo = self.logo.as_deref().map(|l| LogoRef {
            id: l.id.clone(),
            width: l.width,
            height: l.height,
        });
        let template = compose_template(
            campaign,
            format,
            &decision,
            background.as_ref(),
            logo.as_ref(),
            &self.catalog.brand,
        );
        let assets = PreparedAssets::new(source, self.logo.clone());

        let encoded = self.render_with_retry(worker, template, format, assets)?;
        write_encoded(&job.output_path, &encoded)?;
        tracing::debug!(path = %job.output_path.display(), "wrote output");
        Ok(())
    }

    fn render_with_retry(
        &self,
        worker: &mut Worker,
        template: Template,
        format: &OutputFormat,
        assets: PreparedAssets,
    ) -> PanelResult<EncodedImage> {
        let template = Arc::new(template);
        let mut attempt = 0;
        loop {
            let result = worker
                .rasterizer(self.factory.as_ref(), self.config.recycle_after)
                .and_then(|r| {
                    render_with_deadline(
                        r,
                        template.clone(),
                        format.clone(),
                        assets.clone(),
                        self.config.render_timeout,
                    )
                });
            match result {
                Ok(img) => return Ok(img),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "reinitializing rasterizer and retrying");
                    worker.reset();
                }
                Err(e) => {
                    if e.is_retryable() || matches!(e, PanelError::Timeout(_)) {
                        worker.reset();
                    }
                    return Err(e);
                }
            }
        }
    }
}

/// Render on a helper thread so a hung or crashing rasterizer cannot take the worker down.
///
/// A timed-out render keeps running detached until the rasterizer returns; its result is
/// discarded and never written. See [`BatchConfig::render_timeout`].
fn render_with_deadline(
    rasterizer: Arc<dyn Rasterizer>,
    template: Arc<Template>,
    format: OutputFormat,
    assets: PreparedAssets,
    timeout: Option<Duration>,
) -> PanelResult<EncodedImage> {
    let (tx, rx) = sync_channel(1);
    let name = rasterizer.name();
    std::thread::Builder::new()
        .name(format!("panelcraft-render-{name}"))
        .spawn(move || {
            let _ = tx.send(rasterizer.render(&template, &format, &assets));
        })
        .map_err(|e| PanelError::resource_exhaustion(format!("spawn render thread: {e}")))?;

    let crashed = || PanelError::resource_exhaustion(format!("{name} render thread crashed"));
    match timeout {
        Some(t) => match rx.recv_timeout(t) {
            Ok(res) => res,
            Err(RecvTimeoutError::Timeout) => Err(PanelError::Timeout(t)),
            Err(RecvTimeoutError::Disconnected) => Err(crashed()),
        },
        None => rx.recv().unwrap_or_else(|_| Err(crashed())),
    }
}

fn build_thread_pool(threads: Option<usize>) -> PanelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PanelError::configuration("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("panelcraft-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PanelError::configuration(format!("failed to build thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/orchestrator.rs"]
mod tests;
