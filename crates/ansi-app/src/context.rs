use std::sync::Arc;
use std::time::{Duration, Instant};

use ansi_ascii::document::{Body, render_document};
use ansi_ascii::encode::RenderedOutput;
use ansi_core::config::{RenderConfig, Viewport};
use ansi_core::error::CoreError;
use ansi_core::fit::ScaleState;
use ansi_core::traits::ImageLoader;

use crate::debounce::Debouncer;
use crate::measure::{FontMetrics, available};
use crate::pipeline::{Completion, spawn_conversion};

/// What the host currently shows.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputState {
    /// No source configured.
    Empty,
    /// Latest successful conversion.
    Rendered(RenderedOutput),
    /// Latest conversion failed; fallback text is shown.
    Failed(CoreError),
}

/// Per-element render state.
///
/// Owns the current settings, the rendered output, the fit scale and the
/// generation counter that keeps late conversions from overwriting newer
/// ones. Conversions run on worker threads and report back through a
/// channel drained by [`poll_completions`](Self::poll_completions).
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use ansi_app::context::{OutputState, RenderContext};
/// use ansi_core::config::{RenderConfig, Viewport};
/// use ansi_source::image::FileLoader;
///
/// // Empty source: nothing to convert.
/// let mut ctx = RenderContext::new(RenderConfig::default(), Viewport::default(), Arc::new(FileLoader));
/// ctx.request_conversion();
/// assert_eq!(*ctx.output(), OutputState::Empty);
/// ```
pub struct RenderContext {
    config: RenderConfig,
    viewport: Viewport,
    metrics: FontMetrics,
    loader: Arc<dyn ImageLoader>,
    generation: u64,
    in_flight: Option<u64>,
    output: OutputState,
    scale: ScaleState,
    debounce: Debouncer,
    refits: u64,
    stale_discards: u64,
    settled: bool,
    completion_tx: flume::Sender<Completion>,
    completion_rx: flume::Receiver<Completion>,
}

impl RenderContext {
    /// New context. Nothing is converted until
    /// [`request_conversion`](Self::request_conversion).
    #[must_use]
    pub fn new(config: RenderConfig, viewport: Viewport, loader: Arc<dyn ImageLoader>) -> Self {
        let (completion_tx, completion_rx) = flume::unbounded();
        Self {
            metrics: FontMetrics::for_size(config.size),
            config,
            viewport,
            loader,
            generation: 0,
            in_flight: None,
            output: OutputState::Empty,
            scale: ScaleState::default(),
            debounce: Debouncer::default(),
            refits: 0,
            stale_discards: 0,
            settled: false,
            completion_tx,
            completion_rx,
        }
    }

    /// Current settings.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Current host region.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current output.
    #[must_use]
    pub fn output(&self) -> &OutputState {
        &self.output
    }

    /// Current fit scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale.scale()
    }

    /// Generation of the latest conversion request.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while the latest request has not completed.
    #[must_use]
    pub fn is_converting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of times the fit engine actually ran.
    #[must_use]
    pub fn refit_count(&self) -> u64 {
        self.refits
    }

    /// Number of completions dropped because a newer request existed.
    #[must_use]
    pub fn stale_discards(&self) -> u64 {
        self.stale_discards
    }

    /// Deadline of the pending debounced refit, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Start a conversion of the current settings.
    ///
    /// Any conversion still running becomes stale. An empty source clears
    /// the output immediately. Returns the new generation.
    pub fn request_conversion(&mut self) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        if self.config.source.is_empty() {
            log::debug!("Source vide : sortie effacée");
            self.in_flight = None;
            self.output = OutputState::Empty;
            self.scale.reset();
            self.settled = true;
            return generation;
        }

        self.in_flight = Some(generation);
        if let Err(e) = spawn_conversion(
            Arc::clone(&self.loader),
            self.config.clone(),
            generation,
            self.completion_tx.clone(),
        ) {
            log::error!("Impossible de lancer la conversion : {e}");
            self.fail(CoreError::Load {
                locator: self.config.source.clone(),
                reason: e.to_string(),
            });
            self.settled = true;
        }
        generation
    }

    /// Replace the settings and react to what changed.
    ///
    /// Render fields trigger a new conversion. A fit change alone refits
    /// immediately (or resets the scale to 1 when fitting is off).
    pub fn apply_config(&mut self, next: RenderConfig) {
        let reconvert = self.config.requires_reconversion(&next);
        let fit_changed = self.config.fit != next.fit;
        self.metrics = FontMetrics::for_size(next.size);
        self.config = next;

        if reconvert {
            log::info!("Paramètres de rendu modifiés : reconversion");
            self.request_conversion();
        } else if fit_changed {
            self.debounce.cancel();
            self.refit();
            self.settled = true;
        }
    }

    /// Record a new host region. The refit is debounced.
    ///
    /// Ignored for fitting purposes while fit is off.
    pub fn set_viewport(&mut self, viewport: Viewport, now: Instant) {
        self.viewport = viewport;
        if self.config.fit.is_enabled() {
            self.debounce.notify(now);
        }
    }

    /// Run the debounced refit if its window has elapsed.
    ///
    /// Returns true if a refit ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debounce.fire(now) {
            self.refit();
            true
        } else {
            false
        }
    }

    /// Measure the output and recompute the scale now.
    pub fn refit(&mut self) {
        let natural = match &self.output {
            OutputState::Rendered(out) => self.metrics.natural_size(out.columns, out.rows),
            OutputState::Empty | OutputState::Failed(_) => None,
        };
        if self
            .scale
            .refit(natural, available(self.viewport), self.config.fit)
        {
            self.refits += 1;
            log::debug!("Échelle d'ajustement : {:.4}", self.scale.scale());
        }
    }

    /// Apply every completion already delivered. Returns true if the
    /// output or the scale changed since the last poll, including changes
    /// made synchronously (empty source, spawn failure, fit toggle).
    pub fn poll_completions(&mut self) -> bool {
        let mut changed = std::mem::take(&mut self.settled);
        while let Ok(done) = self.completion_rx.try_recv() {
            changed |= self.apply_completion(done);
        }
        changed
    }

    /// Block until the latest request completes or `timeout` elapses.
    ///
    /// Returns true once the output reflects the latest request.
    pub fn wait_current(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completion_rx.recv_timeout(remaining) {
                Ok(done) => {
                    self.apply_completion(done);
                }
                Err(_) => return false,
            }
        }
        true
    }

    fn apply_completion(&mut self, done: Completion) -> bool {
        if done.generation != self.generation {
            self.stale_discards += 1;
            log::debug!(
                "Conversion {} ignorée (génération courante {})",
                done.generation,
                self.generation
            );
            return false;
        }
        self.in_flight = None;
        match done.result {
            Ok(out) => {
                log::info!("Converti : {}×{}", out.columns, out.rows);
                self.output = OutputState::Rendered(out);
                self.refit();
            }
            Err(e) => self.fail(e),
        }
        true
    }

    fn fail(&mut self, error: CoreError) {
        log::warn!("Conversion échouée pour {} : {error}", self.config.source);
        self.in_flight = None;
        self.output = OutputState::Failed(error);
        self.scale.reset();
    }

    /// Standalone HTML fragment for the current state.
    #[must_use]
    pub fn document(&self) -> String {
        let body = match &self.output {
            OutputState::Empty => Body::Empty,
            OutputState::Rendered(out) => Body::Art(out),
            OutputState::Failed(_) => Body::Failed,
        };
        render_document(body, &self.config, self.scale.scale())
    }
}
