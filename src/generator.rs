//! # Bootstrap and Generate
//!
//! The drawing backend has to finish loading before the first render.
//! [`Bootstrap`] holds that readiness signal; [`Generator`] is the single
//! "generate" trigger that checks it, then builds, lays out and saves one
//! certificate per call.
//!
//! ```text
//! Unloaded → Loading → Ready(factory)
//!                    ↘ Failed(reason)      (terminal, no retry)
//! ```

use std::fmt;

use crate::error::FormslateError;
use crate::layout::layout;
use crate::model::{Document, FieldValues, FormConfig, Page};
use crate::surface::{execute, DrawingSurface, SurfaceFactory};

pub enum BackendState<F> {
    Unloaded,
    Loading,
    Ready(F),
    Failed(String),
}

impl<F> BackendState<F> {
    fn name(&self) -> &'static str {
        match self {
            BackendState::Unloaded => "unloaded",
            BackendState::Loading => "loading",
            BackendState::Ready(_) => "ready",
            BackendState::Failed(_) => "failed",
        }
    }
}

impl<F> fmt::Debug for BackendState<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendState::Failed(reason) => write!(f, "Failed({:?})", reason),
            other => f.write_str(other.name()),
        }
    }
}

/// Readiness of the drawing backend.
#[derive(Debug)]
pub struct Bootstrap<F> {
    state: BackendState<F>,
}

impl<F> Default for Bootstrap<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Bootstrap<F> {
    pub fn new() -> Self {
        Self {
            state: BackendState::Unloaded,
        }
    }

    /// A bootstrap whose backend is already usable.
    pub fn ready(factory: F) -> Self {
        Self {
            state: BackendState::Ready(factory),
        }
    }

    pub fn state(&self) -> &BackendState<F> {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, BackendState::Ready(_))
    }

    /// Mark the load as started. Only valid once, from `Unloaded`.
    pub fn begin_load(&mut self) -> Result<(), FormslateError> {
        match self.state {
            BackendState::Unloaded => {
                log::debug!("backend loading");
                self.state = BackendState::Loading;
                Ok(())
            }
            ref other => Err(FormslateError::Initialization(format!(
                "backend load already started (state: {})",
                other.name()
            ))),
        }
    }

    /// Settle a started load with the loader's outcome.
    pub fn resolve<E: fmt::Display>(&mut self, outcome: Result<F, E>) -> Result<(), FormslateError> {
        if !matches!(self.state, BackendState::Loading) {
            return Err(FormslateError::Initialization(format!(
                "backend load was not in progress (state: {})",
                self.state.name()
            )));
        }
        match outcome {
            Ok(factory) => {
                log::debug!("backend ready");
                self.state = BackendState::Ready(factory);
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                log::error!("backend failed to load: {}", reason);
                self.state = BackendState::Failed(reason.clone());
                Err(FormslateError::Initialization(reason))
            }
        }
    }

    /// Begin and resolve in one go, for loaders that complete synchronously.
    pub fn load_with<L, E>(&mut self, loader: L) -> Result<(), FormslateError>
    where
        L: FnOnce() -> Result<F, E>,
        E: fmt::Display,
    {
        self.begin_load()?;
        self.resolve(loader())
    }

    /// The factory, if the backend is usable.
    pub fn factory(&self) -> Result<&F, FormslateError> {
        match &self.state {
            BackendState::Ready(factory) => Ok(factory),
            BackendState::Failed(reason) => Err(FormslateError::Initialization(format!(
                "drawing backend failed to load: {}",
                reason
            ))),
            other => Err(FormslateError::Initialization(format!(
                "drawing backend not ready (state: {})",
                other.name()
            ))),
        }
    }
}

/// The generate trigger.
pub struct Generator<F> {
    bootstrap: Bootstrap<F>,
    config: FormConfig,
}

impl<F: SurfaceFactory> Generator<F> {
    pub fn new(bootstrap: Bootstrap<F>, config: FormConfig) -> Self {
        Self { bootstrap, config }
    }

    pub fn bootstrap(&self) -> &Bootstrap<F> {
        &self.bootstrap
    }

    /// For hosts that settle the load after constructing the generator.
    pub fn bootstrap_mut(&mut self) -> &mut Bootstrap<F> {
        &mut self.bootstrap
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Render and persist one certificate. Returns the name it was saved under.
    ///
    /// Each call starts from a fresh document and a fresh surface, so nothing
    /// carries over between calls.
    pub fn generate(&self, fields: &FieldValues) -> Result<String, FormslateError> {
        match self.render(fields) {
            Ok(name) => {
                log::info!("generated {}", name);
                Ok(name)
            }
            Err(e) => {
                log::error!("generate failed: {}", e);
                Err(e)
            }
        }
    }

    fn render(&self, fields: &FieldValues) -> Result<String, FormslateError> {
        let factory = self.bootstrap.factory()?;
        let document = Document::certificate(fields, &self.config.layout);
        let mut surface = factory.create(&self.config.page, &self.config.metadata)?;
        // Centering follows the page the surface actually draws on.
        let page = Page {
            width: surface.page_width(),
            ..self.config.page
        };
        let plan = layout(&document, page, &self.config.layout, &surface)?;
        execute(&plan, &mut surface)?;
        Ok(plan.output_name)
    }
}
