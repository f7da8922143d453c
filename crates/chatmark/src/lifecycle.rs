//! Engine construction and recycling.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use chatmark_renderer::{Engine, EngineOptions, RenderError, RuleSet};

use crate::failure::redact_for_log;

/// Something that turns text into HTML.
pub trait Render {
    /// Render one input.
    ///
    /// # Errors
    ///
    /// Any [`RenderError`]; the caller decides how to surface it.
    fn render(&mut self, text: &str) -> Result<String, RenderError>;
}

impl Render for Engine {
    fn render(&mut self, text: &str) -> Result<String, RenderError> {
        Engine::render(self, text)
    }
}

/// Builds fresh engines for an [`EngineLifecycle`].
pub trait EngineFactory: Send {
    type Engine: Render + Send;

    fn create(&self) -> Self::Engine;
}

/// Builds [`Engine`]s sharing one resolved [`RuleSet`].
#[derive(Debug, Clone)]
pub struct ChatEngineFactory {
    rules: Arc<RuleSet>,
    options: EngineOptions,
}

impl ChatEngineFactory {
    pub fn new(rules: Arc<RuleSet>, options: EngineOptions) -> Self {
        Self { rules, options }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl EngineFactory for ChatEngineFactory {
    type Engine = Engine;

    fn create(&self) -> Engine {
        Engine::new(Arc::clone(&self.rules), self.options)
    }
}

/// One lazily built engine that is replaced after a fixed number of uses.
///
/// States: no engine, or a live engine with its use count. The first
/// conversion builds an engine; every conversion, failed or not, counts as
/// a use; reaching `max_uses` drops the engine and resets the count. An
/// engine that panics is dropped at once. Panic messages can quote the
/// input, so they are redacted before they leave this type.
pub struct EngineLifecycle<F: EngineFactory> {
    factory: F,
    engine: Option<F::Engine>,
    use_count: u32,
    max_uses: u32,
}

impl<F: EngineFactory> EngineLifecycle<F> {
    /// `max_uses` below 1 is treated as 1.
    pub fn new(factory: F, max_uses: u32) -> Self {
        Self {
            factory,
            engine: None,
            use_count: 0,
            max_uses: max_uses.max(1),
        }
    }

    /// Whether an engine is currently built.
    pub fn is_alive(&self) -> bool {
        self.engine.is_some()
    }

    /// Uses of the live engine so far.
    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    pub fn max_uses(&self) -> u32 {
        self.max_uses
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Run one conversion: build the engine if needed, render, count the
    /// use, and recycle when the limit is reached.
    ///
    /// # Errors
    ///
    /// The engine's [`RenderError`], or [`RenderError::Panicked`] with the
    /// redacted panic message if it panicked.
    pub fn convert(&mut self, text: &str) -> Result<String, RenderError> {
        let engine = self.engine.get_or_insert_with(|| {
            tracing::debug!("Building markdown engine");
            self.factory.create()
        });

        let result = match catch_unwind(AssertUnwindSafe(|| engine.render(text))) {
            Ok(result) => result,
            Err(payload) => {
                tracing::debug!("Discarding markdown engine after panic");
                self.engine = None;
                self.use_count = 0;
                let message = redact_for_log(&panic_message(payload.as_ref()));
                return Err(RenderError::Panicked(message));
            }
        };

        self.use_count += 1;
        if self.use_count >= self.max_uses {
            tracing::debug!(uses = self.use_count, "Recycling markdown engine");
            self.engine = None;
            self.use_count = 0;
        }
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
