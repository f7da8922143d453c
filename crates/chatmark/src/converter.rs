//! The conversion entry point.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chatmark_config::Config;
use chatmark_renderer::{
    AvatarHasher, AvatarStyle, ChatExtension, EngineOptions, Md5Hasher, RenderError,
    RuleSetBuilder,
};

use crate::failure::{FailureLog, FailureReport, TracingFailureLog};
use crate::lifecycle::{ChatEngineFactory, EngineFactory, EngineLifecycle};

/// Returned in place of HTML when a message cannot be rendered.
pub const FALLBACK_HTML: &str =
    "<p>[note: Sorry, we could not understand the formatting of your message]</p>";

/// Error raised while setting up a [`Converter`].
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] chatmark_config::ConfigError),
    /// The rule tables could not be assembled.
    #[error(transparent)]
    Rules(#[from] chatmark_renderer::ConfigError),
}

/// Outcome of one conversion.
#[derive(Debug)]
pub enum Conversion {
    /// Rendered HTML.
    Rendered(String),
    /// The engine failed; the caller shows [`FALLBACK_HTML`].
    Fallback {
        /// Why rendering failed.
        cause: RenderError,
    },
}

impl Conversion {
    /// HTML to display: the rendered markup or [`FALLBACK_HTML`].
    pub fn into_html(self) -> String {
        match self {
            Self::Rendered(html) => html,
            Self::Fallback { .. } => FALLBACK_HTML.to_owned(),
        }
    }
}

/// Converts chat messages to HTML.
///
/// Owns one engine behind a mutex that is held for the whole of each
/// conversion, including building and recycling the engine, so the converter
/// can be shared between threads.
pub struct Converter<F: EngineFactory = ChatEngineFactory> {
    lifecycle: Mutex<EngineLifecycle<F>>,
    failure_log: Box<dyn FailureLog>,
}

impl Converter<ChatEngineFactory> {
    /// Build a converter for the chat dialect.
    ///
    /// The configuration is validated and the rule tables are resolved
    /// here, so configuration mistakes surface now rather than on the first
    /// message.
    pub fn new(config: &Config) -> Result<Self, SetupError> {
        Self::with_hasher(config, Arc::new(Md5Hasher))
    }

    /// Like [`Converter::new`] with a custom avatar digest.
    pub fn with_hasher(
        config: &Config,
        hasher: Arc<dyn AvatarHasher>,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let avatar = AvatarStyle {
            base_url: config.avatar.base_url.clone(),
            default_icon: config.avatar.default_icon.clone(),
            size: config.avatar.size,
        };
        let mut builder = RuleSetBuilder::base()?;
        builder.apply(&ChatExtension::new(hasher, avatar))?;

        let options = EngineOptions {
            max_input_bytes: config.engine.max_input_bytes,
            max_nesting: config.engine.max_nesting,
        };
        let factory = ChatEngineFactory::new(Arc::new(builder.build()), options);
        Ok(Self::with_factory(factory, config.engine.max_uses))
    }

    /// Load `chatmark.toml` (explicit path or discovered) and build a
    /// converter from it.
    pub fn load(config_path: Option<&Path>) -> Result<Self, SetupError> {
        let config = Config::load(config_path)?;
        Self::new(&config)
    }
}

impl<F: EngineFactory> Converter<F> {
    /// Converter over a custom engine factory.
    pub fn with_factory(factory: F, max_uses: u32) -> Self {
        Self {
            lifecycle: Mutex::new(EngineLifecycle::new(factory, max_uses)),
            failure_log: Box::new(TracingFailureLog),
        }
    }

    /// Send failure reports to `log` instead of `tracing`.
    #[must_use]
    pub fn with_failure_log(mut self, log: impl FailureLog + 'static) -> Self {
        self.failure_log = Box::new(log);
        self
    }

    /// Convert `text`, keeping the failure cause.
    ///
    /// Nothing is logged; see [`Converter::convert`].
    pub fn try_convert(&self, text: &str) -> Conversion {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        match lifecycle.convert(text) {
            Ok(html) => Conversion::Rendered(html),
            Err(cause) => Conversion::Fallback { cause },
        }
    }

    /// Convert `text` to HTML. Never fails.
    ///
    /// When rendering fails the result is [`FALLBACK_HTML`] and a
    /// [`FailureReport`] with the text redacted goes to the failure log.
    pub fn convert(&self, text: &str) -> String {
        match self.try_convert(text) {
            Conversion::Rendered(html) => html,
            Conversion::Fallback { cause } => {
                self.failure_log.record(&FailureReport::new(&cause, text));
                FALLBACK_HTML.to_owned()
            }
        }
    }

    /// Uses of the current engine so far.
    pub fn use_count(&self) -> u32 {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .use_count()
    }

    /// Whether an engine is currently built.
    pub fn is_alive(&self) -> bool {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_alive()
    }
}
