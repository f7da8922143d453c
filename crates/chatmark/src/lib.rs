//! Chat message rendering.
//!
//! [`Converter::convert`] turns user-authored message text into sanitized
//! HTML and never fails: when rendering goes wrong it returns
//! [`FALLBACK_HTML`] and reports the cause, with the message text redacted,
//! to a [`FailureLog`].
//!
//! Each converter owns one engine that is built on first use and replaced
//! after a configured number of conversions (30 by default).
//!
//! ```
//! use chatmark::Converter;
//! use chatmark_config::Config;
//!
//! let converter = Converter::new(&Config::default())?;
//! assert_eq!(converter.convert("**hi** there"), "<p><strong>hi</strong> there</p>");
//! # Ok::<(), chatmark::SetupError>(())
//! ```

mod converter;
mod failure;
mod lifecycle;

pub use converter::{Conversion, Converter, FALLBACK_HTML, SetupError};
pub use failure::{FailureLog, FailureReport, TracingFailureLog, redact_for_log};
pub use lifecycle::{ChatEngineFactory, EngineFactory, EngineLifecycle, Render};
