//! Resolve words into annotated definition markup.
//!
//! A query is sanitized, checked against the user's custom definitions and
//! otherwise looked up through three external programs: `dict` for the
//! WordNet entry and similar words, `espeak` for an IPA transcription. The
//! answers are rewritten into a small inline markup (`<b>`, `<i>`,
//! `<span foreground="…">`) suitable for a rich text view.
//!
//! ```no_run
//! use reo_rs::{CommandBackend, Palette, ReoConfig, Resolver};
//!
//! # async fn demo() {
//! let config = ReoConfig::from_env();
//! let resolver = Resolver::new(CommandBackend::from_config(&config), &config);
//! let resolution = resolver.resolve("dog", &Palette::light()).await;
//! println!("{}", resolution.text);
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod custom;
pub mod definition;
pub mod error;
pub mod markup;
pub mod pronounce;
pub mod query;
pub mod random;
pub mod resolve;
pub mod similar;

#[cfg(feature = "web")]
pub mod web;

pub use backend::{Backend, CommandBackend};
pub use config::ReoConfig;
pub use error::{BackendError, QueryError, ReoError};
pub use markup::Palette;
pub use query::{Query, Reserved};
pub use random::WordNetVersion;
pub use resolve::{Resolution, Resolver, ResultKind, Session};
