//! Engine for a "find the boosted frequency" ear-training game.
//!
//! A round picks a source sound, a frequency band and a hidden center
//! frequency inside it, renders a peaking-EQ boosted copy of the sound, and
//! remembers the answer in the shared [`session::GameSession`]. Guesses are
//! scored against that answer by [`guess::GuessEvaluator`].

pub mod assets;
pub mod bundle;
pub mod codec;
pub mod config;
pub mod dsp;
pub mod error;
pub mod guess;
pub mod ranges;
#[cfg(feature = "server")]
pub mod server;
pub mod session;
pub mod transport;

pub use bundle::{Bundle, BundleGenerator};
pub use error::{GameError, Result};
pub use guess::{GuessEvaluator, GuessOutcome, Relation};
pub use ranges::{FrequencyRange, RangeCatalog};
pub use session::GameSession;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
