//! HTTP adapters for the two business-data providers.
//!
//! [`GeminiClient`] asks a generative model with maps grounding for a JSON
//! list of businesses; [`YelpClient`] queries a local-search directory. Both
//! normalize their responses into [`bizmatrix_core::BusinessRecord`] and plug
//! into a [`bizmatrix_core::SearchSession`] through the core provider traits.

pub mod ai;
pub mod directory;
pub mod error;

pub use ai::GeminiClient;
pub use directory::YelpClient;
pub use error::ProviderError;
