//! DeepL translation adapter.
//!
//! Implements the core's `Translator` capability against the DeepL HTTP
//! API. The free-tier endpoint is the default; override `deepl.base_url`
//! for the paid tier.

pub mod deepl;

pub use deepl::DeepLTranslator;
