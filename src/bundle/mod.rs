//! Encrypted bundle handling.
//!
//! The WWDC corpus ships as a single encrypted artifact. This module locates
//! it ([`resolver`]), obtains the symmetric key ([`key`]), and opens it into
//! a scoped working directory ([`decrypt`]). A plain `SQLite` database is
//! accepted in place of an envelope and skips the key and decryption stages.

pub mod decrypt;
pub mod envelope;
pub mod key;
pub mod resolver;

pub use decrypt::ExtractedBundle;
pub use envelope::{BundleMetadata, Envelope, Payload};
pub use key::{KEY_ENV_VAR, KEY_LENGTH};
pub use resolver::BundleSource;
