//! Stitchkit Resolve - free-text substance names to FDA UNII codes
//!
//! Resolution order for a single name: explicit overrides, the memo cache,
//! then the G-SRS substance search with suffix and salt fallbacks.
//! Ingredient lists (`A; B`, `A|B`, `MIX (A;B;C)`) are split and each part
//! resolved against the UNII Names table first.
//!
//! ```ignore
//! use stitchkit_resolve::{GsrsClient, Overrides, Resolver, UniiTable};
//!
//! let table = UniiTable::load("UNII_Names.txt".as_ref())?;
//! let mut resolver = Resolver::new(GsrsClient::default(), Overrides::builtin());
//! let code = resolver.resolve("PEGFILGRASTIM-JMDB")?;
//! ```

pub mod config;
pub mod error;
pub mod gsrs;
pub mod ingredients;
pub mod overrides;
pub mod resolver;
pub mod runner;
pub mod salts;
pub mod unii;

// Re-exports
pub use config::Config;
pub use error::ResolveError;
pub use gsrs::{GsrsClient, NameLookup};
pub use ingredients::{MissingReport, parse_ingredients};
pub use overrides::Overrides;
pub use resolver::Resolver;
pub use runner::{Summary, run};
pub use salts::{SALTS, strip_salt};
pub use unii::{UniiTable, is_valid_unii};
