//! Memoized name -> UNII resolution

use rustc_hash::FxHashMap;

use crate::error::ResolveError;
use crate::gsrs::NameLookup;
use crate::overrides::Overrides;
use crate::salts::strip_salt;
use crate::unii::is_valid_unii;

/// Counters reported at the end of a run
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolverStats {
    pub overrides: usize,
    pub cached: usize,
    pub remote: usize,
    pub misses: usize,
}

pub struct Resolver<L> {
    lookup: L,
    overrides: Overrides,
    cache: FxHashMap<String, Option<String>>,
    hint: Option<String>,
    stats: ResolverStats,
}

impl<L: NameLookup> Resolver<L> {
    pub fn new(lookup: L, overrides: Overrides) -> Self {
        Self {
            lookup,
            overrides,
            cache: FxHashMap::default(),
            hint: None,
            stats: ResolverStats::default(),
        }
    }

    /// Suffix tried before the bare name, e.g. `" [GREEN BOOK]"`.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.hint = (!hint.is_empty()).then_some(hint);
        self
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Resolve one name to a UNII. `Ok(None)` is a miss.
    pub fn resolve(&mut self, name: &str) -> Result<Option<String>, ResolveError> {
        if let Some(unii) = self.overrides.single(name) {
            self.stats.overrides += 1;
            return Ok(Some(unii.to_string()));
        }
        if let Some(hit) = self.cache.get(name) {
            self.stats.cached += 1;
            return Ok(hit.clone());
        }

        self.stats.remote += 1;
        let mut found = self.query(name)?;
        if found.is_none() {
            // TECHNETIUM TC-99M TEBOROXIME KIT, PEGFILGRASTIM-JMDB
            if let Some(base) = name.strip_suffix(" KIT") {
                found = self.query(base)?;
            } else if let Some(base) = strip_biologic_suffix(name) {
                found = self.query(base)?;
            }
        }
        if found.is_none() {
            if let Some(base) = strip_salt(name) {
                found = self.query(&base)?;
            }
        }

        if found.is_none() {
            self.stats.misses += 1;
        }
        self.cache.insert(name.to_string(), found.clone());
        Ok(found)
    }

    fn query(&self, name: &str) -> Result<Option<String>, ResolveError> {
        if let Some(hint) = &self.hint {
            if let Some(code) = self.accept(self.lookup.lookup(&format!("{name}{hint}"))?) {
                return Ok(Some(code));
            }
        }
        Ok(self.accept(self.lookup.lookup(name)?))
    }

    fn accept(&self, code: Option<String>) -> Option<String> {
        code.filter(|c| is_valid_unii(c))
    }
}

/// Four-letter nonproprietary suffix on biologics: `"FILGRASTIM-SNDZ"` -> `"FILGRASTIM"`.
fn strip_biologic_suffix(name: &str) -> Option<&str> {
    let bytes = name.as_bytes();
    if bytes.len() > 5 && bytes[bytes.len() - 5] == b'-' {
        name.get(..name.len() - 5)
    } else {
        None
    }
}
