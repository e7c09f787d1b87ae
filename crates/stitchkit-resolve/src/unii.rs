//! FDA "UNII Names" table

use std::io::BufRead;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::ResolveError;

const HEADERS: [[&str; 4]; 2] = [
    ["NAME", "TYPE", "UNII", "DISPLAY NAME"],
    ["NAME", "TYPE", "UNII", "PT"],
];

/// A UNII is exactly ten ASCII letters or digits.
pub fn is_valid_unii(code: &str) -> bool {
    code.len() == 10 && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Name lookups built from the UNII Names file.
#[derive(Debug, Default)]
pub struct UniiTable {
    /// Preferred (display) term -> UNII
    pub preferred: FxHashMap<String, String>,
    /// Any listed name -> UNII, source qualifiers like ` [INN]` removed
    pub all: FxHashMap<String, String>,
    /// UNII -> preferred term
    pub names: FxHashMap<String, String>,
}

impl UniiTable {
    /// Load from a path; `.gz` files are decompressed.
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let reader = stitchkit_core::open_text(path)?;
        let table = Self::read(reader)?;
        log::info!(
            "UNIIs in memory: {} preferred, {} names",
            stitchkit_core::fmt_num(table.preferred.len()),
            stitchkit_core::fmt_num(table.all.len())
        );
        Ok(table)
    }

    pub fn read<R: BufRead>(reader: R) -> Result<Self, ResolveError> {
        let mut table = Self::default();
        let mut lines = reader.split(b'\n');

        let header = match lines.next() {
            Some(line) => String::from_utf8_lossy(&line?).into_owned(),
            None => {
                return Err(ResolveError::Format {
                    line: 1,
                    message: "empty UNII file".into(),
                });
            }
        };
        let cols: Vec<String> = header
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(|c| c.trim().to_uppercase())
            .collect();
        if !HEADERS.iter().any(|h| cols.len() >= 4 && cols[..4] == h[..]) {
            return Err(ResolveError::Format {
                line: 1,
                message: format!("problem reading UNII file header: {header:?}"),
            });
        }

        for (i, line) in lines.enumerate() {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 4 {
                return Err(ResolveError::Format {
                    line: i + 2,
                    message: format!("problem reading UNII file line: {line:?}"),
                });
            }
            let unii = fields[2].to_string();
            table.preferred.insert(fields[3].to_string(), unii.clone());
            table.names.insert(unii.clone(), fields[3].to_string());
            table.all.insert(strip_qualifier(fields[0]).to_string(), unii);
        }
        Ok(table)
    }

    /// Preferred term for a UNII, or empty when unknown.
    pub fn preferred_term(&self, unii: &str) -> &str {
        self.names.get(unii).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.preferred.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preferred.is_empty()
    }
}

/// `"ASPIRIN [USP]"` -> `"ASPIRIN"`
fn strip_qualifier(name: &str) -> &str {
    if name.ends_with(']') {
        if let Some(pos) = name.rfind(" [") {
            return &name[..pos];
        }
    }
    name
}
