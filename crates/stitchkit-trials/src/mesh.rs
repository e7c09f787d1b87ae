//! MeSH ASCII descriptor and supplementary concept files (`d20XX.bin`, `c20XX.bin`)
//!
//! Records are blocks of `KEY = value` lines separated by blank lines.

use std::collections::BTreeMap;
use std::io::{self, BufRead};

use serde::Serialize;

/// One MeSH record, reduced to the fields the trial tagging uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeshRecord {
    /// `UI`
    pub ui: String,
    /// `NM`, or `MH` in descriptor files
    pub name: Option<String>,
    /// `RN` registry number
    pub registry: Option<String>,
    /// `SO`, or `MS`
    pub source: Option<String>,
    /// `N1` CAS type 1 name
    pub cas_name: Option<String>,
    /// `NO`
    pub note: Option<String>,
    /// `HM` headings mapped to
    pub mapped_headings: Vec<String>,
    /// `RR` related registry numbers
    pub related_registry: Vec<String>,
    /// `SY`, `ENTRY`, `PRINT ENTRY`
    pub synonyms: Vec<String>,
}

impl MeshRecord {
    fn set(&mut self, key: &str, value: String) {
        let key = match key {
            "MH" => "NM",
            "MS" => "SO",
            "ENTRY" | "PRINT ENTRY" => "SY",
            other => other,
        };
        match key {
            "UI" => self.ui = value,
            "NM" => self.name = Some(value),
            "RN" => self.registry = Some(value),
            "SO" => self.source = Some(value),
            "N1" => self.cas_name = Some(value),
            "NO" => self.note = Some(value),
            "HM" => self.mapped_headings.push(value),
            "RR" => self.related_registry.push(value),
            "SY" => self.synonyms.push(value),
            _ => {}
        }
    }
}

/// Parse every record, keyed by `UI`. Records without a `UI` are dropped.
///
/// Values are cut at the first `|` (the rest is thesaurus bookkeeping).
pub fn parse_mesh_ascii<R: BufRead>(reader: R) -> io::Result<BTreeMap<String, MeshRecord>> {
    let mut records = BTreeMap::new();
    let mut current = MeshRecord::default();
    let mut dropped = 0;

    let mut flush = |record: &mut MeshRecord| {
        let record = std::mem::take(record);
        if record.ui.is_empty() {
            if record != MeshRecord::default() {
                dropped += 1;
            }
        } else {
            records.insert(record.ui.clone(), record);
        }
    };

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            flush(&mut current);
            continue;
        }
        let Some((key, value)) = line.split_once(" = ") else {
            continue;
        };
        let value = value.split('|').next().unwrap_or(value);
        current.set(key.trim(), value.to_string());
    }
    flush(&mut current);

    if dropped > 0 {
        log::warn!("Dropped {dropped} MeSH records without UI");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPLEMENTAL: &str = "\
*NEWRECORD
RECTYPE = C
NM = 1-methyl-4-phenylpyridinium
RN = 36913-39-0
SY = MPP+|T109|NRW|NLM (1983)|830607|abbcdef
SY = Cyperquat
HM = *1-Methyl-4-phenylpyridinium
HM = Pyridinium Compounds
UI = C000001

*NEWRECORD
RECTYPE = D
MH = Aspirin
ENTRY = Acetylsalicylic Acid|T109|EQV
PRINT ENTRY = 2-(Acetyloxy)benzoic Acid
MS = A non-steroidal anti-inflammatory agent.
UI = D001241

*NEWRECORD
NM = orphan
";

    #[test]
    fn supplemental_record() {
        let records = parse_mesh_ascii(SUPPLEMENTAL.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        let c = &records["C000001"];
        assert_eq!(c.name.as_deref(), Some("1-methyl-4-phenylpyridinium"));
        assert_eq!(c.registry.as_deref(), Some("36913-39-0"));
        assert_eq!(c.synonyms, vec!["MPP+", "Cyperquat"]);
        assert_eq!(c.mapped_headings.len(), 2);
    }

    #[test]
    fn descriptor_keys_mapped() {
        let records = parse_mesh_ascii(SUPPLEMENTAL.as_bytes()).unwrap();
        let d = &records["D001241"];
        assert_eq!(d.name.as_deref(), Some("Aspirin"));
        assert_eq!(
            d.synonyms,
            vec!["Acetylsalicylic Acid", "2-(Acetyloxy)benzoic Acid"]
        );
        assert_eq!(d.source.as_deref(), Some("A non-steroidal anti-inflammatory agent."));
    }

    #[test]
    fn empty_input() {
        assert!(parse_mesh_ascii("".as_bytes()).unwrap().is_empty());
    }
}
