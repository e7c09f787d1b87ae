//! Highest-status report tables

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufRead};
use std::path::Path;

use stitchkit_core::TabTable;

pub const UNIIS_COLUMN: &str = "uniis";
pub const STATUS_COLUMN: &str = "HighestStatus";
/// Column naming the cluster's representative UNII, when the report has one
pub const KEY_COLUMN: &str = "unii";
/// Spreadsheet exports carry a second representative UNII at this position
pub const EXTRA_KEY_INDEX: usize = 7;

/// One cluster row
#[derive(Debug, Clone)]
pub struct StatusRow {
    /// 0-based data row in the file
    pub label: usize,
    /// Sorted, `|`-joined UNIIs
    pub uniis: String,
    pub status: String,
    /// Representative UNIIs: `|`-separated tokens of the `unii` column (else
    /// the first column) and of the eighth column when the row has one
    pub keys: BTreeSet<String>,
    pub fields: Vec<String>,
}

impl StatusRow {
    pub fn unii_set(&self) -> BTreeSet<String> {
        self.uniis.split('|').map(str::to_string).collect()
    }
}

fn key_tokens(fields: &[String], key_col: usize) -> BTreeSet<String> {
    let mut cols = vec![key_col];
    if key_col != EXTRA_KEY_INDEX {
        cols.push(EXTRA_KEY_INDEX);
    }
    cols.into_iter()
        .filter_map(|c| fields.get(c))
        .flat_map(|field| field.split('|'))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub header: Vec<String>,
    pub rows: Vec<StatusRow>,
}

impl StatusReport {
    pub fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let table = TabTable::read(reader, '\t', true)?;
        let uniis_col = table.require_column(UNIIS_COLUMN)?;
        let status_col = table.require_column(STATUS_COLUMN)?;
        let key_col = table.column(KEY_COLUMN).unwrap_or(0);

        let rows = table
            .rows
            .into_iter()
            .enumerate()
            .filter_map(|(label, fields)| {
                let raw = fields.get(uniis_col)?.trim();
                if raw.is_empty() {
                    return None;
                }
                let mut uniis: Vec<&str> = raw.split('|').map(str::trim).collect();
                uniis.sort_unstable();
                Some(StatusRow {
                    label,
                    uniis: uniis.join("|"),
                    status: fields.get(status_col).cloned().unwrap_or_default(),
                    keys: key_tokens(&fields, key_col),
                    fields,
                })
            })
            .collect();
        Ok(Self {
            header: table.header,
            rows,
        })
    }

    /// Row by its file position
    pub fn row(&self, label: usize) -> Option<&StatusRow> {
        self.rows
            .binary_search_by_key(&label, |r| r.label)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Clusters not listed in `exclude`, as a labelled partition.
    pub fn partition(&self, exclude: &BTreeSet<String>) -> Vec<(usize, BTreeSet<String>)> {
        self.rows
            .iter()
            .filter(|r| !exclude.contains(&r.uniis))
            .map(|r| (r.label, r.unii_set()))
            .collect()
    }
}

/// Read a report, dropping rows without UNIIs. `.gz` is decompressed.
pub fn read_status_report(path: &Path) -> io::Result<StatusReport> {
    StatusReport::read(stitchkit_core::open_text(path)?)
}

/// status -> (rows in r1, rows in r2)
pub fn status_counts(r1: &StatusReport, r2: &StatusReport) -> BTreeMap<String, (usize, usize)> {
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for row in &r1.rows {
        counts.entry(row.status.clone()).or_default().0 += 1;
    }
    for row in &r2.rows {
        counts.entry(row.status.clone()).or_default().1 += 1;
    }
    counts
}

/// A cluster present in both reports whose status differs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub uniis: String,
    pub before: String,
    pub after: String,
    pub label1: usize,
    pub label2: usize,
}

/// Clusters present in both reports, and the status changes among them.
pub fn split_identical(
    r1: &StatusReport,
    r2: &StatusReport,
) -> (BTreeSet<String>, Vec<StatusChange>) {
    let by_uniis: BTreeMap<&str, &StatusRow> =
        r2.rows.iter().map(|r| (r.uniis.as_str(), r)).collect();
    let mut identical = BTreeSet::new();
    let mut changes = Vec::new();
    for row in &r1.rows {
        let Some(other) = by_uniis.get(row.uniis.as_str()) else {
            continue;
        };
        if row.status != other.status {
            changes.push(StatusChange {
                uniis: row.uniis.clone(),
                before: row.status.clone(),
                after: other.status.clone(),
                label1: row.label,
                label2: other.label,
            });
        }
        identical.insert(row.uniis.clone());
    }
    (identical, changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn report(text: &str) -> StatusReport {
        StatusReport::read(Cursor::new(text.to_string())).unwrap()
    }

    #[test]
    fn sorts_uniis_and_drops_empty() {
        let r = report("unii\tHighestStatus\tuniis\nB\tApproved\tC|A|B\nX\tOther\t\nD\tOther\tD\n");
        assert_eq!(r.rows.len(), 2);
        assert_eq!(r.rows[0].uniis, "A|B|C");
        assert_eq!(r.rows[0].keys, BTreeSet::from(["B".to_string()]));
        assert_eq!(r.rows[1].label, 2);
        assert!(r.row(1).is_none());
        assert_eq!(r.row(2).unwrap().uniis, "D");
    }

    #[test]
    fn keys_from_unii_and_eighth_column() {
        let r = report(
            "unii\tname\tHighestStatus\tstitch\trank\tuniis\tnote\textra\n\
             A\tX\tApproved\t1\t2\tA|B|C\t\tB | C\n\
             D\tY\tOther\t3\t1\tD\n",
        );
        let keys: Vec<&str> = r.rows[0].keys.iter().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(r.rows[1].keys.len(), 1);
    }

    #[test]
    fn requires_columns() {
        let err = StatusReport::read(Cursor::new("a\tb\n")).unwrap_err();
        assert!(err.to_string().contains("uniis"));
    }

    #[test]
    fn counts_per_status() {
        let r1 = report("uniis\tHighestStatus\nA\tApproved\nB\tApproved\n");
        let r2 = report("uniis\tHighestStatus\nA\tApproved\nB\tMarketed\n");
        let counts = status_counts(&r1, &r2);
        assert_eq!(counts["Approved"], (2, 1));
        assert_eq!(counts["Marketed"], (0, 1));
    }

    #[test]
    fn identical_clusters_and_changes() {
        let r1 = report("uniis\tHighestStatus\nB|A\tApproved\nC\tOther\nD\tOther\n");
        let r2 = report("uniis\tHighestStatus\nC\tMarketed\nA|B\tApproved\nD|E\tOther\n");
        let (identical, changes) = split_identical(&r1, &r2);
        assert_eq!(
            identical.into_iter().collect::<Vec<_>>(),
            vec!["A|B".to_string(), "C".to_string()]
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].before, "Other");
        assert_eq!(changes[0].after, "Marketed");
        assert_eq!((changes[0].label1, changes[0].label2), (1, 0));
    }
}
