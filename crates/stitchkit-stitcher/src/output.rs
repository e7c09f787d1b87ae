//! Regression report writer

use std::io::{self, Write};

use stitchkit_resolve::UniiTable;

use crate::reports::StitchReport;

/// Write every report: one header line each (blank line between reports),
/// then `report\tkey\tPT(key)\tvalue[\tPT(value)]...`.
///
/// A value's preferred term is only written when the table knows it, so
/// stitch ids and ranks pass through as single columns.
pub fn write_reports<W: Write>(
    mut w: W,
    reports: &[Box<dyn StitchReport>],
    table: &UniiTable,
) -> io::Result<usize> {
    let mut written = 0;
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "{}\t{}", report.name(), report.header())?;
        for (key, values) in report.rows() {
            write!(w, "{}\t{key}\t{}", report.name(), table.preferred_term(&key))?;
            for value in &values {
                write!(w, "\t{value}")?;
                let term = table.preferred_term(value);
                if !term.is_empty() {
                    write!(w, "\t{term}")?;
                }
            }
            writeln!(w)?;
            written += 1;
        }
    }
    Ok(written)
}
