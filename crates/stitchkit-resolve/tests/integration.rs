//! End-to-end resolution runs against a canned lookup.
//!
//! The live G-SRS test needs network access and is marked #[ignore].
//! Run with: cargo test -p stitchkit-resolve --test integration -- --ignored

use std::fs;

use stitchkit_resolve::{
    Config, GsrsClient, NameLookup, Overrides, ResolveError, Resolver, runner,
};
use tempfile::TempDir;

struct Canned(&'static [(&'static str, &'static str)]);

impl NameLookup for Canned {
    fn lookup(&self, name: &str) -> Result<Option<String>, ResolveError> {
        Ok(self
            .0
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, u)| (*u).to_string()))
    }
}

const UNII_NAMES: &str = "Name\tType\tUNII\tDisplay Name\n\
    RITONAVIR [INN]\tcn\tO3J8G9O825\tRITONAVIR\n\
    LOPINAVIR\tcn\t2494G1JF75\tLOPINAVIR\n";

fn write_inputs(dir: &TempDir) -> Config {
    let unii_names = dir.path().join("UNII_Names.txt");
    fs::write(&unii_names, UNII_NAMES).unwrap();
    let input = dir.path().join("products.tsv");
    fs::write(
        &input,
        "ApplNo\tIngredient\n\
         N021226\tLOPINAVIR; RITONAVIR\n\
         N125031\tPEGFILGRASTIM-JMDB\n\
         N999999\tUNOBTAINIUM\n",
    )
    .unwrap();
    Config {
        unii_names,
        input,
        column: "Ingredient".into(),
        id_column: Some("ApplNo".into()),
        output: Some(dir.path().join("out/resolved.tsv")),
        missing: Some(dir.path().join("missing.tsv")),
        ..Default::default()
    }
}

#[test]
fn resolves_rows_and_reports_missing() {
    let dir = TempDir::new().unwrap();
    let config = write_inputs(&dir);

    let summary =
        runner::run_with(&config, Canned(&[("PEGFILGRASTIM", "3A58010674")])).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.complete_rows, 2);
    assert_eq!(summary.uniis, 3);
    assert_eq!(summary.missing_names, 1);

    let out = fs::read_to_string(config.output.as_ref().unwrap()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "id\tIngredient\tuniis\tpreferred_terms");
    assert_eq!(
        lines[1],
        "N021226\tLOPINAVIR; RITONAVIR\t2494G1JF75|O3J8G9O825\tLOPINAVIR|RITONAVIR"
    );
    assert!(lines[2].starts_with("N125031\tPEGFILGRASTIM-JMDB\t3A58010674"));
    assert_eq!(lines[3], "N999999\tUNOBTAINIUM\t\t");

    let missing = fs::read_to_string(config.missing.as_ref().unwrap()).unwrap();
    assert!(missing.contains("UNOBTAINIUM\t1\tN999999"));
}

#[test]
fn override_file_applies() {
    let dir = TempDir::new().unwrap();
    let mut config = write_inputs(&dir);
    let overrides = dir.path().join("overrides.tsv");
    fs::write(&overrides, "UNOBTAINIUM\tAAAAAAAAAA\n").unwrap();
    config.overrides = Some(overrides);

    let summary = runner::run_with(&config, Canned(&[])).unwrap();
    assert_eq!(summary.missing_names, 1); // only the biologic now
}

#[test]
fn missing_column_fails() {
    let dir = TempDir::new().unwrap();
    let mut config = write_inputs(&dir);
    config.column = "ActiveIngredient".into();
    let err = runner::run_with(&config, Canned(&[])).unwrap_err();
    assert!(format!("{err:#}").contains("ActiveIngredient"));
}

/// Live lookup of a stable, well-known substance
#[test]
#[ignore]
fn live_gsrs_lookup() {
    let mut resolver = Resolver::new(GsrsClient::default(), Overrides::default());
    let code = resolver.resolve("ASPIRIN").unwrap();
    assert_eq!(code.as_deref(), Some("R16CO5Y76E"));
}
