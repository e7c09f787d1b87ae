//! A shutdown request stops the row loop and fails the run.
//!
//! Kept in its own test binary: the shutdown flag is process-wide.

use std::fs;

use stitchkit_resolve::{Config, NameLookup, ResolveError, runner};
use tempfile::TempDir;

struct Nothing;

impl NameLookup for Nothing {
    fn lookup(&self, _name: &str) -> Result<Option<String>, ResolveError> {
        Ok(None)
    }
}

#[test]
fn interrupted_run_is_an_error() {
    let dir = TempDir::new().unwrap();
    let unii_names = dir.path().join("UNII_Names.txt");
    fs::write(&unii_names, "Name\tType\tUNII\tDisplay Name\nLOPINAVIR\tcn\t2494G1JF75\tLOPINAVIR\n")
        .unwrap();
    let input = dir.path().join("products.tsv");
    fs::write(&input, "ApplNo\tIngredient\nN1\tLOPINAVIR\nN2\tLOPINAVIR\n").unwrap();
    let missing = dir.path().join("missing.tsv");
    let config = Config {
        unii_names,
        input,
        column: "Ingredient".into(),
        output: Some(dir.path().join("resolved.tsv")),
        missing: Some(missing.clone()),
        ..Default::default()
    };

    stitchkit_core::request_shutdown();
    let err = runner::run_with(&config, Nothing).unwrap_err();
    assert!(err.to_string().contains("Interrupted after 0 of 2 rows"));

    // partial output is still flushed
    let out = fs::read_to_string(dir.path().join("resolved.tsv")).unwrap();
    assert_eq!(out, "id\tIngredient\tuniis\tpreferred_terms\n");
    assert!(missing.exists());
}
