//! Trial index and MeSH conversion end to end

use std::fs;
use std::io::Read;

use flate2::read::GzDecoder;
use stitchkit_core::ProgressContext;
use stitchkit_trials::{IndexConfig, MeshConfig, run_index, run_mesh};

#[test]
fn index_writes_gzip_json() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("AllPublicXML/NCT0000xxxx");
    fs::create_dir_all(&dump).unwrap();
    fs::write(
        dump.join("NCT00000102.xml"),
        "<clinical_study><id_info><nct_id>NCT00000102</nct_id>\
         <nct_alias>NCT00000003</nct_alias></id_info>\
         <phase>N/A</phase><overall_status>Completed</overall_status></clinical_study>",
    )
    .unwrap();
    let output = dir.path().join("ctdata.json.gz");

    let config = IndexConfig {
        dir: dir.path().join("AllPublicXML"),
        output: Some(output.clone()),
        workers: 2,
    };
    let summary = run_index(&config, &ProgressContext::hidden()).unwrap();
    assert_eq!(summary.studies, 1);
    assert_eq!(summary.aliases, 1);

    let mut json = String::new();
    GzDecoder::new(fs::File::open(&output).unwrap())
        .read_to_string(&mut json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["NCT00000102"]["phase"], "Not Applicable");
    assert_eq!(value["NCT00000003"]["nct_id"], "NCT00000102");
}

#[test]
fn index_requires_directory() {
    let config = IndexConfig {
        dir: "/nonexistent/ctgov".into(),
        output: None,
        workers: 1,
    };
    assert!(run_index(&config, &ProgressContext::hidden()).is_err());
}

#[test]
fn mesh_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("c2020.bin");
    fs::write(
        &input,
        "*NEWRECORD\nNM = Remdesivir\nRN = 3QKI37EEHE\nUI = C000606551\n\n",
    )
    .unwrap();
    let output = dir.path().join("mesh.json");
    let summary = run_mesh(&MeshConfig {
        file: input,
        output: Some(output.clone()),
    })
    .unwrap();
    assert_eq!(summary.records, 1);

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["C000606551"]["registry"], "3QKI37EEHE");
}
