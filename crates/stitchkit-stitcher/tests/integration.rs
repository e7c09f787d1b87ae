//! End-to-end regression and curation runs against canned pages

use std::cell::RefCell;
use std::fs;

use serde_json::{Value, json};
use stitchkit_core::{FetchError, ProgressContext};
use stitchkit_stitcher::runner::{
    run_apply_with, run_dump_with, run_permute_with, run_regression_with,
};
use stitchkit_stitcher::{Config, CurationConfig, PageSource, PermuteConfig, Site};

/// First page from `pages`, then empty pages
struct Canned {
    pages: Vec<Value>,
    calls: RefCell<usize>,
}

impl Canned {
    fn new(pages: Vec<Value>) -> Self {
        Self {
            pages,
            calls: RefCell::new(0),
        }
    }
}

impl PageSource for Canned {
    fn fetch(&self, _url: &str) -> Result<Value, FetchError> {
        let mut calls = self.calls.borrow_mut();
        let page = self
            .pages
            .get(*calls)
            .cloned()
            .unwrap_or_else(|| json!({"contents": []}));
        *calls += 1;
        Ok(page)
    }
}

const UNII_NAMES: &str = "Name\tType\tUNII\tDisplay Name\n\
IBUPROFEN\tcn\tWK2XYI10QM\tIBUPROFEN\n\
IBUPROFEN SODIUM\tcn\tRM1CE97Z4N\tIBUPROFEN SODIUM\n";

fn stitches() -> Value {
    json!({"contents": [
        {
            "id": 100, "rank": 2,
            "highestPhase": "e1",
            "events": [{"id": "e1", "kind": "USApprovalRx", "startDate": "1974-01-01"}],
            "sgroup": {"parent": 1, "members": [
                {"node": 1, "id": "WK2XYI10QM", "name": "IBUPROFEN", "source": "G-SRS, July 2019",
                 "stitches": {"I_UNII": "WK2XYI10QM"}},
                {"node": 2, "id": "RM1CE97Z4N", "source": "G-SRS, July 2019",
                 "stitches": {"I_UNII": ["RM1CE97Z4N"]}}
            ]}
        },
        {
            "id": 200, "rank": 1,
            "sgroup": {"parent": 3, "members": [
                {"node": 3, "id": "DB01050", "name": "Ibuprofen", "source": "DrugBank, July 2018",
                 "stitches": {"I_UNII": "WK2XYI10QM"}}
            ], "properties": {"groups": [{"value": "approved"}]}}
        },
        {"id": 300, "sgroup": "not an object"}
    ]})
}

#[test]
fn regression_writes_reports_and_status_table() {
    let dir = tempfile::tempdir().unwrap();
    let unii = dir.path().join("unii.txt");
    fs::write(&unii, UNII_NAMES).unwrap();
    let output = dir.path().join("regression.tsv");
    let status = dir.path().join("status.tsv");

    let config = Config {
        site: Site::parse("local").unwrap(),
        unii_names: unii,
        output: Some(output.clone()),
        status_table: Some(status.clone()),
        ..Config::default()
    };
    let summary =
        run_regression_with(&config, &ProgressContext::hidden(), Canned::new(vec![stitches()]))
            .unwrap();
    assert_eq!(summary.stitches, 2);
    assert_eq!(summary.skipped, 1);
    assert!(!summary.interrupted);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("uniiClashes\tWK2XYI10QM\tIBUPROFEN\t100\t200\n"));
    assert!(text.contains(
        "approvedStitches\tWK2XYI10QM\tIBUPROFEN\t1974-01-01\t1\t2\tIBUPROFEN\tWK2XYI10QM\tIBUPROFEN\tUSApprovalRx\n"
    ));
    assert!(text.contains("highestStatus\tWK2XYI10QM\tIBUPROFEN\tIBUPROFEN\tUSApprovalRx\t100\t2\n"));
    assert!(text.contains("countGenerics\tWK2XYI10QM\tIBUPROFEN\tIBUPROFEN\tUSApprovalRx\t100\t2\n"));
    assert!(text.contains(
        "findOrphans\tDrugBank, July 2018|approved\tDB01050\t\tDB01050\tDrugBank, July 2018\t|approved\tIbuprofen\n"
    ));

    let table = fs::read_to_string(&status).unwrap();
    assert_eq!(
        table,
        "unii\tname\tHighestStatus\tstitch\trank\tuniis\n\
         WK2XYI10QM\tIBUPROFEN\tUSApprovalRx\t100\t2\tRM1CE97Z4N|WK2XYI10QM\n"
    );
}

#[test]
fn dump_then_apply() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("curations.tsv");
    let page = json!({"contents": [
        {"id": 7, "source": "G-SRS", "datasource": "gsrs", "_CURATION": [
            "{\"_uri\": \"/api/node/7/@update\", \"_timestamp\": 20, \"step\": 2}",
            "{\"_uri\": \"/api/node/7/@update\", \"_timestamp\": 10, \"step\": 1}"
        ]}
    ]});

    let config = CurationConfig {
        site: Site::parse("http://stitcher.local:8080").unwrap(),
        file: Some(dump.clone()),
        ..CurationConfig::default()
    };
    let summary =
        run_dump_with(&config, &ProgressContext::hidden(), Canned::new(vec![page])).unwrap();
    assert_eq!(summary.entities, 1);
    assert_eq!(summary.curations, 2);

    let mut posted = Vec::new();
    let applied = run_apply_with(&config, |url, body| {
        posted.push((url.to_string(), body["step"].clone()));
        Ok("ok".into())
    })
    .unwrap();
    assert_eq!(applied.applied, 2);
    assert_eq!(
        posted,
        vec![
            ("http://stitcher.local:8080/api/node/7/@update".to_string(), json!(1)),
            ("http://stitcher.local:8080/api/node/7/@update".to_string(), json!(2)),
        ]
    );
}

#[test]
fn permute_swaps_collected_uniis() {
    let config = PermuteConfig {
        site: Site::parse("local").unwrap(),
        first: 100,
        count: 3,
        source: "DrugBank, December 2018".into(),
        ..PermuteConfig::default()
    };
    let member = |id: &str, unii: &str| {
        json!({"id": 1, "sgroup": {"members": [
            {"node": 1, "id": id, "source": "DrugBank, December 2018", "stitches": {"I_UNII": unii}}
        ]}})
    };
    let mut fetched = Vec::new();
    let mut posted = Vec::new();
    let summary = run_permute_with(
        &config,
        |url| {
            fetched.push(url.to_string());
            match url.rsplit('/').next() {
                Some("DB00100") => Ok(member("DB00100", "AAAAAAAAAA")),
                Some("DB00101") => Ok(member("DB00101", "BBBBBBBBBB")),
                _ => Err(FetchError::Http {
                    status: Some(404),
                    message: "not found".into(),
                }),
            }
        },
        |url, body| {
            posted.push((url.to_string(), body["value"].clone()));
            Ok(r#"{"status": "success", "statusMessage": "unii updated"}"#.into())
        },
    )
    .unwrap();

    assert_eq!(fetched.len(), 3);
    assert_eq!(fetched[0], "http://localhost:8080/api/stitches/latest/DB00100");
    assert_eq!(summary.entities, 2);
    assert_eq!(summary.posted, 2);
    assert_eq!(summary.messages["unii updated"], vec!["DB00100:DB00101", "DB00101:DB00100"]);
    assert_eq!(
        posted[0],
        (
            "http://localhost:8080/api/stitches/latest/DB00100/@testupdate".to_string(),
            json!("BBBBBBBBBB")
        )
    );
}

#[test]
#[ignore = "requires network"]
fn live_stitch_page() {
    let site = Site::parse("prod").unwrap();
    let walker = stitchkit_stitcher::PageWalker::new(site).max_records(10);
    let mut n = 0;
    walker.walk("api/stitches/v1", |_| n += 1);
    assert!(n > 0);
}
