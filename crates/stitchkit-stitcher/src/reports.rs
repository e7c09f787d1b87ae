//! Regression reports over the full stitch set
//!
//! Each report sees every stitch once and ends up with rows keyed by a UNII,
//! name or source tag. Rows are emitted in key order.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use rustc_hash::FxHashSet;

use crate::stitch::{Event, Stitch, get_name};

pub type Rows = BTreeMap<String, Vec<String>>;

/// Approval kinds that make a stitch "approved"
pub const APPROVAL_KINDS: &[&str] = &["USApprovalRx", "USPreviouslyMarketed"];

pub trait StitchReport {
    /// Report tag, first column of every output row
    fn name(&self) -> &str;
    /// Column titles after the tag
    fn header(&self) -> &str;
    fn observe(&mut self, stitch: &Stitch);
    fn rows(&self) -> Rows;

    /// Side table written next to the report. Returns `false` when the
    /// report has none.
    fn write_table(&self, _w: &mut dyn Write) -> io::Result<bool> {
        Ok(false)
    }
}

/// A table cell with tabs and line breaks flattened to spaces.
fn cell(text: &str) -> String {
    text.replace(['\t', '\r', '\n'], " ")
}

/// Kind of the event named by `highestPhase`, else the phase id itself.
fn phase_status(stitch: &Stitch) -> Option<String> {
    let phase = stitch.highest_phase.as_deref()?;
    Some(
        stitch
            .event(phase)
            .and_then(Event::kind)
            .unwrap_or_else(|| phase.to_string()),
    )
}

/// `id` or `name` of the parent member, empty (and logged) when missing.
fn parent_label(stitch: &Stitch) -> String {
    match stitch.parent_member().and_then(|m| m.label()) {
        Some(label) => label.to_string(),
        None => {
            log::warn!("failed parent node: {} in stitch {}", stitch.sgroup.parent, stitch.id);
            String::new()
        }
    }
}

/// `[key, stitch id, rank, others...]` when more than one entry was collected.
fn clash_row(rows: &mut Rows, stitch: &Stitch, mut entries: Vec<String>) {
    if entries.len() < 2 {
        return;
    }
    entries.sort();
    let key = entries.remove(0);
    let mut row = vec![stitch.id.clone(), stitch.rank.to_string()];
    row.extend(entries);
    rows.insert(key, row);
}

/// UNIIs claimed by more than one stitch: merge candidates.
#[derive(Default)]
pub struct UniiClashes {
    stitches: BTreeMap<String, Vec<String>>,
}

impl StitchReport for UniiClashes {
    fn name(&self) -> &str {
        "uniiClashes"
    }

    fn header(&self) -> &str {
        "UNII\tPN\tStitch Node 1\tStitch Node 2\tetc."
    }

    fn observe(&mut self, stitch: &Stitch) {
        for member in &stitch.sgroup.members {
            for unii in member.stitch_values("I_UNII") {
                let ids = self.stitches.entry(unii).or_default();
                if !ids.contains(&stitch.id) {
                    ids.push(stitch.id.clone());
                }
            }
        }
    }

    fn rows(&self) -> Rows {
        self.stitches
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Stitches whose highest phase is a US approval, with the approval date
/// and the G-SRS ingredient that best matches the approval event.
pub struct ApprovedStitches {
    gsrs_prefix: String,
    rows: Rows,
}

impl ApprovedStitches {
    pub fn new(gsrs_prefix: &str) -> Self {
        Self {
            gsrs_prefix: gsrs_prefix.to_string(),
            rows: Rows::new(),
        }
    }
}

impl StitchReport for ApprovedStitches {
    fn name(&self) -> &str {
        "approvedStitches"
    }

    fn header(&self) -> &str {
        "UNII\tUNII PN\tYear\tStitch\tStitch Rank\tNode PN\tNode UNII\tUNII PN\tStatus"
    }

    fn observe(&mut self, stitch: &Stitch) {
        let Some(kind) = stitch
            .highest_event()
            .and_then(|e| e.kind())
            .filter(|k| APPROVAL_KINDS.contains(&k.as_str()))
        else {
            return;
        };
        let approval = stitch
            .initially_marketed()
            .or(stitch.highest_phase.as_deref())
            .unwrap_or_default();

        let unii = stitch
            .parent_member()
            .and_then(|m| m.label())
            .unwrap_or_default()
            .to_string();

        let mut date = String::new();
        let mut approval_unii = unii.clone();
        if let Some(event) = stitch.event(approval) {
            date = event.start_date().unwrap_or_else(|| "unknown".to_string());
            let mut best = 0;
            for member in &stitch.sgroup.members {
                if !member.source.starts_with(&self.gsrs_prefix) {
                    continue;
                }
                let Some(id) = &member.id else { continue };
                for data in &member.data {
                    let shared = event.shared_values(data);
                    if shared > best {
                        best = shared;
                        approval_unii = id.clone();
                    }
                }
            }
        }

        self.rows.insert(
            unii,
            vec![
                date,
                stitch.sgroup.parent.clone(),
                stitch.rank.to_string(),
                get_name(stitch),
                approval_unii,
                kind,
            ],
        );
    }

    fn rows(&self) -> Rows {
        self.rows.clone()
    }
}

/// One row per stitch with a known development status, keyed by parent UNII.
pub struct HighestStatus {
    full: bool,
    gsrs_prefix: String,
    rows: Rows,
    /// parent UNII -> all G-SRS UNIIs of its stitch
    clusters: BTreeMap<String, BTreeSet<String>>,
}

impl HighestStatus {
    pub fn new(full: bool, gsrs_prefix: &str) -> Self {
        Self {
            full,
            gsrs_prefix: gsrs_prefix.to_string(),
            rows: Rows::new(),
            clusters: BTreeMap::new(),
        }
    }
}

impl StitchReport for HighestStatus {
    fn name(&self) -> &str {
        "highestStatus"
    }

    fn header(&self) -> &str {
        if self.full {
            "UNII\tUNII PN\tNode PN\tStatus\tStitch\tStitch Rank\tProduct\tStart Date\tURL"
        } else {
            "UNII\tUNII PN\tNode PN\tStatus\tStitch\tStitch Rank"
        }
    }

    fn observe(&mut self, stitch: &Stitch) {
        let Some(status) = phase_status(stitch).filter(|s| s != "Other") else {
            return;
        };
        let event = stitch.highest_event();
        let unii = parent_label(stitch);

        let mut row = vec![
            get_name(stitch),
            status,
            stitch.id.clone(),
            stitch.rank.to_string(),
        ];
        if self.full {
            let field = |f: fn(&Event) -> Option<String>| event.and_then(f).unwrap_or_default();
            row.push(field(Event::id));
            row.push(field(Event::start_date));
            row.push(field(Event::url));
        }

        let cluster = stitch
            .sgroup
            .members
            .iter()
            .filter(|m| m.source.starts_with(&self.gsrs_prefix))
            .flat_map(|m| m.id.clone().into_iter().chain(m.stitch_values("I_UNII")))
            .collect();
        self.clusters.insert(unii.clone(), cluster);
        self.rows.insert(unii, row);
    }

    fn rows(&self) -> Rows {
        self.rows.clone()
    }

    /// `unii, name, HighestStatus, stitch, rank, uniis` rows for the diff job.
    fn write_table(&self, w: &mut dyn Write) -> io::Result<bool> {
        writeln!(w, "unii\tname\tHighestStatus\tstitch\trank\tuniis")?;
        for (unii, row) in &self.rows {
            let cluster: Vec<&str> = self
                .clusters
                .get(unii)
                .map(|c| c.iter().map(String::as_str).collect())
                .unwrap_or_default();
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                cell(unii),
                cell(&row[0]),
                cell(&row[1]),
                row[2],
                row[3],
                cluster.join("|")
            )?;
        }
        Ok(true)
    }
}

/// Highest status per parent UNII with generic approvals folded into `generic`.
#[derive(Default)]
pub struct CountGenerics {
    rows: Rows,
}

impl StitchReport for CountGenerics {
    fn name(&self) -> &str {
        "countGenerics"
    }

    fn header(&self) -> &str {
        "UNII\tPN\tNode PN\tStatus\tStitch\tStitch Rank"
    }

    fn observe(&mut self, stitch: &Stitch) {
        let status = if stitch.events.iter().any(Event::is_generic) {
            "generic".to_string()
        } else {
            phase_status(stitch).unwrap_or_else(|| "Other".to_string())
        };
        if status == "Other" {
            return;
        }
        self.rows.insert(
            parent_label(stitch),
            vec![get_name(stitch), status, stitch.id.clone(), stitch.rank.to_string()],
        );
    }

    fn rows(&self) -> Rows {
        self.rows.clone()
    }
}

/// More than one UNII from an NME list inside a single stitch.
pub struct NmeClashes {
    name: String,
    gsrs_prefix: String,
    nmes: FxHashSet<String>,
    rows: Rows,
}

impl NmeClashes {
    pub fn new(name: &str, gsrs_prefix: &str, nmes: FxHashSet<String>) -> Self {
        Self {
            name: name.to_string(),
            gsrs_prefix: gsrs_prefix.to_string(),
            nmes,
            rows: Rows::new(),
        }
    }
}

impl StitchReport for NmeClashes {
    fn name(&self) -> &str {
        &self.name
    }

    fn header(&self) -> &str {
        "UNII\tPN\tStitch Node\tStitch Rank\tClash UNII 1\tClash PN 1\tClash UNII 2\tClash PN 2\tetc."
    }

    fn observe(&mut self, stitch: &Stitch) {
        let entries = stitch
            .sgroup
            .members
            .iter()
            .filter(|m| m.source.starts_with(&self.gsrs_prefix))
            .filter_map(|m| m.id.clone())
            .filter(|id| self.nmes.contains(id))
            .collect();
        clash_row(&mut self.rows, stitch, entries);
    }

    fn rows(&self) -> Rows {
        self.rows.clone()
    }
}

/// More than one member from one source inside a single stitch (PME, DrugBank).
pub struct SourceClashes {
    name: String,
    source: String,
    rows: Rows,
}

impl SourceClashes {
    pub fn new(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            rows: Rows::new(),
        }
    }
}

impl StitchReport for SourceClashes {
    fn name(&self) -> &str {
        &self.name
    }

    fn header(&self) -> &str {
        "Ingredient\t[Blank]\tStitch Node\tStitch Rank\tClash Ingredient 1\tClash Ingredient 2\tetc."
    }

    fn observe(&mut self, stitch: &Stitch) {
        let entries = stitch
            .sgroup
            .members
            .iter()
            .filter(|m| m.source == self.source)
            .filter_map(|m| m.name.clone())
            .collect();
        clash_row(&mut self.rows, stitch, entries);
    }

    fn rows(&self) -> Rows {
        self.rows.clone()
    }
}

/// G-SRS members listing several active moieties, one of them themselves.
pub struct ActiveMoietyClashes {
    gsrs_prefix: String,
    rows: Rows,
}

impl ActiveMoietyClashes {
    pub fn new(gsrs_prefix: &str) -> Self {
        Self {
            gsrs_prefix: gsrs_prefix.to_string(),
            rows: Rows::new(),
        }
    }
}

impl StitchReport for ActiveMoietyClashes {
    fn name(&self) -> &str {
        "activemoietyClashes"
    }

    fn header(&self) -> &str {
        "UNII\tPN\tStitch Node\tStitch Rank\tClash UNII 1\tClash PN 1\tClash UNII 2\tClash PN 2\tetc."
    }

    fn observe(&mut self, stitch: &Stitch) {
        let mut entries: Vec<String> = Vec::new();
        for member in &stitch.sgroup.members {
            if !member.source.starts_with(&self.gsrs_prefix) {
                continue;
            }
            // scalar values are the single-moiety case
            let Some(serde_json::Value::Array(_)) = member.stitches.get("R_activeMoiety") else {
                continue;
            };
            let moieties = member.stitch_values("R_activeMoiety");
            let lists_self = member.id.as_ref().is_some_and(|id| moieties.contains(id));
            if moieties.len() > 1 && lists_self {
                for moiety in moieties {
                    if !entries.contains(&moiety) {
                        entries.push(moiety);
                    }
                }
            }
        }
        clash_row(&mut self.rows, stitch, entries);
    }

    fn rows(&self) -> Rows {
        self.rows.clone()
    }
}

/// Rank-1 stitches made of a single record from a source that should
/// always have stitched to something.
pub struct FindOrphans {
    sources: Vec<String>,
    rows: Rows,
}

impl FindOrphans {
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            sources,
            rows: Rows::new(),
        }
    }
}

impl StitchReport for FindOrphans {
    fn name(&self) -> &str {
        "findOrphans"
    }

    fn header(&self) -> &str {
        "Source|Status\tIngredient\tSource\tStatus"
    }

    fn observe(&mut self, stitch: &Stitch) {
        if stitch.rank != 1 {
            return;
        }
        let Some(node) = stitch.sgroup.members.first() else {
            return;
        };
        if !self.sources.iter().any(|s| node.source.starts_with(s.as_str())) {
            return;
        }
        let id = node.label().unwrap_or_default().to_string();
        let mut name = node.name.clone().unwrap_or_default();
        let source = node.source.as_str();

        let status = if source.starts_with("Broad Institute") {
            stitch
                .property_values("status")
                .first()
                .map(|s| format!("|{s}"))
                .unwrap_or_default()
        } else if source.starts_with("DrugBank") {
            stitch
                .property_values("groups")
                .iter()
                .map(|g| format!("|{g}"))
                .collect()
        } else if source.starts_with("NCATS Pharmaceutical Collection") {
            if let Some(n) = stitch.property_values("name").into_iter().next() {
                name = n;
            }
            let mut sets = stitch.property_values("DATASET");
            sets.sort();
            sets.join("|")
        } else if source.starts_with("Rancho") && stitch.sgroup.properties.contains_key("Conditions") {
            "|has_conditions".to_string()
        } else {
            String::new()
        };

        self.rows.insert(
            format!("{source}{status}\t{id}"),
            vec![id, source.to_string(), status, name],
        );
    }

    fn rows(&self) -> Rows {
        self.rows.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GSRS: &str = "G-SRS";

    fn stitch(v: serde_json::Value) -> Stitch {
        serde_json::from_value(v).unwrap()
    }

    fn approved() -> Stitch {
        stitch(json!({
            "id": 10, "rank": 3,
            "highestPhase": "p2",
            "initiallyMarketedUS": "p1",
            "events": [
                {"id": "p1", "kind": "USApprovalRx", "startDate": "1982-05-01", "NDA": "N018207"},
                {"id": "p2", "kind": "USApprovalRx"}
            ],
            "sgroup": {
                "parent": 1,
                "members": [
                    {"node": 1, "id": "PARENTUNII", "name": "IBUPROFEN", "source": "G-SRS, April 2020",
                     "stitches": {"I_UNII": "PARENTUNII"}},
                    {"node": 2, "id": "SALTUNII01", "source": "G-SRS, April 2020",
                     "stitches": {"I_UNII": ["SALTUNII01"]},
                     "data": [{"NDA": "N018207", "startDate": "1982-05-01"}]}
                ]
            }
        }))
    }

    #[test]
    fn unii_clash_needs_two_stitches() {
        let mut report = UniiClashes::default();
        let a = stitch(json!({"id": 1, "sgroup": {"members": [
            {"node": 1, "stitches": {"I_UNII": "AAAAAAAAAA"}},
            {"node": 2, "stitches": {"I_UNII": ["AAAAAAAAAA", "BBBBBBBBBB"]}}
        ]}}));
        let b = stitch(json!({"id": 2, "sgroup": {"members": [
            {"node": 3, "stitches": {"I_UNII": ["BBBBBBBBBB"]}}
        ]}}));
        report.observe(&a);
        report.observe(&b);
        let rows = report.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows["BBBBBBBBBB"], vec!["1", "2"]);
    }

    #[test]
    fn approved_picks_best_matching_ingredient() {
        let mut report = ApprovedStitches::new(GSRS);
        report.observe(&approved());
        let rows = report.rows();
        assert_eq!(
            rows["PARENTUNII"],
            vec!["1982-05-01", "1", "3", "IBUPROFEN", "SALTUNII01", "USApprovalRx"]
        );
    }

    #[test]
    fn unapproved_stitch_skipped() {
        let mut report = ApprovedStitches::new(GSRS);
        report.observe(&stitch(json!({
            "id": 1, "highestPhase": "e",
            "events": [{"id": "e", "kind": "Phase III"}],
            "sgroup": {"parent": 1, "members": [{"node": 1, "id": "X"}]}
        })));
        assert!(report.rows().is_empty());
    }

    #[test]
    fn highest_status_full_row_and_cluster() {
        let mut report = HighestStatus::new(true, GSRS);
        report.observe(&approved());
        let rows = report.rows();
        assert_eq!(
            rows["PARENTUNII"],
            vec!["IBUPROFEN", "USApprovalRx", "10", "3", "p2", "", ""]
        );
        let mut out: Vec<u8> = Vec::new();
        assert!(report.write_table(&mut out).unwrap());
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("PARENTUNII\tIBUPROFEN\tUSApprovalRx\t10\t3\tPARENTUNII|SALTUNII01\n"));
    }

    #[test]
    fn unmatched_phase_becomes_status() {
        let mut report = HighestStatus::new(false, GSRS);
        report.observe(&stitch(json!({
            "id": 4, "rank": 1, "highestPhase": "Phase II",
            "events": [{"id": "other", "kind": "USApprovalRx"}],
            "sgroup": {"parent": 1, "members": [{"node": 1, "id": "AAAAAAAAAA", "name": "A"}]}
        })));
        report.observe(&stitch(json!({
            "id": 5, "rank": 1, "highestPhase": "Other",
            "sgroup": {"parent": 2, "members": [{"node": 2, "id": "BBBBBBBBBB"}]}
        })));
        let rows = report.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows["AAAAAAAAAA"], vec!["A", "Phase II", "4", "1"]);
    }

    #[test]
    fn status_table_flattens_tabs_in_names() {
        let mut report = HighestStatus::new(false, GSRS);
        report.observe(&stitch(json!({
            "id": 6, "rank": 2, "highestPhase": "e",
            "events": [{"id": "e", "kind": "USApprovalRx"}],
            "sgroup": {"parent": 1, "members": [
                {"node": 1, "id": "AAAAAAAAAA", "name": "FOO 5\" \tBAR\n", "source": "G-SRS, 2020"}
            ]}
        })));
        let mut out: Vec<u8> = Vec::new();
        report.write_table(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("AAAAAAAAAA\tFOO 5\"  BAR \tUSApprovalRx\t6\t2\tAAAAAAAAAA\n"));
    }

    #[test]
    fn generics_counted_from_anda_and_otc() {
        let mut report = CountGenerics::default();
        let with_events = |id: u32, unii: &str, events: serde_json::Value| {
            stitch(json!({
                "id": id, "rank": 1, "highestPhase": "e1", "events": events,
                "sgroup": {"parent": id, "members": [{"node": id, "id": unii, "name": unii}]}
            }))
        };
        report.observe(&with_events(1, "AAAAAAAAAA", json!([
            {"id": "e1", "kind": "USApprovalRx", "approvalAppId": "NDA012345"},
            {"id": "e2", "kind": "USApprovalRx", "marketingStatus": "ANDA"}
        ])));
        report.observe(&with_events(2, "BBBBBBBBBB", json!([
            {"id": "e1", "kind": "USApprovalOTC"}
        ])));
        report.observe(&with_events(3, "CCCCCCCCCC", json!([
            {"id": "e1", "kind": "USApprovalRx", "approvalAppId": "NDA000001"}
        ])));
        report.observe(&with_events(4, "DDDDDDDDDD", json!([{"id": "e1", "kind": "Other"}])));
        let rows = report.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows["AAAAAAAAAA"][1], "generic");
        assert_eq!(rows["BBBBBBBBBB"][1], "generic");
        assert_eq!(rows["CCCCCCCCCC"], vec!["CCCCCCCCCC", "USApprovalRx", "3", "1"]);
    }

    #[test]
    fn nme_clash_row_layout() {
        let nmes = ["SALTUNII01", "PARENTUNII"].iter().map(|s| s.to_string()).collect();
        let mut report = NmeClashes::new("nmeClashes", GSRS, nmes);
        report.observe(&approved());
        assert_eq!(report.rows()["PARENTUNII"], vec!["10", "3", "SALTUNII01"]);
    }

    #[test]
    fn source_clash_by_member_name() {
        let pme = "Pharmaceutical Manufacturing Encyclopedia (Third Edition)";
        let mut report = SourceClashes::new("PMEClashes", pme);
        report.observe(&stitch(json!({"id": 5, "rank": 2, "sgroup": {"members": [
            {"node": 1, "name": "ZETA", "source": pme},
            {"node": 2, "name": "ALPHA", "source": pme},
            {"node": 3, "name": "OTHER", "source": "DrugBank"}
        ]}})));
        assert_eq!(report.rows()["ALPHA"], vec!["5", "2", "ZETA"]);
    }

    #[test]
    fn active_moiety_must_list_self() {
        let mut report = ActiveMoietyClashes::new(GSRS);
        report.observe(&stitch(json!({"id": 7, "rank": 1, "sgroup": {"members": [
            {"node": 1, "id": "AAAAAAAAAA", "source": "G-SRS",
             "stitches": {"R_activeMoiety": ["BBBBBBBBBB", "AAAAAAAAAA"]}},
            {"node": 2, "id": "CCCCCCCCCC", "source": "G-SRS",
             "stitches": {"R_activeMoiety": ["DDDDDDDDDD", "EEEEEEEEEE"]}}
        ]}})));
        assert_eq!(report.rows()["AAAAAAAAAA"], vec!["7", "1", "BBBBBBBBBB"]);
    }

    #[test]
    fn orphan_sources_match_by_prefix() {
        let mut report = FindOrphans::new(vec!["DrugBank".into()]);
        report.observe(&stitch(json!({"id": 1, "rank": 1, "sgroup": {
            "members": [{"node": 1, "id": "DB00002", "source": "DrugBank, December 2018"}]
        }})));
        let rows = report.rows();
        assert_eq!(rows.len(), 1);
        assert!(rows.contains_key("DrugBank, December 2018\tDB00002"));
    }

    #[test]
    fn orphan_status_decorations() {
        let drugbank = "DrugBank, July 2018";
        let npc = "NCATS Pharmaceutical Collection, April 2012";
        let mut report = FindOrphans::new(vec![drugbank.into(), npc.into()]);
        report.observe(&stitch(json!({"id": 1, "rank": 1, "sgroup": {
            "members": [{"node": 1, "id": "DB00001", "name": "Lepirudin", "source": drugbank}],
            "properties": {"groups": [{"value": "approved"}, {"value": "withdrawn"}]}
        }})));
        report.observe(&stitch(json!({"id": 2, "rank": 1, "sgroup": {
            "members": [{"node": 2, "name": "NPC-1", "source": npc}],
            "properties": {"DATASET": [{"value": "Japan"}, {"value": "FDA"}], "name": {"value": "Better"}}
        }})));
        report.observe(&stitch(json!({"id": 3, "rank": 2, "sgroup": {
            "members": [{"node": 3, "id": "DB2", "source": drugbank}]
        }})));
        report.observe(&stitch(json!({"id": 4, "rank": 1, "sgroup": {
            "members": [{"node": 4, "id": "X", "source": "ChEMBL"}]
        }})));
        let rows = report.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[&format!("{drugbank}|approved|withdrawn\tDB00001")],
            vec!["DB00001", drugbank, "|approved|withdrawn", "Lepirudin"]
        );
        assert_eq!(
            rows[&format!("{npc}FDA|Japan\tNPC-1")],
            vec!["NPC-1", npc, "FDA|Japan", "Better"]
        );
    }
}
