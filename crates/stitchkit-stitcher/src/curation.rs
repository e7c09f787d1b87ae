//! Curation dump and replay
//!
//! A dump line is `id\tsource\tdatasource\tjson`, one per curation, in
//! `_timestamp` order within each entity. Replay POSTs the JSON back to the
//! URI it was recorded against. Permutation posts synthetic UNII swaps to the
//! test-update endpoint to exercise the curation checks.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use serde_json::{Map, Value, json};
use stitchkit_core::FetchError;

use crate::error::StitcherError;
use crate::site::Site;
use crate::stitch::{Stitch, value_text};
use crate::walker::{PageSource, PageWalker, WalkSummary};

pub const CURATIONS_PATH: &str = "api/curations";
/// Current stitch of one entity: `{LATEST_PATH}/{id}`
pub const LATEST_PATH: &str = "api/stitches/latest";

/// `_CURATION` entries of one entity, oldest first.
///
/// Entries are JSON strings; ones without a readable `_timestamp` sort first and are kept.
pub fn sorted_curations(entity: &Value) -> Vec<String> {
    let mut entries: Vec<(i64, String)> = entity
        .get("_CURATION")
        .map(|c| -> Vec<String> { match c {
            Value::Array(items) => items.iter().filter_map(value_text).collect(),
            other => value_text(other).into_iter().collect(),
        }})
        .unwrap_or_default()
        .into_iter()
        .map(|json: String| {
            let stamp = serde_json::from_str::<Value>(&json)
                .ok()
                .and_then(|v| {
                    let stamp = v.get("_timestamp")?;
                    stamp.as_i64().or_else(|| value_text(stamp)?.parse().ok())
                })
                .unwrap_or_default();
            (stamp, json)
        })
        .collect();
    entries.sort_by_key(|(stamp, _)| *stamp);
    entries.into_iter().map(|(_, json)| json).collect()
}

/// Walk every curated entity and write its curations.
pub fn dump<S: PageSource, W: Write>(
    walker: &PageWalker<S>,
    mut w: W,
) -> Result<(WalkSummary, usize), StitcherError> {
    let mut written = 0;
    let mut result = Ok(());
    let summary = walker.walk(CURATIONS_PATH, |entity| {
        if result.is_err() {
            return;
        }
        let field = |k: &str| entity.get(k).and_then(value_text).unwrap_or_default();
        let (id, source, datasource) = (field("id"), field("source"), field("datasource"));
        for json in sorted_curations(entity) {
            let line = json.replace(['\t', '\n'], " ");
            if let Err(e) = writeln!(w, "{id}\t{source}\t{datasource}\t{line}") {
                result = Err(e);
                return;
            }
            written += 1;
        }
    });
    result?;
    Ok((summary, written))
}

/// Target URI and POST body of one dump line.
///
/// The JSON is the last tab-separated field; `_`-prefixed bookkeeping keys
/// are dropped from the body.
pub fn prepare_curation(line: &str) -> Result<(String, Value), String> {
    let json = line.rsplit('\t').next().unwrap_or(line);
    let value: Value = serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
    let Value::Object(map) = value else {
        return Err("curation is not a JSON object".into());
    };
    let uri = map
        .get("_uri")
        .and_then(value_text)
        .ok_or_else(|| "missing _uri".to_string())?;
    let body: Map<String, Value> = map.into_iter().filter(|(k, _)| !k.starts_with('_')).collect();
    Ok((uri, Value::Object(body)))
}

/// POST every curation in a dump to `site`. The first failure aborts.
pub fn apply<R: BufRead>(
    site: &Site,
    reader: R,
    mut post: impl FnMut(&str, &Value) -> Result<String, FetchError>,
) -> Result<usize, StitcherError> {
    let base = site.base().trim_end_matches('/');
    let mut applied = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (uri, body) =
            prepare_curation(&line).map_err(|message| StitcherError::Curation { line: i + 1, message })?;
        let url = format!("{base}{uri}");
        log::debug!("POST {url}");
        let response = post(&url, &body)?;
        log::debug!("{response}");
        applied += 1;
    }
    Ok(applied)
}

/// URI and body of a property edit on `node`, aimed at the test-update endpoint.
///
/// An empty new value is a `remove`, an empty old value an `add`, anything
/// else a `replace`.
pub fn property_curation(
    node: &str,
    source: &str,
    key: &str,
    old: &str,
    value: &str,
) -> (String, Value) {
    let operation = if value.is_empty() {
        "remove"
    } else if old.is_empty() {
        "add"
    } else {
        "replace"
    };
    let body = json!({
        "stitches": node,
        "nodeSource": source,
        "nodeId": node,
        "jsonPath": format!("$['properties'][?(@['key']=='{key}' )]['value']"),
        "operation": operation,
        "oldValue": (!old.is_empty()).then_some(old),
        "value": (!value.is_empty()).then_some(value),
    });
    (format!("/{LATEST_PATH}/{node}/@testupdate"), body)
}

/// Last `I_UNII` stitched on member `id` from `source`.
pub fn member_unii(stitch: &Stitch, id: &str, source: &str) -> Option<String> {
    stitch
        .sgroup
        .members
        .iter()
        .filter(|m| m.source == source && m.id.as_deref() == Some(id))
        .flat_map(|m| m.stitch_values("I_UNII"))
        .last()
}

/// Responses to a permutation run.
#[derive(Debug, Default)]
pub struct PermuteTally {
    pub posted: usize,
    /// `statusMessage` -> `from:to` pairs that received it
    pub messages: BTreeMap<String, Vec<String>>,
}

/// Post a UNII swap for every ordered pair of entities whose UNIIs differ.
///
/// Successful responses are tallied by `statusMessage`. A response with a
/// message and any other `status` aborts the run.
pub fn permute(
    site: &Site,
    uniis: &BTreeMap<String, String>,
    source: &str,
    mut post: impl FnMut(&str, &Value) -> Result<String, FetchError>,
) -> Result<PermuteTally, StitcherError> {
    let mut tally = PermuteTally::default();
    for (from, old) in uniis {
        for (to, value) in uniis {
            if from == to || old == value {
                continue;
            }
            let (uri, body) = property_curation(from, source, "unii", old, value);
            let response = post(&site.url(&uri), &body)?;
            tally.posted += 1;
            let reply: Value = serde_json::from_str(&response).map_err(FetchError::from)?;
            let Some(message) = reply.get("statusMessage").and_then(value_text) else {
                continue;
            };
            let pair = format!("{from}:{to}");
            if reply.get("status").and_then(value_text).as_deref() != Some("success") {
                return Err(StitcherError::Rejected { pair, message });
            }
            tally.messages.entry(message).or_default().push(pair);
        }
    }
    Ok(tally)
}
