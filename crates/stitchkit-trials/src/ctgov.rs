//! ClinicalTrials.gov classic study XML (`NCTxxxxxxxx.xml`) using quick-xml

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

pub const STUDY_URL: &str = "https://clinicaltrials.gov/ct2/show/";

/// The study fields used for trial tagging. Absent elements are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrialRecord {
    pub nct_id: String,
    pub url: String,
    /// First `<condition>`
    pub condition: String,
    /// First `<condition_browse><mesh_term>`
    pub mesh_condition: String,
    pub phase: String,
    pub status: String,
    pub study_type: String,
    pub start_date: String,
    /// `type` of the start date when it is not `Actual`
    pub start_flag: String,
    pub completion_date: String,
    /// `type` of the (primary) completion date when it is not `Actual`
    pub completion_flag: String,
    pub primary_completion_date: String,
    pub last_update_submitted: String,
    pub title: String,
    /// `type: name` per intervention, joined by `; `
    pub interventions: String,
    /// `<nct_alias>`, a retired id pointing at this study
    pub alias: String,
}

/// Tabs and newlines to spaces, double quotes removed.
fn clean(text: &str) -> String {
    text.replace(['\t', '\n'], " ").replace('"', "")
}

fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(clean(&text))
}

fn type_attr(e: &BytesStart) -> String {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"type")
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
        .unwrap_or_default()
}

fn not_actual(kind: String) -> Option<String> {
    (!kind.is_empty() && kind != "Actual").then_some(kind)
}

/// Parse one study document.
pub fn parse_study(xml: &str) -> Result<TrialRecord> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"clinical_study" => break,
            Event::Start(e) => bail!(
                "not a clinical_study document (root <{}>)",
                String::from_utf8_lossy(e.name().as_ref())
            ),
            Event::Eof => bail!("empty study document"),
            _ => {}
        }
        buf.clear();
    }

    let mut record = TrialRecord::default();
    let mut interventions = Vec::new();
    let mut completion_flag = None;
    let mut primary_flag = None;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf).context("XML parse error")? {
            Event::Start(e) => match e.name().as_ref() {
                b"id_info" => parse_id_info(&mut reader, &mut record)?,
                b"brief_title" => record.title = read_text(&mut reader)?,
                b"phase" => record.phase = read_text(&mut reader)?,
                b"overall_status" => record.status = read_text(&mut reader)?,
                b"study_type" => record.study_type = read_text(&mut reader)?,
                b"last_update_submitted" => record.last_update_submitted = read_text(&mut reader)?,
                b"condition" => {
                    let condition = read_text(&mut reader)?;
                    if record.condition.is_empty() {
                        record.condition = condition;
                    }
                }
                b"start_date" => {
                    record.start_flag = not_actual(type_attr(&e)).unwrap_or_default();
                    record.start_date = read_text(&mut reader)?;
                }
                b"completion_date" => {
                    completion_flag = not_actual(type_attr(&e));
                    record.completion_date = read_text(&mut reader)?;
                }
                b"primary_completion_date" => {
                    primary_flag = not_actual(type_attr(&e));
                    record.primary_completion_date = read_text(&mut reader)?;
                }
                b"condition_browse" => {
                    let terms = parse_children(&mut reader, b"condition_browse", b"mesh_term")?;
                    if record.mesh_condition.is_empty() {
                        record.mesh_condition = terms.into_iter().next().unwrap_or_default();
                    }
                }
                b"intervention" => interventions.push(parse_intervention(&mut reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"clinical_study" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    if record.phase == "N/A" {
        record.phase = "Not Applicable".to_string();
    }
    record.completion_flag = primary_flag.or(completion_flag).unwrap_or_default();
    record.interventions = interventions.join("; ");
    if !record.nct_id.is_empty() {
        record.url = format!("{STUDY_URL}{}", record.nct_id);
    }
    Ok(record)
}

fn parse_id_info(reader: &mut Reader<&[u8]>, record: &mut TrialRecord) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"nct_id" => record.nct_id = read_text(reader)?,
                b"nct_alias" => {
                    let alias = read_text(reader)?;
                    if record.alias.is_empty() {
                        record.alias = alias;
                    }
                }
                _ => {
                    read_text(reader)?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"id_info" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// Text of every `child` element directly inside `parent`.
fn parse_children(reader: &mut Reader<&[u8]>, parent: &[u8], child: &[u8]) -> Result<Vec<String>> {
    let mut buf = Vec::new();
    let mut values = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == child => values.push(read_text(reader)?),
            Event::Start(_) => {
                read_text(reader)?;
            }
            Event::End(e) if e.name().as_ref() == parent => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(values)
}

fn parse_intervention(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut kind = String::new();
    let mut name = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"intervention_type" => kind = read_text(reader)?,
                b"intervention_name" => name = read_text(reader)?,
                _ => {
                    read_text(reader)?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"intervention" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(format!("{kind}: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<clinical_study rank="1">
  <required_header>
    <download_date>ClinicalTrials.gov processed this data on March 18, 2020</download_date>
    <url>https://clinicaltrials.gov/show/NCT00000102</url>
  </required_header>
  <id_info>
    <org_study_id>NCRR-M01RR01070-0506</org_study_id>
    <nct_id>NCT00000102</nct_id>
    <nct_alias>NCT00099999</nct_alias>
  </id_info>
  <brief_title>Congenital Adrenal Hyperplasia: Calcium Channels as "Therapeutic" Targets</brief_title>
  <overall_status>Completed</overall_status>
  <start_date type="Anticipated">July 1999</start_date>
  <completion_date type="Actual">March 2000</completion_date>
  <primary_completion_date type="Estimated">January 2000</primary_completion_date>
  <phase>Phase 1/Phase 2</phase>
  <study_type>Interventional</study_type>
  <condition>Adrenal Hyperplasia, Congenital</condition>
  <condition>Second Condition</condition>
  <intervention>
    <intervention_type>Drug</intervention_type>
    <intervention_name>Nifedipine</intervention_name>
    <other_name>Adalat</other_name>
  </intervention>
  <intervention>
    <intervention_type>Behavioral</intervention_type>
    <intervention_name>Diet	Plan</intervention_name>
  </intervention>
  <last_update_submitted>June 23, 2005</last_update_submitted>
  <condition_browse>
    <mesh_term>Adrenal Hyperplasia, Congenital</mesh_term>
    <mesh_term>Hyperplasia</mesh_term>
  </condition_browse>
</clinical_study>
"#;

    #[test]
    fn parses_study_fields() {
        let r = parse_study(STUDY).unwrap();
        assert_eq!(r.nct_id, "NCT00000102");
        assert_eq!(r.url, "https://clinicaltrials.gov/ct2/show/NCT00000102");
        assert_eq!(r.alias, "NCT00099999");
        assert_eq!(r.title, "Congenital Adrenal Hyperplasia: Calcium Channels as Therapeutic Targets");
        assert_eq!(r.status, "Completed");
        assert_eq!(r.phase, "Phase 1/Phase 2");
        assert_eq!(r.study_type, "Interventional");
        assert_eq!(r.condition, "Adrenal Hyperplasia, Congenital");
        assert_eq!(r.mesh_condition, "Adrenal Hyperplasia, Congenital");
        assert_eq!(r.last_update_submitted, "June 23, 2005");
    }

    #[test]
    fn date_flags() {
        let r = parse_study(STUDY).unwrap();
        assert_eq!(r.start_date, "July 1999");
        assert_eq!(r.start_flag, "Anticipated");
        assert_eq!(r.completion_date, "March 2000");
        assert_eq!(r.completion_flag, "Estimated");
    }

    #[test]
    fn interventions_joined_and_cleaned() {
        let r = parse_study(STUDY).unwrap();
        assert_eq!(r.interventions, "Drug: Nifedipine; Behavioral: Diet Plan");
    }

    #[test]
    fn phase_not_applicable() {
        let xml = "<clinical_study><id_info><nct_id>NCT1</nct_id></id_info><phase>N/A</phase></clinical_study>";
        let r = parse_study(xml).unwrap();
        assert_eq!(r.phase, "Not Applicable");
        assert!(r.condition.is_empty());
        assert!(r.start_flag.is_empty());
    }

    #[test]
    fn wrong_root_rejected() {
        assert!(parse_study("<PubmedArticleSet/>").is_err());
        assert!(parse_study("").is_err());
    }
}
