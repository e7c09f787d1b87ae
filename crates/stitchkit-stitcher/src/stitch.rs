//! Stitch records from `api/stitches/v1`
//!
//! Only the fields the reports read are typed. Ids arrive as numbers or
//! strings depending on the endpoint, so they are normalized to strings.
//! Member `stitches` values are a scalar or a list and are read through
//! [`Member::stitch_values`].

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// String form of a scalar JSON value. `null`, arrays and objects give `None`.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scalar or list of scalars as a list.
pub fn one_or_many(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_text).collect(),
        other => value_text(other).into_iter().collect(),
    }
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_text(&Value::deserialize(d)?).unwrap_or_default())
}

fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(value_text)
        .filter(|s| s != "null"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stitch {
    #[serde(deserialize_with = "text")]
    pub id: String,
    #[serde(default)]
    pub rank: i64,
    #[serde(rename = "highestPhase", default, deserialize_with = "opt_text")]
    pub highest_phase: Option<String>,
    #[serde(rename = "initiallyMarketedUS", default, deserialize_with = "opt_text")]
    pub initially_marketed_us: Option<String>,
    #[serde(rename = "initiallyMarketed", default, deserialize_with = "opt_text")]
    pub initially_marketed: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
    pub sgroup: SGroup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SGroup {
    #[serde(default, deserialize_with = "text")]
    pub parent: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default, deserialize_with = "text")]
    pub node: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub name: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub stitches: Map<String, Value>,
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
}

impl Member {
    /// Values stitched on `key` (`I_UNII`, `N_Name`, `R_activeMoiety`, ...).
    pub fn stitch_values(&self, key: &str) -> Vec<String> {
        self.stitches.get(key).map(one_or_many).unwrap_or_default()
    }

    /// `id`, else `name`.
    pub fn label(&self) -> Option<&str> {
        self.id.as_deref().or(self.name.as_deref())
    }
}

/// A dated event on a stitch (approval, marketing, trial phase).
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Event(pub Map<String, Value>);

impl Event {
    fn field(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(value_text)
    }

    pub fn id(&self) -> Option<String> {
        self.field("id")
    }

    pub fn kind(&self) -> Option<String> {
        self.field("kind")
    }

    pub fn start_date(&self) -> Option<String> {
        self.field("startDate")
    }

    pub fn url(&self) -> Option<String> {
        self.field("URL")
    }

    /// An OTC approval, or an Rx approval filed under an ANDA.
    pub fn is_generic(&self) -> bool {
        match self.kind().as_deref() {
            Some("USApprovalOTC") => true,
            Some("USApprovalRx") => ["approvalAppId", "marketingStatus"]
                .iter()
                .any(|k| self.field(k).is_some_and(|v| v.starts_with("ANDA"))),
            _ => false,
        }
    }

    /// Number of values this event shares with a member data record.
    pub fn shared_values(&self, data: &Map<String, Value>) -> usize {
        self.0
            .values()
            .map(|a| data.values().filter(|b| *b == a).count())
            .sum()
    }
}

impl Stitch {
    /// The event named by `highestPhase`.
    pub fn highest_event(&self) -> Option<&Event> {
        let phase = self.highest_phase.as_deref()?;
        self.event(phase)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id().as_deref() == Some(id))
    }

    /// Event id of the first US marketing, else first marketing anywhere.
    pub fn initially_marketed(&self) -> Option<&str> {
        self.initially_marketed_us
            .as_deref()
            .or(self.initially_marketed.as_deref())
    }

    /// The member record that is the stitch's parent node.
    pub fn parent_member(&self) -> Option<&Member> {
        self.sgroup
            .members
            .iter()
            .find(|m| m.node == self.sgroup.parent)
    }

    /// `value` fields of a property that is one `{value}` object or a list of them.
    pub fn property_values(&self, name: &str) -> Vec<String> {
        let value_of = |v: &Value| v.get("value").and_then(value_text);
        match self.sgroup.properties.get(name) {
            Some(Value::Array(items)) => items.iter().filter_map(value_of).collect(),
            Some(obj) => value_of(obj).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

/// Display name: first member name, else first `N_Name`, else the
/// `Synonyms` property, else the `unii` property.
pub fn get_name(stitch: &Stitch) -> String {
    for member in &stitch.sgroup.members {
        if let Some(name) = member.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        if let Some(name) = member.stitch_values("N_Name").into_iter().next() {
            return name;
        }
    }
    ["Synonyms", "unii"]
        .iter()
        .find_map(|p| stitch.property_values(p).into_iter().next())
        .unwrap_or_default()
}
