// src/record.rs
//
// Raw candidate records as the external extractors write them.
// Extractors disagree on field presence and types, so deserialization is lenient.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PatchType {
    Official,
    #[default]
    User,
}

impl PatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            PatchType::Official => "official",
            PatchType::User => "user",
        }
    }

    pub fn is_official(self) -> bool {
        self == PatchType::Official
    }
}

impl Serialize for PatchType {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

// Anything that is not literally "official" (missing, null, typos) is a user patch.
impl<'de> Deserialize<'de> for PatchType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Option::<Value>::deserialize(d)?;
        Ok(match v {
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("official") => PatchType::Official,
            _ => PatchType::User,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub game_title: String,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub steam_link: Option<String>,
    #[serde(default)]
    pub patch_type: PatchType,
    #[serde(default, deserialize_with = "de_string_list")]
    pub patch_links: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub patch_descriptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_site_url: Option<String>,
    // Legacy per-site fields some extractors still write instead of source_site_url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stove_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directg_url: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub qp_appid: Option<String>,
}

impl RawRecord {
    /// The page this record was listed on, first non-empty of
    /// `source_site_url`, `stove_url`, `directg_url`.
    pub fn site_url(&self) -> Option<&str> {
        [&self.source_site_url, &self.stove_url, &self.directg_url]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .map(str::trim)
            .find(|u| !u.is_empty())
    }

    /// Description paired with the link at `i`; missing ones are "".
    pub fn description_at(&self, i: usize) -> &str {
        self.patch_descriptions.get(i).map(String::as_str).unwrap_or("")
    }
}

/// Strings stay strings, numbers become their decimal text, anything else is absent.
fn de_opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn de_string_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(de_opt_id(d)?.unwrap_or_default())
}

// null entries inside the list become "" so link/description positions stay aligned
fn de_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let v = Option::<Vec<Value>>::deserialize(d)?;
    Ok(v.unwrap_or_default()
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            Value::Null => s!(),
            other => other.to_string(),
        })
        .collect())
}
