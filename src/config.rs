//! Per-target chart configuration and manifests

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Chart kind selected by a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    WinsLosses,
    Bar,
    SimpleBar,
    ModelComparison,
    RocCurves,
    HorizontalBar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::WinsLosses,
        ChartKind::Bar,
        ChartKind::SimpleBar,
        ChartKind::ModelComparison,
        ChartKind::RocCurves,
        ChartKind::HorizontalBar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::WinsLosses => "wins-losses",
            ChartKind::Bar => "bar",
            ChartKind::SimpleBar => "simple-bar",
            ChartKind::ModelComparison => "model-comparison",
            ChartKind::RocCurves => "roc-curves",
            ChartKind::HorizontalBar => "horizontal-bar",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidConfig(format!("Unknown chart kind: '{}'", s)))
    }
}

/// Sort direction for the sort/limit transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a direction; anything other than `asc` means descending
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

/// Typed view over a target's attribute map.
///
/// Attribute names are the camelCase keys used on the page (`labelCol`,
/// `sortDir`, ...). Blank attributes count as not set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartConfig {
    attributes: BTreeMap<String, String>,
}

/// Manifest attribute value; everything is kept in textual form
#[derive(Deserialize)]
#[serde(untagged)]
enum AttributeValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
    Unset,
}

impl AttributeValue {
    fn into_text(self) -> Option<String> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Integer(n) => Some(n.to_string()),
            AttributeValue::Float(n) => Some(n.to_string()),
            AttributeValue::Flag(b) => Some(b.to_string()),
            AttributeValue::Unset => None,
        }
    }
}

impl<'de> Deserialize<'de> for ChartConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, AttributeValue>::deserialize(deserializer)?;
        let attributes = raw
            .into_iter()
            .filter_map(|(key, value)| value.into_text().map(|text| (key, text)))
            .collect();
        Ok(Self { attributes })
    }
}

impl ChartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: BTreeMap<String, String>) -> Self {
        Self { attributes }
    }

    /// Builder-style setter, handy for tests and programmatic targets
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// A non-blank attribute value, trimmed
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether a key is present and non-blank
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Data source URL or path
    pub fn csv(&self) -> Option<&str> {
        self.get("csv")
    }

    pub fn label_col(&self) -> Option<&str> {
        self.get("labelCol")
    }

    pub fn season_col(&self) -> Option<&str> {
        self.get("seasonCol")
    }

    pub fn sort_col(&self) -> Option<&str> {
        self.get("sortCol")
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn sort_dir(&self) -> SortDirection {
        self.get("sortDir")
            .map(SortDirection::parse_lenient)
            .unwrap_or_default()
    }

    /// Row limit; 0 means unlimited
    pub fn limit(&self) -> usize {
        let Some(raw) = self.get("limit") else {
            return 0;
        };
        match raw.parse::<i64>() {
            Ok(n) if n > 0 => n as usize,
            Ok(_) => 0,
            Err(_) => {
                warn!("Ignoring non-integer limit '{}'", raw);
                0
            }
        }
    }

    /// Per-bar palette from the `colors` attribute (comma or semicolon separated)
    pub fn colors(&self) -> Vec<String> {
        self.get("colors")
            .map(|raw| {
                raw.split([',', ';'])
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One render destination plus its attached configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// Canvas id on the generated page
    pub id: String,
    /// Raw kind selector, validated when the target is rendered
    pub kind: String,
    /// Remaining attributes (`csv`, `labelCol`, ...)
    #[serde(flatten)]
    pub config: ChartConfig,
}

impl TargetDescriptor {
    pub fn new(id: impl Into<String>, kind: ChartKind, config: ChartConfig) -> Self {
        Self {
            id: id.into(),
            kind: kind.as_str().to_string(),
            config,
        }
    }

    pub fn chart_kind(&self) -> Result<ChartKind> {
        self.kind.parse()
    }
}

/// A JSON file listing render targets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Page title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Targets, rendered in this order on the page
    #[serde(default)]
    pub targets: Vec<TargetDescriptor>,
}

impl Manifest {
    /// Load a manifest from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let mut manifest: Self = serde_json::from_str(content)?;
        dedupe_ids(&mut manifest.targets);
        Ok(manifest)
    }
}

/// Make target ids unique.
///
/// The first occurrence of an id keeps it; later ones get the first free
/// `-2`, `-3`, ... suffix.
pub fn dedupe_ids(targets: &mut [TargetDescriptor]) {
    let mut taken: HashSet<String> = targets.iter().map(|t| t.id.clone()).collect();
    let mut seen = HashSet::new();

    for target in targets.iter_mut() {
        if seen.insert(target.id.clone()) {
            continue;
        }
        let unique = free_id(&target.id, &taken);
        warn!("Duplicate target id '{}', renamed to '{}'", target.id, unique);
        taken.insert(unique.clone());
        seen.insert(unique.clone());
        target.id = unique;
    }
}

/// First `{base}-N` (N >= 2) not in `taken`
pub(crate) fn free_id(base: &str, taken: &HashSet<String>) -> String {
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chart_kind_round_trip_names() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.as_str().parse::<ChartKind>().unwrap(), kind);
        }
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_sort_dir_defaults_to_desc() {
        assert_eq!(ChartConfig::new().sort_dir(), SortDirection::Desc);
        assert_eq!(ChartConfig::new().with("sortDir", "ASC").sort_dir(), SortDirection::Asc);
        assert_eq!(ChartConfig::new().with("sortDir", "sideways").sort_dir(), SortDirection::Desc);
    }

    #[test]
    fn test_limit_parsing() {
        assert_eq!(ChartConfig::new().limit(), 0);
        assert_eq!(ChartConfig::new().with("limit", "5").limit(), 5);
        assert_eq!(ChartConfig::new().with("limit", "-3").limit(), 0);
        assert_eq!(ChartConfig::new().with("limit", "ten").limit(), 0);
    }

    #[test]
    fn test_blank_attributes_are_unset() {
        let config = ChartConfig::new().with("seasonCol", "  ");
        assert_eq!(config.season_col(), None);
        assert!(!config.has("seasonCol"));
    }

    #[test]
    fn test_colors_list() {
        let config = ChartConfig::new().with("colors", "#111, #222;#333,,");
        assert_eq!(config.colors(), vec!["#111", "#222", "#333"]);
    }

    #[test]
    fn test_manifest_from_json() {
        let manifest = Manifest::from_json(
            r#"{
                "title": "League",
                "targets": [
                    { "id": "wins", "kind": "wins-losses", "csv": "teams.csv", "labelCol": "TEAM" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.title.as_deref(), Some("League"));
        let target = &manifest.targets[0];
        assert_eq!(target.id, "wins");
        assert_eq!(target.chart_kind().unwrap(), ChartKind::WinsLosses);
        assert_eq!(target.config.csv(), Some("teams.csv"));
        assert_eq!(target.config.label_col(), Some("TEAM"));
    }

    #[test]
    fn test_manifest_accepts_numbers_and_flags() {
        let manifest = Manifest::from_json(
            r#"{"targets": [{
                "id": "a", "kind": "bar", "csv": "x.csv", "labelCol": "T", "yCol": "W",
                "limit": 3, "ratio": 1.5, "stacked": true, "title": null
            }]}"#,
        )
        .unwrap();

        let config = &manifest.targets[0].config;
        assert_eq!(config.limit(), 3);
        assert_eq!(config.get("ratio"), Some("1.5"));
        assert_eq!(config.get("stacked"), Some("true"));
        assert_eq!(config.title(), None);
        assert_eq!(config.csv(), Some("x.csv"));
    }

    #[test]
    fn test_manifest_duplicate_ids_are_renamed() {
        let manifest = Manifest::from_json(
            r#"{"targets": [
                { "id": "c", "kind": "bar", "csv": "a.csv" },
                { "id": "c", "kind": "bar", "csv": "b.csv" },
                { "id": "c-2", "kind": "bar", "csv": "c.csv" },
                { "id": "c", "kind": "bar", "csv": "d.csv" }
            ]}"#,
        )
        .unwrap();

        let ids: Vec<_> = manifest.targets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "c-3", "c-2", "c-4"]);
        assert_eq!(manifest.targets[1].config.csv(), Some("b.csv"));
    }

    #[test]
    fn test_demo_manifest_parses() {
        let manifest = Manifest::from_json(include_str!("../demos/manifest.json")).unwrap();
        assert_eq!(manifest.targets.len(), 2);
        assert_eq!(manifest.targets[0].config.limit(), 3);
        assert_eq!(manifest.targets[1].config.sort_dir(), SortDirection::Asc);
    }
}
