//! Discovery of annotated chart targets in an HTML page
//!
//! A target is any `<canvas>` element carrying a `data-chart` attribute:
//!
//! ```text
//! <canvas id="wins" data-chart="wins-losses" data-csv="teams.csv"
//!         data-label-col="TEAM" data-wins-col="W" data-losses-col="L"></canvas>
//! ```
//!
//! `data-*` attribute names are converted to camelCase configuration keys
//! (`data-label-col` becomes `labelCol`).

use crate::config::{dedupe_ids, free_id, ChartConfig, TargetDescriptor};
use crate::error::Result;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Scanner for annotated `<canvas>` elements
pub struct TargetScanner {
    canvas_regex: Regex,
    attribute_regex: Regex,
}

impl TargetScanner {
    pub fn new() -> Result<Self> {
        let canvas_regex = Regex::new(r"(?is)<canvas\b([^>]*)>")?;
        let attribute_regex = Regex::new(
            r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
        )?;

        Ok(Self {
            canvas_regex,
            attribute_regex,
        })
    }

    /// Find every chart target in `html`, in document order.
    ///
    /// Canvases without an id get `chart-N` (N is the canvas position),
    /// never clashing with an explicit id; repeated ids are suffixed.
    pub fn scan(&self, html: &str) -> Vec<TargetDescriptor> {
        let mut found = Vec::new();

        for (index, tag) in self.canvas_regex.captures_iter(html).enumerate() {
            let Some(attrs) = tag.get(1) else {
                continue;
            };

            let mut id = None;
            let mut kind = None;
            let mut config = BTreeMap::new();

            for attr in self.attribute_regex.captures_iter(attrs.as_str()) {
                let name = attr[1].to_ascii_lowercase();
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .or_else(|| attr.get(4))
                    .map(|m| decode_entities(m.as_str()))
                    .unwrap_or_default();

                if name == "id" {
                    id = Some(value);
                } else if name == "data-chart" {
                    kind = Some(value);
                } else if let Some(key) = name.strip_prefix("data-") {
                    config.insert(camel_case(key), value);
                }
            }

            let Some(kind) = kind else {
                continue;
            };
            let id = id.filter(|i| !i.trim().is_empty());
            found.push((index, id, kind, config));
        }

        let explicit: HashSet<String> = found
            .iter()
            .filter_map(|(_, id, _, _)| id.clone())
            .collect();
        let mut targets: Vec<TargetDescriptor> = found
            .into_iter()
            .map(|(index, id, kind, config)| {
                let id = id.unwrap_or_else(|| {
                    let auto = format!("chart-{}", index + 1);
                    if explicit.contains(&auto) {
                        free_id(&auto, &explicit)
                    } else {
                        auto
                    }
                });
                debug!("Discovered {} target '{}'", kind, id);
                TargetDescriptor {
                    id,
                    kind,
                    config: ChartConfig::from_attributes(config),
                }
            })
            .collect();

        dedupe_ids(&mut targets);
        targets
    }
}

/// Convenience wrapper around [`TargetScanner::scan`]
pub fn discover_targets(html: &str) -> Result<Vec<TargetDescriptor>> {
    Ok(TargetScanner::new()?.scan(html))
}

/// `label-col` -> `labelCol`
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("label-col"), "labelCol");
        assert_eq!(camel_case("csv"), "csv");
        assert_eq!(camel_case("y-axis-label"), "yAxisLabel");
    }

    #[test]
    fn test_scan_canvas_targets() {
        let html = r#"
            <h1>League</h1>
            <canvas id="wins" data-chart="wins-losses" data-csv="teams.csv"
                    data-label-col="TEAM" data-season-col='SEASON'
                    data-wins-col=W data-losses-col="L"></canvas>
            <canvas id="plain"></canvas>
            <CANVAS data-chart="bar" data-csv="a.csv?x=1&amp;y=2" data-title="Top &quot;10&quot;"></CANVAS>
        "#;

        let targets = discover_targets(html).unwrap();
        assert_eq!(targets.len(), 2);

        let wins = &targets[0];
        assert_eq!(wins.id, "wins");
        assert_eq!(wins.kind, "wins-losses");
        assert_eq!(wins.config.label_col(), Some("TEAM"));
        assert_eq!(wins.config.season_col(), Some("SEASON"));
        assert_eq!(wins.config.get("winsCol"), Some("W"));
        assert_eq!(wins.config.get("lossesCol"), Some("L"));

        let bar = &targets[1];
        assert_eq!(bar.id, "chart-3");
        assert_eq!(bar.config.csv(), Some("a.csv?x=1&y=2"));
        assert_eq!(bar.config.title(), Some("Top \"10\""));
    }

    #[test]
    fn test_scan_without_targets() {
        assert!(discover_targets("<p>nothing here</p>").unwrap().is_empty());
    }

    #[test]
    fn test_scan_gives_every_target_its_own_id() {
        let html = r#"
            <canvas data-chart="bar" data-csv="auto.csv"></canvas>
            <canvas id="chart-1" data-chart="bar" data-csv="explicit.csv"></canvas>
            <canvas id="dup" data-chart="bar" data-csv="a.csv"></canvas>
            <canvas id="dup" data-chart="bar" data-csv="b.csv"></canvas>
        "#;

        let targets = discover_targets(html).unwrap();
        let ids: Vec<_> = targets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["chart-1-2", "chart-1", "dup", "dup-2"]);
        assert_eq!(targets[1].config.csv(), Some("explicit.csv"));
        assert_eq!(targets[3].config.csv(), Some("b.csv"));
    }

    #[test]
    fn test_scan_demo_page() {
        let targets = discover_targets(include_str!("../demos/standings.html")).unwrap();
        let ids: Vec<_> = targets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["best-records", "scoring", "models", "roc"]);
        assert_eq!(targets[1].config.get("yAxisLabel"), Some("Points per game"));
        assert!(targets.iter().all(|t| t.chart_kind().is_ok()));
    }
}
