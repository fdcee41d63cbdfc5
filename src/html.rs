//! HTML page generator with Chart.js

use crate::error::{Error, Result};
use crate::pipeline::TargetOutcome;
use chrono::Utc;
use minijinja::{context, Environment};
use regex::Regex;
use std::path::{Path, PathBuf};

/// HTML template for the chart page
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <style>
        :root {
            --bg-primary: #0d1117;
            --bg-secondary: #161b22;
            --bg-tertiary: #21262d;
            --text-primary: #c9d1d9;
            --text-secondary: #8b949e;
            --text-muted: #6e7681;
            --border-color: #30363d;
            --accent-red: #f85149;
        }

        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }

        .container { max-width: 1400px; margin: 0 auto; padding: 2rem; }

        header { text-align: center; margin-bottom: 2rem; }

        .generated { color: var(--text-muted); font-size: 0.9rem; }

        .chart-card {
            background: var(--bg-secondary);
            border: 1px solid var(--border-color);
            border-radius: 12px;
            margin-bottom: 2rem;
            overflow: hidden;
        }

        .chart-header {
            padding: 1rem 1.5rem;
            background: var(--bg-tertiary);
            border-bottom: 1px solid var(--border-color);
            color: var(--text-secondary);
            font-size: 0.85rem;
        }

        .chart-container { padding: 1.5rem; height: 420px; position: relative; }

        .chart-failed { padding: 1.5rem; color: var(--accent-red); }

        .no-data { text-align: center; padding: 3rem; color: var(--text-muted); }
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{{ title }}</h1>
            <p class="generated">Generated {{ generated_at }}</p>
        </header>

        {% if cards %}
            {% for card in cards %}
            <div class="chart-card">
                <div class="chart-header">{{ card.kind }} &middot; {{ card.id }}</div>
                {% if card.failed %}
                <p class="chart-failed">This chart could not be loaded.</p>
                {% else %}
                <div class="chart-container">
                    <canvas id="{{ card.id }}"></canvas>
                </div>
                {% endif %}
            </div>
            {% endfor %}
        {% else %}
            <div class="no-data">
                <p>No chart targets were found.</p>
            </div>
        {% endif %}
    </div>

    <script>
        window.CHARTS = {{ charts_json | safe }};

        document.addEventListener('DOMContentLoaded', function() {
            Chart.defaults.color = '#8b949e';
            Chart.defaults.borderColor = '#30363d';

            Object.keys(window.CHARTS).forEach(function(id) {
                const canvas = document.getElementById(id);
                if (!canvas || !canvas.getContext) return;
                new Chart(canvas, window.CHARTS[id]);
            });
        });
    </script>
</body>
</html>
"#;

/// Page configuration
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Title for the page
    pub title: String,
    /// Path to output directory
    pub output_dir: PathBuf,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Charts".to_string(),
            output_dir: PathBuf::from("charts"),
        }
    }
}

/// A canvas that a chart can be drawn on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub id: String,
}

/// Something that hands out canvases for render targets
pub trait RenderSurface: Sync {
    /// The canvas for `target_id`, or `None` when it cannot be drawn on
    fn acquire(&self, target_id: &str) -> Option<Canvas>;
}

/// Surface backed by the generated HTML page.
///
/// A target is usable when its id is a valid element id that can be looked
/// up from the page script.
pub struct PageSurface {
    id_regex: Regex,
}

impl PageSurface {
    pub fn new() -> Result<Self> {
        let id_regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_.:-]*$")?;
        Ok(Self { id_regex })
    }
}

impl RenderSurface for PageSurface {
    fn acquire(&self, target_id: &str) -> Option<Canvas> {
        self.id_regex.is_match(target_id).then(|| Canvas {
            id: target_id.to_string(),
        })
    }
}

/// Card data for template rendering
#[derive(Debug, Clone, serde::Serialize)]
struct Card {
    id: String,
    kind: String,
    failed: bool,
}

/// Generate the HTML page for a set of render outcomes
pub fn generate_page(outcomes: &[TargetOutcome], config: &PageConfig) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("page.html", PAGE_TEMPLATE)?;

    let template = env.get_template("page.html")?;

    let cards: Vec<Card> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            TargetOutcome::Rendered(chart) => Some(Card {
                id: chart.canvas.id.clone(),
                kind: chart.kind.to_string(),
                failed: false,
            }),
            TargetOutcome::Failed { id, kind, .. } => Some(Card {
                id: id.clone(),
                kind: kind.clone(),
                failed: true,
            }),
            TargetOutcome::Skipped { .. } => None,
        })
        .collect();

    // Keep `</script>` out of the inline script block
    let charts_json = serde_json::to_string(&charts_map(outcomes)?)?.replace("</", "<\\/");

    let html = template.render(context! {
        title => &config.title,
        generated_at => Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        cards => cards,
        charts_json => charts_json,
    })?;

    Ok(html)
}

/// Chart configurations keyed by canvas id
fn charts_map(outcomes: &[TargetOutcome]) -> Result<serde_json::Map<String, serde_json::Value>> {
    let mut charts = serde_json::Map::new();
    for outcome in outcomes {
        if let TargetOutcome::Rendered(chart) = outcome {
            charts.insert(chart.canvas.id.clone(), serde_json::to_value(&chart.spec)?);
        }
    }
    Ok(charts)
}

/// Write the page and the raw chart configurations to `config.output_dir`
pub fn write_page(outcomes: &[TargetOutcome], config: &PageConfig) -> Result<PathBuf> {
    let output_dir = &config.output_dir;
    std::fs::create_dir_all(output_dir).map_err(|e| Error::FileWriteError {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let html = generate_page(outcomes, config)?;
    let index_path = output_dir.join("index.html");
    write_file(&index_path, &html)?;

    let data_path = output_dir.join("charts.json");
    let json = serde_json::to_string_pretty(&charts_map(outcomes)?)?;
    write_file(&data_path, &json)?;

    Ok(index_path)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| Error::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
