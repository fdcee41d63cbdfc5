//! Chart builders
//!
//! Every chart kind is described by a static [`ChartDescriptor`]: the
//! configuration keys it requires, how its series are laid out and its
//! cosmetic defaults. A single [`assemble`] routine turns a descriptor, the
//! transformed records and the target configuration into a [`ChartSpec`].

use crate::config::{ChartConfig, ChartKind};
use crate::error::{Error, Result};
use crate::label::{derive_label, derive_labels};
use crate::normalize::coerce;
use crate::record::{Record, Value};
use crate::series::{
    Axis, ChartData, ChartOptions, ChartSpec, ChartType, ColorSpec, DataPoint, Dataset,
    LegendOptions, LegendPosition, Plugins, Scales, TitleOptions,
};

/// Default color palette
pub const PALETTE: [&str; 10] = [
    "#58a6ff", "#3fb950", "#f85149", "#a371f7", "#d29922", "#79c0ff", "#56d364", "#ff7b72",
    "#bc8cff", "#e3b341",
];

const REFERENCE_COLOR: &str = "#8b949e";

/// Metric columns compared by `model-comparison` charts: (column, display name)
pub const MODEL_METRICS: [(&str, &str); 5] = [
    ("accuracy", "Accuracy"),
    ("precision", "Precision"),
    ("recall", "Recall"),
    ("f1", "F1 Score"),
    ("auc", "AUC"),
];

/// One series drawn from a configured value column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSlot {
    /// Config key naming the value column
    pub value_key: &'static str,
    /// Config key overriding the series name
    pub label_key: &'static str,
    /// Series name when `label_key` is unset; `None` falls back to the column name
    pub default_label: Option<&'static str>,
    /// Config key overriding the series color
    pub color_key: &'static str,
    /// Index into [`PALETTE`] when `color_key` is unset
    pub default_color: usize,
}

/// How records become series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One label per record and one dataset per slot
    Columns(&'static [SeriesSlot]),
    /// Labels are [`MODEL_METRICS`], one dataset per record
    ModelMetrics,
    /// `(x, y)` curves grouped by label, plus a diagonal reference line
    Curves,
}

/// Declarative description of a chart kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartDescriptor {
    pub kind: ChartKind,
    pub required: &'static [&'static str],
    pub layout: Layout,
    /// Legend placement; `None` hides the legend
    pub legend: Option<LegendPosition>,
    /// Bars run along the y axis
    pub horizontal: bool,
    /// Honour the `colors` attribute as a per-bar palette
    pub per_bar_palette: bool,
}

const WINS_LOSSES_SERIES: [SeriesSlot; 2] = [
    SeriesSlot {
        value_key: "winsCol",
        label_key: "winsLabel",
        default_label: Some("Wins"),
        color_key: "winsColor",
        default_color: 1,
    },
    SeriesSlot {
        value_key: "lossesCol",
        label_key: "lossesLabel",
        default_label: Some("Losses"),
        color_key: "lossesColor",
        default_color: 2,
    },
];

const SINGLE_SERIES: [SeriesSlot; 1] = [SeriesSlot {
    value_key: "yCol",
    label_key: "yLabel",
    default_label: None,
    color_key: "barColor",
    default_color: 0,
}];

static DESCRIPTORS: [ChartDescriptor; 6] = [
    ChartDescriptor {
        kind: ChartKind::WinsLosses,
        required: &["csv", "labelCol", "winsCol", "lossesCol"],
        layout: Layout::Columns(&WINS_LOSSES_SERIES),
        legend: Some(LegendPosition::Top),
        horizontal: false,
        per_bar_palette: false,
    },
    ChartDescriptor {
        kind: ChartKind::Bar,
        required: &["csv", "labelCol", "yCol"],
        layout: Layout::Columns(&SINGLE_SERIES),
        legend: Some(LegendPosition::Top),
        horizontal: false,
        per_bar_palette: true,
    },
    ChartDescriptor {
        kind: ChartKind::SimpleBar,
        required: &["csv", "labelCol", "yCol"],
        layout: Layout::Columns(&SINGLE_SERIES),
        legend: None,
        horizontal: false,
        per_bar_palette: true,
    },
    ChartDescriptor {
        kind: ChartKind::ModelComparison,
        required: &["csv", "labelCol"],
        layout: Layout::ModelMetrics,
        legend: Some(LegendPosition::Top),
        horizontal: false,
        per_bar_palette: false,
    },
    ChartDescriptor {
        kind: ChartKind::RocCurves,
        required: &["csv", "labelCol"],
        layout: Layout::Curves,
        legend: Some(LegendPosition::Bottom),
        horizontal: false,
        per_bar_palette: false,
    },
    ChartDescriptor {
        kind: ChartKind::HorizontalBar,
        required: &["csv", "labelCol", "yCol"],
        layout: Layout::Columns(&SINGLE_SERIES),
        legend: None,
        horizontal: true,
        per_bar_palette: true,
    },
];

/// Descriptor for a chart kind
pub fn descriptor(kind: ChartKind) -> &'static ChartDescriptor {
    DESCRIPTORS
        .iter()
        .find(|d| d.kind == kind)
        .unwrap_or(&DESCRIPTORS[1])
}

impl ChartDescriptor {
    /// Check that every required key is set, reporting all missing keys at once
    pub fn validate(&self, config: &ChartConfig) -> Result<()> {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|key| !config.has(key))
            .map(|key| key.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Configuration {
                kind: self.kind.to_string(),
                missing,
            })
        }
    }
}

/// Build the chart for already sorted and limited `rows`
pub fn assemble(descriptor: &ChartDescriptor, rows: &[Record], config: &ChartConfig) -> Result<ChartSpec> {
    descriptor.validate(config)?;

    let label_col = config.label_col().unwrap_or_default();
    let season_col = config.season_col();

    let (chart_type, data) = match descriptor.layout {
        Layout::Columns(slots) => {
            let labels = derive_labels(rows, label_col, season_col);
            let datasets = slots
                .iter()
                .map(|slot| column_dataset(descriptor, slot, rows, config))
                .collect();
            (ChartType::Bar, ChartData { labels, datasets })
        }
        Layout::ModelMetrics => (ChartType::Bar, model_metrics(rows, config, label_col, season_col)),
        Layout::Curves => (ChartType::Scatter, curves(rows, config, label_col, season_col)),
    };

    Ok(ChartSpec {
        chart_type,
        data,
        options: options(descriptor, config),
    })
}

fn column_dataset(
    descriptor: &ChartDescriptor,
    slot: &SeriesSlot,
    rows: &[Record],
    config: &ChartConfig,
) -> Dataset {
    let column = config.get(slot.value_key).unwrap_or_default();
    let data = rows
        .iter()
        .map(|r| DataPoint::Value(coerce(r.get(column))))
        .collect();

    let label = config
        .get(slot.label_key)
        .or(slot.default_label)
        .unwrap_or(column);

    let palette = config.colors();
    let color = match config.get(slot.color_key) {
        Some(color) => ColorSpec::Single(color.to_string()),
        None if descriptor.per_bar_palette && !palette.is_empty() => {
            ColorSpec::PerPoint(cycle(&palette, rows.len()))
        }
        None => ColorSpec::Single(PALETTE[slot.default_color % PALETTE.len()].to_string()),
    };

    let mut dataset = Dataset::new(label, data, color);
    dataset.border_width = Some(1.0);
    dataset
}

fn model_metrics(rows: &[Record], config: &ChartConfig, label_col: &str, season_col: Option<&str>) -> ChartData {
    let labels = MODEL_METRICS.iter().map(|(_, name)| name.to_string()).collect();
    let palette = palette_or_default(config);

    let datasets = rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let data = MODEL_METRICS
                .iter()
                .map(|(column, name)| DataPoint::Value(coerce(metric_value(record, column, name))))
                .collect();
            let color = ColorSpec::Single(palette[i % palette.len()].clone());
            let mut dataset = Dataset::new(derive_label(record, label_col, season_col), data, color);
            dataset.border_width = Some(1.0);
            dataset
        })
        .collect();

    ChartData { labels, datasets }
}

/// Metric lookup by column name, then display name, ignoring case
fn metric_value<'a>(record: &'a Record, column: &str, name: &str) -> &'a Value {
    let found = record
        .columns()
        .find(|c| c.eq_ignore_ascii_case(column) || c.eq_ignore_ascii_case(name));
    match found {
        Some(c) => record.get(c),
        None => record.get(column),
    }
}

fn curves(rows: &[Record], config: &ChartConfig, label_col: &str, season_col: Option<&str>) -> ChartData {
    let x_col = config.get("xCol").unwrap_or("fpr");
    let y_col = config.get("yCol").unwrap_or("tpr");
    let palette = palette_or_default(config);

    let mut groups: Vec<(String, Vec<DataPoint>)> = Vec::new();
    for record in rows {
        let name = derive_label(record, label_col, season_col);
        let point = match (coerce(record.get(x_col)), coerce(record.get(y_col))) {
            (Some(x), Some(y)) => DataPoint::Point { x, y },
            _ => continue,
        };
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, points)) => points.push(point),
            None => groups.push((name, vec![point])),
        }
    }

    let mut datasets: Vec<Dataset> = groups
        .into_iter()
        .enumerate()
        .map(|(i, (name, points))| {
            let color = ColorSpec::Single(palette[i % palette.len()].clone());
            let mut dataset = Dataset::new(name, points, color);
            dataset.show_line = Some(true);
            dataset.fill = Some(false);
            dataset.point_radius = Some(0.0);
            dataset.border_width = Some(2.0);
            dataset.tension = Some(0.0);
            dataset
        })
        .collect();

    let mut reference = Dataset::new(
        "Random classifier",
        vec![DataPoint::Point { x: 0.0, y: 0.0 }, DataPoint::Point { x: 1.0, y: 1.0 }],
        ColorSpec::Single(REFERENCE_COLOR.to_string()),
    );
    reference.show_line = Some(true);
    reference.fill = Some(false);
    reference.point_radius = Some(0.0);
    reference.border_width = Some(1.0);
    reference.border_dash = Some(vec![6.0, 4.0]);
    datasets.push(reference);

    ChartData {
        labels: Vec::new(),
        datasets,
    }
}

fn options(descriptor: &ChartDescriptor, config: &ChartConfig) -> ChartOptions {
    let value_title = match (config.get("yAxisLabel"), config.get("yUnit")) {
        (Some(label), Some(unit)) => Some(format!("{} ({})", label, unit)),
        (Some(label), None) => Some(label.to_string()),
        (None, Some(unit)) => Some(unit.to_string()),
        (None, None) => None,
    };
    let category_title = config.get("xAxisLabel");

    let scales = match descriptor.layout {
        Layout::Curves => Scales {
            x: unit_axis(category_title.unwrap_or("False Positive Rate")),
            y: unit_axis(value_title.as_deref().unwrap_or("True Positive Rate")),
        },
        _ => {
            let mut value_axis = Axis::titled(value_title.as_deref());
            value_axis.begin_at_zero = Some(true);
            let category_axis = Axis::titled(category_title);
            if descriptor.horizontal {
                Scales { x: value_axis, y: category_axis }
            } else {
                Scales { x: category_axis, y: value_axis }
            }
        }
    };

    ChartOptions {
        responsive: true,
        maintain_aspect_ratio: false,
        index_axis: descriptor.horizontal.then(|| "y".to_string()),
        plugins: Plugins {
            title: TitleOptions::from_text(config.title()),
            legend: LegendOptions {
                display: descriptor.legend.is_some(),
                position: descriptor.legend.unwrap_or(LegendPosition::Top),
            },
        },
        scales,
    }
}

fn unit_axis(title: &str) -> Axis {
    let mut axis = Axis::titled(Some(title));
    axis.kind = Some("linear".to_string());
    axis.min = Some(0.0);
    axis.max = Some(1.0);
    axis
}

fn palette_or_default(config: &ChartConfig) -> Vec<String> {
    let colors = config.colors();
    if colors.is_empty() {
        PALETTE.iter().map(|c| c.to_string()).collect()
    } else {
        colors
    }
}

fn cycle(colors: &[String], len: usize) -> Vec<String> {
    colors.iter().cycle().take(len).cloned().collect()
}
