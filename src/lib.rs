//! csv-charts - Declarative, data-driven charts from tabular files
//!
//! This library turns chart targets (a canvas id, a chart kind and a set of
//! configuration attributes) into Chart.js configurations backed by CSV data.
//!
//! # Features
//!
//! - Load CSV sources over HTTP or from disk with type inference
//! - Sort and limit rows with a stable, blanks-last ordering
//! - Derive display labels with an optional qualifier column
//! - Build grouped bar, bar, horizontal bar, model comparison and ROC charts
//! - Discover targets from annotated `<canvas>` elements or a JSON manifest
//! - Render every target concurrently into a static HTML page
//!
//! # Example
//!
//! ```no_run
//! use csv_charts::{discover, html, loader, pipeline};
//!
//! # async fn run() -> csv_charts::Result<()> {
//! let page = std::fs::read_to_string("page.html")?;
//! let targets = discover::discover_targets(&page)?;
//!
//! let loader = loader::SourceLoader::new(loader::HttpFetcher::new()?);
//! let surface = html::PageSurface::new()?;
//! let outcomes = pipeline::render_all(&targets, &loader, &surface).await;
//!
//! html::write_page(&outcomes, &html::PageConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod config;
pub mod discover;
pub mod error;
pub mod html;
pub mod label;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod series;
pub mod transform;

pub use config::{ChartConfig, ChartKind, Manifest, SortDirection, TargetDescriptor};
pub use error::{Error, Result};
pub use pipeline::{render_all, render_target, RenderedChart, TargetOutcome};
pub use record::{Record, Value};
