//! Per-target rendering pipeline
//!
//! Each target runs validate -> acquire canvas -> load -> sort/limit ->
//! assemble on its own. [`render_all`] drives every target concurrently on
//! the calling task; a failure in one target never reaches another.

use crate::builders::{self, ChartDescriptor};
use crate::config::{ChartKind, TargetDescriptor};
use crate::error::{Error, Result};
use crate::html::{Canvas, RenderSurface};
use crate::loader::{Fetch, SourceLoader};
use crate::series::ChartSpec;
use crate::transform::{self, TransformOptions};
use futures::future::join_all;
use tracing::{debug, error, info};

/// A chart ready to be drawn on its canvas
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub canvas: Canvas,
    pub kind: ChartKind,
    pub spec: ChartSpec,
}

/// Result of processing one target
#[derive(Debug)]
pub enum TargetOutcome {
    Rendered(RenderedChart),
    /// The canvas could not be acquired; nothing was drawn
    Skipped { id: String },
    Failed { id: String, kind: String, error: Error },
}

impl TargetOutcome {
    pub fn id(&self) -> &str {
        match self {
            TargetOutcome::Rendered(chart) => &chart.canvas.id,
            TargetOutcome::Skipped { id } | TargetOutcome::Failed { id, .. } => id,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TargetOutcome::Failed { .. })
    }
}

/// Run the pipeline for one target, logging and capturing any failure
pub async fn render_target<F, S>(
    target: &TargetDescriptor,
    loader: &SourceLoader<F>,
    surface: &S,
) -> TargetOutcome
where
    F: Fetch,
    S: RenderSurface + ?Sized,
{
    match try_render(target, loader, surface).await {
        Ok(Some(chart)) => {
            debug!(
                "Rendered {} chart '{}' with {} dataset(s)",
                chart.kind,
                chart.canvas.id,
                chart.spec.data.datasets.len()
            );
            TargetOutcome::Rendered(chart)
        }
        Ok(None) => {
            debug!("Canvas '{}' is not usable, skipping", target.id);
            TargetOutcome::Skipped {
                id: target.id.clone(),
            }
        }
        Err(e) => {
            error!(
                target_id = %target.id,
                kind = %target.kind,
                config = ?target.config.attributes(),
                "Failed to render chart: {}",
                e
            );
            TargetOutcome::Failed {
                id: target.id.clone(),
                kind: target.kind.clone(),
                error: e,
            }
        }
    }
}

async fn try_render<F, S>(
    target: &TargetDescriptor,
    loader: &SourceLoader<F>,
    surface: &S,
) -> Result<Option<RenderedChart>>
where
    F: Fetch,
    S: RenderSurface + ?Sized,
{
    let kind = target.chart_kind()?;
    let descriptor: &ChartDescriptor = builders::descriptor(kind);
    descriptor.validate(&target.config)?;

    let Some(canvas) = surface.acquire(&target.id) else {
        return Ok(None);
    };

    let source = target.config.csv().unwrap_or_default();
    let records = loader.load(source).await?;
    let rows = transform::apply(&records, &TransformOptions::from_config(&target.config));

    let spec = builders::assemble(descriptor, &rows, &target.config)?;

    Ok(Some(RenderedChart { canvas, kind, spec }))
}

/// Run every target concurrently and collect the outcomes in target order
pub async fn render_all<F, S>(
    targets: &[TargetDescriptor],
    loader: &SourceLoader<F>,
    surface: &S,
) -> Vec<TargetOutcome>
where
    F: Fetch,
    S: RenderSurface + ?Sized,
{
    info!("Rendering {} chart target(s)", targets.len());

    let outcomes = join_all(
        targets
            .iter()
            .map(|target| render_target(target, loader, surface)),
    )
    .await;

    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    info!(
        "Rendered {} of {} chart target(s), {} failed",
        outcomes
            .iter()
            .filter(|o| matches!(o, TargetOutcome::Rendered(_)))
            .count(),
        targets.len(),
        failed
    );

    outcomes
}
