//! Generation pipeline: marked methods in, grouped source units out.
//!
//! ```text
//! MarkedMethod -> FinderSpec -> TraversalPlan -> ProcedureBody -> method text
//!                                                     (per container) -> GeneratedUnit
//! ```
//!
//! Each method is processed independently with its own loop-variable pool.
//! A failure affects only the method that caused it and is reported as a
//! [`Diagnostic`]; the other methods still produce output.
//!
//! Cancellation is cooperative and checked between methods. Methods not yet
//! started are abandoned; units for the methods already rendered are still
//! delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::backend::SourceBackend;
use crate::config::GeneratorConfig;
use crate::emit::{lower_plan, ProcedureBody};
use crate::error::{Diagnostic, FinderError, FinderResult, Severity};
use crate::finder::{FinderSpec, MarkedMethod};
use crate::group::{GeneratedUnit, GroupingAssembler, RenderedFinder};
use crate::plan::{plan_finder, TraversalPlan};
use crate::provider::TypeMetadataProvider;

/// Cloneable flag for cooperative cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A finder that has been validated, planned and lowered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFinder {
    pub spec: FinderSpec,
    pub plan: TraversalPlan,
    pub body: ProcedureBody,
}

/// Result of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationOutput {
    pub units: Vec<GeneratedUnit>,
    pub diagnostics: Vec<Diagnostic>,
    /// Methods abandoned because the pass was cancelled.
    pub abandoned: usize,
    pub cancelled: bool,
}

impl GenerationOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Runs the full pipeline against a provider and a backend.
pub struct Generator<'a, P: ?Sized, B: ?Sized> {
    provider: &'a P,
    backend: &'a B,
    config: &'a GeneratorConfig,
}

impl<'a, P, B> Generator<'a, P, B>
where
    P: TypeMetadataProvider + ?Sized,
    B: SourceBackend + ?Sized,
{
    pub fn new(provider: &'a P, backend: &'a B, config: &'a GeneratorConfig) -> Self {
        Generator {
            provider,
            backend,
            config,
        }
    }

    /// Validate, plan and lower a single method.
    pub fn plan_one(&self, method: &MarkedMethod) -> FinderResult<PlannedFinder> {
        let spec = FinderSpec::from_marked(method, self.provider, self.config)?;
        let plan = plan_finder(&spec, self.provider, self.config)?;
        let body = lower_plan(&plan);
        Ok(PlannedFinder { spec, plan, body })
    }

    /// Process every method, in order, until done or cancelled.
    pub fn run(&self, methods: &[MarkedMethod], cancel: &CancellationToken) -> GenerationOutput {
        let mut output = GenerationOutput::default();
        let mut rendered = Vec::new();

        for (index, method) in methods.iter().enumerate() {
            if cancel.is_cancelled() {
                output.cancelled = true;
                output.abandoned = methods.len() - index;
                tracing::info!(abandoned = output.abandoned, "generation cancelled");
                break;
            }

            match self.plan_one(method) {
                Ok(planned) => {
                    tracing::debug!(
                        finder = %planned.spec.label(),
                        matches = planned.plan.match_count(),
                        "planned finder"
                    );
                    let source = self.backend.render_method(&planned.spec, &planned.body);
                    rendered.push(RenderedFinder {
                        spec: planned.spec,
                        source,
                    });
                }
                Err(FinderError::ShapeMismatch { method: label, reason })
                    if !self.config.report_shape_mismatch =>
                {
                    tracing::debug!(finder = %label, %reason, "excluded: not a finder shape");
                }
                Err(err) => {
                    let diagnostic = err.to_diagnostic(method.label());
                    tracing::warn!("{}", diagnostic);
                    output.diagnostics.push(diagnostic);
                }
            }
        }

        output.units = GroupingAssembler::new(self.provider, self.backend).assemble(rendered);
        tracing::info!(
            units = output.units.len(),
            diagnostics = output.diagnostics.len(),
            "generation finished"
        );
        output
    }
}
