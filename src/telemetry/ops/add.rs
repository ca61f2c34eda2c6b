use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Add;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Validate, Extract, Infer, Persist }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Validate => "validate",
        Phase::Extract => "extract",
        Phase::Infer => "infer",
        Phase::Persist => "persist",
    }}
    fn span(&self) -> Span { match self {
        Phase::Validate => info_span!("validate"),
        Phase::Extract => info_span!("extract"),
        Phase::Infer => info_span!("infer"),
        Phase::Persist => info_span!("persist"),
    }}
}

impl OpMarker for Add {
    const NAME: &'static str = "add";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("add") }
}
