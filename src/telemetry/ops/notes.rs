use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Notes;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Load, Persist }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Load => "load",
        Phase::Persist => "persist",
    }}
    fn span(&self) -> Span { match self {
        Phase::Load => info_span!("load"),
        Phase::Persist => info_span!("persist"),
    }}
}

impl OpMarker for Notes {
    const NAME: &'static str = "notes";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("notes") }
}
