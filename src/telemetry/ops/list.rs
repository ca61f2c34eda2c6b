use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct List;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Load, Filter, Render }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Load => "load",
        Phase::Filter => "filter",
        Phase::Render => "render",
    }}
    fn span(&self) -> Span { match self {
        Phase::Load => info_span!("load"),
        Phase::Filter => info_span!("filter"),
        Phase::Render => info_span!("render"),
    }}
}

impl OpMarker for List {
    const NAME: &'static str = "ls";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("ls") }
}
