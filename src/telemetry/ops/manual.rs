use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Manual;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Parse, Persist }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Parse => "parse",
        Phase::Persist => "persist",
    }}
    fn span(&self) -> Span { match self {
        Phase::Parse => info_span!("parse"),
        Phase::Persist => info_span!("persist"),
    }}
}

impl OpMarker for Manual {
    const NAME: &'static str = "new";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("new") }
}
