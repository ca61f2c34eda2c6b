use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Auth;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Open, Login, Logout }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Open => "open",
        Phase::Login => "login",
        Phase::Logout => "logout",
    }}
    fn span(&self) -> Span { match self {
        Phase::Open => info_span!("open"),
        Phase::Login => info_span!("login"),
        Phase::Logout => info_span!("logout"),
    }}
}

impl OpMarker for Auth {
    const NAME: &'static str = "auth";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("auth") }
}
