pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn add() -> LogCtx<ops::add::Add> { LogCtx::new(config::logs_are_json()) }
pub fn manual() -> LogCtx<ops::manual::Manual> { LogCtx::new(config::logs_are_json()) }
pub fn list() -> LogCtx<ops::list::List> { LogCtx::new(config::logs_are_json()) }
pub fn show() -> LogCtx<ops::show::Show> { LogCtx::new(config::logs_are_json()) }
pub fn notes() -> LogCtx<ops::notes::Notes> { LogCtx::new(config::logs_are_json()) }
pub fn auth() -> LogCtx<ops::auth::Auth> { LogCtx::new(config::logs_are_json()) }
pub fn init() -> LogCtx<ops::init::Init> { LogCtx::new(config::logs_are_json()) }
