use anyhow::Result;
use serde::Serialize;

use crate::output::config::OutputConfig;
use crate::output::types::{Envelope, Meta, TextView};
use crate::output::Emitter;

/// Wrap `result` in an envelope and write it to stdout in the configured format.
pub fn print_result<T: Serialize + TextView>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<()> {
    let env = Envelope::result(op, result, meta)?;
    Emitter::from_env(OutputConfig::from_env()).emit(&env)?;
    Ok(())
}
