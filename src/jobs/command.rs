//! Job bodies built from configuration.
//!
//! A configured job either runs an external command or, when no command is
//! given, acts as a heartbeat that always succeeds.

use std::process::Command;
use std::sync::Arc;

use crate::config::JobConfig;
use crate::jobs::error::JobError;
use crate::jobs::trigger::JobBody;

/// Stderr is cut to this many bytes before it becomes a health reason.
const MAX_REASON_LEN: usize = 512;

/// Build the body for a configured job.
pub fn body_for(config: &JobConfig) -> JobBody {
    match config.command.split_first() {
        Some((program, args)) => {
            let program = program.clone();
            let args = args.to_vec();
            Arc::new(move || run_command(&program, &args))
        }
        None => Arc::new(|| Ok(())),
    }
}

/// Run `program` to completion. A non-zero exit becomes a failure whose
/// message is the trimmed stderr, or the exit status if stderr is empty.
pub fn run_command(program: &str, args: &[String]) -> Result<(), JobError> {
    tracing::debug!(program = %program, ?args, "Running job command");
    let output = Command::new(program).args(args).output()?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let message = if stderr.is_empty() {
        format!("{} exited with {}", program, output.status)
    } else {
        truncate(stderr, MAX_REASON_LEN).to_string()
    };
    Err(JobError::Failed(message))
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
