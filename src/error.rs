//! Error taxonomy for the client.
//!
//! Every fallible call returns [`ApiResult`]. The variants keep remote
//! rejections (`Api`), connectivity failures (`Transport`), local misuse
//! (`Validation`), run-resumption failures (`Protocol`) and exhausted polling
//! budgets (`PollTimeout`) distinguishable at the call site.

use std::time::Duration;

use crate::assistants::runs::RunStatus;

pub type ApiResult<T> = Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with a non-2xx status and (usually) a decoded
    /// error envelope.
    #[error("api error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        error_type: String,
        param: Option<String>,
        code: Option<String>,
    },

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A client-side precondition failed; no request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The tool-call resumption protocol failed for this run. Not retryable.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The polling budget ran out before the run left a non-terminal state.
    #[error(
        "run {run_id} still `{last_status:?}` after {attempts} polls ({elapsed:?}); giving up"
    )]
    PollTimeout {
        run_id: String,
        attempts: u32,
        elapsed: Duration,
        last_status: RunStatus,
    },
}

/// Failures while resolving a `requires_action` episode. These are caller
/// configuration or decoding problems, never transport faults, and the run
/// driver fails fast on them instead of submitting garbage outputs.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("no handler registered for tool function `{name}` (tool call {tool_call_id})")]
    UnregisteredTool { name: String, tool_call_id: String },

    #[error("malformed arguments for tool function `{name}`: {source}")]
    InvalidArguments {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("run {run_id} requires action but lists no tool calls")]
    EmptyRequiredAction { run_id: String },
}

impl Error {
    /// True for errors raised before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Protocol(_))
    }
}

pub(crate) fn require_id(value: &str, what: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{what} can not be empty")));
    }
    Ok(())
}
