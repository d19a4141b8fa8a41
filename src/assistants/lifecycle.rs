//! The run lifecycle driver.
//!
//! A run is a remote state machine: `queued → in_progress → {completed |
//! requires_action | cancelling → cancelled | failed | expired}`. The
//! [`RunDriver`] owns the one non-trivial protocol in this crate: it polls the
//! run under a bounded backoff schedule, and when the run pauses on
//! `requires_action` it dispatches every pending tool call to a locally
//! registered handler, submits the collected outputs in a single request and
//! resumes polling until the run reaches a terminal state.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::assistants::runs::{Run, RunRequest, RunStatus, ToolOutput};
use crate::chat::ToolCall;
use crate::client::Client;
use crate::error::{ApiResult, Error, ProtocolError};

/// Bounds and pacing for the polling loop.
///
/// The delay starts at `interval`, is multiplied by `backoff` after every
/// poll and capped at `max_interval`. The loop gives up with
/// [`Error::PollTimeout`] once either `max_attempts` polls have been made or
/// `max_wait` wall time has elapsed, so a stuck run can never hang the
/// caller.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff: f64,
    pub max_interval: Duration,
    pub max_attempts: u32,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            backoff: 2.0,
            max_interval: Duration::from_secs(8),
            max_attempts: 120,
            max_wait: Duration::from_secs(300),
        }
    }
}

impl PollPolicy {
    /// A fixed-interval policy: a constant delay between polls, still
    /// bounded by the attempt and wall-time limits.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            backoff: 1.0,
            max_interval: interval,
            ..Self::default()
        }
    }

    fn next_interval(&self, current: Duration) -> Duration {
        let scaled = current.as_secs_f64() * self.backoff;
        Duration::from_secs_f64(scaled.min(self.max_interval.as_secs_f64()))
    }
}

type HandlerFuture = Pin<Box<dyn Future<Output = ApiResult<String>> + Send>>;
type Handler = Box<dyn Fn(&str) -> HandlerFuture + Send + Sync>;

/// Local tool implementations keyed by function name.
///
/// Handlers take the decoded arguments of their declared input type and
/// return the output string submitted back to the run. Argument decoding
/// happens in the registry, so a malformed `function.arguments` payload fails
/// that specific call with [`ProtocolError::InvalidArguments`] instead of
/// being handed to the handler.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Handler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a function name. The arguments JSON is decoded
    /// into `A` before the handler runs.
    pub fn register<A, F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        A: DeserializeOwned,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<String>> + Send + 'static,
    {
        let name = name.into();
        let handler_name = name.clone();
        self.handlers.insert(
            name,
            Box::new(move |arguments: &str| match serde_json::from_str::<A>(arguments) {
                Ok(decoded) => Box::pin(handler(decoded)),
                Err(source) => {
                    let err = Error::Protocol(ProtocolError::InvalidArguments {
                        name: handler_name.clone(),
                        source,
                    });
                    Box::pin(async move { Err(err) })
                }
            }),
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    async fn resolve(&self, call: &ToolCall) -> ApiResult<ToolOutput> {
        let handler = self.handlers.get(&call.function.name).ok_or_else(|| {
            ProtocolError::UnregisteredTool {
                name: call.function.name.clone(),
                tool_call_id: call.id.clone(),
            }
        })?;
        let output = handler(&call.function.arguments).await?;
        Ok(ToolOutput {
            tool_call_id: call.id.clone(),
            output,
        })
    }
}

/// Drives runs to a terminal state on behalf of a caller.
///
/// One driver instance serves one logical polling loop; independent runs can
/// be driven concurrently by independent drivers with no shared state beyond
/// the [`Client`].
pub struct RunDriver<'a> {
    client: &'a Client,
    tools: ToolRegistry,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<'a> RunDriver<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            tools: ToolRegistry::new(),
            policy: PollPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// A token that aborts this driver's loop. Cancellation is cooperative:
    /// the driver issues a server-side cancel and keeps polling until the
    /// server reflects a terminal state.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Creates a run and drives it to a terminal state.
    pub async fn run(&self, thread_id: &str, request: &RunRequest) -> ApiResult<Run> {
        let run = self.client.create_run(thread_id, request).await?;
        self.drive(run).await
    }

    /// Drives an existing run to a terminal state, resolving every
    /// `requires_action` episode through the tool registry.
    pub async fn drive(&self, run: Run) -> ApiResult<Run> {
        let mut run = self.wait(run).await?;
        while run.status == RunStatus::RequiresAction {
            if self.cancel.is_cancelled() {
                run = self.client.cancel_run(&run.thread_id, &run.id).await?;
                run = self.wait(run).await?;
                continue;
            }
            let outputs = self.resolve_required_action(&run).await?;
            log::debug!(
                "run {}: submitting {} tool output(s)",
                run.id,
                outputs.len()
            );
            run = self
                .client
                .submit_tool_outputs(&run.thread_id, &run.id, &outputs)
                .await?;
            run = self.wait(run).await?;
        }
        Ok(run)
    }

    /// Polls a run until it is terminal or pauses on `requires_action`.
    /// Every fetch is a side-effect-free read.
    pub async fn wait(&self, mut run: Run) -> ApiResult<Run> {
        let started = Instant::now();
        let mut interval = self.policy.interval;
        let mut attempts: u32 = 0;
        let mut cancel_issued = false;
        loop {
            log::debug!("run {}: status {:?}", run.id, run.status);
            if run.status.is_terminal() || run.status == RunStatus::RequiresAction {
                return Ok(run);
            }
            if self.cancel.is_cancelled() && !cancel_issued {
                cancel_issued = true;
                run = self.client.cancel_run(&run.thread_id, &run.id).await?;
                continue;
            }
            if attempts >= self.policy.max_attempts || started.elapsed() >= self.policy.max_wait {
                return Err(Error::PollTimeout {
                    run_id: run.id,
                    attempts,
                    elapsed: started.elapsed(),
                    last_status: run.status,
                });
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.cancel.cancelled(), if !cancel_issued => {}
            }
            attempts += 1;
            interval = self.policy.next_interval(interval);
            run = self.client.retrieve_run(&run.thread_id, &run.id).await?;
        }
    }

    /// Resolves all pending tool calls of a `requires_action` episode.
    ///
    /// Handler coverage is verified for the whole batch before any handler
    /// runs, so a missing registration fails fast instead of submitting a
    /// partial or garbage set. The server requires the complete batch in one
    /// submission.
    async fn resolve_required_action(&self, run: &Run) -> ApiResult<Vec<ToolOutput>> {
        let calls = run
            .required_action
            .as_ref()
            .map(|action| action.tool_calls())
            .unwrap_or_default();
        if calls.is_empty() {
            return Err(ProtocolError::EmptyRequiredAction {
                run_id: run.id.clone(),
            }
            .into());
        }
        for call in calls {
            if !self.tools.contains(&call.function.name) {
                return Err(ProtocolError::UnregisteredTool {
                    name: call.function.name.clone(),
                    tool_call_id: call.id.clone(),
                }
                .into());
            }
        }
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            outputs.push(self.tools.resolve(call).await?);
        }
        Ok(outputs)
    }
}
