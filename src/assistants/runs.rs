use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assistants::threads::ThreadRequest;
use crate::assistants::Tool;
use crate::chat::ToolCall;
use crate::client::{Client, ListQuery, Page};
use crate::error::require_id;
use crate::ApiResult;

/// One execution attempt of an assistant over a thread's message history.
///
/// A run is created, then observed through [`Client::retrieve_run`] until it
/// reaches a terminal status; while it is `requires_action` the caller must
/// resolve the pending tool calls and submit their outputs. The client never
/// writes `status` directly.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Run {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// The thread that was executed on as part of this run.
    pub thread_id: String,
    /// The assistant used for this run.
    pub assistant_id: String,
    pub status: RunStatus,
    /// Present only while the run is paused on `requires_action`.
    pub required_action: Option<RequiredAction>,
    /// The last error associated with this run, if any.
    pub last_error: Option<RunError>,
    pub expires_at: Option<u64>,
    pub started_at: Option<u64>,
    pub cancelled_at: Option<u64>,
    pub failed_at: Option<u64>,
    pub completed_at: Option<u64>,
    /// The model resolved for this run, including any per-run override.
    pub model: String,
    /// The instructions resolved for this run, including any override.
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub file_ids: Vec<String>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    /// Ended without a full response, e.g. a token-limit cutoff.
    Incomplete,
    Expired,
}

impl RunStatus {
    /// Terminal states never transition again. `cancelling` is not terminal
    /// and must still be polled; `requires_action` is not terminal either but
    /// unblocks only through a tool-output submission.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Cancelled
                | RunStatus::Failed
                | RunStatus::Completed
                | RunStatus::Incomplete
                | RunStatus::Expired
        )
    }
}

/// The action demanded from the caller before a paused run can continue.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum RequiredAction {
    SubmitToolOutputs {
        submit_tool_outputs: SubmitToolOutputs,
    },
}

impl RequiredAction {
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            RequiredAction::SubmitToolOutputs {
                submit_tool_outputs,
            } => &submit_tool_outputs.tool_calls,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitToolOutputs {
    pub tool_calls: Vec<ToolCall>,
}

/// `code` is one of `server_error` or `rate_limit_exceeded`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

/// Request body for creating a run. The optional fields override the
/// assistant's configuration for this run only and are never persisted back
/// to the assistant.
#[derive(Serialize, Builder, Debug, Clone, Default)]
#[builder(pattern = "owned")]
#[builder(name = "RunRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct RunRequest {
    /// The assistant to execute this run with.
    pub assistant_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub instructions: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub tools: Option<Vec<Tool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl RunRequest {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            ..Self::default()
        }
    }

    pub fn builder(assistant_id: impl Into<String>) -> RunRequestBuilder {
        RunRequestBuilder::create_empty().assistant_id(assistant_id)
    }
}

/// Request body for creating a thread and running it in one call.
#[derive(Serialize, Builder, Debug, Clone, Default)]
#[builder(pattern = "owned")]
#[builder(name = "ThreadRunRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct ThreadRunRequest {
    pub assistant_id: String,
    pub thread: ThreadRequest,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub instructions: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub tools: Option<Vec<Tool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl ThreadRunRequest {
    pub fn builder(
        assistant_id: impl Into<String>,
        thread: ThreadRequest,
    ) -> ThreadRunRequestBuilder {
        ThreadRunRequestBuilder::create_empty()
            .assistant_id(assistant_id)
            .thread(thread)
    }
}

/// A caller-produced result for one pending tool call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Serialize)]
struct ToolOutputsRequest<'a> {
    tool_outputs: &'a [ToolOutput],
}

#[derive(Serialize)]
struct ModifyRunRequest<'a> {
    metadata: &'a HashMap<String, String>,
}

/// A read-only audit record of one action taken during a run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunStep {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    pub assistant_id: String,
    pub thread_id: String,
    pub run_id: String,
    pub status: StepStatus,
    pub step_details: StepDetails,
    pub last_error: Option<RunError>,
    pub expired_at: Option<u64>,
    pub cancelled_at: Option<u64>,
    pub failed_at: Option<u64>,
    pub completed_at: Option<u64>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Cancelled,
    Failed,
    Completed,
    Expired,
}

/// What the step did: created a message or invoked tools.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum StepDetails {
    MessageCreation { message_creation: MessageCreation },
    ToolCalls { tool_calls: Vec<Value> },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageCreation {
    pub message_id: String,
}

impl Client {
    /// Creates a run of an assistant over a thread.
    pub async fn create_run(&self, thread_id: &str, request: &RunRequest) -> ApiResult<Run> {
        require_id(thread_id, "thread id")?;
        require_id(&request.assistant_id, "assistant id")?;
        self.post(&format!("threads/{thread_id}/runs"), request)
            .await
    }

    /// Retrieves a run. A pure read; polling is built on repeated calls.
    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run> {
        require_id(thread_id, "thread id")?;
        require_id(run_id, "run id")?;
        self.get(&format!("threads/{thread_id}/runs/{run_id}")).await
    }

    /// Modifies a run's metadata.
    pub async fn modify_run(
        &self,
        thread_id: &str,
        run_id: &str,
        metadata: &HashMap<String, String>,
    ) -> ApiResult<Run> {
        require_id(thread_id, "thread id")?;
        require_id(run_id, "run id")?;
        self.post(
            &format!("threads/{thread_id}/runs/{run_id}"),
            &ModifyRunRequest { metadata },
        )
        .await
    }

    /// Returns one page of runs belonging to a thread.
    pub async fn list_runs(&self, thread_id: &str, query: &ListQuery) -> ApiResult<Page<Run>> {
        require_id(thread_id, "thread id")?;
        self.get_query(&format!("threads/{thread_id}/runs"), query)
            .await
    }

    /// Requests cancellation of an in-progress run. Cancellation is
    /// cooperative: the run passes through `cancelling` and must be polled
    /// until the server reflects `cancelled`.
    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run> {
        require_id(thread_id, "thread id")?;
        require_id(run_id, "run id")?;
        self.post_empty(&format!("threads/{thread_id}/runs/{run_id}/cancel"))
            .await
    }

    /// Submits tool outputs for a run paused on `requires_action`. The server
    /// requires every pending call resolved in one request; partial
    /// submission is not a supported success path.
    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_outputs: &[ToolOutput],
    ) -> ApiResult<Run> {
        require_id(thread_id, "thread id")?;
        require_id(run_id, "run id")?;
        self.post(
            &format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            &ToolOutputsRequest { tool_outputs },
        )
        .await
    }

    /// Creates a thread and a run over it in one request.
    pub async fn create_thread_and_run(&self, request: &ThreadRunRequest) -> ApiResult<Run> {
        require_id(&request.assistant_id, "assistant id")?;
        self.post("threads/runs", request).await
    }

    /// Retrieves a single run step.
    pub async fn retrieve_run_step(
        &self,
        thread_id: &str,
        run_id: &str,
        step_id: &str,
    ) -> ApiResult<RunStep> {
        require_id(thread_id, "thread id")?;
        require_id(run_id, "run id")?;
        require_id(step_id, "step id")?;
        self.get(&format!("threads/{thread_id}/runs/{run_id}/steps/{step_id}"))
            .await
    }

    /// Returns one page of run steps belonging to a run.
    pub async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
        query: &ListQuery,
    ) -> ApiResult<Page<RunStep>> {
        require_id(thread_id, "thread id")?;
        require_id(run_id, "run id")?;
        self.get_query(&format!("threads/{thread_id}/runs/{run_id}/steps"), query)
            .await
    }
}
