//! Assistant run steps and the tool calls recorded in them.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::codec::{Decode, Encode, ObjectReader, ObjectWriter};
use crate::error::{Result, WireError};
use crate::pagination::{Identified, ListResource};
use crate::variant::{VariantPayload, VariantRecord};

// ─────────────────────────────────────────────────────────────────────────────
// Code interpreter outputs
// ─────────────────────────────────────────────────────────────────────────────

/// Text written to the interpreter's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsOutput {
    /// Log text.
    pub logs: String,
}

impl VariantPayload for LogsOutput {
    const TAG: &'static str = "logs";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("logs", &self.logs);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            logs: fields.required("logs")?,
        })
    }
}

/// Reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// File id.
    pub file_id: String,
}

impl Encode for FileRef {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("file_id", &self.file_id);
        out.into_value()
    }
}

impl Decode for FileRef {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "FileRef")?;
        Ok(Self {
            file_id: fields.required("file_id")?,
        })
    }
}

/// An image produced by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutput {
    /// The stored image.
    pub image: FileRef,
}

impl VariantPayload for ImageOutput {
    const TAG: &'static str = "image";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("image", &self.image);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            image: fields.required("image")?,
        })
    }
}

crate::variant_record! {
    /// One output of a code interpreter call.
    pub enum CodeInterpreterOutput: "type" {
        /// Log text.
        Logs(LogsOutput),
        /// Generated image.
        Image(ImageOutput),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────────────────────────────────────

/// Input and outputs of a code interpreter invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeInterpreterCall {
    /// Code passed to the interpreter.
    pub input: String,
    /// What the interpreter produced.
    pub outputs: Vec<CodeInterpreterOutput>,
}

impl Encode for CodeInterpreterCall {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("input", &self.input).field("outputs", &self.outputs);
        out.into_value()
    }
}

impl Decode for CodeInterpreterCall {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "CodeInterpreterCall")?;
        Ok(Self {
            input: fields.required("input")?,
            outputs: fields.or_default("outputs")?,
        })
    }
}

/// The assistant ran code.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeInterpreterToolCall {
    /// Call id.
    pub id: String,
    /// The invocation.
    pub code_interpreter: CodeInterpreterCall,
}

impl VariantPayload for CodeInterpreterToolCall {
    const TAG: &'static str = "code_interpreter";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("id", &self.id)
            .field("code_interpreter", &self.code_interpreter);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.required("id")?,
            code_interpreter: fields.required("code_interpreter")?,
        })
    }
}

/// The assistant retrieved from attached files.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalToolCall {
    /// Call id.
    pub id: String,
    /// Always an empty object for now.
    pub retrieval: BTreeMap<String, Value>,
}

impl VariantPayload for RetrievalToolCall {
    const TAG: &'static str = "retrieval";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("id", &self.id).field("retrieval", &self.retrieval);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.required("id")?,
            retrieval: fields.or_default("retrieval")?,
        })
    }
}

/// The assistant searched a vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSearchToolCall {
    /// Call id.
    pub id: String,
    /// Search details; an empty object unless results were requested.
    pub file_search: BTreeMap<String, Value>,
}

impl VariantPayload for FileSearchToolCall {
    const TAG: &'static str = "file_search";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("id", &self.id)
            .field("file_search", &self.file_search);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.required("id")?,
            file_search: fields.or_default("file_search")?,
        })
    }
}

/// A function invocation and, once submitted, its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFunction {
    /// Function name.
    pub name: String,
    /// Arguments as a JSON string.
    pub arguments: String,
    /// Submitted output; null until the caller submits it.
    pub output: Option<String>,
}

impl Encode for RunFunction {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("name", &self.name)
            .field("arguments", &self.arguments)
            .nullable("output", &self.output);
        out.into_value()
    }
}

impl Decode for RunFunction {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "RunFunction")?;
        Ok(Self {
            name: fields.required("name")?,
            arguments: fields.required("arguments")?,
            output: fields.nullable("output")?,
        })
    }
}

/// The assistant called a caller-defined function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFunctionToolCall {
    /// Call id.
    pub id: String,
    /// The invocation.
    pub function: RunFunction,
}

impl VariantPayload for RunFunctionToolCall {
    const TAG: &'static str = "function";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("id", &self.id).field("function", &self.function);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.required("id")?,
            function: fields.required("function")?,
        })
    }
}

crate::variant_record! {
    /// A tool call recorded in a run step.
    pub enum RunToolCall: "type" {
        /// Code interpreter call.
        CodeInterpreter(CodeInterpreterToolCall),
        /// Retrieval call.
        Retrieval(RetrievalToolCall),
        /// File search call.
        FileSearch(FileSearchToolCall),
        /// Function call.
        Function(RunFunctionToolCall),
    }
}

impl RunToolCall {
    /// The call id.
    pub fn id(&self) -> &str {
        match self {
            RunToolCall::CodeInterpreter(call) => &call.id,
            RunToolCall::Retrieval(call) => &call.id,
            RunToolCall::FileSearch(call) => &call.id,
            RunToolCall::Function(call) => &call.id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Step details
// ─────────────────────────────────────────────────────────────────────────────

/// Id of a message created by a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCreation {
    /// Message id.
    pub message_id: String,
}

impl Encode for MessageCreation {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("message_id", &self.message_id);
        out.into_value()
    }
}

impl Decode for MessageCreation {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "MessageCreation")?;
        Ok(Self {
            message_id: fields.required("message_id")?,
        })
    }
}

/// The step created a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCreationDetails {
    /// The created message.
    pub message_creation: MessageCreation,
}

impl VariantPayload for MessageCreationDetails {
    const TAG: &'static str = "message_creation";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("message_creation", &self.message_creation);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            message_creation: fields.required("message_creation")?,
        })
    }
}

/// The step called tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallsDetails {
    /// Calls made in this step.
    pub tool_calls: Vec<RunToolCall>,
}

impl VariantPayload for ToolCallsDetails {
    const TAG: &'static str = "tool_calls";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("tool_calls", &self.tool_calls);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            tool_calls: fields.required("tool_calls")?,
        })
    }
}

crate::variant_record! {
    /// What a run step did.
    pub enum StepDetails: "type" {
        /// Created a message.
        MessageCreation(MessageCreationDetails),
        /// Called tools.
        ToolCalls(ToolCallsDetails),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Run step
// ─────────────────────────────────────────────────────────────────────────────

crate::wire_string_enum! {
    /// Lifecycle state of a run step.
    pub enum RunStepStatus {
        /// Still running.
        InProgress => "in_progress",
        /// Cancelled.
        Cancelled => "cancelled",
        /// Failed; see `last_error`.
        Failed => "failed",
        /// Finished.
        Completed => "completed",
        /// Run expired before the step finished.
        Expired => "expired",
    }
}

/// Error recorded on a failed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStepError {
    /// `server_error` or `rate_limit_exceeded`.
    pub code: String,
    /// Description.
    pub message: String,
}

impl Encode for RunStepError {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("code", &self.code).field("message", &self.message);
        out.into_value()
    }
}

impl Decode for RunStepError {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "RunStepError")?;
        Ok(Self {
            code: fields.required("code")?,
            message: fields.required("message")?,
        })
    }
}

/// Token usage of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStepUsage {
    /// Tokens generated.
    pub completion_tokens: u32,
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Sum of both.
    pub total_tokens: u32,
}

impl Encode for RunStepUsage {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("completion_tokens", &self.completion_tokens)
            .field("prompt_tokens", &self.prompt_tokens)
            .field("total_tokens", &self.total_tokens);
        out.into_value()
    }
}

impl Decode for RunStepUsage {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "RunStepUsage")?;
        Ok(Self {
            completion_tokens: fields.required("completion_tokens")?,
            prompt_tokens: fields.required("prompt_tokens")?,
            total_tokens: fields.required("total_tokens")?,
        })
    }
}

/// One step of an assistant run.
///
/// The top-level `type` key mirrors the discriminator of `step_details`; it
/// is derived on encode and checked on decode.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStep {
    /// Step id.
    pub id: String,
    /// Always `"thread.run.step"`.
    pub object: String,
    /// Unix timestamp (seconds).
    pub created_at: i64,
    /// Owning assistant.
    pub assistant_id: String,
    /// Owning thread.
    pub thread_id: String,
    /// Owning run.
    pub run_id: String,
    /// Lifecycle state.
    pub status: RunStepStatus,
    /// What the step did.
    pub step_details: StepDetails,
    /// Set when the step failed.
    pub last_error: Option<RunStepError>,
    /// When the step expired.
    pub expired_at: Option<i64>,
    /// When the step was cancelled.
    pub cancelled_at: Option<i64>,
    /// When the step failed.
    pub failed_at: Option<i64>,
    /// When the step completed.
    pub completed_at: Option<i64>,
    /// Caller metadata.
    pub metadata: Option<BTreeMap<String, Value>>,
    /// Set once the step is no longer in progress.
    pub usage: Option<RunStepUsage>,
}

impl RunStep {
    /// Discriminator of the step's details, also its top-level `type`.
    pub fn step_type(&self) -> &'static str {
        self.step_details.discriminator()
    }

    /// Tool calls made by this step, empty for message creation.
    pub fn tool_calls(&self) -> &[RunToolCall] {
        match &self.step_details {
            StepDetails::ToolCalls(details) => &details.tool_calls,
            StepDetails::MessageCreation(_) => &[],
        }
    }
}

impl Identified for RunStep {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ListResource for RunStep {}

impl Encode for RunStep {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("id", &self.id)
            .field("object", &self.object)
            .field("created_at", &self.created_at)
            .field("assistant_id", &self.assistant_id)
            .field("thread_id", &self.thread_id)
            .field("run_id", &self.run_id)
            .field("type", self.step_type())
            .field("status", &self.status)
            .field("step_details", &self.step_details)
            .nullable("last_error", &self.last_error)
            .nullable("expired_at", &self.expired_at)
            .nullable("cancelled_at", &self.cancelled_at)
            .nullable("failed_at", &self.failed_at)
            .nullable("completed_at", &self.completed_at)
            .nullable("metadata", &self.metadata)
            .nullable("usage", &self.usage);
        out.into_value()
    }
}

impl Decode for RunStep {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "RunStep")?;
        let step_details: StepDetails = fields.required("step_details")?;
        if let Some(step_type) = fields.nullable::<String>("type")?
            && step_type != step_details.discriminator()
        {
            return Err(WireError::MalformedWireValue {
                field: "type".to_string(),
                expected: "the step_details discriminator",
                found: format!("{step_type:?}"),
            });
        }
        Ok(Self {
            id: fields.required("id")?,
            object: fields.required("object")?,
            created_at: fields.required("created_at")?,
            assistant_id: fields.required("assistant_id")?,
            thread_id: fields.required("thread_id")?,
            run_id: fields.required("run_id")?,
            status: fields.required("status")?,
            step_details,
            last_error: fields.nullable("last_error")?,
            expired_at: fields.nullable("expired_at")?,
            cancelled_at: fields.nullable("cancelled_at")?,
            failed_at: fields.nullable("failed_at")?,
            completed_at: fields.nullable("completed_at")?,
            metadata: fields.nullable("metadata")?,
            usage: fields.nullable("usage")?,
        })
    }
}

crate::impl_serde_via_wire!(
    FileRef,
    CodeInterpreterCall,
    RunFunction,
    MessageCreation,
    RunStepError,
    RunStepUsage,
    RunStep,
);
