//! Chat completion requests and responses.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::codec::{Decode, Encode, ObjectReader, ObjectWriter};
use crate::error::{Result, WireError};
use crate::optional::OptionalField;
use crate::union::{UnionArm, WireUnion, decode_union, shape};
use crate::variant::VariantPayload;

// ─────────────────────────────────────────────────────────────────────────────
// Tool choice
// ─────────────────────────────────────────────────────────────────────────────

crate::wire_string_enum! {
    /// Tool choice given as a bare string.
    pub enum ToolChoiceMode {
        /// Never call a tool.
        None => "none",
        /// The model decides.
        Auto => "auto",
        /// The model must call at least one tool.
        Required => "required",
    }
}

/// Controls which tool, if any, the model calls.
///
/// On the wire this is either a bare string (`"none"`, `"auto"`,
/// `"required"`) or `{"type": "function", "function": {"name": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    /// One of the literal modes.
    Mode(ToolChoiceMode),
    /// Force a call to the named function.
    Function {
        /// Function name.
        name: String,
    },
}

impl ToolChoice {
    /// The model will not call a tool.
    pub fn none() -> Self {
        ToolChoice::Mode(ToolChoiceMode::None)
    }

    /// The model picks between replying and calling a tool.
    pub fn auto() -> Self {
        ToolChoice::Mode(ToolChoiceMode::Auto)
    }

    /// Force the model to call `name`.
    pub fn function(name: impl Into<String>) -> Self {
        ToolChoice::Function { name: name.into() }
    }
}

impl Encode for ToolChoice {
    fn encode(&self) -> Value {
        match self {
            ToolChoice::Mode(mode) => mode.encode(),
            ToolChoice::Function { name } => {
                let mut function = ObjectWriter::new();
                function.field("name", name);
                let mut out = ObjectWriter::new();
                out.field("type", "function")
                    .raw("function", function.into_value());
                out.into_value()
            }
        }
    }
}

fn decode_forced_function(value: &Value) -> Result<ToolChoice> {
    let fields = ObjectReader::new(value, "ToolChoice")?;
    let tag = fields.tag("type")?;
    if tag != "function" {
        return Err(WireError::unknown_tag("ToolChoice", tag).at("type"));
    }
    let function: Value = fields.required("function")?;
    let name = ObjectReader::new(&function, "ToolChoiceFunction")
        .and_then(|f| f.required::<String>("name"))
        .map_err(|e| e.at("function"))?;
    Ok(ToolChoice::Function { name })
}

impl WireUnion for ToolChoice {
    const NAME: &'static str = "ToolChoice";
    const ARMS: &'static [UnionArm<Self>] = &[
        UnionArm {
            shape: "object",
            matches: shape::object,
            build: decode_forced_function,
        },
        UnionArm {
            shape: "string",
            matches: shape::string,
            build: |v| ToolChoiceMode::decode(v).map(ToolChoice::Mode),
        },
    ];

    fn shape(&self) -> &'static str {
        match self {
            ToolChoice::Mode(_) => "string",
            ToolChoice::Function { .. } => "object",
        }
    }
}

impl Decode for ToolChoice {
    fn decode(value: &Value) -> Result<Self> {
        decode_union(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stop sequences
// ─────────────────────────────────────────────────────────────────────────────

/// Up to four sequences at which generation stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopSequences {
    /// Several sequences.
    Many(Vec<String>),
    /// A single sequence.
    Single(String),
}

impl Encode for StopSequences {
    fn encode(&self) -> Value {
        match self {
            StopSequences::Many(v) => v.encode(),
            StopSequences::Single(s) => s.encode(),
        }
    }
}

impl WireUnion for StopSequences {
    const NAME: &'static str = "StopSequences";
    const ARMS: &'static [UnionArm<Self>] = &[
        UnionArm {
            shape: "array of strings",
            matches: shape::string_array,
            build: |v| Vec::<String>::decode(v).map(StopSequences::Many),
        },
        UnionArm {
            shape: "string",
            matches: shape::string,
            build: |v| String::decode(v).map(StopSequences::Single),
        },
    ];

    fn shape(&self) -> &'static str {
        match self {
            StopSequences::Many(_) => "array of strings",
            StopSequences::Single(_) => "string",
        }
    }
}

impl Decode for StopSequences {
    fn decode(value: &Value) -> Result<Self> {
        decode_union(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response format
// ─────────────────────────────────────────────────────────────────────────────

/// Free-form text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextFormat;

impl VariantPayload for TextFormat {
    const TAG: &'static str = "text";

    fn write_fields(&self, _out: &mut ObjectWriter) {}

    fn read_fields(_fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(TextFormat)
    }
}

/// Output constrained to a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonObjectFormat;

impl VariantPayload for JsonObjectFormat {
    const TAG: &'static str = "json_object";

    fn write_fields(&self, _out: &mut ObjectWriter) {}

    fn read_fields(_fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(JsonObjectFormat)
    }
}

crate::variant_record! {
    /// Format the model must produce.
    pub enum ResponseFormat: "type" {
        /// `{"type": "text"}`
        Text(TextFormat),
        /// `{"type": "json_object"}`
        JsonObject(JsonObjectFormat),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────────────────────────────────────

/// A function the model may call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    /// Function name.
    pub name: String,
    /// What the function does.
    pub description: Option<String>,
    /// JSON Schema of the arguments.
    pub parameters: Option<Value>,
}

impl Encode for FunctionDefinition {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("name", &self.name)
            .omit_none("description", &self.description)
            .omit_none("parameters", &self.parameters);
        out.into_value()
    }
}

impl Decode for FunctionDefinition {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "FunctionDefinition")?;
        Ok(Self {
            name: fields.required("name")?,
            description: fields.nullable("description")?,
            parameters: fields.nullable("parameters")?,
        })
    }
}

/// A function tool offered to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTool {
    /// The function.
    pub function: FunctionDefinition,
}

impl VariantPayload for FunctionTool {
    const TAG: &'static str = "function";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("function", &self.function);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            function: fields.required("function")?,
        })
    }
}

crate::variant_record! {
    /// A tool the model may call.
    pub enum ChatCompletionTool: "type" {
        /// A function tool.
        Function(FunctionTool),
    }
}

impl ChatCompletionTool {
    /// A function tool.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        ChatCompletionTool::Function(FunctionTool {
            function: FunctionDefinition {
                name: name.into(),
                description: Some(description.into()),
                parameters: Some(parameters),
            },
        })
    }
}

/// Name and JSON-encoded arguments of a function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Arguments as a JSON string, as generated by the model.
    pub arguments: String,
}

impl Encode for FunctionCall {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("name", &self.name)
            .field("arguments", &self.arguments);
        out.into_value()
    }
}

impl Decode for FunctionCall {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "FunctionCall")?;
        Ok(Self {
            name: fields.required("name")?,
            arguments: fields.required("arguments")?,
        })
    }
}

/// A function call made by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionToolCall {
    /// Call id, echoed back in the tool message.
    pub id: String,
    /// The call.
    pub function: FunctionCall,
}

impl VariantPayload for FunctionToolCall {
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
    /// A tool call in an assistant message.
    pub enum ChatToolCall: "type" {
        /// A function call.
        Function(FunctionToolCall),
    }
}

impl ChatToolCall {
    /// The call id.
    pub fn id(&self) -> &str {
        match self {
            ChatToolCall::Function(call) => &call.id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Instructions from the developer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMessage {
    /// Message text.
    pub content: String,
    /// Participant name.
    pub name: OptionalField<String>,
}

impl VariantPayload for SystemMessage {
    const TAG: &'static str = "system";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("content", &self.content).optional("name", &self.name);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            content: fields.required("content")?,
            name: fields.optional("name")?,
        })
    }
}

/// A message from the end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    /// Message text.
    pub content: String,
    /// Participant name.
    pub name: OptionalField<String>,
}

impl VariantPayload for UserMessage {
    const TAG: &'static str = "user";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("content", &self.content).optional("name", &self.name);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            content: fields.required("content")?,
            name: fields.optional("name")?,
        })
    }
}

/// A message written by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantMessage {
    /// Message text; null when the model only called tools.
    pub content: Option<String>,
    /// Refusal text, when the model declined.
    pub refusal: OptionalField<String>,
    /// Tool calls made by the model; omitted when empty.
    pub tool_calls: Vec<ChatToolCall>,
    /// Participant name.
    pub name: OptionalField<String>,
}

impl AssistantMessage {
    /// An assistant message with text only.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            refusal: OptionalField::Absent,
            tool_calls: Vec::new(),
            name: OptionalField::Absent,
        }
    }
}

impl VariantPayload for AssistantMessage {
    const TAG: &'static str = "assistant";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.nullable("content", &self.content)
            .optional("refusal", &self.refusal)
            .optional("name", &self.name);
        if !self.tool_calls.is_empty() {
            out.field("tool_calls", &self.tool_calls);
        }
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            content: fields.nullable("content")?,
            refusal: fields.optional("refusal")?,
            tool_calls: fields.or_default("tool_calls")?,
            name: fields.optional("name")?,
        })
    }
}

/// The result of a tool call, sent back to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMessage {
    /// Tool output.
    pub content: String,
    /// Id of the call this answers.
    pub tool_call_id: String,
}

impl VariantPayload for ToolMessage {
    const TAG: &'static str = "tool";

    fn write_fields(&self, out: &mut ObjectWriter) {
        out.field("content", &self.content)
            .field("tool_call_id", &self.tool_call_id);
    }

    fn read_fields(fields: &ObjectReader<'_>) -> Result<Self> {
        Ok(Self {
            content: fields.required("content")?,
            tool_call_id: fields.required("tool_call_id")?,
        })
    }
}

crate::variant_record! {
    /// A message in a chat conversation, keyed by `role`.
    pub enum ChatMessage: "role" {
        /// Developer instructions.
        System(SystemMessage),
        /// End-user input.
        User(UserMessage),
        /// Model output.
        Assistant(AssistantMessage),
        /// Tool result.
        Tool(ToolMessage),
    }
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System(SystemMessage {
            content: content.into(),
            name: OptionalField::Absent,
        })
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User(UserMessage {
            content: content.into(),
            name: OptionalField::Absent,
        })
    }

    /// An assistant message with text only.
    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant(AssistantMessage::text(content))
    }

    /// A tool result.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage::Tool(ToolMessage {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        })
    }

    /// The message text, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            ChatMessage::System(m) => Some(&m.content),
            ChatMessage::User(m) => Some(&m.content),
            ChatMessage::Assistant(m) => m.content.as_deref(),
            ChatMessage::Tool(m) => Some(&m.content),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for creating a chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionsCreateRequest {
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Model id.
    pub model: String,
    /// Penalty for token frequency, -2.0 to 2.0.
    pub frequency_penalty: OptionalField<f64>,
    /// Per-token logit bias, keyed by token id.
    pub logit_bias: OptionalField<BTreeMap<String, f64>>,
    /// Maximum tokens to generate.
    pub max_tokens: OptionalField<u32>,
    /// Number of choices to generate.
    pub n: OptionalField<u32>,
    /// Penalty for token presence, -2.0 to 2.0.
    pub presence_penalty: OptionalField<f64>,
    /// Output format.
    pub response_format: OptionalField<ResponseFormat>,
    /// Sampling seed.
    pub seed: OptionalField<i64>,
    /// Stop sequences.
    pub stop: OptionalField<StopSequences>,
    /// Stream partial deltas. Streaming transport itself is not provided here.
    pub stream: OptionalField<bool>,
    /// Sampling temperature, 0 to 2.
    pub temperature: OptionalField<f64>,
    /// Nucleus sampling mass.
    pub top_p: OptionalField<f64>,
    /// Tools the model may call.
    pub tools: OptionalField<Vec<ChatCompletionTool>>,
    /// Which tool the model calls.
    pub tool_choice: OptionalField<ToolChoice>,
    /// End-user identifier.
    pub user: OptionalField<String>,
}

impl ChatCompletionsCreateRequest {
    /// Start building a request.
    pub fn builder(model: impl Into<String>) -> ChatCompletionsCreateRequestBuilder {
        ChatCompletionsCreateRequestBuilder::new(model)
    }
}

/// Builder for [`ChatCompletionsCreateRequest`].
#[derive(Debug, Clone)]
pub struct ChatCompletionsCreateRequestBuilder {
    request: ChatCompletionsCreateRequest,
}

impl ChatCompletionsCreateRequestBuilder {
    fn new(model: impl Into<String>) -> Self {
        Self {
            request: ChatCompletionsCreateRequest {
                messages: Vec::new(),
                model: model.into(),
                frequency_penalty: OptionalField::Absent,
                logit_bias: OptionalField::Absent,
                max_tokens: OptionalField::Absent,
                n: OptionalField::Absent,
                presence_penalty: OptionalField::Absent,
                response_format: OptionalField::Absent,
                seed: OptionalField::Absent,
                stop: OptionalField::Absent,
                stream: OptionalField::Absent,
                temperature: OptionalField::Absent,
                top_p: OptionalField::Absent,
                tools: OptionalField::Absent,
                tool_choice: OptionalField::Absent,
                user: OptionalField::Absent,
            },
        }
    }

    /// Append a message.
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.request.messages.push(message);
        self
    }

    /// Append several messages.
    pub fn messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.request.messages.extend(messages);
        self
    }

    /// Set the frequency penalty.
    pub fn frequency_penalty(mut self, value: f64) -> Self {
        self.request.frequency_penalty = value.into();
        self
    }

    /// Set the logit bias map.
    pub fn logit_bias(mut self, value: BTreeMap<String, f64>) -> Self {
        self.request.logit_bias = value.into();
        self
    }

    /// Set the token limit.
    pub fn max_tokens(mut self, value: u32) -> Self {
        self.request.max_tokens = value.into();
        self
    }

    /// Set the number of choices.
    pub fn n(mut self, value: u32) -> Self {
        self.request.n = value.into();
        self
    }

    /// Set the presence penalty.
    pub fn presence_penalty(mut self, value: f64) -> Self {
        self.request.presence_penalty = value.into();
        self
    }

    /// Set the response format.
    pub fn response_format(mut self, value: impl Into<ResponseFormat>) -> Self {
        self.request.response_format = OptionalField::Present(value.into());
        self
    }

    /// Set the sampling seed.
    pub fn seed(mut self, value: i64) -> Self {
        self.request.seed = value.into();
        self
    }

    /// Set the stop sequences.
    pub fn stop(mut self, value: StopSequences) -> Self {
        self.request.stop = value.into();
        self
    }

    /// Request a streamed response.
    pub fn stream(mut self, value: bool) -> Self {
        self.request.stream = value.into();
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, value: f64) -> Self {
        self.request.temperature = value.into();
        self
    }

    /// Set top-p.
    pub fn top_p(mut self, value: f64) -> Self {
        self.request.top_p = value.into();
        self
    }

    /// Append a tool.
    pub fn tool(mut self, tool: ChatCompletionTool) -> Self {
        match &mut self.request.tools {
            OptionalField::Present(tools) => tools.push(tool),
            other => *other = OptionalField::Present(vec![tool]),
        }
        self
    }

    /// Set the tool choice.
    pub fn tool_choice(mut self, value: ToolChoice) -> Self {
        self.request.tool_choice = value.into();
        self
    }

    /// Set the end-user identifier.
    pub fn user(mut self, value: impl Into<String>) -> Self {
        self.request.user = OptionalField::Present(value.into());
        self
    }

    /// Finish the request.
    ///
    /// Fails with a missing-field error if no message was added.
    pub fn build(self) -> Result<ChatCompletionsCreateRequest> {
        if self.request.messages.is_empty() {
            return Err(WireError::missing_field(
                "messages",
                "ChatCompletionsCreateRequest",
            ));
        }
        Ok(self.request)
    }
}

impl Encode for ChatCompletionsCreateRequest {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("messages", &self.messages)
            .field("model", &self.model)
            .optional("frequency_penalty", &self.frequency_penalty)
            .optional("logit_bias", &self.logit_bias)
            .optional("max_tokens", &self.max_tokens)
            .optional("n", &self.n)
            .optional("presence_penalty", &self.presence_penalty)
            .optional("response_format", &self.response_format)
            .optional("seed", &self.seed)
            .optional("stop", &self.stop)
            .optional("stream", &self.stream)
            .optional("temperature", &self.temperature)
            .optional("top_p", &self.top_p)
            .optional("tools", &self.tools)
            .optional("tool_choice", &self.tool_choice)
            .optional("user", &self.user);
        out.into_value()
    }
}

impl Decode for ChatCompletionsCreateRequest {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "ChatCompletionsCreateRequest")?;
        Ok(Self {
            messages: fields.required("messages")?,
            model: fields.required("model")?,
            frequency_penalty: fields.optional("frequency_penalty")?,
            logit_bias: fields.optional("logit_bias")?,
            max_tokens: fields.optional("max_tokens")?,
            n: fields.optional("n")?,
            presence_penalty: fields.optional("presence_penalty")?,
            response_format: fields.optional("response_format")?,
            seed: fields.optional("seed")?,
            stop: fields.optional("stop")?,
            stream: fields.optional("stream")?,
            temperature: fields.optional("temperature")?,
            top_p: fields.optional("top_p")?,
            tools: fields.optional("tools")?,
            tool_choice: fields.optional("tool_choice")?,
            user: fields.optional("user")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

crate::wire_string_enum! {
    /// Why the model stopped generating.
    pub enum FinishReason {
        /// Natural stop or a stop sequence.
        Stop => "stop",
        /// Token limit reached.
        Length => "length",
        /// Content was filtered.
        ContentFilter => "content_filter",
        /// The model called tools.
        ToolCalls => "tool_calls",
        /// The model called a function (legacy).
        FunctionCall => "function_call",
    }
}

/// One generated choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    /// Position of the choice.
    pub index: u32,
    /// Why generation stopped; null while incomplete.
    pub finish_reason: Option<FinishReason>,
    /// The generated message.
    pub message: ChatMessage,
}

impl Encode for Choice {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("index", &self.index)
            .nullable("finish_reason", &self.finish_reason)
            .field("message", &self.message);
        out.into_value()
    }
}

impl Decode for Choice {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "Choice")?;
        Ok(Self {
            index: fields.required("index")?,
            finish_reason: fields.nullable("finish_reason")?,
            message: fields.required("message")?,
        })
    }
}

/// Token accounting for a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Tokens generated.
    pub completion_tokens: u32,
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Sum of both.
    pub total_tokens: u32,
    /// Reasoning tokens among the completion tokens, when reported.
    pub reasoning_tokens: Option<u32>,
}

impl Encode for Usage {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("completion_tokens", &self.completion_tokens)
            .field("prompt_tokens", &self.prompt_tokens)
            .field("total_tokens", &self.total_tokens);
        if let Some(reasoning) = self.reasoning_tokens {
            let mut details = ObjectWriter::new();
            details.field("reasoning_tokens", &reasoning);
            out.raw("completion_tokens_details", details.into_value());
        }
        out.into_value()
    }
}

impl Decode for Usage {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "Usage")?;
        let details: Option<Value> = fields.nullable("completion_tokens_details")?;
        let reasoning_tokens = match &details {
            Some(details) => ObjectReader::new(details, "CompletionTokensDetails")
                .and_then(|d| d.nullable("reasoning_tokens"))
                .map_err(|e| e.at("completion_tokens_details"))?,
            None => None,
        };
        Ok(Self {
            completion_tokens: fields.required("completion_tokens")?,
            prompt_tokens: fields.required("prompt_tokens")?,
            total_tokens: fields.required("total_tokens")?,
            reasoning_tokens,
        })
    }
}

/// A chat completion returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    /// Completion id.
    pub id: String,
    /// Always `"chat.completion"`.
    pub object: String,
    /// Unix timestamp (seconds).
    pub created: i64,
    /// Model used.
    pub model: String,
    /// Backend configuration fingerprint.
    pub system_fingerprint: Option<String>,
    /// Service tier used, when requested.
    pub service_tier: Option<String>,
    /// Generated choices.
    pub choices: Vec<Choice>,
    /// Token accounting.
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Text of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content())
    }
}

impl Encode for ChatCompletion {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("id", &self.id)
            .field("object", &self.object)
            .field("created", &self.created)
            .field("model", &self.model)
            .omit_none("system_fingerprint", &self.system_fingerprint)
            .omit_none("service_tier", &self.service_tier)
            .field("choices", &self.choices)
            .omit_none("usage", &self.usage);
        out.into_value()
    }
}

impl Decode for ChatCompletion {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "ChatCompletion")?;
        Ok(Self {
            id: fields.required("id")?,
            object: fields.required("object")?,
            created: fields.required("created")?,
            model: fields.required("model")?,
            system_fingerprint: fields.nullable("system_fingerprint")?,
            service_tier: fields.nullable("service_tier")?,
            choices: fields.required("choices")?,
            usage: fields.nullable("usage")?,
        })
    }
}

crate::impl_serde_via_wire!(
    ToolChoice,
    StopSequences,
    FunctionDefinition,
    FunctionCall,
    ChatCompletionsCreateRequest,
    Choice,
    Usage,
    ChatCompletion,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::VariantRecord;
    use serde_json::json;

    #[test]
    fn test_tool_choice_literal() {
        assert_eq!(ToolChoice::none().encode(), json!("none"));
        assert_eq!(ToolChoice::decode(&json!("auto")).unwrap(), ToolChoice::auto());
    }

    #[test]
    fn test_tool_choice_function() {
        let choice = ToolChoice::function("get_weather");
        let wire = json!({"type": "function", "function": {"name": "get_weather"}});
        assert_eq!(choice.encode(), wire);
        assert_eq!(ToolChoice::decode(&wire).unwrap(), choice);
    }

    #[test]
    fn test_tool_choice_rejects() {
        let err = ToolChoice::decode(&json!(3)).unwrap_err();
        assert!(matches!(err, WireError::UnrecognizedUnionShape { json_type: "number", .. }));

        let err = ToolChoice::decode(&json!("sometimes")).unwrap_err();
        assert!(matches!(err, WireError::MalformedWireValue { .. }));

        let err = ToolChoice::decode(&json!({"type": "retrieval"})).unwrap_err();
        assert_eq!(err.unknown_tag_value(), Some("retrieval"));

        let err = ToolChoice::decode(&json!({"type": "function", "function": {}})).unwrap_err();
        assert_eq!(err.field(), Some("function.name"));
    }

    #[test]
    fn test_stop_sequences() {
        assert_eq!(
            StopSequences::decode(&json!(["\n", "END"])).unwrap(),
            StopSequences::Many(vec!["\n".into(), "END".into()])
        );
        assert_eq!(
            StopSequences::decode(&json!("END")).unwrap(),
            StopSequences::Single("END".into())
        );
    }

    #[test]
    fn test_response_format_envelope() {
        let format = ResponseFormat::from(JsonObjectFormat);
        assert_eq!(format.encode(), json!({"type": "json_object"}));
        assert_eq!(
            ResponseFormat::decode(&json!({"type": "text"})).unwrap(),
            ResponseFormat::Text(TextFormat)
        );
    }

    #[test]
    fn test_messages_keyed_by_role() {
        let message = ChatMessage::tool("call_1", "42");
        assert_eq!(
            message.encode(),
            json!({"role": "tool", "content": "42", "tool_call_id": "call_1"})
        );
        let err = ChatMessage::decode(&json!({"role": "wizard", "content": "x"})).unwrap_err();
        assert_eq!(err.field(), Some("role"));
        assert_eq!(ChatMessage::registry().key(), "role");
    }

    #[test]
    fn test_assistant_tool_calls() {
        let wire = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "lookup", "arguments": "{\"q\":\"x\"}"}
            }]
        });
        let message = ChatMessage::decode(&wire).unwrap();
        let ChatMessage::Assistant(assistant) = &message else {
            panic!("expected assistant message");
        };
        assert_eq!(assistant.content, None);
        assert_eq!(assistant.tool_calls[0].id(), "call_1");
        assert_eq!(message.encode(), wire);
    }

    #[test]
    fn test_request_encoding() {
        let request = ChatCompletionsCreateRequest::builder("gpt-4o-mini")
            .message(ChatMessage::system("be brief"))
            .message(ChatMessage::user("hi"))
            .temperature(0.2)
            .tool(ChatCompletionTool::function(
                "lookup",
                "Look something up",
                json!({"type": "object"}),
            ))
            .tool_choice(ToolChoice::auto())
            .build()
            .unwrap();

        let wire = request.encode();
        assert_eq!(wire["model"], "gpt-4o-mini");
        assert_eq!(wire["temperature"], 0.2);
        assert_eq!(wire["tool_choice"], "auto");
        assert_eq!(wire["tools"][0]["type"], "function");
        assert!(wire.get("max_tokens").is_none());
        assert!(wire.get("stop").is_none());

        assert_eq!(ChatCompletionsCreateRequest::decode(&wire).unwrap(), request);
    }

    #[test]
    fn test_request_requires_messages() {
        let err = ChatCompletionsCreateRequest::builder("m").build().unwrap_err();
        assert_eq!(
            err,
            WireError::missing_field("messages", "ChatCompletionsCreateRequest")
        );
    }

    #[test]
    fn test_completion_decode() {
        let wire = json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4o-mini",
            "system_fingerprint": null,
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {"role": "assistant", "content": "Hello!", "refusal": null},
                "logprobs": null
            }],
            "usage": {
                "prompt_tokens": 5,
                "completion_tokens": 2,
                "total_tokens": 7,
                "completion_tokens_details": {"reasoning_tokens": 0}
            }
        });
        let completion = ChatCompletion::decode(&wire).unwrap();
        assert_eq!(completion.first_content(), Some("Hello!"));
        assert_eq!(completion.choices[0].finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.system_fingerprint, None);
        assert_eq!(completion.usage.unwrap().reasoning_tokens, Some(0));

        let ChatMessage::Assistant(message) = &completion.choices[0].message else {
            panic!("expected assistant message");
        };
        assert!(message.refusal.is_null());
    }
}
