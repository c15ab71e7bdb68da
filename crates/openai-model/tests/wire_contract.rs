//! Wire contract tests across the public model types.
//!
//! Every registered variant and every union arm must survive an encode and
//! decode, and the tags seen on both paths must agree with the registries.

use std::collections::BTreeMap;

use openai_model::chat::{
    AssistantMessage, ChatCompletionTool, ChatMessage, ChatToolCall, FunctionCall,
    FunctionToolCall, JsonObjectFormat, ResponseFormat, StopSequences, TextFormat, ToolChoice,
};
use openai_model::embeddings::{Embedding, EmbeddingInput, EmbeddingVector};
use openai_model::runs::{
    CodeInterpreterCall, CodeInterpreterOutput, CodeInterpreterToolCall, FileRef,
    FileSearchToolCall, ImageOutput, LogsOutput, MessageCreation, MessageCreationDetails,
    RetrievalToolCall, RunFunction, RunFunctionToolCall, RunToolCall, StepDetails,
    ToolCallsDetails,
};
use openai_model::vector_stores::VectorStoreModifyRequest;
use openai_model::{
    Decode, Encode, OptionalField, PageBounds, PageRequest, PageResponse, Paginator, SortOrder,
    VariantEntry, VariantRecord, VariantRegistry, WireError, WireUnion,
};
use proptest::prelude::*;
use serde_json::{Value, json};

// ─────────────────────────────────────────────────────────────────────────────
// Variant registries
// ─────────────────────────────────────────────────────────────────────────────

fn run_tool_calls() -> Vec<RunToolCall> {
    vec![
        CodeInterpreterToolCall {
            id: "call_ci".into(),
            code_interpreter: CodeInterpreterCall {
                input: "2 + 2".into(),
                outputs: code_interpreter_outputs(),
            },
        }
        .into(),
        RetrievalToolCall {
            id: "call_r".into(),
            retrieval: BTreeMap::new(),
        }
        .into(),
        FileSearchToolCall {
            id: "call_fs".into(),
            file_search: BTreeMap::from([("ranking".to_string(), json!("auto"))]),
        }
        .into(),
        RunFunctionToolCall {
            id: "call_fn".into(),
            function: RunFunction {
                name: "lookup".into(),
                arguments: "{\"q\":1}".into(),
                output: Some("found".into()),
            },
        }
        .into(),
    ]
}

fn code_interpreter_outputs() -> Vec<CodeInterpreterOutput> {
    vec![
        LogsOutput { logs: "4\n".into() }.into(),
        ImageOutput {
            image: FileRef {
                file_id: "file_img".into(),
            },
        }
        .into(),
    ]
}

fn step_details() -> Vec<StepDetails> {
    vec![
        MessageCreationDetails {
            message_creation: MessageCreation {
                message_id: "msg_1".into(),
            },
        }
        .into(),
        ToolCallsDetails {
            tool_calls: run_tool_calls(),
        }
        .into(),
    ]
}

fn chat_messages() -> Vec<ChatMessage> {
    let mut with_calls = AssistantMessage::text("calling");
    with_calls.tool_calls = chat_tool_calls();
    with_calls.content = None;
    vec![
        ChatMessage::system("rules"),
        ChatMessage::user("question"),
        ChatMessage::assistant("answer"),
        with_calls.into(),
        ChatMessage::tool("call_1", "result"),
    ]
}

fn chat_tool_calls() -> Vec<ChatToolCall> {
    vec![
        FunctionToolCall {
            id: "call_1".into(),
            function: FunctionCall {
                name: "lookup".into(),
                arguments: "{}".into(),
            },
        }
        .into(),
    ]
}

fn response_formats() -> Vec<ResponseFormat> {
    vec![TextFormat.into(), JsonObjectFormat.into()]
}

fn chat_tools() -> Vec<ChatCompletionTool> {
    vec![ChatCompletionTool::function(
        "lookup",
        "Look a term up",
        json!({"type": "object", "properties": {"q": {"type": "string"}}}),
    )]
}

/// Round-trips every sample and checks that together they cover each tag
/// the registry knows, with the tag written under the registry's key.
fn assert_registry_contract<V>(samples: &[V])
where
    V: VariantRecord + Encode + Decode + PartialEq + std::fmt::Debug,
{
    let registry = V::registry();
    let mut seen = Vec::new();
    for sample in samples {
        let wire = sample.encode();
        let tag = sample.discriminator();
        assert_eq!(
            wire.get(registry.key()).and_then(Value::as_str),
            Some(tag),
            "{} wrote a different tag than it reports",
            registry.name()
        );
        assert_eq!(registry.resolve(tag).map(VariantEntry::tag), Some(tag));
        let decoded = V::decode(&wire).unwrap_or_else(|e| panic!("{}: {e}", registry.name()));
        assert_eq!(&decoded, sample);
        seen.push(tag);
    }
    for tag in registry.tags() {
        assert!(
            seen.contains(&tag),
            "{} tag {tag:?} has no round-trip sample",
            registry.name()
        );
    }
}

#[test]
fn test_every_registry_round_trips() {
    assert_registry_contract(&run_tool_calls());
    assert_registry_contract(&code_interpreter_outputs());
    assert_registry_contract(&step_details());
    assert_registry_contract(&chat_messages());
    assert_registry_contract(&chat_tool_calls());
    assert_registry_contract(&response_formats());
    assert_registry_contract(&chat_tools());
}

#[test]
fn test_unknown_tool_call_type() {
    let err = RunToolCall::decode(&json!({"type": "not_a_real_type", "x": 1})).unwrap_err();
    assert!(err.is_unknown_tag());
    assert_eq!(err.unknown_tag_value(), Some("not_a_real_type"));
    assert_eq!(
        err,
        WireError::UnknownVariantTag {
            field: "type".into(),
            registry: "RunToolCall",
            tag: "not_a_real_type".into(),
        }
    );
}

#[test]
fn test_tags_are_exact() {
    for tag in ["Function", "function ", " function", "FUNCTION"] {
        let err = RunToolCall::decode(&json!({"type": tag, "id": "x"})).unwrap_err();
        assert_eq!(err.unknown_tag_value(), Some(tag));
    }
}

#[test]
#[should_panic(expected = "not registered")]
fn test_encoding_unregistered_payload_fails_fast() {
    let partial: VariantRegistry<CodeInterpreterOutput> = VariantRegistry::new(
        "PartialOutputs",
        "type",
        vec![VariantEntry::of::<LogsOutput>()],
    );
    let image = CodeInterpreterOutput::from(ImageOutput {
        image: FileRef {
            file_id: "file_1".into(),
        },
    });
    partial.encode(&image);
}

#[test]
#[should_panic(expected = "duplicate discriminator")]
fn test_duplicate_tags_rejected() {
    let _: VariantRegistry<CodeInterpreterOutput> = VariantRegistry::new(
        "Twice",
        "type",
        vec![
            VariantEntry::of::<LogsOutput>(),
            VariantEntry::of::<LogsOutput>(),
        ],
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Unions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_embedding_boolean_is_unrecognized() {
    let err = EmbeddingVector::decode(&json!(true)).unwrap_err();
    assert!(matches!(
        err,
        WireError::UnrecognizedUnionShape {
            json_type: "boolean",
            ..
        }
    ));

    let err = Embedding::decode(&json!({"object": "embedding", "index": 0, "embedding": true}))
        .unwrap_err();
    assert!(matches!(err, WireError::UnrecognizedUnionShape { .. }));
    assert_eq!(err.field(), Some("embedding"));
}

/// Encodes each sample, checks that the arm which accepts the wire value is
/// the sample's own arm, and that decoding gives the sample back. Every arm
/// must be covered by at least one sample.
fn assert_union_contract<U>(samples: &[U])
where
    U: WireUnion + Decode + PartialEq + std::fmt::Debug,
{
    for sample in samples {
        let wire = sample.encode();
        let arm = U::ARMS
            .iter()
            .find(|arm| (arm.matches)(&wire))
            .unwrap_or_else(|| panic!("{}: no arm accepts {wire}", U::NAME));
        assert_eq!(arm.shape, sample.shape(), "{}: {wire} decodes through another arm", U::NAME);
        assert_eq!(&U::decode(&wire).unwrap(), sample);
    }
    for arm in U::ARMS {
        assert!(
            samples.iter().any(|sample| sample.shape() == arm.shape),
            "{}: arm {:?} has no sample",
            U::NAME,
            arm.shape
        );
    }
}

#[test]
fn test_union_arms_round_trip() {
    assert_union_contract(&[
        EmbeddingInput::text("hello"),
        EmbeddingInput::text(""),
        EmbeddingInput::texts(vec!["a".into(), "b".into()]).unwrap(),
        EmbeddingInput::texts(vec![String::new()]).unwrap(),
        EmbeddingInput::tokens(vec![1, 2, 3]).unwrap(),
        EmbeddingInput::token_batch(vec![vec![1], vec![2, 3]]).unwrap(),
    ]);

    assert_union_contract(&[
        EmbeddingVector::Float(vec![0.25, -1.5]),
        EmbeddingVector::Float(vec![]),
        EmbeddingVector::Base64("AACAPw==".into()),
        EmbeddingVector::Base64(String::new()),
    ]);

    assert_union_contract(&[ToolChoice::none(), ToolChoice::auto(), ToolChoice::function("f")]);

    assert_union_contract(&[
        StopSequences::Single("END".into()),
        StopSequences::Many(vec!["\n\n".into(), "END".into()]),
        StopSequences::Many(vec![]),
    ]);
}

#[test]
fn test_empty_embedding_batches_are_unrepresentable() {
    assert!(EmbeddingInput::texts(vec![]).is_err());
    assert!(EmbeddingInput::tokens(vec![]).is_err());
    assert!(EmbeddingInput::token_batch(vec![vec![]]).is_err());
    for wire in [json!([]), json!([[]]), json!([[1], []])] {
        let err = EmbeddingInput::decode(&wire).unwrap_err();
        assert!(matches!(err, WireError::UnrecognizedUnionShape { .. }), "{wire}: {err}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Optional fields
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_three_states_on_the_wire() {
    let request = VectorStoreModifyRequest {
        name: OptionalField::Present("docs".into()),
        expires_after: OptionalField::Null,
        metadata: OptionalField::Absent,
    };
    let wire = request.encode();
    let object = wire.as_object().unwrap();
    assert_eq!(object.get("name"), Some(&json!("docs")));
    assert_eq!(object.get("expires_after"), Some(&Value::Null));
    assert!(!object.contains_key("metadata"));
    assert_eq!(VectorStoreModifyRequest::decode(&wire).unwrap(), request);
}

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_cursor_advance() {
    let request = PageRequest::builder()
        .limit(2)
        .order(SortOrder::Asc)
        .build()
        .unwrap();
    let page = PageResponse::<Value>::decode(&json!({
        "object": "list",
        "data": [{"id": "a"}, {"id": "b"}],
        "first_id": "a",
        "last_id": "b",
        "has_more": true
    }))
    .unwrap();

    let next = page.next_request(&request).unwrap();
    assert_eq!(next.after(), Some("b"));
    assert_eq!(next.before(), None);
    assert_eq!(next.limit(), Some(2));
    assert_eq!(next.order(), Some(SortOrder::Asc));
}

#[test]
fn test_limit_above_bound() {
    let request = PageRequest::builder().limit(101).build().unwrap();
    let err = request
        .to_query_parameters(&PageBounds::new(1, 100))
        .unwrap_err();
    assert!(matches!(
        err,
        WireError::InvalidPageParameter {
            parameter: "limit",
            ..
        }
    ));
}

#[test]
fn test_both_cursors_rejected() {
    let err = PageRequest::builder()
        .after("a")
        .before("b")
        .build()
        .unwrap_err();
    assert!(matches!(err, WireError::InvalidPageParameter { .. }));
}

#[test]
fn test_paginator_walks_to_the_end() {
    let pages = [
        json!({"object": "list", "data": [{"id": "a"}], "first_id": "a", "last_id": "a", "has_more": true}),
        json!({"object": "list", "data": [{"id": "b"}], "first_id": "b", "last_id": "b", "has_more": false}),
    ];
    let mut paginator = Paginator::new(PageRequest::builder().limit(1).build().unwrap());
    let mut cursors = Vec::new();
    for page in &pages {
        let request = paginator.next_request().cloned().unwrap();
        cursors.push(request.after().map(str::to_string));
        paginator.advance(&PageResponse::<Value>::decode(page).unwrap());
    }
    assert!(paginator.is_done());
    assert_eq!(paginator.pages_seen(), 2);
    assert_eq!(cursors, vec![None, Some("a".to_string())]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

fn optional_string() -> impl Strategy<Value = OptionalField<String>> {
    prop_oneof![
        Just(OptionalField::Absent),
        Just(OptionalField::Null),
        "[a-z ]{0,12}".prop_map(OptionalField::Present),
    ]
}

fn text_batch() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(".{0,8}", 0..4)
}

fn token_rows() -> impl Strategy<Value = Vec<Vec<u32>>> {
    prop::collection::vec(prop::collection::vec(any::<u32>(), 0..4), 0..3)
}

/// Every input the public constructors accept, plus the rejected empty ones
/// as `None`.
fn embedding_input() -> impl Strategy<Value = Option<EmbeddingInput>> {
    prop_oneof![
        ".{0,16}".prop_map(|text| Some(EmbeddingInput::text(text))),
        text_batch().prop_map(|texts| EmbeddingInput::texts(texts).ok()),
        prop::collection::vec(any::<u32>(), 0..8).prop_map(|tokens| EmbeddingInput::tokens(tokens).ok()),
        token_rows().prop_map(|rows| EmbeddingInput::token_batch(rows).ok()),
    ]
}

proptest! {
    /// The key is emitted exactly when the field is not absent, and the
    /// state survives a decode.
    #[test]
    fn optional_state_survives(name in optional_string()) {
        let request = VectorStoreModifyRequest {
            name: name.clone(),
            ..Default::default()
        };
        let wire = request.encode();
        prop_assert_eq!(wire.get("name").is_some(), !name.is_absent());
        prop_assert_eq!(wire.get("name").is_some_and(Value::is_null), name.is_null());
        let decoded = VectorStoreModifyRequest::decode(&wire).unwrap();
        prop_assert_eq!(decoded.name, name);
    }

    /// Union values come back as the same arm through JSON text.
    #[test]
    fn embedding_input_round_trips(input in embedding_input()) {
        if let Some(input) = input {
            let text = serde_json::to_string(&input).unwrap();
            let decoded: EmbeddingInput = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(decoded, input);
        }
    }

    /// Batches are built exactly when they and all their rows are non-empty.
    #[test]
    fn embedding_batches_reject_empty(texts in text_batch(), rows in token_rows()) {
        prop_assert_eq!(EmbeddingInput::texts(texts.clone()).is_ok(), !texts.is_empty());
        let rows_ok = !rows.is_empty() && rows.iter().all(|row| !row.is_empty());
        prop_assert_eq!(EmbeddingInput::token_batch(rows).is_ok(), rows_ok);
    }

    /// Limits inside the bounds always produce a query; limits above never do.
    #[test]
    fn limit_bounds(limit in 1u32..200) {
        let request = PageRequest::builder().limit(limit).build().unwrap();
        let result = request.to_query_parameters(&PageBounds::STANDARD);
        prop_assert_eq!(result.is_ok(), limit <= 100);
    }
}
