//! The streaming tool-call arbitration loop
//!
//! One call to `run_turn` drives a whole user turn: up to `max_rounds`
//! model requests, tool rounds in between, and a final answer. Events are
//! produced lazily as the caller polls the stream.

use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};

use super::prompt::tool_arbitration_prompt;
use super::round::{FragmentAction, RoundDecision, RoundMachine, ToolConflictPolicy};
use super::transcript::{Transcript, DEFAULT_HISTORY_LIMIT};
use crate::logging::Logger;
use crate::providers::ModelClient;
use crate::tools::{normalize_arguments, InvocationContext, ToolExecutor, ToolOutcome, ToolRegistry};
use crate::types::{AgentEvent, CancellationToken, StreamChunk};

pub const DEFAULT_MAX_ROUNDS: usize = 25;

/// First event of every turn
pub const GENERATING_STATUS: &str = "Generating...";

/// Answer given when the round budget runs out
pub const ROUNDS_EXHAUSTED_TEXT: &str =
    "Maximum reasoning rounds reached. Please narrow down the question or try again later.";

/// Tunables of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentOptions {
    pub max_rounds: usize,
    pub history_limit: usize,
    pub conflict_policy: ToolConflictPolicy,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            conflict_policy: ToolConflictPolicy::default(),
        }
    }
}

impl AgentOptions {
    pub fn with_conflict_policy(mut self, policy: ToolConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

/// Everything a turn borrows from the agent
pub(crate) struct TurnContext<'a> {
    pub model: &'a ModelClient,
    pub registry: &'a ToolRegistry,
    pub executor: &'a ToolExecutor,
    pub options: AgentOptions,
    pub logger: Arc<dyn Logger>,
    pub invocation: InvocationContext,
}

/// Run one user turn
///
/// Dropping the returned stream cancels the model request in flight.
pub(crate) fn run_turn<'a>(ctx: TurnContext<'a>, transcript: Transcript) -> impl Stream<Item = AgentEvent> + Send + 'a {
    stream! {
        let TurnContext { model, registry, executor, options, logger, invocation } = ctx;
        let mut transcript = transcript;
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.drop_guard();

        yield AgentEvent::status(GENERATING_STATUS);

        for round in 1..=options.max_rounds {
            logger.info(&format!(
                "[Arbiter] Round {}/{} (session {}, {} messages)",
                round,
                options.max_rounds,
                invocation.session_id,
                transcript.len()
            ));

            let mut machine = RoundMachine::new(options.conflict_policy);
            let mut end_calls = Vec::new();
            let mut trailing = None;

            match model.stream(transcript.request(&tool_arbitration_prompt()), cancel.clone()).await {
                Ok(mut chunks) => {
                    while let Some(item) = chunks.next().await {
                        match item {
                            Ok(StreamChunk::Text { text }) => {
                                if let FragmentAction::Forward { first } = machine.on_fragment(&text) {
                                    if first {
                                        yield AgentEvent::response_start();
                                    }
                                    logger.debug(&format!("[Arbiter] Forwarding chunk: {}", text));
                                    yield AgentEvent::response_chunk(text);
                                }
                            }
                            Ok(StreamChunk::ToolCall { tool_call }) => machine.on_tool_call(tool_call),
                            Ok(StreamChunk::ToolCallDelta { .. }) => {}
                            Ok(StreamChunk::End { tool_calls, content }) => {
                                end_calls = tool_calls;
                                trailing = content;
                                break;
                            }
                            Err(e) => {
                                logger.warn(&format!("[Arbiter] Model stream failed in round {}: {}", round, e));
                                machine.on_stream_error();
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    logger.warn(&format!("[Arbiter] Could not open model stream in round {}: {}", round, e));
                }
            }

            match machine.finish(end_calls, trailing) {
                RoundDecision::ExecuteTools { calls, retracted } => {
                    if let Some(text) = retracted {
                        logger.warn(&format!(
                            "[Arbiter] Model called {} tool(s) after streaming {} chars of text; retracting the text",
                            calls.len(),
                            text.len()
                        ));
                        yield AgentEvent::AiResponseRetracted { content: text };
                    }

                    transcript.push_tool_calls(&calls);
                    yield AgentEvent::tool_plan(calls.len());

                    let total = calls.len();
                    for (i, call) in calls.iter().enumerate() {
                        let args = normalize_arguments(call.input.clone());
                        yield AgentEvent::ToolStart {
                            tool_id: call.id.clone(),
                            tool_name: call.name.clone(),
                            tool_args: args.clone(),
                            progress: format!("{}/{}", i + 1, total),
                        };

                        let outcome = executor.execute(registry, &call.name, args, &invocation).await;
                        match &outcome {
                            ToolOutcome::Success(result) => {
                                yield AgentEvent::ToolEnd {
                                    tool_id: call.id.clone(),
                                    tool_name: call.name.clone(),
                                    result: result.clone(),
                                };
                            }
                            ToolOutcome::Failure(message) => {
                                yield AgentEvent::ToolError {
                                    tool_id: call.id.clone(),
                                    error: message.clone(),
                                };
                            }
                        }
                        transcript.push_tool_result(call, outcome.transcript_content());
                    }
                }
                RoundDecision::Finalize { text, started, dropped_calls } => {
                    if dropped_calls > 0 {
                        logger.warn(&format!(
                            "[Arbiter] Dropped {} tool call(s) that followed streamed text",
                            dropped_calls
                        ));
                    }
                    if !started {
                        yield AgentEvent::response_start();
                        if !text.is_empty() {
                            yield AgentEvent::response_chunk(text.clone());
                        }
                    }
                    logger.info(&format!("[Arbiter] Turn finished in round {} ({} chars)", round, text.len()));
                    yield AgentEvent::response_end(text);
                    return;
                }
            }
        }

        logger.warn(&format!("[Arbiter] Reached the maximum of {} rounds", options.max_rounds));
        yield AgentEvent::response_start();
        yield AgentEvent::response_chunk(ROUNDS_EXHAUSTED_TEXT);
        yield AgentEvent::response_end(ROUNDS_EXHAUSTED_TEXT);
    }
}
