//! Per-round arbitration state
//!
//! A round reads one model stream. Text fragments are forwarded as they
//! arrive, so by the time the terminal event reveals tool calls some text may
//! already be on its way to the user. `RoundMachine` tracks what was
//! forwarded and decides, once the stream ends, whether the round runs tools
//! or finalizes its text.
//!
//! ```text
//! AwaitingDecision ──fragment──▶ ForwardingContent
//!        │                              │
//!        └───────────end────────────────┴──▶ ExecutingTools | Finalized
//! ```

use crate::types::ToolCall;

/// What to do when a round has forwarded text and then reports tool calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolConflictPolicy {
    /// Run the tools and tell the consumer to discard the forwarded text
    #[default]
    ExecuteAndRetract,
    /// Keep the forwarded text as the answer and drop the tool calls
    PreferText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    AwaitingDecision,
    ForwardingContent,
    ExecutingTools,
    Finalized,
}

/// What a fragment means for the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentAction {
    /// Empty fragment, nothing to emit
    Ignore,
    /// Forward it; `first` means the response has to be opened first
    Forward { first: bool },
}

/// Outcome of a finished round
#[derive(Debug, Clone, PartialEq)]
pub enum RoundDecision {
    /// Run these calls, then start another round
    ExecuteTools {
        calls: Vec<ToolCall>,
        /// Text already forwarded this round that the consumer should discard
        retracted: Option<String>,
    },
    /// End the turn with this text
    Finalize {
        text: String,
        /// Whether `ai_response_start` was already emitted
        started: bool,
        /// Tool calls dropped in favour of forwarded text
        dropped_calls: usize,
    },
}

/// State of one arbitration round
#[derive(Debug)]
pub struct RoundMachine {
    state: RoundState,
    policy: ToolConflictPolicy,
    buffer: String,
    calls: Vec<ToolCall>,
}

impl RoundMachine {
    pub fn new(policy: ToolConflictPolicy) -> Self {
        Self {
            state: RoundState::AwaitingDecision,
            policy,
            buffer: String::new(),
            calls: Vec::new(),
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Whether `ai_response_start` has been emitted this round
    pub fn started(&self) -> bool {
        self.state == RoundState::ForwardingContent
    }

    /// Text forwarded so far
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Record a content fragment
    pub fn on_fragment(&mut self, fragment: &str) -> FragmentAction {
        if fragment.is_empty() || self.is_decided() {
            return FragmentAction::Ignore;
        }

        let first = self.state == RoundState::AwaitingDecision;
        self.state = RoundState::ForwardingContent;
        self.buffer.push_str(fragment);
        FragmentAction::Forward { first }
    }

    /// Record a complete tool call seen before the end of the stream
    pub fn on_tool_call(&mut self, call: ToolCall) {
        if !self.is_decided() {
            self.calls.push(call);
        }
    }

    /// The stream failed: forget any calls seen so far, keep forwarded text
    pub fn on_stream_error(&mut self) {
        self.calls.clear();
    }

    /// Close the round with what the terminal event reported
    ///
    /// `end_calls` is the full list captured by the backend and replaces any
    /// calls collected mid-stream when non-empty. A failed stream is closed
    /// with no calls and no trailing content.
    pub fn finish(&mut self, end_calls: Vec<ToolCall>, trailing: Option<String>) -> RoundDecision {
        let calls = if end_calls.is_empty() {
            std::mem::take(&mut self.calls)
        } else {
            end_calls
        };
        let calls: Vec<ToolCall> = calls
            .into_iter()
            .enumerate()
            .map(|(i, call)| call.with_fallback_id(i + 1))
            .collect();

        let started = self.started();

        if !calls.is_empty() && (!started || self.policy == ToolConflictPolicy::ExecuteAndRetract) {
            self.state = RoundState::ExecutingTools;
            let retracted = started.then(|| self.buffer.clone());
            return RoundDecision::ExecuteTools { calls, retracted };
        }

        self.state = RoundState::Finalized;
        let text = if !self.buffer.is_empty() {
            self.buffer.clone()
        } else {
            trailing.unwrap_or_default()
        };

        RoundDecision::Finalize {
            text,
            started,
            dropped_calls: calls.len(),
        }
    }

    fn is_decided(&self) -> bool {
        matches!(self.state, RoundState::ExecutingTools | RoundState::Finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> ToolCall {
        ToolCall::new(id, "lookup", json!({}))
    }

    #[test]
    fn test_text_only_round() {
        let mut round = RoundMachine::new(ToolConflictPolicy::default());
        assert_eq!(round.on_fragment("Hel"), FragmentAction::Forward { first: true });
        assert_eq!(round.on_fragment(""), FragmentAction::Ignore);
        assert_eq!(round.on_fragment("lo"), FragmentAction::Forward { first: false });
        assert_eq!(round.state(), RoundState::ForwardingContent);

        let decision = round.finish(Vec::new(), Some("ignored".into()));
        assert_eq!(
            decision,
            RoundDecision::Finalize {
                text: "Hello".into(),
                started: true,
                dropped_calls: 0
            }
        );
        assert_eq!(round.state(), RoundState::Finalized);
    }

    #[test]
    fn test_trailing_content_when_nothing_streamed() {
        let mut round = RoundMachine::new(ToolConflictPolicy::default());
        let decision = round.finish(Vec::new(), Some("from end".into()));
        assert_eq!(
            decision,
            RoundDecision::Finalize {
                text: "from end".into(),
                started: false,
                dropped_calls: 0
            }
        );
    }

    #[test]
    fn test_failed_stream_finalizes_empty() {
        let mut round = RoundMachine::new(ToolConflictPolicy::default());
        let decision = round.finish(Vec::new(), None);
        assert_eq!(
            decision,
            RoundDecision::Finalize {
                text: String::new(),
                started: false,
                dropped_calls: 0
            }
        );
    }

    #[test]
    fn test_tool_round_without_text() {
        let mut round = RoundMachine::new(ToolConflictPolicy::PreferText);
        let decision = round.finish(vec![call("a"), call("")], None);
        match decision {
            RoundDecision::ExecuteTools { calls, retracted } => {
                assert_eq!(calls[0].id, "a");
                assert_eq!(calls[1].id, "call_2");
                assert!(retracted.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(round.state(), RoundState::ExecutingTools);
    }

    #[test]
    fn test_mid_stream_calls_used_when_end_has_none() {
        let mut round = RoundMachine::new(ToolConflictPolicy::default());
        round.on_tool_call(call("x"));
        match round.finish(Vec::new(), None) {
            RoundDecision::ExecuteTools { calls, .. } => assert_eq!(calls.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_conflict_execute_and_retract() {
        let mut round = RoundMachine::new(ToolConflictPolicy::ExecuteAndRetract);
        round.on_fragment("Let me check");
        let decision = round.finish(vec![call("c1")], None);
        assert_eq!(
            decision,
            RoundDecision::ExecuteTools {
                calls: vec![call("c1")],
                retracted: Some("Let me check".into())
            }
        );
    }

    #[test]
    fn test_conflict_prefer_text() {
        let mut round = RoundMachine::new(ToolConflictPolicy::PreferText);
        round.on_fragment("Answer");
        let decision = round.finish(vec![call("c1"), call("c2")], None);
        assert_eq!(
            decision,
            RoundDecision::Finalize {
                text: "Answer".into(),
                started: true,
                dropped_calls: 2
            }
        );
    }

    #[test]
    fn test_stream_error_drops_calls_keeps_text() {
        let mut round = RoundMachine::new(ToolConflictPolicy::default());
        round.on_fragment("partial");
        round.on_tool_call(call("x"));
        round.on_stream_error();
        assert_eq!(
            round.finish(Vec::new(), None),
            RoundDecision::Finalize {
                text: "partial".into(),
                started: true,
                dropped_calls: 0
            }
        );
    }

    #[test]
    fn test_fragments_after_decision_are_ignored() {
        let mut round = RoundMachine::new(ToolConflictPolicy::default());
        round.finish(Vec::new(), None);
        assert_eq!(round.on_fragment("late"), FragmentAction::Ignore);
        assert_eq!(round.buffered(), "");
    }
}
