//! Terminal rendering of agent events

use std::io::Write;

use mcp_agent_core::AgentEvent;

pub trait Render {
    fn render(&mut self, event: &AgentEvent);
}

/// The text a turn ended with, if `event` ends it with an answer
pub fn final_text(event: &AgentEvent) -> Option<&str> {
    match event {
        AgentEvent::AiResponseEnd { content } => Some(content),
        _ => None,
    }
}

/// One JSON object per event on stdout
pub struct JsonRenderer;

impl Render for JsonRenderer {
    fn render(&mut self, event: &AgentEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{}", line);
        }
    }
}

/// Reply text on stdout, tool activity on stderr
#[derive(Default)]
pub struct TextRenderer {
    streaming: bool,
}

impl TextRenderer {
    /// Render into the given sinks; returns whether anything went to `out`
    fn render_to(&mut self, event: &AgentEvent, out: &mut impl Write, err: &mut impl Write) -> bool {
        match event {
            AgentEvent::Status { content } => {
                let _ = writeln!(err, "… {}", content);
                false
            }
            AgentEvent::AiResponseStart { .. } => {
                self.streaming = true;
                false
            }
            AgentEvent::AiResponseChunk { content } => {
                let _ = write!(out, "{}", content);
                true
            }
            AgentEvent::AiResponseEnd { .. } => {
                self.streaming = false;
                let _ = writeln!(out);
                true
            }
            AgentEvent::AiResponseRetracted { .. } => {
                self.streaming = false;
                let _ = writeln!(out);
                let _ = writeln!(err, "(the text above was superseded by tool calls)");
                true
            }
            AgentEvent::ToolPlan { content, .. } => {
                let _ = writeln!(err, "{}", content);
                false
            }
            AgentEvent::ToolStart { tool_name, tool_args, progress, .. } => {
                let args = serde_json::to_string(tool_args).unwrap_or_default();
                let _ = writeln!(err, "[{}] {} {}", progress, tool_name, args);
                false
            }
            AgentEvent::ToolEnd { tool_name, result, .. } => {
                let _ = writeln!(err, "  {} -> {}", tool_name, preview(result, 200));
                false
            }
            AgentEvent::ToolError { tool_id, error } => {
                let _ = writeln!(err, "  {} failed: {}", tool_id, error);
                false
            }
            AgentEvent::Error { content } => {
                if self.streaming {
                    let _ = writeln!(out);
                    self.streaming = false;
                }
                let _ = writeln!(err, "error: {}", content);
                true
            }
        }
    }
}

impl Render for TextRenderer {
    fn render(&mut self, event: &AgentEvent) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if self.render_to(event, &mut out, &mut std::io::stderr()) {
            let _ = out.flush();
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    match single_line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &single_line[..cut]),
        None => single_line,
    }
}
