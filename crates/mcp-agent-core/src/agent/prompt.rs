//! System instruction for tool arbitration

use chrono::{DateTime, Local, TimeZone};

/// Instruction sent ahead of the transcript in every round
pub fn tool_arbitration_prompt() -> String {
    tool_arbitration_prompt_at(&Local::now())
}

/// Same as `tool_arbitration_prompt` for a fixed moment
pub fn tool_arbitration_prompt_at<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Today is {} ({}). You are a helpful, harmless and honest AI assistant.\n\
         - You can use the available tools to help the user solve problems.\n\
         - When a question needs real-time information, a specific action or an external service, call the appropriate tool.\n\
         - For general or knowledge questions that need no tool, answer directly.\n\
         - If you decide to use tools, output only the tool calls and no natural-language answer.\n\
         - If you decide not to use tools, give a helpful answer in the user's language.\n",
        now.format("%Y-%m-%d"),
        now.format("%A")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_prompt_is_dated() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let prompt = tool_arbitration_prompt_at(&now);
        assert!(prompt.starts_with("Today is 2024-03-15 (Friday)."));
        assert!(prompt.contains("output only the tool calls"));
    }

    #[test]
    fn test_prompt_for_now() {
        assert!(tool_arbitration_prompt().starts_with("Today is "));
    }
}
