//! Plain HTTP reachability check for tool servers
//!
//! Diagnostic only: the outcome is logged and never decides whether a server
//! is connected.

use std::sync::Arc;
use std::time::Duration;

use crate::logging::Logger;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// What a probe observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered with this status code
    Status(u16),
    /// No HTTP answer at all
    Unreachable(String),
}

/// GET `url` once and log what happened
pub async fn probe_server(server_name: &str, url: &str, logger: &Arc<dyn Logger>) -> ProbeOutcome {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => return ProbeOutcome::Unreachable(e.to_string()),
    };

    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            logger.info(&format!(
                "[Probe] '{}' at {} answered {}",
                server_name, url, status
            ));
            ProbeOutcome::Status(status.as_u16())
        }
        Err(e) => {
            logger.warn(&format!(
                "[Probe] '{}' at {} is unreachable: {}",
                server_name, url, e
            ));
            ProbeOutcome::Unreachable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;

    #[tokio::test]
    async fn test_unreachable_server_is_logged() {
        let memory = Arc::new(MemoryLogger::new());
        let logger: Arc<dyn Logger> = memory.clone();

        // Port 9 (discard) on localhost is closed in test environments
        let outcome = probe_server("dead", "http://127.0.0.1:9/mcp", &logger).await;
        assert!(matches!(outcome, ProbeOutcome::Unreachable(_)));
        assert!(memory.contains("warn", "unreachable"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_unreachable() {
        let logger: Arc<dyn Logger> = Arc::new(MemoryLogger::new());
        let outcome = probe_server("bad", "not a url", &logger).await;
        assert!(matches!(outcome, ProbeOutcome::Unreachable(_)));
    }
}
