use std::time::Duration;

/// Where and how the client reaches its XML-RPC endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(url: &str) -> ClientConfig {
        ClientConfig {
            url: url.to_string(),
            user_agent: concat!("xmlrpc-codec/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> ClientConfig {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> ClientConfig {
        self.timeout = Some(timeout);
        self
    }
}
