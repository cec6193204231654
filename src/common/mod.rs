//! Common utilities shared by the runner, the server and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Parse a "listening at:" address from a child process's output.
/// Handles the wildcard forms `[::]:PORT` and `0.0.0.0:PORT` by converting
/// to `127.0.0.1:PORT`.
pub fn parse_listen_address(line: &str) -> Option<String> {
    let addr_start = line.find("listening at:")?;
    let addr = line[addr_start + "listening at:".len()..].trim().to_string();
    let addr = if let Some(port) = addr.strip_prefix("[::]:") {
        format!("127.0.0.1:{}", port)
    } else if let Some(port) = addr.strip_prefix("0.0.0.0:") {
        format!("127.0.0.1:{}", port)
    } else {
        addr
    };
    Some(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listen_address() {
        assert_eq!(
            parse_listen_address("mock webdriver listening at: 127.0.0.1:4444"),
            Some("127.0.0.1:4444".to_string())
        );
        assert_eq!(
            parse_listen_address("listening at: [::]:9000"),
            Some("127.0.0.1:9000".to_string())
        );
        assert_eq!(
            parse_listen_address("serving listening at: 0.0.0.0:3000"),
            Some("127.0.0.1:3000".to_string())
        );
        assert_eq!(parse_listen_address("starting up"), None);
    }
}
