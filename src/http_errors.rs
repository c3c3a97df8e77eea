use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::TurnError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    TimedOut,
    Refused,
    Connect,
    Other,
}

/// Walks the source chain looking for an io error of `kind`, falling back to
/// the rendered text for transports that do not expose one.
fn chain_mentions(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }
        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }
        current = source.source();
    }
    false
}

fn classify(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() || chain_mentions(err, ErrorKind::TimedOut, "timed out") {
        FailureKind::TimedOut
    } else if err.is_connect() {
        if chain_mentions(err, ErrorKind::ConnectionRefused, "connection refused") {
            FailureKind::Refused
        } else {
            FailureKind::Connect
        }
    } else {
        FailureKind::Other
    }
}

pub(crate) fn transport_error(
    err: reqwest::Error,
    endpoint: &str,
    timeout_secs: Option<u64>,
) -> TurnError {
    let message = match classify(&err) {
        FailureKind::TimedOut => match timeout_secs {
            Some(secs) => format!(
                "Completion request timed out after {}s while calling '{}'. \
                 Raise REQUEST_TIMEOUT_SECS or check the endpoint's responsiveness.",
                secs, endpoint
            ),
            None => format!(
                "Completion request to '{}' timed out in the transport layer.",
                endpoint
            ),
        },
        FailureKind::Refused => format!(
            "Connection refused by completion endpoint '{}'. \
             Check OPENAI_ENDPOINT and that the service is reachable.",
            endpoint
        ),
        FailureKind::Connect => format!(
            "Failed to connect to completion endpoint '{}'. \
             Check OPENAI_ENDPOINT and network connectivity.",
            endpoint
        ),
        FailureKind::Other => {
            format!("Failed to call completion endpoint '{}': {}", endpoint, err)
        }
    };
    TurnError::Transport(message)
}
