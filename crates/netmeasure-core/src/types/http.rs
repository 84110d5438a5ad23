use serde::{Deserialize, Serialize};

/// Status line and body of a raw HTTP/1.x exchange.
///
/// Headers are dropped on purpose: `Date`, `Age` and similar headers differ
/// between two otherwise identical responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHttpResponse {
    /// First line of the response, without the line terminator
    pub status_line: String,

    /// Everything after the blank line that ends the header block
    pub body: Vec<u8>,
}

impl RawHttpResponse {
    /// Split raw response bytes into status line and body.
    ///
    /// Returns `None` when `raw` is empty. A response without a header
    /// terminator is treated as all status line, no body.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        let line_end = raw
            .windows(2)
            .position(|w| w == b"\r\n")
            .or_else(|| raw.iter().position(|&b| b == b'\n'))
            .unwrap_or(raw.len());
        let status_line = String::from_utf8_lossy(&raw[..line_end]).trim_end().to_string();

        let body = find_subslice(raw, b"\r\n\r\n")
            .map(|pos| pos + 4)
            .or_else(|| find_subslice(raw, b"\n\n").map(|pos| pos + 2))
            .map_or_else(Vec::new, |start| raw[start..].to_vec());

        Some(Self { status_line, body })
    }

    /// Numeric status code, if the status line is well formed
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status_line.split_whitespace().nth(1)?.parse().ok()
    }

    /// Returns true if status line and body are byte-identical
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.status_line == other.status_line && self.body == other.body
    }

    /// Index of the first differing byte in the bodies, if they differ
    #[must_use]
    pub fn first_body_difference(&self, other: &Self) -> Option<usize> {
        self.body
            .iter()
            .zip(&other.body)
            .position(|(a, b)| a != b)
            .or_else(|| {
                (self.body.len() != other.body.len())
                    .then(|| self.body.len().min(other.body.len()))
            })
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_status_and_body() {
        let raw = b"HTTP/1.1 404 Not Found\r\nDate: Mon, 01 Jan 2024 00:00:00 GMT\r\nContent-Length: 5\r\n\r\nnope!";
        let response = RawHttpResponse::parse(raw).unwrap();
        assert_eq!(response.status_line, "HTTP/1.1 404 Not Found");
        assert_eq!(response.body, b"nope!");
        assert_eq!(response.status_code(), Some(404));
    }

    #[test]
    fn headers_do_not_affect_comparison() {
        let a = RawHttpResponse::parse(b"HTTP/1.1 200 OK\r\nDate: a\r\n\r\nbody").unwrap();
        let b = RawHttpResponse::parse(b"HTTP/1.1 200 OK\r\nDate: b\r\n\r\nbody").unwrap();
        assert!(a.same_as(&b));
        assert_eq!(a.first_body_difference(&b), None);
    }

    #[test]
    fn differing_body_is_located() {
        let a = RawHttpResponse::parse(b"HTTP/1.1 200 OK\r\n\r\nabcd").unwrap();
        let b = RawHttpResponse::parse(b"HTTP/1.1 200 OK\r\n\r\nabXd").unwrap();
        let c = RawHttpResponse::parse(b"HTTP/1.1 200 OK\r\n\r\nab").unwrap();
        assert!(!a.same_as(&b));
        assert_eq!(a.first_body_difference(&b), Some(2));
        assert_eq!(a.first_body_difference(&c), Some(2));
    }

    #[test]
    fn empty_and_headerless_input() {
        assert!(RawHttpResponse::parse(b"").is_none());
        let partial = RawHttpResponse::parse(b"HTTP/1.1 403 Forbidden").unwrap();
        assert_eq!(partial.status_line, "HTTP/1.1 403 Forbidden");
        assert!(partial.body.is_empty());
    }
}
