//! Reads the request head and pulls out the route.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader, Take};

/// Upper bound on the bytes read for one request head.
pub const MAX_HEAD_BYTES: u64 = 16 * 1024;

const ROUTE_LINE: &str = "GET /";

/// Buffer `reader`, refusing to read past [`MAX_HEAD_BYTES`].
pub fn head_reader<R: AsyncRead + Unpin>(reader: R) -> BufReader<Take<R>> {
    BufReader::new(reader.take(MAX_HEAD_BYTES))
}

/// Read header lines up to the blank line (or end of stream) and return the
/// target of the first `GET /` line, without its leading slash.
///
/// The rest of the head is consumed and discarded. Returns `None` when no
/// `GET /` line is found.
pub async fn read_route<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<Option<String>> {
    let mut route = None;
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(route);
        }
        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return Ok(route);
        }
        if route.is_none() {
            route = parse_route_line(text);
        }
    }
}

fn parse_route_line(line: &str) -> Option<String> {
    let rest = line.strip_prefix(ROUTE_LINE)?;
    let end = rest.find(' ').unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn route_of(input: &'static [u8]) -> Option<String> {
        let mut reader = BufReader::new(input);
        read_route(&mut reader).await.unwrap()
    }

    #[tokio::test]
    async fn extracts_the_target() {
        let route = route_of(b"GET /getDbList HTTP/1.1\r\nHost: x\r\n\r\n").await;
        assert_eq!(route.as_deref(), Some("getDbList"));
    }

    #[tokio::test]
    async fn accepts_bare_line_feeds() {
        let route = route_of(b"GET /query?query=select%201 HTTP/1.0\nAccept: */*\n\n").await;
        assert_eq!(route.as_deref(), Some("query?query=select%201"));
    }

    #[tokio::test]
    async fn root_path_gives_an_empty_route() {
        assert_eq!(route_of(b"GET / HTTP/1.1\r\n\r\n").await.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn target_without_version_runs_to_end_of_line() {
        assert_eq!(route_of(b"GET /downloadDb\r\n\r\n").await.as_deref(), Some("downloadDb"));
    }

    #[tokio::test]
    async fn other_methods_are_ignored() {
        assert_eq!(route_of(b"POST /getDbList HTTP/1.1\r\n\r\n").await, None);
        assert_eq!(route_of(b"get /getDbList HTTP/1.1\r\n\r\n").await, None);
    }

    #[tokio::test]
    async fn only_the_first_get_line_counts() {
        let route = route_of(b"Host: x\r\nGET /a HTTP/1.1\r\nGET /b HTTP/1.1\r\n\r\n").await;
        assert_eq!(route.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn lines_after_the_blank_line_are_not_read() {
        assert_eq!(route_of(b"Host: x\r\n\r\nGET /late HTTP/1.1\r\n").await, None);
    }

    #[tokio::test]
    async fn premature_end_of_stream() {
        assert_eq!(route_of(b"").await, None);
        assert_eq!(route_of(b"Host: x\r\n").await, None);
    }

    #[tokio::test]
    async fn consumes_the_whole_head() {
        let mut reader = BufReader::new(&b"GET /x HTTP/1.1\r\nA: 1\r\n\r\nbody"[..]);
        read_route(&mut reader).await.unwrap();
        let mut rest = String::new();
        reader.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "body");
    }

    #[tokio::test]
    async fn stops_reading_at_the_head_cap() {
        let mut input = b"GET /getDbList HTTP/1.1\r\n".to_vec();
        while (input.len() as u64) < 2 * MAX_HEAD_BYTES {
            input.extend_from_slice(b"X-Filler: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
        }
        input.extend_from_slice(b"\r\n");

        let mut reader = head_reader(&input[..]);
        let route = read_route(&mut reader).await.unwrap();
        assert_eq!(route.as_deref(), Some("getDbList"));

        let unread = reader.into_inner().into_inner();
        assert_eq!(unread.len() as u64, input.len() as u64 - MAX_HEAD_BYTES);
    }
}
