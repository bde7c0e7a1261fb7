//! HTTP/1.0 response framing.

use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const STATUS_OK: &str = "HTTP/1.0 200 OK";
pub const STATUS_SERVER_ERROR: &str = "HTTP/1.0 500 Internal Server Error";

pub const JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framing {
    ContentLength,
    Attachment(String),
}

/// A fully built response, either `200` with a body or a bare `500`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok {
        content_type: &'static str,
        framing: Framing,
        body: Vec<u8>,
    },
    ServerError,
}

impl Response {
    pub fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Response::Ok {
            content_type,
            framing: Framing::ContentLength,
            body,
        }
    }

    pub fn json(body: Vec<u8>) -> Self {
        Self::ok(JSON, body)
    }

    /// A download; framed with `Content-Disposition` instead of a length.
    pub fn attachment(filename: impl Into<String>, body: Vec<u8>) -> Self {
        Response::Ok {
            content_type: OCTET_STREAM,
            framing: Framing::Attachment(filename.into()),
            body,
        }
    }

    pub fn server_error() -> Self {
        Response::ServerError
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            Response::Ok { .. } => STATUS_OK,
            Response::ServerError => STATUS_SERVER_ERROR,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.status_line().as_bytes());
        out.extend_from_slice(b"\r\n");
        if let Response::Ok {
            content_type,
            framing,
            body,
        } = self
        {
            out.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            let header = match framing {
                Framing::Attachment(name) => {
                    format!("Content-Disposition: attachment; filename={name}\r\n")
                }
                Framing::ContentLength => format!("Content-Length: {}\r\n", body.len()),
            };
            out.extend_from_slice(header.as_bytes());
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(body);
        } else {
            out.extend_from_slice(b"\r\n");
        }
        out
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes()).await?;
        writer.flush().await
    }
}
