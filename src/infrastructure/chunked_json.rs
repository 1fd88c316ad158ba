// Chunked JSON streaming utilities
use crate::domain::live::LiveMessage;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::io::AsyncReadExt;

pub const CONTENT_TYPE_LIVE: &str = "application/x-cropwatch-live";

/// Create a chunked streaming response of length-prefixed JSON messages
pub async fn chunked_json_stream<S>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = LiveMessage> + Send + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // NOTE: no Content-Encoding header. Chunks are compressed individually,
    // the HTTP body as a whole is not.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CONTENT_TYPE_LIVE)
        .header(header::CACHE_CONTROL, "no-store")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single message to a `u32` big-endian length + payload chunk
pub async fn serialize_chunk(msg: &LiveMessage, compress: bool) -> Result<Bytes, std::io::Error> {
    // 1. Serialize to JSON
    let buffer = serde_json::to_vec(msg)?;

    // 2. Optionally compress
    let payload = if compress {
        let mut encoder = BrotliEncoder::new(std::io::Cursor::new(buffer));
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await?;
        compressed
    } else {
        buffer
    };

    // 3. Prepend length
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(payload.len() as u32);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<LiveMessage>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
