//! Streamed text bodies.
//!
//! [`TextStream`] hands out a response body chunk by chunk as UTF-8 text,
//! exactly as the chunks arrive. Nothing is buffered beyond the bytes of a
//! multibyte character that was split across two chunks.

use crate::Result;

/// Incremental UTF-8 decoder.
///
/// Bytes of an incomplete trailing sequence are held back until the next
/// [`push`](Utf8Decoder::push). Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes as much of `pending + bytes` as forms complete characters.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::new();
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        // Incomplete sequence at the end; wait for more bytes.
                        None => {
                            rest = tail;
                            break;
                        }
                    }
                }
            }
        }

        let remaining = rest.to_vec();
        self.pending = remaining;
        out
    }

    /// Flushes held-back bytes at end of input.
    pub fn finish(&mut self) -> String {
        let tail = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&tail).into_owned()
    }
}

/// A response body consumed incrementally as text.
///
/// Obtained from [`Client::stream_text`](crate::Client::stream_text).
///
/// ```no_run
/// # async fn example(client: avaagent_client::Client) -> Result<(), avaagent_client::Error> {
/// let body = serde_json::json!({ "message": "hello" });
/// let mut stream = client.stream_text("/ai/chat/stream", &body).await?;
/// while let Some(chunk) = stream.next_chunk().await? {
///     print!("{chunk}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TextStream {
    response: reqwest::Response,
    decoder: Utf8Decoder,
    done: bool,
}

impl TextStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            decoder: Utf8Decoder::new(),
            done: false,
        }
    }

    /// The HTTP status of the streamed response.
    pub fn status(&self) -> http::StatusCode {
        self.response.status()
    }

    /// Returns the next chunk of text, or `None` once the body is exhausted.
    ///
    /// Chunks that contain only part of a multibyte character are held back
    /// and merged into the next chunk, so no chunk returned is ever empty.
    pub async fn next_chunk(&mut self) -> Result<Option<String>> {
        while !self.done {
            match self.response.chunk().await? {
                Some(bytes) => {
                    let text = self.decoder.push(&bytes);
                    if !text.is_empty() {
                        return Ok(Some(text));
                    }
                }
                None => {
                    self.done = true;
                    let tail = self.decoder.finish();
                    if !tail.is_empty() {
                        return Ok(Some(tail));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Reads the rest of the body, calling `on_chunk` for every chunk, and
    /// returns everything read.
    pub async fn collect_with<F>(mut self, mut on_chunk: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let mut full = String::new();
        while let Some(chunk) = self.next_chunk().await? {
            on_chunk(&chunk);
            full.push_str(&chunk);
        }
        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multibyte_character() {
        let bytes = "héllo €".as_bytes();
        let mut decoder = Utf8Decoder::new();

        // 'é' is two bytes; split it.
        let first = decoder.push(&bytes[..2]);
        assert_eq!(first, "h");
        let second = decoder.push(&bytes[2..bytes.len() - 1]);
        assert_eq!(second, "éllo ");
        let third = decoder.push(&bytes[bytes.len() - 1..]);
        assert_eq!(third, "€");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_invalid_bytes_become_replacement() {
        let mut decoder = Utf8Decoder::new();
        let out = decoder.push(&[b'a', 0xff, b'b']);
        assert_eq!(out, "a\u{FFFD}b");
    }

    #[test]
    fn test_truncated_tail_is_flushed_lossily() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.push(&[b'x', 0xe2, 0x82]), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }
}
