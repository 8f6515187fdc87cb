//! Request body sources.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::config::STDIN_MARKER;
use crate::error_handling::FetchError;

/// Body type sent by the request executor.
pub type RequestBody = UnsyncBoxBody<Bytes, io::Error>;

/// Where the request body comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BodySource {
    /// No body.
    #[default]
    Empty,
    /// Literal bytes.
    Raw(Bytes),
    /// Standard input, streamed.
    Stdin,
    /// A file, streamed.
    File(PathBuf),
}

impl BodySource {
    /// Picks the body source from the `--data` and `--data-file` values.
    ///
    /// The two are mutually exclusive once preconditions pass; if both are
    /// present anyway, raw data wins. Empty raw data means no body, and a
    /// data file of `-` means standard input.
    pub fn from_flags(data: Option<&str>, data_file: Option<&Path>) -> Self {
        match (data, data_file) {
            (Some(raw), _) if !raw.is_empty() => {
                BodySource::Raw(Bytes::copy_from_slice(raw.as_bytes()))
            }
            (_, Some(path)) if path.as_os_str() == STDIN_MARKER => BodySource::Stdin,
            (_, Some(path)) => BodySource::File(path.to_path_buf()),
            _ => BodySource::Empty,
        }
    }

    /// Returns true when a body will be sent.
    pub fn has_body(&self) -> bool {
        !matches!(self, BodySource::Empty)
    }

    /// Opens the source as a sendable body.
    ///
    /// Raw bytes are sent with a `Content-Length`; stdin and files are streamed
    /// with chunked transfer encoding.
    pub async fn open(&self) -> Result<RequestBody, FetchError> {
        match self {
            BodySource::Empty => Ok(Empty::<Bytes>::new()
                .map_err(|never| match never {})
                .boxed_unsync()),
            BodySource::Raw(bytes) => Ok(Full::new(bytes.clone())
                .map_err(|never| match never {})
                .boxed_unsync()),
            BodySource::Stdin => Ok(stream_body(tokio::io::stdin())),
            BodySource::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|source| FetchError::OpenBody {
                        path: path.clone(),
                        source,
                    })?;
                log::debug!("Streaming request body from {}", path.display());
                Ok(stream_body(file))
            }
        }
    }
}

fn stream_body<R>(reader: R) -> RequestBody
where
    R: AsyncRead + Send + 'static,
{
    StreamBody::new(ReaderStream::new(reader).map_ok(Frame::data)).boxed_unsync()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_flags() {
        assert_eq!(BodySource::from_flags(None, None), BodySource::Empty);
        assert_eq!(BodySource::from_flags(Some(""), None), BodySource::Empty);
        assert_eq!(
            BodySource::from_flags(Some("hello"), None),
            BodySource::Raw(Bytes::from_static(b"hello"))
        );
        assert_eq!(
            BodySource::from_flags(None, Some(Path::new("-"))),
            BodySource::Stdin
        );
        assert_eq!(
            BodySource::from_flags(None, Some(Path::new("body.json"))),
            BodySource::File(PathBuf::from("body.json"))
        );
    }

    #[test]
    fn test_has_body() {
        assert!(!BodySource::Empty.has_body());
        assert!(BodySource::Stdin.has_body());
        assert!(BodySource::File(PathBuf::from("x")).has_body());
    }

    #[tokio::test]
    async fn test_raw_body_collects() {
        let body = BodySource::Raw(Bytes::from_static(b"hello")).open().await.unwrap();
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_file_body_streams_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"from a file").unwrap();
        let source = BodySource::File(file.path().to_path_buf());
        let body = source.open().await.unwrap();
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from_static(b"from a file"));
    }

    #[tokio::test]
    async fn test_reader_body_streams_without_length() {
        use hyper::body::Body as _;

        // Standard input goes through the same reader path
        let payload: Vec<u8> = (0..=255u8).cycle().take(20 * 1024).collect();
        let body = stream_body(std::io::Cursor::new(payload.clone()));
        assert_eq!(body.size_hint().exact(), None);

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let source = BodySource::File(PathBuf::from("/nonexistent/conndebug/body"));
        let err = source.open().await.unwrap_err();
        assert!(matches!(err, FetchError::OpenBody { .. }));
        assert!(err.to_string().contains("/nonexistent/conndebug/body"));
    }
}
