//! Streaming content download and decryption.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::io::AsyncRead;
use futures::{ready, TryStreamExt};
use tracing::debug;

use crate::crypto::aes::AesCtr;
use crate::crypto::mac::MacVerifier;
use crate::error::{MegaError, Result};
use crate::http::HttpClient;
use crate::progress::{progress_channel, ProgressReceiver, ProgressSink};

/// Everything needed to fetch and decrypt one file.
#[derive(Clone)]
pub struct DownloadInfo {
    /// Decrypted file name.
    pub name: String,
    /// Content size in bytes as reported by the server.
    pub size: u64,
    /// Direct content URL.
    pub url: String,
    pub(crate) key: [u8; 16],
    pub(crate) iv: [u8; 16],
    pub(crate) mac: Option<[u8; 8]>,
}

impl DownloadInfo {
    pub(crate) fn new(
        name: String,
        size: u64,
        url: String,
        key: [u8; 16],
        iv: [u8; 16],
        mac: Option<[u8; 8]>,
    ) -> Self {
        Self {
            name,
            size,
            url,
            key,
            iv,
            mac,
        }
    }
}

impl fmt::Debug for DownloadInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadInfo")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// An open download: metadata, the decrypted byte stream and its progress feed.
pub struct Download {
    pub info: DownloadInfo,
    pub stream: DownloadStream,
    pub progress: ProgressReceiver,
}

/// Decrypting reader over a content body.
///
/// Bytes come out in the order they arrive, decrypted with AES-128-CTR. After
/// each read the running total is offered to the progress sink. When MAC
/// verification is enabled, reaching the end of the body with a mismatching
/// MAC fails the read with [`io::ErrorKind::InvalidData`] wrapping
/// [`MegaError::MacMismatch`].
pub struct DownloadStream {
    inner: Box<dyn AsyncRead + Send + Unpin>,
    ctr: AesCtr,
    total: u64,
    progress: Option<ProgressSink>,
    mac: Option<(MacVerifier, [u8; 8])>,
}

impl DownloadStream {
    /// Wrap an encrypted reader.
    ///
    /// MAC verification only happens if requested and `info` carries a MAC.
    pub fn new<R>(reader: R, info: &DownloadInfo, progress: Option<ProgressSink>, verify_mac: bool) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let mac = match (verify_mac, info.mac) {
            (true, Some(expected)) => {
                let mut nonce = [0u8; 8];
                nonce.copy_from_slice(&info.iv[..8]);
                Some((MacVerifier::new(&info.key, &nonce), expected))
            }
            (true, None) => {
                debug!(name = %info.name, "no MAC available, skipping verification");
                None
            }
            _ => None,
        };

        Self {
            inner: Box::new(reader),
            ctr: AesCtr::new(&info.key, &info.iv),
            total: 0,
            progress,
            mac,
        }
    }

    /// Bytes decrypted so far. Once the stream is exhausted this is the
    /// final byte count.
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl AsyncRead for DownloadStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        // A zero-length read says nothing about end of body.
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        let this = &mut *self;
        let n = ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;

        if n == 0 {
            if let Some((verifier, expected)) = this.mac.take() {
                if !verifier.verify(&expected) {
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        MegaError::MacMismatch,
                    )));
                }
                debug!(bytes = this.total, "content MAC verified");
            }
            return Poll::Ready(Ok(0));
        }

        let chunk = &mut buf[..n];
        this.ctr.apply_keystream(chunk);
        if let Some((verifier, _)) = this.mac.as_mut() {
            verifier.update(chunk);
        }

        this.total += n as u64;
        if let Some(sink) = &this.progress {
            sink.notify(this.total);
        }

        Poll::Ready(Ok(n))
    }
}

/// Start fetching `info.url` and wrap the body in a [`DownloadStream`].
///
/// Returns once response headers arrive; the body is read lazily. Dropping the
/// stream closes the connection.
pub async fn open(http: &HttpClient, info: DownloadInfo, verify_mac: bool) -> Result<Download> {
    debug!(name = %info.name, url = %info.url, size = info.size, "opening download");
    let response = http.get(&info.url).await?;

    let body = Box::pin(response.bytes_stream().map_err(io::Error::other)).into_async_read();
    let (sink, progress) = progress_channel();
    let stream = DownloadStream::new(body, &info, Some(sink), verify_mac);

    Ok(Download {
        info,
        stream,
        progress,
    })
}
