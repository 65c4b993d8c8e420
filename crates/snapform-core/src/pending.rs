//! The decode boundary and cancellable transform results.
//!
//! An image picked by the user is not usable until it has finished loading
//! and decoding. [`PendingImage`] is a future for that moment. It is either
//! ready from the start, decoded lazily from a data URL, or fed later through
//! the [`LoadCompleter`] half of an [`image_channel`], which plays the part of
//! the browser's load/error events.
//!
//! Transforms that wait on a source return a [`Pending`] result. It resolves
//! only once the source is decoded and the transform applied, and can be
//! cancelled through its [`CancelHandle`].
//!
//! Everything here is `!Send`: results are driven on the UI thread (the
//! browser microtask queue) or a local executor.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{AbortHandle, Abortable, Aborted, LocalBoxFuture};
use futures::FutureExt;

use crate::decode::{decode_bytes, decode_data_url, DecodeError, SourceImage};
use crate::TransformError;

type LoadResult = Result<SourceImage, DecodeError>;

/// Create a source that completes when its [`LoadCompleter`] is fed.
pub fn image_channel() -> (LoadCompleter, PendingImage) {
    let (tx, rx) = oneshot::channel();
    (
        LoadCompleter { tx },
        PendingImage {
            state: State::Waiting(rx),
        },
    )
}

/// Producer half of [`image_channel`].
///
/// Dropping it without completing makes the paired [`PendingImage`] resolve
/// to `InvalidSource`.
pub struct LoadCompleter {
    tx: oneshot::Sender<LoadResult>,
}

impl LoadCompleter {
    /// Deliver encoded bytes. They are decoded before the waiter wakes.
    pub fn complete_bytes(self, bytes: &[u8]) {
        self.send(decode_bytes(bytes));
    }

    /// Deliver a data URL. It is decoded before the waiter wakes.
    pub fn complete_data_url(self, url: &str) {
        self.send(decode_data_url(url));
    }

    /// Deliver an already decoded image.
    pub fn complete(self, image: SourceImage) {
        self.send(Ok(image));
    }

    /// Report that the image could not be loaded.
    pub fn fail(self, reason: impl Into<String>) {
        self.send(Err(DecodeError::LoadFailed(reason.into())));
    }

    /// True once the waiting side has been dropped or cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.tx.is_canceled()
    }

    fn send(self, result: LoadResult) {
        if self.tx.send(result).is_err() {
            tracing::debug!("image finished loading after its consumer went away");
        }
    }
}

impl fmt::Debug for LoadCompleter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadCompleter")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// A source image that may still be loading.
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[derive(Debug)]
pub struct PendingImage {
    state: State,
}

#[derive(Debug)]
enum State {
    Ready(Option<Result<SourceImage, TransformError>>),
    DataUrl(Option<String>),
    Waiting(oneshot::Receiver<LoadResult>),
}

impl PendingImage {
    /// A source that is already decoded.
    pub fn ready(image: SourceImage) -> Self {
        Self {
            state: State::Ready(Some(Ok(image))),
        }
    }

    /// A source decoded from a data URL on first poll.
    pub fn from_data_url(url: impl Into<String>) -> Self {
        Self {
            state: State::DataUrl(Some(url.into())),
        }
    }

    /// A source that was never set.
    pub fn unset() -> Self {
        Self {
            state: State::Ready(Some(Err(TransformError::InvalidSource(
                "no image has been selected".to_string(),
            )))),
        }
    }
}

impl From<SourceImage> for PendingImage {
    fn from(image: SourceImage) -> Self {
        Self::ready(image)
    }
}

impl Future for PendingImage {
    type Output = Result<SourceImage, TransformError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            State::Ready(slot) => Poll::Ready(slot.take().unwrap_or_else(polled_after_completion)),
            State::DataUrl(url) => Poll::Ready(match url.take() {
                Some(url) => decode_data_url(&url).map_err(TransformError::from),
                None => polled_after_completion(),
            }),
            State::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result.map_err(TransformError::from)),
                Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(
                    TransformError::InvalidSource(
                        "image was discarded before it finished loading".to_string(),
                    ),
                )),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

fn polled_after_completion() -> Result<SourceImage, TransformError> {
    Err(TransformError::InvalidSource(
        "image source was already consumed".to_string(),
    ))
}

/// An awaitable, cancellable transform result.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Pending<T> {
    inner: Abortable<LocalBoxFuture<'static, Result<T, TransformError>>>,
    handle: AbortHandle,
}

impl<T: 'static> Pending<T> {
    /// Wrap a future so it can be cancelled.
    pub fn new<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<T, TransformError>> + 'static,
    {
        let (handle, registration) = AbortHandle::new_pair();
        Self {
            inner: Abortable::new(future.boxed_local(), registration),
            handle,
        }
    }
}

impl<T> Pending<T> {
    /// A handle that cancels this operation, usable after the result has
    /// been moved into an executor.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            handle: self.handle.clone(),
        }
    }

    /// Cancel the operation. It resolves to `Cancelled` on its next poll.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, TransformError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(Aborted)) => {
                tracing::debug!("pending transform cancelled");
                Poll::Ready(Err(TransformError::Cancelled))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

/// Cancels a [`Pending`] result. Cancelling a finished operation does nothing.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    handle: AbortHandle,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }
}
