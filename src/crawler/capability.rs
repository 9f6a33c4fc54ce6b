//! Rendering and probing capabilities used by the resolver
//!
//! A [`Renderer`] hands out one [`RenderSession`] per item. Rendering a page
//! yields a [`RequestStream`] of the outbound requests the page issues; each
//! [`InterceptedRequest`] must be let through or aborted, and aborting lets
//! the renderer stop early. The stream ends when the renderer considers the
//! page finished.
//!
//! Sessions are released by [`RenderSession::close`] on the normal path and
//! by their `Drop` impl when a resolution is cancelled (e.g. on timeout).

use crate::CapabilityError;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};
use url::Url;

/// Opens isolated rendering sessions
pub trait Renderer: Send + Sync + 'static {
    type Session: RenderSession;

    fn open_session(&self) -> impl Future<Output = Result<Self::Session, CapabilityError>> + Send;
}

/// A single rendering context, never shared between items
pub trait RenderSession: Send {
    /// Navigates to `address` and streams the requests the page issues
    fn render(
        &mut self,
        address: &Url,
    ) -> impl Future<Output = Result<RequestStream, CapabilityError>> + Send;

    /// Releases the session
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Header-only existence check
pub trait ExistenceProbe: Send + Sync + 'static {
    /// Returns `Ok(true)` if the resource answers with a success status
    fn exists(&self, url: &str) -> impl Future<Output = Result<bool, CapabilityError>> + Send;
}

/// Observer's decision on an intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Abort,
}

/// An outbound request paused until the observer decides its fate
///
/// Dropping it without a verdict lets the request continue.
#[derive(Debug)]
pub struct InterceptedRequest {
    url: String,
    reply: oneshot::Sender<Verdict>,
}

impl InterceptedRequest {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Aborts the request; the renderer stops issuing further requests
    pub fn abort(self) {
        let _ = self.reply.send(Verdict::Abort);
    }

    /// Lets the request through
    pub fn proceed(self) {
        let _ = self.reply.send(Verdict::Continue);
    }
}

/// Outbound requests of one render, in issue order
#[derive(Debug)]
pub struct RequestStream {
    rx: mpsc::Receiver<InterceptedRequest>,
}

impl RequestStream {
    /// Creates a connected emitter/stream pair
    ///
    /// The stream ends once every emitter clone has been dropped.
    pub fn channel(capacity: usize) -> (RequestEmitter, RequestStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (RequestEmitter { tx }, RequestStream { rx })
    }

    /// Waits for the next intercepted request
    pub async fn next(&mut self) -> Option<InterceptedRequest> {
        self.rx.recv().await
    }
}

/// What happened to an emitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    Continued,
    Aborted,
    /// Nobody is observing the stream any more
    Detached,
}

/// Renderer-side handle that pauses requests for interception
#[derive(Debug, Clone)]
pub struct RequestEmitter {
    tx: mpsc::Sender<InterceptedRequest>,
}

impl RequestEmitter {
    /// Emits one request and waits for the observer's verdict
    pub async fn emit(&self, url: impl Into<String>) -> Emission {
        let (reply, verdict) = oneshot::channel();
        let request = InterceptedRequest {
            url: url.into(),
            reply,
        };

        if self.tx.send(request).await.is_err() {
            return Emission::Detached;
        }

        match verdict.await {
            Ok(Verdict::Abort) => Emission::Aborted,
            Ok(Verdict::Continue) | Err(_) => Emission::Continued,
        }
    }
}
