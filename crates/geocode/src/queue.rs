//! FIFO request queue with a single drain loop
//!
//! Callers enqueue a request and await a oneshot reply. At most one drain
//! task runs at a time; it pulls jobs in order, checks the shared limiter,
//! calls the handler and waits `delay` before the next job. When the limiter
//! refuses, every job still queued is answered with
//! [`QueueOutcome::RateLimited`] so callers can fall back immediately.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use storefinder_core::rate_limit::SlidingWindowLimiter;
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// How a queued request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueOutcome<T> {
    /// The handler ran and produced a value
    Completed(T),
    /// The limiter refused before the handler ran
    RateLimited,
    /// The drain task went away without answering
    Dropped,
}

type Handler<Req, Resp> = Arc<dyn Fn(Req) -> BoxFuture<'static, Resp> + Send + Sync>;

struct Job<Req, Resp> {
    request: Req,
    reply: oneshot::Sender<QueueOutcome<Resp>>,
}

struct State<Req, Resp> {
    jobs: VecDeque<Job<Req, Resp>>,
    draining: bool,
}

struct Inner<Req, Resp> {
    state: Mutex<State<Req, Resp>>,
    handler: Handler<Req, Resp>,
    limiter: Arc<SlidingWindowLimiter>,
    delay: Duration,
}

/// Serializing queue in front of a rate-limited handler.
pub struct RequestQueue<Req, Resp> {
    inner: Arc<Inner<Req, Resp>>,
}

impl<Req, Resp> Clone for RequestQueue<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Req, Resp> std::fmt::Debug for RequestQueue<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestQueue")
            .field("pending", &self.pending())
            .field("draining", &self.is_draining())
            .field("delay", &self.inner.delay)
            .finish()
    }
}

impl<Req, Resp> RequestQueue<Req, Resp> {
    /// Number of jobs waiting.
    pub fn pending(&self) -> usize {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .jobs
            .len()
    }

    /// True while a drain task is active.
    pub fn is_draining(&self) -> bool {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .draining
    }
}

impl<Req, Resp> RequestQueue<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Create a queue around `handler`.
    ///
    /// `delay` is the pause after each handler call before the next job.
    pub fn new<F>(handler: F, limiter: Arc<SlidingWindowLimiter>, delay: Duration) -> Self
    where
        F: Fn(Req) -> BoxFuture<'static, Resp> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    jobs: VecDeque::new(),
                    draining: false,
                }),
                handler: Arc::new(handler),
                limiter,
                delay,
            }),
        }
    }

    /// Enqueue a request and wait for its outcome.
    ///
    /// Must be called inside a tokio runtime. Dropping the returned future
    /// abandons the reply; the job still runs if it was already queued.
    pub async fn submit(&self, request: Req) -> QueueOutcome<Resp> {
        let (reply, rx) = oneshot::channel();

        let start_drain = {
            let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            state.jobs.push_back(Job { request, reply });
            !std::mem::replace(&mut state.draining, true)
        };

        if start_drain {
            trace!("starting request queue drain");
            tokio::spawn(drain(Arc::clone(&self.inner)));
        }

        rx.await.unwrap_or(QueueOutcome::Dropped)
    }
}

async fn drain<Req, Resp>(inner: Arc<Inner<Req, Resp>>)
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    loop {
        let job = {
            let mut state = inner.state.lock().unwrap_or_else(|e| e.into_inner());
            match state.jobs.pop_front() {
                Some(job) => job,
                None => {
                    state.draining = false;
                    return;
                }
            }
        };

        if !inner.limiter.try_acquire() {
            let flushed: Vec<_> = {
                let mut state = inner.state.lock().unwrap_or_else(|e| e.into_inner());
                state.jobs.drain(..).collect()
            };
            debug!(flushed = flushed.len() + 1, "rate limited, flushing queue");
            let _ = job.reply.send(QueueOutcome::RateLimited);
            for job in flushed {
                let _ = job.reply.send(QueueOutcome::RateLimited);
            }
            continue;
        }

        let response = (inner.handler)(job.request).await;
        let _ = job.reply.send(QueueOutcome::Completed(response));

        if !inner.delay.is_zero() {
            tokio::time::sleep(inner.delay).await;
        }
    }
}
