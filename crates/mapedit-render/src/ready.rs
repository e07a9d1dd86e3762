//! Host readiness signal.
//!
//! Map hosts load their style asynchronously and reject source/layer calls
//! until then. The host adapter hands out a [`ReadyNotifier`] to fire once
//! loading finishes; everything else holds a [`ReadySignal`] it can check
//! synchronously or await.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Waker};

#[derive(Debug, Default)]
struct ReadyState {
    ready: bool,
    wakers: Vec<Waker>,
}

/// Observer side of the readiness signal.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    state: Arc<Mutex<ReadyState>>,
}

/// Firing side of the readiness signal.
#[derive(Debug)]
pub struct ReadyNotifier {
    state: Arc<Mutex<ReadyState>>,
}

/// Create a linked signal/notifier pair, not yet ready.
pub fn ready_pair() -> (ReadySignal, ReadyNotifier) {
    let state = Arc::new(Mutex::new(ReadyState::default()));
    (
        ReadySignal { state: state.clone() },
        ReadyNotifier { state },
    )
}

impl ReadySignal {
    /// A signal for hosts that are usable immediately.
    pub fn ready() -> Self {
        let (signal, notifier) = ready_pair();
        notifier.notify();
        signal
    }

    pub fn is_ready(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ready
    }

    /// Future resolving once the host is ready.
    pub fn wait(&self) -> WaitReady {
        WaitReady {
            state: self.state.clone(),
        }
    }
}

impl ReadyNotifier {
    /// Mark the host ready and wake every waiter. Later calls do nothing.
    pub fn notify(&self) {
        let wakers = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.ready {
                return;
            }
            state.ready = true;
            std::mem::take(&mut state.wakers)
        };
        log::debug!("Host ready, waking {} waiter(s)", wakers.len());
        for waker in wakers {
            waker.wake();
        }
    }
}

/// Future returned by [`ReadySignal::wait`].
#[derive(Debug)]
pub struct WaitReady {
    state: Arc<Mutex<ReadyState>>,
}

impl Future for WaitReady {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.ready {
            return Poll::Ready(());
        }
        if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
