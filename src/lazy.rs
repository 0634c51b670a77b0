//! Single-flight lazy initialization.
//!
//! [`LazyInit`] runs an async initializer at most once at a time. The first
//! caller runs it; callers arriving while it runs wait on a watch channel and
//! receive the same result. A failed or cancelled initialization puts the cell
//! back into `Uninitialized` so the next caller retries.

use crate::error::{IndexError, IndexResult};
use parking_lot::Mutex;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

type Outcome<T> = Option<Result<Arc<T>, String>>;

enum State<T> {
    Uninitialized,
    Initializing(watch::Receiver<Outcome<T>>),
    Ready(Arc<T>),
}

enum Role<T> {
    Run(watch::Sender<Outcome<T>>),
    Wait(watch::Receiver<Outcome<T>>),
}

pub struct LazyInit<T> {
    state: Mutex<State<T>>,
}

impl<T> Default for LazyInit<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LazyInit<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Uninitialized),
        }
    }

    /// The value, if initialization already succeeded
    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.state.lock() {
            State::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_initializing(&self) -> bool {
        matches!(&*self.state.lock(), State::Initializing(_))
    }

    /// Return the value, running `init` if no value exists and no other
    /// caller is currently initializing.
    pub async fn get_or_init<F, Fut, E>(&self, init: F) -> IndexResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut init = Some(init);

        loop {
            let role = {
                let mut state = self.state.lock();
                match &*state {
                    State::Ready(value) => return Ok(value.clone()),
                    State::Initializing(rx) => Role::Wait(rx.clone()),
                    State::Uninitialized => {
                        let (tx, rx) = watch::channel(None);
                        *state = State::Initializing(rx);
                        Role::Run(tx)
                    }
                }
            };

            match role {
                Role::Run(tx) => {
                    let Some(init) = init.take() else {
                        // Only reachable if a previous run of ours was
                        // cancelled, which drops this whole future.
                        return Err(IndexError::InitFailed {
                            reason: "initializer already consumed".to_string(),
                        });
                    };
                    return self.run(tx, init).await;
                }
                Role::Wait(mut rx) => {
                    let outcome = match rx.wait_for(Option::is_some).await {
                        Ok(outcome) => outcome.clone(),
                        // The initializing caller was dropped mid-flight; the
                        // state is already reset, so try again.
                        Err(_) => continue,
                    };
                    return match outcome {
                        Some(Ok(value)) => Ok(value),
                        Some(Err(reason)) => Err(IndexError::InitFailed { reason }),
                        None => continue,
                    };
                }
            }
        }
    }

    async fn run<F, Fut, E>(&self, tx: watch::Sender<Outcome<T>>, init: F) -> IndexResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut guard = ResetOnDrop {
            state: &self.state,
            armed: true,
        };

        let result = init().await;

        let outcome = {
            let mut state = self.state.lock();
            match result {
                Ok(value) => {
                    let value = Arc::new(value);
                    *state = State::Ready(value.clone());
                    Ok(value)
                }
                Err(e) => {
                    *state = State::Uninitialized;
                    Err(e.to_string())
                }
            }
        };
        guard.armed = false;

        if let Err(reason) = &outcome {
            tracing::warn!("[lazy] initialization failed: {reason}");
        }

        tx.send_replace(Some(outcome.clone()));
        outcome.map_err(|reason| IndexError::InitFailed { reason })
    }
}

/// Resets the cell when the initializing future is dropped before finishing
struct ResetOnDrop<'a, T> {
    state: &'a Mutex<State<T>>,
    armed: bool,
}

impl<T> Drop for ResetOnDrop<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *self.state.lock() = State::Uninitialized;
        }
    }
}
