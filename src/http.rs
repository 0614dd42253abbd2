//! Shared outbound HTTP client.
//!
//! One connection pool serves catalog requests and song downloads for the
//! whole process. It is built on first use and closed exactly once at
//! shutdown; later calls to [`HttpPool::client`] report that it is gone.
//!
//! Every redirect hop is run through the pool's [`UrlPolicy`], so a public
//! song URL cannot bounce a request onto a restricted host.

use std::sync::Mutex;

use reqwest::{Client, redirect};

use crate::download::UrlPolicy;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Ready(Client),
    Closed,
}

#[derive(Debug, Default)]
pub struct HttpPool {
    slot: Mutex<Slot>,
    url_policy: UrlPolicy,
}

impl HttpPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool whose redirects must pass `url_policy`.
    pub fn with_url_policy(url_policy: UrlPolicy) -> Self {
        Self {
            slot: Mutex::new(Slot::Empty),
            url_policy,
        }
    }

    /// Returns a handle to the pool, creating it on first use.
    ///
    /// `None` after [`HttpPool::close`].
    pub fn client(&self) -> Option<Client> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match &*slot {
            Slot::Ready(client) => Some(client.clone()),
            Slot::Closed => None,
            Slot::Empty => {
                let client = Client::builder()
                    .user_agent(concat!("songpick/", env!("CARGO_PKG_VERSION")))
                    .redirect(redirect_policy(self.url_policy))
                    .build()
                    .unwrap_or_else(|e| {
                        tracing::warn!("falling back to default http client: {}", e);
                        Client::new()
                    });
                *slot = Slot::Ready(client.clone());
                Some(client)
            }
        }
    }

    /// Drops the pool. Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match std::mem::replace(&mut *slot, Slot::Closed) {
            Slot::Closed => false,
            Slot::Ready(_) => {
                tracing::debug!("http pool closed");
                true
            }
            Slot::Empty => true,
        }
    }
}

fn redirect_policy(url_policy: UrlPolicy) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match url_policy.check(attempt.url().as_str()) {
            Ok(()) => attempt.follow(),
            Err(e) => {
                tracing::warn!("refusing redirect to {}: {}", attempt.url(), e);
                attempt.error(e)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_created_lazily_and_reused() {
        let pool = HttpPool::new();
        assert!(pool.client().is_some());
        assert!(pool.client().is_some());
    }

    #[test]
    fn close_happens_once() {
        let pool = HttpPool::new();
        let _ = pool.client();
        assert!(pool.close());
        assert!(!pool.close());
        assert!(pool.client().is_none());
    }
}
