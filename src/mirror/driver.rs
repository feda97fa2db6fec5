// src/mirror/driver.rs
// =============================================================================
// This module drives a whole mirror run.
//
// How it works:
// 1. Clear the mirror directory and schedule the site's root path
// 2. Keep up to `workers` visits in flight on a tokio JoinSet
// 3. Each visit fetches one path and dispatches the response
// 4. Targets returned by the dispatcher go through the VisitedSet; only the
//    first discovery of a path puts it on the queue
// 5. Repeat until the queue is empty and nothing is in flight
//
// Per-path states:
//   Unvisited -> Pending Fetch -> Persisted | Retry (404, once) | Failed
//                                | Unhandled
//
// A failed fetch only ends its own branch. A filesystem error ends the run:
// nothing new is dispatched, in-flight visits drain, and the error is returned.
// Cancelling the token behaves the same way minus the error.
//
// Rust concepts:
// - JoinSet: a set of spawned tasks we can await one at a time
// - Arc: shared ownership of the state every worker needs
// - CancellationToken: a cloneable "please stop" flag
// =============================================================================

use super::dispatch::{Dispatch, Dispatcher, FetchedResource};
use super::path::CanonicalPath;
use super::store::ResourceStore;
use super::visited::VisitedSet;
use crate::config::MirrorConfig;
use crate::error::{MirrorError, Result};
use crate::fetch::Fetcher;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

// Totals for one run, printed by the CLI
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorReport {
    /// HTTP requests issued (a 404 retry counts twice)
    pub fetched: usize,
    /// Resources written to disk
    pub persisted: usize,
    pub failed: usize,
    pub unhandled: usize,
    /// Off-site links seen and skipped
    pub external: usize,
    pub malformed: usize,
    /// Paths that were retried with a trailing slash
    pub retried: usize,
    /// Set when the run stopped early because of cancellation
    pub cancelled: bool,
}

impl MirrorReport {
    fn record(&mut self, visit: &VisitReport) {
        self.fetched += visit.requests;
        if visit.retried {
            self.retried += 1;
        }
        match &visit.outcome {
            Outcome::Persisted {
                external, malformed, ..
            } => {
                self.persisted += 1;
                self.external += external;
                self.malformed += malformed;
            }
            Outcome::Unhandled => self.unhandled += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::AlreadyScheduled => {}
        }
    }
}

// Terminal state of one visit
#[derive(Debug)]
enum Outcome {
    Persisted {
        targets: Vec<CanonicalPath>,
        external: usize,
        malformed: usize,
    },
    Unhandled,
    Failed,
    /// The trailing-slash variant or the redirect target was already
    /// claimed by another visit
    AlreadyScheduled,
}

#[derive(Debug)]
struct VisitReport {
    requests: usize,
    retried: bool,
    outcome: Outcome,
}

// State every worker needs, shared through an Arc
struct Shared {
    site: Url,
    fetcher: Arc<dyn Fetcher>,
    dispatcher: Dispatcher,
    visited: VisitedSet,
}

// One mirror run. Build it, call run(), throw it away.
pub struct Mirror {
    shared: Arc<Shared>,
    workers: usize,
    cancel: CancellationToken,
}

impl Mirror {
    pub fn new(config: &MirrorConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let store = ResourceStore::new(&config.output);
        Self {
            shared: Arc::new(Shared {
                site: config.site.clone(),
                fetcher,
                dispatcher: Dispatcher::new(config.site.clone(), store),
                visited: VisitedSet::new(),
            }),
            workers: config.workers.max(1),
            cancel: CancellationToken::new(),
        }
    }

    // Lets the caller stop the run from outside (e.g. on Ctrl-C)
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(self) -> Result<MirrorReport> {
        self.shared.dispatcher.store().reset().await?;

        // The start path is used exactly as given, so "https://host/guide"
        // gets the same 404 -> "/guide/" treatment as any other path
        let start = CanonicalPath::from_url_path(self.shared.site.path());
        info!(
            site = %self.shared.site,
            start = %start,
            dir = %self.shared.dispatcher.store().root().display(),
            workers = self.workers,
            "starting mirror"
        );

        let mut queue = VecDeque::new();
        self.shared.visited.insert(&start);
        queue.push_back(start);

        let mut in_flight = JoinSet::new();
        let mut report = MirrorReport::default();
        let mut fatal: Option<MirrorError> = None;

        loop {
            // Fill free worker slots
            while fatal.is_none() && !self.cancel.is_cancelled() && in_flight.len() < self.workers {
                let Some(path) = queue.pop_front() else {
                    break;
                };
                let shared = Arc::clone(&self.shared);
                in_flight.spawn(async move { shared.visit(path).await });
            }

            // Nothing running and nothing more we are allowed to start
            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            match joined {
                Ok(Ok(visit)) => {
                    report.record(&visit);
                    if let Outcome::Persisted { targets, .. } = visit.outcome {
                        for target in targets {
                            if self.shared.visited.insert(&target) {
                                queue.push_back(target);
                            }
                        }
                    }
                }
                Ok(Err(e)) if e.is_fatal() => {
                    error!("{}", e);
                    fatal.get_or_insert(e);
                }
                Ok(Err(e)) => {
                    warn!("{}", e);
                    report.failed += 1;
                }
                Err(join_error) => {
                    // A panicking worker only loses its own resource
                    error!("worker task failed: {}", join_error);
                    report.failed += 1;
                }
            }
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        if self.cancel.is_cancelled() {
            warn!(pending = queue.len(), "mirror cancelled before completion");
            report.cancelled = true;
        }

        info!(
            scheduled = self.shared.visited.count(),
            fetched = report.fetched,
            persisted = report.persisted,
            failed = report.failed,
            unhandled = report.unhandled,
            "mirror finished"
        );
        Ok(report)
    }
}

impl Shared {
    // Fetches one path (plus at most one trailing-slash retry) and dispatches it.
    // Errors from dispatch are returned as Err; everything else is an Outcome.
    async fn visit(&self, path: CanonicalPath) -> Result<VisitReport> {
        let mut path = path;
        let mut requests = 0;
        let mut retried = false;

        let outcome = loop {
            let url = path.to_url(&self.site);
            info!("fetching {}", url);
            requests += 1;

            let response = match self.fetcher.fetch(&url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("{}", e);
                    break Outcome::Failed;
                }
            };

            if !response.is_success() {
                if response.status == 404 && !path.is_directory() {
                    let retry = path.with_trailing_slash();
                    if !self.visited.insert(&retry) {
                        debug!(path = %retry, "trailing-slash variant already scheduled");
                        break Outcome::AlreadyScheduled;
                    }
                    debug!(from = %path, to = %retry, "not found, retrying with trailing slash");
                    path = retry;
                    retried = true;
                    continue;
                }

                let failure = MirrorError::Status {
                    url: response.final_url.to_string(),
                    status: response.status,
                };
                warn!("{}", failure);
                break Outcome::Failed;
            }

            // A redirect lands on a path of its own, which must not be
            // persisted a second time by whoever else links to it
            let landed = CanonicalPath::from_url_path(response.final_url.path());
            if landed != path && !self.visited.insert(&landed) {
                debug!(from = %path, to = %landed, "redirect target already scheduled");
                break Outcome::AlreadyScheduled;
            }

            let resource = FetchedResource {
                final_url: response.final_url,
                content_type: response.content_type,
                body: response.body,
            };

            break match self.dispatcher.dispatch(resource).await? {
                Dispatch::Persisted {
                    targets,
                    external,
                    malformed,
                    ..
                } => Outcome::Persisted {
                    targets,
                    external,
                    malformed,
                },
                Dispatch::Unhandled(_) => Outcome::Unhandled,
            };
        };

        Ok(VisitReport {
            requests,
            retried,
            outcome,
        })
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why is the VisitedSet checked in three places?
//    - The coordinator checks every discovered target before queueing it
//    - A visit checks the "/path/" variant itself before retrying a 404
//    - A visit checks where a redirect landed before dispatching
//    - All go through the same atomic insert, so a path is persisted at most
//      once no matter who discovers it first
//
// 2. Why `break match ...` inside the loop?
//    - `loop` is an expression; `break value` makes the loop return value
//    - The only way around the loop again is the 404 retry (`continue`)
// -----------------------------------------------------------------------------
