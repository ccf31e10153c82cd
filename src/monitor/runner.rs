use chrono::Utc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheRecord, CacheStore};
use crate::error::{CacheError, MonitorError};
use crate::fetch::Fetcher;
use crate::report::{BaselineOrigin, Reporter};

use super::state::{DegradedReason, FetchOutcome, MonitorContext, ShutdownOutcome, Transition};

/// Drives fetch → diff → report on a fixed delay until cancelled.
pub struct Monitor<F, R, S> {
  fetcher: F,
  reporter: R,
  store: S,
  interval: Duration,
  cancel: CancellationToken,
}

impl<F: Fetcher, R: Reporter, S: CacheStore> Monitor<F, R, S> {
  pub fn new(fetcher: F, reporter: R, store: S, interval: Duration, cancel: CancellationToken) -> Self {
    Self {
      fetcher,
      reporter,
      store,
      interval,
      cancel,
    }
  }

  /// Run until the cancellation token fires, then flush the cache.
  ///
  /// Returns an error only for startup failures: an unusable cache or a first
  /// listing that cannot be parsed.
  pub async fn run(self) -> Result<(), MonitorError> {
    let Self {
      mut fetcher,
      mut reporter,
      mut store,
      interval,
      cancel,
    } = self;

    let cached = load_cached(&store)?;
    if let Some(record) = &cached {
      info!(
        dogs = record.snapshot.len(),
        saved_at = %record.saved_at,
        "restored listing from cache"
      );
      reporter.report_baseline(
        &record.snapshot,
        BaselineOrigin::Cached {
          saved_at: record.saved_at,
        },
      );
    }
    let mut ctx = MonitorContext::new().start(cached);

    while !cancel.is_cancelled() {
      let result = fetcher.fetch().await;
      if cancel.is_cancelled() {
        debug!("discarding fetch result received after cancellation");
        break;
      }

      let outcome = FetchOutcome::from_fetch(result, Utc::now());
      let (next, transition) = match ctx.advance(outcome) {
        Ok(step) => step,
        Err(e) => {
          if let Err(close_err) = store.close() {
            warn!(error = %close_err, "failed to close cache");
          }
          return Err(e);
        }
      };
      ctx = next;
      debug!(phase = ?ctx.phase(), "tick done");
      publish(&mut reporter, &ctx, transition);

      tokio::select! {
        _ = cancel.cancelled() => break,
        _ = tokio::time::sleep(interval) => {}
      }
    }

    let ctx = ctx.shut_down();
    info!("shutting down");

    let outcome = match ctx.old_snapshot().filter(|s| !s.is_empty()) {
      Some(snapshot) => match store.save(snapshot, Utc::now()) {
        Ok(()) => {
          info!(dogs = snapshot.len(), "saved listing to cache");
          ShutdownOutcome::Saved {
            entries: snapshot.len(),
          }
        }
        Err(e) => {
          error!(error = %e, "failed to save listing to cache");
          ShutdownOutcome::SaveFailed(e)
        }
      },
      None => ShutdownOutcome::NothingToSave,
    };
    if let Err(e) = store.close() {
      warn!(error = %e, "failed to close cache");
    }
    reporter.report_shutdown(&outcome);

    Ok(())
  }
}

/// Read the previous run's record. An unreadable record counts as no history.
fn load_cached<S: CacheStore>(store: &S) -> Result<Option<CacheRecord>, MonitorError> {
  match store.load() {
    Ok(record) => Ok(record),
    Err(CacheError::Corrupt(reason)) => {
      warn!(%reason, "ignoring unreadable cache record");
      Ok(None)
    }
    Err(e) => Err(e.into()),
  }
}

fn publish<R: Reporter>(reporter: &mut R, ctx: &MonitorContext, transition: Transition) {
  match transition {
    Transition::Established => {
      if let Some(snapshot) = ctx.old_snapshot() {
        info!(dogs = snapshot.len(), "baseline established");
        reporter.report_baseline(snapshot, BaselineOrigin::Fresh);
      }
    }
    Transition::Resumed(None) => info!("listing unchanged since cache"),
    Transition::Resumed(Some(changes)) | Transition::Changed(changes) => {
      info!(
        added = changes.added.len(),
        removed = changes.removed.len(),
        "listing changed"
      );
      for entry in &changes.added {
        debug!(dog = %entry.identifier, attributes = ?entry.attributes(), "added");
      }
      for entry in &changes.removed {
        debug!(dog = %entry.identifier, attributes = ?entry.attributes(), "removed");
      }
      if let Some(current) = ctx.old_snapshot() {
        reporter.report_changes(&changes, current);
      }
    }
    Transition::Unchanged => debug!("listing unchanged"),
    Transition::Degraded(reason) => {
      if let DegradedReason::Malformed(e) = &reason {
        warn!(dog = e.identifier(), "listing entry did not parse");
      }
      warn!(%reason, "degraded tick, keeping previous listing");
      reporter.report_degraded(&reason);
    }
  }
}
