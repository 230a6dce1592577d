//! One-shot grace period timer for Tollgate.
//!
//! After registration the user is trusted for a limited window. When that
//! window closes they must be sent to the login view even if they never
//! navigate again; [`GraceTimer`] is what notices.
//!
//! # Disarmed mode
//!
//! While nothing is armed, [`GraceTimer::wait_for_expiry`] pends forever.
//! That lets the timer sit permanently in the session runtime's
//! `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* register, login, navigate... */ }
//!         () = timer.wait_for_expiry() => {
//!             store.clear_grace();
//!             forced_tx.send(ForcedNavigation { to: login_path })?;
//!         }
//!     }
//! }
//! ```
//!
//! Because the loop handles one branch at a time, a firing timer and a
//! navigation decision can never interleave.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::debug;

/// A cancellable one-shot deadline.
///
/// At most one deadline is pending at a time: arming an armed timer is a
/// no-op, so a second `register` does not restart the countdown.
#[derive(Debug, Default)]
pub struct GraceTimer {
    deadline: Option<Instant>,
}

impl GraceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules expiry `remaining` from now.
    ///
    /// Returns `false` (and changes nothing) if a deadline is already
    /// pending. A zero `remaining` fires on the next poll.
    pub fn arm(&mut self, remaining: Duration) -> bool {
        if let Some(deadline) = self.deadline {
            debug!(
                remaining_ms = millis(deadline.saturating_duration_since(Instant::now())),
                "grace timer already armed, ignoring"
            );
            return false;
        }

        let deadline = Instant::now()
            .checked_add(remaining)
            .unwrap_or_else(far_future);
        self.deadline = Some(deadline);
        debug!(remaining_ms = millis(remaining), "grace timer armed");
        true
    }

    /// Drops the pending deadline, if any. Safe to call at any time.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            debug!("grace timer cancelled");
        }
    }

    /// Whether a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before expiry, or `None` when disarmed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Resolves when the pending deadline passes, disarming the timer.
    ///
    /// When disarmed this future pends forever. It is cancel-safe: if it
    /// loses a `select!` race the deadline stays armed for the next call.
    pub async fn wait_for_expiry(&mut self) {
        let Some(deadline) = self.deadline else {
            std::future::pending::<()>().await;
            return;
        };

        time::sleep_until(deadline).await;
        self.deadline = None;
        debug!("grace timer fired");
    }
}

/// Roughly thirty years out; stands in for a deadline too large for
/// `Instant` arithmetic.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400 * 365 * 30)
}

/// Whole milliseconds for log fields, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
