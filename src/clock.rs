use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::time_codec::now_adjusted;

/// Publish the offset-adjusted "now" every `period` until `token` is cancelled.
/// Current-programme highlighting and the now line read from the receiver.
pub fn spawn_clock(offset_hours: i32, period: Duration, token: CancellationToken) -> (watch::Receiver<i64>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(now_adjusted(offset_hours));
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if tx.send(now_adjusted(offset_hours)).is_err() {
                        break;
                    }
                }
            }
        }
    });
    (rx, handle)
}
