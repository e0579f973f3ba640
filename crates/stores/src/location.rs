//! Device location: one-shot fixes and a movement-filtered watch
//!
//! A [`LocationWatch`] runs on its own task and stops when its
//! [`CancellationHandle`] is cancelled or dropped. Updates that arrive after
//! cancellation are discarded, never delivered; fixes already queued when
//! it is cancelled are still delivered before the task exits.

use std::future::Future;
use std::time::{Duration, Instant};

use storefinder_core::config::LocationConfig;
use storefinder_geo::{haversine_distance_meters, validate_coordinate, Coordinate};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::GeolocationError;

/// Default minimum movement before a watch reports a new fix.
pub const DEFAULT_MIN_MOVEMENT_M: f64 = 10.0;

/// A device fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Where the device is
    pub coordinate: Coordinate,
    /// Accuracy radius in metres
    pub accuracy_m: f64,
    /// When the fix was taken
    pub timestamp: Instant,
}

impl Position {
    /// Fix taken now.
    pub fn now(coordinate: Coordinate, accuracy_m: f64) -> Self {
        Self {
            coordinate,
            accuracy_m,
            timestamp: Instant::now(),
        }
    }

    /// Time since the fix was taken.
    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// Options for a one-shot fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationOptions {
    /// Give up after this long
    pub timeout: Duration,
    /// Oldest cached fix accepted
    pub maximum_age: Duration,
    /// Ask for GPS-grade accuracy
    pub high_accuracy: bool,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self::from(&LocationConfig::default())
    }
}

impl From<&LocationConfig> for LocationOptions {
    fn from(config: &LocationConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            maximum_age: Duration::from_secs(config.maximum_age_secs),
            high_accuracy: true,
        }
    }
}

/// Platform location provider.
pub trait PositionSource: Send + Sync {
    /// One fix.
    fn current_position(
        &self,
        options: &LocationOptions,
    ) -> impl Future<Output = Result<Position, GeolocationError>> + Send;

    /// Stream of fixes and errors until the receiver is dropped.
    fn watch(&self) -> mpsc::Receiver<Result<Position, GeolocationError>>;
}

/// Get one validated, fresh-enough fix.
///
/// # Errors
///
/// [`GeolocationError::Timeout`] past `options.timeout`,
/// [`GeolocationError::PositionUnavailable`] for stale or invalid fixes, and
/// anything the source reports.
pub async fn locate<S: PositionSource>(
    source: &S,
    options: &LocationOptions,
) -> Result<Position, GeolocationError> {
    let position = tokio::time::timeout(options.timeout, source.current_position(options))
        .await
        .map_err(|_| GeolocationError::Timeout)??;

    if position.age() > options.maximum_age {
        debug!(age = ?position.age(), "rejecting stale fix");
        return Err(GeolocationError::PositionUnavailable);
    }

    let coordinate =
        validate_coordinate(position.coordinate).map_err(|_| GeolocationError::PositionUnavailable)?;
    Ok(Position {
        coordinate,
        ..position
    })
}

/// Stops a [`LocationWatch`] when cancelled or dropped.
///
/// Dropping the handle drops the sender, which the watch task observes as
/// cancellation.
#[derive(Debug)]
pub struct CancellationHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CancellationHandle {
    /// Stop the watch. Idempotent.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// True once cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// True once the watch task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel and wait for the task to exit.
    pub async fn stop(self) {
        self.cancel();
        let _ = self.task.await;
    }
}

/// Movement-filtered location updates.
#[derive(Debug)]
pub struct LocationWatch;

impl LocationWatch {
    /// Start watching `source`, calling `on_update` for errors and for fixes
    /// at least `min_movement_m` from the last delivered one.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn<S, F>(source: &S, min_movement_m: f64, mut on_update: F) -> CancellationHandle
    where
        S: PositionSource,
        F: FnMut(Result<Position, GeolocationError>) + Send + 'static,
    {
        let mut updates = source.watch();
        let (cancel, mut cancelled) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut filter = MovementFilter::new(min_movement_m);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.changed() => {
                        // Fixes already queued before cancellation still count
                        while let Ok(update) = updates.try_recv() {
                            if let Some(update) = filter.accept(update) {
                                on_update(update);
                            }
                        }
                        break;
                    }
                    update = updates.recv() => {
                        let Some(update) = update else { break };
                        if let Some(update) = filter.accept(update) {
                            on_update(update);
                        }
                    }
                }
            }
            debug!("location watch stopped");
        });

        CancellationHandle { cancel, task }
    }
}

/// Validates watched fixes and drops the ones that barely moved.
struct MovementFilter {
    last: Option<Coordinate>,
    min_movement_m: f64,
}

impl MovementFilter {
    fn new(min_movement_m: f64) -> Self {
        Self {
            last: None,
            min_movement_m,
        }
    }

    fn accept(
        &mut self,
        update: Result<Position, GeolocationError>,
    ) -> Option<Result<Position, GeolocationError>> {
        let position = match update {
            Ok(position) => position,
            Err(e) => return Some(Err(e)),
        };
        let Ok(coordinate) = validate_coordinate(position.coordinate) else {
            debug!(coordinate = %position.coordinate, "rejecting invalid watched fix");
            return Some(Err(GeolocationError::PositionUnavailable));
        };

        let moved = self
            .last
            .map_or(f64::INFINITY, |prev| haversine_distance_meters(&prev, &coordinate));
        if moved < self.min_movement_m {
            trace!(moved_m = moved, "suppressing small movement");
            return None;
        }
        self.last = Some(coordinate);
        Some(Ok(Position {
            coordinate,
            ..position
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use storefinder_geo::{round_to, COORDINATE_DECIMALS};

    /// Source replaying a fixed fix and handing out a pre-made watch channel.
    struct FakeSource {
        fix: Result<Position, GeolocationError>,
        delay: Duration,
        rx: Mutex<Option<mpsc::Receiver<Result<Position, GeolocationError>>>>,
    }

    impl FakeSource {
        fn fixed(fix: Result<Position, GeolocationError>) -> Self {
            Self {
                fix,
                delay: Duration::ZERO,
                rx: Mutex::new(None),
            }
        }

        fn streaming() -> (Self, mpsc::Sender<Result<Position, GeolocationError>>) {
            let (tx, rx) = mpsc::channel(16);
            let source = Self {
                fix: Err(GeolocationError::PositionUnavailable),
                delay: Duration::ZERO,
                rx: Mutex::new(Some(rx)),
            };
            (source, tx)
        }
    }

    impl PositionSource for FakeSource {
        async fn current_position(&self, _options: &LocationOptions) -> Result<Position, GeolocationError> {
            tokio::time::sleep(self.delay).await;
            self.fix
        }

        fn watch(&self) -> mpsc::Receiver<Result<Position, GeolocationError>> {
            self.rx.lock().unwrap().take().unwrap_or_else(|| mpsc::channel(1).1)
        }
    }

    const HOME: Coordinate = Coordinate::new(12.9716, 77.5946);

    /// Already at the precision watched fixes are normalized to.
    fn nudge(c: Coordinate, metres_north: f64) -> Coordinate {
        Coordinate::new(round_to(c.lat + metres_north / 111_195.0, COORDINATE_DECIMALS), c.lng)
    }

    #[tokio::test]
    async fn test_locate_returns_fix() {
        let source = FakeSource::fixed(Ok(Position::now(HOME, 12.0)));
        let pos = locate(&source, &LocationOptions::default()).await.unwrap();
        assert_eq!(pos.coordinate, HOME);
        assert_eq!(pos.accuracy_m, 12.0);
    }

    #[tokio::test]
    async fn test_locate_passes_through_denied() {
        let source = FakeSource::fixed(Err(GeolocationError::PermissionDenied));
        assert_eq!(
            locate(&source, &LocationOptions::default()).await,
            Err(GeolocationError::PermissionDenied)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_locate_times_out() {
        let source = FakeSource {
            delay: Duration::from_secs(60),
            ..FakeSource::fixed(Ok(Position::now(HOME, 5.0)))
        };
        assert_eq!(
            locate(&source, &LocationOptions::default()).await,
            Err(GeolocationError::Timeout)
        );
    }

    #[tokio::test]
    async fn test_locate_rejects_stale_and_invalid_fixes() {
        let options = LocationOptions {
            maximum_age: Duration::from_millis(1),
            ..LocationOptions::default()
        };
        let source = FakeSource::fixed(Ok(Position::now(HOME, 5.0)));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(
            locate(&source, &options).await,
            Err(GeolocationError::PositionUnavailable)
        );

        let source = FakeSource::fixed(Ok(Position::now(Coordinate::new(0.0, 0.0), 5.0)));
        assert_eq!(
            locate(&source, &LocationOptions::default()).await,
            Err(GeolocationError::PositionUnavailable)
        );
    }

    #[tokio::test]
    async fn test_watch_suppresses_small_movements() {
        let (source, tx) = FakeSource::streaming();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = LocationWatch::spawn(&source, DEFAULT_MIN_MOVEMENT_M, move |update| {
            sink.lock().unwrap().push(update.map(|p| p.coordinate));
        });

        tx.send(Ok(Position::now(HOME, 5.0))).await.unwrap();
        tx.send(Ok(Position::now(nudge(HOME, 4.0), 5.0))).await.unwrap();
        tx.send(Ok(Position::now(nudge(HOME, 25.0), 5.0))).await.unwrap();
        tx.send(Err(GeolocationError::PositionUnavailable)).await.unwrap();
        drop(tx);

        // Channel closed, task exits on its own
        let task_done = tokio::time::timeout(Duration::from_secs(1), handle.stop()).await;
        assert!(task_done.is_ok());

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                Ok(HOME),
                Ok(nudge(HOME, 25.0)),
                Err(GeolocationError::PositionUnavailable),
            ]
        );
    }

    #[tokio::test]
    async fn test_watch_reports_invalid_fixes() {
        let (source, tx) = FakeSource::streaming();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = LocationWatch::spawn(&source, DEFAULT_MIN_MOVEMENT_M, move |update| {
            sink.lock().unwrap().push(update.map(|p| p.coordinate));
        });

        tx.send(Ok(Position::now(Coordinate::new(0.0, 0.0), 5.0))).await.unwrap();
        tx.send(Ok(Position::now(Coordinate::new(95.0, 10.0), 5.0))).await.unwrap();
        tx.send(Ok(Position::now(Coordinate::new(12.97160004, 77.59459996), 5.0)))
            .await
            .unwrap();
        drop(tx);
        handle.stop().await;

        // Rejected fixes never become the movement baseline
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                Err(GeolocationError::PositionUnavailable),
                Err(GeolocationError::PositionUnavailable),
                Ok(HOME),
            ]
        );
    }

    #[tokio::test]
    async fn test_watch_stops_on_cancel() {
        let (source, tx) = FakeSource::streaming();
        let count = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&count);

        let handle = LocationWatch::spawn(&source, DEFAULT_MIN_MOVEMENT_M, move |_| {
            *sink.lock().unwrap() += 1;
        });

        tx.send(Ok(Position::now(HOME, 5.0))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*count.lock().unwrap(), 1);

        handle.cancel();
        assert!(handle.is_cancelled());
        handle.stop().await;

        // Late results are never delivered
        let _ = tx.send(Ok(Position::now(nudge(HOME, 500.0), 5.0))).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_watch() {
        let (source, tx) = FakeSource::streaming();
        let handle = LocationWatch::spawn(&source, DEFAULT_MIN_MOVEMENT_M, |_| {});
        drop(handle);

        tokio::time::sleep(Duration::from_millis(20)).await;
        // Receiver is gone once the task exits
        assert!(tx.send(Ok(Position::now(HOME, 5.0))).await.is_err());
    }
}
