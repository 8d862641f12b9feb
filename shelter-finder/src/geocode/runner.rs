//! Resumable batch geocoding.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::catalog::RawDataset;
use crate::domain::GeoPoint;
use crate::retry::{RetryError, RetryPolicy};

use super::Geocoder;
use super::checkpoint::Checkpoint;
use super::error::GeocodeError;

/// Default pause after each processed item.
const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(120);

/// Default suffix for composed addresses.
const DEFAULT_REGION_SUFFIX: &str = "FL";

/// Tuning for a batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Retry schedule for a failing lookup
    pub retry: RetryPolicy,
    /// Pause after each processed item
    pub item_delay: Duration,
    /// Appended to composed addresses
    pub region_suffix: String,
}

impl RunOptions {
    pub fn new() -> Self {
        Self {
            retry: RetryPolicy::geocode_default(),
            item_delay: DEFAULT_ITEM_DELAY,
            region_suffix: DEFAULT_REGION_SUFFIX.to_string(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    pub fn with_region_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.region_suffix = suffix.into();
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts from one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items considered after applying the limit
    pub considered: usize,
    /// Items already in the checkpoint
    pub skipped: usize,
    /// Items geocoded and recorded
    pub resolved: usize,
    /// Items recorded without coordinates in a dry run
    pub recorded_dry: usize,
    /// Records in the checkpoint at the end of the run
    pub checkpoint_len: usize,
}

/// Geocodes a raw dataset into a checkpoint file, one item at a time.
pub struct GeocodeBatchRunner<G> {
    geocoder: G,
    options: RunOptions,
}

impl<G: Geocoder> GeocodeBatchRunner<G> {
    pub fn new(geocoder: G, options: RunOptions) -> Self {
        Self { geocoder, options }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Process `dataset` into the checkpoint at `checkpoint_path`.
    ///
    /// `limit` caps how many flattened items are looked at (0 for all) and is
    /// applied before already-recorded items are skipped. In a dry run nothing
    /// is looked up and items are recorded without coordinates.
    pub async fn run(
        &self,
        dataset: &RawDataset,
        checkpoint_path: &Path,
        limit: usize,
        dry_run: bool,
    ) -> Result<RunSummary, GeocodeError> {
        let mut checkpoint = Checkpoint::load(checkpoint_path)?;

        let mut items = dataset.geocode_items(&self.options.region_suffix);
        if limit > 0 {
            items.truncate(limit);
        }

        let total = items.len();
        let mut summary = RunSummary {
            considered: total,
            ..RunSummary::default()
        };
        info!(
            total,
            already_recorded = checkpoint.len(),
            dry_run,
            path = %checkpoint_path.display(),
            "starting geocode run"
        );

        for (index, item) in items.into_iter().enumerate() {
            let position = index + 1;
            if checkpoint.contains(&item.key()) {
                debug!(position, total, name = %item.name, "already recorded, skipping");
                summary.skipped += 1;
                continue;
            }

            info!(position, total, name = %item.name, address = %item.address, "geocoding");
            let record = if dry_run {
                summary.recorded_dry += 1;
                item
            } else {
                let point = self.resolve(&item.address).await?;
                info!(position, %point, "resolved");
                summary.resolved += 1;
                item.with_point(point)
            };

            checkpoint.append(record)?;
            tokio::time::sleep(self.options.item_delay).await;
        }

        summary.checkpoint_len = checkpoint.len();
        info!(
            resolved = summary.resolved,
            skipped = summary.skipped,
            recorded = summary.checkpoint_len,
            "geocode run complete"
        );
        Ok(summary)
    }

    /// Look up one address, retrying according to the run's policy.
    async fn resolve(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        self.options
            .retry
            .run(|_| self.geocoder.geocode(address))
            .await
            .map_err(RetryError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::domain::Candidate;
    use crate::geocode::OfflineGeocoder;
    use crate::retry::Backoff;

    /// Geocoder that answers from the address length and records every call.
    #[derive(Default)]
    struct RecordingGeocoder {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingGeocoder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Geocoder for RecordingGeocoder {
        async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
            self.calls.lock().unwrap().push(address.to_string());
            Ok(GeoPoint::new(20.0 + address.len() as f64 / 10.0, -81.0).unwrap())
        }
    }

    /// Fails a fixed number of times before succeeding.
    struct FlakyGeocoder {
        failures: u32,
        calls: AtomicU32,
    }

    impl Geocoder for FlakyGeocoder {
        async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                return Err(GeocodeError::Status {
                    status: "UNKNOWN_ERROR".into(),
                    address: address.to_string(),
                });
            }
            Ok(GeoPoint::new(28.0, -81.0).unwrap())
        }
    }

    /// Reads the checkpoint before each lookup, to observe incremental saves.
    struct SnoopingGeocoder {
        path: std::path::PathBuf,
        seen_lengths: Mutex<Vec<usize>>,
    }

    impl Geocoder for SnoopingGeocoder {
        async fn geocode(&self, _address: &str) -> Result<GeoPoint, GeocodeError> {
            let len = std::fs::read_to_string(&self.path)
                .ok()
                .and_then(|s| serde_json::from_str::<Vec<Value>>(&s).ok())
                .map_or(0, |v| v.len());
            self.seen_lengths.lock().unwrap().push(len);
            Ok(GeoPoint::new(27.0, -81.0).unwrap())
        }
    }

    fn options() -> RunOptions {
        RunOptions::new()
            .with_item_delay(Duration::ZERO)
            .with_retry(RetryPolicy::unbounded(Backoff::Exponential {
                initial: Duration::from_millis(1),
                factor: 2,
                cap: Duration::from_millis(4),
            }))
    }

    fn dataset() -> RawDataset {
        serde_json::from_value(json!({
            "Polk": [
                {"name": "A", "street_address": "1 A St", "capacity": 100},
                {"facility": "B", "address": "2 B St"}
            ],
            "Lee": [
                {"name": "C"}
            ]
        }))
        .unwrap()
    }

    fn read(path: &Path) -> Vec<Value> {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn geocodes_every_item_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let runner = GeocodeBatchRunner::new(RecordingGeocoder::default(), options());

        let summary = runner.run(&dataset(), &path, 0, false).await.unwrap();

        assert_eq!(
            summary,
            RunSummary {
                considered: 3,
                skipped: 0,
                resolved: 3,
                recorded_dry: 0,
                checkpoint_len: 3,
            }
        );
        assert_eq!(
            runner.geocoder().calls(),
            vec!["1 A St, Polk, FL", "2 B St, Polk, FL", "Lee, FL"]
        );

        let records = read(&path);
        assert_eq!(records[0]["name"], "A");
        assert_eq!(records[0]["county"], "Polk");
        assert_eq!(records[0]["capacity"], 100);
        assert!(records[0]["lat"].is_number());
        assert_eq!(records[1]["name"], "B");
        assert_eq!(records[1]["facility"], "B");
        assert_eq!(records[2]["address"], "Lee, FL");
    }

    #[tokio::test]
    async fn resume_skips_recorded_items() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let mut seeded = Checkpoint::load(&path).unwrap();
        seeded
            .append(
                Candidate::new("A", "1 A St, Polk, FL")
                    .with_point(GeoPoint::new(27.5, -81.5).unwrap()),
            )
            .unwrap();

        let runner = GeocodeBatchRunner::new(RecordingGeocoder::default(), options());
        let summary = runner.run(&dataset(), &path, 2, false).await.unwrap();

        assert_eq!(summary.considered, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(runner.geocoder().calls(), vec!["2 B St, Polk, FL"]);

        let records = read(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["lat"], 27.5);
        assert_eq!(records[1]["name"], "B");
    }

    #[tokio::test]
    async fn resume_recognises_facility_only_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(
            &path,
            json!([{
                "facility": "Gym",
                "street_address": "9 Elm",
                "county": "Polk",
                "address": "9 Elm, Polk, FL",
                "lat": 28.0,
                "lng": -81.0
            }])
            .to_string(),
        )
        .unwrap();
        let dataset: RawDataset =
            serde_json::from_value(json!({"Polk": [{"facility": "Gym", "street_address": "9 Elm"}]}))
                .unwrap();

        let runner = GeocodeBatchRunner::new(RecordingGeocoder::default(), options());
        let summary = runner.run(&dataset, &path, 0, false).await.unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.resolved, 0);
        assert_eq!(summary.checkpoint_len, 1);
        assert!(runner.geocoder().calls().is_empty());
        assert_eq!(read(&path).len(), 1);
    }

    #[tokio::test]
    async fn rerun_after_completion_does_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let runner = GeocodeBatchRunner::new(RecordingGeocoder::default(), options());

        runner.run(&dataset(), &path, 0, false).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();
        let summary = runner.run(&dataset(), &path, 0, false).await.unwrap();

        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.resolved, 0);
        assert_eq!(runner.geocoder().calls().len(), 3);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn limit_applies_before_skipping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let runner = GeocodeBatchRunner::new(RecordingGeocoder::default(), options());

        runner.run(&dataset(), &path, 1, false).await.unwrap();
        let summary = runner.run(&dataset(), &path, 1, false).await.unwrap();

        assert_eq!(summary.considered, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(read(&path).len(), 1);
    }

    #[tokio::test]
    async fn dry_run_records_without_lookups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let runner = GeocodeBatchRunner::new(OfflineGeocoder, options());

        let summary = runner.run(&dataset(), &path, 0, true).await.unwrap();

        assert_eq!(summary.recorded_dry, 3);
        assert_eq!(summary.resolved, 0);
        let records = read(&path);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.get("lat").is_none()));
        assert_eq!(records[1]["address"], "2 B St, Polk, FL");
    }

    #[tokio::test]
    async fn failing_lookups_are_retried_until_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let geocoder = FlakyGeocoder {
            failures: 4,
            calls: AtomicU32::new(0),
        };
        let runner = GeocodeBatchRunner::new(geocoder, options());

        let summary = runner.run(&dataset(), &path, 1, false).await.unwrap();

        assert_eq!(summary.resolved, 1);
        assert_eq!(runner.geocoder().calls.load(Ordering::SeqCst), 5);
        assert_eq!(read(&path)[0]["lat"], 28.0);
    }

    #[tokio::test]
    async fn checkpoint_is_written_after_each_item() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let geocoder = SnoopingGeocoder {
            path: path.clone(),
            seen_lengths: Mutex::new(Vec::new()),
        };
        let runner = GeocodeBatchRunner::new(geocoder, options());

        runner.run(&dataset(), &path, 0, false).await.unwrap();

        assert_eq!(*runner.geocoder().seen_lengths.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn duplicate_inputs_are_geocoded_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let data: RawDataset = serde_json::from_value(json!({
            "Polk": [{"name": "A", "street_address": "1 A St"}, {"name": "A", "street_address": "1 A St"}]
        }))
        .unwrap();
        let runner = GeocodeBatchRunner::new(RecordingGeocoder::default(), options());

        let summary = runner.run(&data, &path, 0, false).await.unwrap();

        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(read(&path).len(), 1);
    }

    #[tokio::test]
    async fn corrupt_checkpoint_aborts_before_any_lookup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "not json").unwrap();
        let runner = GeocodeBatchRunner::new(RecordingGeocoder::default(), options());

        let err = runner.run(&dataset(), &path, 0, false).await.unwrap_err();

        assert!(matches!(err, GeocodeError::CheckpointParse { .. }));
        assert!(runner.geocoder().calls().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }
}
