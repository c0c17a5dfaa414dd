use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::models::Alert;
use crate::store::{RecordStore, StoreError};
use crate::{alerts, expiry};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

pub async fn run_renewal_check(
    store: &dyn RecordStore,
    as_of: NaiveDate,
) -> Result<Vec<Alert>, StoreError> {
    let records = store.fetch_all_records().await?;

    let mut due = Vec::new();
    for record in &records {
        if !record.end_date.is_empty() && expiry::parse_iso_date(&record.end_date).is_none() {
            warn!(
                "row {} ({}) has unreadable end date {:?}; skipped",
                record.ordinal_index, record.institute_name, record.end_date
            );
            continue;
        }
        if expiry::needs_renewal_notice(record, as_of) {
            due.push(record.clone());
        }
    }

    debug!("checked {} records, {} due for renewal", records.len(), due.len());
    Ok(alerts::build_alerts(&due))
}

pub struct RenewalWatcher {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl RenewalWatcher {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn spawn(self, alerts_tx: mpsc::Sender<Alert>) -> WatcherHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => {
                        info!("renewal watcher stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let today = self.clock.today();
                        match run_renewal_check(self.store.as_ref(), today).await {
                            Ok(alerts) => {
                                for alert in alerts {
                                    tokio::select! {
                                        _ = stop_rx.changed() => {
                                            info!("renewal watcher stopping");
                                            return;
                                        }
                                        sent = alerts_tx.send(alert) => {
                                            if sent.is_err() {
                                                return;
                                            }
                                        }
                                    }
                                }
                            }
                            Err(e) => error!("renewal check failed: {e}"),
                        }
                    }
                }
            }
        });
        WatcherHandle {
            stop: stop_tx,
            task,
        }
    }
}

pub struct WatcherHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}
