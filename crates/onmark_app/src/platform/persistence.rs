use onmark_core::ProgressSnapshot;
use onmark_engine::KeyValueStore;
use onmark_logging::{onmark_debug, onmark_error, onmark_info, onmark_warn};
use serde::{Deserialize, Deserializer, Serialize};

pub(crate) const PROGRESS_KEY: &str = "onmark_progress_v1";

/// On-disk shape of the milestone record. Missing fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PersistedProgress {
    upload_confirmed: bool,
    discovery_confirmed: bool,
    chat_confirmed: bool,
    #[serde(deserialize_with = "lenient_millis")]
    completed_at: Option<i64>,
}

impl From<ProgressSnapshot> for PersistedProgress {
    fn from(snapshot: ProgressSnapshot) -> Self {
        Self {
            upload_confirmed: snapshot.upload_confirmed,
            discovery_confirmed: snapshot.discovery_confirmed,
            chat_confirmed: snapshot.chat_confirmed,
            completed_at: snapshot.completed_at,
        }
    }
}

impl From<PersistedProgress> for ProgressSnapshot {
    fn from(record: PersistedProgress) -> Self {
        Self {
            upload_confirmed: record.upload_confirmed,
            discovery_confirmed: record.discovery_confirmed,
            chat_confirmed: record.chat_confirmed,
            completed_at: record.completed_at,
        }
    }
}

/// Accepts integral or fractional millisecond timestamps.
fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))))
}

/// Reads the milestone record. Absent or unreadable records yield defaults.
pub(crate) fn load_progress(store: &dyn KeyValueStore) -> ProgressSnapshot {
    let raw = match store.get(PROGRESS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            onmark_debug!("No persisted progress under {}", PROGRESS_KEY);
            return ProgressSnapshot::default();
        }
        Err(err) => {
            onmark_warn!("Failed to read persisted progress: {}", err);
            return ProgressSnapshot::default();
        }
    };

    match serde_json::from_str::<PersistedProgress>(&raw) {
        Ok(record) => {
            onmark_info!("Loaded persisted progress {:?}", record);
            record.into()
        }
        Err(err) => {
            onmark_warn!("Discarding malformed progress record: {}", err);
            ProgressSnapshot::default()
        }
    }
}

pub(crate) fn save_progress(store: &dyn KeyValueStore, snapshot: ProgressSnapshot) {
    let content = match serde_json::to_string(&PersistedProgress::from(snapshot)) {
        Ok(text) => text,
        Err(err) => {
            onmark_error!("Failed to serialize progress: {}", err);
            return;
        }
    };

    if let Err(err) = store.set(PROGRESS_KEY, &content) {
        onmark_error!("Failed to write progress: {}", err);
    }
}
