use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use crate::types::{DisplayConfig, UnitMode};
use crate::{Error, Result};

/// Keys understood by a [`SettingsStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ShowDownload,
    ShowUpload,
    UnitMode,
    UpdateInterval,
}

impl SettingKey {
    pub const ALL: [Self; 4] = [
        Self::ShowDownload,
        Self::ShowUpload,
        Self::UnitMode,
        Self::UpdateInterval,
    ];

    /// Key name as stored, e.g. `update-interval`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowDownload => "show-download",
            Self::ShowUpload => "show-upload",
            Self::UnitMode => "unit-mode",
            Self::UpdateInterval => "update-interval",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::config_error(format!("unknown setting '{s}'")))
    }
}

/// Callback invoked with the key whose value changed
pub type SettingsCallback = Arc<dyn Fn(SettingKey) + Send + Sync + 'static>;

/// Identifies one subscription for [`SettingsStore::unsubscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Externally owned configuration with change notification
pub trait SettingsStore: Send + Sync {
    fn show_download(&self) -> bool;
    fn show_upload(&self) -> bool;
    /// Raw `unit-mode` value: 0 = auto, 1 = KB/s, 2 = MB/s
    fn unit_mode(&self) -> i32;
    /// Seconds between updates
    fn update_interval(&self) -> f64;

    /// Call `callback` whenever the value under `key` changes
    fn subscribe(&self, key: SettingKey, callback: SettingsCallback) -> SubscriptionHandle;

    /// Drop a subscription. Unknown handles are ignored.
    fn unsubscribe(&self, handle: SubscriptionHandle);

    /// Snapshot of every display setting
    fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            show_download: self.show_download(),
            show_upload: self.show_upload(),
            unit_mode: UnitMode::from_setting(self.unit_mode()),
            update_interval_secs: self.update_interval(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Values {
    show_download: bool,
    show_upload: bool,
    unit_mode: i32,
    update_interval: f64,
}

struct Subscription {
    handle: SubscriptionHandle,
    key: SettingKey,
    callback: SettingsCallback,
}

struct Inner {
    values: Values,
    subscriptions: Vec<Subscription>,
    next_handle: u64,
}

/// In-process settings store shared between clones
#[derive(Clone)]
pub struct MemorySettings {
    inner: Arc<RwLock<Inner>>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::with_values(&DisplayConfig::default())
    }
}

impl MemorySettings {
    /// Create a store with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from `config`
    ///
    /// # Errors
    /// Returns an error if the update interval is not a positive number
    pub fn from_config(config: &DisplayConfig) -> Result<Self> {
        validate_interval(config.update_interval_secs)?;
        Ok(Self::with_values(config))
    }

    fn with_values(config: &DisplayConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                values: Values {
                    show_download: config.show_download,
                    show_upload: config.show_upload,
                    unit_mode: config.unit_mode.as_setting(),
                    update_interval: config.update_interval_secs,
                },
                subscriptions: Vec::new(),
                next_handle: 1,
            })),
        }
    }

    pub fn set_show_download(&self, value: bool) {
        self.update(SettingKey::ShowDownload, |values| {
            values.show_download = value;
        });
    }

    pub fn set_show_upload(&self, value: bool) {
        self.update(SettingKey::ShowUpload, |values| values.show_upload = value);
    }

    /// Store a raw `unit-mode` value; values other than 0, 1 and 2 read as auto
    pub fn set_unit_mode(&self, value: i32) {
        self.update(SettingKey::UnitMode, |values| values.unit_mode = value);
    }

    /// Store a new update interval in seconds
    ///
    /// # Errors
    /// Returns an error if `secs` is not a positive number
    pub fn set_update_interval(&self, secs: f64) -> Result<()> {
        validate_interval(secs)?;
        self.update(SettingKey::UpdateInterval, |values| {
            values.update_interval = secs;
        });
        Ok(())
    }

    /// Number of live subscriptions
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.read(|inner| inner.subscriptions.len())
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner)
    }

    /// Apply `change` and notify subscribers of `key` if the value moved.
    ///
    /// Callbacks run after the lock is released so they may read or
    /// subscribe again.
    fn update(&self, key: SettingKey, change: impl FnOnce(&mut Values)) {
        let callbacks: Vec<SettingsCallback> = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            let before = inner.values;
            change(&mut inner.values);
            if inner.values == before {
                return;
            }
            inner
                .subscriptions
                .iter()
                .filter(|sub| sub.key == key)
                .map(|sub| Arc::clone(&sub.callback))
                .collect()
        };

        debug!("Setting {key} changed, notifying {} subscriber(s)", callbacks.len());
        for callback in callbacks {
            callback(key);
        }
    }
}

impl SettingsStore for MemorySettings {
    fn show_download(&self) -> bool {
        self.read(|inner| inner.values.show_download)
    }

    fn show_upload(&self) -> bool {
        self.read(|inner| inner.values.show_upload)
    }

    fn unit_mode(&self) -> i32 {
        self.read(|inner| inner.values.unit_mode)
    }

    fn update_interval(&self) -> f64 {
        self.read(|inner| inner.values.update_interval)
    }

    fn subscribe(&self, key: SettingKey, callback: SettingsCallback) -> SubscriptionHandle {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let handle = SubscriptionHandle(inner.next_handle);
        inner.next_handle += 1;
        inner.subscriptions.push(Subscription {
            handle,
            key,
            callback,
        });
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.subscriptions.retain(|sub| sub.handle != handle);
    }
}

impl std::fmt::Debug for MemorySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.read(|inner| {
            f.debug_struct("MemorySettings")
                .field("values", &inner.values)
                .field("subscriptions", &inner.subscriptions.len())
                .finish()
        })
    }
}

fn validate_interval(secs: f64) -> Result<()> {
    if secs.is_finite() && secs > 0.0 {
        Ok(())
    } else {
        Err(Error::config_error(format!(
            "update-interval must be a positive number of seconds, got {secs}"
        )))
    }
}
