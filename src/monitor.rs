use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::format::{compose_display, PLACEHOLDER};
use crate::sampler::{RateSampler, SampleState};
use crate::settings::{SettingKey, SettingsCallback, SettingsStore, SubscriptionHandle};
use crate::Result;

/// Host surface that shows the rendered speed text
pub trait DisplaySurface: Send + Sync {
    fn set_text(&self, text: &str);
}

impl<F> DisplaySurface for F
where
    F: Fn(&str) + Send + Sync,
{
    fn set_text(&self, text: &str) {
        self(text);
    }
}

struct Timer {
    stop: Sender<()>,
    handle: JoinHandle<()>,
    period: Duration,
}

struct Shared {
    settings: Arc<dyn SettingsStore>,
    surface: Arc<dyn DisplaySurface>,
    /// Held for the whole of a cycle, including the push to the surface
    sampler: Mutex<RateSampler>,
    updating: AtomicBool,
    enabled: AtomicBool,
    timer: Mutex<Option<Timer>>,
}

/// Clears the in-progress flag when a cycle ends
struct UpdateGuard<'a>(&'a AtomicBool);

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Shared {
    fn sampler(&self) -> MutexGuard<'_, RateSampler> {
        self.sampler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timer(&self) -> MutexGuard<'_, Option<Timer>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_display(&self) -> bool {
        if self
            .updating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("Update already in progress, dropping trigger");
            return false;
        }
        let _guard = UpdateGuard(&self.updating);

        let mut sampler = self.sampler();
        if !self.enabled.load(Ordering::Acquire) {
            return false;
        }

        if let Some(rates) = sampler.sample().display_rates() {
            let config = self.settings.display_config();
            self.surface.set_text(&compose_display(&config, &rates));
        }
        true
    }

    fn start_timer(self: &Arc<Self>) -> Result<()> {
        let mut slot = self.timer();
        if slot.is_some() || !self.enabled.load(Ordering::Acquire) {
            return Ok(());
        }

        let period = self.settings.display_config().timer_period();
        let (stop, stop_rx) = channel();
        let weak: Weak<Self> = Arc::downgrade(self);

        let handle = thread::Builder::new()
            .name("netspeed-timer".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(shared) = weak.upgrade() else {
                            break;
                        };
                        shared.update_display();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!("Update timer started with period {period:?}");
        *slot = Some(Timer {
            stop,
            handle,
            period,
        });
        Ok(())
    }

    fn stop_timer(&self) {
        let Some(timer) = self.timer().take() else {
            return;
        };

        let _ = timer.stop.send(());
        if timer.handle.thread().id() == thread::current().id() {
            // Stopped from inside a cycle; the loop exits once the cycle returns
            return;
        }
        if timer.handle.join().is_err() {
            warn!("Update timer thread panicked");
        }
    }

    fn restart_timer(self: &Arc<Self>) -> Result<()> {
        self.stop_timer();
        self.start_timer()
    }
}

/// Drives periodic sampling and pushes the rendered text to a surface.
///
/// Created enabled; [`SpeedIndicator::disable`] (or dropping it) stops the
/// timer, releases every settings subscription and guarantees that no update
/// reaches the surface afterwards.
pub struct SpeedIndicator {
    shared: Arc<Shared>,
    subscriptions: Vec<SubscriptionHandle>,
}

impl SpeedIndicator {
    /// Show the placeholder, subscribe to settings and start the timer
    ///
    /// # Errors
    /// Returns an error if the timer thread cannot be spawned
    pub fn enable(
        settings: Arc<dyn SettingsStore>,
        surface: Arc<dyn DisplaySurface>,
        sampler: RateSampler,
    ) -> Result<Self> {
        surface.set_text(PLACEHOLDER);

        let shared = Arc::new(Shared {
            settings,
            surface,
            sampler: Mutex::new(sampler),
            updating: AtomicBool::new(false),
            enabled: AtomicBool::new(true),
            timer: Mutex::new(None),
        });

        let mut indicator = Self {
            subscriptions: connect_settings(&shared),
            shared,
        };

        if let Err(e) = indicator.shared.start_timer() {
            indicator.disable();
            return Err(e);
        }

        info!("Speed indicator enabled");
        Ok(indicator)
    }

    /// Run one sampling cycle now.
    ///
    /// Returns `false` if another cycle was still in flight (the trigger is
    /// dropped) or the indicator is disabled.
    pub fn update_display(&self) -> bool {
        self.shared.update_display()
    }

    /// Stop the timer and start it again with the configured interval.
    /// Sampling state is kept.
    ///
    /// # Errors
    /// Returns an error if the timer thread cannot be spawned
    pub fn restart_timer(&self) -> Result<()> {
        self.shared.restart_timer()
    }

    /// Period of the running timer
    #[must_use]
    pub fn timer_period(&self) -> Option<Duration> {
        self.shared.timer().as_ref().map(|timer| timer.period)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Copy of the sampler's current state
    #[must_use]
    pub fn sample_state(&self) -> SampleState {
        self.shared.sampler().state().clone()
    }

    /// Stop the timer and release settings subscriptions. Safe to call twice.
    pub fn disable(&mut self) {
        {
            let _sampler = self.shared.sampler();
            if !self.shared.enabled.swap(false, Ordering::AcqRel) {
                return;
            }
        }

        self.shared.stop_timer();
        for handle in self.subscriptions.drain(..) {
            self.shared.settings.unsubscribe(handle);
        }
        info!("Speed indicator disabled");
    }
}

impl Drop for SpeedIndicator {
    fn drop(&mut self) {
        self.disable();
    }
}

impl std::fmt::Debug for SpeedIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeedIndicator")
            .field("enabled", &self.is_enabled())
            .field("timer_period", &self.timer_period())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

fn connect_settings(shared: &Arc<Shared>) -> Vec<SubscriptionHandle> {
    SettingKey::ALL
        .into_iter()
        .map(|key| {
            let weak = Arc::downgrade(shared);
            let callback: SettingsCallback = match key {
                SettingKey::UpdateInterval => Arc::new(move |_: SettingKey| {
                    if let Some(shared) = weak.upgrade() {
                        if let Err(e) = shared.restart_timer() {
                            warn!("Failed to restart update timer: {e}");
                        }
                    }
                }),
                SettingKey::ShowDownload | SettingKey::ShowUpload | SettingKey::UnitMode => {
                    Arc::new(move |_: SettingKey| {
                        if let Some(shared) = weak.upgrade() {
                            shared.update_display();
                        }
                    })
                }
            };
            shared.settings.subscribe(key, callback)
        })
        .collect()
}
