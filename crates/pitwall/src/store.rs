//! Selection state: season, event, session and the two compared drivers.
//!
//! Setting a level of the hierarchy clears everything below it, since an
//! event only exists within a season and a driver only within a session.
//! Listeners registered with [`SessionStore::subscribe`] are called with the
//! new selection after every change that alters it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::model::CompareRequest;

/// The current selection. `None` means "not chosen yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selection {
    /// Season year.
    pub season: Option<i32>,
    /// Event name.
    pub event: Option<String>,
    /// Session identifier.
    pub session: Option<String>,
    /// First driver code.
    pub driver_a: Option<String>,
    /// Second driver code.
    pub driver_b: Option<String>,
}

impl Selection {
    /// Whether every field is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.season.is_some()
            && self.event.is_some()
            && self.session.is_some()
            && self.driver_a.is_some()
            && self.driver_b.is_some()
    }

    /// Request body for comparing the fastest laps of the selected drivers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteSelection`] naming the first unset field.
    pub fn compare_request(&self) -> Result<CompareRequest> {
        fn require<T: Clone>(value: Option<&T>, field: &'static str) -> Result<T> {
            value.cloned().ok_or(Error::IncompleteSelection { field })
        }

        Ok(CompareRequest {
            season: require(self.season.as_ref(), "season")?,
            event: require(self.event.as_ref(), "event")?,
            session: require(self.session.as_ref(), "session")?,
            driver_a: require(self.driver_a.as_ref(), "driver_a")?,
            driver_b: require(self.driver_b.as_ref(), "driver_b")?,
            lap_a: None,
            lap_b: None,
        })
    }
}

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Selection) + Send>;

/// Owner of the [`Selection`] with change notification.
#[derive(Default)]
pub struct SessionStore {
    selection: Selection,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("selection", &self.selection)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SessionStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Select a season, clearing event, session and drivers.
    pub fn set_season(&mut self, season: Option<i32>) {
        self.update(|s| {
            *s = Selection {
                season,
                ..Selection::default()
            };
        });
    }

    /// Select an event, clearing session and drivers.
    pub fn set_event(&mut self, event: Option<String>) {
        self.update(|s| {
            s.event = event;
            s.session = None;
            s.driver_a = None;
            s.driver_b = None;
        });
    }

    /// Select a session, clearing the drivers.
    pub fn set_session(&mut self, session: Option<String>) {
        self.update(|s| {
            s.session = session;
            s.driver_a = None;
            s.driver_b = None;
        });
    }

    /// Select the first driver.
    pub fn set_driver_a(&mut self, driver: Option<String>) {
        self.update(|s| s.driver_a = driver);
    }

    /// Select the second driver.
    pub fn set_driver_b(&mut self, driver: Option<String>) {
        self.update(|s| s.driver_b = driver);
    }

    /// Replace the whole selection at once, e.g. when restoring a saved
    /// comparison. Empty driver codes are stored as unset.
    pub fn set_all(
        &mut self,
        season: i32,
        event: impl Into<String>,
        session: impl Into<String>,
        driver_a: Option<String>,
        driver_b: Option<String>,
    ) {
        let selection = Selection {
            season: Some(season),
            event: Some(event.into()),
            session: Some(session.into()),
            driver_a: driver_a.filter(|d| !d.is_empty()),
            driver_b: driver_b.filter(|d| !d.is_empty()),
        };
        self.update(|s| *s = selection);
    }

    /// Exchange driver A and driver B.
    pub fn swap_drivers(&mut self) {
        self.update(|s| std::mem::swap(&mut s.driver_a, &mut s.driver_b));
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        self.update(|s| *s = Selection::default());
    }

    /// Register a listener called with the new selection after each change.
    pub fn subscribe(&mut self, listener: impl FnMut(&Selection) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn update(&mut self, change: impl FnOnce(&mut Selection)) {
        let before = self.selection.clone();
        change(&mut self.selection);
        if self.selection == before {
            return;
        }
        trace!(selection = ?self.selection, "selection changed");
        for (_, listener) in &mut self.listeners {
            listener(&self.selection);
        }
    }
}
