//! Session facade: the UI-facing state around the lifecycle controller.
//!
//! Owns the anchor history, the privacy-prompt gate in front of the AR view,
//! the lazily created availability probe, and the anchor placement options.

use chrono::NaiveDateTime;

use crate::config::GateConfig;
use crate::error::Result;
use crate::history::{AnchorHistoryCollection, AnchorHistoryStore, AnchorKind, AnchorRecord};
use crate::lifecycle::UiEffect;
use crate::ports::Platform;
use crate::pose::{GeoCoordinates, Quaternion};
use crate::probe::{AvailabilityProbe, ProbeSignals, ProbeStatus};
use crate::storage::{has_displayed_privacy_prompt, mark_privacy_prompt_displayed, KeyValueStore};

/// UI-facing session state backed by a [`KeyValueStore`].
pub struct GeospatialSession<S> {
    config: GateConfig,
    history_store: AnchorHistoryStore<S>,
    history: AnchorHistoryCollection,
    resolve_pending: bool,
    ar_view_visible: bool,
    probe: Option<AvailabilityProbe>,
    anchor_kind: AnchorKind,
    streetscape_visible: bool,
    clear_geometry_requested: bool,
}

impl<S: KeyValueStore> GeospatialSession<S> {
    /// Load persisted state and decide which surface to show first.
    ///
    /// The AR view is shown immediately only if the privacy prompt was
    /// accepted in an earlier session.
    pub fn open(store: S, config: &GateConfig, now: NaiveDateTime) -> Result<Self> {
        let mut history_store = AnchorHistoryStore::new(store, config.history.clone());
        let history = history_store.load(now)?;
        let accepted = has_displayed_privacy_prompt(history_store.store());
        log::info!(
            "Session: {} anchor(s) in history, privacy prompt {}",
            history.len(),
            if accepted { "accepted" } else { "pending" }
        );

        let mut session = Self {
            config: config.clone(),
            resolve_pending: !history.is_empty(),
            history_store,
            history,
            ar_view_visible: false,
            probe: None,
            anchor_kind: AnchorKind::default(),
            streetscape_visible: false,
            clear_geometry_requested: false,
        };
        session.switch_to_ar_view(accepted);
        Ok(session)
    }

    // ── Privacy prompt and AR view ────────────────────────────────────────────

    /// Persist acceptance of the privacy prompt and show the AR view.
    pub fn accept_privacy_prompt(&mut self) -> Result<()> {
        mark_privacy_prompt_displayed(self.history_store.store_mut())?;
        self.switch_to_ar_view(true);
        Ok(())
    }

    /// Show the AR view (hiding the privacy prompt), or the reverse.
    ///
    /// The first time the AR view is shown an availability probe is created.
    pub fn switch_to_ar_view(&mut self, enabled: bool) {
        self.ar_view_visible = enabled;
        if enabled && self.probe.is_none() {
            log::info!("Session: starting positioning availability probe");
            self.probe = Some(AvailabilityProbe::new(&self.config));
        }
    }

    /// Apply a UI effect emitted by the lifecycle controller.
    pub fn apply(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::SwitchToArView(enabled) => self.switch_to_ar_view(enabled),
        }
    }

    pub fn is_ar_view_visible(&self) -> bool {
        self.ar_view_visible
    }

    pub fn is_privacy_prompt_visible(&self) -> bool {
        !self.ar_view_visible
    }

    // ── Availability probe ────────────────────────────────────────────────────

    /// Advance the probe, if one has been created.
    pub fn tick_probe<P>(
        &mut self,
        now: u64,
        platform: &mut P,
        signals: &ProbeSignals,
    ) -> Option<ProbeStatus>
    where
        P: Platform + ?Sized,
    {
        self.probe
            .as_mut()
            .map(|probe| probe.tick(now, platform, signals))
    }

    pub fn probe(&self) -> Option<&AvailabilityProbe> {
        self.probe.as_ref()
    }

    // ── Anchor history ────────────────────────────────────────────────────────

    pub fn history(&self) -> &AnchorHistoryCollection {
        &self.history
    }

    /// True until the loaded history has been handed out for resolving.
    pub fn should_resolve_history(&self) -> bool {
        self.resolve_pending
    }

    /// Hand out the loaded records once, for re-placing them in the scene.
    pub fn take_history_to_resolve(&mut self) -> Vec<AnchorRecord> {
        if !self.resolve_pending {
            return Vec::new();
        }
        self.resolve_pending = false;
        self.history.records().to_vec()
    }

    /// Record a newly placed anchor of the selected kind and persist the history.
    pub fn record_anchor(
        &mut self,
        coordinates: GeoCoordinates,
        rotation: Quaternion,
        created_at: NaiveDateTime,
    ) -> Result<AnchorRecord> {
        let record = AnchorRecord::new(self.anchor_kind, coordinates, rotation, created_at);
        if let Some(evicted) = self.history.push(record.clone()) {
            log::info!("Session: history full, evicted anchor {}", evicted.id);
        }
        self.history_store.save(&self.history)?;
        Ok(record)
    }

    /// Remove every anchor and persist the empty history.
    pub fn clear_all_anchors(&mut self) -> Result<()> {
        self.history.clear();
        self.resolve_pending = false;
        self.history_store.save(&self.history)
    }

    // ── Placement options ─────────────────────────────────────────────────────

    pub fn anchor_kind(&self) -> AnchorKind {
        self.anchor_kind
    }

    pub fn set_anchor_kind(&mut self, kind: AnchorKind) {
        self.anchor_kind = kind;
    }

    pub fn is_streetscape_visible(&self) -> bool {
        self.streetscape_visible
    }

    /// Toggle streetscape geometry rendering. Hiding it requests one clear of
    /// the rendered geometry.
    pub fn set_streetscape_visible(&mut self, visible: bool) {
        if self.streetscape_visible && !visible {
            self.clear_geometry_requested = true;
        }
        self.streetscape_visible = visible;
    }

    /// Consume the pending request to clear rendered streetscape geometry.
    pub fn take_clear_geometry_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_geometry_requested)
    }

    pub fn store(&self) -> &S {
        self.history_store.store()
    }

    pub fn into_store(self) -> S {
        self.history_store.into_store()
    }
}
