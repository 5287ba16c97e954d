// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input sources and the button-mask capability probe.
//!
//! The hub does not own the environment's event loop. It only asks a [`PointerSource`]
//! to start (or stop) delivering a set of [`NativeEventKind`]s, and the host forwards
//! each delivered notification to [`PointerHub::handle_event`](crate::hub::PointerHub::handle_event).
//!
//! Whether held buttons must be reconstructed is decided once, up front, with
//! [`ButtonMode::probe`].
//!
//! ```
//! use understory_pointer::event::NativeEventKind;
//! use understory_pointer::source::{ButtonMode, PointerSource};
//!
//! #[derive(Default)]
//! struct Window { listening: Vec<NativeEventKind> }
//!
//! impl PointerSource for Window {
//!     fn listen(&mut self, kind: NativeEventKind) { self.listening.push(kind); }
//!     fn unlisten(&mut self, kind: NativeEventKind) { self.listening.retain(|k| *k != kind); }
//!     fn reports_buttons(&self) -> bool { false }
//! }
//!
//! let window = Window::default();
//! let mode = ButtonMode::probe(&window);
//! assert!(!mode.is_native());
//! ```

use crate::buttons::{Buttons, TrackerHandle};
use crate::event::{NativeEventKind, RawPointerEvent};

/// Something that delivers pointer notifications.
pub trait PointerSource {
    /// Start delivering notifications of `kind`.
    fn listen(&mut self, kind: NativeEventKind);

    /// Stop delivering notifications of `kind`.
    fn unlisten(&mut self, kind: NativeEventKind);

    /// Returns `true` if delivered payloads carry a native held-button mask.
    fn reports_buttons(&self) -> bool;
}

/// Where the held-button mask of an event comes from.
#[derive(Debug, Default)]
pub enum ButtonMode {
    /// Read the mask from each payload. Payloads without one count as nothing held.
    #[default]
    Native,
    /// Reconstruct the mask from press/release notifications.
    Reconstructed(TrackerHandle),
}

impl ButtonMode {
    /// Chooses a mode based on what `source` reports.
    ///
    /// Reconstruction gets a fresh, feeding [`TrackerHandle`]. To share it with hubs
    /// over other sources, hand them [`ButtonMode::follow`] of this mode.
    #[must_use]
    pub fn probe<S: PointerSource + ?Sized>(source: &S) -> Self {
        if source.reports_buttons() {
            Self::Native
        } else {
            Self::Reconstructed(TrackerHandle::new())
        }
    }

    /// Returns `true` for [`ButtonMode::Native`].
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// A mode reading the same masks without feeding any tracker.
    #[must_use]
    pub fn follow(&self) -> Self {
        match self {
            Self::Native => Self::Native,
            Self::Reconstructed(tracker) => Self::Reconstructed(tracker.follow()),
        }
    }

    /// The tracker backing this mode, if any.
    #[must_use]
    pub fn tracker(&self) -> Option<&TrackerHandle> {
        match self {
            Self::Native => None,
            Self::Reconstructed(tracker) => Some(tracker),
        }
    }

    /// Feeds `raw` to the tracker (if feeding) and returns the mask to report for it.
    pub(crate) fn resolve(&self, raw: &RawPointerEvent) -> Buttons {
        match self {
            Self::Native => raw.buttons.unwrap_or_default(),
            Self::Reconstructed(tracker) => {
                tracker.observe(raw);
                tracker.mask()
            }
        }
    }
}
