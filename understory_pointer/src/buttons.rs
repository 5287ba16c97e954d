// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Button state reconstruction: rebuild the held-button mask from press/release transitions.
//!
//! Some environments do not report which buttons are held while a pointer event is
//! delivered. [`ButtonStateTracker`] rebuilds that information by watching press and
//! release notifications for the physical device.
//!
//! ## Usage
//!
//! 1) Call [`ButtonStateTracker::on_press`] for every press notification.
//! 2) Call [`ButtonStateTracker::on_release`] for every release notification.
//! 3) Read [`ButtonStateTracker::mask`] (or the [`ButtonStates`] projection) at any time.
//!
//! When the number of outstanding presses drops to zero, the whole mask is cleared.
//! This heals the state after a lost release notification, at the cost of exactness
//! when releases are reported for buttons that were never seen going down.
//!
//! ## Minimal example
//!
//! ```
//! use understory_pointer::buttons::{ButtonStateTracker, Buttons};
//!
//! let mut tracker = ButtonStateTracker::new();
//! tracker.on_press(0);
//! tracker.on_press(2);
//! assert_eq!(tracker.mask(), Buttons::PRIMARY | Buttons::SECONDARY);
//!
//! // One press still outstanding: only bit 0 clears.
//! tracker.on_release(0);
//! assert_eq!(tracker.mask(), Buttons::SECONDARY);
//!
//! // Balanced: everything resets.
//! tracker.on_release(2);
//! assert!(tracker.mask().is_empty());
//! ```
//!
//! Button indices at or beyond [`Buttons::WIDTH`] do not fit in the mask and are ignored
//! entirely: neither the mask nor the outstanding press count changes.

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::event::{NativeEventKind, RawPointerEvent};

bitflags::bitflags! {
    /// Bitmask of currently held buttons, where bit `i` represents button `i`.
    ///
    /// The first bits are named after their conventional roles. Bits for other
    /// buttons are retained as-is (see [`Buttons::from_index`]).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Buttons: u32 {
        /// Button 0, usually the left mouse button.
        const PRIMARY   = 1 << 0;
        /// Button 1, usually the middle mouse button or wheel press.
        const AUXILIARY = 1 << 1;
        /// Button 2, usually the right mouse button.
        const SECONDARY = 1 << 2;
        /// Button 3, usually the "browser back" button.
        const BACK      = 1 << 3;
        /// Button 4, usually the "browser forward" button.
        const FORWARD   = 1 << 4;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::empty()
    }
}

impl Buttons {
    /// Number of distinct buttons the mask can represent.
    pub const WIDTH: u8 = 32;

    /// Returns the single bit for button `index`, or `None` if it does not fit in the mask.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < Self::WIDTH {
            Some(Self::from_bits_retain(1 << index))
        } else {
            None
        }
    }

    /// Returns `true` if button `index` is held.
    #[must_use]
    pub const fn is_held(self, index: u8) -> bool {
        match Self::from_index(index) {
            Some(bit) => self.contains(bit),
            None => false,
        }
    }
}

/// Named view of the first three bits of a [`Buttons`] mask.
///
/// This is a projection for convenience; it carries no state of its own.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonStates {
    /// Bit 0 is set.
    pub primary: bool,
    /// Bit 1 is set.
    pub auxiliary: bool,
    /// Bit 2 is set.
    pub secondary: bool,
}

impl From<Buttons> for ButtonStates {
    fn from(mask: Buttons) -> Self {
        Self {
            primary: mask.contains(Buttons::PRIMARY),
            auxiliary: mask.contains(Buttons::AUXILIARY),
            secondary: mask.contains(Buttons::SECONDARY),
        }
    }
}

/// Reconstructs the held-button mask from press/release notifications.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonStateTracker {
    mask: Buttons,
    /// Presses not yet matched by a release.
    pressed: u32,
}

impl ButtonStateTracker {
    /// Creates a tracker with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a press of button `index`.
    pub fn on_press(&mut self, index: u8) {
        let Some(bit) = Buttons::from_index(index) else {
            log::trace!("[pointer] ignoring press of out-of-range button {index}");
            return;
        };
        self.mask |= bit;
        self.pressed = self.pressed.saturating_add(1);
    }

    /// Records a release of button `index`.
    ///
    /// If no presses remain outstanding afterwards, the whole mask is cleared.
    pub fn on_release(&mut self, index: u8) {
        let Some(bit) = Buttons::from_index(index) else {
            log::trace!("[pointer] ignoring release of out-of-range button {index}");
            return;
        };
        self.pressed = self.pressed.saturating_sub(1);
        if self.pressed == 0 {
            self.mask = Buttons::empty();
        } else {
            self.mask.remove(bit);
        }
    }

    /// Feeds a raw notification: presses and releases update the mask, everything else is ignored.
    pub fn observe(&mut self, event: &RawPointerEvent) {
        match event.kind {
            NativeEventKind::MouseDown => self.on_press(event.button),
            NativeEventKind::MouseUp => self.on_release(event.button),
            _ => {}
        }
    }

    /// Current mask of held buttons.
    #[must_use]
    pub fn mask(&self) -> Buttons {
        self.mask
    }

    /// Number of presses not yet matched by a release.
    #[must_use]
    pub fn press_count(&self) -> u32 {
        self.pressed
    }

    /// Named view of the first three buttons.
    #[must_use]
    pub fn states(&self) -> ButtonStates {
        self.mask.into()
    }

    /// Forget all held buttons, e.g. after the host window lost focus.
    pub fn reset(&mut self) {
        self.mask = Buttons::empty();
        self.pressed = 0;
    }
}

/// Shared handle to a [`ButtonStateTracker`].
///
/// Button-down state belongs to the physical device, not to a single target, so several
/// hubs may read the same tracker. Exactly one handle should feed it: the one created with
/// [`TrackerHandle::new`]. Handles made with [`TrackerHandle::follow`] only read.
#[derive(Debug)]
pub struct TrackerHandle {
    tracker: Rc<RefCell<ButtonStateTracker>>,
    feeds: bool,
}

impl Default for TrackerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerHandle {
    /// Creates a fresh tracker and returns the handle that feeds it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracker: Rc::new(RefCell::new(ButtonStateTracker::new())),
            feeds: true,
        }
    }

    /// Returns a read-only handle to the same tracker.
    #[must_use]
    pub fn follow(&self) -> Self {
        Self {
            tracker: Rc::clone(&self.tracker),
            feeds: false,
        }
    }

    /// Returns `true` if this handle updates the tracker from observed events.
    #[must_use]
    pub fn feeds(&self) -> bool {
        self.feeds
    }

    /// Returns `true` if both handles refer to the same tracker.
    #[must_use]
    pub fn shares_tracker_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tracker, &other.tracker)
    }

    /// Feeds `event` to the tracker if this is the feeding handle.
    ///
    /// Returns `true` if the tracker saw the event.
    pub fn observe(&self, event: &RawPointerEvent) -> bool {
        if self.feeds {
            self.tracker.borrow_mut().observe(event);
        }
        self.feeds
    }

    /// Current reconstructed mask.
    #[must_use]
    pub fn mask(&self) -> Buttons {
        self.tracker.borrow().mask()
    }

    /// Named view of the reconstructed mask.
    #[must_use]
    pub fn states(&self) -> ButtonStates {
        self.tracker.borrow().states()
    }

    /// Resets the shared tracker. Allowed from any handle.
    pub fn reset(&self) {
        self.tracker.borrow_mut().reset();
    }
}
