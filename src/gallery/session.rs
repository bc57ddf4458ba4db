//! Lightbox bound to keyboard input for as long as it is open.
//!
//! Opening attaches exactly one listener to the [`KeyboardHub`]; every path
//! back to `Closed` (close, Escape, reconcile, dropping the session) detaches
//! it again.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

use super::index::{GalleryIndex, Group};
use super::keybindings::{KeyInput, KeyboardHub, LightboxAction, ListenerGuard};
use super::lightbox::LightboxController;
use crate::error::GalleryError;
use crate::models::{GalleryItem, Slide};

#[derive(Default)]
struct SessionInner {
    controller: LightboxController,
    binding: Option<ListenerGuard>,
}

pub struct LightboxSession {
    inner: Rc<RefCell<SessionInner>>,
    hub: KeyboardHub,
}

impl LightboxSession {
    /// Mounts a closed lightbox; no listener is attached yet.
    pub fn new(hub: KeyboardHub) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SessionInner::default())),
            hub,
        }
    }

    /// Resolves the clicked item's group and opens on it.
    pub fn open_item(
        &self,
        items: &[GalleryItem],
        clicked: &GalleryItem,
    ) -> Result<(), GalleryError> {
        let resolved = GalleryIndex::resolve_group(items, clicked)?;
        self.open(resolved.group, resolved.start)
    }

    pub fn open(&self, group: Group, start: usize) -> Result<(), GalleryError> {
        let mut inner = self.inner.borrow_mut();
        inner.controller.open(group, start)?;

        if inner.binding.is_none() {
            let weak = Rc::downgrade(&self.inner);
            inner.binding = Some(self.hub.attach(move |key| Self::on_key(&weak, key)));
            trace!("Lightbox key listener attached");
        }
        Ok(())
    }

    pub fn next(&self) -> Result<usize, GalleryError> {
        self.inner.borrow_mut().controller.next()
    }

    pub fn previous(&self) -> Result<usize, GalleryError> {
        self.inner.borrow_mut().controller.previous()
    }

    pub fn close(&self) {
        Self::close_inner(&self.inner);
    }

    /// Applies changed source data; closes (and detaches) when out of range.
    pub fn reconcile(&self, slides: Vec<Slide>) -> bool {
        let still_open = self.inner.borrow_mut().controller.reconcile(slides);
        if !still_open {
            Self::close_inner(&self.inner);
        }
        still_open
    }

    /// Feeds a key press through the hub, as the page would.
    pub fn press(&self, key: KeyInput) -> bool {
        self.hub.dispatch(key)
    }

    pub fn is_open(&self) -> bool {
        self.inner.borrow().controller.is_open()
    }

    pub fn position(&self) -> Option<usize> {
        self.inner.borrow().controller.position()
    }

    pub fn total(&self) -> usize {
        self.inner.borrow().controller.total()
    }

    pub fn current_slide(&self) -> Result<Slide, GalleryError> {
        self.inner.borrow().controller.current_slide().cloned()
    }

    pub fn counter_label(&self) -> Option<String> {
        self.inner.borrow().controller.view().counter_label()
    }

    pub fn has_key_binding(&self) -> bool {
        self.inner.borrow().binding.is_some()
    }

    fn on_key(weak: &Weak<RefCell<SessionInner>>, key: KeyInput) -> bool {
        let Some(inner) = weak.upgrade() else {
            return false;
        };
        let Some(action) = LightboxAction::for_key(key) else {
            return false;
        };

        match action {
            LightboxAction::Previous => inner.borrow_mut().controller.previous().is_ok(),
            LightboxAction::Next => inner.borrow_mut().controller.next().is_ok(),
            LightboxAction::Close => {
                Self::close_inner(&inner);
                true
            }
        }
    }

    fn close_inner(inner: &Rc<RefCell<SessionInner>>) {
        let binding = {
            let mut inner = inner.borrow_mut();
            inner.controller.close();
            inner.binding.take()
        };
        // Guard drops outside the borrow.
        if binding.is_some() {
            trace!("Lightbox key listener detached");
        }
        drop(binding);
    }
}

impl Drop for LightboxSession {
    fn drop(&mut self) {
        Self::close_inner(&self.inner);
    }
}
