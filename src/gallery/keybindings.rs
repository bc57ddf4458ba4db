// Keybindings for the gallery lightbox
//
// Keybindings (only while the lightbox is open):
// - Left / h: Previous slide
// - Right / l: Next slide
// - Escape: Close the lightbox
//
// `KeyboardHub` stands in for the page-wide keydown registry. Listeners are
// held through `ListenerGuard`s and removed when the guard drops.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// A key press, reduced to what the gallery cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Left,
    Right,
    Escape,
    Other,
}

impl KeyInput {
    /// Maps DOM-style and short key names.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" | "h" => Self::Left,
            "ArrowRight" | "Right" | "l" => Self::Right,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// Lightbox transition bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxAction {
    Previous,
    Next,
    Close,
}

impl LightboxAction {
    pub fn for_key(key: KeyInput) -> Option<Self> {
        match key {
            KeyInput::Left => Some(Self::Previous),
            KeyInput::Right => Some(Self::Next),
            KeyInput::Escape => Some(Self::Close),
            KeyInput::Other => None,
        }
    }
}

/// Callback type for key listeners; returns true when the key was handled
pub type KeyListener = Rc<dyn Fn(KeyInput) -> bool>;

#[derive(Default)]
struct HubInner {
    listeners: RefCell<Vec<(u64, KeyListener)>>,
    next_id: Cell<u64>,
}

/// Registry of active key listeners
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Rc<HubInner>,
}

impl std::fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays attached until the guard is dropped
    #[must_use = "dropping the guard detaches the listener immediately"]
    pub fn attach<F>(&self, listener: F) -> ListenerGuard
    where
        F: Fn(KeyInput) -> bool + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        ListenerGuard {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver a key press to every listener, in attach order
    pub fn dispatch(&self, key: KeyInput) -> bool {
        // Snapshot so listeners may detach themselves while handling
        let snapshot: Vec<KeyListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        let mut handled = false;
        for listener in snapshot {
            handled |= listener(key);
        }
        handled
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// Keeps one listener attached to a `KeyboardHub`
#[derive(Debug)]
pub struct ListenerGuard {
    hub: Weak<HubInner>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}
