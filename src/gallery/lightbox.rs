//! Lightbox open/close lifecycle and in-group navigation.
//!
//! All transitions are synchronous and side-effect free; the presentation
//! layer renders from [`LightboxView`].

use tracing::{debug, trace};

use super::index::{Group, ResolvedGroup};
use crate::error::GalleryError;
use crate::models::Slide;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open { group: Group, position: usize },
}

impl LightboxState {
    fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open { .. } => "open",
        }
    }
}

/// Read-only snapshot for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightboxView<'a> {
    pub is_open: bool,
    pub current_slide: Option<&'a Slide>,
    pub position: Option<usize>,
    pub total: usize,
}

impl LightboxView<'_> {
    /// "3 / 10" style counter, absent when closed.
    pub fn counter_label(&self) -> Option<String> {
        self.position
            .map(|position| format!("{} / {}", position + 1, self.total.max(1)))
    }
}

#[derive(Debug, Default)]
pub struct LightboxController {
    state: LightboxState,
}

impl LightboxController {
    /// Starts `Closed`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    pub fn position(&self) -> Option<usize> {
        match &self.state {
            LightboxState::Open { position, .. } => Some(*position),
            LightboxState::Closed => None,
        }
    }

    /// Number of slides in the active group, 0 when closed.
    pub fn total(&self) -> usize {
        match &self.state {
            LightboxState::Open { group, .. } => group.len(),
            LightboxState::Closed => 0,
        }
    }

    pub fn open(&mut self, group: Group, start: usize) -> Result<(), GalleryError> {
        if self.is_open() {
            return Err(self.invalid("open"));
        }
        if start >= group.len() {
            return Err(GalleryError::InvalidTransition {
                operation: "open",
                reason: format!("start position {start} is outside a group of {}", group.len()),
            });
        }
        debug!(len = group.len(), start, "Opening lightbox");
        self.state = LightboxState::Open {
            group,
            position: start,
        };
        Ok(())
    }

    pub fn open_resolved(&mut self, resolved: ResolvedGroup) -> Result<(), GalleryError> {
        self.open(resolved.group, resolved.start)
    }

    /// Advances one slide, wrapping to the first after the last.
    pub fn next(&mut self) -> Result<usize, GalleryError> {
        match &mut self.state {
            LightboxState::Open { group, position } => {
                *position = (*position + 1) % group.len();
                trace!(position = *position, "Lightbox next");
                Ok(*position)
            }
            LightboxState::Closed => Err(closed_error("next")),
        }
    }

    /// Steps back one slide, wrapping to the last before the first.
    pub fn previous(&mut self) -> Result<usize, GalleryError> {
        match &mut self.state {
            LightboxState::Open { group, position } => {
                *position = if *position > 0 {
                    *position - 1
                } else {
                    group.len() - 1
                };
                trace!(position = *position, "Lightbox previous");
                Ok(*position)
            }
            LightboxState::Closed => Err(closed_error("previous")),
        }
    }

    /// Valid from any state; drops the group and position.
    pub fn close(&mut self) {
        if self.is_open() {
            debug!("Closing lightbox");
        }
        self.state = LightboxState::Closed;
    }

    /// Re-applies the current position to freshly derived slides.
    ///
    /// Closes when the new slides no longer cover the position. Returns
    /// whether the lightbox is still open. No-op while closed.
    pub fn reconcile(&mut self, slides: Vec<Slide>) -> bool {
        let Some(position) = self.position() else {
            return false;
        };

        match Group::new(slides) {
            Ok(group) if position < group.len() => {
                self.state = LightboxState::Open { group, position };
                true
            }
            _ => {
                debug!(position, "Source changed under the lightbox; closing");
                self.close();
                false
            }
        }
    }

    pub fn current_slide(&self) -> Result<&Slide, GalleryError> {
        match &self.state {
            LightboxState::Open { group, position } => {
                group.get(*position).ok_or(GalleryError::NotOpen)
            }
            LightboxState::Closed => Err(GalleryError::NotOpen),
        }
    }

    pub fn view(&self) -> LightboxView<'_> {
        LightboxView {
            is_open: self.is_open(),
            current_slide: self.current_slide().ok(),
            position: self.position(),
            total: self.total(),
        }
    }

    fn invalid(&self, operation: &'static str) -> GalleryError {
        GalleryError::InvalidTransition {
            operation,
            reason: format!("lightbox is {}", self.state.name()),
        }
    }
}

fn closed_error(operation: &'static str) -> GalleryError {
    GalleryError::InvalidTransition {
        operation,
        reason: "lightbox is closed".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::GalleryIndex;
    use crate::models::GalleryItem;

    fn slides(n: usize) -> Vec<Slide> {
        (0..n)
            .map(|i| Slide {
                id: i as i64 + 1,
                title: format!("Slide {}", i + 1),
                description: String::new(),
                category: "A".into(),
                media: format!("/p/{}.png", i + 1),
            })
            .collect()
    }

    fn group(n: usize) -> Group {
        Group::new(slides(n)).unwrap()
    }

    #[test]
    fn test_starts_closed() {
        let lightbox = LightboxController::new();
        assert!(!lightbox.is_open());
        assert_eq!(lightbox.position(), None);
        assert_eq!(lightbox.total(), 0);
        assert_eq!(lightbox.current_slide(), Err(GalleryError::NotOpen));
    }

    #[test]
    fn test_open_validates_start() {
        let mut lightbox = LightboxController::new();
        let err = lightbox.open(group(3), 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot open: start position 3 is outside a group of 3"
        );
        assert!(!lightbox.is_open());

        lightbox.open(group(3), 2).unwrap();
        assert_eq!(lightbox.position(), Some(2));
        assert_eq!(lightbox.current_slide().unwrap().id, 3);
    }

    #[test]
    fn test_open_while_open_fails() {
        let mut lightbox = LightboxController::new();
        lightbox.open(group(2), 0).unwrap();
        assert_eq!(
            lightbox.open(group(2), 1),
            Err(GalleryError::InvalidTransition {
                operation: "open",
                reason: "lightbox is open".into(),
            })
        );
        assert_eq!(lightbox.position(), Some(0));
    }

    #[test]
    fn test_navigation_while_closed_fails() {
        let mut lightbox = LightboxController::new();
        assert_eq!(
            lightbox.next(),
            Err(GalleryError::InvalidTransition {
                operation: "next",
                reason: "lightbox is closed".into(),
            })
        );
        assert!(matches!(
            lightbox.previous(),
            Err(GalleryError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_wraparound() {
        let mut lightbox = LightboxController::new();
        lightbox.open(group(4), 3).unwrap();
        assert_eq!(lightbox.next(), Ok(0));
        assert_eq!(lightbox.previous(), Ok(3));
        assert_eq!(lightbox.previous(), Ok(2));
    }

    #[test]
    fn test_cycle_closure() {
        for len in 1..=6 {
            for start in 0..len {
                let mut lightbox = LightboxController::new();
                lightbox.open(group(len), start).unwrap();
                for _ in 0..len {
                    lightbox.next().unwrap();
                }
                assert_eq!(lightbox.position(), Some(start));
                for _ in 0..len {
                    lightbox.previous().unwrap();
                }
                assert_eq!(lightbox.position(), Some(start));
            }
        }
    }

    #[test]
    fn test_close_discards_slide_data() {
        let mut lightbox = LightboxController::new();
        lightbox.close();
        assert!(!lightbox.is_open());

        lightbox.open(group(2), 1).unwrap();
        lightbox.close();
        assert_eq!(lightbox.state(), &LightboxState::Closed);
        assert_eq!(lightbox.current_slide(), Err(GalleryError::NotOpen));
        let view = lightbox.view();
        assert!(!view.is_open);
        assert!(view.current_slide.is_none());
        assert_eq!(view.counter_label(), None);
    }

    #[test]
    fn test_reconcile_shorter_group_closes() {
        let mut lightbox = LightboxController::new();
        lightbox.open(group(5), 3).unwrap();
        assert!(!lightbox.reconcile(slides(3)));
        assert!(!lightbox.is_open());

        lightbox.open(group(5), 3).unwrap();
        assert!(!lightbox.reconcile(slides(4).into_iter().take(3).collect()));

        lightbox.open(group(5), 0).unwrap();
        assert!(!lightbox.reconcile(Vec::new()));
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_reconcile_long_enough_keeps_position() {
        let mut lightbox = LightboxController::new();
        lightbox.open(group(5), 3).unwrap();

        let mut replacement = slides(4);
        replacement[3].title = "Renamed".into();
        assert!(lightbox.reconcile(replacement));
        assert_eq!(lightbox.position(), Some(3));
        assert_eq!(lightbox.total(), 4);
        assert_eq!(lightbox.current_slide().unwrap().title, "Renamed");
    }

    #[test]
    fn test_reconcile_while_closed_is_noop() {
        let mut lightbox = LightboxController::new();
        assert!(!lightbox.reconcile(slides(3)));
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_view_and_counter() {
        let mut lightbox = LightboxController::new();
        lightbox.open(group(10), 2).unwrap();
        let view = lightbox.view();
        assert!(view.is_open);
        assert_eq!(view.position, Some(2));
        assert_eq!(view.total, 10);
        assert_eq!(view.current_slide.map(|s| s.id), Some(3));
        assert_eq!(view.counter_label().as_deref(), Some("3 / 10"));
    }

    #[test]
    fn test_resolved_scenario() {
        let items = vec![
            GalleryItem::new(1, "One", "A", "/1.png"),
            GalleryItem::new(2, "Two", "A", "/2.png"),
            GalleryItem::new(3, "Three", "B", "/3.png"),
        ];
        let resolved = GalleryIndex::resolve_group(&items, &items[1]).unwrap();

        let mut lightbox = LightboxController::new();
        lightbox.open_resolved(resolved).unwrap();
        assert_eq!(lightbox.position(), Some(1));
        assert_eq!(lightbox.next(), Ok(0));
        assert_eq!(lightbox.next(), Ok(1));
    }
}
