use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::events::{ControlSpec, Element, PresentationCommand};
use crate::slides::ImageSet;

/// The host side of the widget: marker primitives on display elements plus
/// construction of bullets and controls. Only the marker primitives are
/// required.
///
/// Marker calls carry the slide handle `H` at the element's ordinal; a
/// bullet gets the handle of the slide it stands for.
pub trait Presenter<H> {
    fn mark_shown(&mut self, element: Element, slide: &H);

    fn unmark_shown(&mut self, element: Element, slide: &H);

    fn present(&mut self, _command: PresentationCommand) {}

    /// Called at most once per widget, with one bullet per slide.
    fn insert_bullets(&mut self, _count: usize) {}

    fn insert_control(&mut self, _spec: &ControlSpec) {}
}

/// Move the shown marker from `old` to `new`. Either side may be absent;
/// an ordinal with no slide behind it is skipped.
pub fn sync<H, P: Presenter<H> + ?Sized>(
    presenter: &mut P,
    images: &ImageSet<H>,
    old: Option<usize>,
    new: Option<usize>,
    bullets: bool,
) {
    if let Some((old, slide)) = old.and_then(|i| images.get(i).map(|slide| (i, slide))) {
        presenter.unmark_shown(Element::Slide(old), slide);
        if bullets {
            presenter.unmark_shown(Element::Bullet(old), slide);
        }
    }
    if let Some((new, slide)) = new.and_then(|i| images.get(i).map(|slide| (i, slide))) {
        presenter.mark_shown(Element::Slide(new), slide);
        if bullets {
            presenter.mark_shown(Element::Bullet(new), slide);
        }
    }
}

/// In-memory presenter that records markers and commands, logging each one.
#[derive(Debug, Default, Clone)]
pub struct MarkerBoard {
    shown: BTreeSet<Element>,
    commands: Vec<PresentationCommand>,
    controls: Vec<ControlSpec>,
    bullet_count: Option<usize>,
    bullet_inserts: usize,
}

impl MarkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown_slides(&self) -> Vec<usize> {
        self.shown
            .iter()
            .filter_map(|el| match el {
                Element::Slide(i) => Some(*i),
                Element::Bullet(_) => None,
            })
            .collect()
    }

    pub fn current_bullets(&self) -> Vec<usize> {
        self.shown
            .iter()
            .filter_map(|el| match el {
                Element::Bullet(i) => Some(*i),
                Element::Slide(_) => None,
            })
            .collect()
    }

    pub fn is_shown(&self, element: Element) -> bool {
        self.shown.contains(&element)
    }

    pub fn commands(&self) -> &[PresentationCommand] {
        &self.commands
    }

    pub fn controls(&self) -> &[ControlSpec] {
        &self.controls
    }

    pub fn bullet_count(&self) -> Option<usize> {
        self.bullet_count
    }

    /// How many times bullets were requested; anything above one is a bug.
    pub fn bullet_inserts(&self) -> usize {
        self.bullet_inserts
    }
}

impl<H: fmt::Debug> Presenter<H> for MarkerBoard {
    fn mark_shown(&mut self, element: Element, slide: &H) {
        debug!(?element, ?slide, "mark shown");
        self.shown.insert(element);
    }

    fn unmark_shown(&mut self, element: Element, slide: &H) {
        debug!(?element, ?slide, "unmark shown");
        self.shown.remove(&element);
    }

    fn present(&mut self, command: PresentationCommand) {
        debug!(?command, "presentation command");
        self.commands.push(command);
    }

    fn insert_bullets(&mut self, count: usize) {
        debug!(count, "insert bullets");
        self.bullet_count = Some(count);
        self.bullet_inserts += 1;
    }

    fn insert_control(&mut self, spec: &ControlSpec) {
        debug!(kind = ?spec.kind, class = spec.class_name, "insert control");
        self.controls.push(spec.clone());
    }
}
