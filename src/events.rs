use serde::Deserialize;

use crate::config::{Filter, SettingChange, TransitionEffect};

/// Whether the auto-advance cycle is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackState {
    #[default]
    #[serde(alias = "playing")]
    Play,
    #[serde(alias = "paused")]
    Pause,
}

/// Display elements the core addresses. Slides and bullets share ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    Slide(usize),
    Bullet(usize),
}

/// Discrete inputs accepted by the widget. Every event source (pointer,
/// keyboard, socket, programmatic) goes through these.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    BulletClicked(usize),
    PrevClicked,
    NextClicked,
    PlayClicked,
    PauseClicked,
    PlayPauseToggled,
    /// Typed configuration change with the previous value attached.
    SettingChanged(SettingChange),
    /// Raw key/value assignment; resolved against the widget's current configuration.
    SettingAssigned { key: String, value: String },
    /// Log a snapshot of the widget state.
    Status,
}

/// One firing of the auto-advance timer, tagged with the timer generation
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Opaque presentation commands. The core issues these; the host decides
/// what they look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationCommand {
    Configure {
        effect: TransitionEffect,
        filter: Filter,
    },
    /// Disable transition effects (used while the first slide is placed).
    SuspendTransitions,
    ResumeTransitions,
    /// Reflect the playback state back to the host.
    PlaybackChanged(PlaybackState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Play,
    Pause,
    Left,
    Right,
}

impl ControlKind {
    /// The event a click on this control produces.
    pub fn event(self) -> WidgetEvent {
        match self {
            ControlKind::Play => WidgetEvent::PlayClicked,
            ControlKind::Pause => WidgetEvent::PauseClicked,
            ControlKind::Left => WidgetEvent::PrevClicked,
            ControlKind::Right => WidgetEvent::NextClicked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlIcon {
    Svg(&'static str),
    /// A named unicode glyph.
    Unicode(String),
}

/// Everything the host's control constructor needs to build one button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSpec {
    pub kind: ControlKind,
    pub icon: ControlIcon,
    pub class_name: &'static str,
    /// Dictionary key for the accessible label; the host resolves the text.
    pub label_key: Option<&'static str>,
}
