use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use tracing::warn;

use crate::error::SlidesError;
use crate::events::{ControlIcon, ControlKind, ControlSpec, PlaybackState};

pub const DEFAULT_ARROW_GLYPH: &str = "singleLeftPointingAngleQuotationMark";

/// Keys understood at the top level of the configuration, aliases included.
const KNOWN_KEYS: &[&str] = &[
    "transition-interval",
    "bullets",
    "controls",
    "playback-state",
    "arrow-glyph",
    "arrow-direction-glyph",
    "arrows",
    "transition-effect",
    "filter",
    "startup-delay",
    "slides",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionEffect {
    Flash,
    Grey,
    Blend,
    #[default]
    Slide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    #[default]
    None,
    Sepia,
    Grey,
    Shadow,
}

/// Which interactive controls get constructed.
///
/// Accepts `true`/`false`, a list such as `[play, arrows]`, or a string of
/// words separated by commas or whitespace. `true` means play and pause;
/// arrows must be asked for by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "ControlsRepr")]
pub struct ControlsConfig {
    pub play: bool,
    pub pause: bool,
    pub arrows: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ControlsRepr {
    Flag(bool),
    Words(String),
    List(Vec<String>),
}

impl TryFrom<ControlsRepr> for ControlsConfig {
    type Error = SlidesError;

    fn try_from(repr: ControlsRepr) -> Result<Self, Self::Error> {
        match repr {
            ControlsRepr::Flag(true) => Ok(Self::play_pause()),
            ControlsRepr::Flag(false) => Ok(Self::default()),
            ControlsRepr::Words(words) => words.parse(),
            ControlsRepr::List(words) => Self::from_words(words.iter().map(String::as_str)),
        }
    }
}

impl FromStr for ControlsConfig {
    type Err = SlidesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_words(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|word| !word.is_empty()),
        )
    }
}

impl ControlsConfig {
    fn play_pause() -> Self {
        Self {
            play: true,
            pause: true,
            arrows: false,
        }
    }

    fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Result<Self, SlidesError> {
        let mut controls = Self::default();
        for word in words {
            match word.trim().to_ascii_lowercase().as_str() {
                "true" => {
                    controls.play = true;
                    controls.pause = true;
                }
                "false" | "none" => {}
                "play" => controls.play = true,
                "pause" => controls.pause = true,
                "arrows" => controls.arrows = true,
                other => return Err(SlidesError::UnknownControl(other.to_string())),
            }
        }
        Ok(controls)
    }

    pub fn any(&self) -> bool {
        self.play || self.pause || self.arrows
    }
}

/// Typed widget configuration. Defaults mirror a bare widget with no
/// attributes set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SlidesConfig {
    /// Auto-advance period in seconds.
    pub transition_interval: f64,
    /// Create one bullet per slide at connect.
    pub bullets: bool,
    pub controls: ControlsConfig,
    /// Initial playback state.
    pub playback_state: PlaybackState,
    /// Glyph name for the arrow controls; the opposite direction is derived.
    #[serde(alias = "arrow-direction-glyph", alias = "arrows")]
    pub arrow_glyph: String,
    pub transition_effect: TransitionEffect,
    pub filter: Filter,
    /// Seconds to hold the first slide before the auto-advance interval starts.
    pub startup_delay: f64,
    /// Slide handles, used when the host is the command-line driver.
    pub slides: Vec<String>,
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            transition_interval: 4.0,
            bullets: false,
            controls: ControlsConfig::default(),
            playback_state: PlaybackState::Play,
            arrow_glyph: DEFAULT_ARROW_GLYPH.to_string(),
            transition_effect: TransitionEffect::default(),
            filter: Filter::default(),
            startup_delay: 3.0,
            slides: Vec::new(),
        }
    }
}

impl SlidesConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&s)
    }

    /// Parse YAML, warning about (and ignoring) unrecognized keys.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let (cfg, unknown) = Self::parse_with_diagnostics(s)?;
        for key in unknown {
            warn!(key = %key, "unknown configuration key ignored");
        }
        Ok(cfg)
    }

    /// Parse YAML and return the unrecognized top-level keys alongside.
    pub fn parse_with_diagnostics(s: &str) -> Result<(Self, Vec<String>)> {
        let value: YamlValue = serde_yaml::from_str(s)?;
        let value = match value {
            YamlValue::Null => YamlValue::Mapping(Default::default()),
            other => other,
        };
        let unknown = match &value {
            YamlValue::Mapping(map) => map
                .keys()
                .filter_map(|key| match key.as_str() {
                    Some(k) if KNOWN_KEYS.contains(&k) => None,
                    Some(k) => Some(k.to_string()),
                    None => Some(format!("{key:?}")),
                })
                .collect(),
            _ => Vec::new(),
        };
        let cfg = serde_yaml::from_value(value)?;
        Ok((cfg, unknown))
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        interval_from_secs(self.transition_interval)?;
        ensure!(
            self.startup_delay.is_finite() && self.startup_delay >= 0.0,
            "startup-delay must be a non-negative number of seconds"
        );
        ensure!(
            !self.arrow_glyph.trim().is_empty(),
            "arrow-glyph must not be empty"
        );
        Ok(self)
    }

    /// Auto-advance period. Falls back to the default for values that
    /// never passed validation.
    pub fn transition_period(&self) -> Duration {
        interval_from_secs(self.transition_interval)
            .unwrap_or_else(|_| Duration::from_millis(4_000))
    }

    pub fn startup_delay(&self) -> Duration {
        if self.startup_delay.is_finite() && self.startup_delay > 0.0 {
            Duration::from_millis((self.startup_delay * 1000.0).round() as u64)
        } else {
            Duration::ZERO
        }
    }

    /// Left and right glyph names derived from the configured one.
    pub fn arrow_glyphs(&self) -> (String, String) {
        let left = self
            .arrow_glyph
            .replace("Right", "Left")
            .replace("right", "left");
        let right = self
            .arrow_glyph
            .replace("Left", "Right")
            .replace("left", "right");
        (left, right)
    }

    /// Controls to construct, in the order they are appended to the host.
    pub fn control_specs(&self) -> Vec<ControlSpec> {
        let mut specs = Vec::new();
        if self.controls.play {
            specs.push(ControlSpec {
                kind: ControlKind::Play,
                icon: ControlIcon::Svg("play"),
                class_name: "play",
                label_key: None,
            });
        }
        if self.controls.pause {
            specs.push(ControlSpec {
                kind: ControlKind::Pause,
                icon: ControlIcon::Svg("pause"),
                class_name: "pause",
                label_key: None,
            });
        }
        if self.controls.arrows {
            let (left, right) = self.arrow_glyphs();
            specs.push(ControlSpec {
                kind: ControlKind::Left,
                icon: ControlIcon::Unicode(left),
                class_name: "left arrows",
                label_key: Some("left"),
            });
            specs.push(ControlSpec {
                kind: ControlKind::Right,
                icon: ControlIcon::Unicode(right),
                class_name: "right arrows",
                label_key: Some("right"),
            });
        }
        specs
    }

    /// Turn a raw key/value assignment into a typed change, using the
    /// current value as the previous one.
    pub fn setting_change(&self, key: &str, value: &str) -> Result<SettingChange, SlidesError> {
        match key {
            "transition-interval" => {
                let new = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|err| SlidesError::InvalidValue {
                        key: "transition-interval",
                        reason: err.to_string(),
                    })?;
                Ok(SettingChange::TransitionInterval {
                    old: Some(self.transition_interval),
                    new,
                })
            }
            other if KNOWN_KEYS.contains(&other) => Ok(SettingChange::ConnectOnly {
                key: other.to_string(),
            }),
            other => Ok(SettingChange::Unrecognized {
                key: other.to_string(),
            }),
        }
    }
}

/// Change notification for settings observed after connect.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    /// `old` is `None` when the value is being set for the first time.
    TransitionInterval { old: Option<f64>, new: f64 },
    /// A known key that only takes effect at connect.
    ConnectOnly { key: String },
    Unrecognized { key: String },
}

impl fmt::Display for SettingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingChange::TransitionInterval { old: Some(old), new } => {
                write!(f, "transition-interval {old}s -> {new}s")
            }
            SettingChange::TransitionInterval { old: None, new } => {
                write!(f, "transition-interval (unset) -> {new}s")
            }
            SettingChange::ConnectOnly { key } => write!(f, "{key} (read at connect only)"),
            SettingChange::Unrecognized { key } => write!(f, "{key} (unrecognized)"),
        }
    }
}

/// Seconds to a whole-millisecond period; rejects anything below 1ms.
pub fn interval_from_secs(secs: f64) -> Result<Duration, SlidesError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(SlidesError::InvalidValue {
            key: "transition-interval",
            reason: format!("{secs} is not a positive number of seconds"),
        });
    }
    let millis = (secs * 1000.0).round();
    if millis < 1.0 || millis > u64::MAX as f64 {
        return Err(SlidesError::InvalidValue {
            key: "transition-interval",
            reason: format!("{secs}s is outside the supported range"),
        });
    }
    Ok(Duration::from_millis(millis as u64))
}
