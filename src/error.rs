use thiserror::Error;

/// Library error type for slides operations that callers may want to match on.
#[derive(Debug, Error)]
pub enum SlidesError {
    /// A configuration value was present but unusable.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    /// A `controls` entry named something other than play, pause, or arrows.
    #[error("unknown control: {0}")]
    UnknownControl(String),

    /// A text command could not be parsed.
    #[error("unrecognized command: {0}")]
    UnknownCommand(String),

    /// The widget task is gone; events can no longer be delivered.
    #[error("widget event channel closed")]
    ChannelClosed,
}
