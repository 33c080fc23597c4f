pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod slides;
pub mod timer;
pub mod visual;
pub mod widget;

pub use error::SlidesError;
pub use widget::{Slideshow, WidgetHandle};
