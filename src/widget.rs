//! The slideshow widget: connect-time setup, the interaction adapter that
//! turns events into index/timer calls, and the task loop that serializes
//! them.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::{SettingChange, SlidesConfig, interval_from_secs};
use crate::error::SlidesError;
use crate::events::{PlaybackState, PresentationCommand, Tick, WidgetEvent};
use crate::slides::{Direction, ImageSet, IndexChange, IndexState};
use crate::timer::AutoAdvanceTimer;
use crate::visual::{self, Presenter};

pub struct Slideshow<H, P> {
    images: ImageSet<H>,
    index: IndexState,
    timer: AutoAdvanceTimer,
    presenter: P,
    config: SlidesConfig,
    period: Duration,
    playback: PlaybackState,
    bullets: bool,
    transitions_suspended: bool,
}

impl<H, P: Presenter<H>> Slideshow<H, P> {
    /// Snapshot the slides, build bullets and controls, place the first
    /// slide, and arm the auto-advance timer when there is something to
    /// advance through.
    ///
    /// Must run inside a tokio runtime when the timer may be started.
    pub fn connect(
        config: SlidesConfig,
        images: impl IntoIterator<Item = H>,
        presenter: P,
        ticks: Sender<Tick>,
    ) -> Result<Self> {
        let config = config.validated()?;
        let images: ImageSet<H> = images.into_iter().collect();
        let index = IndexState::new(images.len());
        let mut slideshow = Self {
            period: config.transition_period(),
            playback: config.playback_state,
            images,
            index,
            timer: AutoAdvanceTimer::new(ticks),
            presenter,
            config,
            bullets: false,
            transitions_suspended: false,
        };
        slideshow.initialize();
        Ok(slideshow)
    }

    fn initialize(&mut self) {
        let len = self.images.len();
        self.presenter.present(PresentationCommand::Configure {
            effect: self.config.transition_effect,
            filter: self.config.filter,
        });

        if self.config.bullets && !self.bullets {
            self.presenter.insert_bullets(len);
            self.bullets = true;
        }
        for spec in self.config.control_specs() {
            self.presenter.insert_control(&spec);
        }
        self.presenter
            .present(PresentationCommand::PlaybackChanged(self.playback));

        if len == 0 {
            error!("no slides to show; widget stays inert");
            return;
        }

        self.presenter.present(PresentationCommand::SuspendTransitions);
        self.transitions_suspended = true;
        if let Some(change) = self.index.initial_change() {
            self.apply(change);
        }

        if len > 1 && self.playback == PlaybackState::Play {
            let delay = self.config.startup_delay();
            self.timer.start_after(delay, self.period);
            info!(
                slides = len,
                period_ms = self.period.as_millis() as u64,
                delay_ms = delay.as_millis() as u64,
                "slideshow connected; auto-advance armed"
            );
        } else {
            self.resume_transitions();
            info!(slides = len, playback = ?self.playback, "slideshow connected");
        }
    }

    /// Interaction adapter entry point.
    pub fn handle(&mut self, event: WidgetEvent) {
        trace!(?event, "widget event");
        match event {
            WidgetEvent::BulletClicked(i) => self.on_bullet_click(i),
            WidgetEvent::PrevClicked => self.on_prev(),
            WidgetEvent::NextClicked => self.on_next(),
            WidgetEvent::PlayClicked => self.on_play(),
            WidgetEvent::PauseClicked => self.on_pause(),
            WidgetEvent::PlayPauseToggled => self.on_toggle(),
            WidgetEvent::SettingChanged(change) => self.on_setting_changed(change),
            WidgetEvent::SettingAssigned { key, value } => {
                match self.config.setting_change(&key, &value) {
                    Ok(change) => self.on_setting_changed(change),
                    Err(err) => warn!(%key, %value, "setting rejected: {err}"),
                }
            }
            WidgetEvent::Status => self.log_status(),
        }
    }

    pub fn on_bullet_click(&mut self, bullet: usize) {
        self.set_index(isize::try_from(bullet).ok());
    }

    pub fn on_prev(&mut self) {
        self.set_index(self.index.offset(-1));
    }

    pub fn on_next(&mut self) {
        self.set_index(self.index.offset(1));
    }

    pub fn on_play(&mut self) {
        self.set_playback(PlaybackState::Play);
        if self.images.is_empty() {
            debug!("play ignored; no slides");
            return;
        }
        if self.timer.ensure_running(self.period) {
            info!(period_ms = self.period.as_millis() as u64, "auto-advance resumed");
        } else {
            debug!("play ignored; auto-advance already running");
        }
    }

    pub fn on_pause(&mut self) {
        self.set_playback(PlaybackState::Pause);
        if self.timer.stop() {
            info!("auto-advance paused");
        }
        self.resume_transitions();
    }

    pub fn on_toggle(&mut self) {
        match self.playback {
            PlaybackState::Play => self.on_pause(),
            PlaybackState::Pause => self.on_play(),
        }
    }

    pub fn on_setting_changed(&mut self, change: SettingChange) {
        match change {
            SettingChange::TransitionInterval { old: None, new } => {
                debug!(new, "initial transition-interval observation ignored");
            }
            SettingChange::TransitionInterval { old: Some(old), new } if old == new => {
                trace!(new, "transition-interval unchanged");
            }
            SettingChange::TransitionInterval { old: Some(old), new } => {
                let period = match interval_from_secs(new) {
                    Ok(period) => period,
                    Err(err) => {
                        warn!(old, new, "transition-interval change rejected: {err}");
                        return;
                    }
                };
                self.config.transition_interval = new;
                self.period = period;
                if self.timer.is_running() {
                    self.timer.reschedule(period);
                    info!(
                        old,
                        new,
                        period_ms = period.as_millis() as u64,
                        "auto-advance rescheduled"
                    );
                } else {
                    debug!(old, new, "transition-interval updated while stopped");
                }
            }
            SettingChange::ConnectOnly { key } => {
                warn!(%key, "setting is read at connect only; change ignored");
            }
            SettingChange::Unrecognized { key } => {
                warn!(%key, "unknown setting changed; ignored");
            }
        }
    }

    /// Timer callback. Ticks from a replaced or stopped timer are dropped.
    pub fn on_tick(&mut self, tick: Tick) {
        if !self.timer.accepts(tick) {
            trace!(
                tick = tick.generation,
                current = self.timer.generation(),
                "stale tick dropped"
            );
            return;
        }
        self.resume_transitions();
        if let Some(change) = self.index.advance() {
            self.apply(change);
        }
    }

    /// Stop the timer; the widget keeps its visual state.
    pub fn shutdown(&mut self) {
        self.timer.stop();
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index.current()
    }

    pub fn direction(&self) -> Direction {
        self.index.direction()
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Period used by the next timer start (or the running one).
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn timer(&self) -> &AutoAdvanceTimer {
        &self.timer
    }

    pub fn config(&self) -> &SlidesConfig {
        &self.config
    }

    pub fn has_bullets(&self) -> bool {
        self.bullets
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    fn set_index(&mut self, requested: Option<isize>) {
        if let Some(change) = self.index.set_index(requested) {
            self.apply(change);
        }
    }

    fn apply(&mut self, change: IndexChange) {
        debug!(old = ?change.old, new = change.new, "slide shown");
        visual::sync(
            &mut self.presenter,
            &self.images,
            change.old,
            Some(change.new),
            self.bullets,
        );
    }

    fn set_playback(&mut self, state: PlaybackState) {
        if self.playback != state {
            debug!(from = ?self.playback, to = ?state, "playback state changed");
        }
        self.playback = state;
        self.presenter
            .present(PresentationCommand::PlaybackChanged(state));
    }

    fn resume_transitions(&mut self) {
        if self.transitions_suspended {
            self.transitions_suspended = false;
            self.presenter.present(PresentationCommand::ResumeTransitions);
        }
    }

    fn log_status(&self) {
        info!(
            index = ?self.index.current(),
            slides = self.images.len(),
            direction = ?self.index.direction(),
            playback = ?self.playback,
            timer_running = self.timer.is_running(),
            period_ms = self.period.as_millis() as u64,
            "slideshow status"
        );
    }
}

impl<H, P> std::fmt::Debug for Slideshow<H, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slideshow")
            .field("slides", &self.images.len())
            .field("index", &self.index.current())
            .field("direction", &self.index.direction())
            .field("playback", &self.playback)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

/// Cloneable sender with one method per interaction.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    events: Sender<WidgetEvent>,
}

impl WidgetHandle {
    pub fn new(events: Sender<WidgetEvent>) -> Self {
        Self { events }
    }

    pub async fn send(&self, event: WidgetEvent) -> Result<(), SlidesError> {
        self.events
            .send(event)
            .await
            .map_err(|_| SlidesError::ChannelClosed)
    }

    pub async fn bullet_clicked(&self, bullet: usize) -> Result<(), SlidesError> {
        self.send(WidgetEvent::BulletClicked(bullet)).await
    }

    pub async fn prev(&self) -> Result<(), SlidesError> {
        self.send(WidgetEvent::PrevClicked).await
    }

    pub async fn next(&self) -> Result<(), SlidesError> {
        self.send(WidgetEvent::NextClicked).await
    }

    pub async fn play(&self) -> Result<(), SlidesError> {
        self.send(WidgetEvent::PlayClicked).await
    }

    pub async fn pause(&self) -> Result<(), SlidesError> {
        self.send(WidgetEvent::PauseClicked).await
    }

    pub async fn toggle(&self) -> Result<(), SlidesError> {
        self.send(WidgetEvent::PlayPauseToggled).await
    }

    pub async fn change_setting(&self, change: SettingChange) -> Result<(), SlidesError> {
        self.send(WidgetEvent::SettingChanged(change)).await
    }
}

/// Drive the widget until cancelled or until every event sender is gone.
///
/// Events and ticks are handled one at a time, each to completion. The
/// timer is stopped on exit and the widget handed back.
pub async fn run<H, P: Presenter<H>>(
    mut slideshow: Slideshow<H, P>,
    mut events: Receiver<WidgetEvent>,
    mut ticks: Receiver<Tick>,
    cancel: CancellationToken,
) -> Slideshow<H, P> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            maybe_event = events.recv() => match maybe_event {
                Some(event) => slideshow.handle(event),
                None => {
                    debug!("widget event channel closed");
                    break;
                }
            },

            Some(tick) = ticks.recv() => slideshow.on_tick(tick),
        }
    }
    slideshow.shutdown();
    slideshow
}
