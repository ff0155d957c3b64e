use std::time::Instant;

use rand::{rngs::SmallRng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{ConfigError, Result, RevealError, SessionError},
    particles::{Canvas, FrameTime, ParticleField, Placement, Point},
    render::{Compositor, Frame},
    session::{
        clock::FrameClock,
        status::{AnimationStatus, StatusUpdate},
    },
    source::PointSource,
    styles::{StyleEntry, StyleRegistry},
    video::{open_sink, EncodeParams, ExportArtifact, OutputFormat, VideoSink},
};

/// What a preview or export trigger did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    /// A recording is running; the trigger had no effect
    Ignored,
}

/// What one frame tick did
#[derive(Debug)]
pub enum TickOutcome {
    /// A frame was drawn and the session goes on
    Continue,
    /// The preview drew its last frame
    Finished,
    /// The recording drew its last frame and produced an artifact
    Exported(ExportArtifact),
    /// No session is running
    Stopped,
}

enum Mode {
    Preview,
    Recording {
        format: OutputFormat,
        sink: Box<dyn VideoSink>,
    },
}

/// One preview or recording, from trigger to completion
struct Session {
    mode: Mode,
    /// Frozen at trigger time
    config: Config,
    entry: StyleEntry,
    compositor: Compositor,
    clock: FrameClock,
}

type StatusListener = Box<dyn FnMut(&StatusUpdate) + Send>;

/// Drives the reveal: owns the particle field, the surface and at most one
/// running session.
///
/// The engine does not schedule itself. A driver calls [`RevealEngine::tick`]
/// once per frame while a session is running; see [`crate::session::driver`].
pub struct RevealEngine {
    config: Config,
    registry: StyleRegistry,
    source: Option<Box<dyn PointSource + Send>>,
    /// Canvas size and stride `points` were sampled with
    sampled_with: Option<(u32, u32, u32)>,
    points: Vec<Point>,
    /// Source picture at canvas size, sampled with `points`
    backdrop: Option<Frame>,
    field: ParticleField,
    surface: Frame,
    placements: Vec<Placement>,
    rng: SmallRng,
    session: Option<Session>,
    status: AnimationStatus,
    listeners: Vec<StatusListener>,
}

impl RevealEngine {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let (width, height) = (config.render.width, config.render.height);

        Ok(Self {
            rng: make_rng(config.animation.seed),
            registry: StyleRegistry::new(),
            source: None,
            sampled_with: None,
            points: Vec::new(),
            backdrop: None,
            field: ParticleField::new(Canvas::new(width, height)),
            surface: Frame::new_black(width, height),
            placements: Vec::new(),
            session: None,
            status: AnimationStatus::Idle,
            listeners: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> AnimationStatus {
        self.status
    }

    /// The raster the reveal is drawn on
    pub fn surface(&self) -> &Frame {
        &self.surface
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_recording(&self) -> bool {
        matches!(
            self.session,
            Some(Session {
                mode: Mode::Recording { .. },
                ..
            })
        )
    }

    /// Subscribe to status transitions
    pub fn on_status<F>(&mut self, listener: F)
    where
        F: FnMut(&StatusUpdate) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the image. Any running session is cancelled.
    pub fn load_source<S>(&mut self, source: S) -> Result<()>
    where
        S: PointSource + Send + 'static,
    {
        self.cancel();
        self.source = Some(Box::new(source));
        self.sampled_with = None;

        if let Err(e) = self.rebuild() {
            self.source = None;
            self.points.clear();
            self.backdrop = None;
            return Err(self.fail(e));
        }

        info!("Loaded image: {} points", self.points.len());
        Ok(())
    }

    /// Replace the image with points sampled elsewhere
    pub fn load_points(&mut self, points: Vec<Point>) -> Result<()> {
        self.load_source(points)
    }

    /// Drop the image and blank the surface
    pub fn clear_image(&mut self) {
        self.cancel();
        self.source = None;
        self.sampled_with = None;
        self.points.clear();
        self.backdrop = None;
        self.field = ParticleField::new(self.field.canvas());
        self.surface.clear();
        debug!("Image cleared");
    }

    /// Replace the configuration
    ///
    /// While idle the field is rebuilt and redrawn right away. A running
    /// session keeps the snapshot it started with.
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        self.config = config;

        if self.session.is_some() {
            debug!("Configuration changed during a session; applies to the next one");
            return Ok(());
        }

        if self.status == AnimationStatus::Finished {
            self.set_status(AnimationStatus::Idle);
        }
        self.rebuild()
    }

    /// Start a wall-clock paced preview, restarting any preview in progress
    pub fn start_preview(&mut self) -> Result<TriggerOutcome> {
        if self.is_recording() {
            debug!("Recording in progress; preview trigger ignored");
            return Ok(TriggerOutcome::Ignored);
        }
        if !self.has_image() {
            return Err(self.fail(SessionError::NoImageLoaded.into()));
        }

        let clock = FrameClock::wall(self.config.animation.duration_ms());
        if let Err(e) = self.begin(Mode::Preview, clock) {
            return Err(self.fail(e));
        }

        info!(
            "Preview started: {} over {:.0} ms",
            self.config.animation.style,
            self.config.animation.duration_ms()
        );
        self.set_status(AnimationStatus::Playing);
        Ok(TriggerOutcome::Started)
    }

    /// Start recording an export in `format`. A preview in progress is
    /// replaced; a recording in progress makes this a no-op.
    pub fn start_export(&mut self, format: OutputFormat) -> Result<TriggerOutcome> {
        if let Err(e) = self.check_no_recording() {
            debug!("{}; export trigger ignored", e);
            return Ok(TriggerOutcome::Ignored);
        }
        if !self.has_image() {
            return Err(self.fail(SessionError::NoImageLoaded.into()));
        }

        self.session = None;
        let params = EncodeParams::from_config(&self.config);
        let sink = match open_sink(format, params) {
            Ok(sink) => sink,
            Err(e) => return Err(self.fail(e)),
        };

        let clock = FrameClock::fixed(params.fps, self.config.animation.duration_ms());
        if let Err(e) = self.begin(Mode::Recording { format, sink }, clock) {
            return Err(self.fail(e));
        }

        info!(
            "Recording {} as {} at {} fps",
            self.config.animation.style, format, params.fps
        );
        self.set_status(AnimationStatus::Recording);
        Ok(TriggerOutcome::Started)
    }

    /// Draw the next frame of the running session
    ///
    /// `now` paces previews; recordings ignore it and advance one fixed step.
    /// The frame that reaches progress 1 is the settled image, drawn exactly
    /// as [`RevealEngine::static_render`] would draw it.
    pub fn tick(&mut self, now: Instant) -> Result<TickOutcome> {
        let mut session = match self.session.take() {
            Some(session) => session,
            None => return Ok(TickOutcome::Stopped),
        };

        let frame = session.clock.tick(now);
        if frame.progress < 1.0 {
            self.draw(&session, frame);
            if let Err(e) = self.capture(&mut session, frame.time_ms) {
                return Err(self.abort_with(session, e));
            }
            self.session = Some(session);
            return Ok(TickOutcome::Continue);
        }

        self.settle(&session, frame);
        let end_ms = frame.time_ms.min(session.clock.duration_ms());
        let captures = match session.mode {
            // The settled frame, then one guaranteed keyframe of it
            Mode::Recording { .. } => 2,
            Mode::Preview => 0,
        };
        for _ in 0..captures {
            if let Err(e) = self.capture(&mut session, end_ms) {
                return Err(self.abort_with(session, e));
            }
        }

        let Session {
            mode, config, entry, ..
        } = session;

        if self.config != config {
            debug!("Applying the configuration changed during the session");
            if let Err(e) = self.rebuild() {
                warn!("Cannot apply the new configuration: {}", e);
            }
        }

        match mode {
            Mode::Preview => {
                info!("Preview finished");
                self.set_status(AnimationStatus::Finished);
                Ok(TickOutcome::Finished)
            }
            Mode::Recording { format, sink } => {
                let frames = sink.frames_written();
                match sink.finish() {
                    Ok(bytes) => {
                        let artifact = ExportArtifact::new(
                            &config.export.file_prefix,
                            entry.style,
                            format,
                            bytes,
                            frames,
                        );
                        info!(
                            "Export finished: {} ({} frames, {} bytes)",
                            artifact.file_name,
                            artifact.frame_count,
                            artifact.len()
                        );
                        self.set_status(AnimationStatus::Idle);
                        Ok(TickOutcome::Exported(artifact))
                    }
                    Err(e) => Err(self.fail(e)),
                }
            }
        }
    }

    /// Stop whatever is running and release encoder resources
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            if let Mode::Recording { sink, .. } = session.mode {
                sink.abort();
            }
            info!("Session cancelled");
            self.draw_static();
        }

        if self.status != AnimationStatus::Idle {
            self.set_status(AnimationStatus::Idle);
        }
    }

    /// Redraw every particle at rest, without perspective or trails
    ///
    /// Does nothing while a session is running.
    pub fn static_render(&mut self) {
        if self.session.is_some() {
            debug!("Static render skipped during a session");
            return;
        }
        self.draw_static();
    }

    fn check_no_recording(&self) -> Result<()> {
        if self.is_recording() {
            return Err(SessionError::ConcurrentSessionRejected.into());
        }
        Ok(())
    }

    fn entry(&self) -> Result<StyleEntry> {
        let style = self.config.animation.style;
        self.registry.get(style).copied().ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "animation.style".to_string(),
                value: style.name().to_string(),
            }
            .into()
        })
    }

    /// Resample the source if the canvas or stride changed, then rebuild the
    /// field from a fresh generator and redraw it at rest.
    fn rebuild(&mut self) -> Result<()> {
        let render = &self.config.render;
        let key = (render.width, render.height, render.density);

        if let Some(source) = &self.source {
            if self.sampled_with != Some(key) {
                self.points = source.sample(key.0, key.1, key.2)?;
                self.backdrop = source.backdrop(key.0, key.1)?;
                self.sampled_with = Some(key);
            }
        }

        if (self.surface.width(), self.surface.height()) != (key.0, key.1) {
            self.surface = Frame::new_black(key.0, key.1);
        }

        let entry = self.entry()?;
        self.rng = make_rng(self.config.animation.seed);
        self.field
            .reset(&self.points, &entry, &self.config.render, &mut self.rng);
        self.draw_static();
        Ok(())
    }

    fn begin(&mut self, mode: Mode, clock: FrameClock) -> Result<()> {
        self.rebuild()?;
        let config = self.config.clone();
        let entry = self.entry()?;
        let compositor =
            Compositor::new(&config.render, &entry)?.with_backdrop(self.backdrop.as_ref());

        self.surface.clear();
        self.session = Some(Session {
            mode,
            config,
            entry,
            compositor,
            clock,
        });
        Ok(())
    }

    fn draw(&mut self, session: &Session, frame: FrameTime) {
        self.field.advance(
            &session.entry,
            frame,
            &session.config.animation.tuning,
            &mut self.rng,
            &mut self.placements,
        );
        session
            .compositor
            .draw_frame(&mut self.surface, &self.placements, frame.progress);
    }

    /// Land every particle and draw the settled image
    fn settle(&mut self, session: &Session, frame: FrameTime) {
        self.field.advance(
            &session.entry,
            frame,
            &session.config.animation.tuning,
            &mut self.rng,
            &mut self.placements,
        );
        session
            .compositor
            .static_render(&mut self.surface, self.field.settled());
    }

    fn capture(&mut self, session: &mut Session, time_ms: f64) -> Result<()> {
        if let Mode::Recording { sink, .. } = &mut session.mode {
            sink.push_frame(&self.surface, time_ms)?;
        }
        Ok(())
    }

    fn draw_static(&mut self) {
        let compositor = match self.entry().and_then(|entry| {
            Compositor::new(&self.config.render, &entry)
                .map(|compositor| compositor.with_backdrop(self.backdrop.as_ref()))
        }) {
            Ok(compositor) => compositor,
            Err(e) => {
                warn!("Cannot draw static frame: {}", e);
                return;
            }
        };
        compositor.static_render(&mut self.surface, self.field.settled());
    }

    fn abort_with(&mut self, session: Session, error: RevealError) -> RevealError {
        if let Mode::Recording { sink, .. } = session.mode {
            sink.abort();
        }
        self.fail(error)
    }

    /// Report `error` on the status stream and fall back to idle
    fn fail(&mut self, error: RevealError) -> RevealError {
        warn!("Session failed: {}", error);
        self.session = None;
        self.publish(StatusUpdate::failed(error.user_message()));
        error
    }

    fn set_status(&mut self, status: AnimationStatus) {
        self.publish(StatusUpdate::new(status));
    }

    fn publish(&mut self, update: StatusUpdate) {
        debug!("Status: {} -> {}", self.status, update.status);
        self.status = update.status;
        for listener in &mut self.listeners {
            listener(&update);
        }
    }
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}
