//! Async frame loops around [`RevealEngine`].
//!
//! Previews are paced by a tokio interval; recordings run as fast as frames
//! can be encoded and only yield between ticks. Both stop early when the
//! cancel flag flips to `true` or its sender is dropped.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::{
    error::Result,
    render::Frame,
    session::engine::{RevealEngine, TickOutcome, TriggerOutcome},
    video::{ExportArtifact, OutputFormat},
};

/// How a driven session ended
#[derive(Debug)]
pub enum DriveOutcome {
    Finished,
    Exported(ExportArtifact),
    Cancelled,
    /// The trigger was ignored because a recording was already running
    Ignored,
}

/// Play a preview at `fps`, handing every drawn frame to `on_frame`
pub async fn run_preview<F>(
    engine: &mut RevealEngine,
    fps: u32,
    mut cancel: watch::Receiver<bool>,
    mut on_frame: F,
) -> Result<DriveOutcome>
where
    F: FnMut(&Frame),
{
    if engine.start_preview()? == TriggerOutcome::Ignored {
        return Ok(DriveOutcome::Ignored);
    }

    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps.max(1) as f64));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let due = tokio::select! {
            _ = interval.tick() => true,
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    engine.cancel();
                    return Ok(DriveOutcome::Cancelled);
                }
                false
            }
        };
        if !due {
            continue;
        }

        match engine.tick(Instant::now())? {
            TickOutcome::Continue => on_frame(engine.surface()),
            TickOutcome::Finished => {
                on_frame(engine.surface());
                return Ok(DriveOutcome::Finished);
            }
            TickOutcome::Exported(artifact) => return Ok(DriveOutcome::Exported(artifact)),
            TickOutcome::Stopped => return Ok(DriveOutcome::Cancelled),
        }
    }
}

/// Record an export in `format` and return the artifact
pub async fn run_export(
    engine: &mut RevealEngine,
    format: OutputFormat,
    cancel: watch::Receiver<bool>,
) -> Result<DriveOutcome> {
    if engine.start_export(format)? == TriggerOutcome::Ignored {
        return Ok(DriveOutcome::Ignored);
    }

    let mut frames = 0usize;
    loop {
        if cancel_requested(&cancel) {
            engine.cancel();
            info!("Export cancelled after {} frames", frames);
            return Ok(DriveOutcome::Cancelled);
        }

        match engine.tick(Instant::now())? {
            TickOutcome::Continue => {
                frames += 1;
                tokio::task::yield_now().await;
            }
            TickOutcome::Exported(artifact) => {
                debug!("Export loop done after {} ticks", frames + 1);
                return Ok(DriveOutcome::Exported(artifact));
            }
            TickOutcome::Finished => return Ok(DriveOutcome::Finished),
            TickOutcome::Stopped => return Ok(DriveOutcome::Cancelled),
        }
    }
}

fn cancel_requested(cancel: &watch::Receiver<bool>) -> bool {
    // A dropped sender means the owner is gone
    *cancel.borrow() || cancel.has_changed().is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        particles::Point,
        session::AnimationStatus,
        styles::MotionStyle,
    };

    fn engine(style: MotionStyle, speed: f64) -> RevealEngine {
        let mut config = Config::default();
        config.animation.style = style;
        config.animation.speed = speed;
        config.animation.seed = Some(5);
        config.render.width = 24;
        config.render.height = 24;
        let mut engine = RevealEngine::new(config).unwrap();
        let points = (0..24)
            .step_by(4)
            .flat_map(|y| (0..24).step_by(4).map(move |x| Point::new(x as f32, y as f32)))
            .collect();
        engine.load_points(points).unwrap();
        engine
    }

    #[tokio::test]
    async fn test_preview_runs_to_completion() {
        // 2500 ms / 25
        let mut engine = engine(MotionStyle::Elastic, 25.0);
        let (_tx, rx) = watch::channel(false);
        let mut frames = 0;

        let outcome = run_preview(&mut engine, 240, rx, |_| frames += 1).await.unwrap();
        assert!(matches!(outcome, DriveOutcome::Finished));
        assert!(frames > 1);
        assert_eq!(engine.status(), AnimationStatus::Finished);
    }

    #[tokio::test]
    async fn test_export_produces_artifact() {
        let mut engine = engine(MotionStyle::Galactic, 5.0);
        let (_tx, rx) = watch::channel(false);

        match run_export(&mut engine, OutputFormat::Gif, rx).await.unwrap() {
            DriveOutcome::Exported(artifact) => {
                assert_eq!(artifact.file_name, "qr-magic-galactic.gif");
                // 500 ms at 60 fps: frames 0..=30 plus the closing keyframe
                assert_eq!(artifact.frame_count, 32);
            }
            other => panic!("expected an artifact, got {:?}", other),
        }
        assert_eq!(engine.status(), AnimationStatus::Idle);
    }

    #[tokio::test]
    async fn test_cancelled_export_leaves_idle() {
        let mut engine = engine(MotionStyle::Liquid, 1.0);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let outcome = run_export(&mut engine, OutputFormat::Gif, rx).await.unwrap();
        assert!(matches!(outcome, DriveOutcome::Cancelled));
        assert_eq!(engine.status(), AnimationStatus::Idle);
        assert!(!engine.is_recording());
    }
}
