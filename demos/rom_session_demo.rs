use chrono::{DateTime, Duration, Utc};
use romcam::{EngineConfig, Landmark, LandmarkFrame, LandmarkIndex, SessionManager, Side};
use tracing::{info, Level};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting ROM session demo");

    let manager = SessionManager::new(EngineConfig::default())?;
    let session = manager.create_session("knee_flexion")?;
    let session_id = session.lock().id();

    // Simulate three seconds of a squat: the knee sweeps from nearly
    // straight into deep flexion and back
    let start = Utc::now();
    for i in 0..90i64 {
        let progress = i as f64 / 89.0 * std::f64::consts::PI;
        let knee_angle = 170.0 - 90.0 * progress.sin();
        let frame = synthesize_frame(start + Duration::milliseconds(i * 33), knee_angle);

        let report = manager.process_frame(session_id, &frame)?;
        if i % 15 == 0 {
            if let Some(reading) = report.reading(Side::Left) {
                info!(
                    "frame {:2}: {:?} angle {:.1} phase {:?}",
                    report.sequence,
                    report.orientation.orientation,
                    reading.angle_filtered.unwrap_or(f64::NAN),
                    reading.movement_phase.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    let summary = manager.end_session(session_id)?;
    for channel in &summary.channels {
        info!(
            "{} {}: ROM {:.1} - {:.1} over {} samples",
            channel.side.as_str(),
            channel.exercise,
            channel.rom.min.unwrap_or(f64::NAN),
            channel.rom.max.unwrap_or(f64::NAN),
            channel.rom.sample_count,
        );
    }
    info!("Summary JSON: {}", summary.to_json()?);

    Ok(())
}

/// Build one frame of a symmetric frontal skeleton with both knees at the
/// given internal angle. Side labels are mirrored the way a selfie-view pose
/// estimator reports them; the engine corrects that on ingest.
fn synthesize_frame(timestamp: DateTime<Utc>, knee_angle: f64) -> LandmarkFrame {
    let radians = knee_angle.to_radians();
    let (dx, dy) = (0.15 * radians.sin(), -0.15 * radians.cos());

    LandmarkFrame::new(timestamp)
        .with(LandmarkIndex::Nose, Landmark::new(0.5, 0.2, 0.95))
        .with(LandmarkIndex::LeftShoulder, Landmark::new(0.6, 0.3, 0.9))
        .with(LandmarkIndex::RightShoulder, Landmark::new(0.4, 0.3, 0.9))
        .with(LandmarkIndex::LeftHip, Landmark::new(0.58, 0.5, 0.9))
        .with(LandmarkIndex::RightHip, Landmark::new(0.42, 0.5, 0.9))
        .with(LandmarkIndex::LeftKnee, Landmark::new(0.58, 0.65, 0.9))
        .with(LandmarkIndex::RightKnee, Landmark::new(0.42, 0.65, 0.9))
        .with(
            LandmarkIndex::LeftAnkle,
            Landmark::new(0.58 + dx, 0.65 + dy, 0.9),
        )
        .with(
            LandmarkIndex::RightAnkle,
            Landmark::new(0.42 - dx, 0.65 + dy, 0.9),
        )
}
