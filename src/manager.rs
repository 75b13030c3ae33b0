use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{Result, RomcamError};
use crate::landmarks::LandmarkFrame;
use crate::report::{FrameReport, SessionSummary};
use crate::session::AnalysisSession;

/// Registry of concurrently running analysis sessions.
///
/// The manager validates configuration once, up front, so a bad exercise
/// catalog fails before any frame processing begins. Sessions share no
/// mutable state with each other; the registry lock only guards the map
/// itself and each session carries its own mutex, so two sessions can
/// process frames in parallel.
pub struct SessionManager {
    config: EngineConfig,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<AnalysisSession>>>>,
}

impl SessionManager {
    pub fn new(config: EngineConfig) -> Result<Self> {
        if let Err(e) = config.validate() {
            error!("Configuration rejected: {}", e);
            return Err(e.into());
        }
        info!(
            "Session manager ready ({} exercises configured)",
            config.exercises.len()
        );
        Ok(Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a new session for an exercise from the configured catalog
    pub fn create_session(&self, exercise_id: &str) -> Result<Arc<Mutex<AnalysisSession>>> {
        let session = AnalysisSession::new(&self.config, exercise_id)?;
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().insert(id, Arc::clone(&handle));
        debug!("Session {} registered", id);
        Ok(handle)
    }

    /// Look up a running session by id
    pub fn session(&self, id: Uuid) -> Result<Arc<Mutex<AnalysisSession>>> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| RomcamError::unknown_session(id))
    }

    /// Process one frame on a session addressed by id
    pub fn process_frame(&self, id: Uuid, frame: &LandmarkFrame) -> Result<FrameReport> {
        let session = self.session(id)?;
        let report = session.lock().process_frame(frame);
        Ok(report)
    }

    /// End a session, removing it from the registry and returning its final
    /// summary
    pub fn end_session(&self, id: Uuid) -> Result<SessionSummary> {
        let session = self
            .sessions
            .write()
            .remove(&id)
            .ok_or_else(|| RomcamError::unknown_session(id))?;
        let summary = session.lock().summary();
        info!(
            "Session {} ended after {} frames",
            id, summary.frames_processed
        );
        Ok(summary)
    }

    /// Remove sessions idle past the configured timeout and return their
    /// final summaries
    pub fn prune_stale(&self) -> Vec<SessionSummary> {
        self.prune_stale_at(Utc::now())
    }

    /// Staleness check against an explicit clock reading
    pub fn prune_stale_at(&self, now: DateTime<Utc>) -> Vec<SessionSummary> {
        let timeout = self.config.session.stale_timeout_seconds;
        let mut sessions = self.sessions.write();

        let stale: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, session)| session.lock().is_stale(now, timeout))
            .map(|(id, _)| *id)
            .collect();

        let mut summaries = Vec::with_capacity(stale.len());
        for id in stale {
            if let Some(session) = sessions.remove(&id) {
                warn!("Pruning stale session {} (idle > {}s)", id, timeout);
                summaries.push(session.lock().summary());
            }
        }
        summaries
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}
