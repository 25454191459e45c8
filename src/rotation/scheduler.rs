//! Background rotation checks
//!
//! Runs [`RotationManager::schedule_rotation_check`] on a dedicated thread at
//! a fixed cadence. The first check runs immediately. Most checks are no-ops
//! because the cadence is far shorter than the rotation interval.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::manager::RotationManager;
use crate::error::{error_codes, SecretError, SecretResult};
use crate::store::SecretStore;

/// Handle to a running background checker; stops the thread when dropped
#[derive(Debug)]
pub struct RotationScheduler {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RotationScheduler {
    /// Start checking every `every`.
    ///
    /// # Errors
    ///
    /// `Configuration` for a zero cadence, `Scheduler` if the thread cannot
    /// be spawned.
    pub fn spawn<S>(manager: Arc<RotationManager<S>>, every: Duration) -> SecretResult<Self>
    where
        S: SecretStore + 'static,
    {
        if every.is_zero() {
            return Err(SecretError::configuration(
                "check_interval",
                "must be greater than zero",
                error_codes::INVALID_CHECK_INTERVAL,
            ));
        }

        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("bleo-secret-rotation".to_string())
            .spawn(move || loop {
                let result = manager.schedule_rotation_check();
                if result.rotated {
                    log::info!(
                        "Scheduled JWT secret rotation completed (count {:?})",
                        result.rotation_count
                    );
                } else if !result.success {
                    log::warn!("Scheduled JWT secret rotation check failed: {}", result.message);
                }

                match stopped.recv_timeout(every) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| SecretError::Scheduler {
                cause: e.to_string(),
                error_code: error_codes::SCHEDULER_SPAWN_FAILED,
            })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the checker and wait for the in-flight check to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("JWT secret rotation scheduler thread panicked");
            }
        }
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
