use crate::error::PlayerError;
use tracing::debug;

pub trait FullscreenAdapter: Send {
    fn is_active(&self) -> bool;
    fn enter(&mut self) -> Result<(), PlayerError>;
    fn exit(&mut self) -> Result<(), PlayerError>;
    /// The platform reported a change (user pressed Esc, OS gesture, ...).
    fn set_active(&mut self, active: bool);
}

/// One platform entry point, e.g. `requestFullscreen` on the container.
pub trait FullscreenCall: Send {
    fn name(&self) -> &str;
    fn is_supported(&self) -> bool;
    fn invoke(&mut self) -> Result<(), String>;
}

/// Tries entry points in order and stops at the first that succeeds.
///
/// Browsers want, for entering: container `requestFullscreen`, container
/// `webkitRequestFullscreen`, container `webkitEnterFullscreen`, video
/// `webkitEnterFullscreen`, container `mozRequestFullScreen`, container
/// `msRequestFullscreen`; for exiting the document equivalents in the same
/// vendor order.
pub struct FullscreenChain {
    enter: Vec<Box<dyn FullscreenCall>>,
    exit: Vec<Box<dyn FullscreenCall>>,
    active: bool,
}

impl FullscreenChain {
    pub fn new(enter: Vec<Box<dyn FullscreenCall>>, exit: Vec<Box<dyn FullscreenCall>>) -> Self {
        Self {
            enter,
            exit,
            active: false,
        }
    }

    /// No entry points at all; every toggle reports unavailable.
    pub fn unsupported() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    fn run(calls: &mut [Box<dyn FullscreenCall>], operation: &str) -> Result<(), PlayerError> {
        let mut failures = Vec::new();
        for call in calls.iter_mut() {
            if !call.is_supported() {
                continue;
            }
            match call.invoke() {
                Ok(()) => {
                    debug!(operation, entry_point = call.name(), "Fullscreen call succeeded");
                    return Ok(());
                }
                Err(e) => {
                    debug!(operation, entry_point = call.name(), error = %e, "Fullscreen call failed");
                    failures.push(format!("{}: {}", call.name(), e));
                }
            }
        }

        if failures.is_empty() {
            Err(PlayerError::Fullscreen(format!("no entry point to {}", operation)))
        } else {
            Err(PlayerError::Fullscreen(failures.join("; ")))
        }
    }
}

impl FullscreenAdapter for FullscreenChain {
    fn is_active(&self) -> bool {
        self.active
    }

    fn enter(&mut self) -> Result<(), PlayerError> {
        Self::run(&mut self.enter, "enter")?;
        self.active = true;
        Ok(())
    }

    fn exit(&mut self) -> Result<(), PlayerError> {
        Self::run(&mut self.exit, "exit")?;
        self.active = false;
        Ok(())
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
