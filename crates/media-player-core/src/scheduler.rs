use crate::player::PlayerInput;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    ProgressTick,
    /// Carries the generation of the pointer activity that armed it.
    HideControls(u64),
    /// An episode switch got no ready or error signal in time.
    SwitchStalled(u64),
}

/// Cancels the scheduled work on `cancel()` or when dropped.
pub struct TaskHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TaskHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

pub trait Timers: Send {
    fn once(&self, delay: Duration, event: TimerEvent) -> TaskHandle;
    fn repeating(&self, period: Duration, event: TimerEvent) -> TaskHandle;
}

/// Posts timer events into the player's input queue.
///
/// Must be used from inside a tokio runtime.
#[derive(Clone)]
pub struct TokioTimers {
    sender: UnboundedSender<PlayerInput>,
}

impl TokioTimers {
    pub fn new(sender: UnboundedSender<PlayerInput>) -> Self {
        Self { sender }
    }
}

impl Timers for TokioTimers {
    fn once(&self, delay: Duration, event: TimerEvent) -> TaskHandle {
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(PlayerInput::Timer(event));
        });
        TaskHandle::new(move || task.abort())
    }

    fn repeating(&self, period: Duration, event: TimerEvent) -> TaskHandle {
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if sender.send(PlayerInput::Timer(event)).is_err() {
                    break;
                }
            }
        });
        TaskHandle::new(move || task.abort())
    }
}
