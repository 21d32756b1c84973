//! Error observer double that keeps every event it receives.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::notify::{ErrorEvent, ErrorObserver, NotifyError};

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ErrorEvent>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn events(&self) -> Vec<ErrorEvent> {
        self.events.lock().expect("observer mutex poisoned").clone()
    }

    /// Blocks until at least `count` events arrived or two seconds passed.
    #[must_use]
    pub fn wait_for(&self, count: usize) -> Vec<ErrorEvent> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let events = self.events();
            if events.len() >= count || Instant::now() >= deadline {
                return events;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

#[async_trait]
impl ErrorObserver for RecordingObserver {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, event: &ErrorEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("observer mutex poisoned")
            .push(event.clone());
        Ok(())
    }
}
