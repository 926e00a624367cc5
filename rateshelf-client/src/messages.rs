//! Transient user-facing messages
//!
//! Each container carries one success slot and one error slot. A message
//! clears itself after its kind's lifetime unless a newer message of the
//! same kind replaced it first, in which case the newer one gets a full
//! window of its own.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// How long a success message stays visible
pub const SUCCESS_TTL: Duration = Duration::from_secs(3);
/// How long an error message stays visible
pub const ERROR_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn ttl(self) -> Duration {
        match self {
            MessageKind::Success => SUCCESS_TTL,
            MessageKind::Error => ERROR_TTL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Slot {
    text: Option<String>,
    generation: u64,
}

/// The error/success message pair of a container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Messages {
    success: Slot,
    error: Slot,
}

impl Messages {
    pub fn success(&self) -> Option<&str> {
        self.success.text.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.text.as_deref()
    }

    fn slot_mut(&mut self, kind: MessageKind) -> &mut Slot {
        match kind {
            MessageKind::Success => &mut self.success,
            MessageKind::Error => &mut self.error,
        }
    }

    /// Generation of the message currently in `kind`'s slot
    pub fn generation(&self, kind: MessageKind) -> u64 {
        match kind {
            MessageKind::Success => self.success.generation,
            MessageKind::Error => self.error.generation,
        }
    }

    /// Replace the message of `kind`, starting a new generation
    pub fn show(&mut self, kind: MessageKind, text: impl Into<String>) -> u64 {
        let slot = self.slot_mut(kind);
        slot.generation += 1;
        slot.text = Some(text.into());
        slot.generation
    }

    /// Clear `kind` if it still holds the message of `generation`
    pub fn expire(&mut self, kind: MessageKind, generation: u64) {
        let slot = self.slot_mut(kind);
        if slot.generation == generation {
            slot.text = None;
        }
    }

    pub fn clear(&mut self) {
        self.success.text = None;
        self.error.text = None;
    }
}

/// Run `expire` against the shared state once `kind`'s lifetime has passed
pub(crate) fn schedule_expiry<S, F>(state: Arc<Mutex<S>>, kind: MessageKind, expire: F)
where
    S: Send + 'static,
    F: FnOnce(&mut S) + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(kind.ttl()).await;
        let mut state = state.lock().await;
        expire(&mut state);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_generation_does_not_clear() {
        let mut messages = Messages::default();
        let first = messages.show(MessageKind::Success, "Saved");
        let second = messages.show(MessageKind::Success, "Saved again");

        messages.expire(MessageKind::Success, first);
        assert_eq!(messages.success(), Some("Saved again"));

        messages.expire(MessageKind::Success, second);
        assert_eq!(messages.success(), None);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut messages = Messages::default();
        let error = messages.show(MessageKind::Error, "Boom");
        messages.show(MessageKind::Success, "Done");

        messages.expire(MessageKind::Error, error);
        assert_eq!(messages.error(), None);
        assert_eq!(messages.success(), Some("Done"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_expiry_honours_lifetime() {
        let state = Arc::new(Mutex::new(Messages::default()));
        let generation = state.lock().await.show(MessageKind::Error, "Boom");
        schedule_expiry(Arc::clone(&state), MessageKind::Error, move |m: &mut Messages| {
            m.expire(MessageKind::Error, generation)
        });

        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert_eq!(state.lock().await.error(), Some("Boom"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(state.lock().await.error(), None);
    }
}
