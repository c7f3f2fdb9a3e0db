use std::{collections::HashSet, fmt, sync::Arc};

use parking_lot::Mutex;
use uuid::Uuid;

/// What a write command is working on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandKey {
    NewSkill,
    Skill(Uuid),
    Category(String),
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKey::NewSkill => write!(f, "the new skill"),
            CommandKey::Skill(id) => write!(f, "skill {}", id),
            CommandKey::Category(name) => write!(f, "category \"{}\"", name),
        }
    }
}

/// Registry of commands awaiting the store. A key can be held by one
/// command at a time; the guard releases it on drop, success or failure.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<CommandKey>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, key: CommandKey) -> Option<InFlightGuard> {
        let mut keys = self.keys.lock();
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    pub fn is_busy(&self, key: &CommandKey) -> bool {
        self.keys.lock().contains(key)
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<CommandKey>>>,
    key: CommandKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_exclusive_until_guard_drops() {
        let in_flight = InFlight::new();
        let key = CommandKey::Category("Backend".into());

        let guard = in_flight.try_acquire(key.clone()).unwrap();
        assert!(in_flight.try_acquire(key.clone()).is_none());
        assert!(in_flight.try_acquire(CommandKey::NewSkill).is_some());

        drop(guard);
        assert!(!in_flight.is_busy(&key));
        assert!(in_flight.try_acquire(key).is_some());
    }
}
