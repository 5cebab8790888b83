use std::sync::{Mutex, PoisonError};

use crate::error::ConfigError;
use crate::target::Target;

/// A fixed, ordered set of targets picked in round-robin order.
pub struct Pool {
    targets: Vec<Box<dyn Target>>,
    cursor: Mutex<usize>,
}

impl Pool {
    pub fn new(targets: Vec<Box<dyn Target>>) -> Result<Pool, ConfigError> {
        if targets.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        Ok(Pool {
            targets,
            cursor: Mutex::new(0),
        })
    }

    /// Returns the next live target, starting at the cursor.
    ///
    /// Every candidate looked at takes up one rotation step, dead or alive,
    /// so the cursor moves forward on every call. The scan stops after one
    /// full pass; `None` means no target is alive.
    pub fn get_next_available(&self) -> Option<&dyn Target> {
        let length = self.targets.len();
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);

        for _ in 0..length {
            let target = &self.targets[*cursor % length];
            *cursor = cursor.wrapping_add(1);
            if target.is_alive() {
                return Some(target.as_ref());
            }
        }
        None
    }

    pub fn cursor(&self) -> usize {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn targets(&self) -> impl Iterator<Item = &dyn Target> {
        self.targets.iter().map(|target| target.as_ref())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}
