// renderer/commands.rs
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::renderer::accumulator::AccumulatorId;
use crate::scene::Geometry;

/// State-affecting commands for the multithreaded submission stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    SetAccumulator(Option<AccumulatorId>),
    ClearShaderAndTechnique,
}

/// A deferred `register_object` call produced during traversal.
#[derive(Debug, Clone)]
pub struct Registration {
    pub geometry: Arc<Geometry>,
    pub aux: u64,
}

/// Multi-producer queue drained by a single consumer. Commands are applied
/// in insertion order.
#[derive(Debug)]
pub struct CommandQueue<T> {
    pending: Mutex<VecDeque<T>>,
}

pub type RegistrationQueue = CommandQueue<Registration>;

impl<T> CommandQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub fn insert(&self, command: T) {
        self.lock().push_back(command);
    }

    pub fn extend(&self, commands: impl IntoIterator<Item = T>) {
        self.lock().extend(commands);
    }

    /// Takes everything queued so far. This is the synchronisation point
    /// between producers and the consumer.
    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        // A producer panicking mid-push leaves the deque itself intact.
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Default for CommandQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn drain_returns_commands_in_insertion_order() {
        let queue = CommandQueue::new();
        queue.insert(RenderCommand::ClearShaderAndTechnique);
        queue.insert(RenderCommand::SetAccumulator(None));

        assert_eq!(
            queue.drain(),
            vec![
                RenderCommand::ClearShaderAndTechnique,
                RenderCommand::SetAccumulator(None)
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        let queue = CommandQueue::new();
        (0..1000u32).into_par_iter().for_each(|value| queue.insert(value));

        let mut drained = queue.drain();
        drained.sort_unstable();
        assert_eq!(drained, (0..1000).collect::<Vec<_>>());
    }
}
