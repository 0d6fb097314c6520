use super::{Worker, WorkerId};

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    worker: Option<Worker>,
}

/// Arena of workers. Released slots are recycled under a new generation.
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot and fills it with whatever `build` makes of the id.
    pub fn acquire(&mut self, build: impl FnOnce(WorkerId) -> Worker) -> WorkerId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = WorkerId::new(index, slot.generation);
        slot.worker = Some(build(id));
        self.live += 1;
        id
    }

    pub fn release(&mut self, id: WorkerId) -> Option<Worker> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let worker = slot.worker.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        Some(worker)
    }

    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.worker.as_ref())
    }

    pub fn get_mut(&mut self, id: WorkerId) -> Option<&mut Worker> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.worker.as_mut())
    }

    /// Live ids in slot order.
    pub fn ids(&self) -> Vec<WorkerId> {
        self.iter().map(|w| w.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.slots.iter().filter_map(|slot| slot.worker.as_ref())
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Slots ever allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::BuildingId;
    use crate::config::WorkerConfig;
    use crate::worker::Gender;

    fn spawn(pool: &mut WorkerPool, age: u32) -> WorkerId {
        pool.acquire(|id| {
            Worker::new(
                id,
                "Test".into(),
                Gender::Male,
                age,
                BuildingId::new(0),
                0,
                &WorkerConfig::default(),
            )
        })
    }

    #[test]
    fn released_slots_are_reused_with_new_generation() {
        let mut pool = WorkerPool::new();
        let a = spawn(&mut pool, 20);
        let b = spawn(&mut pool, 30);
        assert_eq!(pool.len(), 2);

        let gone = pool.release(a).unwrap();
        assert_eq!(gone.age, 20);
        assert!(pool.get(a).is_none());

        let c = spawn(&mut pool, 1);
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.get(c).map(|w| w.age), Some(1));
        assert_eq!(pool.ids(), vec![c, b]);
    }

    #[test]
    fn stale_release_is_ignored() {
        let mut pool = WorkerPool::new();
        let a = spawn(&mut pool, 20);
        pool.release(a);
        let _ = spawn(&mut pool, 20);
        assert!(pool.release(a).is_none());
        assert_eq!(pool.len(), 1);
    }
}
