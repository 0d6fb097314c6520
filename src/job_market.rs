//! Matching between vacant jobs and idle workers.
//!
//! The market is event driven: every registration or removal runs a matching
//! pass right away. Jobs are picked uniformly at random, workers first come
//! first served. The market owns the job table; the worker side of every
//! binding is reported back as [`MarketEvent`]s for the caller to mirror.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::building::BuildingId;
use crate::worker::WorkerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(u32);

impl JobId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "j{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub building: BuildingId,
    pub worker: Option<WorkerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketEvent {
    Hired { worker: WorkerId, job: JobId },
    Released { worker: WorkerId, job: JobId },
}

#[derive(Debug)]
pub struct JobMarket {
    jobs: BTreeMap<JobId, Job>,
    vacancies: Vec<JobId>,
    idle: VecDeque<WorkerId>,
    employment: HashMap<WorkerId, JobId>,
    next_job: u32,
    rng: ChaCha8Rng,
}

impl JobMarket {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            jobs: BTreeMap::new(),
            vacancies: Vec::new(),
            idle: VecDeque::new(),
            employment: HashMap::new(),
            next_job: 0,
            rng,
        }
    }

    /// Adds a job slot owned by `building`. It stays closed until registered.
    pub fn create_job(&mut self, building: BuildingId) -> JobId {
        let id = JobId(self.next_job);
        self.next_job += 1;
        self.jobs.insert(
            id,
            Job {
                id,
                building,
                worker: None,
            },
        );
        id
    }

    pub fn register_job(&mut self, job: JobId) -> Vec<MarketEvent> {
        let vacant = self.jobs.get(&job).is_some_and(|j| j.worker.is_none());
        if vacant && !self.vacancies.contains(&job) {
            self.vacancies.push(job);
        }
        self.match_pending()
    }

    pub fn register_jobs(&mut self, jobs: &[JobId]) -> Vec<MarketEvent> {
        let mut events = Vec::new();
        for job in jobs {
            events.extend(self.register_job(*job));
        }
        events
    }

    /// Deletes a job. An occupant goes back to the idle queue and may be
    /// picked up by another vacancy in the same call.
    pub fn remove_job(&mut self, job: JobId) -> Vec<MarketEvent> {
        let mut events = Vec::new();
        self.vacancies.retain(|j| *j != job);
        if let Some(removed) = self.jobs.remove(&job) {
            if let Some(worker) = removed.worker {
                self.employment.remove(&worker);
                self.idle.push_back(worker);
                events.push(MarketEvent::Released { worker, job });
            }
        }
        events.extend(self.match_pending());
        events
    }

    pub fn remove_jobs(&mut self, jobs: &[JobId]) -> Vec<MarketEvent> {
        let mut events = Vec::new();
        for job in jobs {
            events.extend(self.remove_job(*job));
        }
        events
    }

    /// Queues a worker for employment. Already queued or employed workers are
    /// left alone.
    pub fn register_worker(&mut self, worker: WorkerId) -> Vec<MarketEvent> {
        if !self.employment.contains_key(&worker) && !self.idle.contains(&worker) {
            self.idle.push_back(worker);
        }
        self.match_pending()
    }

    /// Takes a worker off the market. Their job reopens and is offered to
    /// whoever is waiting.
    pub fn remove_worker(&mut self, worker: WorkerId) -> Vec<MarketEvent> {
        let mut events = Vec::new();
        self.idle.retain(|w| *w != worker);
        if let Some(job) = self.employment.remove(&worker) {
            if let Some(slot) = self.jobs.get_mut(&job) {
                slot.worker = None;
                self.vacancies.push(job);
            }
            events.push(MarketEvent::Released { worker, job });
        }
        events.extend(self.match_pending());
        events
    }

    pub fn remove_workers(&mut self, workers: &[WorkerId]) -> Vec<MarketEvent> {
        let mut events = Vec::new();
        for worker in workers {
            events.extend(self.remove_worker(*worker));
        }
        events
    }

    fn match_pending(&mut self) -> Vec<MarketEvent> {
        let mut events = Vec::new();
        while !self.vacancies.is_empty() && !self.idle.is_empty() {
            let pick = self.rng.gen_range(0..self.vacancies.len());
            let job = self.vacancies.swap_remove(pick);
            let Some(worker) = self.idle.pop_front() else {
                break;
            };
            if let Some(slot) = self.jobs.get_mut(&job) {
                slot.worker = Some(worker);
                self.employment.insert(worker, job);
                debug!(%worker, %job, building = %slot.building, "worker hired");
                events.push(MarketEvent::Hired { worker, job });
            }
        }
        events
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn employer_of(&self, worker: WorkerId) -> Option<JobId> {
        self.employment.get(&worker).copied()
    }

    pub fn is_idle(&self, worker: WorkerId) -> bool {
        self.idle.contains(&worker)
    }

    pub fn vacancy_count(&self) -> usize {
        self.vacancies.len()
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.employment.len()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}
