//! Job records and the fixed-capacity job table.
//!
//! A job is one pipeline invocation: a group of cooperating processes
//! sharing a process group. Job ids are stable integer handles into the
//! table (arena + index), never references into its storage, so the
//! asynchronous reaper can resolve a job safely at any time.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use nix::unistd::Pid;

use crate::error::{ShellError, ShellResult};

/// Number of job slots in a default table.
pub const DEFAULT_CAPACITY: usize = 100;

/// Stable handle to a slot in the [`JobTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Life-cycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Owns the terminal.
    Foreground,
    /// Running without the terminal.
    Background,
    /// Stopped by a signal (Ctrl-Z, SIGSTOP, or terminal I/O from the
    /// background).
    Stopped,
    /// At least one member was killed by a signal; the job is waiting for
    /// the rest to be reaped.
    Terminated,
}

impl JobStatus {
    /// Human label used by the `jobs` listing. Both foreground and
    /// background jobs read as `Running`.
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Foreground | JobStatus::Background => "Running",
            JobStatus::Stopped => "Stopped",
            JobStatus::Terminated => "Terminated",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One pipeline invocation.
///
/// The pid sequence is populated in spawn order, one entry per stage; the
/// process-group id is fixed to the first spawned pid. The three counters
/// track how many member processes reported each state since the last
/// cycle, so a notice fires once per job rather than once per process.
#[derive(Debug, Clone)]
pub struct Job {
    /// Display name: the original command line.
    pub name: String,
    /// Number of stages, and therefore of pids once fully spawned.
    pub stage_count: usize,
    pub pids: Vec<Pid>,
    pub pgid: Pid,
    pub status: JobStatus,
    pub completed: usize,
    pub suspended: usize,
    pub continued: usize,
}

impl Job {
    fn new(name: String, stage_count: usize, foreground: bool) -> Self {
        Self {
            name,
            stage_count,
            pids: Vec::with_capacity(stage_count),
            pgid: Pid::from_raw(0),
            status: if foreground {
                JobStatus::Foreground
            } else {
                JobStatus::Background
            },
            completed: 0,
            suspended: 0,
            continued: 0,
        }
    }

    /// Record a spawned member. The first pid becomes the process group.
    pub fn push_pid(&mut self, pid: Pid) {
        if self.pids.is_empty() {
            self.pgid = pid;
        }
        self.pids.push(pid);
    }

    /// Record one completed member. Saturates at the stage count; returns
    /// true when every stage has now been accounted for.
    pub fn note_completed(&mut self) -> bool {
        if self.completed < self.stage_count {
            self.completed += 1;
        }
        self.completed == self.stage_count
    }

    /// Record one suspended report. Returns true for the first report of
    /// the cycle; the counter resets once every member has reported.
    pub fn note_suspended(&mut self) -> bool {
        self.suspended += 1;
        let first = self.suspended == 1;
        if self.suspended >= self.stage_count {
            self.suspended = 0;
        }
        first
    }

    /// Record one continued report, with the same cycle rules as
    /// [`Job::note_suspended`].
    pub fn note_continued(&mut self) -> bool {
        self.continued += 1;
        let first = self.continued == 1;
        if self.continued >= self.stage_count {
            self.continued = 0;
        }
        first
    }
}

/// Fixed-capacity mapping from job id to job.
///
/// A job id is in use iff its slot is occupied; ids are reused only after
/// the prior occupant is released. Pid sequences never alias between two
/// simultaneously live jobs.
#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Option<Job>>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Claim the lowest free slot for a new job.
    pub fn allocate(
        &mut self,
        name: String,
        stage_count: usize,
        foreground: bool,
    ) -> ShellResult<JobId> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(ShellError::TableFull)?;
        self.slots[index] = Some(Job::new(name, stage_count, foreground));
        Ok(JobId(index))
    }

    /// Free a slot. Releasing an empty or out-of-range slot is a no-op.
    pub fn release(&mut self, id: JobId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = None;
        }
    }

    /// True iff `id` names an occupied slot.
    pub fn is_valid(&self, id: JobId) -> bool {
        self.slots.get(id.0).is_some_and(|slot| slot.is_some())
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Resolve the job owning `pid`. Linear scan over occupied slots; the
    /// table is small and the scan runs with the table locked.
    pub fn find_by_pid(&self, pid: Pid) -> Option<JobId> {
        self.iter()
            .find(|(_, job)| job.pids.contains(&pid))
            .map(|(id, _)| id)
    }

    /// Occupied slots in id order.
    pub fn iter(&self) -> impl Iterator<Item = (JobId, &Job)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|job| (JobId(index), job)))
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a shared job table, recovering the guard from a poisoned mutex.
pub fn lock(table: &Mutex<JobTable>) -> MutexGuard<'_, JobTable> {
    match table.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
