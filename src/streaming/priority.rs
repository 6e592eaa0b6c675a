//! Job queues for chunk streaming
//!
//! Each job kind has its own FIFO queue paired with a coordinate set, so a
//! chunk is queued at most once per kind and membership checks are O(1).

use crate::streaming::lod::{lod_for_chunk, LodLevel};
use crate::voxel::ChunkCoord;
use std::collections::{HashSet, VecDeque};

/// A unit of streaming work
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Job {
    Load(ChunkCoord),
    Unload(ChunkCoord),
    RebuildForLod(ChunkCoord, LodLevel),
}

impl Job {
    pub fn coord(&self) -> ChunkCoord {
        match *self {
            Job::Load(c) | Job::Unload(c) | Job::RebuildForLod(c, _) => c,
        }
    }
}

/// Anything that can sit in a [`JobQueue`]
pub trait QueuedJob {
    fn coord(&self) -> ChunkCoord;
}

impl QueuedJob for ChunkCoord {
    fn coord(&self) -> ChunkCoord {
        *self
    }
}

/// Pending LoD rebuild of a resident chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebuildJob {
    pub coord: ChunkCoord,
    pub target: LodLevel,
}

impl QueuedJob for RebuildJob {
    fn coord(&self) -> ChunkCoord {
        self.coord
    }
}

/// Pending load, annotated for ordering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadJob {
    pub coord: ChunkCoord,
    /// LoD the chunk will be meshed at, relative to the last known centre
    pub lod: LodLevel,
    /// Chebyshev distance from the last known centre
    pub distance: u32,
    /// Insertion sequence number, breaks ties
    pub seq: u64,
}

impl QueuedJob for LoadJob {
    fn coord(&self) -> ChunkCoord {
        self.coord
    }
}

/// FIFO queue with duplicate suppression by chunk coordinate
#[derive(Debug)]
pub struct JobQueue<J> {
    jobs: VecDeque<J>,
    members: HashSet<ChunkCoord>,
}

impl<J> Default for JobQueue<J> {
    fn default() -> Self {
        Self {
            jobs: VecDeque::new(),
            members: HashSet::new(),
        }
    }
}

impl<J: QueuedJob> JobQueue<J> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a job; returns `false` if its chunk is already queued
    pub fn push(&mut self, job: J) -> bool {
        if !self.members.insert(job.coord()) {
            return false;
        }
        self.jobs.push_back(job);
        true
    }

    /// Dequeue the oldest job
    pub fn pop(&mut self) -> Option<J> {
        let job = self.jobs.pop_front()?;
        self.members.remove(&job.coord());
        Some(job)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.members.contains(&coord)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &J> {
        self.jobs.iter()
    }

    /// Size of the duplicate-suppression set; always equals `len()`
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Load queue ordering: full detail first, then nearest, then oldest
#[derive(Debug, Default)]
pub struct LoadQueue {
    queue: JobQueue<LoadJob>,
    next_seq: u64,
}

impl LoadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a load; returns `false` if already queued
    pub fn push(&mut self, coord: ChunkCoord, lod: LodLevel, distance: u32) -> bool {
        if self.queue.contains(coord) {
            return false;
        }
        let job = LoadJob { coord, lod, distance, seq: self.next_seq };
        self.next_seq += 1;
        self.queue.push(job)
    }

    pub fn pop(&mut self) -> Option<LoadJob> {
        self.queue.pop()
    }

    /// Re-annotate every job against a new centre and restore ordering
    pub fn reprioritize(&mut self, center: ChunkCoord, lod0_range: u32) {
        let jobs = self.queue.jobs.make_contiguous();
        for job in jobs.iter_mut() {
            job.distance = job.coord.chebyshev(center);
            job.lod = lod_for_chunk(job.coord, center, lod0_range);
        }
        jobs.sort_by_key(|j| (j.lod, j.distance, j.seq));
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.queue.contains(coord)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadJob> {
        self.queue.iter()
    }

    pub fn member_count(&self) -> usize {
        self.queue.member_count()
    }
}
