//! Chunk residency, job dispatch and LoD management around a moving viewer
//!
//! The host calls [`ChunkStreamingManager::update_view_position`] whenever the
//! viewer moves and [`ChunkStreamingManager::tick`] once per frame. Position
//! updates only enqueue work; `tick` drains the queues in strict priority
//! order (rebuild, unload, load) up to the per-frame job cap. Every job is
//! re-validated against the current view when it is dispatched, so work made
//! obsolete by later movement is dropped without side effects.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info, trace, warn};

use crate::core::Result;
use crate::mesh::{ChunkMesh, Neighbors, SurfaceExtractor};
use crate::streaming::budget::FrameBudget;
use crate::streaming::config::StreamingConfig;
use crate::streaming::lod::{lod_for_chunk, lod_from_distance, on_transition_ring, LodLevel};
use crate::streaming::priority::{Job, JobQueue, LoadJob, LoadQueue, RebuildJob};
use crate::streaming::stats::{JobCategory, JobTimings, StreamingDiagnostics, StreamingStats};
use crate::streaming::store::ChunkStore;
use crate::terrain::TerrainGenerator;
use crate::voxel::{in_bounds, world_to_local, BlockId, ChunkCoord, ChunkData, CHUNK_SIZE};

/// A chunk held in memory with its current mesh
#[derive(Clone, Debug)]
pub struct ResidentChunk {
    pub data: ChunkData,
    pub mesh: ChunkMesh,
    pub lod: LodLevel,
}

/// Mesh lifecycle notification for the renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshEvent {
    /// A chunk became resident with a new mesh
    Created(ChunkCoord),
    /// A resident chunk's mesh was rebuilt
    Replaced(ChunkCoord),
    /// A chunk left residency and its mesh was dropped
    Released(ChunkCoord),
}

/// Outcome of one [`ChunkStreamingManager::tick`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Jobs that ran, in execution order
    pub executed: Vec<Job>,
    /// Jobs discarded as obsolete
    pub stale_dropped: usize,
    /// Whether any queue still holds work
    pub pending: bool,
}

/// Where a loaded chunk's voxels came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadSource {
    Store,
    Generated,
}

/// Result of dispatching one job
enum Dispatch {
    Executed(Job),
    Stale(Job),
}

/// Keeps the chunks around a viewer resident and meshed at the right LoD
pub struct ChunkStreamingManager<S, G> {
    config: StreamingConfig,
    store: S,
    generator: G,
    extractor: SurfaceExtractor,
    resident: HashMap<ChunkCoord, ResidentChunk>,
    rebuild_queue: JobQueue<RebuildJob>,
    unload_queue: JobQueue<ChunkCoord>,
    load_queue: LoadQueue,
    /// Chunk cell the viewer was last seen in
    center: Option<ChunkCoord>,
    budget: FrameBudget,
    diagnostics: StreamingDiagnostics,
    /// Held until the host calls `drain_mesh_events`
    mesh_events: Vec<MeshEvent>,
}

impl<S: ChunkStore, G: TerrainGenerator> ChunkStreamingManager<S, G> {
    /// Create a manager; the extractor's options are taken from `config`
    pub fn new(config: StreamingConfig, store: S, generator: G, mut extractor: SurfaceExtractor) -> Result<Self> {
        config.validate()?;
        extractor.set_options(config.extract_options());
        let budget = FrameBudget::new(config.max_processing_per_frame);

        Ok(Self {
            config,
            store,
            generator,
            extractor,
            resident: HashMap::new(),
            rebuild_queue: JobQueue::new(),
            unload_queue: JobQueue::new(),
            load_queue: LoadQueue::new(),
            center: None,
            budget,
            diagnostics: StreamingDiagnostics::new(),
            mesh_events: Vec::new(),
        })
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Chunk cell of the last view update
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    // --- Residency recomputation ---

    /// Report the viewer's world position
    ///
    /// Residency is recomputed only when the viewer enters a new chunk cell;
    /// returns whether that happened.
    pub fn update_view_position(&mut self, world_x: f32, world_z: f32) -> bool {
        let cell = ChunkCoord::from_world(world_x, world_z);
        if self.center == Some(cell) {
            return false;
        }
        self.center = Some(cell);
        self.recompute(cell);
        true
    }

    /// Recompute residency for the current cell even if the viewer has not moved
    pub fn force_refresh(&mut self) {
        if let Some(center) = self.center {
            self.recompute(center);
        }
    }

    fn recompute(&mut self, center: ChunkCoord) {
        let range = self.config.chunk_range;
        let lod0_range = self.config.lod0_range;
        let mut unloads = 0;
        let mut rebuilds = 0;
        let mut loads = 0;

        for (&coord, chunk) in &self.resident {
            let d = coord.chebyshev(center);
            if d > range {
                if self.unload_queue.push(coord) {
                    unloads += 1;
                }
            } else if on_transition_ring(d, lod0_range) {
                let target = lod_from_distance(d, lod0_range);
                if chunk.lod != target && self.rebuild_queue.push(RebuildJob { coord, target }) {
                    rebuilds += 1;
                }
            }
        }

        let r = range as i32;
        for dz in -r..=r {
            for dx in -r..=r {
                let coord = center.offset(dx, dz);
                if self.resident.contains_key(&coord) || self.load_queue.contains(coord) {
                    continue;
                }
                let lod = lod_for_chunk(coord, center, lod0_range);
                if self.load_queue.push(coord, lod, coord.chebyshev(center)) {
                    loads += 1;
                }
            }
        }

        self.load_queue.reprioritize(center, lod0_range);

        debug!(
            "Residency at {:?}: +{} loads, +{} unloads, +{} rebuilds (queued {}/{}/{})",
            center,
            loads,
            unloads,
            rebuilds,
            self.load_queue.len(),
            self.unload_queue.len(),
            self.rebuild_queue.len()
        );
    }

    // --- Dispatch ---

    /// Whether any job is waiting
    pub fn has_pending_work(&self) -> bool {
        !self.rebuild_queue.is_empty() || !self.unload_queue.is_empty() || !self.load_queue.is_empty()
    }

    /// Run queued jobs for one frame
    ///
    /// Rebuilds run before unloads, unloads before loads. Obsolete jobs are
    /// dropped and do not count towards the frame cap.
    ///
    /// Every executed job records a [`MeshEvent`]. Events are kept until
    /// [`drain_mesh_events`](Self::drain_mesh_events) is called, so a host
    /// that ticks every frame must also drain every frame.
    pub async fn tick(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();
        self.budget.reset();

        while self.budget.has_capacity() {
            let dispatch = if let Some(job) = self.rebuild_queue.pop() {
                self.run_rebuild(job)
            } else if let Some(coord) = self.unload_queue.pop() {
                self.run_unload(coord)
            } else if let Some(job) = self.load_queue.pop() {
                self.run_load(job).await
            } else {
                break;
            };

            match dispatch {
                Dispatch::Executed(job) => {
                    trace!("Executed {:?}", job);
                    self.budget.consume();
                    report.executed.push(job);
                }
                Dispatch::Stale(job) => {
                    trace!("Dropped stale {:?}", job);
                    report.stale_dropped += 1;
                }
            }
        }

        report.pending = self.has_pending_work();
        report
    }

    fn in_range(&self, coord: ChunkCoord) -> bool {
        self.center
            .is_some_and(|center| coord.chebyshev(center) <= self.config.chunk_range)
    }

    fn run_rebuild(&mut self, job: RebuildJob) -> Dispatch {
        let coord = job.coord;
        let (Some(center), Some(chunk)) = (self.center, self.resident.get(&coord)) else {
            return Dispatch::Stale(Job::RebuildForLod(coord, job.target));
        };
        let d = coord.chebyshev(center);
        // Target is re-derived: the viewer may have moved since queuing
        let target = lod_from_distance(d, self.config.lod0_range);
        if d > self.config.chunk_range || chunk.lod == target {
            return Dispatch::Stale(Job::RebuildForLod(coord, job.target));
        }

        let start = Instant::now();
        let mesh = self.mesh_chunk(&chunk.data, target);
        if let Some(chunk) = self.resident.get_mut(&coord) {
            chunk.mesh = mesh;
            chunk.lod = target;
        }
        self.diagnostics.record(JobCategory::LodTransition, start.elapsed());
        self.mesh_events.push(MeshEvent::Replaced(coord));

        Dispatch::Executed(Job::RebuildForLod(coord, target))
    }

    fn run_unload(&mut self, coord: ChunkCoord) -> Dispatch {
        if self.in_range(coord) {
            return Dispatch::Stale(Job::Unload(coord));
        }

        let start = Instant::now();
        let Some(chunk) = self.resident.remove(&coord) else {
            return Dispatch::Stale(Job::Unload(coord));
        };
        let category = match chunk.lod {
            LodLevel::Full => JobCategory::Unload,
            LodLevel::Coarse => JobCategory::Lod1Unload,
        };
        drop(chunk);
        self.diagnostics.record(category, start.elapsed());
        self.mesh_events.push(MeshEvent::Released(coord));

        Dispatch::Executed(Job::Unload(coord))
    }

    async fn run_load(&mut self, job: LoadJob) -> Dispatch {
        let coord = job.coord;
        let Some(center) = self.center else {
            return Dispatch::Stale(Job::Load(coord));
        };
        if self.resident.contains_key(&coord) || !self.in_range(coord) {
            return Dispatch::Stale(Job::Load(coord));
        }

        let start = Instant::now();
        let (data, source) = self.fetch_chunk(coord).await;
        let lod = lod_for_chunk(coord, center, self.config.lod0_range);
        let mesh = self.mesh_chunk(&data, lod);
        self.resident.insert(coord, ResidentChunk { data, mesh, lod });

        let category = match (source, lod) {
            (LoadSource::Store, _) => JobCategory::StoreLoad,
            (LoadSource::Generated, LodLevel::Full) => JobCategory::NewGenerate,
            (LoadSource::Generated, LodLevel::Coarse) => JobCategory::Lod1Generate,
        };
        self.diagnostics.record(category, start.elapsed());
        match source {
            LoadSource::Store => self.diagnostics.count_loaded(),
            LoadSource::Generated => self.diagnostics.count_generated(),
        }
        self.mesh_events.push(MeshEvent::Created(coord));

        Dispatch::Executed(Job::Load(coord))
    }

    /// Read a chunk from the store, generating it on a miss or store error
    async fn fetch_chunk(&self, coord: ChunkCoord) -> (ChunkData, LoadSource) {
        match self.store.load(&self.config.world_id, coord).await {
            Ok(Some(mut data)) => {
                data.mark_saved();
                return (data, LoadSource::Store);
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load chunk {:?}, regenerating: {}", coord, e),
        }

        let mut data = ChunkData::new(coord);
        self.generator.generate(&mut data);
        data.mark_modified();
        (data, LoadSource::Generated)
    }

    /// Mesh a chunk against whichever horizontal neighbours are resident
    fn mesh_chunk(&self, data: &ChunkData, lod: LodLevel) -> ChunkMesh {
        let coord = data.coord();
        let neighbor = |dx, dz| self.resident.get(&coord.offset(dx, dz)).map(|c| &c.data);
        let neighbors = Neighbors {
            pos_x: neighbor(1, 0),
            neg_x: neighbor(-1, 0),
            pos_z: neighbor(0, 1),
            neg_z: neighbor(0, -1),
        };
        self.extractor.extract(data, &neighbors, lod)
    }

    fn remesh(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.resident.get(&coord) else {
            return;
        };
        let mesh = self.mesh_chunk(&chunk.data, chunk.lod);
        if let Some(chunk) = self.resident.get_mut(&coord) {
            chunk.mesh = mesh;
            self.mesh_events.push(MeshEvent::Replaced(coord));
        }
    }

    // --- Editing ---

    /// Block at a world position, if its chunk is resident
    pub fn block_at(&self, world_x: i32, y: i32, world_z: i32) -> Option<&BlockId> {
        let (coord, x, z) = world_to_local(world_x, world_z);
        self.resident.get(&coord)?.data.get_block(x, y, z)
    }

    /// Edit a block in a resident chunk, re-mesh and save it
    ///
    /// Edits on a chunk border also re-mesh the adjacent resident chunk. A
    /// failed save is logged; the edit stays in memory. Returns `false` when
    /// the position is out of bounds or its chunk is not resident.
    pub async fn set_block(&mut self, world_x: i32, y: i32, world_z: i32, id: BlockId) -> bool {
        let (coord, x, z) = world_to_local(world_x, world_z);
        if !in_bounds(x, y, z) {
            return false;
        }
        let Some(chunk) = self.resident.get_mut(&coord) else {
            return false;
        };
        chunk.data.set_block(x, y, z, id);
        chunk.data.mark_modified();

        self.remesh(coord);
        if x == 0 {
            self.remesh(coord.offset(-1, 0));
        } else if x == CHUNK_SIZE - 1 {
            self.remesh(coord.offset(1, 0));
        }
        if z == 0 {
            self.remesh(coord.offset(0, -1));
        } else if z == CHUNK_SIZE - 1 {
            self.remesh(coord.offset(0, 1));
        }

        let saved = match self.resident.get(&coord) {
            Some(chunk) => self.store.save(&self.config.world_id, &chunk.data).await,
            None => return true,
        };
        match saved {
            Ok(()) => {
                if let Some(chunk) = self.resident.get_mut(&coord) {
                    chunk.data.mark_saved();
                }
            }
            Err(e) => warn!("Failed to save edited chunk {:?}: {}", coord, e),
        }
        true
    }

    // --- Bulk operations ---

    /// Save every resident chunk, then drop all residency and queued work
    ///
    /// Returns the number of chunks saved successfully.
    pub async fn evict_all(&mut self) -> usize {
        let mut saved = 0;
        for chunk in self.resident.values() {
            match self.store.save(&self.config.world_id, &chunk.data).await {
                Ok(()) => saved += 1,
                Err(e) => warn!("Failed to save chunk {:?} during eviction: {}", chunk.data.coord(), e),
            }
        }
        let total = self.resident.len();
        self.reset_residency();
        info!("Evicted {} chunks ({} saved)", total, saved);
        saved
    }

    /// Drop all residency without saving and erase the world from the store
    pub async fn clear_world(&mut self) -> Result<()> {
        self.reset_residency();
        self.store.clear(&self.config.world_id).await?;
        info!("Cleared world '{}'", self.config.world_id);
        Ok(())
    }

    /// Number of chunks persisted for the configured world
    pub async fn stored_chunk_count(&self) -> Result<usize> {
        self.store.count(&self.config.world_id).await
    }

    fn reset_residency(&mut self) {
        let mut coords: Vec<ChunkCoord> = self.resident.keys().copied().collect();
        coords.sort_unstable();
        self.mesh_events.extend(coords.into_iter().map(MeshEvent::Released));
        self.resident.clear();
        self.rebuild_queue.clear();
        self.unload_queue.clear();
        self.load_queue.clear();
        self.center = None;
    }

    // --- Queries ---

    pub fn resident(&self, coord: ChunkCoord) -> Option<&ResidentChunk> {
        self.resident.get(&coord)
    }

    /// Resident chunk coordinates, sorted
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.resident.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    pub fn load_queue(&self) -> &LoadQueue {
        &self.load_queue
    }

    pub fn unload_queue(&self) -> &JobQueue<ChunkCoord> {
        &self.unload_queue
    }

    pub fn rebuild_queue(&self) -> &JobQueue<RebuildJob> {
        &self.rebuild_queue
    }

    /// Take the mesh notifications accumulated since the last call
    ///
    /// Events are never dropped on their own; the buffer grows until drained.
    pub fn drain_mesh_events(&mut self) -> Vec<MeshEvent> {
        std::mem::take(&mut self.mesh_events)
    }

    // --- Diagnostics ---

    pub fn diagnostics(&self) -> &StreamingDiagnostics {
        &self.diagnostics
    }

    /// Clear timing windows and generated/loaded counters
    pub fn reset_stats(&mut self) {
        self.diagnostics.reset();
    }

    pub fn stats(&self) -> StreamingStats {
        let lod0_chunks = self.resident.values().filter(|c| c.lod == LodLevel::Full).count();
        StreamingStats {
            loaded_chunks: self.resident.len(),
            lod0_chunks,
            lod1_chunks: self.resident.len() - lod0_chunks,
            load_queue: self.load_queue.len(),
            unload_queue: self.unload_queue.len(),
            rebuild_queue: self.rebuild_queue.len(),
            timings: JobTimings::from_diagnostics(&self.diagnostics),
            generated_total: self.diagnostics.generated(),
            loaded_total: self.diagnostics.loaded(),
        }
    }
}
