//! Uniform spatial grid with fixed-capacity buckets.
//!
//! Cells are one particle diameter wide, so every particle that can touch
//! a given particle lies in the 3×3×3 block of cells around it. Each cell
//! stores at most [`CELL_CAPACITY`] particle indices; the slot to write is
//! claimed with a bounded atomic increment, so concurrent populate lanes
//! never lose a write and a full bucket simply rejects the insert.

use std::sync::atomic::{AtomicU32, Ordering};

use pellet_compute::{ComputeBackend, Kernel};
use pellet_types::constants::{CELL_CAPACITY, EMPTY_SLOT};
use pellet_types::{CellId, PelletError, PelletResult, UVec3, Vec3};

use crate::broad::PopulateStats;

/// Largest grid the builder will allocate.
const MAX_CELLS: u64 = 1 << 26;

/// One bucket: an occupancy count plus up to eight particle indices.
pub struct GridCell {
    count: AtomicU32,
    slots: [AtomicU32; CELL_CAPACITY],
}

impl GridCell {
    fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            slots: std::array::from_fn(|_| AtomicU32::new(EMPTY_SLOT)),
        }
    }

    /// Empties the bucket.
    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
        for slot in &self.slots {
            slot.store(EMPTY_SLOT, Ordering::Relaxed);
        }
    }

    /// Claims the next free slot for `particle`.
    ///
    /// Returns `false` without touching the bucket when it is full.
    pub fn try_insert(&self, particle: u32) -> bool {
        let claimed = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                ((count as usize) < CELL_CAPACITY).then_some(count + 1)
            });
        match claimed {
            Ok(slot) => {
                self.slots[slot as usize].store(particle, Ordering::Release);
                true
            }
            Err(_) => false,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        (self.count.load(Ordering::Acquire) as usize).min(CELL_CAPACITY)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Particle indices stored in this bucket, in slot order.
    pub fn occupants(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots[..self.len()]
            .iter()
            .map(|slot| slot.load(Ordering::Acquire))
            .filter(|&index| index != EMPTY_SLOT)
    }
}

/// Occupancy summary of the grid after a populate pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridOccupancy {
    /// Cells holding at least one particle.
    pub occupied_cells: usize,
    /// Fullest bucket.
    pub max_fill: usize,
    /// Sum of all bucket fills.
    pub total_entries: usize,
}

/// Axis-aligned uniform grid.
///
/// Cell `(x, y, z)` covers `origin + [x, x+1) * cell_size` on each axis and
/// is stored at flat index `x + dim_x * (y + dim_y * z)`.
pub struct UniformGrid {
    origin: Vec3,
    cell_size: f32,
    inv_cell_size: f32,
    dims: UVec3,
    cells: Vec<GridCell>,
}

impl UniformGrid {
    /// Creates a grid starting at `origin` covering at least `extent`.
    ///
    /// Each dimension is `ceil(extent / cell_size)` cells.
    pub fn new(origin: Vec3, extent: Vec3, cell_size: f32) -> PelletResult<Self> {
        let dims = Self::dims_for(extent, cell_size)?;
        if !origin.is_finite() {
            return Err(PelletError::InvalidConfig(format!(
                "grid origin must be finite, got {origin}"
            )));
        }

        let cell_count = dims.x as usize * dims.y as usize * dims.z as usize;
        let mut cells = Vec::with_capacity(cell_count);
        cells.resize_with(cell_count, GridCell::new);

        Ok(Self {
            origin,
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            dims,
            cells,
        })
    }

    /// Creates a grid of at least `extent` centred on `center`.
    ///
    /// The origin is `center - dims * cell_size / 2`, so the covered
    /// region is the rounded-up extent, symmetric about the centre.
    pub fn centered(center: Vec3, extent: Vec3, cell_size: f32) -> PelletResult<Self> {
        let dims = Self::dims_for(extent, cell_size)?;
        let half = dims.as_vec3() * cell_size * 0.5;
        Self::new(center - half, extent, cell_size)
    }

    /// Number of cells on each axis for `extent` at `cell_size`.
    pub fn dims_for(extent: Vec3, cell_size: f32) -> PelletResult<UVec3> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(PelletError::InvalidConfig(format!(
                "grid cell size must be positive, got {cell_size}"
            )));
        }
        if !(extent.is_finite() && extent.min_element() > 0.0) {
            return Err(PelletError::InvalidConfig(format!(
                "grid extent must be positive on every axis, got {extent}"
            )));
        }

        let cells = (extent / cell_size).ceil();
        let dims = UVec3::new(cells.x as u32, cells.y as u32, cells.z as u32);
        let total = dims.x as u64 * dims.y as u64 * dims.z as u64;
        if total > MAX_CELLS {
            return Err(PelletError::InvalidConfig(format!(
                "grid of {}x{}x{} cells exceeds the {MAX_CELLS} cell limit",
                dims.x, dims.y, dims.z
            )));
        }
        Ok(dims)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// World-space corner opposite the origin.
    pub fn max_corner(&self) -> Vec3 {
        self.origin + self.dims.as_vec3() * self.cell_size
    }

    /// Cell coordinate of `position`, or `None` outside the grid.
    pub fn cell_coord(&self, position: Vec3) -> Option<UVec3> {
        let c = ((position - self.origin) * self.inv_cell_size).floor();
        if !c.is_finite() || c.min_element() < 0.0 {
            return None;
        }
        let dims = self.dims.as_vec3();
        if c.x >= dims.x || c.y >= dims.y || c.z >= dims.z {
            return None;
        }
        Some(UVec3::new(c.x as u32, c.y as u32, c.z as u32))
    }

    /// Flat id of an in-bounds cell coordinate.
    #[inline]
    pub fn cell_id(&self, coord: UVec3) -> CellId {
        CellId(coord.x + self.dims.x * (coord.y + self.dims.y * coord.z))
    }

    pub fn cell(&self, id: CellId) -> &GridCell {
        &self.cells[id.index()]
    }

    /// The up-to-27 cells around `coord`, clamped at the grid boundary.
    pub fn neighborhood(&self, coord: UVec3) -> impl Iterator<Item = CellId> + '_ {
        let lo = coord.saturating_sub(UVec3::ONE);
        let hi = (coord + UVec3::ONE).min(self.dims - UVec3::ONE);
        (lo.z..=hi.z).flat_map(move |z| {
            (lo.y..=hi.y).flat_map(move |y| (lo.x..=hi.x).map(move |x| self.cell_id(UVec3::new(x, y, z))))
        })
    }

    /// Empties every bucket. One lane per cell.
    pub fn clear(&self, backend: &dyn ComputeBackend) {
        backend.dispatch(Kernel::ClearGrid, self.cells.len(), &|c| self.cells[c].clear());
    }

    /// Inserts every particle into its cell. One lane per particle.
    ///
    /// Particles outside the grid are skipped and particles landing in a
    /// full bucket are dropped; both are counted, neither is an error.
    /// Positions must already be validated to fit `u32` indices.
    pub fn populate(&self, backend: &dyn ComputeBackend, positions: &[Vec3]) -> PopulateStats {
        let inserted = AtomicU32::new(0);
        let dropped = AtomicU32::new(0);
        let out_of_bounds = AtomicU32::new(0);

        backend.dispatch(Kernel::PopulateGrid, positions.len(), &|i| {
            let counter = match self.cell_coord(positions[i]) {
                Some(coord) => {
                    if self.cell(self.cell_id(coord)).try_insert(i as u32) {
                        &inserted
                    } else {
                        &dropped
                    }
                }
                None => &out_of_bounds,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        });

        PopulateStats {
            inserted: inserted.into_inner(),
            dropped: dropped.into_inner(),
            out_of_bounds: out_of_bounds.into_inner(),
        }
    }

    /// Summarises bucket fill. Only meaningful after a populate pass.
    pub fn occupancy(&self) -> GridOccupancy {
        self.cells.iter().map(GridCell::len).filter(|&n| n > 0).fold(
            GridOccupancy::default(),
            |acc, n| GridOccupancy {
                occupied_cells: acc.occupied_cells + 1,
                max_fill: acc.max_fill.max(n),
                total_entries: acc.total_entries + n,
            },
        )
    }
}
