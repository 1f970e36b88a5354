//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²) used by the reference configuration.
pub const GRAVITY: f32 = 9.8;

/// Default external frame delta (seconds). 1/60th of a second.
pub const DEFAULT_FRAME_DT: f32 = 1.0 / 60.0;

/// Number of integration sub-steps per external frame in the reference
/// configuration.
pub const DEFAULT_SUB_STEPS: u32 = 5;

/// Maximum number of particle indices stored in one grid cell.
pub const CELL_CAPACITY: usize = 8;

/// Cells visited per particle by the grid broad phase (3×3×3).
pub const NEIGHBORHOOD_CELLS: usize = 27;

/// Upper bound on grid candidates per particle.
pub const MAX_GRID_CANDIDATES: usize = NEIGHBORHOOD_CELLS * CELL_CAPACITY;

/// Marker stored in unused grid slots.
pub const EMPTY_SLOT: u32 = u32::MAX;

/// Distances below this are treated as coincident centres.
pub const DEGENERATE_DISTANCE: f32 = 1.0e-6;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-7;
