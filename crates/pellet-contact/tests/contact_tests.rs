//! Integration tests for pellet-contact.

use pellet_compute::{ComputeBackend, ParticleBuffer, RayonBackend, SerialBackend};
use pellet_contact::broad::{BroadPhase, BroadPhaseKind, PopulateStats};
use pellet_contact::brute_force::BruteForceBroadPhase;
use pellet_contact::grid::UniformGrid;
use pellet_contact::response::ContactModel;
use pellet_contact::uniform_grid::UniformGridBroadPhase;
use pellet_contact::walls::BoxWalls;
use pellet_types::{UVec3, Vec3};
use proptest::prelude::*;

fn model(diameter: f32) -> ContactModel {
    let radius = diameter * 0.5;
    ContactModel {
        radius,
        spring: 100.0,
        damping: 1.0,
        friction: 0.5,
        tangential: 2.0,
        particle_mass: 1.0,
        gravity: 0.0,
        linear_force_scalar: 1.0,
        walls: BoxWalls::new(50.0, radius),
    }
}

fn grid_phase(diameter: f32, extent: f32) -> UniformGridBroadPhase {
    let grid = UniformGrid::centered(Vec3::ZERO, Vec3::splat(extent), diameter).unwrap();
    UniformGridBroadPhase::new(grid)
}

// ─── Contact Response ─────────────────────────────────────────

#[test]
fn overlapping_pair_repels() {
    let m = model(1.0);
    let pos = [Vec3::ZERO, Vec3::new(0.9, 0.0, 0.0)];
    let vel = [Vec3::ZERO; 2];

    let contact = m.pair_contact(0, 1, &pos, &vel).unwrap();
    assert!((contact.overlap - 0.1).abs() < 1e-6);
    assert!((contact.normal_force - 10.0).abs() < 1e-4);
    assert!(contact.is_repulsive());

    let on_a = m.pair_force(0, 1, &pos, &vel);
    let on_b = m.pair_force(1, 0, &pos, &vel);
    assert!((on_a - Vec3::new(-10.0, 0.0, 0.0)).length() < 1e-4);
    assert!((on_a + on_b).length() < 1e-5);
}

#[test]
fn separated_or_touching_pair_has_no_contact() {
    let m = model(1.0);
    let vel = [Vec3::ZERO; 2];
    assert!(m.pair_contact(0, 1, &[Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0)], &vel).is_none());
    assert!(m.pair_contact(0, 1, &[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)], &vel).is_none());
    assert_eq!(m.pair_force(0, 1, &[Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)], &vel), Vec3::ZERO);
}

#[test]
fn coincident_centres_push_apart() {
    let m = model(1.0);
    let pos = [Vec3::ONE, Vec3::ONE];
    let vel = [Vec3::ZERO; 2];

    let on_a = m.pair_force(0, 1, &pos, &vel);
    let on_b = m.pair_force(1, 0, &pos, &vel);
    assert!(on_a.is_finite() && on_b.is_finite());
    assert!(on_a.y < 0.0);
    assert!(on_b.y > 0.0);
}

#[test]
fn approach_velocity_stiffens_contact() {
    let m = model(1.0);
    let pos = [Vec3::ZERO, Vec3::new(0.9, 0.0, 0.0)];
    let at_rest = m.pair_contact(0, 1, &pos, &[Vec3::ZERO; 2]).unwrap();
    let closing = m
        .pair_contact(0, 1, &pos, &[Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)])
        .unwrap();
    let opening = m
        .pair_contact(0, 1, &pos, &[Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)])
        .unwrap();
    assert!(closing.normal_force > at_rest.normal_force);
    assert!(opening.normal_force < at_rest.normal_force);
}

#[test]
fn friction_drags_a_along_b_and_is_clamped() {
    let mut m = model(1.0);
    m.tangential = 1000.0;
    m.friction = 0.3;
    let pos = [Vec3::ZERO, Vec3::new(0.9, 0.0, 0.0)];
    let vel = [Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)];

    let contact = m.pair_contact(0, 1, &pos, &vel).unwrap();
    assert!(contact.tangential_force.z > 0.0);
    assert!(contact.tangential_force.x.abs() < 1e-6);
    let limit = m.friction * contact.normal_force.abs();
    assert!(contact.tangential_force.length() <= limit + 1e-4);
}

#[test]
fn friction_opposes_each_particles_own_slip() {
    let m = model(1.0);
    let pos = [Vec3::ZERO, Vec3::new(0.9, 0.0, 0.0)];
    let vel = [Vec3::new(0.0, 0.0, 1.5), Vec3::new(0.0, 0.5, -1.0)];

    for (i, j) in [(0, 1), (1, 0)] {
        let contact = m.pair_contact(i, j, &pos, &vel).unwrap();
        let slip = vel[i] - vel[j];
        assert!(
            contact.tangential_force.dot(slip) < 0.0,
            "friction on {i} does work {} on its slip",
            contact.tangential_force.dot(slip)
        );
    }
}

#[test]
fn friction_below_limit_is_viscous() {
    let mut m = model(1.0);
    m.tangential = 0.5;
    m.friction = 10.0;
    let pos = [Vec3::ZERO, Vec3::new(0.9, 0.0, 0.0)];
    let vel = [Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)];
    let contact = m.pair_contact(0, 1, &pos, &vel).unwrap();
    assert!((contact.tangential_force.y - 0.5).abs() < 1e-5);
}

// ─── Walls & Body Forces ──────────────────────────────────────

#[test]
fn walls_limits() {
    let walls = BoxWalls::new(2.5, 0.1);
    assert!((walls.limit_xz - 2.4).abs() < 1e-6);
    assert!((walls.floor_y + 2.4).abs() < 1e-6);
    assert!(walls.contains(Vec3::ZERO));
    // Open top.
    assert!(walls.contains(Vec3::new(0.0, 100.0, 0.0)));
    assert!((walls.violation(Vec3::new(2.5, 0.0, 0.0)) - 0.1).abs() < 1e-5);
}

#[test]
fn wall_pushes_particle_back_inside() {
    let m = model(0.2);
    let limit = m.walls.limit_xz;

    let f = m.wall_force(Vec3::new(limit + 0.05, 0.0, 0.0), Vec3::ZERO);
    assert!(f.x < 0.0);
    let f = m.wall_force(Vec3::new(0.0, 0.0, -limit - 0.05), Vec3::ZERO);
    assert!(f.z > 0.0);
    let f = m.wall_force(Vec3::new(0.0, m.walls.floor_y - 0.05, 0.0), Vec3::ZERO);
    assert!(f.y > 0.0);
    assert!((f.y - m.spring * 0.05).abs() < 1e-3);

    assert_eq!(m.wall_force(Vec3::ZERO, Vec3::new(3.0, -1.0, 0.0)), Vec3::ZERO);
}

#[test]
fn corner_penetration_hits_two_walls() {
    let m = model(0.2);
    let l = m.walls.limit_xz;
    let contacts: Vec<_> = m
        .wall_contacts(Vec3::new(l + 0.01, 0.0, l + 0.01), Vec3::ZERO)
        .collect();
    assert_eq!(contacts.len(), 2);
}

#[test]
fn floor_damping_resists_impact() {
    let m = model(0.2);
    let below = Vec3::new(0.0, m.walls.floor_y - 0.01, 0.0);
    let falling = m.wall_force(below, Vec3::new(0.0, -5.0, 0.0));
    let rising = m.wall_force(below, Vec3::new(0.0, 5.0, 0.0));
    assert!(falling.y > rising.y);
}

#[test]
fn gravity_and_scaling() {
    let mut m = model(1.0);
    m.gravity = 9.8;
    m.particle_mass = 2.0;
    m.linear_force_scalar = 0.5;
    assert!((m.gravity_force() - Vec3::new(0.0, -19.6, 0.0)).length() < 1e-5);
    assert_eq!(m.scale(Vec3::new(2.0, 4.0, 6.0)), Vec3::new(1.0, 2.0, 3.0));
}

// ─── Uniform Grid ─────────────────────────────────────────────

#[test]
fn grid_dims_round_up() {
    let dims = UniformGrid::dims_for(Vec3::new(5.0, 5.0, 5.0), 0.25).unwrap();
    assert_eq!(dims, UVec3::splat(20));
    let dims = UniformGrid::dims_for(Vec3::new(1.0, 0.5, 0.25), 0.3).unwrap();
    assert_eq!(dims, UVec3::new(4, 2, 1));
}

#[test]
fn grid_rejects_degenerate_configuration() {
    assert!(UniformGrid::new(Vec3::ZERO, Vec3::ZERO, 0.2).is_err());
    assert!(UniformGrid::new(Vec3::ZERO, Vec3::ONE, 0.0).is_err());
    assert!(UniformGrid::new(Vec3::ZERO, Vec3::ONE, -1.0).is_err());
    assert!(UniformGrid::new(Vec3::ZERO, Vec3::new(1.0, -1.0, 1.0), 0.2).is_err());
    assert!(UniformGrid::new(Vec3::ZERO, Vec3::splat(1.0e6), 0.001).is_err());
}

#[test]
fn centered_grid_is_symmetric() {
    let grid = UniformGrid::centered(Vec3::ZERO, Vec3::splat(4.0), 1.0).unwrap();
    assert_eq!(grid.origin(), Vec3::splat(-2.0));
    assert_eq!(grid.max_corner(), Vec3::splat(2.0));
    assert_eq!(grid.cell_count(), 64);
}

#[test]
fn cell_coord_bounds() {
    let grid = UniformGrid::new(Vec3::ZERO, Vec3::splat(2.0), 1.0).unwrap();
    assert_eq!(grid.cell_coord(Vec3::new(0.5, 1.5, 0.0)), Some(UVec3::new(0, 1, 0)));
    assert_eq!(grid.cell_coord(Vec3::new(-0.01, 0.5, 0.5)), None);
    assert_eq!(grid.cell_coord(Vec3::new(0.5, 2.0, 0.5)), None);
    assert_eq!(grid.cell_coord(Vec3::new(f32::NAN, 0.5, 0.5)), None);
}

#[test]
fn neighborhood_is_clamped() {
    let grid = UniformGrid::new(Vec3::ZERO, Vec3::splat(5.0), 1.0).unwrap();
    assert_eq!(grid.neighborhood(UVec3::new(2, 2, 2)).count(), 27);
    assert_eq!(grid.neighborhood(UVec3::ZERO).count(), 8);
    assert_eq!(grid.neighborhood(UVec3::new(4, 2, 0)).count(), 12);
}

#[test]
fn bucket_capacity_is_eight() {
    let grid = UniformGrid::new(Vec3::ZERO, Vec3::ONE, 1.0).unwrap();
    let cell = grid.cell(grid.cell_id(UVec3::ZERO));
    for i in 0..8 {
        assert!(cell.try_insert(i));
    }
    assert!(!cell.try_insert(8));
    assert_eq!(cell.len(), 8);
    assert_eq!(cell.occupants().collect::<Vec<_>>(), (0..8).collect::<Vec<_>>());

    cell.clear();
    assert!(cell.is_empty());
    assert_eq!(cell.occupants().count(), 0);
}

#[test]
fn populate_counts_overflow_and_escapes() {
    let backend = SerialBackend::new();
    let grid = UniformGrid::new(Vec3::ZERO, Vec3::splat(2.0), 1.0).unwrap();

    let mut positions = vec![Vec3::splat(0.5); 9];
    positions.push(Vec3::splat(1.5));
    positions.push(Vec3::splat(-3.0));

    grid.clear(&backend);
    let stats = grid.populate(&backend, &positions);
    assert_eq!(
        stats,
        PopulateStats {
            inserted: 9,
            dropped: 1,
            out_of_bounds: 1,
        }
    );
    assert!(!stats.is_complete());

    let occupancy = grid.occupancy();
    assert_eq!(occupancy.occupied_cells, 2);
    assert_eq!(occupancy.max_fill, 8);
    assert_eq!(occupancy.total_entries, 9);
}

#[test]
fn parallel_populate_never_overfills() {
    let backend = RayonBackend::with_threads(4).unwrap();
    let grid = UniformGrid::new(Vec3::ZERO, Vec3::ONE, 1.0).unwrap();
    let positions = vec![Vec3::splat(0.5); 1000];

    grid.clear(&backend);
    let stats = grid.populate(&backend, &positions);
    assert_eq!(stats.inserted, 8);
    assert_eq!(stats.dropped, 992);

    let mut occupants: Vec<u32> = grid.cell(grid.cell_id(UVec3::ZERO)).occupants().collect();
    occupants.sort_unstable();
    occupants.dedup();
    assert_eq!(occupants.len(), 8);
}

#[test]
fn repopulating_forgets_previous_sub_step() {
    let backend = SerialBackend::new();
    let mut phase = grid_phase(1.0, 4.0);
    let mut particles = ParticleBuffer::from_positions(vec![Vec3::new(0.5, 0.5, 0.5); 8]);
    phase.prepare(&backend, &particles);
    assert_eq!(phase.occupancy().max_fill, 8);

    particles.set_position(0, Vec3::new(-1.5, -1.5, -1.5));
    phase.prepare(&backend, &particles);
    assert_eq!(phase.occupancy().max_fill, 7);
    assert_eq!(phase.occupancy().total_entries, 8);
}

// ─── Broad Phase Strategies ───────────────────────────────────

#[test]
fn strategy_names() {
    assert_eq!(BruteForceBroadPhase::new().name(), "brute_force");
    assert_eq!(grid_phase(1.0, 2.0).name(), "uniform_grid");
    assert_eq!(BroadPhaseKind::default(), BroadPhaseKind::UniformGrid);
    assert_eq!(serde_json::to_string(&BroadPhaseKind::BruteForce).unwrap(), "\"brute_force\"");
}

#[test]
fn grid_candidates_are_sorted_and_exclude_self() {
    let backend = SerialBackend::new();
    let mut phase = grid_phase(1.0, 6.0);
    let positions = vec![
        Vec3::new(0.1, 0.1, 0.1),
        Vec3::new(2.5, 2.5, 2.5),
        Vec3::new(0.4, 0.2, 0.1),
        Vec3::new(-0.6, 0.1, 0.1),
        Vec3::new(0.2, 0.3, 0.4),
    ];
    let particles = ParticleBuffer::from_positions(positions.clone());
    phase.prepare(&backend, &particles);

    let mut seen = Vec::new();
    phase.for_each_candidate(0, &positions, &mut |j| seen.push(j));
    assert_eq!(seen, vec![2, 3, 4]);
}

#[test]
fn particle_outside_grid_has_no_grid_partners() {
    let backend = SerialBackend::new();
    let mut phase = grid_phase(1.0, 2.0);
    let positions = vec![Vec3::new(5.0, 0.0, 0.0), Vec3::new(5.5, 0.0, 0.0)];
    let particles = ParticleBuffer::from_positions(positions.clone());
    let stats = phase.prepare(&backend, &particles);
    assert_eq!(stats.out_of_bounds, 2);

    let mut seen = 0;
    phase.for_each_candidate(0, &positions, &mut |_| seen += 1);
    assert_eq!(seen, 0);
    // Brute force still sees the pair.
    assert_eq!(BruteForceBroadPhase.contact_pairs(&model(1.0), &positions).len(), 1);
}

#[test]
fn grid_and_brute_force_forces_match_exactly() {
    let backend = SerialBackend::new();
    let m = model(0.2);
    let positions: Vec<Vec3> = (0..200)
        .map(|i| {
            let t = i as f32;
            Vec3::new((t * 0.37).sin(), (t * 0.11).cos(), (t * 0.53).sin()) * 0.9
        })
        .collect();
    let velocities: Vec<Vec3> = (0..200).map(|i| Vec3::new(0.0, (i % 7) as f32 * 0.1, 0.0)).collect();

    let mut grid_particles = ParticleBuffer::from_states(positions.clone(), velocities.clone()).unwrap();
    let mut brute_particles = ParticleBuffer::from_states(positions, velocities).unwrap();

    let mut grid = grid_phase(0.2, 2.0);
    let stats = grid.prepare(&backend, &grid_particles);
    assert!(stats.is_complete());
    grid.detect_and_respond(&backend, &m, &mut grid_particles);

    let mut brute = BruteForceBroadPhase::new();
    brute.prepare(&backend, &brute_particles);
    brute.detect_and_respond(&backend, &m, &mut brute_particles);

    assert!(grid_particles.forces().iter().any(|f| *f != Vec3::ZERO));
    assert_eq!(grid_particles.forces(), brute_particles.forces());
}

#[test]
fn serial_and_parallel_detection_match() {
    let m = model(0.2);
    let positions: Vec<Vec3> = (0..300)
        .map(|i| {
            let t = i as f32;
            Vec3::new((t * 0.71).sin(), (t * 0.29).sin(), (t * 0.13).cos()) * 0.8
        })
        .collect();
    let run = |backend: &dyn ComputeBackend| {
        let mut particles = ParticleBuffer::from_positions(positions.clone());
        let mut phase = grid_phase(0.2, 2.0);
        assert!(phase.prepare(backend, &particles).is_complete());
        phase.detect_and_respond(backend, &m, &mut particles);
        particles
    };
    let serial = run(&SerialBackend::new());
    let parallel = run(&RayonBackend::with_threads(4).unwrap());
    assert_eq!(serial, parallel);
}

#[test]
fn detection_scales_by_linear_force_scalar() {
    let backend = SerialBackend::new();
    let mut m = model(1.0);
    m.linear_force_scalar = 2.0;
    let mut particles = ParticleBuffer::from_positions(vec![Vec3::ZERO, Vec3::new(0.9, 0.0, 0.0)]);
    BruteForceBroadPhase.detect_and_respond(&backend, &m, &mut particles);
    assert!((particles.forces()[0].x + 20.0).abs() < 1e-3);
    assert!((particles.forces()[1].x - 20.0).abs() < 1e-3);
}

#[test]
fn overflowing_cell_hides_pairs_from_grid() {
    let backend = SerialBackend::new();
    let m = model(1.0);
    let positions: Vec<Vec3> = (0..10).map(|i| Vec3::splat(0.3 + i as f32 * 0.01)).collect();
    let particles = ParticleBuffer::from_positions(positions.clone());

    let mut grid = grid_phase(1.0, 4.0);
    let stats = grid.prepare(&backend, &particles);
    assert_eq!(stats.dropped, 2);

    let grid_pairs = grid.contact_pairs(&m, &positions);
    let brute_pairs = BruteForceBroadPhase.contact_pairs(&m, &positions);
    assert_eq!(brute_pairs.len(), 45);
    assert!(grid_pairs.len() < brute_pairs.len());
    assert!(grid_pairs.iter().all(|pair| brute_pairs.contains(pair)));
}

// ─── Equivalence Property ─────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grid_finds_the_same_pairs_as_brute_force(
        raw in prop::collection::vec((-1.1f32..1.1, -1.1f32..1.1, -1.1f32..1.1), 2..120)
    ) {
        let backend = SerialBackend::new();
        let m = model(0.2);
        let positions: Vec<Vec3> = raw.into_iter().map(|(x, y, z)| Vec3::new(x, y, z)).collect();
        let particles = ParticleBuffer::from_positions(positions.clone());

        let mut grid = grid_phase(0.2, 2.4);
        let stats = grid.prepare(&backend, &particles);
        prop_assume!(stats.is_complete());

        let grid_pairs = grid.contact_pairs(&m, &positions);
        let brute_pairs = BruteForceBroadPhase.contact_pairs(&m, &positions);
        prop_assert_eq!(grid_pairs, brute_pairs);
    }
}
