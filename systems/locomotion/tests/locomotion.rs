use std::time::Duration;

use cypher_town_core::{Command, DirectionalInput, Event, Facing, Point, Pose, Velocity};
use cypher_town_system_locomotion::{map_input, Locomotion};
use cypher_town_world::{self as world, query, BodyShape, CollisionGrid, PlayerSetup, TileMap, World};

const SPEED: f32 = 175.0;

fn all_inputs() -> impl Iterator<Item = DirectionalInput> {
    (0u8..16).map(|bits| {
        DirectionalInput::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0)
    })
}

#[test]
fn velocity_magnitude_is_zero_or_speed_for_every_key_combination() {
    for input in all_inputs() {
        let motion = map_input(input, Velocity::ZERO, SPEED);
        let magnitude = motion.velocity.magnitude();

        if input.is_idle() {
            assert_eq!(motion.velocity, Velocity::ZERO, "{input:?}");
        } else {
            assert!(
                (magnitude - SPEED).abs() < 1e-3,
                "{input:?} produced magnitude {magnitude}"
            );
        }
    }
}

#[test]
fn left_wins_over_right() {
    let motion = map_input(
        DirectionalInput::new(false, false, true, true),
        Velocity::ZERO,
        SPEED,
    );

    assert_eq!(motion.velocity, Velocity::new(-SPEED, 0.0));
    assert_eq!(motion.pose, Pose::Walking(Facing::Left));
}

#[test]
fn up_wins_over_down() {
    let motion = map_input(
        DirectionalInput::new(true, true, false, false),
        Velocity::ZERO,
        SPEED,
    );

    assert_eq!(motion.velocity, Velocity::new(0.0, -SPEED));
    assert_eq!(motion.pose, Pose::Walking(Facing::Up));
}

#[test]
fn all_four_keys_resolve_to_left_and_up() {
    let motion = map_input(
        DirectionalInput::new(true, true, true, true),
        Velocity::ZERO,
        SPEED,
    );

    assert!(motion.velocity.x() < 0.0);
    assert!(motion.velocity.y() < 0.0);
    assert!((motion.velocity.x() - motion.velocity.y()).abs() < 1e-3);
    assert_eq!(motion.pose, Pose::Walking(Facing::Left));
}

#[test]
fn idle_frame_follows_previous_velocity() {
    let cases = [
        (Velocity::new(-SPEED, 0.0), Pose::Idle(Facing::Left)),
        (Velocity::new(SPEED, 0.0), Pose::Idle(Facing::Right)),
        (Velocity::new(0.0, -SPEED), Pose::Idle(Facing::Up)),
        (Velocity::new(0.0, SPEED), Pose::Idle(Facing::Down)),
        (Velocity::new(-120.0, 120.0), Pose::Idle(Facing::Left)),
        (Velocity::new(120.0, -120.0), Pose::Idle(Facing::Right)),
        (Velocity::ZERO, Pose::Unchanged),
    ];

    for (previous, expected) in cases {
        let motion = map_input(DirectionalInput::NONE, previous, SPEED);
        assert_eq!(motion.pose, expected, "previous velocity {previous:?}");
        assert_eq!(motion.velocity, Velocity::ZERO);
    }
}

#[test]
fn releasing_keys_over_two_ticks_settles_on_unchanged() {
    let system = Locomotion::new(SPEED).expect("valid speed");

    let walking = system.step(DirectionalInput::new(false, true, false, false), Velocity::ZERO);
    let first_idle = system.step(DirectionalInput::NONE, walking.velocity);
    let second_idle = system.step(DirectionalInput::NONE, first_idle.velocity);

    assert_eq!(walking.pose, Pose::Walking(Facing::Down));
    assert_eq!(first_idle.pose, Pose::Idle(Facing::Down));
    assert_eq!(second_idle.pose, Pose::Unchanged);
}

const OPEN_MAP: &str = r#"
{
  "width": 20, "height": 20, "tilewidth": 32, "tileheight": 32,
  "layers": [],
  "tilesets": []
}
"#;

fn open_world() -> World {
    let map = TileMap::from_json(OPEN_MAP).expect("map parses");
    let collision = CollisionGrid::new(20, 20, 32.0, 32.0);
    World::new(
        map,
        collision,
        PlayerSetup {
            position: Point::new(320.0, 320.0),
            display_size: (96.0, 120.0),
            body: BodyShape::scaled((15.0, 33.0), (20.0, 12.0), 2.0),
        },
    )
}

fn run_tick(world: &mut World, system: &Locomotion, input: DirectionalInput) -> Vec<Event> {
    let mut commands = Vec::new();
    system.handle(input, query::player_velocity(world), &mut commands);
    commands.push(Command::Tick {
        dt: Duration::from_millis(20),
    });

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn world_replay_walks_and_idles_deterministically() {
    let script = [
        DirectionalInput::new(false, false, false, true),
        DirectionalInput::new(false, false, false, true),
        DirectionalInput::new(false, true, false, true),
        DirectionalInput::NONE,
        DirectionalInput::NONE,
    ];

    let replay = || {
        let mut world = open_world();
        let system = Locomotion::default();
        let mut poses = Vec::new();
        for input in script {
            let _ = run_tick(&mut world, &system, input);
            poses.push(query::player(&world).pose);
        }
        (query::player(&world).position, poses)
    };

    let (first_position, first_poses) = replay();
    let (second_position, second_poses) = replay();

    assert_eq!(first_position, second_position);
    assert_eq!(first_poses, second_poses);
    assert_eq!(
        first_poses,
        vec![
            Pose::Walking(Facing::Right),
            Pose::Walking(Facing::Right),
            Pose::Walking(Facing::Right),
            Pose::Idle(Facing::Right),
            Pose::Unchanged,
        ]
    );
    assert!(first_position.x > 320.0);
    assert!(first_position.y > 320.0);
}

#[test]
fn unchanged_pose_after_rest_emits_no_pose_event() {
    let mut world = open_world();
    let system = Locomotion::default();

    let events = run_tick(&mut world, &system, DirectionalInput::NONE);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PlayerPoseChanged { .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PlayerMoved { .. })));
}
