use hexsettle::{
    engine::{EngineBuilder, EngineSettings},
    scenario::Scenario,
    spatial::TilePos,
    worker::CommuteState,
    world::WorldSnapshot,
};

const LANE: &str = "
name: lane
seed: 12
map:
  rows: [GGGGG]
stock:
  money: 1000
workers:
  relax_secs: 1
  work_secs: 2
  secs_per_step_cost: 1.0
placements:
  - { kind: sawmill, col: 4, row: 0 }
  - { kind: farmers_residence, col: 0, row: 0 }
";

fn run_lane(ticks: u64) -> Vec<WorldSnapshot> {
    let mut world = Scenario::from_yaml_str(LANE).unwrap().build_world().unwrap();
    let mut engine = EngineBuilder::new(EngineSettings {
        scenario_name: "lane".into(),
        snapshot_interval_ticks: 0,
        snapshot_dir: std::path::PathBuf::from("snapshots_commute_tests"),
    })
    .with_standard_systems()
    .build();
    let mut frames = Vec::new();
    engine
        .run_with_hook(&mut world, ticks, |snapshot| frames.push(snapshot))
        .unwrap();
    frames
}

#[test]
fn workers_walk_to_work_and_back_home() {
    let frames = run_lane(20);
    let track: Vec<(CommuteState, u32)> = frames
        .iter()
        .map(|f| (f.workers[0].commute, f.workers[0].col))
        .collect();

    assert_eq!(track[0], (CommuteState::CommuteToWork, 0));
    // one hop per second on grass: arrives at the sawmill on the sixth tick
    assert_eq!(track[5], (CommuteState::Work { elapsed: 0 }, 4));
    assert_eq!(track[7], (CommuteState::CommuteToHome, 4));
    assert_eq!(track[12], (CommuteState::Relax { elapsed: 0 }, 0));

    let cols: Vec<u32> = track[..6].iter().map(|(_, col)| *col).collect();
    assert_eq!(cols, vec![0, 0, 1, 2, 3, 4]);
}

#[test]
fn motion_is_reported_while_a_hop_is_in_flight() {
    let frames = run_lane(2);
    let motion = frames[1].workers[0].motion.expect("first hop started");
    assert_eq!(motion.duration, 1.0);
    assert!(motion.is_complete());
    assert_eq!(frames[1].workers[0].col, 0);
}

#[test]
fn unemployed_workers_stay_home() {
    let yaml = LANE.replace("  - { kind: sawmill, col: 4, row: 0 }\n", "");
    let mut world = Scenario::from_yaml_str(&yaml).unwrap().build_world().unwrap();
    let mut engine = EngineBuilder::new(EngineSettings {
        scenario_name: "lane".into(),
        snapshot_interval_ticks: 0,
        snapshot_dir: std::path::PathBuf::from("snapshots_commute_tests"),
    })
    .with_standard_systems()
    .build();
    engine.run(&mut world, 30).unwrap();
    let home = world.building_at(TilePos::new(0, 0)).unwrap().tile;
    assert!(world.workers().iter().all(|w| w.tile == home && w.motion.is_none()));
}
