use hexsettle::{
    building::{BuildingKind, ProductionStatus},
    engine::{EngineBuilder, EngineSettings},
    ledger::ResourceKind,
    scenario::Scenario,
    spatial::TilePos,
    world::World,
};

const WORKSHOP: &str = "
name: workshop
seed: 1
map:
  rows: [GGG, GGG]
stock:
  money: 1000
economy:
  income: 0
catalogue:
  sawmill:
    cost_money: 0
    cost_planks: 0
    upkeep: 60
    buildable_on: [grass]
    interval_secs: 10
    capacity: 1
    role: production
    output: planks
    output_count: 2
placements:
  - { kind: sawmill, col: 1, row: 0 }
";

fn build_engine() -> hexsettle::Engine {
    let settings = EngineSettings {
        scenario_name: "economy_tests".into(),
        snapshot_interval_ticks: 0,
        snapshot_dir: std::path::PathBuf::from("snapshots_economy_tests"),
    };
    EngineBuilder::new(settings).with_standard_systems().build()
}

fn workshop(stock_money: f64) -> World {
    let mut world = Scenario::from_yaml_str(WORKSHOP).unwrap().build_world().unwrap();
    world.ledger_mut().set(ResourceKind::Money, stock_money);
    world
}

#[test]
fn ten_seconds_of_upkeep_buy_one_batch_of_planks() {
    let mut world = workshop(1000.0);
    let mut engine = build_engine();
    engine.run(&mut world, 10).unwrap();

    assert_eq!(world.ledger().amount(ResourceKind::Money), 990.0);
    assert_eq!(world.ledger().amount(ResourceKind::Planks), 2.0);
    let sawmill = world.building_at(TilePos::new(1, 0)).unwrap();
    assert_eq!(sawmill.progress, 0.0);
    assert_eq!(sawmill.status, ProductionStatus::Producing);
}

#[test]
fn broke_building_idles_without_progress() {
    let mut world = workshop(0.0);
    let mut engine = build_engine();
    engine.run(&mut world, 30).unwrap();

    let sawmill = world.building_at(TilePos::new(1, 0)).unwrap();
    assert_eq!(sawmill.progress, 0.0);
    assert_eq!(sawmill.status, ProductionStatus::AwaitingUpkeep);
    assert_eq!(world.ledger().amount(ResourceKind::Planks), 0.0);
    assert_eq!(world.ledger().amount(ResourceKind::Money), 0.0);
}

#[test]
fn unstaffed_workforce_building_never_consumes_inputs() {
    let yaml = "
name: idle_mill
seed: 3
map:
  rows: [GGG]
stock:
  money: 500
  wood: 10
placements:
  - { kind: sawmill, col: 1, row: 0 }
";
    let mut world = Scenario::from_yaml_str(yaml).unwrap().build_world().unwrap();
    let mut engine = build_engine();
    engine.run(&mut world, 120).unwrap();

    let sawmill = world.building_at(TilePos::new(1, 0)).unwrap();
    assert_eq!(sawmill.efficiency, 0.0);
    assert_eq!(world.ledger().amount(ResourceKind::Wood), 10.0);
    assert_eq!(world.ledger().amount(ResourceKind::Planks), 0.0);
}

#[test]
fn staffed_sawmill_turns_wood_into_planks() {
    let yaml = "
name: staffed_mill
seed: 4
map:
  rows: [GGGG]
stock:
  money: 500
  wood: 3
placements:
  - { kind: sawmill, col: 1, row: 0 }
  - { kind: farmers_residence, col: 2, row: 0 }
";
    let mut world = Scenario::from_yaml_str(yaml).unwrap().build_world().unwrap();
    assert_eq!(world.employed_count(), 2);
    let mut engine = build_engine();
    // two fully happy workers keep the mill at full speed until the first
    // economy cycle at 30s; the first batch is due at 15s
    engine.run(&mut world, 15).unwrap();
    assert_eq!(world.ledger().amount(ResourceKind::Wood), 2.0);
    assert_eq!(world.ledger().amount(ResourceKind::Planks), 2.0);
}

#[test]
fn placing_charges_the_ledger_and_demolishing_frees_the_tile() {
    let mut world = workshop(1000.0);
    world.ledger_mut().set(ResourceKind::Planks, 2.0);

    assert!(world.can_place(TilePos::new(0, 1), BuildingKind::PotatoFarm));
    world.place_building(TilePos::new(0, 1), BuildingKind::PotatoFarm).unwrap();
    assert_eq!(world.ledger().amount(ResourceKind::Money), 900.0);
    assert_eq!(world.ledger().amount(ResourceKind::Planks), 0.0);
    assert!(!world.can_place(TilePos::new(2, 1), BuildingKind::PotatoFarm));

    world.demolish(TilePos::new(0, 1)).unwrap();
    assert!(world.building_at(TilePos::new(0, 1)).is_none());
    assert_eq!(world.market().job_count(), 1);
}
