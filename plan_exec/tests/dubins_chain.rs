//! Dubins chain properties and mission planning through the public library interface.

use mission_if::{Command, DescriptionTable, LatLng};
use nalgebra::Vector2;
use plan_lib::{
    dubins::{
        self, path_length, split_runs, DubinsError, DubinsPlanningPoint, Endpoint, NoPathPolicy,
    },
    geo,
    mission::{Mission, MAIN},
    planner::{Planner, PlannerParams},
};

fn point(x: f64, y: f64, heading_deg: f64, radius_m: f64) -> DubinsPlanningPoint {
    DubinsPlanningPoint::new(Vector2::new(x, y), heading_deg, radius_m)
}

#[test]
fn degenerate_straight_path() -> Result<(), DubinsError> {
    let a = Endpoint::new(Vector2::new(0.0, 0.0), 0.0, 1.0);
    let b = Endpoint::new(Vector2::new(0.0, 10.0), 0.0, 1.0);

    let path = dubins::solve(&a, &b)?;

    assert!(path.turn_a.sweep_rad.abs() < 1e-9);
    assert!(path.turn_b.sweep_rad.abs() < 1e-9);
    assert!((path.straight.end - path.straight.start - Vector2::new(0.0, 10.0)).norm() < 1e-9);
    assert!((path_length(&path) - 10.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn chain_additivity() -> Result<(), DubinsError> {
    let p0 = point(0.0, 0.0, 45.0, 30.0);
    let p1 = point(300.0, 100.0, 120.0, 40.0);
    let p2 = point(500.0, -200.0, 200.0, 25.0);

    let whole = dubins::build(&[p0, p1, p2], NoPathPolicy::Abort)?;
    let first = dubins::build(&[p0, p1], NoPathPolicy::Abort)?;
    let second = dubins::build(&[p1, p2], NoPathPolicy::Abort)?;

    assert_eq!(whole.len(), 2);

    let whole_m: f64 = whole.iter().map(path_length).sum();
    let parts_m = path_length(&first[0]) + path_length(&second[0]);
    assert!((whole_m - parts_m).abs() < 1e-9);

    Ok(())
}

#[test]
fn partial_chain_on_skip() {
    // The middle pair is identical and cannot be joined
    let points = [
        point(0.0, -300.0, 0.0, 20.0),
        point(0.0, 0.0, 0.0, 20.0),
        point(0.0, 0.0, 0.0, 20.0),
        point(0.0, 300.0, 0.0, 20.0),
    ];

    let results = dubins::solve_pairs(&points);
    assert!(results[0].is_ok());
    assert_eq!(results[1], Err(DubinsError::NoPathFound { index: 1 }));
    assert!(results[2].is_ok());

    assert_eq!(
        dubins::build(&points, NoPathPolicy::Skip).map(|p| p.len()),
        Ok(2)
    );
    assert_eq!(
        dubins::build(&points, NoPathPolicy::Abort).map(|p| p.len()),
        Err(DubinsError::NoPathFound { index: 1 })
    );
}

#[test]
fn tunable_round_trip() -> Result<(), DubinsError> {
    let mut points = vec![
        point(0.0, 0.0, 0.0, 30.0),
        point(200.0, 0.0, 90.0, 30.0),
        point(400.0, 0.0, 90.0, 30.0),
    ];
    points[1].tunable = true;
    points[1].bounds.min_turn_radius_m = 25.0;

    let mut values = dubins::get_tunable_parameters(&points);
    assert_eq!(values, vec![90.0, 30.0]);

    // Push the values out of bounds then bring them back
    values[0] = 400.0;
    values[1] = 10.0;
    dubins::apply_bounds(&points, &mut values)?;
    assert!((values[0] - 40.0).abs() < 1e-9);
    assert_eq!(values[1], 25.0);

    dubins::set_tunable_parameters(&mut points, &values)?;
    assert!((points[1].heading_deg - 40.0).abs() < 1e-9);
    assert_eq!(points[1].radius_m, 25.0);

    assert_eq!(
        dubins::set_tunable_parameters(&mut points, &[1.0]),
        Err(DubinsError::ParameterCountMismatch {
            expected: 2,
            found: 1
        })
    );

    Ok(())
}

#[test]
fn plan_mission_runs() {
    let reference = LatLng::new(52.0, 0.5);
    let at = |x: f64, y: f64| geo::to_global(&reference, &Vector2::new(x, y));

    let a = at(0.0, 0.0);
    let b = at(0.0, 500.0);
    let c = at(500.0, 500.0);
    let d = at(500.0, 1000.0);
    let e = at(1000.0, 1000.0);

    // Two separate runs sharing the waypoint at c
    let mission = Mission::new(reference)
        .add_sub_mission(
            "Leg",
            vec![Command::dubins(b.lat_deg, b.lng_deg, 120.0, 90.0, 60.0, 0.0, true)],
        )
        .unwrap()
        .set(
            MAIN,
            vec![
                Command::takeoff(a.lat_deg, a.lng_deg, 50.0),
                Command::group("Leg"),
                Command::waypoint(c.lat_deg, c.lng_deg, 120.0),
                Command::dubins(d.lat_deg, d.lng_deg, 120.0, 90.0, 60.0, 0.0, false),
                Command::land(e.lat_deg, e.lng_deg, 0.0),
            ],
        );

    let dialect = DescriptionTable::builtin();
    let line = mission.main_line(MAIN, &dialect).unwrap();
    let runs = split_runs(&line);
    assert_eq!(runs.len(), 2);
    assert_eq!((runs[0].start, runs[0].run.len()), (0, 3));
    assert_eq!((runs[1].start, runs[1].run.len()), (2, 3));

    let planner = Planner::new(PlannerParams {
        velocity_ms: 18.0,
        max_bank_deg: 35.0,
        energy_constant: 2.0,
        no_path_policy: NoPathPolicy::Abort,
        default_passby_m: 0.0,
        max_radius_m: Some(200.0),
    });
    let planned = planner.plan(&mission, MAIN, &dialect).unwrap();

    assert_eq!(planned.len(), 2);
    assert!(planned.iter().all(|r| r.legs.len() == 2));
    assert!(planned.iter().all(|r| r.energy >= 2.0 * r.length_m));

    // The shared waypoint ends the first run and starts the second
    let end = planned[0].legs[1].local_path.end_point();
    let start = planned[1].legs[0].local_path.start_point();
    assert!((end - start).norm() < 1e-6);
    assert!((end - Vector2::new(500.0, 500.0)).norm() < 1e-6);

    // Geodetic paths come back to the same place
    let geo_end = planned[0].legs[1].geo_path.turn_b.center;
    let local_end = planned[0].legs[1].local_path.turn_b.center;
    assert!((geo::to_local(&reference, &geo_end) - local_end).norm() < 1e-6);
}

#[test]
fn demo_mission_plans() {
    let mission: Mission =
        serde_json::from_str(include_str!("../../demos/survey_mission.json")).unwrap();
    let params: PlannerParams = toml::from_str(include_str!("../../params/planner.toml")).unwrap();
    let extra: DescriptionTable =
        toml::from_str(include_str!("../../params/dialect_ardupilot.toml")).unwrap();
    let dialect = DescriptionTable::builtin().merge(extra);

    let runs = Planner::new(params).plan(&mission, MAIN, &dialect).unwrap();

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].start, 0);

    let ids: Vec<(usize, usize)> = runs[0].legs.iter().map(|l| (l.from_id, l.to_id)).collect();
    assert_eq!(ids, vec![(0, 1), (1, 3), (3, 4)]);
}
