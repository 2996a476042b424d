//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info};

// Internal
use comms_if::{tc::Tc, tm::PlanTm};
use crate::{
    data_store::{DataStore, Nudge},
    grid_map::{Cell, GridMap},
    pose_ctrl::VelocityCmd,
    robot::Pose2,
    sim_loop::SimError,
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules. Issuing a goal
/// replaces the current one.
pub fn exec(ds: &mut DataStore, tc: &Tc) -> Result<(), SimError> {
    debug!("Recieved {:?} command", tc);

    // Handle different Tcs
    match tc {
        Tc::StartFollow => {
            let tour = ds.tour.clone();
            ds.pose_ctrl.follow(tour);
        }
        Tc::Goto { x_m, y_m, theta_rad } => {
            ds.pose_ctrl.goto(Pose2::new(*x_m, *y_m, *theta_rad));
        }
        Tc::GotoDefault => {
            ds.pose_ctrl.goto(ds.default_goal);
        }
        Tc::FollowWaypoints { waypoints } => {
            ds.pose_ctrl.follow(waypoints.iter().copied().map(Pose2::from).collect());
        }
        Tc::GotoCell { cell_x, cell_y, theta_rad } => {
            goto_cell(ds, (*cell_x, *cell_y), *theta_rad)?;
        }
        Tc::LiftRaise { duration_s } => {
            check_duration(*duration_s)?;
            ds.robot.lift_mut().raise(*duration_s);
        }
        Tc::LiftLower { duration_s } => {
            check_duration(*duration_s)?;
            ds.robot.lift_mut().lower(*duration_s);
        }
        Tc::LiftSet { angle_deg, duration_s } => {
            check_duration(*duration_s)?;
            if !angle_deg.is_finite() {
                return Err(SimError::InvalidTc(format!("lift angle {} deg", angle_deg)));
            }
            ds.robot.lift_mut().set_target(*angle_deg, *duration_s);
        }
        Tc::Nudge { speed_ms, turn_rate_rads, duration_s } => {
            if !speed_ms.is_finite() || !turn_rate_rads.is_finite() {
                return Err(SimError::InvalidTc(format!(
                    "nudge demand ({} m/s, {} rad/s)",
                    speed_ms, turn_rate_rads
                )));
            }
            if !(*duration_s > 0.0) || !duration_s.is_finite() {
                return Err(SimError::InvalidTc(format!("nudge duration {} s", duration_s)));
            }

            ds.nudge = Some(Nudge {
                cmd: VelocityCmd::new(*speed_ms, *turn_rate_rads),
                remaining_s: *duration_s,
            });
        }
        Tc::Stop => {
            ds.stop();
        }
        Tc::AddObstacle { cell_x, cell_y, theta_rad } => {
            map_mut(ds)?.add_obstacle((*cell_x, *cell_y), *theta_rad)?;
        }
        Tc::RemoveObstacle { cell_x, cell_y, theta_rad } => {
            map_mut(ds)?.remove_obstacle((*cell_x, *cell_y), *theta_rad)?;
        }
        Tc::ObstacleAhead => {
            let pose = ds.robot.pose();
            let map = map_mut(ds)?;
            let cell = robot_cell(map, &pose)?;
            map.add_obstacle(cell, pose.theta_rad)?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Plan from the robot's cell to the goal cell and follow the result.
///
/// The attempt is recorded in the data store's pending plans whether or not it
/// succeeds.
fn goto_cell(ds: &mut DataStore, goal: Cell, theta_rad: f64) -> Result<(), SimError> {
    let pose = ds.robot.pose();
    let planner = ds.planner;

    let map = map_mut(ds)?;
    let start = robot_cell(map, &pose)?;

    if !map.contains(goal) {
        return Err(SimError::InvalidTc(format!("goal cell {:?} is outside the map", goal)));
    }

    let num_removed = map.removed_walls().len();
    let path = map.replan_with(start, goal, planner);
    let num_restored_walls = num_removed - map.removed_walls().len();

    let waypoints = map.path_to_waypoints(&path, theta_rad);

    ds.pending_plans.push(PlanTm {
        planner: planner.to_string(),
        start,
        goal,
        path: path.clone(),
        waypoints: waypoints.clone(),
        num_restored_walls,
    });

    if path.is_empty() {
        error!("Cell {:?} cannot be reached from {:?}, stopping", goal, start);
        ds.stop();
        return Err(SimError::GoalUnreachable { start, goal });
    }

    info!(
        "Planned {} cell path from {:?} to {:?} ({} walls restored)",
        path.len(),
        start,
        goal,
        num_restored_walls
    );

    ds.pose_ctrl.follow(waypoints.into_iter().map(Pose2::from).collect());

    Ok(())
}

fn map_mut(ds: &mut DataStore) -> Result<&mut GridMap, SimError> {
    ds.map.as_mut().ok_or(SimError::NoMap)
}

fn robot_cell(map: &GridMap, pose: &Pose2) -> Result<Cell, SimError> {
    map.position_to_cell(pose.x_m, pose.y_m)
        .ok_or(SimError::RobotOffMap { x_m: pose.x_m, y_m: pose.y_m })
}

fn check_duration(duration_s: f64) -> Result<(), SimError> {
    if duration_s.is_finite() && duration_s >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTc(format!("duration {} s", duration_s)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid_map::Direction;

    fn ds_with_map() -> DataStore {
        let mut ds = DataStore::default();
        ds.map = Some(GridMap::new_open(3, 3, 40.0).unwrap());
        ds
    }

    #[test]
    fn test_obstacles() {
        let mut ds = ds_with_map();

        exec(&mut ds, &Tc::AddObstacle { cell_x: 1, cell_y: 1, theta_rad: 0.1 }).unwrap();
        let map = ds.map.as_ref().unwrap();
        assert!(!map.is_connected((1, 1), Direction::E));
        assert_eq!(map.removed_walls().len(), 1);

        exec(&mut ds, &Tc::RemoveObstacle { cell_x: 1, cell_y: 1, theta_rad: -0.1 }).unwrap();
        let map = ds.map.as_ref().unwrap();
        assert!(map.is_connected((1, 1), Direction::E));
        assert!(map.removed_walls().is_empty());

        assert!(matches!(
            exec(&mut ds, &Tc::AddObstacle { cell_x: 5, cell_y: 1, theta_rad: 0.0 }),
            Err(SimError::GridMap(_))
        ));
    }

    #[test]
    fn test_obstacle_ahead() {
        let mut ds = ds_with_map();

        // Default robot sits at the origin facing Y+
        exec(&mut ds, &Tc::ObstacleAhead).unwrap();
        let map = ds.map.as_ref().unwrap();
        assert!(!map.is_connected((0, 0), Direction::N));
        assert!(map.is_connected((0, 0), Direction::E));
    }

    #[test]
    fn test_invalid_commands() {
        let mut ds = DataStore::default();

        assert!(matches!(
            exec(&mut ds, &Tc::Nudge { speed_ms: 0.1, turn_rate_rads: 0.0, duration_s: 0.0 }),
            Err(SimError::InvalidTc(_))
        ));
        assert!(matches!(
            exec(&mut ds, &Tc::Nudge { speed_ms: f64::NAN, turn_rate_rads: 0.0, duration_s: 1.0 }),
            Err(SimError::InvalidTc(_))
        ));
        assert!(matches!(
            exec(&mut ds, &Tc::LiftRaise { duration_s: -1.0 }),
            Err(SimError::InvalidTc(_))
        ));
        assert!(ds.nudge.is_none());

        let mut ds = ds_with_map();
        assert!(matches!(
            exec(&mut ds, &Tc::GotoCell { cell_x: 3, cell_y: 0, theta_rad: 0.0 }),
            Err(SimError::InvalidTc(_))
        ));
    }

    #[test]
    fn test_goto_cell_restores_walls() {
        let mut ds = DataStore::default();
        let mut map = GridMap::new_open(3, 1, 40.0).unwrap();
        map.delete_connection((1, 0), Direction::E).unwrap();
        ds.map = Some(map);

        // Robot at the centre of the first cell
        ds.robot = crate::robot::RobotState::new(crate::robot::Params {
            initial_x_m: 0.2,
            initial_y_m: 0.2,
            ..Default::default()
        });

        exec(&mut ds, &Tc::GotoCell { cell_x: 2, cell_y: 0, theta_rad: 0.0 }).unwrap();

        let plans = ds.take_plans();
        assert_eq!(plans[0].path, vec![(0, 0), (1, 0), (2, 0)]);
        assert_eq!(plans[0].num_restored_walls, 1);
        assert_eq!(plans[0].planner, "greedy");
        assert!(ds.pose_ctrl.is_active());
    }

    #[test]
    fn test_robot_off_map() {
        let mut ds = ds_with_map();
        ds.robot = crate::robot::RobotState::new(crate::robot::Params {
            initial_x_m: -1.0,
            ..Default::default()
        });

        assert!(matches!(
            exec(&mut ds, &Tc::GotoCell { cell_x: 1, cell_y: 1, theta_rad: 0.0 }),
            Err(SimError::RobotOffMap { .. })
        ));
    }
}
