use proptest::prelude::*;
use tactics::pathfinding::step_distance;
use tactics::{GridPos, Pathfinder};

const SIZE: i32 = 10;

fn cell() -> impl Strategy<Value = GridPos> {
    (0..SIZE, 0..SIZE).prop_map(|(x, z)| GridPos::new(x, z))
}

fn walled(walls: &[GridPos]) -> Pathfinder {
    let mut pathfinder = Pathfinder::new(SIZE, SIZE, 2.0);
    for &wall in walls {
        pathfinder.set_walkable(wall, false);
    }
    pathfinder
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn open_grid_cost_is_octile_distance(start in cell(), goal in cell()) {
        let mut pathfinder = walled(&[]);
        let path = pathfinder.find_path(start, goal).expect("open grid is connected");
        prop_assert_eq!(path.cost, step_distance(start, goal));
    }

    #[test]
    fn paths_are_contiguous_and_avoid_walls(
        walls in prop::collection::vec(cell(), 0..30),
        start in cell(),
        goal in cell(),
    ) {
        let mut pathfinder = walled(&walls);
        prop_assume!(pathfinder.is_walkable(start));
        if let Some(path) = pathfinder.find_path(start, goal) {
            prop_assert_eq!(path.cells.first().copied(), Some(start));
            prop_assert_eq!(path.cells.last().copied(), Some(goal));
            let mut summed = 0;
            for pair in path.cells.windows(2) {
                let step = pair[1] - pair[0];
                prop_assert!(step.x.abs() <= 1 && step.z.abs() <= 1 && pair[0] != pair[1]);
                prop_assert!(pathfinder.is_walkable(pair[1]), "walked through {}", pair[1]);
                summed += step_distance(pair[0], pair[1]);
            }
            prop_assert_eq!(path.cost, summed);
        }
    }

    #[test]
    fn cost_is_symmetric(
        walls in prop::collection::vec(cell(), 0..30),
        start in cell(),
        goal in cell(),
    ) {
        let mut pathfinder = walled(&walls);
        prop_assume!(pathfinder.is_walkable(start) && pathfinder.is_walkable(goal));
        let there = pathfinder.path_cost(start, goal);
        let back = pathfinder.path_cost(goal, start);
        prop_assert_eq!(there, back);
    }

    #[test]
    fn repeated_queries_agree(
        walls in prop::collection::vec(cell(), 0..30),
        start in cell(),
        goal in cell(),
    ) {
        let mut pathfinder = walled(&walls);
        let first = pathfinder.find_path(start, goal);
        let second = pathfinder.find_path(start, goal);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn never_worse_than_an_open_detour(
        walls in prop::collection::vec(cell(), 0..30),
        start in cell(),
        goal in cell(),
    ) {
        let mut pathfinder = walled(&walls);
        prop_assume!(pathfinder.is_walkable(start));
        // Straight along x, then along z, when every cell on that route is open.
        let corner = GridPos::new(goal.x, start.z);
        let mut route = Vec::new();
        let step_x = (goal.x - start.x).signum();
        let step_z = (goal.z - start.z).signum();
        let mut cursor = start;
        while cursor != corner {
            cursor = cursor + GridPos::new(step_x, 0);
            route.push(cursor);
        }
        while cursor != goal {
            cursor = cursor + GridPos::new(0, step_z);
            route.push(cursor);
        }
        prop_assume!(route.iter().all(|&pos| pathfinder.is_walkable(pos)));

        let l_cost = 10 * (start.x.abs_diff(goal.x) + start.z.abs_diff(goal.z));
        let path = pathfinder.find_path(start, goal).expect("open route exists");
        prop_assert!(path.cost <= l_cost);
    }
}

#[test]
fn goal_out_of_bounds_has_no_path() {
    let mut pathfinder = walled(&[]);
    assert_eq!(pathfinder.find_path(GridPos::new(0, 0), GridPos::new(SIZE, 0)), None);
    assert_eq!(pathfinder.path_cost(GridPos::new(0, 0), GridPos::new(-1, 3)), 0);
}
