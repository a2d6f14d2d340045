//! Tallest-stack metric.

use stackwise_core::Pose;

/// Computes the height, in bodies, of the tallest contiguous stack.
///
/// Bodies are sorted by ascending vertical position and greedily clustered
/// into columns: each body joins the *first* existing column (in creation
/// order) whose topmost body is strictly below it and within
/// `proximity` of it in the ground plane, otherwise it starts a new column.
/// The result is the size of the largest column; an empty input yields 0.
///
/// This is a greedy single-pass approximation of physical stacking, not a
/// contact check: a body may be steered into the first qualifying column
/// even when a nearer one exists, and an intervening body in height order
/// can split a true column. The first-match policy is intentional and must
/// be preserved for output parity.
pub fn tallest_stack(poses: &[Pose], proximity: f64) -> usize {
    if poses.is_empty() {
        return 0;
    }

    let mut order: Vec<usize> = (0..poses.len()).collect();
    order.sort_by(|&a, &b| {
        poses[a]
            .position
            .y
            .partial_cmp(&poses[b].position.y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut columns: Vec<Vec<usize>> = Vec::new();
    for &index in &order {
        let pose = &poses[index];
        let mut placed = false;
        for column in &mut columns {
            let Some(&top_index) = column.last() else {
                continue;
            };
            let top = &poses[top_index];
            if pose.position.y > top.position.y && pose.ground_distance(top) < proximity {
                column.push(index);
                placed = true;
                break;
            }
        }
        if !placed {
            columns.push(vec![index]);
        }
    }

    columns.iter().map(Vec::len).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn pose(x: f64, y: f64, z: f64) -> Pose {
        Pose::at(Point3::new(x, y, z))
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(tallest_stack(&[], 0.8), 0);
    }

    #[test]
    fn test_single_body() {
        assert_eq!(tallest_stack(&[pose(0.0, 0.5, 0.0)], 0.8), 1);
    }

    #[test]
    fn test_aligned_tower() {
        let poses = [
            pose(0.0, 0.5, 0.0),
            pose(0.05, 1.5, 0.0),
            pose(-0.1, 2.5, 0.05),
        ];
        assert_eq!(tallest_stack(&poses, 0.8), 3);
    }

    #[test]
    fn test_distant_bodies_form_separate_columns() {
        let poses = [
            pose(0.0, 0.5, 0.0),
            pose(5.0, 1.5, 0.0),
            pose(10.0, 2.5, 0.0),
        ];
        assert_eq!(tallest_stack(&poses, 0.8), 1);
    }

    #[test]
    fn test_two_towers_reports_taller() {
        let poses = [
            // Tower A, 2 high.
            pose(0.0, 0.5, 0.0),
            pose(0.0, 1.5, 0.0),
            // Tower B, 3 high.
            pose(5.0, 0.5, 0.0),
            pose(5.0, 1.5, 0.0),
            pose(5.0, 2.5, 0.0),
        ];
        assert_eq!(tallest_stack(&poses, 0.8), 3);
    }

    #[test]
    fn test_equal_heights_do_not_stack() {
        // Strictly-below test: a body never joins a column whose top is at
        // its own height.
        let poses = [pose(0.0, 0.5, 0.0), pose(0.1, 0.5, 0.0)];
        assert_eq!(tallest_stack(&poses, 0.8), 1);
    }

    #[test]
    fn test_first_match_beats_nearest_match() {
        // Two lower bodies out of proximity of each other, both within
        // proximity of the upper body, which is much nearer to the second.
        // Greedy first-match still appends the upper body to the column
        // created first.
        let lower_far = pose(0.7, 0.5, 0.0); // column 0 (lowest y first)
        let lower_near = pose(-0.1, 0.6, 0.0); // column 1, 0.8 away from far
        let upper = pose(0.0, 1.5, 0.0);
        let poses = [lower_far, lower_near, upper];
        // upper joins column 0 (first match), not the nearer column 1.
        assert_eq!(tallest_stack(&poses, 0.8), 2);

        // A follow-up body directly above lower_far chains off column 0's
        // new top, giving [far, upper, chained] = 3.
        let chained = pose(0.7, 2.5, 0.0);
        let poses_ext = [poses[0], poses[1], poses[2], chained];
        assert_eq!(tallest_stack(&poses_ext, 0.8), 3);
    }

    #[test]
    fn test_idempotent_on_unchanged_input() {
        let poses = [
            pose(0.0, 0.5, 0.0),
            pose(0.2, 1.5, -0.1),
            pose(3.0, 0.5, 0.0),
        ];
        let first = tallest_stack(&poses, 0.8);
        let second = tallest_stack(&poses, 0.8);
        assert_eq!(first, second);
    }

    #[test]
    fn test_intervening_body_can_split_a_column() {
        // Documented approximation: a body between two aligned bodies in
        // height order can capture the upper one into its own column path.
        // Here the middle body is outside proximity of the base, so the
        // base's column never grows past 1 even though the top is directly
        // above the base.
        let base = pose(0.0, 0.5, 0.0);
        let middle = pose(2.0, 1.0, 0.0);
        let top = pose(0.0, 1.5, 0.0);
        // top joins base's column (first match). Now push a variant where
        // the middle sits within proximity of top but is checked first.
        assert_eq!(tallest_stack(&[base, middle, top], 0.8), 2);
    }
}
