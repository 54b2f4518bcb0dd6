//! Tests for TreeNode construction

use glam::DVec2;
use rstest::rstest;

use fractree::domain::{expected_node_count, DomainError, TreeBuilder, TreeNode, TreeParams};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn params(num_children: i32, depth: usize, max_depth: usize) -> TreeParams {
    TreeParams {
        start: DVec2::ZERO,
        length: 1.0,
        angle: 0.0,
        num_children,
        length_scale: 0.5,
        delta_angle: std::f64::consts::PI / 8.0,
        depth,
        max_depth,
    }
}

// ============================================================
// Child geometry
// ============================================================

#[test]
fn given_two_children_when_constructing_then_children_fan_out_from_parent_end() {
    // Arrange
    let params = TreeParams {
        start: DVec2::ZERO,
        length: 100.0,
        angle: 0.0,
        num_children: 2,
        length_scale: 0.7,
        delta_angle: 30f64.to_radians(),
        depth: 0,
        max_depth: 3,
    };

    // Act
    let node = TreeNode::new(&params).unwrap();

    // Assert
    assert_eq!(node.children().len(), 2);
    for (child, degrees) in node.children().iter().zip([-15f64, 15f64]) {
        assert_eq!(child.depth(), 1);
        assert_close(child.start().x, 100.0);
        assert_close(child.start().y, 0.0);
        assert_close(child.length(), 70.0);
        assert_close(child.angle(), degrees.to_radians());
        assert_close(child.end().x, 100.0 + 70.0 * degrees.to_radians().cos());
        assert_close(child.end().y, 70.0 * degrees.to_radians().sin());
    }
}

#[test]
fn given_three_children_when_constructing_then_middle_child_continues_parent_direction() {
    let node = TreeNode::new(&params(3, 0, 1)).unwrap();

    assert_eq!(node.children().len(), 3);
    let angles: Vec<f64> = node.children().iter().map(|c| c.angle()).collect();
    assert_close(angles[0], -std::f64::consts::PI / 8.0);
    assert_close(angles[1], 0.0);
    assert_close(angles[2], std::f64::consts::PI / 8.0);
    for child in node.children() {
        assert_close(child.length(), 0.5);
        assert!(child.is_leaf(), "depth 1 == max_depth must be a leaf");
    }
}

#[test]
fn given_any_tree_when_constructed_then_parent_child_invariants_hold() {
    let root = TreeBuilder::new()
        .start(12.0, -4.0)
        .length(80.0)
        .angle_degrees(-90.0)
        .num_children(3)
        .length_scale(0.6)
        .delta_angle_degrees(25.0)
        .max_depth(4)
        .build()
        .unwrap();

    for node in root.iter_depth_first() {
        assert_eq!(node.max_depth(), 4);
        assert_eq!(node.num_children(), 3);
        assert_close(node.length_scale(), 0.6);
        assert_close(node.delta_angle(), 25f64.to_radians());
        assert_eq!(node.is_leaf(), node.depth() >= node.max_depth());
        for child in node.children() {
            // exact equality: the child's start is a copy of the parent's end
            assert_eq!(child.start(), node.end());
            assert_close(child.length(), node.length() * 0.6);
            assert_eq!(child.depth(), node.depth() + 1);
        }
    }
}

// ============================================================
// Leaf conditions
// ============================================================

#[test]
fn given_depth_equal_max_depth_when_constructing_then_no_children() {
    let node = TreeNode::new(&params(3, 6, 6)).unwrap();
    assert!(node.children().is_empty());
    assert!(node.is_leaf());
}

#[test]
fn given_depth_beyond_max_depth_when_constructing_then_no_children() {
    let node = TreeNode::new(&params(3, 8, 6)).unwrap();
    assert!(node.is_leaf());
}

#[test]
fn given_zero_children_when_constructing_then_no_children_regardless_of_depth() {
    let node = TreeNode::new(&params(0, 0, 7)).unwrap();
    assert!(node.children().is_empty());
    assert_eq!(node.node_count(), 1);
}

#[test]
fn given_negative_children_when_constructing_then_invalid_argument() {
    let result = TreeNode::new(&params(-2, 0, 7));
    assert_eq!(
        result,
        Err(DomainError::InvalidArgument {
            name: "num_children",
            value: -2
        })
    );
    assert!(TreeNode::new_parallel(&params(-2, 0, 7)).is_err());
}

// ============================================================
// Shape
// ============================================================

#[rstest]
#[case(2, 3, 15)]
#[case(3, 2, 13)]
#[case(1, 5, 6)]
#[case(4, 0, 1)]
fn given_full_branching_when_counting_nodes_then_matches_geometric_series(
    #[case] branching: i32,
    #[case] depth: usize,
    #[case] expected: usize,
) {
    let tree = TreeNode::new(&params(branching, 0, depth)).unwrap();

    assert_eq!(tree.node_count(), expected);
    assert_eq!(expected_node_count(branching as usize, depth), expected);
    assert_eq!(tree.leaf_count(), (branching as usize).pow(depth as u32));
    assert_eq!(tree.height(), depth);
}

#[test]
fn given_same_params_when_building_in_parallel_then_tree_is_identical() {
    let builder = TreeBuilder::new().num_children(3).max_depth(5);

    let sequential = builder.build().unwrap();
    let parallel = builder.build_parallel().unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn given_built_tree_when_rebuilding_from_params_then_old_tree_is_unaffected() {
    let first = TreeBuilder::new().num_children(2).max_depth(3).build().unwrap();
    let snapshot = first.clone();

    let second = TreeNode::new(&TreeParams {
        num_children: 4,
        ..first.params()
    })
    .unwrap();

    assert_eq!(first, snapshot);
    assert_eq!(first.node_count(), 15);
    assert_eq!(second.node_count(), expected_node_count(4, 3));
}

#[test]
fn given_horizontal_tree_when_computing_bounds_then_spans_trunk() {
    let tree = TreeNode::new(&TreeParams {
        start: DVec2::new(0.0, 0.0),
        length: 10.0,
        angle: 0.0,
        num_children: 0,
        length_scale: 0.5,
        delta_angle: 0.0,
        depth: 0,
        max_depth: 3,
    })
    .unwrap();

    let (lo, hi) = tree.bounds();
    assert_eq!(lo, DVec2::new(0.0, 0.0));
    assert_eq!(hi, DVec2::new(10.0, 0.0));
}

// ============================================================
// Deep trees
// ============================================================

const DEEP: usize = 200_000;

fn deep_chain() -> TreeBuilder {
    TreeBuilder::new().num_children(1).max_depth(DEEP)
}

#[test]
fn given_deep_chain_when_constructing_then_no_stack_overflow() {
    // Arrange
    let builder = deep_chain();

    // Act
    let tree = builder.build().unwrap();

    // Assert
    assert_eq!(tree.node_count(), DEEP + 1);
    assert_eq!(tree.leaf_count(), 1);
    assert_eq!(tree.height(), DEEP);
    let deepest = tree.iter_depth_first().last().unwrap();
    assert_eq!(deepest.depth(), DEEP);
    assert!(deepest.is_leaf());
}

#[test]
fn given_deep_chain_when_building_in_parallel_then_matches_sequential() {
    let builder = deep_chain();

    let sequential = builder.build().unwrap();
    let parallel = builder.build_parallel().unwrap();

    assert!(sequential == parallel);
}

#[test]
fn given_deep_chain_when_cloning_and_dropping_then_no_stack_overflow() {
    let tree = deep_chain().build().unwrap();

    let copy = tree.clone();
    assert!(copy == tree);
    drop(tree);

    assert_eq!(copy.height(), DEEP);
}

#[test]
fn given_deep_chain_on_small_thread_when_building_then_completes() {
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(|| {
            let tree = deep_chain().build().unwrap();
            tree.node_count()
        })
        .unwrap();

    assert_eq!(handle.join().unwrap(), DEEP + 1);
}

#[test]
fn given_trees_differing_deep_down_when_comparing_then_not_equal() {
    let a = TreeBuilder::new().num_children(1).max_depth(1_000).build().unwrap();
    let b = TreeBuilder::new().num_children(1).max_depth(1_001).build().unwrap();
    assert!(a != b);
}
