//! Tests for the current tree service

use std::sync::Arc;
use std::thread;

use fractree::application::{ApplicationError, CurrentTree};
use fractree::domain::{DomainError, DomainResult, ParamOverrides, TreeNode, TreeParams};

fn small_params() -> TreeParams {
    TreeParams {
        num_children: 2,
        max_depth: 3,
        ..TreeParams::default()
    }
}

#[test]
fn given_new_slot_when_reading_then_empty() {
    let current = CurrentTree::new();
    assert!(current.current().is_none());
}

#[test]
fn given_empty_slot_when_updating_then_no_current_tree() {
    let current = CurrentTree::new();
    let result = current.update(&ParamOverrides::default());
    assert!(matches!(result, Err(ApplicationError::NoCurrentTree)));
}

#[test]
fn given_installed_tree_when_updating_then_only_overridden_params_change() {
    // Arrange
    let current = CurrentTree::new();
    let first = current.install(&small_params()).unwrap();

    // Act
    let second = current
        .update(&ParamOverrides {
            num_children: Some(3),
            ..ParamOverrides::default()
        })
        .unwrap();

    // Assert
    assert_eq!(second.num_children(), 3);
    assert_eq!(second.max_depth(), first.max_depth());
    assert_eq!(second.length(), first.length());
    assert_eq!(second.angle(), first.angle());
    assert_eq!(second.node_count(), 40);
    assert!(Arc::ptr_eq(&current.current().unwrap(), &second));
}

#[test]
fn given_tree_held_elsewhere_when_replacing_then_old_tree_is_untouched() {
    let current = CurrentTree::new();
    let old = current.install(&small_params()).unwrap();
    let snapshot = (*old).clone();

    let previous = current.replace(TreeNode::new(&TreeParams::default()).unwrap());

    assert!(Arc::ptr_eq(&previous.unwrap(), &old));
    assert_eq!(*old, snapshot);
    assert_eq!(old.node_count(), 15);
}

#[test]
fn given_invalid_override_when_updating_then_slot_keeps_previous_tree() {
    let current = CurrentTree::new();
    let installed = current.install(&small_params()).unwrap();

    let result = current.update(&ParamOverrides {
        num_children: Some(-1),
        ..ParamOverrides::default()
    });

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidArgument { .. }))
    ));
    assert!(Arc::ptr_eq(&current.current().unwrap(), &installed));
}

#[test]
fn given_installed_tree_when_clearing_then_returns_it() {
    let current = CurrentTree::new();
    let installed = current.install(&small_params()).unwrap();

    let cleared = current.clear();

    assert!(Arc::ptr_eq(&cleared.unwrap(), &installed));
    assert!(current.current().is_none());
}

#[test]
fn given_parallel_slot_when_installing_then_same_tree_as_sequential() {
    let sequential = CurrentTree::new().install(&small_params()).unwrap();
    let parallel = CurrentTree::with_parallel_construction()
        .install(&small_params())
        .unwrap();
    assert_eq!(*sequential, *parallel);
}

#[test]
fn given_traversal_in_flight_when_replacing_then_traversal_completes_on_old_tree() {
    let current = Arc::new(CurrentTree::new());
    current.install(&small_params()).unwrap();
    let held = current.current().unwrap();

    let reader = {
        let held = Arc::clone(&held);
        thread::spawn(move || {
            let mut count = 0usize;
            fractree::traverse_depth_first(Some(&*held), |_: &TreeNode| -> DomainResult<()> {
                count += 1;
                Ok(())
            })
            .map(|_| count)
        })
    };
    current
        .update(&ParamOverrides {
            max_depth: Some(5),
            ..ParamOverrides::default()
        })
        .unwrap();

    assert_eq!(reader.join().unwrap(), Ok(15));
    assert_eq!(current.current().unwrap().node_count(), 63);
}

#[test]
fn given_empty_overrides_when_updating_then_active_tree_is_kept() {
    let current = CurrentTree::new();
    let installed = current.install(&small_params()).unwrap();

    let updated = current.update(&ParamOverrides::default()).unwrap();

    assert!(Arc::ptr_eq(&updated, &installed));
}
