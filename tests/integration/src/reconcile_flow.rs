//! End-to-end reconciliation flows against the in-memory store.
//!
//! Drives the full observe -> decide -> execute path the way the CLI
//! does, checking the idempotence and dry-run guarantees that unit tests
//! can only check per stage.

use pretty_assertions::assert_eq;
use rstest::rstest;

use etcd_engine::{Action, DesiredState, Error, Policy, ReconcileError, apply};
use etcd_test_utils::{FailingStore, MemoryStore};
use etcd_transport::KeyPath;

fn key(raw: &str) -> KeyPath {
    KeyPath::new(raw).unwrap()
}

fn leaf(raw_key: &str, value: &str) -> DesiredState {
    DesiredState::leaf(key(raw_key), Some(value.to_string()))
}

// ============================================================================
// Idempotence: the second run never changes anything
// ============================================================================

#[rstest]
#[case::create_leaf(MemoryStore::new(), leaf("/a/b", "v1"), Policy::default(), Action::CreateLeaf)]
#[case::create_directory(
    MemoryStore::new(),
    DesiredState::directory(key("/apps")),
    Policy::default(),
    Action::CreateDirectory
)]
#[case::overwrite_leaf(
    MemoryStore::new().with_leaf("/a/b", "old"),
    leaf("/a/b", "new"),
    Policy { overwrite: true, ..Policy::default() },
    Action::OverwriteLeaf
)]
#[case::delete_leaf(
    MemoryStore::new().with_leaf("/a/b", "v1"),
    DesiredState::absent(key("/a/b")),
    Policy::default(),
    Action::DeleteLeaf
)]
#[case::delete_empty_directory(
    MemoryStore::new().with_dir("/apps"),
    DesiredState::absent(key("/apps")),
    Policy::default(),
    Action::DeleteDirectory
)]
#[case::delete_tree(
    MemoryStore::new().with_leaf("/apps/web", "h1").with_leaf("/apps/batch", "h2"),
    DesiredState::absent(key("/apps")),
    Policy { recursive: true, ..Policy::default() },
    Action::DeleteDirectoryRecursive
)]
fn second_run_is_a_noop(
    #[case] store: MemoryStore,
    #[case] desired: DesiredState,
    #[case] policy: Policy,
    #[case] expected: Action,
) {
    let first = apply(&store, &desired, &policy).unwrap();
    assert_eq!(first.action, expected);
    assert!(first.changed);

    let second = apply(&store, &desired, &policy).unwrap();
    assert_eq!(second.action, Action::Noop);
    assert!(!second.changed);
    assert!(second.error.is_none());
}

// ============================================================================
// Dry-run: same verdict, untouched store
// ============================================================================

#[rstest]
#[case::create(MemoryStore::new(), leaf("/a/b", "v1"), Policy::default())]
#[case::overwrite(
    MemoryStore::new().with_leaf("/a/b", "old"),
    leaf("/a/b", "new"),
    Policy { overwrite: true, ..Policy::default() }
)]
#[case::refused_overwrite(
    MemoryStore::new().with_leaf("/a/b", "old"),
    leaf("/a/b", "new"),
    Policy::default()
)]
#[case::delete_tree(
    MemoryStore::new().with_leaf("/apps/web", "h1"),
    DesiredState::absent(key("/apps")),
    Policy { recursive: true, ..Policy::default() }
)]
#[case::blocked_delete(
    MemoryStore::new().with_leaf("/apps/web", "h1"),
    DesiredState::absent(key("/apps")),
    Policy::default()
)]
#[case::missing_value(MemoryStore::new(), DesiredState::leaf(key("/a/b"), None), Policy::default())]
fn dry_run_predicts_the_real_run_without_mutating(
    #[case] store: MemoryStore,
    #[case] desired: DesiredState,
    #[case] policy: Policy,
) {
    let dry_policy = Policy {
        dry_run: true,
        ..policy
    };
    let predicted = apply(&store, &desired, &dry_policy).unwrap();
    assert_eq!(store.mutation_count(), 0, "dry run must not mutate");

    let real = apply(&store, &desired, &policy).unwrap();
    assert_eq!(predicted.action, real.action);
    assert_eq!(predicted.changed, real.changed);
    assert_eq!(predicted.error, real.error);
}

// ============================================================================
// Specified scenarios
// ============================================================================

#[test]
fn creates_a_missing_leaf() {
    let store = MemoryStore::new();
    let result = apply(&store, &leaf("/a/b", "v1"), &Policy::default()).unwrap();
    assert_eq!(result.action, Action::CreateLeaf);
    assert!(result.changed);
    assert_eq!(store.leaf_value("/a/b"), Some("v1".to_string()));
}

#[test]
fn refuses_a_protected_overwrite() {
    let store = MemoryStore::new().with_leaf("/a/b", "v1");
    let result = apply(&store, &leaf("/a/b", "v2"), &Policy::default()).unwrap();
    assert_eq!(result.action, Action::Fail);
    assert!(!result.changed);
    assert_eq!(
        result.error,
        Some(ReconcileError::OverwriteRefused {
            key: "/a/b".to_string(),
            current: "v1".to_string(),
        })
    );
    assert_eq!(store.leaf_value("/a/b"), Some("v1".to_string()));
}

#[test]
fn performs_a_forced_overwrite() {
    let store = MemoryStore::new().with_leaf("/a/b", "v1");
    let policy = Policy {
        overwrite: true,
        ..Policy::default()
    };
    let result = apply(&store, &leaf("/a/b", "v2"), &policy).unwrap();
    assert_eq!(result.action, Action::OverwriteLeaf);
    assert!(result.changed);
    assert_eq!(result.prior_value.as_deref(), Some("v1"));
    assert_eq!(store.leaf_value("/a/b"), Some("v2".to_string()));
}

#[rstest]
#[case(false)]
#[case(true)]
fn deletes_an_empty_directory_regardless_of_recursive(#[case] recursive: bool) {
    let store = MemoryStore::new().with_dir("/a");
    let policy = Policy {
        recursive,
        ..Policy::default()
    };
    let result = apply(&store, &DesiredState::absent(key("/a")), &policy).unwrap();
    assert_eq!(result.action, Action::DeleteDirectory);
    assert!(result.changed);
    assert!(!store.contains("/a"));
}

#[test]
fn blocks_deleting_a_populated_directory_without_recursive() {
    let store = MemoryStore::new().with_leaf("/a/b", "v1");
    let result = apply(&store, &DesiredState::absent(key("/a")), &Policy::default()).unwrap();
    assert_eq!(result.action, Action::Fail);
    assert!(matches!(
        result.error,
        Some(ReconcileError::DirectoryNotEmpty { children: 1, .. })
    ));
    assert!(store.contains("/a/b"));
}

#[test]
fn accepting_the_stored_value_needs_no_value() {
    let store = MemoryStore::new().with_leaf("/a/b", "whatever");
    let desired = DesiredState::leaf(key("/a/b"), None);
    let result = apply(&store, &desired, &Policy::default()).unwrap();
    assert_eq!(result.action, Action::Noop);
    assert_eq!(result.prior_value.as_deref(), Some("whatever"));
}

#[test]
fn conflicting_kinds_fail_in_both_directions() {
    let store = MemoryStore::new().with_leaf("/node", "v");
    let as_dir = apply(
        &store,
        &DesiredState::directory(key("/node")),
        &Policy::default(),
    )
    .unwrap();
    assert!(matches!(
        as_dir.error,
        Some(ReconcileError::PathConflict { .. })
    ));

    let store = MemoryStore::new().with_dir("/node");
    let as_leaf = apply(&store, &leaf("/node", "v"), &Policy::default()).unwrap();
    assert!(matches!(
        as_leaf.error,
        Some(ReconcileError::PathConflict { .. })
    ));
}

// ============================================================================
// Error taxonomy across the full path
// ============================================================================

#[test]
fn observation_failure_surfaces_as_transport() {
    let store = FailingStore::new();
    let error = apply(&store, &leaf("/a/b", "v1"), &Policy::default()).unwrap_err();
    assert!(matches!(error, Error::Transport(_)));
}

#[test]
fn execution_failure_surfaces_as_execution_failed() {
    let store = FailingStore::reads_from(MemoryStore::new().with_leaf("/a/b", "v1"));
    let policy = Policy {
        overwrite: true,
        ..Policy::default()
    };
    let error = apply(&store, &leaf("/a/b", "v2"), &policy).unwrap_err();
    assert!(matches!(
        error,
        Error::ExecutionFailed {
            action: Action::OverwriteLeaf,
            ..
        }
    ));
}

#[test]
fn dry_run_never_reaches_execution() {
    // Writes would fail; dry-run must not attempt them.
    let store = FailingStore::reads_from(MemoryStore::new());
    let policy = Policy {
        dry_run: true,
        ..Policy::default()
    };
    let result = apply(&store, &leaf("/a/b", "v1"), &policy).unwrap();
    assert_eq!(result.action, Action::CreateLeaf);
    assert!(result.changed);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn create_overwrite_delete_lifecycle() {
    let store = MemoryStore::new();

    let created = apply(&store, &leaf("/svc/endpoint", "host-1"), &Policy::default()).unwrap();
    assert_eq!(created.action, Action::CreateLeaf);

    let policy = Policy {
        overwrite: true,
        ..Policy::default()
    };
    let updated = apply(&store, &leaf("/svc/endpoint", "host-2"), &policy).unwrap();
    assert_eq!(updated.action, Action::OverwriteLeaf);
    assert_eq!(updated.prior_value.as_deref(), Some("host-1"));

    let deleted = apply(
        &store,
        &DesiredState::absent(key("/svc/endpoint")),
        &Policy::default(),
    )
    .unwrap();
    assert_eq!(deleted.action, Action::DeleteLeaf);
    assert!(!store.contains("/svc/endpoint"));

    // The parent directory created implicitly is left in place.
    assert!(store.is_dir("/svc"));
}
