//! In-memory store fixtures
//!
//! [`MemoryStore`] mirrors the observable contract of the real etcd v2
//! client: reads return immediate children inline, parent directories are
//! created implicitly on write, deleting an absent key succeeds, and the
//! error envelope uses etcd's numeric codes. Tests can therefore exercise
//! the full observe/decide/execute path without a network.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use etcd_transport::{Error, KeyPath, KvStore, Result, StoreEntry};

/// etcd error code used by [`MemoryStore`] for "Not a file".
const CODE_NOT_A_FILE: u64 = 102;
/// etcd error code used by [`MemoryStore`] for "Not a directory".
const CODE_NOT_A_DIR: u64 = 104;
/// etcd error code used by [`MemoryStore`] for "Directory not empty".
const CODE_DIR_NOT_EMPTY: u64 = 108;
/// etcd error code used by [`FailingStore`] for injected failures.
const CODE_RAFT_INTERNAL: u64 = 300;

#[derive(Debug, Clone)]
enum Node {
    Leaf(String),
    Dir(BTreeMap<String, Node>),
}

/// An in-memory hierarchical key-value store for tests.
///
/// # Example
///
/// ```
/// use etcd_test_utils::MemoryStore;
///
/// let store = MemoryStore::new()
///     .with_leaf("/apps/web", "host-1")
///     .with_dir("/apps/batch");
/// assert_eq!(store.leaf_value("/apps/web"), Some("host-1".to_string()));
/// assert!(store.is_dir("/apps"));
/// ```
pub struct MemoryStore {
    root: Mutex<BTreeMap<String, Node>>,
    mutations: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            root: Mutex::new(BTreeMap::new()),
            mutations: AtomicUsize::new(0),
        }
    }

    /// Seed a leaf, creating parent directories. Panics on a malformed
    /// key or a conflicting fixture; fixtures are test code.
    pub fn with_leaf(self, key: &str, value: &str) -> Self {
        let key = KeyPath::new(key).expect("fixture key");
        self.write_leaf(&key, value).expect("fixture leaf");
        self.mutations.store(0, Ordering::SeqCst);
        self
    }

    /// Seed an empty directory, creating parents. Panics on a malformed
    /// key or a conflicting fixture.
    pub fn with_dir(self, key: &str) -> Self {
        let key = KeyPath::new(key).expect("fixture key");
        self.write_directory(&key).expect("fixture directory");
        self.mutations.store(0, Ordering::SeqCst);
        self
    }

    /// The value stored at `key`, if it is a leaf.
    pub fn leaf_value(&self, key: &str) -> Option<String> {
        let key = KeyPath::new(key).expect("fixture key");
        let root = self.root.lock().expect("store lock");
        match find(&root, &key) {
            Some(Node::Leaf(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Whether `key` exists at all.
    pub fn contains(&self, key: &str) -> bool {
        let key = KeyPath::new(key).expect("fixture key");
        let root = self.root.lock().expect("store lock");
        find(&root, &key).is_some()
    }

    /// Whether `key` exists and is a directory.
    pub fn is_dir(&self, key: &str) -> bool {
        let key = KeyPath::new(key).expect("fixture key");
        let root = self.root.lock().expect("store lock");
        matches!(find(&root, &key), Some(Node::Dir(_)))
    }

    /// Number of successful mutating calls since construction (seeding
    /// via `with_leaf`/`with_dir` does not count).
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

fn find<'a>(root: &'a BTreeMap<String, Node>, key: &KeyPath) -> Option<&'a Node> {
    let mut segments = key.segments();
    let first = segments.next()?;
    let mut node = root.get(first)?;
    for segment in segments {
        match node {
            Node::Dir(children) => node = children.get(segment)?,
            Node::Leaf(_) => return None,
        }
    }
    Some(node)
}

/// Walk to the parent directory of `key`, creating missing directories,
/// and return the map the final segment lives in.
fn parent_dir<'a>(
    root: &'a mut BTreeMap<String, Node>,
    key: &KeyPath,
) -> Result<&'a mut BTreeMap<String, Node>> {
    let segments: Vec<&str> = key.segments().collect();
    let mut current = root;
    for segment in &segments[..segments.len() - 1] {
        let node = current
            .entry((*segment).to_string())
            .or_insert_with(|| Node::Dir(BTreeMap::new()));
        match node {
            Node::Dir(children) => current = children,
            Node::Leaf(_) => {
                return Err(Error::Api {
                    code: CODE_NOT_A_DIR,
                    key: key.to_string(),
                    message: "Not a directory".to_string(),
                });
            }
        }
    }
    Ok(current)
}

fn entry_for(key: &str, node: &Node) -> StoreEntry {
    match node {
        Node::Leaf(value) => StoreEntry::leaf(key, value.clone()),
        Node::Dir(children) => StoreEntry::directory(
            key,
            children
                .iter()
                .map(|(name, child)| {
                    let child_key = format!("{key}/{name}");
                    match child {
                        Node::Leaf(value) => StoreEntry::leaf(child_key, value.clone()),
                        // One level deep, like the wire format.
                        Node::Dir(_) => StoreEntry::directory(child_key, vec![]),
                    }
                })
                .collect(),
        ),
    }
}

impl KvStore for MemoryStore {
    fn read(&self, key: &KeyPath) -> Result<Option<StoreEntry>> {
        let root = self.root.lock().expect("store lock");
        Ok(find(&root, key).map(|node| entry_for(key.as_str(), node)))
    }

    fn write_leaf(&self, key: &KeyPath, value: &str) -> Result<()> {
        let mut root = self.root.lock().expect("store lock");
        let parent = parent_dir(&mut root, key)?;
        match parent.get(key.name()) {
            Some(Node::Dir(_)) => Err(Error::Api {
                code: CODE_NOT_A_FILE,
                key: key.to_string(),
                message: "Not a file".to_string(),
            }),
            _ => {
                parent.insert(key.name().to_string(), Node::Leaf(value.to_string()));
                self.record_mutation();
                Ok(())
            }
        }
    }

    fn write_directory(&self, key: &KeyPath) -> Result<()> {
        let mut root = self.root.lock().expect("store lock");
        let parent = parent_dir(&mut root, key)?;
        match parent.get(key.name()) {
            Some(Node::Dir(_)) => Ok(()),
            Some(Node::Leaf(_)) => Err(Error::Api {
                code: CODE_NOT_A_FILE,
                key: key.to_string(),
                message: "Not a file".to_string(),
            }),
            None => {
                parent.insert(key.name().to_string(), Node::Dir(BTreeMap::new()));
                self.record_mutation();
                Ok(())
            }
        }
    }

    fn delete(&self, key: &KeyPath, recursive: bool) -> Result<()> {
        let mut root = self.root.lock().expect("store lock");
        let parent = parent_dir(&mut root, key)?;
        match parent.get(key.name()) {
            // Already absent: the desired state holds.
            None => Ok(()),
            Some(Node::Dir(children)) if !children.is_empty() && !recursive => Err(Error::Api {
                code: CODE_DIR_NOT_EMPTY,
                key: key.to_string(),
                message: "Directory not empty".to_string(),
            }),
            Some(_) => {
                parent.remove(key.name());
                self.record_mutation();
                Ok(())
            }
        }
    }
}

/// A store whose mutating calls always fail.
///
/// By default reads fail too; [`FailingStore::reads_from`] delegates
/// reads to a seeded [`MemoryStore`] so tests can reach the execution
/// step and watch it fail there.
pub struct FailingStore {
    reads: Option<MemoryStore>,
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FailingStore {
    /// Every operation fails.
    pub fn new() -> Self {
        Self { reads: None }
    }

    /// Reads succeed against `store`; mutations still fail.
    pub fn reads_from(store: MemoryStore) -> Self {
        Self { reads: Some(store) }
    }

    fn injected(key: &KeyPath) -> Error {
        Error::Api {
            code: CODE_RAFT_INTERNAL,
            key: key.to_string(),
            message: "injected store failure".to_string(),
        }
    }
}

impl KvStore for FailingStore {
    fn read(&self, key: &KeyPath) -> Result<Option<StoreEntry>> {
        match &self.reads {
            Some(store) => store.read(key),
            None => Err(Self::injected(key)),
        }
    }

    fn write_leaf(&self, key: &KeyPath, _value: &str) -> Result<()> {
        Err(Self::injected(key))
    }

    fn write_directory(&self, key: &KeyPath) -> Result<()> {
        Err(Self::injected(key))
    }

    fn delete(&self, key: &KeyPath, _recursive: bool) -> Result<()> {
        Err(Self::injected(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> KeyPath {
        KeyPath::new(raw).unwrap()
    }

    #[test]
    fn read_of_missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.read(&key("/missing")).unwrap().is_none());
    }

    #[test]
    fn write_creates_parent_directories() {
        let store = MemoryStore::new();
        store.write_leaf(&key("/a/b/c"), "v").unwrap();
        assert!(store.is_dir("/a"));
        assert!(store.is_dir("/a/b"));
        assert_eq!(store.leaf_value("/a/b/c"), Some("v".to_string()));
    }

    #[test]
    fn write_through_a_leaf_is_not_a_directory() {
        let store = MemoryStore::new().with_leaf("/a", "v");
        let error = store.write_leaf(&key("/a/b"), "v").unwrap_err();
        assert!(matches!(error, Error::Api { code: 104, .. }));
    }

    #[test]
    fn directory_read_returns_children_one_level_deep() {
        let store = MemoryStore::new()
            .with_leaf("/a/b", "v")
            .with_leaf("/a/c/d", "w");
        let entry = store.read(&key("/a")).unwrap().unwrap();
        assert!(entry.is_dir);
        assert_eq!(entry.children.len(), 2);
        // Nested children are not expanded.
        assert!(entry.children.iter().all(|child| child.children.is_empty()));
    }

    #[test]
    fn non_recursive_delete_of_populated_directory_fails() {
        let store = MemoryStore::new().with_leaf("/a/b", "v");
        let error = store.delete(&key("/a"), false).unwrap_err();
        assert!(matches!(error, Error::Api { code: 108, .. }));
        assert!(store.contains("/a/b"));
    }

    #[test]
    fn recursive_delete_removes_the_tree() {
        let store = MemoryStore::new().with_leaf("/a/b", "v");
        store.delete(&key("/a"), true).unwrap();
        assert!(!store.contains("/a"));
    }

    #[test]
    fn delete_of_absent_key_succeeds() {
        let store = MemoryStore::new();
        assert!(store.delete(&key("/missing"), false).is_ok());
        assert_eq!(store.mutation_count(), 0);
    }

    #[test]
    fn seeding_does_not_count_as_mutation() {
        let store = MemoryStore::new().with_leaf("/a/b", "v");
        assert_eq!(store.mutation_count(), 0);
        store.write_leaf(&key("/a/c"), "w").unwrap();
        assert_eq!(store.mutation_count(), 1);
    }

    #[test]
    fn failing_store_reads_can_delegate() {
        let store = FailingStore::reads_from(MemoryStore::new().with_leaf("/a", "v"));
        assert!(store.read(&key("/a")).unwrap().is_some());
        assert!(store.write_leaf(&key("/a"), "w").is_err());
    }
}
