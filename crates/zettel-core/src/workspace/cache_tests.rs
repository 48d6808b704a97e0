use super::*;
use crate::cache::{FileGraphCache, GraphCache, MemoryGraphCache};
use crate::error::ZettelkastenError;
use crate::model::ZettelError;
use crate::route::MemoryRouteWriter;
use crate::vfs::{NullTracker, PhysicalFileSystem};
use std::fs;
use tempfile::TempDir;

fn build_kasten(root: &Path) -> Zettelkasten {
    let ws = Workspace::new(
        root.to_path_buf(),
        ZettelConfig {
            recurse_dir: true,
            ..Default::default()
        },
        Arc::new(PhysicalFileSystem),
        Arc::new(NullTracker),
    );
    ws.load_zettelkasten(&LinkExtractor).unwrap()
}

fn seed(root: &Path) {
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("note1.md"), "# Note 1\n\n[[note2]] [[ghost]]").unwrap();
    fs::write(root.join("note2.md"), "---\ntags: [x]\n---\n# Note 2\n\n[[[note1]]]").unwrap();
    fs::write(root.join("a/twin.md"), "left").unwrap();
    fs::write(root.join("b/twin.md"), "right").unwrap();
}

#[test]
fn test_cache_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    seed(root);
    let kasten = build_kasten(root);

    let cache = FileGraphCache::in_dir(root, Arc::new(PhysicalFileSystem));
    cache
        .store(&kasten.graph, &kasten.errors)
        .expect("Failed to save cache");
    assert!(root.join(".zettel").join("cache.bin").exists());

    let (graph, errors) = cache.retrieve().expect("Failed to load cache");
    assert_eq!(graph, kasten.graph);
    assert_eq!(errors, kasten.errors);
    assert!(matches!(
        errors[&ZettelId::new("twin")],
        ZettelError::AmbiguousFiles(_)
    ));
}

#[test]
fn test_cache_missing_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileGraphCache::in_dir(temp_dir.path(), Arc::new(PhysicalFileSystem));
    assert!(matches!(cache.retrieve(), Err(ZettelkastenError::Io { .. })));
}

#[test]
fn test_cache_rejects_foreign_version() {
    #[derive(serde::Serialize)]
    struct Stale {
        version: u32,
        graph: ZettelGraph,
        errors: ErrorMap,
    }

    let temp_dir = TempDir::new().unwrap();
    let cache = FileGraphCache::in_dir(temp_dir.path(), Arc::new(PhysicalFileSystem));
    let stale = Stale {
        version: 0,
        graph: ZettelGraph::default(),
        errors: ErrorMap::new(),
    };
    fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
    fs::write(cache.path(), bincode::serialize(&stale).unwrap()).unwrap();

    match cache.retrieve() {
        Err(ZettelkastenError::Cache(msg)) => assert!(msg.contains("version 0"), "{}", msg),
        other => panic!("expected cache error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_cache_garbage_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileGraphCache::in_dir(temp_dir.path(), Arc::new(PhysicalFileSystem));
    fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
    fs::write(cache.path(), b"\xff\xff").unwrap();
    assert!(matches!(cache.retrieve(), Err(ZettelkastenError::Cache(_))));
}

#[test]
fn test_memory_cache_last_store_wins() {
    let temp_dir = TempDir::new().unwrap();
    seed(temp_dir.path());
    let kasten = build_kasten(temp_dir.path());

    let cache = MemoryGraphCache::new();
    assert!(cache.retrieve().is_err());

    cache.store(&ZettelGraph::default(), &ErrorMap::new()).unwrap();
    cache.store(&kasten.graph, &kasten.errors).unwrap();

    let (graph, errors) = cache.retrieve().unwrap();
    assert_eq!(graph.len(), 2);
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_engine_build_then_load_graph() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    seed(&root);
    let fs = Arc::new(PhysicalFileSystem);

    let config = ZettelConfig {
        recurse_dir: true,
        ..Default::default()
    };
    let ws = Workspace::new(root.clone(), config, fs.clone(), Arc::new(NullTracker));
    let engine = SiteEngine::new(ws, Arc::new(FileGraphCache::in_dir(&root, fs.clone())));
    engine
        .build(&mut MemoryRouteWriter::new(), &mut Vec::<u8>::new())
        .unwrap();

    // A fresh engine reads what the first one stored.
    let ws2 = Workspace::open(root.clone(), fs.clone(), Arc::new(NullTracker)).unwrap();
    let reader = SiteEngine::new(ws2, Arc::new(FileGraphCache::in_dir(&root, fs)));
    let (graph, errors) = reader.load_graph().unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(
        graph.connection(&ZettelId::new("note2"), &ZettelId::new("note1")),
        Some(crate::model::Connection::Folgezettel)
    );
    assert_eq!(errors.len(), 2);
    assert!(errors.contains_key(&ZettelId::new("note1")));
}
