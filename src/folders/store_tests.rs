use super::*;
use crate::favorites::FavoritesStore;
use crate::storage::{KeyValueStore, MemoryStore};
use std::sync::Arc;

type PromptFolders = VirtualFolderStore<Prompts>;

fn new_store() -> (PromptFolders, MemoryStore) {
    let mem = MemoryStore::new();
    (PromptFolders::load(Arc::new(mem.clone())), mem)
}

fn no_favorites() -> FavoritesStore<PromptId> {
    FavoritesStore::load(Arc::new(MemoryStore::new()), "favs")
}

fn catalog(items: &[(&str, &str)]) -> Vec<LeafItem<PromptId>> {
    items
        .iter()
        .map(|(id, name)| LeafItem::new(*id, *name))
        .collect()
}

fn pid(s: &str) -> PromptId {
    PromptId::from(s)
}

fn keys(grid: &[GridItem<PromptId>]) -> Vec<String> {
    grid.iter().map(|g| g.key().to_string()).collect()
}

fn all_asc() -> ChildQuery {
    ChildQuery::new(FolderFilter::All, SortOrder::NameAsc)
}

#[test]
fn test_create_folder_sets_timestamps_and_parent() {
    let (mut store, _) = new_store();
    let lore = store.create_folder("Lore", ROOT_FOLDER_ID).unwrap();
    assert_eq!(lore.parent_id, ROOT_FOLDER_ID);
    assert_eq!(lore.created_at, lore.last_modified);
    assert!(uuid::Uuid::parse_str(&lore.id).is_ok());
    assert_eq!(store.folder(&lore.id), Some(&lore));
}

#[test]
fn test_create_folder_under_unknown_parent_fails() {
    let (mut store, _) = new_store();
    let err = store.create_folder("x", "missing").unwrap_err();
    assert!(matches!(err, OrganizerError::UnknownParent(ref id) if id == "missing"));
}

#[test]
fn test_blank_folder_name_gets_default() {
    let (mut store, _) = new_store();
    let folder = store.create_folder("   ", ROOT_FOLDER_ID).unwrap();
    assert_eq!(folder.name, "New Folder");
}

#[test]
fn test_move_item_into_folder_scenario() {
    let (mut store, _) = new_store();
    let items = catalog(&[("p1", "Intro"), ("p2", "Outro")]);
    let favs = no_favorites();
    let lore = store.create_folder("Lore", ROOT_FOLDER_ID).unwrap();

    assert!(store.move_item(&pid("p1"), Some(&lore.id)));

    let root = store.get_children(ROOT_FOLDER_ID, &all_asc(), &items, &favs);
    assert_eq!(keys(&root), vec![lore.id.clone(), "p2".to_string()]);

    let inside = store.get_children(&lore.id, &all_asc(), &items, &favs);
    assert_eq!(keys(&inside), vec!["p1".to_string()]);
    match &root[0] {
        GridItem::Folder { item_count, .. } => assert_eq!(*item_count, 1),
        other => panic!("expected folder, got {:?}", other),
    }
}

#[test]
fn test_delete_folder_releases_items() {
    let (mut store, _) = new_store();
    let lore = store.create_folder("Lore", ROOT_FOLDER_ID).unwrap();
    store.move_item(&pid("p1"), Some(&lore.id));
    let before = store.item_metadata(&pid("p1")).unwrap().last_modified;

    assert!(store.delete_folder(&lore.id));

    assert!(store.folder(&lore.id).is_none());
    let meta = store.item_metadata(&pid("p1")).expect("item must survive");
    assert_eq!(meta.folder_id, None);
    assert!(meta.last_modified >= before);
}

#[test]
fn test_delete_folder_reroots_children() {
    let (mut store, _) = new_store();
    let outer = store.create_folder("Outer", ROOT_FOLDER_ID).unwrap();
    let inner = store.create_folder("Inner", &outer.id).unwrap();
    store.delete_folder(&outer.id);
    assert_eq!(store.folder(&inner.id).unwrap().parent_id, ROOT_FOLDER_ID);
}

#[test]
fn test_unknown_ids_are_noops() {
    let (mut store, mem) = new_store();
    assert!(!store.rename_folder("nope", "x"));
    assert!(!store.set_color("nope", Some("#fff")));
    assert!(!store.delete_folder("nope"));
    assert!(!store.move_item(&pid("p1"), Some("nope")));
    assert_eq!(store.move_folder("nope", ROOT_FOLDER_ID).unwrap(), false);
    assert!(store.item_metadata(&pid("p1")).is_none());
    assert!(mem.get(Prompts::FOLDERS_KEY).is_none());
}

#[test]
fn test_rename_and_color_bump_last_modified() {
    let (mut store, _) = new_store();
    let folder = store.create_folder("A", ROOT_FOLDER_ID).unwrap();
    assert!(store.rename_folder(&folder.id, " B "));
    assert!(store.set_color(&folder.id, Some("#ff0000")));
    let updated = store.folder(&folder.id).unwrap();
    assert_eq!(updated.name, "B");
    assert_eq!(updated.color.as_deref(), Some("#ff0000"));
    assert!(updated.last_modified >= folder.last_modified);

    store.set_color(&folder.id, None);
    assert_eq!(store.folder(&folder.id).unwrap().color, None);
}

#[test]
fn test_blank_rename_keeps_name() {
    let (mut store, mem) = new_store();
    let folder = store.create_folder("Lore", ROOT_FOLDER_ID).unwrap();
    let saved = mem.get(Prompts::FOLDERS_KEY);
    assert!(!store.rename_folder(&folder.id, "   "));
    assert!(!store.rename_folder(&folder.id, ""));
    assert_eq!(store.folder(&folder.id).unwrap().name, "Lore");
    assert_eq!(mem.get(Prompts::FOLDERS_KEY), saved);
}

#[test]
fn test_move_item_to_root_clears_folder() {
    let (mut store, _) = new_store();
    let folder = store.create_folder("A", ROOT_FOLDER_ID).unwrap();
    store.move_item(&pid("p1"), Some(&folder.id));
    assert!(store.move_item(&pid("p1"), Some(ROOT_FOLDER_ID)));
    assert_eq!(store.item_location(&pid("p1")), ROOT_FOLDER_ID);
    store.move_item(&pid("p1"), Some(&folder.id));
    assert!(store.move_item(&pid("p1"), None));
    assert_eq!(store.item_metadata(&pid("p1")).unwrap().folder_id, None);
}

#[test]
fn test_move_folder_rejects_cycles() {
    let (mut store, _) = new_store();
    let a = store.create_folder("A", ROOT_FOLDER_ID).unwrap();
    let b = store.create_folder("B", &a.id).unwrap();
    let c = store.create_folder("C", &b.id).unwrap();

    assert!(matches!(
        store.move_folder(&a.id, &c.id),
        Err(OrganizerError::FolderCycle { .. })
    ));
    assert!(matches!(
        store.move_folder(&a.id, &a.id),
        Err(OrganizerError::FolderCycle { .. })
    ));
    assert_eq!(store.folder(&a.id).unwrap().parent_id, ROOT_FOLDER_ID);

    assert!(store.move_folder(&c.id, &a.id).unwrap());
    assert_eq!(store.folder(&c.id).unwrap().parent_id, a.id);
    assert!(store.move_folder(&b.id, ROOT_FOLDER_ID).unwrap());
}

#[test]
fn test_move_folder_to_unknown_parent_fails() {
    let (mut store, _) = new_store();
    let a = store.create_folder("A", ROOT_FOLDER_ID).unwrap();
    assert!(matches!(
        store.move_folder(&a.id, "ghost"),
        Err(OrganizerError::UnknownParent(_))
    ));
}

#[test]
fn test_ancestors_are_top_down() {
    let (mut store, _) = new_store();
    let a = store.create_folder("A", ROOT_FOLDER_ID).unwrap();
    let b = store.create_folder("B", &a.id).unwrap();
    let names: Vec<&str> = store.ancestors(&b.id).iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(store.ancestors(ROOT_FOLDER_ID).is_empty());
}

#[test]
fn test_children_sort_folders_first_then_name() {
    let (mut store, _) = new_store();
    store.create_folder("zeta", ROOT_FOLDER_ID).unwrap();
    store.create_folder("Alpha", ROOT_FOLDER_ID).unwrap();
    let items = catalog(&[("p1", "beta"), ("p2", "Aardvark")]);
    let favs = no_favorites();

    let asc = store.get_children(ROOT_FOLDER_ID, &all_asc(), &items, &favs);
    let names: Vec<&str> = asc.iter().map(|g| g.name()).collect();
    assert_eq!(names, vec!["Alpha", "zeta", "Aardvark", "beta"]);

    let desc_query = ChildQuery::new(FolderFilter::All, SortOrder::NameDesc);
    let desc = store.get_children(ROOT_FOLDER_ID, &desc_query, &items, &favs);
    let names: Vec<&str> = desc.iter().map(|g| g.name()).collect();
    assert_eq!(names, vec!["zeta", "Alpha", "beta", "Aardvark"]);
}

#[test]
fn test_children_search_is_case_insensitive_substring() {
    let (mut store, _) = new_store();
    store.create_folder("Lore Books", ROOT_FOLDER_ID).unwrap();
    let items = catalog(&[("p1", "World LORE"), ("p2", "Jailbreak")]);
    let query = all_asc().with_search("lore");
    let grid = store.get_children(ROOT_FOLDER_ID, &query, &items, &no_favorites());
    let names: Vec<&str> = grid.iter().map(|g| g.name()).collect();
    assert_eq!(names, vec!["Lore Books", "World LORE"]);
}

#[test]
fn test_children_favorites_and_uncategorized_filters() {
    let (mut store, _) = new_store();
    let folder = store.create_folder("F", ROOT_FOLDER_ID).unwrap();
    let items = catalog(&[("p1", "one"), ("p2", "two"), ("p3", "three")]);
    store.move_item(&pid("p3"), Some(&folder.id));
    let mut favs = no_favorites();
    favs.toggle(&pid("p2"));
    favs.toggle(&pid("p3"));

    let fav_query = ChildQuery::new(FolderFilter::Favorites, SortOrder::NameAsc);
    let grid = store.get_children(ROOT_FOLDER_ID, &fav_query, &items, &favs);
    assert_eq!(keys(&grid), vec!["p2".to_string()]);

    let uncategorized = ChildQuery::new(FolderFilter::Uncategorized, SortOrder::NameAsc);
    let grid = store.get_children(ROOT_FOLDER_ID, &uncategorized, &items, &favs);
    assert_eq!(keys(&grid), vec!["p1".to_string(), "p2".to_string()]);
}

#[test]
fn test_search_items_ranks_across_folders() {
    let (mut store, _) = new_store();
    let folder = store.create_folder("F", ROOT_FOLDER_ID).unwrap();
    store.move_item(&pid("p2"), Some(&folder.id));
    let items = catalog(&[("p1", "Scene Setup"), ("p2", "Character Sheet")]);
    let hits = store.search_items("char", &items);
    assert_eq!(hits, vec![LeafItem::<PromptId>::new("p2", "Character Sheet")]);
}

#[test]
fn test_state_persists_and_reloads() {
    let (mut store, mem) = new_store();
    let folder = store.create_folder("Lore", ROOT_FOLDER_ID).unwrap();
    store.move_item(&pid("p1"), Some(&folder.id));

    let reloaded = PromptFolders::load(Arc::new(mem.clone()));
    assert_eq!(reloaded.vfs(), store.vfs());
    let raw = mem.get(Prompts::FOLDERS_KEY).unwrap();
    assert!(raw.contains("\"parentId\":\"root\""));
    assert!(raw.contains("\"folderId\""));
}

#[test]
fn test_universes_do_not_share_state() {
    let mem = MemoryStore::new();
    let mut prompts = VirtualFolderStore::<Prompts>::load(Arc::new(mem.clone()));
    prompts.create_folder("Prompt Folder", ROOT_FOLDER_ID).unwrap();
    let characters = VirtualFolderStore::<Characters>::load(Arc::new(mem));
    assert_eq!(characters.folders().count(), 0);
}

#[test]
fn test_corrupt_blob_loads_empty() {
    let mem = MemoryStore::new();
    mem.write(Prompts::FOLDERS_KEY, "[1,2,3]").unwrap();
    let store = PromptFolders::load(Arc::new(mem));
    assert!(store.vfs().folders.is_empty());
    assert!(store.vfs().items.is_empty());
}

#[test]
fn test_load_repairs_dangling_and_cyclic_parents() {
    let mem = MemoryStore::new();
    let now = "2026-01-01T00:00:00Z";
    let folder = |id: &str, parent: &str| {
        format!(
            r#""{id}":{{"id":"{id}","name":"{id}","parentId":"{parent}","createdAt":"{now}","lastModified":"{now}"}}"#
        )
    };
    let raw = format!(
        r#"{{"folders":{{{},{},{},{}}},"items":{{}}}}"#,
        folder("a", "ghost"),
        folder("b", "c"),
        folder("c", "b"),
        folder("d", "a"),
    );
    mem.insert(Prompts::FOLDERS_KEY, &raw);

    let store = PromptFolders::load(Arc::new(mem));
    assert_eq!(store.folder("a").unwrap().parent_id, ROOT_FOLDER_ID);
    assert_eq!(store.folder("d").unwrap().parent_id, "a");
    let b_parent = store.folder("b").unwrap().parent_id.clone();
    let c_parent = store.folder("c").unwrap().parent_id.clone();
    assert!(b_parent == ROOT_FOLDER_ID || c_parent == ROOT_FOLDER_ID);
    assert!(store.ancestors("b").len() <= 2);
}

#[test]
fn test_forget_item_drops_metadata() {
    let (mut store, _) = new_store();
    store.move_item(&pid("p1"), None);
    assert!(store.forget_item(&pid("p1")));
    assert!(!store.forget_item(&pid("p1")));
}
