use super::*;
use crate::host::PromptEntry;

/// Helper to build entries whose identifier is derived from their position
fn entries(names: &[&str]) -> Vec<PromptEntry> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| PromptEntry::new(format!("p{}", i), *name))
        .collect()
}

fn names(list: &[PromptEntry]) -> Vec<&str> {
    list.iter().map(|e| e.name.as_str()).collect()
}

fn all_identifiers(tree: &[SectionNode]) -> Vec<String> {
    let mut ids: Vec<String> = tree
        .iter()
        .flat_map(|n| n.identifiers())
        .map(str::to_string)
        .collect();
    ids.sort();
    ids
}

#[test]
fn test_world_npcs_example() {
    let list = entries(&[
        "=== World ===",
        "Intro",
        "⭐─ Sub ─⭐",
        "Detail",
        "=== NPCs ===",
        "NPC Prompt",
    ]);
    let tree = SectionTreeBuilder::default().build(&list);

    assert_eq!(tree.len(), 2);
    let world = &tree[0];
    assert_eq!(world.name, "World");
    assert_eq!(world.original_key, "=== World ===");
    assert_eq!(names(&world.entries), vec!["Intro"]);
    assert_eq!(world.sub_sections.len(), 1);
    assert_eq!(world.sub_sections[0].name, "Sub");
    assert!(world.sub_sections[0].is_sub_section);
    assert_eq!(names(&world.sub_sections[0].entries), vec!["Detail"]);

    let npcs = &tree[1];
    assert_eq!(npcs.name, "NPCs");
    assert_eq!(names(&npcs.entries), vec!["NPC Prompt"]);
    assert!(npcs.sub_sections.is_empty());
}

#[test]
fn test_build_is_idempotent() {
    let list = entries(&["Loose", "=== A ===", "x", "<B>", "y", "=== C ==="]);
    let builder = SectionTreeBuilder::default();
    assert_eq!(builder.build(&list), builder.build(&list));
}

#[test]
fn test_entries_before_first_header_go_to_ungrouped_first() {
    let list = entries(&["Loose 1", "Loose 2", "=== A ===", "x"]);
    let tree = SectionTreeBuilder::default().build(&list);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].id, UNGROUPED_SECTION_ID);
    assert_eq!(tree[0].name, "Ungrouped");
    assert!(tree[0].header_entry.is_none());
    assert_eq!(names(&tree[0].entries), vec!["Loose 1", "Loose 2"]);
    assert_eq!(tree[1].name, "A");
}

#[test]
fn test_plain_list_is_one_ungrouped_section() {
    let list = entries(&["a", "b"]);
    let tree = SectionTreeBuilder::default().build(&list);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].id, UNGROUPED_SECTION_ID);
}

#[test]
fn test_only_sub_headers_wraps_everything_in_all() {
    let list = entries(&["<Orphan>", "x", "y"]);
    let tree = SectionTreeBuilder::default().build(&list);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].id, ALL_SECTION_ID);
    assert_eq!(tree[0].name, "All");
    assert_eq!(names(&tree[0].entries), vec!["<Orphan>", "x", "y"]);
}

#[test]
fn test_empty_input_builds_empty_tree() {
    assert!(SectionTreeBuilder::default().build(&[]).is_empty());
}

/// Known edge case: a sub-header before any section is never attached, and
/// the entries it collects do not appear in the tree.
#[test]
fn test_known_edge_case_orphan_sub_section_is_dropped() {
    let list = entries(&["<Orphan>", "lost", "=== A ===", "kept"]);
    let tree = SectionTreeBuilder::default().build(&list);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].name, "A");
    assert_eq!(names(&tree[0].entries), vec!["kept"]);
    assert!(all_identifiers(&tree).iter().all(|id| id != "p0" && id != "p1"));
}

#[test]
fn test_new_section_closes_sub_section() {
    let list = entries(&["=== A ===", "<B>", "in b", "=== C ===", "in c"]);
    let tree = SectionTreeBuilder::default().build(&list);
    assert_eq!(names(&tree[0].sub_sections[0].entries), vec!["in b"]);
    assert_eq!(names(&tree[1].entries), vec!["in c"]);
}

#[test]
fn test_no_identifier_lost_or_duplicated() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["a", "b", "c"],
        vec!["=== A ===", "a", "<S>", "s", "<T>", "t", "=== B ===", "b"],
        vec!["x", "=== A ===", "<S>", "=== B ===", "y"],
        vec!["<Only>", "z"],
        vec!["=== A ===", "=== B ===", "=== C ==="],
    ];
    for names in cases {
        let list = entries(&names);
        let tree = SectionTreeBuilder::default().build(&list);
        let mut expected: Vec<String> = list.iter().map(|e| e.identifier.clone()).collect();
        expected.sort();
        assert_eq!(all_identifiers(&tree), expected, "case {:?}", names);
    }
}

#[test]
fn test_section_ids_are_derived_from_header_identifiers() {
    let list = entries(&["=== A ===", "<S>"]);
    let tree = SectionTreeBuilder::default().build(&list);
    assert_eq!(tree[0].id, "section-p0");
    assert_eq!(tree[0].sub_sections[0].id, "sub-p1");
    assert_eq!(find_section(&tree, "sub-p1").map(|n| n.name.as_str()), Some("S"));
    assert!(find_section(&tree, "missing").is_none());
}

#[test]
fn test_counts_exclude_headers() {
    let mut list = entries(&["=== A ===", "a1", "<S>", "s1", "s2"]);
    list[1].enabled = true;
    list[3].enabled = true;
    list[0].enabled = true;
    let tree = SectionTreeBuilder::default().build(&list);
    assert_eq!(tree[0].total_count(), 3);
    assert_eq!(tree[0].enabled_count(), 2);
}

#[test]
fn test_collect_keys_depth_first() {
    let list = entries(&["=== A ===", "<S>", "=== B ==="]);
    let tree = SectionTreeBuilder::default().build(&list);
    assert_eq!(collect_keys(&tree), vec!["=== A ===", "<S>", "=== B ==="]);
}

#[test]
fn test_custom_synthetic_names() {
    let builder = SectionTreeBuilder::default().with_synthetic_names("Loose", "Everything");
    let tree = builder.build(&entries(&["a"]));
    assert_eq!(tree[0].name, "Loose");
    assert_eq!(tree[0].original_key, "Loose");
}

#[test]
fn test_filter_keeps_matching_entries_ranked() {
    let list = vec![
        PromptEntry::new("h", "=== Cast ==="),
        PromptEntry::new("a", "Scene Setup"),
        PromptEntry::new("b", "Villain").with_content("the main character foil"),
        PromptEntry::new("c", "Character Sheet"),
    ];
    let tree = SectionTreeBuilder::default().build(&list);
    let filtered = filter_sections(&tree, "character");
    assert_eq!(filtered.len(), 1);
    let ids: Vec<&str> = filtered[0]
        .entries
        .iter()
        .map(|e| e.identifier.as_str())
        .collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[test]
fn test_filter_keeps_whole_section_on_name_match() {
    let list = entries(&["=== Lore ===", "a", "b"]);
    let tree = SectionTreeBuilder::default().build(&list);
    let filtered = filter_sections(&tree, "lore");
    assert_eq!(filtered, tree);
}

#[test]
fn test_filter_drops_sections_without_matches() {
    let list = entries(&["=== A ===", "apple", "=== B ===", "banana"]);
    let tree = SectionTreeBuilder::default().build(&list);
    let filtered = filter_sections(&tree, "banana");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "B");
    assert_eq!(filter_sections(&tree, "  ").len(), 2);
}

#[test]
fn test_filter_ignores_synthetic_section_names() {
    let tree = SectionTreeBuilder::default().build(&entries(&["apple", "banana"]));
    assert_eq!(tree[0].name, "Ungrouped");
    assert!(filter_sections(&tree, "group").is_empty());

    let filtered = filter_sections(&tree, "apple");
    assert_eq!(filtered.len(), 1);
    assert_eq!(names(&filtered[0].entries), vec!["apple"]);

    let wrapped = SectionTreeBuilder::default().build(&entries(&["⭐─ Sub ─⭐", "x"]));
    assert_eq!(wrapped[0].name, "All");
    assert!(filter_sections(&wrapped, "all").is_empty());
}
