use super::*;

const SCREEN: Rect = Rect::new(0, 0, 80, 24);

fn fixed(x: i32, y: i32, w: i32, h: i32) -> LayoutSpec {
    LayoutSpec::fixed(x, y, w, h)
}

fn tree_with_root() -> (ControlTree, ControlId) {
    let mut tree = ControlTree::new();
    let root = tree
        .insert_root(LayoutSpec::fill(), Box::new(DefaultWidget))
        .unwrap();
    (tree, root)
}

#[test]
fn insert_builds_parent_child_links() {
    let (mut tree, root) = tree_with_root();
    let a = tree
        .insert(root, fixed(1, 1, 10, 3), Box::new(DefaultWidget))
        .unwrap();
    let b = tree
        .insert(root, fixed(1, 5, 10, 3), Box::new(DefaultWidget))
        .unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.state(root).unwrap().children(), &[a, b]);
    assert_eq!(tree.state(a).unwrap().parent(), Some(root));
    // First eligible child becomes the current one.
    assert_eq!(tree.state(root).unwrap().current_child(), Some(0));
}

#[test]
fn insert_under_stale_parent_is_rejected() {
    let (mut tree, root) = tree_with_root();
    let a = tree
        .insert(root, fixed(0, 0, 5, 1), Box::new(DefaultWidget))
        .unwrap();
    tree.remove(a);
    let err = tree.insert(a, fixed(0, 0, 5, 1), Box::new(DefaultWidget));
    assert!(matches!(err, Err(TreeError::InvalidParent)));
}

#[test]
fn structurally_unresolvable_layout_is_rejected_at_insert() {
    let (mut tree, root) = tree_with_root();
    let spec = LayoutSpec::parse("w:10,h:2").unwrap();
    let err = tree.insert(root, spec, Box::new(DefaultWidget));
    assert!(matches!(err, Err(TreeError::Layout(_))));
    assert_eq!(tree.len(), 1);
}

#[test]
fn remove_drops_the_whole_subtree() {
    let (mut tree, root) = tree_with_root();
    let panel = tree
        .insert(root, fixed(0, 0, 40, 20), Box::new(DefaultWidget))
        .unwrap();
    let inner = tree
        .insert(panel, fixed(1, 1, 10, 3), Box::new(DefaultWidget))
        .unwrap();
    assert!(tree.remove(panel));
    assert!(!tree.contains(panel));
    assert!(!tree.contains(inner));
    assert!(tree.state(root).unwrap().children().is_empty());
    assert_eq!(tree.state(root).unwrap().current_child(), None);
}

#[test]
fn remove_fixes_sibling_current_child_index() {
    let (mut tree, root) = tree_with_root();
    let a = tree
        .insert(root, fixed(0, 0, 5, 1), Box::new(DefaultWidget))
        .unwrap();
    let b = tree
        .insert(root, fixed(0, 1, 5, 1), Box::new(DefaultWidget))
        .unwrap();
    tree.set_focus(b);
    assert_eq!(tree.state(root).unwrap().current_child(), Some(1));
    tree.remove(a);
    assert_eq!(tree.state(root).unwrap().current_child(), Some(0));
    assert_eq!(tree.state(root).unwrap().children(), &[b]);
}

#[test]
fn layout_pass_resolves_nested_clips() {
    let (mut tree, root) = tree_with_root();
    let window = tree
        .insert(root, fixed(5, 3, 40, 10), Box::new(DefaultWidget))
        .unwrap();
    let child = tree
        .insert(window, fixed(2, 1, 10, 3), Box::new(DefaultWidget))
        .unwrap();
    tree.propagate_layout(root, SCREEN);

    assert_eq!(tree.state(root).unwrap().resolved(), Rect::new(0, 0, 80, 24));
    assert_eq!(tree.state(window).unwrap().resolved(), Rect::new(5, 3, 40, 10));
    let clip = tree.state(child).unwrap().clip();
    assert_eq!(clip.origin, Pos::new(7, 4));
    assert_eq!(clip.rect, Rect::new(7, 4, 10, 3));
    assert!(clip.visible);
}

#[test]
fn margins_shift_the_children() {
    let (mut tree, root) = tree_with_root();
    let window = tree
        .insert(root, fixed(5, 3, 40, 10), Box::new(DefaultWidget))
        .unwrap();
    tree.state_mut(window)
        .unwrap()
        .set_margins(crate::layout::Margins::new(1, 1, 1, 1));
    let child = tree
        .insert(window, fixed(0, 0, 10, 3), Box::new(DefaultWidget))
        .unwrap();
    tree.propagate_layout(root, SCREEN);
    assert_eq!(tree.state(child).unwrap().clip().origin, Pos::new(6, 4));
}

#[test]
fn layout_is_deterministic_across_passes() {
    let (mut tree, root) = tree_with_root();
    let a = tree
        .insert(root, LayoutSpec::parse("l:2,r:2,t:1,h:50%").unwrap(), Box::new(DefaultWidget))
        .unwrap();
    tree.propagate_layout(root, SCREEN);
    let first = tree.state(a).unwrap().resolved();
    for _ in 0..5 {
        tree.propagate_layout(root, SCREEN);
        assert_eq!(tree.state(a).unwrap().resolved(), first);
    }
}

#[test]
fn hit_test_finds_the_deepest_control() {
    let (mut tree, root) = tree_with_root();
    let control = tree
        .insert(root, fixed(1, 1, 10, 3), Box::new(DefaultWidget))
        .unwrap();
    tree.propagate_layout(root, SCREEN);

    assert_eq!(tree.hit_test(root, Pos::new(5, 2)), Some(control));
    assert_eq!(tree.hit_test(root, Pos::new(15, 2)), Some(root));
    assert_eq!(tree.hit_test(root, Pos::new(80, 2)), None);
}

#[test]
fn hit_test_skips_hidden_and_disabled_controls() {
    let (mut tree, root) = tree_with_root();
    let control = tree
        .insert(root, fixed(1, 1, 10, 3), Box::new(DefaultWidget))
        .unwrap();
    tree.propagate_layout(root, SCREEN);
    tree.state_mut(control).unwrap().set_enabled(false);
    assert_eq!(tree.hit_test(root, Pos::new(5, 2)), Some(root));

    tree.state_mut(control).unwrap().set_enabled(true);
    tree.state_mut(control).unwrap().set_visible(false);
    assert_eq!(tree.hit_test(root, Pos::new(5, 2)), Some(root));
}

#[test]
fn hit_test_prefers_the_focused_sibling_on_overlap() {
    let (mut tree, root) = tree_with_root();
    let a = tree
        .insert(root, fixed(0, 0, 20, 10), Box::new(DefaultWidget))
        .unwrap();
    let b = tree
        .insert(root, fixed(5, 5, 20, 10), Box::new(DefaultWidget))
        .unwrap();
    tree.propagate_layout(root, SCREEN);

    // Overlap region; the current child wins the tie.
    assert_eq!(tree.hit_test(root, Pos::new(7, 7)), Some(a));
    tree.set_focus(b);
    assert_eq!(tree.hit_test(root, Pos::new(7, 7)), Some(b));
}

#[test]
fn set_focus_rechains_current_child_indexes() {
    let (mut tree, root) = tree_with_root();
    let panel = tree
        .insert(root, fixed(0, 0, 40, 20), Box::new(DefaultWidget))
        .unwrap();
    let a = tree
        .insert(panel, fixed(0, 0, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    let b = tree
        .insert(panel, fixed(0, 1, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    assert_eq!(tree.focused_leaf(root), Some(a));

    assert!(tree.set_focus(b));
    assert_eq!(tree.focused_leaf(root), Some(b));
    assert_eq!(tree.state(panel).unwrap().current_child(), Some(1));
    assert_eq!(tree.state(root).unwrap().current_child(), Some(0));
}

#[test]
fn focus_is_refused_for_non_interactive_controls() {
    let (mut tree, root) = tree_with_root();
    let a = tree
        .insert(root, fixed(0, 0, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    tree.state_mut(a).unwrap().set_enabled(false);
    assert!(!tree.set_focus(a));
    tree.remove(a);
    assert!(!tree.set_focus(a));
}

#[test]
fn tab_stops_list_only_leaves_of_the_tab_order() {
    let (mut tree, root) = tree_with_root();
    let panel = tree
        .insert(root, fixed(0, 0, 40, 20), Box::new(DefaultWidget))
        .unwrap();
    let a = tree
        .insert(panel, fixed(0, 0, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    let b = tree
        .insert(panel, fixed(0, 1, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    let c = tree
        .insert(root, fixed(0, 21, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    // The panel has eligible descendants, so it defers to them.
    assert_eq!(tree.tab_stops(root), vec![a, b, c]);
}

#[test]
fn tab_stops_skip_non_eligible_controls() {
    let (mut tree, root) = tree_with_root();
    let a = tree
        .insert(root, fixed(0, 0, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    let b = tree
        .insert(root, fixed(0, 1, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    tree.state_mut(a).unwrap().set_tab_stop(false);
    assert_eq!(tree.tab_stops(root), vec![b]);
    tree.state_mut(b).unwrap().set_enabled(false);
    assert_eq!(tree.tab_stops(root), vec![root]);
}

#[test]
fn find_next_control_wraps_in_both_directions() {
    let (mut tree, root) = tree_with_root();
    let a = tree
        .insert(root, fixed(0, 0, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    let b = tree
        .insert(root, fixed(0, 1, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    let c = tree
        .insert(root, fixed(0, 2, 10, 1), Box::new(DefaultWidget))
        .unwrap();

    assert_eq!(tree.find_next_control(root, true), Some(b));
    tree.set_focus(c);
    assert_eq!(tree.find_next_control(root, true), Some(a));
    assert_eq!(tree.find_next_control(root, false), Some(b));
    tree.set_focus(a);
    assert_eq!(tree.find_next_control(root, false), Some(c));
}

#[test]
fn find_hotkey_is_case_insensitive_and_skips_disabled_subtrees() {
    let (mut tree, root) = tree_with_root();
    let panel = tree
        .insert(root, fixed(0, 0, 40, 20), Box::new(DefaultWidget))
        .unwrap();
    let save = tree
        .insert(panel, fixed(0, 0, 10, 1), Box::new(DefaultWidget))
        .unwrap();
    tree.state_mut(save).unwrap().set_caption("&Save");

    assert_eq!(tree.find_hotkey(root, 's'), Some(save));
    assert_eq!(tree.find_hotkey(root, 'S'), Some(save));
    assert_eq!(tree.find_hotkey(root, 'q'), None);

    tree.state_mut(panel).unwrap().set_enabled(false);
    assert_eq!(tree.find_hotkey(root, 's'), None);
}
