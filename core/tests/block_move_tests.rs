use inline_diff::{diff, DiffConfig, DiffReport, Fragment, FragmentKind, InlineDiff};

fn content(report: &DiffReport) -> Vec<&Fragment> {
    report
        .fragments
        .iter()
        .filter(|f| !f.kind.is_structural())
        .collect()
}

fn marks(report: &DiffReport) -> Vec<&Fragment> {
    content(report)
        .into_iter()
        .filter(|f| f.kind.is_mark())
        .collect()
}

fn envelope_openers(report: &DiffReport) -> Vec<&Fragment> {
    content(report)
        .into_iter()
        .filter(|f| {
            matches!(
                f.kind,
                FragmentKind::MovedOpenLeft | FragmentKind::MovedOpenRight
            )
        })
        .collect()
}

#[test]
fn swapped_halves_produce_one_move() {
    let report = diff("A B C D", "C D A B");
    assert_eq!(report.new_view(), "C D A B");
    assert_eq!(report.old_view(), "A B C D");

    let openers = envelope_openers(&report);
    assert_eq!(openers.len(), 1, "exactly one moved group: {report:?}");
    let mark_list = marks(&report);
    assert_eq!(mark_list.len(), 1);
    assert_eq!(mark_list[0].color, Some(1));
    assert_eq!(openers[0].color, Some(1));
    // The mark carries the moved group's old-side text.
    assert_eq!(mark_list[0].text, "A B");
}

#[test]
fn envelope_opener_points_at_the_mark() {
    let report = diff("A B C D", "C D A B");
    let fragments = content(&report);
    let mark_pos = fragments
        .iter()
        .position(|f| f.kind.is_mark())
        .expect("mark present");
    let open_pos = fragments
        .iter()
        .position(|f| {
            matches!(
                f.kind,
                FragmentKind::MovedOpenLeft | FragmentKind::MovedOpenRight
            )
        })
        .expect("opener present");
    let close_pos = fragments
        .iter()
        .position(|f| f.kind == FragmentKind::MovedClose)
        .expect("closer present");
    assert!(open_pos < close_pos);
    if mark_pos < open_pos {
        assert_eq!(fragments[open_pos].kind, FragmentKind::MovedOpenLeft);
        assert_eq!(fragments[mark_pos].kind, FragmentKind::MarkRight);
    } else {
        assert_eq!(fragments[open_pos].kind, FragmentKind::MovedOpenRight);
        assert_eq!(fragments[mark_pos].kind, FragmentKind::MarkLeft);
    }
}

#[test]
fn two_independent_swaps_get_distinct_colors() {
    let report = diff("P Q R S", "Q P S R");
    assert_eq!(report.new_view(), "Q P S R");
    assert_eq!(report.old_view(), "P Q R S");

    let mut colors: Vec<u32> = marks(&report).iter().filter_map(|f| f.color).collect();
    colors.sort_unstable();
    assert_eq!(colors, vec![1, 2]);
}

#[test]
fn moved_paragraph_is_detected() {
    let old = "Alpha paragraph with several words here.\n\n\
               Beta paragraph with other words follows.\n\n\
               Gamma paragraph closes the document now.";
    let new = "Beta paragraph with other words follows.\n\n\
               Gamma paragraph closes the document now.\n\n\
               Alpha paragraph with several words here.";
    let report = diff(old, new);
    assert_eq!(report.new_view(), new);
    assert_eq!(report.old_view(), old);
    assert!(
        !marks(&report).is_empty(),
        "paragraph move should produce a mark: {report:?}"
    );
}

#[test]
fn moves_disabled_renders_delete_and_insert() {
    let config = DiffConfig::builder()
        .show_block_moves(false)
        .build()
        .expect("valid config");
    let engine = InlineDiff::new(config).expect("engine builds");
    let report = engine.diff("A B C D", "C D A B");

    assert_eq!(report.new_view(), "C D A B");
    assert_eq!(report.old_view(), "A B C D");
    assert!(marks(&report).is_empty());
    assert!(envelope_openers(&report).is_empty());
    assert!(content(&report)
        .iter()
        .all(|f| f.color.is_none() && f.kind != FragmentKind::MovedClose));
}

// "filler" repeats on both sides, so the border matches are linked only
// through gap recursion and carry no unique anchor. Unlinking must
// dissolve them; disabling it must keep them.
const UNLINK_OLD: &str = "filler\nUnique anchor line with many words\nfiller";
const UNLINK_NEW: &str = "filler something\nUnique anchor line with many words\nother filler";

fn same_texts(report: &DiffReport) -> Vec<String> {
    content(report)
        .into_iter()
        .filter(|f| f.kind == FragmentKind::Same)
        .map(|f| f.text.clone())
        .collect()
}

#[test]
fn unlinking_dissolves_weak_border_blocks() {
    let report = diff(UNLINK_OLD, UNLINK_NEW);
    assert_eq!(report.new_view(), UNLINK_NEW);
    assert_eq!(report.old_view(), UNLINK_OLD);

    let sames = same_texts(&report);
    assert_eq!(sames.len(), 1, "only the anchor line stays: {sames:?}");
    assert!(sames[0].contains("Unique anchor line"));
}

#[test]
fn unlinking_disabled_keeps_weak_border_blocks() {
    let config = DiffConfig::builder()
        .unlink_blocks(false)
        .build()
        .expect("valid config");
    let engine = InlineDiff::new(config).expect("engine builds");
    let report = engine.diff(UNLINK_OLD, UNLINK_NEW);
    assert_eq!(report.new_view(), UNLINK_NEW);
    assert_eq!(report.old_view(), UNLINK_OLD);

    let sames = same_texts(&report);
    assert!(
        sames.iter().any(|s| s.contains("filler")),
        "weak matches survive without unlinking: {sames:?}"
    );
}
