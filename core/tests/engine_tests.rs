use inline_diff::{diff, DiffConfig, DiffReport, Fragment, FragmentKind, InlineDiff};

/// Content units of the stream, with structural markers stripped.
fn content(report: &DiffReport) -> Vec<&Fragment> {
    report
        .fragments
        .iter()
        .filter(|f| !f.kind.is_structural())
        .collect()
}

fn kinds_and_texts(report: &DiffReport) -> Vec<(FragmentKind, String)> {
    content(report)
        .into_iter()
        .map(|f| (f.kind, f.text.clone()))
        .collect()
}

#[test]
fn identical_texts_produce_single_same_fragment() {
    let report = diff("hello world", "hello world");
    assert!(report.is_unchanged());
    assert_eq!(
        kinds_and_texts(&report),
        vec![(FragmentKind::Same, "hello world".to_owned())]
    );
}

#[test]
fn stream_is_wrapped_in_containers() {
    let report = diff("hello world", "hello world");
    let kinds: Vec<FragmentKind> = report.fragments.iter().map(|f| f.kind).collect();
    assert_eq!(kinds.first(), Some(&FragmentKind::ContainerStart));
    assert_eq!(kinds.get(1), Some(&FragmentKind::FragmentStart));
    assert_eq!(kinds.get(kinds.len() - 2), Some(&FragmentKind::FragmentEnd));
    assert_eq!(kinds.last(), Some(&FragmentKind::ContainerEnd));
}

#[test]
fn insertion_into_empty_text() {
    let report = diff("", "abc");
    assert_eq!(
        kinds_and_texts(&report),
        vec![(FragmentKind::Insert, "abc".to_owned())]
    );
}

#[test]
fn deletion_to_empty_text() {
    let report = diff("abc", "");
    assert_eq!(
        kinds_and_texts(&report),
        vec![(FragmentKind::Delete, "abc".to_owned())]
    );
}

#[test]
fn word_replacement_is_word_granular() {
    let report = diff("the quick brown fox", "the quick red fox");
    assert_eq!(
        kinds_and_texts(&report),
        vec![
            (FragmentKind::Same, "the quick ".to_owned()),
            (FragmentKind::Delete, "brown".to_owned()),
            (FragmentKind::Insert, "red".to_owned()),
            (FragmentKind::Same, " fox".to_owned()),
        ]
    );
}

#[test]
fn split_word_refines_to_characters() {
    let report = diff("word", "w ord");
    assert_eq!(
        kinds_and_texts(&report),
        vec![
            (FragmentKind::Same, "w".to_owned()),
            (FragmentKind::Insert, " ".to_owned()),
            (FragmentKind::Same, "ord".to_owned()),
        ]
    );
}

#[test]
fn diff_is_idempotent_on_equal_inputs() {
    for text in [
        "",
        "one",
        "a b c d e",
        "multi\nline\ntext\n\nwith paragraphs",
        "unicode: łódź, 東京, ñandú",
        "[[Wiki Link]] and {{template|arg}}",
    ] {
        let report = diff(text, text);
        assert!(report.is_unchanged(), "not unchanged for {text:?}");
        assert_eq!(report.new_view(), text);
    }
}

#[test]
fn line_endings_are_normalized_before_comparison() {
    let report = diff("alpha\r\nbeta\rgamma", "alpha\nbeta\ngamma");
    assert!(report.is_unchanged());
}

#[test]
fn strip_trailing_newline_option_applies_to_both_sides() {
    let config = DiffConfig::builder()
        .strip_trailing_newline(true)
        .build()
        .expect("valid config");
    let engine = InlineDiff::new(config).expect("engine builds");
    let report = engine.diff("same text\n", "same text");
    assert!(report.is_unchanged());
}

#[test]
fn sentence_level_changes_stay_localized() {
    let old = "First sentence here. Second sentence here. Third sentence here.";
    let new = "First sentence here. Second statement here. Third sentence here.";
    let report = diff(old, new);
    assert_eq!(report.new_view(), new);
    assert_eq!(report.old_view(), old);

    let deleted: String = content(&report)
        .into_iter()
        .filter(|f| f.kind == FragmentKind::Delete)
        .map(|f| f.text.as_str())
        .collect();
    assert!(deleted.contains("sentence"));
    assert!(!deleted.contains("First"), "unchanged head must stay same");
}

#[test]
fn wiki_atoms_are_replaced_whole() {
    let old = "see [[Old Page]] for details";
    let new = "see [[New Page]] for details";
    let report = diff(old, new);
    assert_eq!(report.new_view(), new);
    assert_eq!(report.old_view(), old);

    let kinds = kinds_and_texts(&report);
    assert!(kinds.contains(&(FragmentKind::Delete, "[[Old Page]]".to_owned()))
        || kinds
            .iter()
            .any(|(k, t)| *k == FragmentKind::Delete && t.contains("Old")));
}

#[test]
fn infallible_diff_never_panics_on_odd_input() {
    let report = diff("\u{2028}\u{2029}\t \u{00A0}", "mixed \u{2028} separators");
    assert_eq!(report.new_view(), "mixed \u{2028} separators");
}

#[test]
fn error_flag_stays_clear_in_unit_testing_mode() {
    let config = DiffConfig::builder()
        .unit_testing(true)
        .build()
        .expect("valid config");
    let engine = InlineDiff::new(config).expect("engine builds");
    let report = engine.diff(
        "the quick brown fox jumps over the lazy dog",
        "the quick red fox leaps over the lazy dog",
    );
    assert!(!report.error);
}
