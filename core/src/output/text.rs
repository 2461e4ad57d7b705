//! Plain-text rendering of the fragment stream.
//!
//! A lossy convenience view for terminals: deletions in `[-…-]`,
//! insertions in `{+…+}`, moved blocks bracketed with their move index,
//! and arrows marking the original location of moved text. Unicode
//! symbols give way to ASCII stand-ins with `no_unicode_symbols`.

use crate::fragment::{DiffReport, FragmentKind};

pub fn render_text(report: &DiffReport, no_unicode_symbols: bool) -> String {
    let mut out = String::new();
    for fragment in &report.fragments {
        let color = fragment.color.unwrap_or(0);
        match fragment.kind {
            FragmentKind::Same => out.push_str(&fragment.text),
            FragmentKind::Delete => {
                out.push_str("[-");
                out.push_str(&fragment.text);
                out.push_str("-]");
            }
            FragmentKind::Insert => {
                out.push_str("{+");
                out.push_str(&fragment.text);
                out.push_str("+}");
            }
            FragmentKind::MarkLeft => {
                if no_unicode_symbols {
                    out.push_str(&format!("<{color}"));
                } else {
                    out.push_str(&format!("◀{color}"));
                }
            }
            FragmentKind::MarkRight => {
                if no_unicode_symbols {
                    out.push_str(&format!(">{color}"));
                } else {
                    out.push_str(&format!("▶{color}"));
                }
            }
            FragmentKind::MovedOpenLeft => {
                if no_unicode_symbols {
                    out.push_str(&format!("(<{color} "));
                } else {
                    out.push_str(&format!("⟦◀{color} "));
                }
            }
            FragmentKind::MovedOpenRight => {
                if no_unicode_symbols {
                    out.push_str(&format!("(>{color} "));
                } else {
                    out.push_str(&format!("⟦▶{color} "));
                }
            }
            FragmentKind::MovedClose => {
                out.push_str(if no_unicode_symbols { ")" } else { "⟧" });
            }
            FragmentKind::OmitChars => {
                out.push_str(if no_unicode_symbols { "..." } else { "…" });
            }
            FragmentKind::OmitBlankLeft => {
                out.push_str(if no_unicode_symbols { " ..." } else { " …" });
            }
            FragmentKind::OmitBlankRight => {
                out.push_str(if no_unicode_symbols { "... " } else { "… " });
            }
            FragmentKind::FragmentSeparator => {
                out.push_str(if no_unicode_symbols {
                    "\n- - - - -\n"
                } else {
                    "\n⸻\n"
                });
            }
            FragmentKind::FragmentStart
            | FragmentKind::FragmentEnd
            | FragmentKind::ContainerStart
            | FragmentKind::ContainerEnd => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{DiffReport, Fragment, FragmentKind};

    fn report(units: Vec<Fragment>) -> DiffReport {
        let mut fragments = vec![
            Fragment::structural(FragmentKind::ContainerStart),
            Fragment::structural(FragmentKind::FragmentStart),
        ];
        fragments.extend(units);
        fragments.push(Fragment::structural(FragmentKind::FragmentEnd));
        fragments.push(Fragment::structural(FragmentKind::ContainerEnd));
        DiffReport::new(fragments)
    }

    #[test]
    fn renders_word_replacement() {
        let rendered = render_text(
            &report(vec![
                Fragment::new("the quick ", FragmentKind::Same, None),
                Fragment::new("brown", FragmentKind::Delete, None),
                Fragment::new("red", FragmentKind::Insert, None),
                Fragment::new(" fox", FragmentKind::Same, None),
            ]),
            true,
        );
        assert_eq!(rendered, "the quick [-brown-]{+red+} fox");
    }

    #[test]
    fn renders_move_marks_with_color() {
        let rendered = render_text(
            &report(vec![
                Fragment::new("C D ", FragmentKind::Same, None),
                Fragment::new("A B", FragmentKind::MarkRight, Some(1)),
                Fragment::new("", FragmentKind::MovedOpenLeft, Some(1)),
                Fragment::new("A B", FragmentKind::Same, Some(1)),
                Fragment::new("", FragmentKind::MovedClose, Some(1)),
            ]),
            true,
        );
        assert_eq!(rendered, "C D >1(<1 A B)");
    }
}
