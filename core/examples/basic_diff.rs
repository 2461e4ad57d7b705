//! Minimal usage: diff two strings and print the rendered result.

use inline_diff::{diff, render_text};

fn main() {
    let old = "The quick brown fox jumps over the lazy dog.\n\n\
               A second paragraph sits here unchanged.";
    let new = "A second paragraph sits here unchanged.\n\n\
               The quick red fox jumps over the lazy dog.";

    let report = diff(old, new);
    println!("{}", render_text(&report, false));

    for fragment in report.fragments.iter().filter(|f| !f.kind.is_structural()) {
        println!("{:>3} {:?}", fragment.kind.marker(), fragment.text);
    }
}
