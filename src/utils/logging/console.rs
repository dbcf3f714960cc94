//! Console output utilities
//!
//! Renders matched pairs as the two-column table shown to the user.

use itertools::Itertools;

use crate::algorithm::matching::types::MatchingResult;

/// Format matched pairs as a two-column table
#[must_use]
pub fn format_pairs_table(result: &MatchingResult) -> String {
    let header = ("Treated Patient ID", "Matched Control ID");
    let width = result
        .pairs
        .iter()
        .map(|p| p.treated_id.len())
        .chain(std::iter::once(header.0.len()))
        .max()
        .unwrap_or(0);

    let rows = result
        .id_pairs()
        .map(|(treated, control)| format!("{treated:<width$} | {control}"))
        .join("\n");

    let mut out = format!("{:<width$} | {}\n", header.0, header.1);
    out.push_str(&format!("{}-|-{}\n", "-".repeat(width), "-".repeat(header.1.len())));
    if !rows.is_empty() {
        out.push_str(&rows);
        out.push('\n');
    }
    out
}

/// Print matched pairs to stdout
pub fn print_pairs(result: &MatchingResult) {
    print!("{}", format_pairs_table(result));
    println!("{} matched pairs in {:?}", result.len(), result.matching_time);
}
