//! Salt and dosage-form words that trail a substance name

/// Words that end the substance part of a product name.
pub const SALTS: &[&str] = &[
    "acetate",
    "disodium",
    "sulfate",
    "sodium",
    "phosphate",
    "hcl",
    "mesylate",
    "patch",
    "hydrochloride",
    "for",
    "granules",
    "ready",
    "citrate",
];

/// Drop the first salt word (never the leading word) and everything after it.
///
/// `"Imatinib Mesylate Tablets"` becomes `"Imatinib"`. Returns `None` when no
/// salt word follows the first word.
pub fn strip_salt(name: &str) -> Option<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    let cut = words
        .iter()
        .skip(1)
        .position(|w| SALTS.iter().any(|s| w.eq_ignore_ascii_case(s)))?
        + 1;
    Some(words[..cut].join(" "))
}
