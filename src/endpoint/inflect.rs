//! Name inflection used when turning route specs into registry names.

use convert_case::{Case, Casing};

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("mouse", "mice"),
    ("ox", "oxen"),
];

/// `admin/users` → `Admin::Users`, `dragon_types` → `DragonTypes`.
///
/// Already qualified names pass through segment by segment, and a leading
/// `::` is preserved.
pub fn camelize(name: &str) -> String {
    let (absolute, rest) = match name.strip_prefix("::") {
        Some(rest) => (true, rest),
        None => (false, name),
    };

    let camel = rest
        .split('/')
        .flat_map(|part| part.split("::"))
        .filter(|part| !part.is_empty())
        .map(camelize_segment)
        .collect::<Vec<_>>()
        .join("::");

    if absolute {
        format!("::{camel}")
    } else {
        camel
    }
}

fn camelize_segment(segment: &str) -> String {
    if segment.contains(['_', '-', ' ']) {
        segment.to_case(Case::Pascal)
    } else {
        // keep inner capitals such as `TestsController`
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Plural of the last word: `Test` → `Tests`, `Category` → `Categories`.
pub fn pluralize(word: &str) -> String {
    if let Some(out) = swap_irregular(word, |(singular, plural)| (singular, plural)) {
        return out;
    }
    let lower = word.to_lowercase();
    if lower.ends_with('s') {
        word.to_string()
    } else if ["x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{word}es")
    } else if lower.ends_with('y') && !ends_with_vowel_y(&lower) {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{word}s")
    }
}

/// Singular of the last word: `Tests` → `Test`, `Boxes` → `Box`.
pub fn singularize(word: &str) -> String {
    if let Some(out) = swap_irregular(word, |(singular, plural)| (plural, singular)) {
        return out;
    }
    let lower = word.to_lowercase();
    if lower.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if ["sses", "xes", "zes", "ches", "shes"].iter().any(|s| lower.ends_with(s)) {
        word[..word.len() - 2].to_string()
    } else if lower.ends_with("ss") || !lower.ends_with('s') {
        word.to_string()
    } else {
        word[..word.len() - 1].to_string()
    }
}

fn ends_with_vowel_y(lower: &str) -> bool {
    let mut rev = lower.chars().rev();
    rev.next();
    matches!(rev.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

/// Replace an irregular trailing word, keeping the case of its first letter.
fn swap_irregular(
    word: &str,
    direction: impl Fn((&'static str, &'static str)) -> (&'static str, &'static str),
) -> Option<String> {
    let lower = word.to_lowercase();
    IRREGULAR.iter().find_map(|&pair| {
        let (from, to) = direction(pair);
        if !lower.ends_with(from) {
            return None;
        }
        let start = word.len() - from.len();
        // only whole words: the match starts the word or follows a boundary
        let boundary = start == 0
            || word[start..].starts_with(|c: char| c.is_uppercase())
            || word[..start].ends_with([':', '_']);
        if !boundary {
            return None;
        }
        let replacement = if word[start..].starts_with(|c: char| c.is_uppercase()) {
            let mut chars = to.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        } else {
            to.to_string()
        };
        Some(format!("{}{}", &word[..start], replacement))
    })
}
