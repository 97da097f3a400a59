//! # Naming Module
//!
//! Turns raw catalog identifiers into PascalCase type and member names.
//!
//! Catalog names show up as `snake_case`, `SHOUTY_SNAKE_CASE`, all lowercase, or
//! PascalCase with embedded acronyms (`IDCard`). All of them end up as a single
//! word-capitalized identifier. Two-letter capital pairs (`AbType` vs `ABType`)
//! are ordinary word boundaries; only runs of three or more capitals are
//! treated as acronyms and folded.

/// Normalizes a raw catalog identifier into a PascalCase identifier.
///
/// Never fails; a name that is already normalized comes back unchanged.
///
/// # Example
///
/// ```rust
/// use entity_scaffold::normalize_name;
///
/// assert_eq!(normalize_name("user_id"), "UserId");
/// assert_eq!(normalize_name("ID_CARD"), "IdCard");
/// assert_eq!(normalize_name("XMLParser"), "XmlParser");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let spaced = raw.replace('_', " ");

    let mut name = if spaced.contains(' ') {
        spaced.split(' ').filter(|word| !word.is_empty()).map(capitalize_word).collect()
    } else {
        spaced
    };

    if is_all_upper(&name) {
        name = capitalize_first(&name.to_lowercase());
    }

    fold_acronym_runs(&name)
}

/// Lowercases a shouting word, then capitalizes its first character.
fn capitalize_word(word: &str) -> String {
    if is_all_upper(word) {
        capitalize_first(&word.to_lowercase())
    } else {
        capitalize_first(word)
    }
}

/// True when no letter in `input` is lowercase. Non-letters are ignored.
fn is_all_upper(input: &str) -> bool {
    input.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
}

fn capitalize_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => input.to_string(),
    }
}

/// Rewrites every run of consecutive uppercase characters.
///
/// A run of 3+ that is followed by something keeps its first and last letter
/// capitalized (`XMLParser` -> `XmlParser`, the last capital opens the next
/// word). A run of 2+ that ends the string keeps only its first letter.
/// Anything shorter is left alone.
fn fold_acronym_runs(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    let mut run_start = None;

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            run_start.get_or_insert(i);
            continue;
        }

        if let Some(start) = run_start.take() {
            let run = &chars[start..i];
            if run.len() >= 3 {
                push_folded(&mut out, run, true);
            } else {
                out.extend(run);
            }
        }
        out.push(c);
    }

    if let Some(start) = run_start {
        let run = &chars[start..];
        if run.len() >= 2 {
            push_folded(&mut out, run, false);
        } else {
            out.extend(run);
        }
    }

    out
}

fn push_folded(out: &mut String, run: &[char], keep_last_upper: bool) {
    let last = run.len() - 1;
    for (i, &c) in run.iter().enumerate() {
        if i == 0 || (keep_last_upper && i == last) {
            out.push(c);
        } else {
            out.extend(c.to_lowercase());
        }
    }
}
