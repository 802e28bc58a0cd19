//! File and folder name normalization.
//!
//! Names are rewritten to the `[A-Za-z0-9_]` alphabet: Cyrillic letters are
//! transliterated to Latin, every other character outside the alphabet turns
//! into `_`, and a run of such characters collapses into a single `_`.
//! A plain ASCII file extension survives untouched.
//!
//! ```
//! use clean_folder::normalizer::normalize;
//!
//! assert_eq!(normalize("Файл №1.txt"), "Fail_1.txt");
//! assert_eq!(normalize("мій документ.pdf"), "mii_dokument.pdf");
//! ```

/// Placeholder for characters that have no safe representation.
const FILLER: char = '_';

/// Latin spelling of a lowercase Cyrillic letter (Russian and Ukrainian).
fn transliterate_lower(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "j",
        'з' => "z",
        'и' => "i",
        'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'є' => "je",
        'і' => "i",
        'ї' => "ji",
        'ґ' => "g",
        _ => return None,
    };
    Some(latin)
}

/// Latin spelling of a Cyrillic letter, upper-cased in full when the letter
/// is uppercase (`Щ` → `SCH`, `Я` → `YA`).
///
/// Returns `None` for anything that is not in the table.
pub fn transliterate(c: char) -> Option<String> {
    if !c.is_uppercase() {
        return transliterate_lower(c).map(str::to_string);
    }

    let mut lower = c.to_lowercase();
    let (Some(single), None) = (lower.next(), lower.next()) else {
        return None;
    };
    transliterate_lower(single).map(str::to_ascii_uppercase)
}

/// Splits `name` into stem and extension.
///
/// Only a non-empty, ASCII-alphanumeric suffix after the last dot counts as an
/// extension, and a leading dot (as in `.bashrc`) never starts one.
///
/// ```
/// use clean_folder::normalizer::split_extension;
///
/// assert_eq!(split_extension("photo.final.JPG"), Some(("photo.final", "JPG")));
/// assert_eq!(split_extension(".bashrc"), None);
/// assert_eq!(split_extension("notes"), None);
/// ```
pub fn split_extension(name: &str) -> Option<(&str, &str)> {
    let dot = name.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let ext = &name[dot + 1..];
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((&name[..dot], ext))
}

/// Normalizes a name that has no extension, such as a folder name.
///
/// The result is never empty: a stem with nothing left to keep becomes `_`.
pub fn normalize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut in_gap = false;

    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            in_gap = false;
        } else if let Some(latin) = transliterate(c) {
            // Hard and soft signs vanish without closing a gap.
            if !latin.is_empty() {
                out.push_str(&latin);
                in_gap = false;
            }
        } else if !in_gap {
            out.push(FILLER);
            in_gap = true;
        }
    }

    if out.is_empty() {
        out.push(FILLER);
    }
    out
}

/// Normalizes a file name, preserving its extension.
///
/// Normalizing an already normalized name returns it unchanged.
pub fn normalize(name: &str) -> String {
    match split_extension(name) {
        Some((stem, ext)) => format!("{}.{}", normalize_stem(stem), ext),
        None => normalize_stem(name),
    }
}
