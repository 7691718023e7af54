use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

const MAX_SLUG_LEN: usize = 200;

// "Café com Leite!" -> "cafe-com-leite"
pub fn generate_slug(text: &str) -> String {
    let lowered = text.to_lowercase();

    // NFD separa os acentos; depois só sobra [a-z0-9], espaço e hífen
    let cleaned: String = lowered
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch.is_whitespace() || *ch == '-')
        .collect();

    let mut slug = String::with_capacity(cleaned.len());
    let mut prev_hyphen = false;

    for ch in cleaned.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            if !prev_hyphen {
                slug.push('-');
                prev_hyphen = true;
            }
        } else {
            slug.push(ch);
            prev_hyphen = false;
        }
    }

    slug.trim_matches('-').to_string()
}

/// Gera o slug de `text` e, se já estiver em uso, acrescenta `-1`, `-2`, ...
/// até encontrar um livre.
pub fn create_unique_slug<S: AsRef<str>>(text: &str, existing: &[S]) -> String {
    let base = generate_slug(text);
    let taken = |candidate: &str| existing.iter().any(|s| s.as_ref() == candidate);

    let mut slug = base.clone();
    let mut counter = 1u64;

    while taken(&slug) {
        slug = format!("{}-{}", base, counter);
        counter += 1;
    }

    slug
}

pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
