pub mod author;
pub mod category;
pub mod city;
pub mod post;
pub mod studio;
pub mod tag;

// Campo ausente, vazio ou só espaços vira None (equivale a `valor || null`)
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
