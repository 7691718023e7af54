use reqwest::Url;

fn digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

// Celular brasileiro (com ou sem DDI/DDD) ou qualquer número com tamanho de celular
pub fn is_whatsapp_number(phone: &str) -> bool {
    let clean = digits(phone);
    let bytes = clean.as_bytes();

    let brazilian_mobile = match bytes.len() {
        13 => clean.starts_with("55") && bytes[4] == b'9',
        11 => bytes[2] == b'9',
        9 => bytes[0] == b'9',
        _ => false,
    };

    brazilian_mobile || (10..=15).contains(&bytes.len())
}

pub fn format_whatsapp_number(phone: &str) -> String {
    let clean = digits(phone);

    if clean.starts_with("55") {
        return clean;
    }
    if clean.len() == 11 && clean.starts_with("11") {
        return format!("55{}", clean);
    }
    // 9 dígitos começando com 9: assume DDD 11
    if clean.len() == 9 && clean.starts_with('9') {
        return format!("5511{}", clean);
    }
    if (10..=11).contains(&clean.len()) {
        return format!("55{}", clean);
    }

    clean
}

pub fn whatsapp_url(phone: &str, message: Option<&str>) -> String {
    let base = format!("https://wa.me/{}", format_whatsapp_number(phone));

    match message.filter(|m| !m.is_empty()) {
        Some(text) => match Url::parse(&base) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("text", text);
                url.to_string()
            }
            Err(_) => base,
        },
        None => base,
    }
}

/// Link `tel:` com DDI 55. `None` para telefone vazio.
pub fn phone_href(phone: &str) -> Option<String> {
    let clean = digits(phone);
    if clean.is_empty() {
        return None;
    }

    if clean.starts_with("55") {
        Some(format!("tel:+{}", clean))
    } else {
        Some(format!("tel:+55{}", clean))
    }
}

pub fn rating_display(total_score: f64, reviews_count: u32) -> String {
    format!("★ {:.1} ({})", total_score, reviews_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_whatsapp_numbers() {
        assert!(is_whatsapp_number("(11) 98765-4321"));
        assert!(is_whatsapp_number("+55 21 99876-5432"));
        assert!(is_whatsapp_number("98765-4321"));
        assert!(!is_whatsapp_number(""));
        assert!(!is_whatsapp_number("3456-7890"));
    }

    #[test]
    fn formats_whatsapp_numbers() {
        assert_eq!(format_whatsapp_number("+55 (11) 98765-4321"), "5511987654321");
        assert_eq!(format_whatsapp_number("(11) 98765-4321"), "5511987654321");
        assert_eq!(format_whatsapp_number("98765-4321"), "5511987654321");
        assert_eq!(format_whatsapp_number("(31) 3456-7890"), "553134567890");
        assert_eq!(format_whatsapp_number("123"), "123");
    }

    #[test]
    fn builds_whatsapp_url() {
        assert_eq!(
            whatsapp_url("(11) 98765-4321", None),
            "https://wa.me/5511987654321"
        );
        let url = whatsapp_url("(11) 98765-4321", Some("Olá, vi no site"));
        assert!(url.starts_with("https://wa.me/5511987654321?text="));
        assert!(url.contains("Ol%C3%A1"));
    }

    #[test]
    fn builds_phone_href() {
        assert_eq!(phone_href("(11) 3456-7890").as_deref(), Some("tel:+551134567890"));
        assert_eq!(phone_href("+55 11 3456-7890").as_deref(), Some("tel:+551134567890"));
        assert_eq!(phone_href(""), None);
    }

    #[test]
    fn displays_rating_with_one_decimal() {
        assert_eq!(rating_display(4.85, 120), "★ 4.8 (120)");
        assert_eq!(rating_display(5.0, 3), "★ 5.0 (3)");
    }
}
