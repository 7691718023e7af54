use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub code: &'static str,
    pub name: &'static str,
    /// Trecho usado nas URLs públicas: `/pilates-<slug>`.
    pub slug: &'static str,
    pub file_name: &'static str,
}

pub const CITIES: [City; 5] = [
    City { code: "sp", name: "São Paulo", slug: "sao-paulo", file_name: "pilates-sp.json" },
    City { code: "rj", name: "Rio de Janeiro", slug: "rio-de-janeiro", file_name: "pilates-rj.json" },
    City { code: "bh", name: "Belo Horizonte", slug: "belo-horizonte", file_name: "pilates-bh.json" },
    City { code: "bsb", name: "Brasília", slug: "brasilia", file_name: "pilates-bsb.json" },
    City { code: "cwb", name: "Curitiba", slug: "curitiba", file_name: "pilates-cwb.json" },
];

// Códigos desconhecidos caem no próprio código, como nas URLs antigas
pub fn city_slug(code: &str) -> &str {
    CITIES
        .iter()
        .find(|c| c.code == code)
        .map(|c| c.slug)
        .unwrap_or(code)
}
