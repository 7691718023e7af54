//! Arquivos MDX do blog.
//!
//! O corpo dos posts fica em `CONTENT_DIR` e é referenciado pela coluna
//! `content_file`. Aqui só lemos o fonte; a compilação do MDX é feita pelo
//! front-end, que recebe também a lista de widgets usados no documento.

use std::{io::ErrorKind, path::PathBuf};

use serde::Serialize;
use tokio::fs;

pub const MDX_EXTENSION: &str = ".mdx";

/// Widgets que podem ser embutidos num post, na ordem de registro.
pub const MDX_COMPONENTS: [&str; 7] = [
    "TopStudios",
    "StudioFinder",
    "LiveStats",
    "PriceComparator",
    "StudiosMap",
    "BlogCTA",
    "StudioCard",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MdxDocument {
    pub content: String,
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct MdxLoader {
    dir: PathBuf,
}

impl MdxLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `None` quando o arquivo não existe (ou não pode ser lido).
    pub async fn get_mdx_content(&self, filename: &str) -> Option<MdxDocument> {
        if !is_plain_filename(filename) {
            tracing::warn!("Arquivo MDX não encontrado: {}", filename);
            return None;
        }

        let path = self.dir.join(filename);
        match fs::read_to_string(&path).await {
            Ok(content) => Some(MdxDocument {
                content,
                filename: filename.to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Arquivo MDX não encontrado: {}", filename);
                None
            }
            Err(e) => {
                tracing::error!("Erro ao processar arquivo MDX {}: {:?}", filename, e);
                None
            }
        }
    }

    /// Arquivos `.mdx` do diretório, em ordem alfabética. Diretório ausente
    /// devolve lista vazia.
    pub async fn list_mdx_files(&self) -> Vec<String> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!("Erro ao ler o diretório MDX: {:?}", e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if let Some(name) = entry.file_name().to_str() {
                        if name.ends_with(MDX_EXTENSION) {
                            files.push(name.to_string());
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Erro ao ler o diretório MDX: {:?}", e);
                    break;
                }
            }
        }

        files.sort();
        files
    }
}

// Só nomes simples: nada de subdiretórios nem "..".
fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\'])
}

/// Widgets registrados que aparecem no documento como `<Nome`.
pub fn embedded_components(source: &str) -> Vec<&'static str> {
    MDX_COMPONENTS
        .iter()
        .copied()
        .filter(|name| uses_component(source, name))
        .collect()
}

fn uses_component(source: &str, name: &str) -> bool {
    let tag = format!("<{}", name);
    source.match_indices(&tag).any(|(idx, _)| {
        source[idx + tag.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '/' || c == '>')
    })
}
