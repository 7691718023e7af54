use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Json,
};
use chrono::Utc;
use mime::Mime;
use serde::Serialize;
use tokio::fs;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    utils::slug::is_valid_slug,
};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024; // 5MB
pub const MAX_STUDIO_IMAGE_BYTES: usize = 10 * 1024 * 1024; // 10MB

const FEATURED_FOLDER: &str = "featured-images";
const STUDIO_FOLDER: &str = "studios";
// Pastas aceitas no campo "folder" do upload genérico
const UPLOAD_FOLDERS: [&str; 2] = ["blog", STUDIO_FOLDER];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
    pub path: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
}

struct ImageFile {
    data: Bytes,
    content_type: Mime,
}

// Campos do formulário além do arquivo
#[derive(Default)]
struct UploadFields {
    folder: Option<String>,
    studio_slug: Option<String>,
}

/// Extensão gravada para cada tipo aceito.
pub fn image_extension(content_type: &Mime) -> Option<&'static str> {
    if content_type.type_() != mime::IMAGE {
        return None;
    }
    match content_type.subtype().as_str() {
        "jpeg" | "jpg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        _ => None,
    }
}

fn upload_folder(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|f| UPLOAD_FOLDERS.iter().copied().find(|allowed| *allowed == f))
        .unwrap_or(UPLOAD_FOLDERS[0])
}

/// Nome único: `<timestamp>-<uuid curto>.<ext>`.
fn unique_filename(ext: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", Utc::now().timestamp_millis(), &id[..8], ext)
}

/// Foto de estúdio: `<slug>-<timestamp>.<ext>`.
fn studio_filename(studio_slug: &str, ext: &str) -> String {
    format!("{}-{}.{}", studio_slug, Utc::now().timestamp_millis(), ext)
}

// Lê o campo "file" e os campos de texto conhecidos do formulário
async fn read_form(mut multipart: Multipart) -> AppResult<(ImageFile, UploadFields)> {
    let mut file = None;
    let mut fields = UploadFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Erro ao ler o formulário"))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let content_type = field
                    .content_type()
                    .and_then(|ct| ct.parse::<Mime>().ok())
                    .ok_or_else(|| AppError::bad_request("Tipo de arquivo não permitido"))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Erro ao ler o arquivo"))?;
                file = Some(ImageFile { data, content_type });
            }
            "folder" => {
                fields.folder = field.text().await.ok();
            }
            "studioSlug" => {
                fields.studio_slug = field.text().await.ok().map(|s| s.trim().to_string());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::bad_request("Nenhum arquivo enviado"))?;
    Ok((file, fields))
}

fn check_image(file: &ImageFile, max_bytes: usize) -> AppResult<&'static str> {
    let ext = image_extension(&file.content_type).ok_or_else(|| {
        AppError::bad_request("Tipo de arquivo não permitido. Use JPEG, PNG, GIF ou WebP")
    })?;

    if file.data.len() > max_bytes {
        return Err(AppError::bad_request(format!(
            "Arquivo muito grande. Máximo {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(ext)
}

async fn save_image(
    state: &AppState,
    file: ImageFile,
    folder: &str,
    filename: String,
) -> AppResult<UploadResponse> {
    let dir = state.config.upload_dir.join(folder);
    fs::create_dir_all(&dir).await.map_err(|e| {
        tracing::error!("Erro criando diretório de upload {:?}: {:?}", dir, e);
        AppError::Internal("Erro ao salvar arquivo")
    })?;

    let filepath = dir.join(&filename);
    if let Err(e) = fs::write(&filepath, &file.data).await {
        tracing::error!("Erro salvando imagem: {:?}", e);
        return Err(AppError::Internal("Erro ao salvar arquivo"));
    }

    let path = format!("{}/{}", folder, filename);
    tracing::info!("Upload salvo: {} ({} bytes)", path, file.data.len());

    Ok(UploadResponse {
        success: true,
        url: format!("/uploads/{}", path),
        filename,
        path,
        size: file.data.len(),
        content_type: file.content_type.essence_str().to_string(),
    })
}

// POST /api/admin/upload (multipart: file, folder opcional)
pub async fn upload_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let (file, fields) = read_form(multipart).await?;
    let folder = upload_folder(fields.folder.as_deref());
    let ext = check_image(&file, MAX_IMAGE_BYTES)?;

    save_image(&state, file, folder, unique_filename(ext)).await.map(Json)
}

// POST /api/admin/upload/featured-image
pub async fn upload_featured_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let (file, _) = read_form(multipart).await?;
    let ext = check_image(&file, MAX_IMAGE_BYTES)?;

    save_image(&state, file, FEATURED_FOLDER, unique_filename(ext)).await.map(Json)
}

// POST /api/admin/upload/studio-image (multipart: file, studioSlug)
pub async fn upload_studio_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let (file, fields) = read_form(multipart).await?;

    let studio_slug = fields
        .studio_slug
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("Studio slug é obrigatório"))?;
    // O slug vira nome de arquivo
    if !is_valid_slug(&studio_slug) {
        return Err(AppError::bad_request("Studio slug inválido"));
    }

    let ext = check_image(&file, MAX_STUDIO_IMAGE_BYTES)?;
    let filename = studio_filename(&studio_slug, ext);

    save_image(&state, file, STUDIO_FOLDER, filename).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_common_image_types() {
        assert_eq!(image_extension(&mime::IMAGE_JPEG), Some("jpg"));
        assert_eq!(image_extension(&mime::IMAGE_PNG), Some("png"));
        assert_eq!(image_extension(&"image/webp".parse().unwrap()), Some("webp"));
        assert_eq!(image_extension(&mime::IMAGE_GIF), Some("gif"));
        assert_eq!(image_extension(&mime::IMAGE_SVG), None);
        assert_eq!(image_extension(&mime::APPLICATION_PDF), None);
    }

    #[test]
    fn unknown_folders_fall_back_to_blog() {
        assert_eq!(upload_folder(None), "blog");
        assert_eq!(upload_folder(Some("studios")), "studios");
        assert_eq!(upload_folder(Some("../etc")), "blog");
    }

    #[test]
    fn filenames_keep_extension() {
        let name = unique_filename("png");
        assert!(name.ends_with(".png"));
        assert_ne!(name, unique_filename("png"));
    }

    #[test]
    fn studio_photos_are_named_after_the_studio() {
        let name = studio_filename("pilates-savassi", "webp");
        let stamp = name
            .strip_prefix("pilates-savassi-")
            .and_then(|rest| rest.strip_suffix(".webp"))
            .unwrap();
        assert!(stamp.parse::<i64>().is_ok());
    }

    #[test]
    fn size_limit_depends_on_the_upload() {
        let file = ImageFile {
            data: Bytes::from(vec![0u8; MAX_IMAGE_BYTES + 1]),
            content_type: mime::IMAGE_PNG,
        };
        let err = check_image(&file, MAX_IMAGE_BYTES).unwrap_err();
        assert_eq!(err.to_string(), "Arquivo muito grande. Máximo 5MB");
        assert_eq!(check_image(&file, MAX_STUDIO_IMAGE_BYTES).unwrap(), "png");
    }
}
