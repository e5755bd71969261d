use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use contracts::shared::validation::FieldErrors;
use serde_json::json;

use crate::shared::image::{read_header, ImageFormat, ImageHeader};
use crate::shared::state::AppState;
use crate::shared::web::{render, ViewContext, ViewOutcome};

/// Folders an image may be filed under, one per aggregate with an image
pub const UPLOAD_FOLDERS: [&str; 3] = ["company", "workers", "products"];
pub const DEFAULT_FOLDER: &str = "products";

/// Public URL prefix of stored media
pub const MEDIA_URL: &str = "/media";

const TYPE_MESSAGE: &str = "Only JPEG, PNG, GIF, and WebP images are allowed";

/// Check an uploaded image: size, declared type, then the bytes themselves.
/// The declared type must agree with what the header says.
pub fn validate_image(
    content_type: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<ImageHeader, String> {
    if bytes.len() > max_bytes {
        return Err(size_message(max_bytes));
    }
    let declared = content_type
        .and_then(ImageFormat::from_mime)
        .ok_or_else(|| TYPE_MESSAGE.to_string())?;
    let header = read_header(bytes).map_err(|e| format!("Invalid image file: {}", e))?;
    if header.format != declared {
        return Err(format!(
            "Invalid image file: content is not {}",
            declared.mime()
        ));
    }
    Ok(header)
}

fn size_message(max_bytes: usize) -> String {
    format!("Image size must be less than {}MB", max_bytes / (1024 * 1024))
}

struct Upload {
    folder: String,
    content_type: Option<String>,
    bytes: Option<Vec<u8>>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, axum::extract::multipart::MultipartError> {
    let mut upload = Upload {
        folder: DEFAULT_FOLDER.to_string(),
        content_type: None,
        bytes: None,
    };
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("folder") => upload.folder = field.text().await?.trim().to_string(),
            Some("file") => {
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = Some(field.bytes().await?.to_vec());
            }
            _ => {}
        }
    }
    Ok(upload)
}

async fn upload_outcome(state: &AppState, multipart: &mut Multipart) -> anyhow::Result<ViewOutcome> {
    let max_bytes = state.config.media.max_upload_bytes();
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Ok(ViewOutcome::Form {
                form: json!({}),
                errors: FieldErrors::single("file", size_message(max_bytes)),
            });
        }
        Err(e) => {
            return Ok(ViewOutcome::Form {
                form: json!({}),
                errors: FieldErrors::single("file", e.body_text()),
            })
        }
    };

    let form = json!({ "folder": upload.folder });
    let mut errors = FieldErrors::new();
    if !UPLOAD_FOLDERS.contains(&upload.folder.as_str()) {
        errors.add(
            "folder",
            format!(
                "Select a valid choice. {} is not one of the available choices.",
                upload.folder
            ),
        );
    }
    let image = match &upload.bytes {
        None => {
            errors.add("file", contracts::shared::validation::REQUIRED_MESSAGE);
            None
        }
        Some(bytes) => match validate_image(upload.content_type.as_deref(), bytes, max_bytes) {
            Ok(header) => Some(header),
            Err(message) => {
                errors.add("file", message);
                None
            }
        },
    };
    let (Some(bytes), Some(image)) = (upload.bytes, image) else {
        return Ok(ViewOutcome::Form { form, errors });
    };
    if !errors.is_empty() {
        return Ok(ViewOutcome::Form { form, errors });
    }

    let dir = state.media_root.join(&upload.folder);
    tokio::fs::create_dir_all(&dir).await?;
    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), image.format.extension());
    tokio::fs::write(dir.join(&file_name), &bytes).await?;

    let path = format!("{}/{}", upload.folder, file_name);
    tracing::info!(
        "Stored image {} ({}x{}, {} bytes)",
        path,
        image.width,
        image.height,
        bytes.len()
    );
    Ok(ViewOutcome::Page(json!({
        "path": path,
        "url": format!("{}/{}", MEDIA_URL, path),
    })))
}

/// POST /upload/
pub async fn upload(
    State(state): State<AppState>,
    ctx: ViewContext,
    mut multipart: Multipart,
) -> Response {
    let outcome = upload_outcome(&state, &mut multipart).await;
    render(ctx, outcome)
}
