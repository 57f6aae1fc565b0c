//! Decodes the admin form's `multipart/form-data` body into an [`AdminForm`].

use actix_multipart::{Field, Multipart};
use at_core::{AdminForm, AppError, ItemId, MediaSlot, StagedFile};
use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;

use crate::error::ApiError;

/// A decoded submission. Field values the form rejected are kept aside so
/// the page can be re-rendered with everything else intact.
#[derive(Debug, Default)]
pub struct DecodedForm {
    pub form: AdminForm,
    pub rejected: Vec<AppError>,
}

pub async fn decode_admin_form(mut payload: Multipart, limit: usize) -> Result<DecodedForm, ApiError> {
    let mut decoded = DecodedForm::default();

    while let Some(field) = payload
        .try_next()
        .await
        .map_err(|err| ApiError::Multipart(err.to_string()))?
    {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let file_name = disposition.get_filename().map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());
        let slot = match name.as_str() {
            "image_upload" => Some(MediaSlot::Image),
            "video_upload" => Some(MediaSlot::Video),
            _ => None,
        };

        let Some(data) = read_field(field, limit).await? else {
            let field = slot.map_or_else(|| name.clone(), |slot| slot.noun().to_string());
            tracing::warn!(%field, limit, "form field over the upload limit");
            decoded.rejected.push(AppError::TooLarge { field, limit });
            continue;
        };

        match (slot, name.as_str()) {
            (Some(slot), _) => {
                // browsers send an unnamed empty part for an untouched file input
                let staged = file_name
                    .filter(|file_name| !file_name.is_empty())
                    .map(|file_name| StagedFile::new(file_name, content_type, data));
                decoded.form.stage(slot, staged);
            }
            (None, "editing_id") => {
                let id = text(&name, data)?;
                if !id.trim().is_empty() {
                    decoded.form.resume_edit(ItemId::new(id.trim()));
                }
            }
            _ => {
                let value = text(&name, data)?;
                if let Err(err) = decoded.form.apply_field(&name, &value) {
                    tracing::debug!(field = %name, error = %err, "form field rejected");
                    decoded.rejected.push(err);
                }
            }
        }
    }

    Ok(decoded)
}

/// Reads one part. Past `limit` the rest is drained so the following parts
/// still decode, and `None` is returned.
async fn read_field(mut field: Field, limit: usize) -> Result<Option<Bytes>, ApiError> {
    let mut buf = BytesMut::new();
    let mut over = false;
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|err| ApiError::Multipart(err.to_string()))?
    {
        if over || buf.len() + chunk.len() > limit {
            over = true;
            continue;
        }
        buf.extend_from_slice(&chunk);
    }
    Ok((!over).then(|| buf.freeze()))
}

fn text(name: &str, data: Bytes) -> Result<String, ApiError> {
    String::from_utf8(data.to_vec()).map_err(|_| ApiError::Encoding(name.to_string()))
}
