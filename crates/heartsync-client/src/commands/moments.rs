//! Moments on the shared calendar.

use chrono::NaiveDate;
use tracing::info;

use heartsync_backend::LocalImage;
use heartsync_shared::validation::validate_moment;
use heartsync_shared::MomentId;

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;

#[derive(Debug, Clone, Default)]
pub struct MomentForm {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub image: Option<LocalImage>,
}

/// Record a moment. The picture, if any, is uploaded first and only its
/// public URL is stored.
pub async fn add_moment(session: &Session, form: &MomentForm) -> Result<MomentId, CommandError> {
    let room = session.require_room()?;
    let mut draft = validate_moment(&form.title, form.date, &form.description)?;
    let backend = &session.state().backend;

    if let Some(image) = &form.image {
        let url = backend
            .images
            .upload(image)
            .await
            .map_err(during(Operation::AddMoment))?;
        draft.image_url = Some(url);
    }

    let id = backend
        .rooms
        .add_moment(&room, &draft)
        .await
        .map_err(during(Operation::AddMoment))?;

    info!(room = %room, moment = %id, date = %draft.date, with_image = draft.image_url.is_some(), "Moment added");
    Ok(id)
}
