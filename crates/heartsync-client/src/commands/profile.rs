//! Editing the signed-in user's profile.

use tracing::info;

use heartsync_backend::{LocalImage, ProfilePatch};
use heartsync_shared::validation::display_name;
use heartsync_shared::UserProfile;

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub display_name: Option<String>,
    /// A picker result: `file://` URIs are uploaded, other URLs are kept.
    pub image_uri: Option<String>,
    pub bio: Option<String>,
}

pub async fn update_profile(session: &mut Session, form: &ProfileForm) -> Result<UserProfile, CommandError> {
    let mut patch = ProfilePatch {
        display_name: form.display_name.as_deref().map(display_name).transpose()?,
        bio: form.bio.as_ref().map(|b| b.trim().to_string()),
        ..ProfilePatch::default()
    };

    if let Some(uri) = &form.image_uri {
        let url = match LocalImage::from_uri(uri) {
            Some(image) => session
                .state()
                .backend
                .images
                .upload(&image)
                .await
                .map_err(during(Operation::UpdateProfile))?,
            None => uri.clone(),
        };
        patch.profile_image_url = Some(url);
    }

    if patch.is_empty() {
        return Ok(session.profile().clone());
    }

    session
        .state()
        .backend
        .profiles
        .update_profile(session.user_id(), &patch)
        .await
        .map_err(during(Operation::UpdateProfile))?;

    patch.apply(session.profile_mut());
    info!(user_id = %session.user_id(), "Profile updated");
    Ok(session.profile().clone())
}
