//! In-flight requests

use rasmalai_providers::{GenerativeProvider, ImageAttachment, ProviderResult};
use tracing::debug;

/// A dispatched user turn waiting for its AI reply.
///
/// Tagged with the session it was sent from, so a reply that arrives after
/// the user navigated elsewhere still lands in the right session.
#[derive(Debug)]
pub struct PendingTurn {
    pub(crate) session_id: String,
    pub(crate) prompt: String,
    pub(crate) image: Option<ImageAttachment>,
}

impl PendingTurn {
    /// Session the reply belongs to
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    /// Encode the image, if any, and ask the provider for a reply.
    ///
    /// The image is fully read and encoded before the request goes out.
    pub async fn dispatch(&self, provider: &dyn GenerativeProvider) -> ProviderResult<String> {
        let image = match &self.image {
            Some(attachment) => Some(attachment.to_inline().await?),
            None => None,
        };

        debug!(
            "Dispatching turn for session {} to {}",
            self.session_id,
            provider.model()
        );
        let response = provider.generate(&self.prompt, image).await?;
        Ok(response.text)
    }
}
