use validator::Validate;

use crate::{
    entities::contact_me::{ContactMeInsert, ContactMeResponse, NewContactMeForm},
    errors::AppError,
    repositories::contact_me::ContactMeRepository,
};

pub struct ContactMeHandler<R>
where
    R: ContactMeRepository,
{
    pub contact_repo: R,
}

impl<R> ContactMeHandler<R>
where
    R: ContactMeRepository,
{
    pub fn new(contact_repo: R) -> Self {
        ContactMeHandler { contact_repo }
    }

    /// Validates and stores a message from the contact form
    pub async fn create_contact_message(
        &self,
        request: NewContactMeForm,
    ) -> Result<ContactMeResponse, AppError> {
        request.validate()?;

        let new_msg: ContactMeInsert = request.try_into()?;

        let id = self.contact_repo.create_contact_message(&new_msg).await?;

        tracing::info!(message_id = %id, project_type = new_msg.project_type.as_str(), "Contact message stored");
        Ok(ContactMeResponse {
            message: "Your message has been received.".to_string(),
            id,
        })
    }
}
