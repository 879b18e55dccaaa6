//! Contact message service implementation
//!
//! Anyone may submit a message; only admins read and resolve them.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use crate::database::repositories::ContactRepository;
use crate::models::common::{Page, Pagination};
use crate::models::contact::{Contact, ContactListQuery, CreateContactRequest, UpdateContactStatusRequest};
use crate::services::auth::AuthContext;
use crate::services::workflow;
use crate::utils::errors::{TourifyError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_phone, normalize_email, optional_text, require_text};
use crate::utils::logging::{log_admin_action, log_status_change};

const MAX_NAME_LEN: usize = 120;
const MAX_SUBJECT_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 5000;

#[derive(Clone)]
pub struct ContactService {
    contacts: ContactRepository,
}

impl ContactService {
    pub fn new(contacts: ContactRepository) -> Self {
        Self { contacts }
    }

    /// Store a message from the public contact form
    pub async fn submit(&self, request: CreateContactRequest) -> Result<Contact> {
        let request = validate_submission(request)?;
        let contact = self.contacts.create(request).await?;

        info!(contact_id = %contact.id, "Contact message received");
        Ok(contact)
    }

    pub async fn list(&self, ctx: &AuthContext, query: ContactListQuery) -> Result<Page<Contact>> {
        ctx.require_admin()?;

        let pagination = Pagination::new(query.page, query.limit);
        let (contacts, total) = self.contacts.list(&query, pagination).await?;
        Ok(Page::new(contacts, total, pagination))
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<Contact> {
        ctx.require_admin()?;
        self.load(id).await
    }

    /// Resolve or reopen a message
    pub async fn set_status(&self, ctx: &AuthContext, id: Uuid, request: UpdateContactStatusRequest) -> Result<Contact> {
        ctx.require_admin()?;
        let contact = self.load(id).await?;

        let resolved_at = workflow::contact_resolved_at(request.status, contact.resolved_at, Utc::now());
        let updated = self.contacts.set_status(id, request.status, resolved_at).await?;

        log_status_change("contact", id, contact.status.as_str(), updated.status.as_str(), ctx.admin_id);
        Ok(updated)
    }

    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<()> {
        ctx.require_admin()?;

        if !self.contacts.delete(id).await? {
            return Err(TourifyError::not_found("contact", id));
        }

        log_admin_action(ctx.admin_id, "delete_contact", Some(&id.to_string()), None);
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Contact> {
        self.contacts
            .find_by_id(id)
            .await?
            .ok_or_else(|| TourifyError::not_found("contact", id))
    }
}

/// Trim and check a public submission before it reaches the database
pub fn validate_submission(request: CreateContactRequest) -> Result<CreateContactRequest> {
    let name = require_text("name", &request.name, MAX_NAME_LEN)?;

    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        return Err(TourifyError::InvalidInput("A valid email is required".to_string()));
    }

    let phone = optional_text(request.phone);
    if let Some(ref phone) = phone {
        if !is_valid_phone(phone) {
            return Err(TourifyError::InvalidInput("Phone number is invalid".to_string()));
        }
    }

    let subject = match optional_text(request.subject) {
        Some(subject) => Some(require_text("subject", &subject, MAX_SUBJECT_LEN)?),
        None => None,
    };

    Ok(CreateContactRequest {
        name,
        email,
        phone,
        subject,
        message: require_text("message", &request.message, MAX_MESSAGE_LEN)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request() -> CreateContactRequest {
        CreateContactRequest {
            name: "  Asha  ".to_string(),
            email: "Asha@Example.org".to_string(),
            phone: Some("  ".to_string()),
            subject: Some("Homestay enquiry".to_string()),
            message: "Are homestays open in monsoon?".to_string(),
        }
    }

    #[test]
    fn test_submission_is_normalized() {
        let clean = validate_submission(request()).unwrap();
        assert_eq!(clean.name, "Asha");
        assert_eq!(clean.email, "asha@example.org");
        assert_eq!(clean.phone, None);
    }

    #[test]
    fn test_submission_rejects_bad_fields() {
        let mut bad_email = request();
        bad_email.email = "asha".to_string();
        assert_matches!(validate_submission(bad_email), Err(TourifyError::InvalidInput(_)));

        let mut bad_phone = request();
        bad_phone.phone = Some("call me".to_string());
        assert_matches!(validate_submission(bad_phone), Err(TourifyError::InvalidInput(_)));

        let mut empty_message = request();
        empty_message.message = " ".to_string();
        assert_matches!(validate_submission(empty_message), Err(TourifyError::InvalidInput(_)));
    }
}
