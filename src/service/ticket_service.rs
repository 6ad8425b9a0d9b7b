// src/service/ticket_service.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    db::ticketdb::{TicketExt, TicketFilter},
    dtos::ticketdtos::{CreateTicketDto, TicketDto, TicketPageDto, TicketResponseDto},
    mail::mails::TicketMailer,
    models::ticketmodel::{NewTicket, TicketWithStaff},
    service::error::{FieldError, TicketError},
    utils::{secret_key::generate_secret_key, token::TokenVerifier},
};

const DEFAULT_LIMIT: u32 = 20;
const DEFAULT_PAGE: u32 = 1;

/// Owns every business rule of the ticket lifecycle: creation with
/// secret-key issuance, retrieval and filtered listing, and the strictly
/// sequential open → viewed → closed transitions. The store, the notifier
/// and the credential verifier are collaborators injected at construction.
pub struct TicketService {
    store: Arc<dyn TicketExt>,
    mailer: Arc<dyn TicketMailer>,
    verifier: TokenVerifier,
}

fn ticket_id_missing() -> TicketError {
    TicketError::MissingInput("The ticket id is required.".to_string())
}

fn ticket_not_found() -> TicketError {
    TicketError::NotFound("No ticket exists with that id.".to_string())
}

fn already_viewed() -> TicketError {
    TicketError::InvalidState("That ticket has already been marked as viewed.".to_string())
}

fn already_closed() -> TicketError {
    TicketError::InvalidState("That ticket has already been closed.".to_string())
}

/// Maps a validation result into one `(field, message)` pair per failing
/// field, ordered by field name so the output is stable.
fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut by_field: BTreeMap<&str, String> = BTreeMap::new();
    for (field, errs) in errors.field_errors() {
        if let Some(first) = errs.first() {
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            by_field.entry(field).or_insert(message);
        }
    }

    by_field
        .into_iter()
        .map(|(field, message)| FieldError {
            field: field.to_string(),
            message,
        })
        .collect()
}

/// Allow-list boundary for caller-supplied filters: only these field names
/// parse, and their params must parse to the field's type. Raw strings
/// never reach the store.
fn parse_filter(field: &str, param: &str) -> Result<TicketFilter, TicketError> {
    let invalid = |message: String| {
        TicketError::Validation(vec![FieldError {
            field: field.to_string(),
            message,
        }])
    };

    match field {
        "username" => Ok(TicketFilter::Username(param.to_string())),
        "email" => Ok(TicketFilter::Email(param.to_string())),
        "ticketNumber" => param
            .parse()
            .map(TicketFilter::TicketNumber)
            .map_err(|_| invalid(format!("'{}' is not a valid ticket number", param))),
        "viewed" => param
            .parse()
            .map(TicketFilter::Viewed)
            .map_err(|_| invalid(format!("'{}' is not a valid viewed flag", param))),
        "closed" => param
            .parse()
            .map(TicketFilter::Closed)
            .map_err(|_| invalid(format!("'{}' is not a valid closed flag", param))),
        _ => Err(invalid(format!("'{}' is not a filterable field", field))),
    }
}

impl TicketService {
    pub fn new(
        store: Arc<dyn TicketExt>,
        mailer: Arc<dyn TicketMailer>,
        verifier: TokenVerifier,
    ) -> Self {
        TicketService {
            store,
            mailer,
            verifier,
        }
    }

    pub async fn create(
        &self,
        data: Option<CreateTicketDto>,
    ) -> Result<TicketResponseDto, TicketError> {
        let data = data.filter(|d| !d.is_empty()).ok_or_else(|| {
            TicketError::MissingInput("Provide the ticket information.".to_string())
        })?;

        data.validate()
            .map_err(|errors| TicketError::Validation(field_errors(&errors)))?;

        let ticket = self
            .store
            .insert_ticket(NewTicket {
                username: data.username,
                email: data.email,
                title: data.title,
                text: data.text,
                secret_key: generate_secret_key(),
            })
            .await?;

        // The ticket is persisted at this point; the notification is
        // best-effort and must not undo or fail the creation.
        if let Err(err) = self.mailer.send_ticket_created(&ticket).await {
            tracing::warn!(
                "Failed to send ticket created email to {}: {}",
                ticket.email,
                err
            );
        }

        Ok(TicketResponseDto {
            status: "success".to_string(),
            message: "Ticket created successfully, an email has been sent to your address."
                .to_string(),
            data: TicketDto::from_ticket(&TicketWithStaff::unviewed(ticket)),
        })
    }

    pub async fn get_by_id(&self, id: &str) -> Result<TicketDto, TicketError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ticket_id_missing());
        }

        let ticket = match Uuid::parse_str(id) {
            Ok(ticket_id) => self.store.get_ticket_with_staff(ticket_id).await?,
            Err(_) => None,
        };

        let ticket = ticket.ok_or_else(ticket_not_found)?;
        Ok(TicketDto::from_ticket(&ticket))
    }

    /// The only retrieval path without staff authentication: knowing both
    /// the ticket number and the secret key is the authorization proof.
    pub async fn get_by_number(
        &self,
        ticket_number: &str,
        secret_key: &str,
    ) -> Result<TicketDto, TicketError> {
        let ticket_number = ticket_number.trim();
        let secret_key = secret_key.trim();
        if ticket_number.is_empty() {
            return Err(TicketError::MissingInput(
                "The ticket number is required.".to_string(),
            ));
        }
        if secret_key.is_empty() {
            return Err(TicketError::MissingInput(
                "The secret key is required.".to_string(),
            ));
        }

        let ticket = match ticket_number.parse::<i64>() {
            Ok(number) => self.store.get_ticket_by_number(number).await?,
            Err(_) => None,
        };

        let ticket = ticket.ok_or_else(|| {
            TicketError::NotFound("No ticket exists with that number.".to_string())
        })?;

        if ticket.ticket.secret_key != secret_key {
            return Err(TicketError::InvalidCredential(
                "The secret key is not valid.".to_string(),
            ));
        }

        Ok(TicketDto::from_ticket(&ticket))
    }

    pub async fn get_all(
        &self,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<TicketPageDto, TicketError> {
        self.page(None, "none".to_string(), None, limit, page).await
    }

    pub async fn get_by_filter(
        &self,
        filter: Option<&str>,
        param: Option<&str>,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<TicketPageDto, TicketError> {
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());
        let param = param.map(str::trim).filter(|p| !p.is_empty());
        let (Some(field), Some(value)) = (filter, param) else {
            return Err(TicketError::MissingInput(
                "Provide both the filter and the parameter.".to_string(),
            ));
        };

        let parsed = parse_filter(field, value)?;
        self.page(
            Some(parsed),
            field.to_string(),
            Some(value.to_string()),
            limit,
            page,
        )
        .await
    }

    async fn page(
        &self,
        filter: Option<TicketFilter>,
        filter_tag: String,
        param_tag: Option<String>,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<TicketPageDto, TicketError> {
        // Zero counts as "not supplied", like the source's falsy defaults.
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let offset = i64::from(page - 1) * i64::from(limit);

        let (rows, total) = self
            .store
            .get_ticket_page(filter.as_ref(), i64::from(limit), offset)
            .await?;

        let total_pages = (total + i64::from(limit) - 1) / i64::from(limit);

        Ok(TicketPageDto {
            tickets: rows.iter().map(TicketDto::from_ticket).collect(),
            total,
            page,
            limit,
            total_pages,
            filter: filter_tag,
            param: param_tag,
        })
    }

    pub async fn mark_viewed(
        &self,
        id: &str,
        session_token: Option<&str>,
    ) -> Result<TicketResponseDto, TicketError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ticket_id_missing());
        }

        let ticket_id = Uuid::parse_str(id).map_err(|_| ticket_not_found())?;
        let ticket = self
            .store
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(ticket_not_found)?;
        if ticket.viewed_status {
            return Err(already_viewed());
        }

        let user_id = self.verifier.verify(session_token)?;

        // Conditional update: if a concurrent caller won the race since the
        // check above, the guard fails and this caller gets the same
        // "already viewed" answer as any late sequential caller.
        let updated = self
            .store
            .mark_ticket_viewed(ticket_id, user_id, Utc::now())
            .await?;
        if updated.is_none() {
            return Err(already_viewed());
        }

        let ticket = self
            .store
            .get_ticket_with_staff(ticket_id)
            .await?
            .ok_or_else(ticket_not_found)?;

        if let Err(err) = self.mailer.send_ticket_viewed(&ticket).await {
            tracing::warn!(
                "Failed to send ticket viewed email to {}: {}",
                ticket.ticket.email,
                err
            );
        }

        Ok(TicketResponseDto {
            status: "success".to_string(),
            message: "Ticket marked as viewed.".to_string(),
            data: TicketDto::from_ticket(&ticket),
        })
    }

    pub async fn mark_closed(
        &self,
        id: &str,
        summary: Option<&str>,
        session_token: Option<&str>,
    ) -> Result<TicketResponseDto, TicketError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ticket_id_missing());
        }
        let summary = summary.map(str::trim).filter(|s| !s.is_empty());
        let Some(summary) = summary else {
            return Err(TicketError::MissingInput(
                "The closing summary is required.".to_string(),
            ));
        };

        let ticket_id = Uuid::parse_str(id).map_err(|_| ticket_not_found())?;
        let ticket = self
            .store
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(ticket_not_found)?;
        if !ticket.viewed_status {
            return Err(TicketError::InvalidState(
                "The ticket must be marked as viewed before it can be closed.".to_string(),
            ));
        }
        if ticket.closed_status {
            return Err(already_closed());
        }

        let user_id = self.verifier.verify(session_token)?;

        let updated = self
            .store
            .mark_ticket_closed(ticket_id, user_id, Utc::now(), summary)
            .await?;
        if updated.is_none() {
            return Err(already_closed());
        }

        let ticket = self
            .store
            .get_ticket_with_staff(ticket_id)
            .await?
            .ok_or_else(ticket_not_found)?;

        if let Err(err) = self.mailer.send_ticket_closed(&ticket).await {
            tracing::warn!(
                "Failed to send ticket closed email to {}: {}",
                ticket.ticket.email,
                err
            );
        }

        Ok(TicketResponseDto {
            status: "success".to_string(),
            message: "Ticket closed successfully.".to_string(),
            data: TicketDto::from_ticket(&ticket),
        })
    }
}
