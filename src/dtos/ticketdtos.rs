// src/dtos/ticketdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::ticketmodel::TicketWithStaff;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateTicketDto {
    #[validate(
        length(min = 1, message = "Username is required"),
        length(max = 50, message = "Username must be at most 50 characters")
    )]
    pub username: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,

    #[validate(
        length(min = 1, message = "Text is required"),
        length(max = 2000, message = "Text must be at most 2000 characters")
    )]
    pub text: String,
}

impl CreateTicketDto {
    /// An all-blank payload is treated the same as a missing one.
    pub fn is_empty(&self) -> bool {
        self.username.trim().is_empty()
            && self.email.trim().is_empty()
            && self.title.trim().is_empty()
            && self.text.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct TicketListQueryDto {
    pub filter: Option<String>,
    pub param: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CloseTicketDto {
    pub summary: Option<String>,
}

/// Display-safe projection of a staff reference: id and username only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRefDto {
    pub id: Uuid,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewedDto {
    pub status: bool,
    pub by: Option<StaffRefDto>,
    pub on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedDto {
    pub status: bool,
    pub by: Option<StaffRefDto>,
    pub on: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

/// The ticket as the API presents it: flat state columns folded back into
/// the nested `viewed`/`closed` shape, staff refs expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
    pub id: Uuid,
    pub ticket_number: i64,
    pub username: String,
    pub email: String,
    pub title: String,
    pub text: String,
    pub secret_key: String,
    pub viewed: ViewedDto,
    pub closed: ClosedDto,
    pub created_at: DateTime<Utc>,
}

impl TicketDto {
    pub fn from_ticket(row: &TicketWithStaff) -> Self {
        let t = &row.ticket;
        TicketDto {
            id: t.id,
            ticket_number: t.ticket_number,
            username: t.username.clone(),
            email: t.email.clone(),
            title: t.title.clone(),
            text: t.text.clone(),
            secret_key: t.secret_key.clone(),
            viewed: ViewedDto {
                status: t.viewed_status,
                by: t.viewed_by.map(|id| StaffRefDto {
                    id,
                    username: row.viewed_by_username.clone(),
                }),
                on: t.viewed_on,
            },
            closed: ClosedDto {
                status: t.closed_status,
                by: t.closed_by.map(|id| StaffRefDto {
                    id,
                    username: row.closed_by_username.clone(),
                }),
                on: t.closed_on,
                summary: t.closed_summary.clone(),
            },
            created_at: t.created_at,
        }
    }
}

/// One page of tickets plus the pagination metadata and the filter tag the
/// caller used ("none" for an unfiltered listing).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPageDto {
    pub tickets: Vec<TicketDto>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
    pub filter: String,
    pub param: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponseDto {
    pub status: String,
    pub message: String,
    pub data: TicketDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_payload_counts_as_empty() {
        let dto = CreateTicketDto {
            username: "  ".to_string(),
            ..Default::default()
        };
        assert!(dto.is_empty());

        let dto = CreateTicketDto {
            username: "ana".to_string(),
            ..Default::default()
        };
        assert!(!dto.is_empty());
    }

    #[test]
    fn validation_flags_each_missing_field() {
        let dto = CreateTicketDto {
            username: "ana".to_string(),
            email: "not-an-email".to_string(),
            title: String::new(),
            text: "the printer is on fire".to_string(),
        };

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("title"));
        assert!(!fields.contains_key("username"));
        assert!(!fields.contains_key("text"));
    }
}
