// src/models/ticketmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A support ticket row. Lifecycle state is stored flat; the API layer
/// folds it back into the nested `viewed`/`closed` shape (see
/// `dtos::ticketdtos::TicketDto`).
///
/// `ticket_number` is assigned by the store (BIGSERIAL) and is the
/// human-facing identifier; `secret_key` is generated once at creation and
/// together with the number authorizes unauthenticated lookup.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub ticket_number: i64,
    pub username: String,
    pub email: String,
    pub title: String,
    pub text: String,
    pub secret_key: String,
    pub viewed_status: bool,
    pub viewed_by: Option<Uuid>,
    pub viewed_on: Option<DateTime<Utc>>,
    pub closed_status: bool,
    pub closed_by: Option<Uuid>,
    pub closed_on: Option<DateTime<Utc>>,
    pub closed_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Ticket with the weak staff references resolved to usernames
/// (LEFT JOINed at query time, so both are optional).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketWithStaff {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub viewed_by_username: Option<String>,
    pub closed_by_username: Option<String>,
}

impl TicketWithStaff {
    /// A ticket that has no staff interaction yet carries no usernames to
    /// resolve; used after insert, before any transition.
    pub fn unviewed(ticket: Ticket) -> Self {
        TicketWithStaff {
            ticket,
            viewed_by_username: None,
            closed_by_username: None,
        }
    }
}

/// Submitter-provided fields plus the generated secret key, ready for
/// insertion. The store fills in id, ticket_number and created_at.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub username: String,
    pub email: String,
    pub title: String,
    pub text: String,
    pub secret_key: String,
}
