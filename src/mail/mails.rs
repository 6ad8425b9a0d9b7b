// src/mail/mails.rs
use std::fs;

use async_trait::async_trait;

use super::sendmail::{MailError, ResendMailer};
use crate::models::ticketmodel::{Ticket, TicketWithStaff};

/// Notifier for ticket lifecycle transitions. The lifecycle service treats
/// every send as fire-and-forget: a failure here is logged by the caller
/// and never rolls back a persisted transition.
#[async_trait]
pub trait TicketMailer: Send + Sync {
    async fn send_ticket_created(&self, ticket: &Ticket) -> Result<(), MailError>;

    async fn send_ticket_viewed(&self, ticket: &TicketWithStaff) -> Result<(), MailError>;

    async fn send_ticket_closed(&self, ticket: &TicketWithStaff) -> Result<(), MailError>;
}

fn render_template(
    template_path: &str,
    placeholders: &[(String, String)],
) -> Result<String, MailError> {
    let mut html = match fs::read_to_string(template_path) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("Failed to read email template {}: {}", template_path, e);
            return Err(format!("Template not found: {}", template_path).into());
        }
    };

    for (key, value) in placeholders {
        html = html.replace(key, value);
    }

    Ok(html)
}

fn ticket_placeholders(ticket: &Ticket) -> Vec<(String, String)> {
    vec![
        ("{{username}}".to_string(), ticket.username.clone()),
        ("{{title}}".to_string(), ticket.title.clone()),
        ("{{text}}".to_string(), ticket.text.clone()),
        (
            "{{ticket_number}}".to_string(),
            ticket.ticket_number.to_string(),
        ),
        ("{{secret_key}}".to_string(), ticket.secret_key.clone()),
    ]
}

pub fn render_ticket_created_email(ticket: &Ticket) -> Result<String, MailError> {
    render_template(
        "src/mail/templates/Ticket-Created.html",
        &ticket_placeholders(ticket),
    )
}

pub fn render_ticket_viewed_email(ticket: &TicketWithStaff) -> Result<String, MailError> {
    render_template(
        "src/mail/templates/Ticket-Viewed.html",
        &ticket_placeholders(&ticket.ticket),
    )
}

pub fn render_ticket_closed_email(ticket: &TicketWithStaff) -> Result<String, MailError> {
    let mut placeholders = ticket_placeholders(&ticket.ticket);
    placeholders.push((
        "{{closed_by}}".to_string(),
        ticket
            .closed_by_username
            .clone()
            .unwrap_or_else(|| "our support staff".to_string()),
    ));
    placeholders.push((
        "{{summary}}".to_string(),
        ticket.ticket.closed_summary.clone().unwrap_or_default(),
    ));

    render_template("src/mail/templates/Ticket-Closed.html", &placeholders)
}

#[async_trait]
impl TicketMailer for ResendMailer {
    async fn send_ticket_created(&self, ticket: &Ticket) -> Result<(), MailError> {
        let html = render_ticket_created_email(ticket)?;
        self.send_email(
            &ticket.email,
            "Ticket created successfully",
            "Your issue will be resolved shortly.",
            &html,
        )
        .await
    }

    async fn send_ticket_viewed(&self, ticket: &TicketWithStaff) -> Result<(), MailError> {
        let html = render_ticket_viewed_email(ticket)?;
        self.send_email(
            &ticket.ticket.email,
            "Ticket viewed",
            "Your issue is now being looked into.",
            &html,
        )
        .await
    }

    async fn send_ticket_closed(&self, ticket: &TicketWithStaff) -> Result<(), MailError> {
        let html = render_ticket_closed_email(ticket)?;
        self.send_email(
            &ticket.ticket.email,
            "Ticket closed",
            "Your issue has been resolved.",
            &html,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_ticket() -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            ticket_number: 42,
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            title: "Printer on fire".to_string(),
            text: "It started smoking an hour ago.".to_string(),
            secret_key: "abcdefgh23456789".to_string(),
            viewed_status: false,
            viewed_by: None,
            viewed_on: None,
            closed_status: false,
            closed_by: None,
            closed_on: None,
            closed_summary: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn created_email_embeds_number_and_secret_key() {
        let html = render_ticket_created_email(&sample_ticket()).unwrap();
        assert!(html.contains("42"));
        assert!(html.contains("abcdefgh23456789"));
        assert!(html.contains("ana"));
        assert!(html.contains("Printer on fire"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn closed_email_embeds_closer_and_summary() {
        let mut ticket = sample_ticket();
        ticket.viewed_status = true;
        ticket.closed_status = true;
        ticket.closed_summary = Some("Replaced the fuser unit.".to_string());
        let row = TicketWithStaff {
            ticket,
            viewed_by_username: Some("bob".to_string()),
            closed_by_username: Some("bob".to_string()),
        };

        let html = render_ticket_closed_email(&row).unwrap();
        assert!(html.contains("Replaced the fuser unit."));
        assert!(html.contains("bob"));
        assert!(!html.contains("{{"));
    }
}
