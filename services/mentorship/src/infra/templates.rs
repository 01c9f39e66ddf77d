use serde_json::Value;

use crate::domain::types::NotificationTemplate;

pub struct Rendered {
    pub subject: String,
    pub body: String,
}

fn field<'a>(context: &'a Value, name: &str) -> &'a str {
    context.get(name).and_then(Value::as_str).unwrap_or("")
}

fn optional_line(context: &Value, name: &str, label: &str) -> String {
    match context.get(name).and_then(Value::as_str) {
        Some(v) if !v.is_empty() => format!("{label}: {v}\n"),
        _ => String::new(),
    }
}

/// Plain-text subject and body. Missing context fields render empty.
pub fn render(template: NotificationTemplate, context: &Value) -> Rendered {
    match template {
        NotificationTemplate::RegistrationReceived => {
            let hours = context
                .get("expires_in_hours")
                .and_then(Value::as_i64)
                .unwrap_or(24);
            Rendered {
                subject: "Registration received".to_owned(),
                body: format!(
                    "Hello {},\n\nWe have received your registration. \
                     Confirm your email address within {hours} hours:\n\n{}\n",
                    field(context, "full_name"),
                    field(context, "verification_url"),
                ),
            }
        }
        NotificationTemplate::VerificationConfirmed => Rendered {
            subject: "Account verified".to_owned(),
            body: format!(
                "Hello {},\n\nYour email address is confirmed. You can now sign in:\n\n{}\n",
                field(context, "full_name"),
                field(context, "login_url"),
            ),
        },
        NotificationTemplate::MentorRequested => Rendered {
            subject: format!("Mentor request from {}", field(context, "student_name")),
            body: format!(
                "{} ({}) has asked for a mentor.\n\n{}\n",
                field(context, "student_name"),
                field(context, "student_email"),
                field(context, "message"),
            ),
        },
        NotificationTemplate::MentorAssigned => Rendered {
            subject: "Your mentor has been assigned".to_owned(),
            body: format!(
                "Hello {},\n\n{} is now your mentor.\nEmail: {}\n{}{}",
                field(context, "student_name"),
                field(context, "mentor_name"),
                field(context, "mentor_email"),
                optional_line(context, "portfolio_url", "Portfolio"),
                optional_line(context, "chat_group_link", "Chat group"),
            ),
        },
        NotificationTemplate::MenteeAssigned => Rendered {
            subject: format!("New mentee: {}", field(context, "student_name")),
            body: format!(
                "Hello {},\n\nYou have a new mentee.\nName: {}\nEmail: {}\nPhone: {}\nCity: {}\n",
                field(context, "mentor_name"),
                field(context, "student_name"),
                field(context, "student_email"),
                field(context, "student_phone"),
                field(context, "student_city"),
            ),
        },
    }
}
