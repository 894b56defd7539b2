//! Built-in template catalog.
//!
//! Connection notes are capped at 300 characters, direct messages at
//! 8000, subjects at 200. The limit travels with the template so a
//! caller can never apply the wrong ceiling.

use netreach_core::error::{NetreachError, Result};

pub const CONNECTION_NOTE_MAX_LEN: usize = 300;
pub const MESSAGE_MAX_LEN: usize = 8000;
pub const SUBJECT_MAX_LEN: usize = 200;

/// What a template is for. Connection notes ride along with a connection
/// request; the other kinds are direct messages to accepted contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    ConnectionNote,
    Introduction,
    FollowUp,
    Networking,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::ConnectionNote => write!(f, "connection_note"),
            TemplateKind::Introduction => write!(f, "introduction"),
            TemplateKind::FollowUp => write!(f, "follow_up"),
            TemplateKind::Networking => write!(f, "networking"),
        }
    }
}

/// A message template with its metadata and length ceiling.
#[derive(Debug, Clone, Copy)]
pub struct MessageTemplate {
    pub id: &'static str,
    pub kind: TemplateKind,
    pub name: &'static str,
    /// Subject line, empty for connection notes.
    pub subject: &'static str,
    pub body: &'static str,
    pub description: &'static str,
    pub max_len: usize,
}

static CONNECTION_NOTE_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        id: "conn_generic",
        kind: TemplateKind::ConnectionNote,
        name: "Generic Professional",
        subject: "",
        body: "Hi {{FirstName}}, I came across your profile and was impressed by your work at {{Company}}. I'd love to connect.",
        description: "Generic professional connection request",
        max_len: CONNECTION_NOTE_MAX_LEN,
    },
    MessageTemplate {
        id: "conn_role_specific",
        kind: TemplateKind::ConnectionNote,
        name: "Role-Specific",
        subject: "",
        body: "Hi {{FirstName}}, I noticed you're a {{Title}} at {{Company}}. I'm {{YourTitle}} at {{YourCompany}} and would love to connect to exchange insights about our field.",
        description: "Connection based on similar roles",
        max_len: CONNECTION_NOTE_MAX_LEN,
    },
    MessageTemplate {
        id: "conn_industry",
        kind: TemplateKind::ConnectionNote,
        name: "Industry Connection",
        subject: "",
        body: "Hi {{FirstName}}, I saw your profile and noticed we both work in {{Industry}}. I'd appreciate the opportunity to connect and potentially collaborate in the future.",
        description: "Connection based on shared industry",
        max_len: CONNECTION_NOTE_MAX_LEN,
    },
    MessageTemplate {
        id: "conn_mutual_interest",
        kind: TemplateKind::ConnectionNote,
        name: "Mutual Interest",
        subject: "",
        body: "Hi {{FirstName}}, your experience at {{Company}} caught my attention. {{CustomReason}} I'd love to connect and learn from your expertise.",
        description: "Connection with custom reason",
        max_len: CONNECTION_NOTE_MAX_LEN,
    },
    MessageTemplate {
        id: "conn_networking",
        kind: TemplateKind::ConnectionNote,
        name: "Networking",
        subject: "",
        body: "Hi {{FirstName}}, I'm expanding my professional network with {{Industry}} professionals. Your background at {{Company}} is impressive. Let's connect!",
        description: "General networking connection",
        max_len: CONNECTION_NOTE_MAX_LEN,
    },
    MessageTemplate {
        id: "conn_brief",
        kind: TemplateKind::ConnectionNote,
        name: "Brief & Direct",
        subject: "",
        body: "Hi {{FirstName}}, impressive work at {{Company}}! Would love to connect.",
        description: "Short and direct connection request",
        max_len: CONNECTION_NOTE_MAX_LEN,
    },
];

static MESSAGE_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        id: "msg_introduction",
        kind: TemplateKind::Introduction,
        name: "Professional Introduction",
        subject: "Great to connect, {{FirstName}}!",
        body: "Hi {{FirstName}},\n\nThank you for connecting! I'm {{YourName}}, {{YourTitle}} at {{YourCompany}}.\n\nI was impressed by your work as {{Title}} at {{Company}}. I'd love to learn more about your experience and explore potential collaboration opportunities.\n\nLooking forward to staying in touch!\n\nBest regards,\n{{YourName}}",
        description: "Initial message after connection",
        max_len: MESSAGE_MAX_LEN,
    },
    MessageTemplate {
        id: "msg_follow_up",
        kind: TemplateKind::FollowUp,
        name: "Follow-Up Message",
        subject: "Following up on my previous message",
        body: "Hi {{FirstName}},\n\nI wanted to follow up on my previous message. I'm still very interested in learning about your experience at {{Company}}.\n\n{{CustomReason}}\n\nWould you be open to a brief conversation?\n\nBest regards,\n{{YourName}}",
        description: "Follow-up after no response",
        max_len: MESSAGE_MAX_LEN,
    },
    MessageTemplate {
        id: "msg_networking",
        kind: TemplateKind::Networking,
        name: "Networking Opportunity",
        subject: "Exploring opportunities in {{Industry}}",
        body: "Hi {{FirstName}},\n\nI hope this message finds you well. I'm reaching out to professionals in {{Industry}} to expand my network and learn from experienced leaders like yourself.\n\nYour background as {{Title}} at {{Company}} is particularly interesting to me. Would you be open to sharing some insights about your career journey?\n\nI'd be happy to schedule a brief call at your convenience.\n\nThank you for your time!\n\nBest regards,\n{{YourName}}\n{{YourTitle}} at {{YourCompany}}",
        description: "Networking and career advice",
        max_len: MESSAGE_MAX_LEN,
    },
    MessageTemplate {
        id: "msg_collaboration",
        kind: TemplateKind::Networking,
        name: "Collaboration Proposal",
        subject: "Potential collaboration opportunity",
        body: "Hi {{FirstName}},\n\nI came across your profile and was impressed by your work at {{Company}}.\n\n{{CustomReason}}\n\nI believe there might be synergies between what you're doing and my work at {{YourCompany}}. Would you be interested in exploring potential collaboration opportunities?\n\nI'd love to schedule a brief call to discuss further.\n\nLooking forward to hearing from you!\n\nBest regards,\n{{YourName}}",
        description: "Business collaboration proposal",
        max_len: MESSAGE_MAX_LEN,
    },
    MessageTemplate {
        id: "msg_value_add",
        kind: TemplateKind::Introduction,
        name: "Value-Add Introduction",
        subject: "Quick introduction from {{YourName}}",
        body: "Hi {{FirstName}},\n\nI recently came across your profile and thought you might be interested in {{CustomReason}}.\n\nAs {{YourTitle}} at {{YourCompany}}, I've been working on similar challenges and would be happy to share some insights that might be helpful.\n\nWould you be open to a quick chat?\n\nBest regards,\n{{YourName}}",
        description: "Offering value or insights",
        max_len: MESSAGE_MAX_LEN,
    },
];

/// The built-in connection note templates.
pub fn connection_note_templates() -> &'static [MessageTemplate] {
    CONNECTION_NOTE_TEMPLATES
}

/// The built-in direct message templates.
pub fn message_templates() -> &'static [MessageTemplate] {
    MESSAGE_TEMPLATES
}

/// Look a template up by id across both catalogs.
pub fn template_by_id(template_id: &str) -> Result<MessageTemplate> {
    CONNECTION_NOTE_TEMPLATES
        .iter()
        .chain(MESSAGE_TEMPLATES.iter())
        .find(|t| t.id == template_id)
        .copied()
        .ok_or_else(|| NetreachError::TemplateNotFound(template_id.to_string()))
}

/// All templates of a given kind.
pub fn templates_by_kind(kind: TemplateKind) -> Vec<MessageTemplate> {
    CONNECTION_NOTE_TEMPLATES
        .iter()
        .chain(MESSAGE_TEMPLATES.iter())
        .filter(|t| t.kind == kind)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_ids_unique() {
        let mut seen = std::collections::HashSet::new();
        for t in CONNECTION_NOTE_TEMPLATES.iter().chain(MESSAGE_TEMPLATES.iter()) {
            assert!(seen.insert(t.id), "duplicate template id {}", t.id);
        }
    }

    #[test]
    fn test_template_by_id() {
        let t = template_by_id("conn_generic").unwrap();
        assert_eq!(t.kind, TemplateKind::ConnectionNote);
        assert_eq!(t.max_len, CONNECTION_NOTE_MAX_LEN);

        let t = template_by_id("msg_introduction").unwrap();
        assert_eq!(t.kind, TemplateKind::Introduction);
        assert_eq!(t.max_len, MESSAGE_MAX_LEN);

        assert!(matches!(
            template_by_id("nope"),
            Err(NetreachError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_templates_by_kind() {
        let notes = templates_by_kind(TemplateKind::ConnectionNote);
        assert_eq!(notes.len(), CONNECTION_NOTE_TEMPLATES.len());
        assert!(notes.iter().all(|t| t.subject.is_empty()));

        let follow_ups = templates_by_kind(TemplateKind::FollowUp);
        assert_eq!(follow_ups.len(), 1);
        assert_eq!(follow_ups[0].id, "msg_follow_up");
    }

    #[test]
    fn test_connection_notes_carry_note_limit() {
        for t in connection_note_templates() {
            assert_eq!(t.max_len, CONNECTION_NOTE_MAX_LEN);
            // Raw body leaves headroom for substituted values
            assert!(t.body.len() < CONNECTION_NOTE_MAX_LEN);
        }
        for t in message_templates() {
            assert_eq!(t.max_len, MESSAGE_MAX_LEN);
            assert!(!t.subject.is_empty());
        }
    }
}
