//! Template variable vocabulary.

use serde::{Deserialize, Serialize};

/// Everything a template may reference. Recipient fields come from the
/// stored contact; sender fields from configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateVars {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub title: String,
    pub company: String,
    pub industry: String,
    pub custom_reason: String,
    pub your_name: String,
    pub your_title: String,
    pub your_company: String,
    pub date: String,
}

impl TemplateVars {
    /// Fill in derivable fields: full name from first/last, first and last
    /// name split from a full name, today's date when none was supplied.
    pub fn normalized(&self) -> Self {
        let mut vars = self.clone();

        if vars.full_name.is_empty() && !vars.first_name.is_empty() {
            vars.full_name = if vars.last_name.is_empty() {
                vars.first_name.clone()
            } else {
                format!("{} {}", vars.first_name, vars.last_name)
            };
        }

        if vars.first_name.is_empty() && !vars.full_name.is_empty() {
            let mut parts = vars.full_name.split_whitespace();
            if let Some(first) = parts.next() {
                vars.first_name = first.to_string();
            }
            let rest: Vec<&str> = parts.collect();
            if !rest.is_empty() {
                vars.last_name = rest.join(" ");
            }
        }

        if vars.date.is_empty() {
            vars.date = chrono::Local::now().format("%B %-d, %Y").to_string();
        }

        vars
    }

    /// The substitution table: placeholder → value.
    pub(crate) fn pairs(&self) -> [(&'static str, &str); 11] {
        [
            ("{{FirstName}}", &self.first_name),
            ("{{LastName}}", &self.last_name),
            ("{{FullName}}", &self.full_name),
            ("{{Title}}", &self.title),
            ("{{Company}}", &self.company),
            ("{{Industry}}", &self.industry),
            ("{{CustomReason}}", &self.custom_reason),
            ("{{YourName}}", &self.your_name),
            ("{{YourTitle}}", &self.your_title),
            ("{{YourCompany}}", &self.your_company),
            ("{{Date}}", &self.date),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_derived_from_parts() {
        let vars = TemplateVars {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            ..Default::default()
        };
        assert_eq!(vars.normalized().full_name, "Ada Lovelace");

        let first_only = TemplateVars {
            first_name: "Ada".into(),
            ..Default::default()
        };
        assert_eq!(first_only.normalized().full_name, "Ada");
    }

    #[test]
    fn test_parts_derived_from_full_name() {
        let vars = TemplateVars {
            full_name: "Grace Brewster Hopper".into(),
            ..Default::default()
        };
        let n = vars.normalized();
        assert_eq!(n.first_name, "Grace");
        assert_eq!(n.last_name, "Brewster Hopper");
    }

    #[test]
    fn test_date_filled_when_empty() {
        let n = TemplateVars::default().normalized();
        assert!(!n.date.is_empty());

        let fixed = TemplateVars {
            date: "March 3, 2026".into(),
            ..Default::default()
        };
        assert_eq!(fixed.normalized().date, "March 3, 2026");
    }
}
