/// Represents ways to locate an element in the host document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by accessibility label
    Label(String),
    /// Select by element id
    Id(String),
    /// Select by role and optional label
    Role { role: String, name: Option<String> },
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        // if using pipe, use it for the role plus label (preferred precise format)
        if s.contains('|') {
            let parts: Vec<&str> = s.split('|').collect();
            if parts.len() >= 2 {
                let role_part = parts[0].trim();
                let label_part = parts[1].trim();

                // Handle role:abcd|label:abcd format
                let role = role_part
                    .strip_prefix("role:")
                    .unwrap_or(role_part)
                    .to_string();
                let name = label_part
                    .strip_prefix("label:")
                    .unwrap_or(label_part)
                    .to_string();

                return Selector::Role {
                    role,
                    name: Some(name),
                };
            }
        }

        match s {
            _ if s.starts_with("role:") => Selector::Role {
                role: s[5..].to_string(),
                name: None,
            },
            _ if s.starts_with("label:") => Selector::Label(s[6..].to_string()),
            _ if s.starts_with("id:") => Selector::Id(s[3..].to_string()),
            _ if s.starts_with('#') => Selector::Id(s[1..].to_string()),
            _ if s.contains(':') => Selector::Invalid(format!(
                "Unknown selector format: \"{s}\". Use prefixes like 'label:', 'id:', or 'role:' to specify the selector type."
            )),
            // A bare string is an accessibility label
            _ => Selector::Label(s.to_string()),
        }
    }
}
