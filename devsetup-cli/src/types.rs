//! Common types used across CLI modules

use uuid::Uuid;

/// Identifier that can be either a full UUID or an unambiguous prefix
#[derive(Debug, Clone)]
pub enum IdOrPrefix {
    /// Full UUID
    Full(Uuid),
    /// Prefix that should uniquely identify an active job
    Prefix(String),
}

impl IdOrPrefix {
    /// Parse a string into an IdOrPrefix
    ///
    /// Attempts to parse as a full UUID first, otherwise treats as a prefix
    pub fn parse(input: &str) -> Self {
        if let Ok(uuid) = Uuid::parse_str(input) {
            IdOrPrefix::Full(uuid)
        } else {
            IdOrPrefix::Prefix(input.to_lowercase())
        }
    }

    /// Get the UUID if this is a full ID
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            IdOrPrefix::Full(uuid) => Some(*uuid),
            IdOrPrefix::Prefix(_) => None,
        }
    }
}

impl std::fmt::Display for IdOrPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdOrPrefix::Full(uuid) => write!(f, "{}", uuid),
            IdOrPrefix::Prefix(prefix) => write!(f, "{}", prefix),
        }
    }
}

/// A tool given on the command line, by catalog id or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRef {
    Id(i64),
    Name(String),
}

impl ToolRef {
    pub fn parse(input: &str) -> Self {
        match input.parse::<i64>() {
            Ok(id) => ToolRef::Id(id),
            Err(_) => ToolRef::Name(input.to_string()),
        }
    }
}

impl std::fmt::Display for ToolRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolRef::Id(id) => write!(f, "#{}", id),
            ToolRef::Name(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_or_prefix_parse() {
        let uuid = Uuid::new_v4();
        assert_eq!(IdOrPrefix::parse(&uuid.to_string()).as_uuid(), Some(uuid));

        let prefix = IdOrPrefix::parse("3F2A");
        assert!(prefix.as_uuid().is_none());
        assert_eq!(prefix.to_string(), "3f2a");
    }

    #[test]
    fn test_tool_ref_parse() {
        assert_eq!(ToolRef::parse("12"), ToolRef::Id(12));
        assert_eq!(ToolRef::parse("docker"), ToolRef::Name("docker".to_string()));
        assert_eq!(ToolRef::parse("aws-cli").to_string(), "aws-cli");
        assert_eq!(ToolRef::Id(3).to_string(), "#3");
    }
}
