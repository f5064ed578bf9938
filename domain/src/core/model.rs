//! Model value object representing a chat-completion model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Chat-completion models (Value Object)
///
/// Well-known identifiers get their own variant; anything else the provider
/// accepts is carried verbatim in [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Model {
    #[default]
    Gpt4oMini,
    Gpt4o,
    Gpt41,
    Gpt41Mini,
    O4Mini,
    Custom(String),
}

impl Model {
    /// Get the identifier sent to the completion endpoint
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt41 => "gpt-4.1",
            Model::Gpt41Mini => "gpt-4.1-mini",
            Model::O4Mini => "o4-mini",
            Model::Custom(s) => s,
        }
    }

    /// Resolve an identifier, falling back to [`Model::Custom`]
    pub fn from_id(id: &str) -> Self {
        match id.trim() {
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4o" => Model::Gpt4o,
            "gpt-4.1" => Model::Gpt41,
            "gpt-4.1-mini" => Model::Gpt41Mini,
            "o4-mini" => Model::O4Mini,
            other => Model::Custom(other.to_string()),
        }
    }

    /// Models listed by the `/model` command
    pub fn known_models() -> Vec<Model> {
        vec![
            Model::Gpt4oMini,
            Model::Gpt4o,
            Model::Gpt41,
            Model::Gpt41Mini,
            Model::O4Mini,
        ]
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Model::Custom(_))
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::from_id(s))
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from_id(&s))
    }
}
