use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Leader,
    Scrum,
    Normal,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Admin, Self::Leader, Self::Scrum, Self::Normal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Leader => "leader",
            Self::Scrum => "scrum",
            Self::Normal => "normal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "leader" => Some(Self::Leader),
            "scrum" => Some(Self::Scrum),
            "normal" => Some(Self::Normal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    /// Bootstrap owner created by `init`. Never counted against plan limits.
    pub superuser: bool,
    pub created_at: String,
}
