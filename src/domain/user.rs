use serde::{Deserialize, Serialize};

/// Capability granted to a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    #[strum(serialize = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    #[strum(serialize = "ROLE_ADMIN")]
    Admin,
}

/// A provisioned account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub token: String,
    pub roles: Vec<Role>,
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub id: i64,
    pub username: String,
    pub roles: Vec<Role>,
}

impl Caller {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl From<User> for Caller {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            roles: user.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::User.to_string(), "ROLE_USER");
        assert_eq!(
            serde_json::to_string(&Role::Admin).unwrap(),
            "\"ROLE_ADMIN\""
        );
        let parsed: Role = serde_json::from_str("\"ROLE_USER\"").unwrap();
        assert_eq!(parsed, Role::User);
    }

    #[test]
    fn test_caller_drops_token() {
        let caller = Caller::from(User {
            id: 4,
            username: "ada".into(),
            token: "secret".into(),
            roles: vec![Role::User],
        });
        assert_eq!(caller.id, 4);
        assert!(caller.has_role(Role::User));
        assert!(!caller.has_role(Role::Admin));
        assert!(!serde_json::to_string(&caller).unwrap().contains("secret"));
    }
}
