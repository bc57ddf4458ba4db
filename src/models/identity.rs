#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Who is making a request, as supplied by the external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Identity {
    pub authenticated: bool,
    pub role: Role,
    pub user_id: i64,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: i64) -> Self {
        Self {
            authenticated: true,
            role: Role::User,
            user_id,
        }
    }

    pub fn admin(user_id: i64) -> Self {
        Self {
            authenticated: true,
            role: Role::Admin,
            user_id,
        }
    }

    /// The single authorization rule for the back-office.
    pub fn is_admin(&self) -> bool {
        self.authenticated && self.role == Role::Admin
    }
}
