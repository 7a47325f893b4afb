//! Account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farm_village_core::{AccountId, Role, Username};

/// A registered account.
///
/// The password hash is deliberately not part of this struct; it only leaves
/// the repository through [`crate::db::AccountRepository::get_auth_data`].
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub role: Role,
    pub display_name: String,
    pub active: bool,
    /// Consecutive failed login attempts since the last success.
    #[serde(skip)]
    pub failed_attempts: i32,
    /// Until when logins are rejected regardless of credentials.
    #[serde(skip)]
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether the account is currently locked out.
    #[must_use]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

/// The authenticated caller, as decoded from a bearer token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentAccount {
    pub id: AccountId,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account(locked_until: Option<DateTime<Utc>>) -> Account {
        Account {
            id: AccountId::new(1),
            username: Username::parse("jane").expect("valid username"),
            role: Role::Buyer,
            display_name: "Jane".to_owned(),
            active: true,
            failed_attempts: 0,
            locked_until,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_locked_future_timestamp() {
        let now = Utc::now();
        let acct = account(Some(now + Duration::minutes(5)));
        assert!(acct.is_locked(now));
    }

    #[test]
    fn test_is_locked_expired_timestamp() {
        let now = Utc::now();
        let acct = account(Some(now - Duration::seconds(1)));
        assert!(!acct.is_locked(now));
    }

    #[test]
    fn test_is_locked_no_timestamp() {
        assert!(!account(None).is_locked(Utc::now()));
    }
}
