use tracing::info;

use super::{HrService, require_role};
use crate::auth::password::hash_password;
use crate::error::{HrError, HrResult};
use crate::model::{role::Role, user::UserAccount};
use crate::workflow::Actor;

const MIN_PASSWORD_LEN: usize = 8;

impl HrService {
    pub fn register_user(
        &self,
        actor: &Actor,
        username: &str,
        password: &str,
        role: Role,
        employee_id: Option<u64>,
    ) -> HrResult<UserAccount> {
        require_role(actor, &[Role::Admin, Role::Hr], "register users")?;
        if role == Role::Admin && actor.role != Role::Admin {
            return Err(HrError::forbidden("Only an admin can create admin accounts"));
        }
        self.insert_user(username, password, role, employee_id)
    }

    /// Creates the first admin account when the user table is empty.
    pub fn seed_admin(&self, username: &str, password: &str) -> HrResult<Option<UserAccount>> {
        if self.store.read(|s| !s.users.is_empty()) {
            return Ok(None);
        }
        let account = self.insert_user(username, password, Role::Admin, None)?;
        info!(username = %account.username, "Seeded bootstrap admin account");
        Ok(Some(account))
    }

    pub fn find_user(&self, username: &str) -> Option<UserAccount> {
        let username = username.trim().to_lowercase();
        self.store
            .read(|s| s.users.find(|u| u.username == username).cloned())
    }

    fn insert_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        employee_id: Option<u64>,
    ) -> HrResult<UserAccount> {
        let username = username.trim().to_lowercase();
        if username.is_empty() || password.is_empty() {
            return Err(HrError::validation("Username and password must not be empty"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(HrError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let password_hash = hash_password(password).map_err(|e| HrError::Internal(e.to_string()))?;

        self.store.transaction(|s| {
            if s.users.find(|u| u.username == username).is_some() {
                return Err(HrError::Conflict("Username already taken".into()));
            }
            if let Some(id) = employee_id {
                s.employees.get(id)?;
                if s.users.find(|u| u.employee_id == Some(id)).is_some() {
                    return Err(HrError::Conflict(format!(
                        "Employee {} already has a user account",
                        id
                    )));
                }
            }
            Ok(s.users.insert_with(|id| UserAccount {
                id,
                username: username.clone(),
                password_hash,
                role,
                employee_id,
                is_active: true,
                version: 0,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::password::verify_password;
    use crate::error::HrError;
    use crate::model::role::Role;
    use crate::service::test_support::*;

    #[test]
    fn registers_and_finds_user_case_insensitively() {
        let svc = service();
        let user = svc
            .register_user(&hr(), " Ayesha ", "password123", Role::Employee, Some(AYESHA))
            .unwrap();
        assert_eq!(user.username, "ayesha");
        let found = svc.find_user("AYESHA").unwrap();
        assert!(verify_password("password123", &found.password_hash).is_ok());
    }

    #[test]
    fn duplicate_usernames_conflict() {
        let svc = service();
        svc.register_user(&hr(), "dean", "password123", Role::Dean, None).unwrap();
        assert!(matches!(
            svc.register_user(&hr(), "DEAN", "password123", Role::Dean, None),
            Err(HrError::Conflict(_))
        ));
    }

    #[test]
    fn hr_cannot_mint_admins_and_employees_cannot_register() {
        let svc = service();
        assert!(matches!(
            svc.register_user(&hr(), "root", "password123", Role::Admin, None),
            Err(HrError::Forbidden(_))
        ));
        assert!(matches!(
            svc.register_user(&employee_actor(AYESHA), "x", "password123", Role::Employee, None),
            Err(HrError::Forbidden(_))
        ));
    }

    #[test]
    fn seeds_admin_once() {
        let svc = service();
        assert!(svc.seed_admin("admin", "change-me-now").unwrap().is_some());
        assert!(svc.seed_admin("admin2", "change-me-now").unwrap().is_none());
    }

    #[test]
    fn short_passwords_are_rejected() {
        let svc = service();
        assert!(matches!(
            svc.register_user(&hr(), "short", "abc", Role::Employee, None),
            Err(HrError::Validation(_))
        ));
    }
}
