use chrono::{DateTime, Utc};

use super::types::*;
use crate::auth::Role;
use crate::auth::validate;
use crate::errors::AppError;

/// Known staff, in id order.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Vec<User>,
    next_id: i64,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        UserDirectory { users: Vec::new(), next_id: 1 }
    }

    pub fn from_records(mut users: Vec<User>) -> Self {
        users.sort_by_key(|u| u.id);
        let next_id = users.last().map_or(1, |u| u.id + 1);
        UserDirectory { users, next_id }
    }

    pub fn get(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username.trim()))
    }

    pub fn list_all(&self) -> &[User] {
        &self.users
    }

    pub fn list_by_role(&self, role: Role) -> Vec<&User> {
        self.users.iter().filter(|u| u.role == role).collect()
    }

    /// The user behind `id`, provided they are an officer. Anything else is a
    /// validation failure on `officer_id`.
    pub fn require_officer(&self, id: i64) -> Result<&User, AppError> {
        match self.get(id) {
            Some(user) if user.role == Role::Officer => Ok(user),
            Some(user) => Err(AppError::validation(
                "officer_id",
                format!("User {} is a {}, not an officer", user.id, user.role),
            )),
            None => Err(AppError::validation("officer_id", format!("Unknown officer {id}"))),
        }
    }

    pub fn plan_create(&self, input: &NewUser, now: DateTime<Utc>) -> Result<User, AppError> {
        validate::validate_username(&input.username)?;
        validate::validate_email(&input.email)?;
        validate::validate_optional(&input.display_name, "display_name", "Display name", 100)?;

        if self.find_by_username(&input.username).is_some() {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                input.username.trim()
            )));
        }

        let username = input.username.trim().to_string();
        let display_name = match input.display_name.trim() {
            "" => username.clone(),
            name => name.to_string(),
        };

        Ok(User {
            id: self.next_id,
            username,
            display_name,
            email: input.email.trim().to_string(),
            role: input.role,
            created_at: now,
        })
    }

    pub fn commit(&mut self, user: User) {
        self.next_id = self.next_id.max(user.id + 1);
        match self.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => self.users.push(user),
        }
    }

    pub fn create(&mut self, input: &NewUser, now: DateTime<Utc>) -> Result<User, AppError> {
        let user = self.plan_create(input, now)?;
        self.commit(user.clone());
        log::info!("user {} '{}' created as {}", user.id, user.username, user.role);
        Ok(user)
    }
}
