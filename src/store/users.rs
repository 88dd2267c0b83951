use serde::Serialize;

/// User record as held in memory and returned by the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String, // plaintext, compared verbatim
    pub is_verified: bool,
}

pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Ordered in-memory user collection.
///
/// Ids are assigned as `len + 1` at insert time, so a deletion followed by a
/// registration can hand out an id that is still held by another record.
#[derive(Debug, Default)]
pub struct UserStore {
    users: Vec<User>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn find_by_credentials(&self, email: &str, password: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email == email && u.password == password)
    }

    /// Appends a new unverified user unless the email is already taken.
    pub fn insert(&mut self, new: NewUser) -> Option<&User> {
        if self.find_by_email(&new.email).is_some() {
            return None;
        }
        let user = User {
            id: self.users.len() as u64 + 1,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password: new.password,
            is_verified: false,
        };
        self.users.push(user);
        self.users.last()
    }

    /// Marks the first user with this email as verified. Returns false if none matched.
    pub fn mark_verified(&mut self, email: &str) -> bool {
        match self.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.is_verified = true;
                true
            }
            None => false,
        }
    }

    /// Overwrites the email of the first user with `id`. No uniqueness check.
    pub fn update_email(&mut self, id: u64, email: &str) -> bool {
        match self.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.email = email.to_string();
                true
            }
            None => false,
        }
    }

    /// Drops every record with `id`, returning how many were removed.
    pub fn remove(&mut self, id: u64) -> usize {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        before - self.users.len()
    }

    pub fn all(&self) -> &[User] {
        &self.users
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.users.len()
    }
}
