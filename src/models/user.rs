use diesel::prelude::*;

/// Row of the `users` table
#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: String,
    /// PHC-formatted argon2 hash, or a bcrypt hash from the legacy deployment
    pub hash: String,
    pub is_admin: bool,
}

/// Insert payload; `id` comes from the SERIAL column
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub hash: String,
    pub is_admin: bool,
}

/// Public projection of a user, without the password hash
#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserSummary {
    pub username: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            name: user.name,
            is_admin: user.is_admin,
        }
    }
}
