mod tokens;
mod users;

pub use tokens::TokenStore;
pub use users::{NewUser, User, UserStore};
