use std::collections::HashMap;

use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 11;

/// Short random base-36 string. Not cryptographically strong.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Pending verification tokens, keyed by token and mapping to an email.
/// Entries never expire; they leave only through [`TokenStore::consume`].
#[derive(Debug, Default)]
pub struct TokenStore {
    entries: HashMap<String, String>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, email: &str) -> String {
        let token = generate_token();
        self.entries.insert(token.clone(), email.to_string());
        token
    }

    pub fn email_for(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn consume(&mut self, token: &str) -> Option<String> {
        self.entries.remove(token)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_base36() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn issue_then_consume_once() {
        let mut store = TokenStore::new();
        let token = store.issue("a@x.com");
        assert_eq!(store.email_for(&token), Some("a@x.com"));
        assert_eq!(store.consume(&token).as_deref(), Some("a@x.com"));
        assert!(store.email_for(&token).is_none());
        assert!(store.consume(&token).is_none());
        assert_eq!(store.len(), 0);
    }
}
