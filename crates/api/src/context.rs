/// Authenticated caller of a request.
///
/// Inserted into request extensions by the auth middleware; immutable after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    username: String,
}

impl CurrentUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
