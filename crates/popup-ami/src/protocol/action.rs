//! Outbound manager actions.

/// A manager action: an ordered list of `Key: Value` fields, the first
/// of which is always `Action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmiAction {
    fields: Vec<(String, String)>,
}

impl AmiAction {
    /// Starts an action with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            fields: vec![("Action".to_string(), name.into())],
        }
    }

    /// Appends a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// `Action: Login` with credentials.
    pub fn login(username: &str, secret: &str) -> Self {
        Self::new("Login")
            .field("Username", username)
            .field("Secret", secret)
    }

    /// `Action: Logoff`.
    pub fn logoff() -> Self {
        Self::new("Logoff")
    }

    /// The action name.
    pub fn name(&self) -> &str {
        &self.fields[0].1
    }

    /// All fields in wire order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}
