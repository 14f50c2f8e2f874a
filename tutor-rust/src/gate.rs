/// A soft access gate shown before the tutor.
///
/// The passphrase is compared in plain text on the client. It keeps casual
/// visitors out and nothing more.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gate {
    passphrase: Option<String>,
}

impl Gate {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Some(passphrase.into()),
        }
    }

    /// A gate that lets everyone in.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn requires_passphrase(&self) -> bool {
        self.passphrase.is_some()
    }

    #[must_use]
    pub fn check(&self, input: &str) -> bool {
        match &self.passphrase {
            Some(passphrase) => input.trim() == passphrase.as_str(),
            None => true,
        }
    }
}
