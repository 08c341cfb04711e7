use serde::{Deserialize, Serialize};

/// A recipient field (`to`, `cc` or `bcc`), resolved once at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// No address set.
    #[default]
    Empty,
    /// Exactly one address.
    Single(String),
    /// Two or more addresses, in the order they were added.
    Many(Vec<String>),
}

impl Recipients {
    /// Add an address. Blank addresses are ignored.
    pub fn push(&mut self, address: impl Into<String>) {
        let address = address.into();
        let address = address.trim();
        if address.is_empty() {
            return;
        }
        *self = match std::mem::take(self) {
            Self::Empty => Self::Single(address.to_owned()),
            Self::Single(first) => Self::Many(vec![first, address.to_owned()]),
            Self::Many(mut all) => {
                all.push(address.to_owned());
                Self::Many(all)
            }
        };
    }

    /// Add every address found in a header value such as
    /// `"Jane <jane@example.com>, bob@example.com"`.
    ///
    /// Addresses already present (compared ignoring ASCII case) are skipped.
    pub fn push_header_value(&mut self, value: &str) {
        for address in split_address_list(value) {
            if !self.contains(&address) {
                self.push(address);
            }
        }
    }

    /// Whether `address` is already listed, ignoring ASCII case.
    pub fn contains(&self, address: &str) -> bool {
        let address = address.trim();
        self.iter().any(|a| a.eq_ignore_ascii_case(address))
    }

    /// Iterate the addresses in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Empty => &[],
            Self::Single(address) => std::slice::from_ref(address),
            Self::Many(all) => all,
        };
        slice.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Many(all) => all.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        let mut recipients = Self::Empty;
        recipients.push(address);
        recipients
    }
}

impl<S: Into<String>> FromIterator<S> for Recipients {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut recipients = Self::Empty;
        for address in iter {
            recipients.push(address);
        }
        recipients
    }
}

/// Split an address-list header into individual mailboxes.
///
/// Uses `mailparse` so quoted display names containing commas survive;
/// falls back to a plain comma split when the list does not parse.
fn split_address_list(value: &str) -> Vec<String> {
    match mailparse::addrparse(value) {
        Ok(list) => list
            .iter()
            .flat_map(|addr| match addr {
                mailparse::MailAddr::Single(single) => vec![single.to_string()],
                mailparse::MailAddr::Group(group) => {
                    group.addrs.iter().map(ToString::to_string).collect()
                }
            })
            .collect(),
        Err(_) => value.split(',').map(|s| s.trim().to_owned()).collect(),
    }
}
