use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

pub const DEMO_ADDRESS: &str = "rdmx6-jaaaa-aaaah-qcaiq-cai";
pub const VOICE_HANDLE_SUFFIX: &str = ".voice";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressBookError {
    #[error("contact name is required")]
    MissingName,
    #[error("a voice handle or wallet address is required")]
    MissingDestination,
    #[error("no contact with id {0}")]
    UnknownContact(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub voice_handle: String,
    pub address: String,
    pub favorite: bool,
}

impl Contact {
    /// First grapheme of each whitespace-separated name part.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.graphemes(true).next())
            .collect()
    }

    pub fn short_address(&self) -> String {
        let head = self.address.graphemes(true).take(20).collect::<String>();
        format!("{head}...")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub voice_handle: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressBook {
    contacts: Vec<Contact>,
    next_id: u64,
}

impl AddressBook {
    pub fn new() -> Self {
        Self {
            contacts: Vec::new(),
            next_id: 1,
        }
    }

    pub fn with_demo_contacts() -> Self {
        let mut book = Self::new();
        for (name, handle, address, favorite) in [
            ("Alice Johnson", "alice.voice", DEMO_ADDRESS, true),
            ("Bob Smith", "bob.voice", "rrkah-fqaaa-aaaah-qcaiq-cai", false),
            ("Carol Williams", "carol.voice", "ryjl3-tyaaa-aaaah-qcaiq-cai", true),
            ("David Brown", "david.voice", DEMO_ADDRESS, false),
        ] {
            let id = book.allocate_id();
            book.contacts.push(Contact {
                id,
                name: name.to_string(),
                voice_handle: handle.to_string(),
                address: address.to_string(),
                favorite,
            });
        }
        book
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn add(&mut self, new_contact: NewContact) -> Result<&Contact, AddressBookError> {
        let name = new_contact.name.trim();
        if name.is_empty() {
            return Err(AddressBookError::MissingName);
        }

        let voice_handle = non_blank(new_contact.voice_handle);
        let address = non_blank(new_contact.address);
        if voice_handle.is_none() && address.is_none() {
            return Err(AddressBookError::MissingDestination);
        }

        let contact = Contact {
            id: self.allocate_id(),
            name: name.to_string(),
            voice_handle: voice_handle.unwrap_or_else(|| default_voice_handle(name)),
            address: address.unwrap_or_else(|| DEMO_ADDRESS.to_string()),
            favorite: false,
        };

        let index = self.contacts.len();
        self.contacts.push(contact);
        Ok(&self.contacts[index])
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == id)
    }

    pub fn find_by_voice_handle(&self, handle: &str) -> Option<&Contact> {
        let handle = handle.trim().to_lowercase();
        self.contacts
            .iter()
            .find(|contact| contact.voice_handle.to_lowercase() == handle)
    }

    /// Case-insensitive containment on name or voice handle.
    pub fn search(&self, term: &str) -> Vec<&Contact> {
        let term = term.trim().to_lowercase();
        self.contacts
            .iter()
            .filter(|contact| {
                contact.name.to_lowercase().contains(&term)
                    || contact.voice_handle.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn favorites(&self) -> Vec<&Contact> {
        self.contacts
            .iter()
            .filter(|contact| contact.favorite)
            .collect()
    }

    /// Flips the favorite flag and returns the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, AddressBookError> {
        let contact = self
            .contacts
            .iter_mut()
            .find(|contact| contact.id == id)
            .ok_or_else(|| AddressBookError::UnknownContact(id.to_string()))?;

        contact.favorite = !contact.favorite;
        Ok(contact.favorite)
    }

    fn allocate_id(&mut self) -> String {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id.to_string()
    }
}

/// Lower-cased name with its first space removed, e.g. `Eve Adams` becomes
/// `eveadams.voice`.
pub fn default_voice_handle(name: &str) -> String {
    format!("{}{VOICE_HANDLE_SUFFIX}", name.to_lowercase().replacen(' ', "", 1))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
