pub mod contact;
pub mod flow;
pub mod installation;
pub mod job_card;
pub mod product;
pub mod warranty;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::models::ids::ObjectId;

pub use contact::Contact;
pub use flow::{Flow, FlowStep, FlowTransition};
pub use installation::{Installation, InstallationStatus};
pub use job_card::{JobCard, JobCardStatus};
pub use product::Product;
pub use warranty::{Warranty, WarrantyStatus};

/// A REST collection exposed under the API base URL.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> Option<&ObjectId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Contacts,
    Products,
    JobCards,
    Warranties,
    Installations,
    Flows,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Contacts,
        ResourceKind::Products,
        ResourceKind::JobCards,
        ResourceKind::Warranties,
        ResourceKind::Installations,
        ResourceKind::Flows,
    ];

    /// Collection path segment, without slashes.
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Contacts => "contacts",
            ResourceKind::Products => "products",
            ResourceKind::JobCards => "job-cards",
            ResourceKind::Warranties => "warranties",
            ResourceKind::Installations => "installations",
            ResourceKind::Flows => "flows",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_matches('/').replace('_', "-").to_lowercase();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.path() == normalized)
            .ok_or_else(|| format!("Unknown resource: {}", s))
    }
}
