//! Clients for external discovery services.

mod hunter;
mod llm;

pub use hunter::{DiscoveredContact, DomainSearchResult, HunterClient};
pub use llm::{CompanyProfile, CompanySearchClient};
