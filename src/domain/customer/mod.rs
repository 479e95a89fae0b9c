//! Customer records: contacts that have entered an active conversation,
//! tracked with a communication progress and interest level.

mod service;

pub use service::{CustomerFilter, CustomerService, CustomerStatistics};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the conversation with a customer currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationProgress {
    Pending,
    Following,
    NoFollow,
    Paused,
}

impl CommunicationProgress {
    pub const ALL: [CommunicationProgress; 4] = [
        CommunicationProgress::Pending,
        CommunicationProgress::Following,
        CommunicationProgress::NoFollow,
        CommunicationProgress::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationProgress::Pending => "pending",
            CommunicationProgress::Following => "following",
            CommunicationProgress::NoFollow => "no_follow",
            CommunicationProgress::Paused => "paused",
        }
    }

    /// Lenient parse for values read back from storage; unknown values
    /// fall back to `Pending`.
    pub fn parse(value: &str) -> Self {
        match value {
            "following" => CommunicationProgress::Following,
            "no_follow" => CommunicationProgress::NoFollow,
            "paused" => CommunicationProgress::Paused,
            _ => CommunicationProgress::Pending,
        }
    }
}

/// How interested the customer has shown themselves to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestLevel {
    NoInterest,
    LowInterest,
    MediumInterest,
    HighInterest,
}

impl InterestLevel {
    pub const ALL: [InterestLevel; 4] = [
        InterestLevel::NoInterest,
        InterestLevel::LowInterest,
        InterestLevel::MediumInterest,
        InterestLevel::HighInterest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterestLevel::NoInterest => "no_interest",
            InterestLevel::LowInterest => "low_interest",
            InterestLevel::MediumInterest => "medium_interest",
            InterestLevel::HighInterest => "high_interest",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "low_interest" => InterestLevel::LowInterest,
            "medium_interest" => InterestLevel::MediumInterest,
            "high_interest" => InterestLevel::HighInterest,
            _ => InterestLevel::NoInterest,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub company: String,
    pub email_count: i32,
    pub communication_progress: String,
    pub interest_level: String,
    pub last_communication_time: Option<DateTime<Utc>>,
    pub current_progress: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub company: String,
    #[serde(default)]
    pub email_count: i32,
    pub communication_progress: Option<CommunicationProgress>,
    pub interest_level: Option<InterestLevel>,
    pub last_communication_time: Option<DateTime<Utc>>,
    pub current_progress: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub email_count: Option<i32>,
    pub communication_progress: Option<CommunicationProgress>,
    pub interest_level: Option<InterestLevel>,
    pub last_communication_time: Option<DateTime<Utc>>,
    pub current_progress: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub communication_progress: Option<CommunicationProgress>,
    pub interest_level: Option<InterestLevel>,
    pub current_progress: Option<String>,
    pub last_communication_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmailCountRequest {
    pub email_count: i32,
    pub last_communication_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub company: String,
    pub email_count: i32,
    pub communication_progress: CommunicationProgress,
    pub interest_level: InterestLevel,
    pub last_communication_time: Option<DateTime<Utc>>,
    pub current_progress: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            user_id: customer.user_id,
            name: customer.name,
            email: customer.email,
            company: customer.company,
            email_count: customer.email_count,
            communication_progress: CommunicationProgress::parse(&customer.communication_progress),
            interest_level: InterestLevel::parse(&customer.interest_level),
            last_communication_time: customer.last_communication_time,
            current_progress: customer.current_progress,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub success: bool,
    pub customers: Vec<CustomerResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_round_trip() {
        for progress in CommunicationProgress::ALL {
            assert_eq!(CommunicationProgress::parse(progress.as_str()), progress);
        }
    }

    #[test]
    fn test_progress_unknown_falls_back() {
        assert_eq!(
            CommunicationProgress::parse("weird"),
            CommunicationProgress::Pending
        );
    }

    #[test]
    fn test_interest_round_trip() {
        for interest in InterestLevel::ALL {
            assert_eq!(InterestLevel::parse(interest.as_str()), interest);
        }
        assert_eq!(InterestLevel::parse(""), InterestLevel::NoInterest);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&CommunicationProgress::NoFollow).unwrap();
        assert_eq!(json, "\"no_follow\"");

        let parsed: InterestLevel = serde_json::from_str("\"high_interest\"").unwrap();
        assert_eq!(parsed, InterestLevel::HighInterest);
    }
}
