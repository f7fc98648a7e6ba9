//! Domain records: profiles, contracts and jobs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Profile kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum ProfileType {
    Client = 1,
    Contractor = 2,
}

impl From<i16> for ProfileType {
    fn from(v: i16) -> Self {
        match v {
            1 => ProfileType::Client,
            _ => ProfileType::Contractor,
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileType::Client => write!(f, "client"),
            ProfileType::Contractor => write!(f, "contractor"),
        }
    }
}

/// Contract lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum ContractStatus {
    New = 1,
    InProgress = 2,
    Terminated = 3,
}

impl From<i16> for ContractStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => ContractStatus::New,
            2 => ContractStatus::InProgress,
            _ => ContractStatus::Terminated,
        }
    }
}

impl FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(ContractStatus::New),
            "in_progress" => Ok(ContractStatus::InProgress),
            "terminated" => Ok(ContractStatus::Terminated),
            _ => Err(format!("Invalid contract status: {}", s)),
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractStatus::New => write!(f, "new"),
            ContractStatus::InProgress => write!(f, "in_progress"),
            ContractStatus::Terminated => write!(f, "terminated"),
        }
    }
}

/// A client or contractor account holding a monetary balance.
///
/// The balance is mutated only by the transfer engine, never directly by
/// handlers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_id: i64,
    pub profile_type: ProfileType,
    pub first_name: String,
    pub last_name: String,
    pub profession: String,
    pub balance: Decimal,
}

impl Profile {
    pub fn is_client(&self) -> bool {
        self.profile_type == ProfileType::Client
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Agreement between one client and one contractor.
///
/// Read-only in the core; referenced to determine ownership and the
/// active/terminated state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub contract_id: i64,
    pub client_id: i64,
    pub contractor_id: i64,
    pub terms: String,
    pub status: ContractStatus,
}

impl Contract {
    /// True when `profile_id` sits on either side of the contract.
    pub fn involves(&self, profile_id: i64) -> bool {
        self.client_id == profile_id || self.contractor_id == profile_id
    }
}

/// A unit of billable work under a contract, paid at most once.
///
/// `paid` is `None` until settlement marks it `Some(true)` together with a
/// payment date; the flag never reverses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: i64,
    pub contract_id: i64,
    pub description: String,
    pub price: Decimal,
    pub paid: Option<bool>,
    pub payment_date: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_paid(&self) -> bool {
        self.paid == Some(true)
    }
}
