//! Structured meeting data extracted from summaries.
//!
//! Every leaf field is optional: the extraction model uses `null` for
//! anything not mentioned in the conversation. The JSON schema derived
//! from these types is embedded in the extraction prompt and used to
//! constrain the model's output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A person mentioned in the meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Contact {
    /// Full name of the contact.
    pub name: Option<String>,
    /// Job title or role.
    pub role: Option<String>,
    /// Geographic location.
    pub location: Option<String>,
    /// Whether they are a decision maker.
    pub is_decision_maker: Option<bool>,
    /// Duration in current position, if mentioned.
    pub tenure_duration: Option<String>,
}

/// A company mentioned in the meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Company {
    /// Company name.
    pub name: Option<String>,
    /// Assets under management.
    pub aum: Option<String>,
    /// ICP classification: 1 or 2.
    pub icp_classification: Option<i64>,
    /// Geographic location.
    pub location: Option<String>,
    /// Whether they are currently a client.
    pub is_client: Option<bool>,
    /// Competitor products they hold.
    pub competitor_products: Option<Vec<String>>,
    /// Strategies of interest (trend, carry, m.arb, gold, btc).
    pub strategies_of_interest: Option<Vec<String>>,
}

/// A deal or opportunity discussed in the meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Deal {
    /// Possible investment ticket size.
    pub ticket_size: Option<String>,
    /// Products of interest (RSSB, RSST, RSBT, RSSY, RSBY, RSSX, RSBA, BTGD).
    pub products_of_interest: Option<Vec<String>>,
}

/// Complete structured data extracted from one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MeetingData {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub deals: Vec<Deal>,
}

impl MeetingData {
    /// JSON schema used to constrain structured generation.
    pub fn schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(MeetingData))
            .unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }
}
