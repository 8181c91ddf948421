//! CRM lifecycle enumerations.
//!
//! These enums own the canonical stage/status spellings so that queries and
//! report grouping never repeat inline string literals. The reporting layer
//! itself groups by raw column values: a row carrying an unknown value forms
//! its own bucket instead of being rejected, since value enforcement belongs
//! to the CRUD layer.

use serde::{Deserialize, Serialize};

/// Customer lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Prospect,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "active",
            CustomerStatus::Inactive => "inactive",
            CustomerStatus::Prospect => "prospect",
        }
    }
}

/// Lead lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Proposal => "proposal",
            LeadStatus::Negotiation => "negotiation",
            LeadStatus::ClosedWon => "closed-won",
            LeadStatus::ClosedLost => "closed-lost",
        }
    }
}

/// Deal pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DealStage {
    Prospecting,
    Qualification,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Prospecting => "prospecting",
            DealStage::Qualification => "qualification",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::ClosedWon => "closed-won",
            DealStage::ClosedLost => "closed-lost",
        }
    }

    /// Whether the stage is terminal (won or lost).
    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

/// Categorical customer attrition-likelihood label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnRisk {
    Low,
    Medium,
    High,
}

impl ChurnRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChurnRisk::Low => "Low",
            ChurnRisk::Medium => "Medium",
            ChurnRisk::High => "High",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_status_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&LeadStatus::ClosedWon).unwrap(),
            "\"closed-won\""
        );
        assert_eq!(
            serde_json::to_string(&LeadStatus::ClosedLost).unwrap(),
            "\"closed-lost\""
        );
        assert_eq!(LeadStatus::ClosedWon.as_str(), "closed-won");
    }

    #[test]
    fn test_deal_stage_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&DealStage::Prospecting).unwrap(),
            "\"prospecting\""
        );
        assert_eq!(DealStage::ClosedLost.as_str(), "closed-lost");
    }

    #[test]
    fn test_deal_stage_is_closed() {
        assert!(DealStage::ClosedWon.is_closed());
        assert!(DealStage::ClosedLost.is_closed());
        assert!(!DealStage::Prospecting.is_closed());
        assert!(!DealStage::Qualification.is_closed());
        assert!(!DealStage::Proposal.is_closed());
        assert!(!DealStage::Negotiation.is_closed());
    }

    #[test]
    fn test_customer_status_roundtrip() {
        for status in [
            CustomerStatus::Active,
            CustomerStatus::Inactive,
            CustomerStatus::Prospect,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: CustomerStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
        }
    }

    #[test]
    fn test_churn_risk_capitalized() {
        assert_eq!(serde_json::to_string(&ChurnRisk::Low).unwrap(), "\"Low\"");
        assert_eq!(ChurnRisk::High.as_str(), "High");
    }
}
