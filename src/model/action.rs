//! Player action types.
//!
//! The host (or the diplomatic AI bridge) submits [`PlayerAction`]s; the
//! resolver turns each one into an audit [`GameEvent`](super::GameEvent) and
//! an [`ActionRecord`].

use serde::{Deserialize, Serialize};

use super::country::CountryId;
use super::timestamp::SimTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ActionKind {
    // Hostile
    MilitaryAction,
    Geoengineering,
    BiologicalWarfare,
    RegimeChange,
    SpecialConquest,
    EconomicSanction,
    CyberAttack,
    MasonicInfluence,
    TradeEmbargo,
    Espionage,
    MediaManipulation,
    TechnologyTheft,
    // Diplomatic
    DiplomaticMessage,
    TradeAgreement,
    EconomicAid,
    DiplomaticAlliance,
    // Internal
    EconomicInvestment,
    SocialReform,
    MilitaryBuildup,
    DebtEmission,
}

string_enum!(ActionKind {
    MilitaryAction => "military_action",
    Geoengineering => "geoengineering",
    BiologicalWarfare => "biological_warfare",
    RegimeChange => "regime_change",
    SpecialConquest => "special_conquest",
    EconomicSanction => "economic_sanction",
    CyberAttack => "cyber_attack",
    MasonicInfluence => "masonic_influence",
    TradeEmbargo => "trade_embargo",
    Espionage => "espionage",
    MediaManipulation => "media_manipulation",
    TechnologyTheft => "technology_theft",
    DiplomaticMessage => "diplomatic_message",
    TradeAgreement => "trade_agreement",
    EconomicAid => "economic_aid",
    DiplomaticAlliance => "diplomatic_alliance",
    EconomicInvestment => "economic_investment",
    SocialReform => "social_reform",
    MilitaryBuildup => "military_buildup",
    DebtEmission => "debt_emission",
});

impl ActionKind {
    /// Karma added to the target when this action is aimed at another country.
    pub fn severity(self) -> i32 {
        match self {
            ActionKind::MilitaryAction => 10,
            ActionKind::Geoengineering => 9,
            ActionKind::BiologicalWarfare => 10,
            ActionKind::RegimeChange => 9,
            ActionKind::SpecialConquest => 10,
            ActionKind::EconomicSanction => 7,
            ActionKind::CyberAttack => 6,
            ActionKind::MasonicInfluence => 6,
            ActionKind::TradeEmbargo => 5,
            ActionKind::Espionage => 4,
            ActionKind::MediaManipulation => 3,
            ActionKind::TechnologyTheft => 4,
            ActionKind::DiplomaticMessage => 1,
            ActionKind::TradeAgreement => -1,
            ActionKind::EconomicAid => -2,
            ActionKind::DiplomaticAlliance => -3,
            ActionKind::EconomicInvestment
            | ActionKind::SocialReform
            | ActionKind::MilitaryBuildup
            | ActionKind::DebtEmission => 0,
        }
    }

    /// Default cost when the host does not price the action itself.
    pub fn base_cost(self) -> f64 {
        match self {
            ActionKind::MilitaryAction => 400.0,
            ActionKind::Geoengineering => 600.0,
            ActionKind::BiologicalWarfare => 500.0,
            ActionKind::RegimeChange => 450.0,
            ActionKind::SpecialConquest => 800.0,
            ActionKind::EconomicSanction => 150.0,
            ActionKind::CyberAttack => 120.0,
            ActionKind::MasonicInfluence => 200.0,
            ActionKind::TradeEmbargo => 100.0,
            ActionKind::Espionage => 80.0,
            ActionKind::MediaManipulation => 60.0,
            ActionKind::TechnologyTheft => 150.0,
            ActionKind::DiplomaticMessage => 0.0,
            ActionKind::TradeAgreement => 50.0,
            ActionKind::EconomicAid => 200.0,
            ActionKind::DiplomaticAlliance => 100.0,
            ActionKind::EconomicInvestment => 300.0,
            ActionKind::SocialReform => 250.0,
            ActionKind::MilitaryBuildup => 350.0,
            ActionKind::DebtEmission => 0.0,
        }
    }

    /// Internal actions only touch the acting country.
    pub fn is_internal(self) -> bool {
        matches!(
            self,
            ActionKind::EconomicInvestment
                | ActionKind::SocialReform
                | ActionKind::MilitaryBuildup
                | ActionKind::DebtEmission
        )
    }

    pub fn is_hostile(self) -> bool {
        !self.is_internal() && self.severity() >= 3
    }
}

/// An action submitted by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerAction {
    pub kind: ActionKind,
    pub source_country_id: CountryId,
    #[serde(default)]
    pub target_country_id: Option<CountryId>,
    pub cost: f64,
    pub timestamp: SimTime,
}

impl PlayerAction {
    /// Action priced at the kind's base cost.
    pub fn new(kind: ActionKind, source: &str, target: Option<&str>, timestamp: SimTime) -> Self {
        Self {
            kind,
            source_country_id: source.to_string(),
            target_country_id: target.map(str::to_string),
            cost: kind.base_cost(),
            timestamp,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// The target, when it differs from the source.
    pub fn distinct_target(&self) -> Option<&str> {
        self.target_country_id
            .as_deref()
            .filter(|t| *t != self.source_country_id)
    }
}

/// Audit entry for one resolved action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    pub id: u64,
    pub kind: ActionKind,
    pub source: CountryId,
    pub target: Option<CountryId>,
    pub cost: f64,
    pub success: bool,
    pub timestamp: SimTime,
    pub severity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_match_hostility_table() {
        assert_eq!(ActionKind::MilitaryAction.severity(), 10);
        assert_eq!(ActionKind::TradeEmbargo.severity(), 5);
        assert_eq!(ActionKind::DiplomaticAlliance.severity(), -3);
        assert_eq!(ActionKind::DebtEmission.severity(), 0);
    }

    #[test]
    fn distinct_target_ignores_self() {
        let a = PlayerAction::new(
            ActionKind::EconomicAid,
            "AAA",
            Some("AAA"),
            SimTime::ZERO,
        );
        assert!(a.distinct_target().is_none());
        let b = PlayerAction::new(ActionKind::EconomicAid, "AAA", Some("BBB"), SimTime::ZERO);
        assert_eq!(b.distinct_target(), Some("BBB"));
    }

    #[test]
    fn action_deserializes_from_host_json() {
        let json = r#"{"kind":"cyber_attack","source_country_id":"AAA","target_country_id":"BBB","cost":120.0,"timestamp":5000}"#;
        let action: PlayerAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.kind, ActionKind::CyberAttack);
        assert_eq!(action.timestamp, SimTime::from_secs(5));
    }

    #[test]
    fn internal_actions_are_not_hostile() {
        for kind in ActionKind::ALL {
            if kind.is_internal() {
                assert!(!kind.is_hostile(), "{kind} should not be hostile");
            }
        }
        assert!(ActionKind::Espionage.is_hostile());
        assert!(!ActionKind::DiplomaticMessage.is_hostile());
    }
}
