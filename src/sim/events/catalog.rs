//! Static template tables for generated events.
//!
//! Every template is plain data. [`build`] is the single constructor that
//! turns a template into a [`GameEvent`] for a concrete target.

use crate::model::EventKind as K;
use crate::model::{Country, CountryDelta, EventCategory, EventKind, GameEvent, Polarity};
use crate::sim::TickContext;

/// Karma points that double a karma template's magnitude.
const KARMA_SCALE_DIVISOR: f64 = 50.0;

/// Stability hit at or beyond which a negative event is reported as an error.
const SEVERE_STABILITY: f64 = -20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateDef {
    pub kind: EventKind,
    pub title: &'static str,
    pub effects: &'static [&'static str],
    /// Stability points.
    pub stability: f64,
    /// Percent of GDP.
    pub economy: f64,
    /// Percent of population.
    pub population: f64,
    /// Debt ratio points.
    pub debt: f64,
    pub resource: Option<(&'static str, f64)>,
}

const fn template(
    kind: EventKind,
    title: &'static str,
    effects: &'static [&'static str],
    stability: f64,
    economy: f64,
    population: f64,
    debt: f64,
) -> TemplateDef {
    TemplateDef {
        kind,
        title,
        effects,
        stability,
        economy,
        population,
        debt,
        resource: None,
    }
}

const fn with_resource(def: TemplateDef, resource: &'static str, amount: f64) -> TemplateDef {
    TemplateDef {
        resource: Some((resource, amount)),
        ..def
    }
}

pub static NEGATIVE: &[TemplateDef] = &[
    template(K::EconomicCrisis, "Economic crisis", &["Markets tumble", "Unemployment climbs"], -12.0, -6.0, 0.0, 8.0),
    template(K::PoliticalScandal, "Political scandal", &["Cabinet ministers resign"], -8.0, -1.0, 0.0, 0.0),
    template(K::GeneralStrike, "General strike", &["Ports and factories idle"], -10.0, -4.0, 0.0, 2.0),
    template(K::CivilUnrest, "Civil unrest", &["Riots spread through the capital"], -14.0, -2.0, 0.0, 0.0),
    template(K::Earthquake, "Earthquake", &["Cities damaged", "Relief efforts strained"], -10.0, -5.0, -0.3, 6.0),
    template(K::PandemicOutbreak, "Pandemic outbreak", &["Hospitals overwhelmed"], -12.0, -5.0, -0.8, 5.0),
    template(K::CyberAttackWave, "Cyber attack wave", &["Banking systems offline"], -6.0, -3.0, 0.0, 0.0),
    template(K::CurrencyCollapse, "Currency collapse", &["Savings wiped out overnight"], -18.0, -10.0, 0.0, 20.0),
    template(K::BankingCrisis, "Banking crisis", &["Depositors queue at branches"], -12.0, -7.0, 0.0, 15.0),
    with_resource(
        template(K::CropFailure, "Crop failure", &["Harvest lost to blight"], -8.0, -3.0, -0.1, 0.0),
        "grain",
        -20.0,
    ),
    template(K::TerroristAttack, "Terrorist attack", &["Nation in mourning"], -15.0, -2.0, -0.05, 0.0),
    template(K::MassProtests, "Mass protests", &["Millions march against the government"], -11.0, -1.0, 0.0, 0.0),
    template(K::CorruptionScandal, "Corruption scandal", &["Public funds embezzled"], -9.0, -2.0, 0.0, 3.0),
    with_resource(
        template(K::EnergyShortage, "Energy shortage", &["Rolling blackouts ordered"], -7.0, -4.0, 0.0, 0.0),
        "oil",
        -15.0,
    ),
    template(K::RefugeeCrisis, "Refugee crisis", &["Border camps overflow"], -9.0, -2.0, 0.5, 2.0),
    template(K::BorderSkirmish, "Border skirmish", &["Troops exchange fire"], -8.0, -1.0, -0.02, 1.0),
    template(K::GovernmentCollapse, "Government collapse", &["Coalition dissolves", "Caretaker cabinet appointed"], -20.0, -4.0, 0.0, 5.0),
    template(K::Hyperinflation, "Hyperinflation", &["Prices double within weeks"], -16.0, -9.0, 0.0, 18.0),
    template(K::SupplyChainDisruption, "Supply chain disruption", &["Shelves empty", "Factories stall"], -6.0, -4.0, 0.0, 0.0),
    with_resource(
        template(K::Drought, "Drought", &["Reservoirs run dry"], -7.0, -3.0, -0.05, 0.0),
        "water",
        -25.0,
    ),
    template(K::IndustrialAccident, "Industrial accident", &["Chemical plant explodes"], -6.0, -2.0, -0.01, 0.0),
    template(K::SeparatistMovement, "Separatist movement", &["Regional parliament declares autonomy"], -17.0, -3.0, 0.0, 0.0),
    template(K::KarmaRetaliation, "Retaliation campaign", &["Old grievances turn violent"], -10.0, -3.0, 0.0, 0.0),
    template(K::KarmaBoycott, "International boycott", &["Trading partners walk away"], -6.0, -5.0, 0.0, 4.0),
    template(K::KarmaInsurgency, "Insurgency", &["Armed groups seize provinces"], -12.0, -2.0, -0.1, 3.0),
];

pub static HOSTILE: &[TemplateDef] = &[
    template(K::HostileSanctions, "Coordinated sanctions", &["Rival powers freeze assets"], -8.0, -6.0, 0.0, 5.0),
    template(K::HostileProxyInsurgency, "Proxy insurgency", &["Foreign-backed militias strike"], -15.0, -3.0, -0.05, 2.0),
    template(K::HostileDiplomaticExpulsion, "Diplomatic expulsion", &["Ambassadors sent home"], -6.0, -1.0, 0.0, 0.0),
    template(K::HostileCyberRetaliation, "Cyber retaliation", &["Power grid sabotaged"], -9.0, -4.0, 0.0, 0.0),
];

pub static POSITIVE: &[TemplateDef] = &[
    template(K::EconomicBoom, "Economic boom", &["Record growth reported"], 6.0, 5.0, 0.0, -3.0),
    with_resource(
        template(K::ResourceDiscovery, "Resource discovery", &["New deposits confirmed"], 4.0, 4.0, 0.0, 0.0),
        "minerals",
        30.0,
    ),
    template(K::TechnologicalBreakthrough, "Technological breakthrough", &["Patents filed worldwide"], 5.0, 4.0, 0.0, 0.0),
    template(K::TradeSurge, "Trade surge", &["Exports hit new highs"], 3.0, 4.0, 0.0, -2.0),
    template(K::DiplomaticBreakthrough, "Diplomatic breakthrough", &["Historic treaty signed"], 6.0, 1.0, 0.0, 0.0),
    template(K::CulturalRenaissance, "Cultural renaissance", &["Arts flourish"], 7.0, 1.0, 0.0, 0.0),
    template(K::InfrastructureCompletion, "Infrastructure completed", &["New rail network opens"], 4.0, 3.0, 0.0, 2.0),
    template(K::ForeignInvestment, "Foreign investment", &["Capital floods in"], 3.0, 5.0, 0.0, -2.0),
    with_resource(
        template(K::BumperHarvest, "Bumper harvest", &["Granaries overflow"], 4.0, 2.0, 0.0, 0.0),
        "grain",
        25.0,
    ),
    template(K::TourismBoom, "Tourism boom", &["Visitors arrive in record numbers"], 3.0, 3.0, 0.0, 0.0),
    template(K::AntiCorruptionDrive, "Anti-corruption drive", &["Officials prosecuted"], 8.0, 1.0, 0.0, -2.0),
    template(K::PeaceAccord, "Peace accord", &["Border tensions ease"], 9.0, 1.0, 0.0, 0.0),
    with_resource(
        template(K::EnergyIndependence, "Energy independence", &["Domestic grid self-sufficient"], 5.0, 3.0, 0.0, -1.0),
        "oil",
        15.0,
    ),
    template(K::MedicalAdvance, "Medical advance", &["Life expectancy rises"], 5.0, 1.0, 0.2, 0.0),
    template(K::EducationReform, "Education reform", &["Literacy rates climb"], 5.0, 2.0, 0.0, 1.0),
    template(K::StockMarketRally, "Stock market rally", &["Indices close at record highs"], 3.0, 4.0, 0.0, -1.0),
    template(K::SpaceProgramSuccess, "Space program success", &["Satellite reaches orbit"], 6.0, 1.0, 0.0, 1.0),
    template(K::NationalUnity, "National unity", &["Rival parties form unity government"], 10.0, 0.0, 0.0, 0.0),
    template(K::KarmaSympathy, "International sympathy", &["Aid pledged by the world community"], 5.0, 3.0, 0.0, -2.0),
    template(K::KarmaReconciliation, "Reconciliation", &["Former victims forge new ties"], 6.0, 2.0, 0.0, 0.0),
];

/// Safety-valve templates, only used when chaos is past the threshold.
pub static STABILIZING: &[TemplateDef] = &[
    template(K::InternationalRelief, "International relief", &["Aid convoys arrive", "Emergency loans approved"], 15.0, 3.0, 0.0, -5.0),
    template(K::StabilizationPackage, "Stabilization package", &["Central bank intervenes"], 12.0, 4.0, 0.0, -8.0),
];

/// Look up the template for `kind` in any table.
pub fn lookup(kind: EventKind) -> Option<&'static TemplateDef> {
    NEGATIVE
        .iter()
        .chain(HOSTILE)
        .chain(POSITIVE)
        .chain(STABILIZING)
        .find(|t| t.kind == kind)
}

/// Magnitude multiplier for `karma_*` templates.
pub fn karma_scale(karma: f64) -> f64 {
    1.0 + karma / KARMA_SCALE_DIVISOR
}

impl TemplateDef {
    /// The delta this template applies to `target`, scaled by karma where the
    /// template calls for it.
    pub fn delta_for(&self, target: &Country) -> CountryDelta {
        let scale = if self.kind.is_karma_scaled() {
            karma_scale(target.karma_score)
        } else {
            1.0
        };
        let mut delta = CountryDelta::new(&target.id)
            .stability(self.stability * scale)
            .economy(self.economy * scale)
            .population(self.population * scale)
            .debt(self.debt * scale);
        if let Some((resource, amount)) = self.resource {
            delta = delta.resource(resource, amount * scale);
        }
        delta
    }
}

/// Instantiate `def` against `target`. The event is returned unapplied.
pub fn build(def: &TemplateDef, target: &Country, ctx: &mut TickContext) -> GameEvent {
    let delta = def.delta_for(target);
    let category = match def.kind.polarity() {
        Polarity::Negative
            if def.kind.is_karma_scaled()
                || def.kind.is_hostile_act()
                || delta.stability <= SEVERE_STABILITY =>
        {
            EventCategory::Error
        }
        Polarity::Negative => EventCategory::Warning,
        Polarity::Positive | Polarity::Neutral => EventCategory::Success,
    };
    GameEvent {
        id: ctx.next_id(),
        kind: def.kind,
        category,
        title: format!("{} in {}", def.title, target.name),
        effects: def.effects.iter().map(|s| s.to_string()).collect(),
        deltas: vec![delta],
        timestamp: ctx.now,
        triggered_by_player: false,
        targeted_country_id: Some(target.id.clone()),
        chaos_level_at_creation: ctx.chaos_level,
        action: None,
        caused_by: None,
    }
}
