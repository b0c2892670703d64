//! Plan documents
//!
//! A plan document is a YAML file with the household's inputs under `plan`
//! and, optionally, how to project them under `simulation`:
//!
//! ```yaml
//! plan:
//!   basics:
//!     currentAge: 30
//!     annualIncome: 100000
//!     ...
//! simulation:
//!   mode: monteCarlo
//!   seedCount: 500
//! ```

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use fireplan_core::config::SimulationConfig;
use fireplan_core::model::QuickPlanInputs;
use serde::{Deserialize, Serialize};

/// File name `fireplan init` writes when no path is given
pub const DEFAULT_PLAN_FILE: &str = "plan.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlanDocument {
    pub plan: QuickPlanInputs,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl PlanDocument {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Save to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read plan document {}", path.display()))?;
        let document = Self::from_yaml(&content)
            .wrap_err_with(|| format!("Failed to parse plan document {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded plan document");
        Ok(document)
    }

    /// Starter document: the default plan with every simulation setting spelled out
    pub fn template() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fireplan_core::config::ProjectionBasis;
    use fireplan_core::model::ReturnsMode;
    use std::fs;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
plan:
  basics:
    currentAge: 35
    annualIncome: 120000
    annualExpenses: 70000
    investedAssets: 150000
  growthRates:
    incomeGrowthRate: 3
    expenseGrowthRate: 2
  allocation:
    stockAllocation: 80
    bondAllocation: 15
    cashAllocation: 5
  goals:
    retirementExpenses: 50000
  marketAssumptions:
    stockReturn: 10
    bondReturn: 5
    cashReturn: 3
    inflationRate: 3
    simulationMode: monteCarlo
  retirementFunding:
    safeWithdrawalRate: 4
    lifeExpectancy: 92
"#;

    #[test]
    fn test_minimal_document_uses_simulation_defaults() {
        let document = PlanDocument::from_yaml(MINIMAL).unwrap();
        assert_eq!(document.plan.basics.current_age, Some(35));
        assert_eq!(document.simulation, SimulationConfig::default());

        let plan = document.plan.validate().unwrap();
        assert_eq!(plan.preferred_mode, ReturnsMode::Stochastic);
        assert_eq!(document.simulation.resolve_mode(&plan), ReturnsMode::Stochastic);
    }

    #[test]
    fn test_simulation_section_overrides() {
        let yaml = format!("{MINIMAL}simulation:\n  mode: historical\n  basis: nominal\n  seedCount: 25\n");
        let document = PlanDocument::from_yaml(&yaml).unwrap();
        assert_eq!(document.simulation.mode, Some(ReturnsMode::Historical));
        assert_eq!(document.simulation.basis, ProjectionBasis::Nominal);
        assert_eq!(document.simulation.seed_count, 25);
    }

    #[test]
    fn test_null_fields_surface_at_validation() {
        let yaml = MINIMAL.replace("annualIncome: 120000", "annualIncome: null");
        let document = PlanDocument::from_yaml(&yaml).unwrap();
        assert_eq!(document.plan.basics.annual_income, None);
        assert!(document.plan.validate().is_err());
    }

    #[test]
    fn test_template_roundtrips_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_PLAN_FILE);

        let yaml = PlanDocument::template().to_yaml().unwrap();
        fs::write(&path, yaml).unwrap();

        let loaded = PlanDocument::load(&path).unwrap();
        assert_eq!(loaded, PlanDocument::template());
        assert!(loaded.plan.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = PlanDocument::load(&path).unwrap_err();
        assert!(format!("{err}").contains("missing.yaml"));
    }
}
