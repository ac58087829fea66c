//! YAML configuration for the tensor-ops environment.

use crate::{
    register_tensor_ops_types, AllTensorsHaveExactlyOneSourceConstraint,
    ApplicationNodeSelectionsAreWellFormedConstraint,
    ApplicationOutputRangeCoverageIsExactConstraint, NoTensorOperationCyclesConstraint,
    OperationApplicationAgreementConstraint, OperationNodesSourcesAndResultsAreTensorsConstraint,
    TensorDTypesAreValidConstraint, TensorOperationAgreementConstraint,
};
use loom_core::{LoomError, LoomResult};
use loom_environment::LoomEnvironment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Built-in constraints selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinConstraint {
    NoCycles,
    DTypes,
    Selections,
    OperationTensors,
    SingleSource,
    TensorOperations,
    OperationApplications,
    OutputCoverage,
}

impl BuiltinConstraint {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "no_cycles" => Some(Self::NoCycles),
            "dtypes" => Some(Self::DTypes),
            "selections" => Some(Self::Selections),
            "operation_tensors" => Some(Self::OperationTensors),
            "single_source" => Some(Self::SingleSource),
            "tensor_operations" => Some(Self::TensorOperations),
            "operation_applications" => Some(Self::OperationApplications),
            "output_coverage" => Some(Self::OutputCoverage),
            _ => None,
        }
    }
}

/// Settings for [`EnvironmentConfig::build_environment`].
///
/// ```yaml
/// dtypes: [int32, float32]
/// type_aliases: { TensorNode: "loom:tensor" }
/// constraints: [no_cycles, dtypes, selections, tensor_operations]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Tensor dtypes accepted by the `dtypes` constraint
    #[serde(default = "default_dtypes")]
    pub dtypes: Vec<String>,

    /// Exact display aliases, type name to alias
    #[serde(default)]
    pub type_aliases: BTreeMap<String, String>,

    /// Schema url to alias prefix
    #[serde(default)]
    pub url_aliases: BTreeMap<String, String>,

    /// Constraint names, in the order they run
    #[serde(default = "default_constraints")]
    pub constraints: Vec<String>,
}

fn default_dtypes() -> Vec<String> {
    vec!["int32".to_string(), "float32".to_string()]
}

fn default_constraints() -> Vec<String> {
    ["no_cycles", "dtypes", "selections", "tensor_operations"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            dtypes: default_dtypes(),
            type_aliases: BTreeMap::new(),
            url_aliases: BTreeMap::new(),
            constraints: default_constraints(),
        }
    }
}

impl EnvironmentConfig {
    pub fn from_yaml_str(content: &str) -> LoomResult<Self> {
        serde_yaml::from_str(content).map_err(|err| LoomError::config(err.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> LoomResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|err| LoomError::config(format!("{}: {err}", path.display())))?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> LoomResult<String> {
        serde_yaml::to_string(self).map_err(|err| LoomError::config(err.to_string()))
    }

    /// Build the tensor-ops environment described by this config.
    ///
    /// Unknown constraint names are skipped with a warning.
    pub fn build_environment(&self) -> LoomResult<LoomEnvironment> {
        let mut builder = LoomEnvironment::builder();
        register_tensor_ops_types(&mut builder)?;

        for (node_type, alias) in &self.type_aliases {
            builder.type_alias(node_type, alias);
        }
        for (url, alias) in &self.url_aliases {
            builder.url_alias(url, alias);
        }

        for name in &self.constraints {
            let Some(constraint) = BuiltinConstraint::from_name(name) else {
                warn!(constraint = %name, "skipping unknown constraint");
                continue;
            };
            debug!(constraint = %name, "adding constraint");
            match constraint {
                BuiltinConstraint::NoCycles => {
                    builder.add_constraint(NoTensorOperationCyclesConstraint);
                }
                BuiltinConstraint::DTypes => {
                    builder.add_constraint(TensorDTypesAreValidConstraint::new(self.dtypes.iter().cloned()));
                }
                BuiltinConstraint::Selections => {
                    builder.add_constraint(ApplicationNodeSelectionsAreWellFormedConstraint::new()?);
                }
                BuiltinConstraint::OperationTensors => {
                    builder.add_constraint(OperationNodesSourcesAndResultsAreTensorsConstraint);
                }
                BuiltinConstraint::SingleSource => {
                    builder.add_constraint(AllTensorsHaveExactlyOneSourceConstraint);
                }
                BuiltinConstraint::TensorOperations => {
                    builder.add_constraint(TensorOperationAgreementConstraint);
                }
                BuiltinConstraint::OperationApplications => {
                    builder.add_constraint(OperationApplicationAgreementConstraint);
                }
                BuiltinConstraint::OutputCoverage => {
                    builder.add_constraint(ApplicationOutputRangeCoverageIsExactConstraint);
                }
            }
        }

        builder.build()
    }
}
