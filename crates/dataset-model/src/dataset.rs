//! Datasets: named variables, coordinates, dimensions and global attributes.

use std::collections::{BTreeMap, BTreeSet};

use crate::attrs::{AttrValue, Attrs};
use crate::error::{ModelError, Result};
use crate::variable::Variable;

/// Global attribute key carrying the serving-layer dataset identity.
/// Bookkeeping, not user data; stripped from derived metadata.
pub const DATASET_ID_ATTR_KEY: &str = "_dataset_id";

/// An immutable collection of named variables with shared dimensions,
/// global attributes and a set of coordinate variables.
///
/// Variables keep their declaration order; derived metadata documents emit
/// them in that order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    variables: Vec<(String, Variable)>,
    coord_names: BTreeSet<String>,
    attrs: Attrs,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a global attribute (builder style).
    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Add a data variable, validating dimension consistency against the
    /// variables already present.
    pub fn add_variable(&mut self, name: &str, variable: Variable) -> Result<()> {
        self.check_dims(&variable)?;
        self.variables.push((name.to_string(), variable));
        Ok(())
    }

    /// Add a coordinate variable. Coordinates are ordinary variables that
    /// are additionally tracked by name for coordinate-attribute synthesis.
    pub fn add_coord(&mut self, name: &str, variable: Variable) -> Result<()> {
        self.add_variable(name, variable)?;
        self.coord_names.insert(name.to_string());
        Ok(())
    }

    fn check_dims(&self, variable: &Variable) -> Result<()> {
        let dims = self.dims();
        for (dim, &size) in variable.dims().iter().zip(variable.shape()) {
            if let Some(&existing) = dims.get(dim.as_str()) {
                if existing != size {
                    return Err(ModelError::DimensionMismatch {
                        dim: dim.clone(),
                        existing,
                        conflicting: size,
                    });
                }
            }
        }
        Ok(())
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(name, var)| (name.as_str(), var))
    }

    /// Look up one variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, var)| var)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of coordinate variables.
    pub fn coord_names(&self) -> &BTreeSet<String> {
        &self.coord_names
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Dimension names and sizes, aggregated over all variables.
    pub fn dims(&self) -> BTreeMap<&str, usize> {
        let mut dims = BTreeMap::new();
        for (_, var) in &self.variables {
            for (dim, &size) in var.dims().iter().zip(var.shape()) {
                dims.entry(dim.as_str()).or_insert(size);
            }
        }
        dims
    }

    /// The serving-layer identity of this dataset, if stamped.
    pub fn dataset_id(&self) -> Option<&str> {
        self.attrs.get(DATASET_ID_ATTR_KEY).and_then(AttrValue::as_str)
    }

    /// Stamp the serving-layer identity attribute.
    pub fn set_dataset_id(&mut self, id: &str) {
        self.attrs
            .insert(DATASET_ID_ATTR_KEY.to_string(), AttrValue::Str(id.to_string()));
    }
}
