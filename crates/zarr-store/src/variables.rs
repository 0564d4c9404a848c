//! Storage-encoded variables.
//!
//! A variable's stored representation can differ from its logical one:
//! datetimes are coded as nanosecond integers with CF-style `units` and
//! `calendar` attributes, dtype overrides from the encoding are applied,
//! and a declared fill value is surfaced as a `_FillValue` attribute.
//! The encoded table is derived once per dataset and pinned in the cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use dataset_model::{ArrayData, AttrValue, Attrs, DType, Dataset, Encoding, Variable};
use tracing::debug;

use crate::cache::{cache_key, CacheValue, SharedCache, PERMANENT_COST};
use crate::error::Result;
use crate::types::FILL_VALUE_KEY;

/// Cache key suffix of the encoded-variable table.
pub const ZVARIABLES_KEY: &str = "zvariables";

/// CF units string for the nanosecond datetime coding.
const DATETIME_UNITS: &str = "nanoseconds since 1970-01-01T00:00:00";
const DATETIME_CALENDAR: &str = "proleptic_gregorian";

/// A variable in its stored representation.
#[derive(Debug, Clone, PartialEq)]
pub struct ZVariable {
    pub dims: Vec<String>,
    pub data: ArrayData,
    pub attrs: Attrs,
    pub encoding: Encoding,
}

/// Encoded variables by name. Ordered for deterministic rebuilds; the
/// consolidated document iterates the dataset's declaration order instead.
pub type ZVariables = BTreeMap<String, ZVariable>;

/// Encode one variable into its stored representation. Pure: the source
/// variable is never modified.
pub fn encode_variable(variable: &Variable) -> Result<ZVariable> {
    let mut attrs = variable.attrs().clone();
    let mut data = variable.data().clone();

    if *data.dtype() == DType::DateTime64 {
        data = data.with_dtype(DType::Int64)?;
        attrs.insert("units".to_string(), AttrValue::Str(DATETIME_UNITS.to_string()));
        attrs.insert(
            "calendar".to_string(),
            AttrValue::Str(DATETIME_CALENDAR.to_string()),
        );
    }

    if let Some(dtype) = &variable.encoding().dtype {
        if dtype != data.dtype() {
            data = data.with_dtype(dtype.clone())?;
        }
    }

    if let Some(fill) = &variable.encoding().fill_value {
        attrs.insert(FILL_VALUE_KEY.to_string(), fill.clone());
    }

    Ok(ZVariable {
        dims: variable.dims().to_vec(),
        data,
        attrs,
        encoding: variable.encoding().clone(),
    })
}

/// Build the encoded-variable table for a dataset.
pub fn create_zvariables(dataset: &Dataset) -> Result<ZVariables> {
    let mut zvariables = ZVariables::new();
    for (name, variable) in dataset.variables() {
        zvariables.insert(name.to_string(), encode_variable(variable)?);
    }
    Ok(zvariables)
}

/// Return the encoded-variable table, building and pinning it in the cache
/// on first use.
///
/// The lock is held only around cache access; a concurrent first request
/// may build the table redundantly, which is wasted work but not incorrect.
pub fn get_zvariables(dataset: &Dataset, cache: &SharedCache) -> Result<Arc<ZVariables>> {
    let key = cache_key(dataset, ZVARIABLES_KEY);

    {
        let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(CacheValue::Variables(zvariables)) = cache.get(&key) {
            return Ok(zvariables);
        }
    }

    debug!(%key, "building encoded variable table");
    let zvariables = Arc::new(create_zvariables(dataset)?);

    let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
    cache.put(
        key,
        CacheValue::Variables(Arc::clone(&zvariables)),
        PERMANENT_COST,
        1,
    );
    Ok(zvariables)
}
