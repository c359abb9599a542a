//! SZ-003: Field container — named 2-D gridded values with metadata.
//!
//! A [`Field`] is a `(node, level)` array of `f64` tied to a
//! [`FunctionSpace`] (the grid-topology descriptor) and a string→string
//! metadata bag carrying at least a `"units"` tag. A [`FieldSet`] is an
//! ordered association from variable name to field; it is the sole
//! in/out container of the public API.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use ndarray::Array2;

use crate::core::error::SazonError;

/// Grid-topology descriptor: how the horizontal nodes are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpace {
    name: String,
    nodes: usize,
}

impl FunctionSpace {
    pub fn new(name: impl Into<String>, nodes: usize) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of horizontal grid nodes.
    pub fn nodes(&self) -> usize {
        self.nodes
    }
}

/// A named multi-dimensional numeric field, values indexed `(node, level)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    function_space: FunctionSpace,
    values: Array2<f64>,
    metadata: BTreeMap<String, String>,
}

impl Field {
    /// Allocate a zero-filled field on `function_space` with `levels` levels.
    pub fn new(name: impl Into<String>, function_space: FunctionSpace, levels: usize) -> Self {
        let nodes = function_space.nodes();
        Self {
            name: name.into(),
            function_space,
            values: Array2::zeros((nodes, levels)),
            metadata: BTreeMap::new(),
        }
    }

    /// Build a field from an existing value array. The array's node
    /// dimension must match the function space.
    pub fn from_values(
        name: impl Into<String>,
        function_space: FunctionSpace,
        values: Array2<f64>,
    ) -> Result<Self, SazonError> {
        let name = name.into();
        if values.nrows() != function_space.nodes() {
            return Err(SazonError::ShapeMismatch {
                field: name,
                expected: [function_space.nodes(), values.ncols()],
                found: [values.nrows(), values.ncols()],
            });
        }
        Ok(Self {
            name,
            function_space,
            values,
            metadata: BTreeMap::new(),
        })
    }

    /// Builder-style `"units"` metadata tag.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.metadata.insert("units".to_string(), units.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function_space(&self) -> &FunctionSpace {
        &self.function_space
    }

    /// Number of vertical levels.
    pub fn levels(&self) -> usize {
        self.values.ncols()
    }

    /// Number of horizontal nodes.
    pub fn nodes(&self) -> usize {
        self.values.nrows()
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.values.nrows(), self.values.ncols()]
    }

    /// Total element count.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.metadata
    }

    /// The `"units"` metadata tag, when present.
    pub fn units(&self) -> Option<&str> {
        self.metadata.get("units").map(String::as_str)
    }

    /// A copy with an independent value buffer, populated element-wise.
    /// Never aliases the source storage.
    pub fn deep_copy(&self) -> Field {
        let mut values = Array2::zeros(self.values.raw_dim());
        values.assign(&self.values);
        Field {
            name: self.name.clone(),
            function_space: self.function_space.clone(),
            values,
            metadata: self.metadata.clone(),
        }
    }

    /// BLAKE3 content hash over name, shape, units, and raw values.
    /// Returns `"blake3:{hex}"`.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.name.as_bytes());
        hasher.update(b"\0");
        hasher.update(&(self.nodes() as u64).to_le_bytes());
        hasher.update(&(self.levels() as u64).to_le_bytes());
        hasher.update(self.units().unwrap_or("").as_bytes());
        hasher.update(b"\0");
        for v in self.values.iter() {
            hasher.update(&v.to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}

/// Ordered association from variable name to [`Field`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: IndexMap<String, Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable names in insertion order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Result<&Field, SazonError> {
        self.fields.get(name).ok_or_else(|| SazonError::UnknownField {
            name: name.to_string(),
        })
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field, SazonError> {
        self.fields.get_mut(name).ok_or_else(|| SazonError::UnknownField {
            name: name.to_string(),
        })
    }

    /// Append a field. The name must not already be present.
    pub fn add(&mut self, field: Field) -> Result<(), SazonError> {
        if self.fields.contains_key(field.name()) {
            return Err(SazonError::DuplicateField {
                name: field.name().to_string(),
            });
        }
        self.fields.insert(field.name().to_string(), field);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Deep copy of every field, preserving order.
    pub fn deep_copy(&self) -> FieldSet {
        let mut copy = FieldSet::new();
        for field in self.iter() {
            copy.fields
                .insert(field.name().to_string(), field.deep_copy());
        }
        copy
    }

    /// Combined BLAKE3 hash of the member fingerprints, in order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for field in self.iter() {
            hasher.update(field.fingerprint().as_bytes());
            hasher.update(b"\n");
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}
