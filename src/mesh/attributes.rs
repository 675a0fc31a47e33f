use crate::error::{MeshError, Result};

/// Storage of an attribute array.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValues {
    Float(Vec<f64>),
    Int(Vec<i64>),
}

impl AttributeValues {
    fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
        }
    }

    fn empty_like(&self) -> Self {
        match self {
            Self::Float(_) => Self::Float(Vec::new()),
            Self::Int(_) => Self::Int(Vec::new()),
        }
    }
}

/// A named array of fixed-width tuples attached to points or cells.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeArray {
    name: String,
    components: usize,
    values: AttributeValues,
}

impl AttributeArray {
    /// Creates a floating-point array.
    ///
    /// # Errors
    ///
    /// Returns an error if `components` is zero or does not divide the
    /// number of values.
    pub fn float(name: impl Into<String>, components: usize, values: Vec<f64>) -> Result<Self> {
        Self::new(name.into(), components, AttributeValues::Float(values))
    }

    /// Creates an integer array.
    ///
    /// # Errors
    ///
    /// Returns an error if `components` is zero or does not divide the
    /// number of values.
    pub fn int(name: impl Into<String>, components: usize, values: Vec<i64>) -> Result<Self> {
        Self::new(name.into(), components, AttributeValues::Int(values))
    }

    fn new(name: String, components: usize, values: AttributeValues) -> Result<Self> {
        let len = values.len();
        if components == 0 || len % components != 0 {
            return Err(MeshError::AttributeShape {
                name,
                len,
                components,
            }
            .into());
        }
        Ok(Self {
            name,
            components,
            values,
        })
    }

    /// Returns the array name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of components per tuple.
    #[must_use]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Returns the number of tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.components
    }

    /// Returns `true` if the array holds no tuples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Returns the raw values.
    #[must_use]
    pub fn values(&self) -> &AttributeValues {
        &self.values
    }

    /// Returns tuple `id` converted to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tuple(&self, id: usize) -> Option<Vec<f64>> {
        let range = id * self.components..(id + 1) * self.components;
        match &self.values {
            AttributeValues::Float(v) => v.get(range).map(<[f64]>::to_vec),
            AttributeValues::Int(v) => v.get(range).map(|t| t.iter().map(|&x| x as f64).collect()),
        }
    }

    fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            components: self.components,
            values: self.values.empty_like(),
        }
    }

    /// Appends tuple `id` of `source`, or zeros when the tuple is missing.
    fn push_copy(&mut self, source: &Self, id: usize) {
        let range = id * self.components..(id + 1) * self.components;
        match (&mut self.values, &source.values) {
            (AttributeValues::Float(dst), AttributeValues::Float(src)) => match src.get(range) {
                Some(t) => dst.extend_from_slice(t),
                None => dst.extend(std::iter::repeat_n(0.0, self.components)),
            },
            (AttributeValues::Int(dst), AttributeValues::Int(src)) => match src.get(range) {
                Some(t) => dst.extend_from_slice(t),
                None => dst.extend(std::iter::repeat_n(0, self.components)),
            },
            (dst, _) => push_zeros(dst, self.components),
        }
    }

    /// Appends the weighted sum of tuples `ids` of `source`.
    ///
    /// Integer arrays are rounded to the nearest value.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn push_interpolated(&mut self, source: &Self, ids: &[usize], weights: &[f64]) {
        let mut acc = vec![0.0; self.components];
        for (&id, &w) in ids.iter().zip(weights) {
            if let Some(t) = source.tuple(id) {
                for (a, x) in acc.iter_mut().zip(t) {
                    *a += w * x;
                }
            }
        }
        match &mut self.values {
            AttributeValues::Float(dst) => dst.extend(acc),
            AttributeValues::Int(dst) => dst.extend(acc.iter().map(|x| x.round() as i64)),
        }
    }
}

fn push_zeros(values: &mut AttributeValues, n: usize) {
    match values {
        AttributeValues::Float(v) => v.extend(std::iter::repeat_n(0.0, n)),
        AttributeValues::Int(v) => v.extend(std::iter::repeat_n(0, n)),
    }
}

/// A set of attribute arrays sharing the same tuple indexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeData {
    arrays: Vec<AttributeArray>,
}

impl AttributeData {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an array, replacing any array with the same name.
    pub fn add_array(&mut self, array: AttributeArray) {
        if let Some(existing) = self.arrays.iter_mut().find(|a| a.name == array.name) {
            *existing = array;
        } else {
            self.arrays.push(array);
        }
    }

    /// Returns the array with the given name.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<&AttributeArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Returns all arrays in insertion order.
    #[must_use]
    pub fn arrays(&self) -> &[AttributeArray] {
        &self.arrays
    }

    /// Returns `true` if the set holds no arrays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Returns a set with the same arrays (names, widths, types) and no tuples.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            arrays: self.arrays.iter().map(AttributeArray::empty_like).collect(),
        }
    }

    /// Appends tuple `id` of every array in `source` to the matching array.
    ///
    /// `self` must have been created with [`empty_like`](Self::empty_like)
    /// from `source`.
    pub fn copy_tuple(&mut self, source: &Self, id: usize) {
        for (dst, src) in self.arrays.iter_mut().zip(&source.arrays) {
            dst.push_copy(src, id);
        }
    }

    /// Appends the weighted combination of tuples `ids` of every array in
    /// `source` to the matching array.
    pub fn interpolate_tuple(&mut self, source: &Self, ids: &[usize], weights: &[f64]) {
        for (dst, src) in self.arrays.iter_mut().zip(&source.arrays) {
            dst.push_interpolated(src, ids, weights);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn data() -> AttributeData {
        let mut data = AttributeData::new();
        data.add_array(AttributeArray::float("temperature", 1, vec![0.0, 10.0, 20.0]).unwrap());
        data.add_array(AttributeArray::int("label", 1, vec![1, 2, 3]).unwrap());
        data
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert!(AttributeArray::float("velocity", 3, vec![0.0; 4]).is_err());
        assert!(AttributeArray::int("ids", 0, vec![]).is_err());
    }

    #[test]
    fn copy_tuple_appends() {
        let source = data();
        let mut out = source.empty_like();
        out.copy_tuple(&source, 2);
        out.copy_tuple(&source, 0);
        assert_eq!(out.array("temperature").unwrap().values(), &AttributeValues::Float(vec![20.0, 0.0]));
        assert_eq!(out.array("label").unwrap().values(), &AttributeValues::Int(vec![3, 1]));
    }

    #[test]
    fn interpolation_weights_tuples() {
        let source = data();
        let mut out = source.empty_like();
        out.interpolate_tuple(&source, &[0, 1, 2], &[0.25, 0.25, 0.5]);
        let t = out.array("temperature").unwrap().tuple(0).unwrap();
        assert_relative_eq!(t[0], 12.5);
        assert_eq!(out.array("label").unwrap().values(), &AttributeValues::Int(vec![2]));
    }

    #[test]
    fn add_array_replaces_by_name() {
        let mut d = data();
        d.add_array(AttributeArray::int("label", 1, vec![7]).unwrap());
        assert_eq!(d.arrays().len(), 2);
        assert_eq!(d.array("label").unwrap().len(), 1);
    }
}
