use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Dimensions of one step's attention tensor, serialized as `[L, H, C]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct AttentionShape {
    pub layers: usize,
    pub heads: usize,
    pub context_length: usize,
}

impl AttentionShape {
    pub fn new(layers: usize, heads: usize, context_length: usize) -> Self {
        Self {
            layers,
            heads,
            context_length,
        }
    }

    /// Number of `f32` values a payload of this shape holds.
    pub fn value_count(&self) -> Result<usize, CoreError> {
        self.layers
            .checked_mul(self.heads)
            .and_then(|n| n.checked_mul(self.context_length))
            .ok_or(CoreError::ShapeOverflow {
                layers: self.layers,
                heads: self.heads,
                context_length: self.context_length,
            })
    }
}

impl From<[usize; 3]> for AttentionShape {
    fn from([layers, heads, context_length]: [usize; 3]) -> Self {
        Self::new(layers, heads, context_length)
    }
}

impl From<AttentionShape> for [usize; 3] {
    fn from(shape: AttentionShape) -> Self {
        [shape.layers, shape.heads, shape.context_length]
    }
}

/// A validated attention payload: `data.len()` always equals the shape's
/// value count.
#[derive(Debug, Clone, PartialEq)]
pub struct Attention {
    shape: AttentionShape,
    data: Vec<f32>,
}

impl Attention {
    pub fn new(shape: AttentionShape, data: Vec<f32>) -> Result<Self, CoreError> {
        let expected = shape.value_count()?;
        if data.len() != expected {
            return Err(CoreError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> AttentionShape {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn context_length(&self) -> usize {
        self.shape.context_length
    }
}

/// One generation step, normalized from either capture format.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStep {
    /// Index parsed from the record's file name; defines processing order.
    pub index: u32,
    /// Step number recorded inside the record, if any.
    pub step: Option<u32>,
    pub token_id: Option<i64>,
    pub text: String,
    /// `None` for health-check or other non-generation records.
    pub attention: Option<Attention>,
}

impl GenerationStep {
    pub fn is_inert(&self) -> bool {
        self.attention.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_serializes_as_triple() {
        let shape = AttentionShape::new(2, 4, 10);
        assert_eq!(serde_json::to_string(&shape).unwrap(), "[2,4,10]");
        let parsed: AttentionShape = serde_json::from_str("[2,4,10]").unwrap();
        assert_eq!(parsed, shape);
    }

    #[test]
    fn test_shape_overflow_is_an_error() {
        let shape = AttentionShape::new(usize::MAX, 2, 2);
        assert!(matches!(
            shape.value_count(),
            Err(CoreError::ShapeOverflow { .. })
        ));
    }

    #[test]
    fn test_attention_rejects_length_mismatch() {
        let shape = AttentionShape::new(1, 2, 3);
        let err = Attention::new(shape, vec![0.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::LengthMismatch {
                expected: 6,
                actual: 5
            }
        ));
        assert!(Attention::new(shape, vec![0.0; 6]).is_ok());
    }
}
