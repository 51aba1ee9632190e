use crate::model::{Attention, AttentionShape};

/// Mean attention per context slot over all layers and heads of one step.
///
/// The tensor is read row-major as `(layers, heads, context_length)`. Each
/// head's row is softmax-normalized, so the result sums to roughly 1.
pub fn aggregate_attention(attention: &Attention) -> Vec<f64> {
    mean_over_rows(attention.data(), attention.shape())
}

fn mean_over_rows(data: &[f32], shape: AttentionShape) -> Vec<f64> {
    let rows = shape.layers * shape.heads;
    let context = shape.context_length;
    if rows == 0 || context == 0 {
        return Vec::new();
    }

    let mut sums = vec![0.0f64; context];
    for row in data.chunks_exact(context) {
        for (acc, &value) in sums.iter_mut().zip(row) {
            *acc += f64::from(value);
        }
    }

    let divisor = rows as f64;
    sums.iter_mut().for_each(|s| *s /= divisor);
    sums
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn test_mean_over_layers_and_heads() {
        // 2 layers x 2 heads x 3 slots
        let data = vec![
            0.7, 0.2, 0.1, // l0 h0
            0.5, 0.3, 0.2, // l0 h1
            0.6, 0.1, 0.3, // l1 h0
            0.6, 0.2, 0.2, // l1 h1
        ];
        let attn = Attention::new(AttentionShape::new(2, 2, 3), data).unwrap();
        let agg = aggregate_attention(&attn);
        assert!(approx(&agg, &[0.6, 0.2, 0.2]), "{agg:?}");
        assert!((agg.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_row_is_identity() {
        let attn = Attention::new(AttentionShape::new(1, 1, 3), vec![0.6, 0.25, 0.15]).unwrap();
        assert!(approx(&aggregate_attention(&attn), &[0.6, 0.25, 0.15]));
    }

    #[test]
    fn test_empty_axes_give_empty_vector() {
        let attn = Attention::new(AttentionShape::new(0, 4, 3), Vec::new()).unwrap();
        assert!(aggregate_attention(&attn).is_empty());
    }
}
