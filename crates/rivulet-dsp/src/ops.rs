//! Elementwise arithmetic and integration.

/// Running integral `acc += x / fs`, starting from `initial`.
///
/// Returns the integrated buffer and the final accumulator, which the
/// caller feeds back as `initial` for the next buffer.
pub fn integrate(input: &[f32], sample_rate: f32, initial: f64) -> (Vec<f32>, f64) {
    let dt = if sample_rate > 0.0 {
        1.0 / f64::from(sample_rate)
    } else {
        0.0
    };
    let mut acc = initial;
    let out = input
        .iter()
        .map(|&x| {
            acc += f64::from(x) * dt;
            acc as f32
        })
        .collect();
    (out, acc)
}

/// Elementwise sum of all inputs. The result has the length of the longest
/// input; shorter inputs contribute zeros past their end.
pub fn sum(inputs: &[&[f32]]) -> Vec<f32> {
    let len = inputs.iter().map(|x| x.len()).max().unwrap_or(0);
    let mut out = vec![0.0; len];
    for input in inputs {
        for (o, &x) in out.iter_mut().zip(input.iter()) {
            *o += x;
        }
    }
    out
}

/// Elementwise product of all inputs. Samples past the end of a shorter
/// input are multiplied by zero.
pub fn multiply(inputs: &[&[f32]]) -> Vec<f32> {
    let len = inputs.iter().map(|x| x.len()).max().unwrap_or(0);
    if inputs.is_empty() {
        return Vec::new();
    }
    (0..len)
        .map(|i| {
            inputs
                .iter()
                .map(|x| x.get(i).copied().unwrap_or(0.0))
                .product::<f32>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_constant_is_a_ramp() {
        let (out, acc) = integrate(&[1.0; 4], 4.0, 0.0);
        assert_eq!(out, vec![0.25, 0.5, 0.75, 1.0]);
        assert!((acc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn integrate_carries_accumulator() {
        let (_, acc) = integrate(&[1.0; 4], 4.0, 0.0);
        let (out, _) = integrate(&[1.0], 4.0, acc);
        assert_eq!(out, vec![1.25]);
    }

    #[test]
    fn sum_pads_short_inputs() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0];
        assert_eq!(sum(&[&a[..], &b[..]]), vec![11.0, 2.0, 3.0]);
        assert!(sum(&[]).is_empty());
    }

    #[test]
    fn multiply_elementwise() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 2.0, 2.0];
        assert_eq!(multiply(&[&a[..], &b[..]]), vec![2.0, 4.0, 6.0]);
        assert_eq!(multiply(&[&a[..], &b[..1]]), vec![2.0, 0.0, 0.0]);
        assert!(multiply(&[]).is_empty());
    }
}
