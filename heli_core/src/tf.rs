//! Minimal continuous transfer functions for diagnostics.
//!
//! Consumers of these only ever ask for poles and zeros (pole-zero charts,
//! design read-outs); no general-purpose manipulation beyond series
//! composition is provided. Coefficients are stored in descending powers
//! of s, matching the persisted snapshot format.

use crate::error::{Result, SynthesisError};
use nalgebra::{Complex, DMatrix};

/// Complex roots as consumers see them, without pulling nalgebra into
/// their own dependency graphs.
pub type Complex64 = Complex<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    num: Vec<f64>,
    den: Vec<f64>,
}

impl TransferFunction {
    /// Build from raw coefficient lists, trimming leading zeros.
    pub fn new(num: Vec<f64>, den: Vec<f64>) -> Result<Self> {
        let num = trim_leading_zeros(num);
        let den = trim_leading_zeros(den);
        if den.is_empty() || den[0] == 0.0 {
            return Err(eyre::Report::new(SynthesisError::DegenerateDenominator));
        }
        let num = if num.is_empty() { vec![0.0] } else { num };
        Ok(Self { num, den })
    }

    /// Rebuild a controller from externally persisted coefficient arrays
    /// (the JSON snapshot saved by the front-end).
    pub fn from_parts(num: &[f64], den: &[f64]) -> Result<Self> {
        Self::new(num.to_vec(), den.to_vec())
    }

    /// A pure gain.
    pub fn constant(k: f64) -> Self {
        Self {
            num: vec![k],
            den: vec![1.0],
        }
    }

    pub fn num(&self) -> &[f64] {
        &self.num
    }

    pub fn den(&self) -> &[f64] {
        &self.den
    }

    /// Series composition: (self * other), numerators and denominators
    /// multiplied term-wise.
    pub fn series(&self, other: &Self) -> Self {
        Self {
            num: poly_mul(&self.num, &other.num),
            den: poly_mul(&self.den, &other.den),
        }
    }

    pub fn poles(&self) -> Vec<Complex<f64>> {
        roots(&self.den)
    }

    pub fn zeros(&self) -> Vec<Complex<f64>> {
        roots(&self.num)
    }
}

fn trim_leading_zeros(mut coeffs: Vec<f64>) -> Vec<f64> {
    let lead = coeffs.iter().take_while(|c| **c == 0.0).count();
    coeffs.drain(..lead);
    coeffs
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Roots of a real polynomial in descending powers, via the eigenvalues of
/// its companion matrix. Roots at the origin are factored out first so the
/// companion matrix stays well conditioned.
fn roots(coeffs: &[f64]) -> Vec<Complex<f64>> {
    let coeffs = {
        let lead = coeffs.iter().take_while(|c| **c == 0.0).count();
        &coeffs[lead..]
    };
    if coeffs.len() < 2 {
        return Vec::new();
    }

    // Factor out trailing zeros: each contributes a root at s = 0.
    let trailing = coeffs.iter().rev().take_while(|c| **c == 0.0).count();
    let core = &coeffs[..coeffs.len() - trailing];
    let mut out: Vec<Complex<f64>> = std::iter::repeat(Complex::new(0.0, 0.0))
        .take(trailing)
        .collect();

    let n = core.len() - 1;
    if n == 0 {
        return out;
    }
    if n == 1 {
        out.push(Complex::new(-core[1] / core[0], 0.0));
        return out;
    }

    // Companion matrix of the monic polynomial, eigenvalues = roots.
    let lead = core[0];
    let mut m = DMatrix::<f64>::zeros(n, n);
    for i in 1..n {
        m[(i, i - 1)] = 1.0;
    }
    for i in 0..n {
        // core[n - i] is the coefficient of s^i
        m[(i, n - 1)] = -core[n - i] / lead;
    }
    out.extend(m.complex_eigenvalues().iter().copied());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_re(mut v: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
        v.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
        v
    }

    #[test]
    fn quadratic_poles_match_closed_form() {
        // s^2 + 3s + 2 = (s + 1)(s + 2)
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 3.0, 2.0]).unwrap();
        let poles = sorted_re(tf.poles());
        assert!((poles[0].re + 2.0).abs() < 1e-9 && poles[0].im.abs() < 1e-9);
        assert!((poles[1].re + 1.0).abs() < 1e-9 && poles[1].im.abs() < 1e-9);
    }

    #[test]
    fn undamped_pair_is_purely_imaginary() {
        // s^2 + 4 => poles at +-2j
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 0.0, 4.0]).unwrap();
        let poles = tf.poles();
        assert_eq!(poles.len(), 2);
        for p in poles {
            assert!(p.re.abs() < 1e-9);
            assert!((p.im.abs() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn integrator_pole_sits_at_origin() {
        // 1 / s(s + 10): one pole at 0, one at -10
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 10.0, 0.0]).unwrap();
        let poles = sorted_re(tf.poles());
        assert!((poles[0].re + 10.0).abs() < 1e-9);
        assert!(poles[1].norm() < 1e-12);
    }

    #[test]
    fn series_multiplies_polynomials() {
        let a = TransferFunction::new(vec![2.0], vec![1.0, 1.0]).unwrap();
        let b = TransferFunction::new(vec![3.0], vec![1.0, 2.0]).unwrap();
        let c = a.series(&b);
        assert_eq!(c.num(), &[6.0]);
        assert_eq!(c.den(), &[1.0, 3.0, 2.0]);
    }

    #[test]
    fn zero_leading_denominator_is_rejected() {
        let err = TransferFunction::new(vec![1.0], vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SynthesisError>(),
            Some(SynthesisError::DegenerateDenominator)
        ));
    }

    #[test]
    fn constant_has_no_poles_or_zeros() {
        let tf = TransferFunction::constant(5.0);
        assert!(tf.poles().is_empty());
        assert!(tf.zeros().is_empty());
    }
}
