use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::FloatType;

/// How a surface treats an arriving photon.
///
/// `diffuse`, `specular` and `transmit` are probabilities of the respective event,
/// whatever remains up to 1 is the probability of absorption.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub diffuse: FloatType,
    pub specular: FloatType,
    pub transmit: FloatType,
    /// 1.0 for opaque surfaces.
    pub refractive_index: FloatType,
}

/// Outcome of the russian roulette at a surface hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    Diffuse,
    Specular,
    Transmit,
    Absorb,
}

#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum MaterialError {
    #[error("event probabilities must be finite and non-negative")]
    InvalidProbability,
    #[error("event probabilities sum to {0}, more than 1")]
    ProbabilitySum(FloatType),
    #[error("refractive index {0} must be finite and at least 1")]
    RefractiveIndex(FloatType),
}

/// Slack for probabilities written as decimal fractions that don't sum to exactly 1.
const SUM_TOLERANCE: FloatType = 1e-9;

impl Material {
    pub const fn new(
        diffuse: FloatType,
        specular: FloatType,
        transmit: FloatType,
        refractive_index: FloatType,
    ) -> Self {
        Material {
            diffuse,
            specular,
            transmit,
            refractive_index,
        }
    }

    pub const fn diffuse(probability: FloatType) -> Self {
        Self::new(probability, 0.0, 0.0, 1.0)
    }

    pub const fn mirror(probability: FloatType) -> Self {
        Self::new(0.0, probability, 0.0, 1.0)
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn absorption(&self) -> FloatType {
        (1.0 - self.diffuse - self.specular - self.transmit).max(0.0)
    }

    pub fn validate(&self) -> Result<(), MaterialError> {
        let probabilities = [self.diffuse, self.specular, self.transmit];
        if !probabilities.iter().all(|p| p.is_finite() && *p >= 0.0) {
            return Err(MaterialError::InvalidProbability);
        }

        let sum: FloatType = probabilities.iter().sum();
        if sum > 1.0 + SUM_TOLERANCE {
            return Err(MaterialError::ProbabilitySum(sum));
        }

        if !(self.refractive_index.is_finite() && self.refractive_index >= 1.0) {
            return Err(MaterialError::RefractiveIndex(self.refractive_index));
        }

        Ok(())
    }

    /// Picks the interaction for a uniform sample `epsilon` from `[0, 1)`.
    ///
    /// The unit interval is cut into consecutive half open bands
    /// `[0, pD)`, `[pD, pD + pS)`, `[pD + pS, pD + pS + pT)` and the rest, so that each
    /// band is hit with exactly its probability.
    pub fn choose(&self, epsilon: FloatType) -> Interaction {
        let diffuse = self.diffuse;
        let reflect = diffuse + self.specular;
        let survive = reflect + self.transmit;

        if epsilon >= survive {
            Interaction::Absorb
        } else if epsilon >= reflect {
            Interaction::Transmit
        } else if epsilon >= diffuse {
            Interaction::Specular
        } else {
            Interaction::Diffuse
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::diffuse(0.7)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::{assert, let_assert};
    use test_case::test_case;

    const GLASS: Material = Material::new(0.1, 0.2, 0.6, 1.5);

    #[test_case(0.0 => Interaction::Diffuse)]
    #[test_case(0.05 => Interaction::Diffuse)]
    #[test_case(0.1 => Interaction::Specular)]
    #[test_case(0.25 => Interaction::Specular)]
    #[test_case(0.31 => Interaction::Transmit)]
    #[test_case(0.85 => Interaction::Transmit)]
    #[test_case(0.95 => Interaction::Absorb)]
    #[test_case(0.999 => Interaction::Absorb)]
    fn bands(epsilon: f64) -> Interaction {
        GLASS.choose(epsilon)
    }

    #[test]
    fn black_always_absorbs() {
        for epsilon in [0.0, 0.1, 0.5, 0.999_999] {
            assert!(Material::black().choose(epsilon) == Interaction::Absorb);
        }
    }

    #[test]
    fn lossless_never_absorbs() {
        let material = Material::new(0.5, 0.25, 0.25, 1.3);
        for epsilon in [0.0, 0.5, 0.75, 0.999_999_999] {
            assert!(material.choose(epsilon) != Interaction::Absorb);
        }
    }

    #[test]
    fn absorption_is_remainder() {
        assert!((GLASS.absorption() - 0.1).abs() < 1e-12);
        assert!(Material::mirror(1.0).absorption() == 0.0);
    }

    #[test_case(Material::new(-0.1, 0.0, 0.0, 1.0) => MaterialError::InvalidProbability)]
    #[test_case(Material::new(f64::NAN, 0.0, 0.0, 1.0) => MaterialError::InvalidProbability)]
    #[test_case(Material::new(0.5, 0.5, 0.5, 1.5) => MaterialError::ProbabilitySum(1.5))]
    #[test_case(Material::new(0.0, 0.0, 1.0, 0.5) => MaterialError::RefractiveIndex(0.5))]
    fn invalid(material: Material) -> MaterialError {
        let_assert!(Err(e) = material.validate());
        e
    }

    #[test]
    fn valid() {
        assert!(GLASS.validate().is_ok());
        assert!(Material::new(0.7, 0.2, 0.1, 1.0).validate().is_ok());
        assert!(Material::black().validate().is_ok());
    }
}
