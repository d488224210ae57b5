//! Randomized image augmentation (RandAugment).
//!
//! [`RandomAugment`] picks `n` ops uniformly (with replacement) from its op
//! list for every image and applies each picked op with probability 0.5 at a
//! fixed magnitude.
//!
//! ```rust
//! use blipprep_core::augment::{AugmentOp, RandomAugment};
//!
//! let augment = RandomAugment::new(2, 5, vec![AugmentOp::Identity, AugmentOp::Rotate]).unwrap();
//! assert_eq!(augment.ops().len(), 2);
//! ```

mod ops;

pub use ops::{
    auto_contrast, brightness, color, contrast, equalize, posterize, rotate, sharpness, shear_x,
    shear_y, solarize, translate_x, translate_y, AugmentOp, FILL_COLOR, MAX_LEVEL,
};

use crate::error::{ProcessorError, ProcessorResult};
use image::RgbImage;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probability that a sampled op is actually applied.
const APPLY_PROBABILITY: f64 = 0.5;

/// Op list used by the BLIP training image pipeline.
pub const BLIP_TRAIN_OPS: [AugmentOp; 10] = [
    AugmentOp::Identity,
    AugmentOp::AutoContrast,
    AugmentOp::Brightness,
    AugmentOp::Sharpness,
    AugmentOp::Equalize,
    AugmentOp::ShearX,
    AugmentOp::ShearY,
    AugmentOp::TranslateX,
    AugmentOp::TranslateY,
    AugmentOp::Rotate,
];

/// RandAugment configuration.
///
/// Deserialized values go through [`RandomAugment::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RandomAugmentConfig")]
pub struct RandomAugment {
    /// Number of ops sampled per image
    n: usize,

    /// Magnitude level, `0..=10`
    magnitude: u32,

    /// Candidate ops (defaults to every op in the catalogue)
    ops: Vec<AugmentOp>,
}

/// Unchecked serde form of [`RandomAugment`].
#[derive(Deserialize)]
struct RandomAugmentConfig {
    #[serde(default = "default_num_ops")]
    n: usize,

    #[serde(default = "default_magnitude")]
    magnitude: u32,

    #[serde(default = "default_ops")]
    ops: Vec<AugmentOp>,
}

impl TryFrom<RandomAugmentConfig> for RandomAugment {
    type Error = ProcessorError;

    fn try_from(config: RandomAugmentConfig) -> ProcessorResult<Self> {
        Self::new(config.n, config.magnitude, config.ops)
    }
}

fn default_num_ops() -> usize {
    2
}

fn default_magnitude() -> u32 {
    10
}

fn default_ops() -> Vec<AugmentOp> {
    AugmentOp::ALL.to_vec()
}

impl Default for RandomAugment {
    fn default() -> Self {
        Self {
            n: default_num_ops(),
            magnitude: default_magnitude(),
            ops: default_ops(),
        }
    }
}

impl RandomAugment {
    /// Create a RandAugment with `n` ops per image at `magnitude`.
    pub fn new(n: usize, magnitude: u32, ops: Vec<AugmentOp>) -> ProcessorResult<Self> {
        let augment = Self { n, magnitude, ops };
        augment.validate()?;
        Ok(augment)
    }

    /// Create from op names, e.g. `["Identity", "ShearX"]`.
    pub fn from_names<S: AsRef<str>>(n: usize, magnitude: u32, names: &[S]) -> ProcessorResult<Self> {
        let ops = names
            .iter()
            .map(|name| name.as_ref().parse::<AugmentOp>())
            .collect::<ProcessorResult<Vec<_>>>()?;
        Self::new(n, magnitude, ops)
    }

    /// The augmentation used by the BLIP training pipeline: 2 ops at magnitude 5.
    pub fn blip_train() -> Self {
        Self {
            n: 2,
            magnitude: 5,
            ops: BLIP_TRAIN_OPS.to_vec(),
        }
    }

    pub fn validate(&self) -> ProcessorResult<()> {
        if self.magnitude as f32 > MAX_LEVEL {
            return Err(ProcessorError::InvalidConfig(format!(
                "RandAugment magnitude must be at most {} (got {})",
                MAX_LEVEL, self.magnitude
            )));
        }
        if self.n > 0 && self.ops.is_empty() {
            return Err(ProcessorError::InvalidConfig(
                "RandAugment needs at least one op".to_string(),
            ));
        }
        Ok(())
    }

    pub fn num_ops(&self) -> usize {
        self.n
    }

    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    pub fn ops(&self) -> &[AugmentOp] {
        &self.ops
    }

    /// Sample the ops for one image.
    ///
    /// Always returns exactly `n` ops; a validated augment with `n > 0` has a
    /// non-empty op list.
    pub fn sample_ops<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<AugmentOp> {
        debug_assert!(self.n == 0 || !self.ops.is_empty());
        (0..self.n)
            .map(|_| self.ops[rng.random_range(0..self.ops.len())])
            .collect()
    }

    /// Augment one image.
    pub fn apply<R: Rng + ?Sized>(&self, image: RgbImage, rng: &mut R) -> RgbImage {
        let level = self.magnitude as f32;
        let mut image = image;

        for op in self.sample_ops(rng) {
            if rng.random::<f64>() < APPLY_PROBABILITY {
                continue;
            }
            let arg = op.level_to_arg(level, rng);
            debug!("RandAugment applying {} (arg {:.3})", op, arg);
            image = op.apply(&image, arg);
        }

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 5) as u8, 90]))
    }

    #[test]
    fn test_blip_train_configuration() {
        let augment = RandomAugment::blip_train();

        assert_eq!(augment.num_ops(), 2);
        assert_eq!(augment.magnitude(), 5);
        assert_eq!(augment.ops().len(), 10);
        assert!(augment.validate().is_ok());
    }

    #[test]
    fn test_from_names_rejects_unknown_op() {
        let result = RandomAugment::from_names(2, 5, &["Identity", "Cutout"]);

        assert!(matches!(result, Err(ProcessorError::InvalidConfig(_))));
    }

    #[test]
    fn test_magnitude_out_of_range() {
        assert!(RandomAugment::new(2, 11, vec![AugmentOp::Identity]).is_err());
    }

    #[test]
    fn test_empty_op_list_rejected() {
        assert!(RandomAugment::new(1, 5, vec![]).is_err());
        assert!(RandomAugment::new(0, 5, vec![]).is_ok());
    }

    #[test]
    fn test_sample_ops_count_and_membership() {
        let augment = RandomAugment::blip_train();
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..50 {
            let ops = augment.sample_ops(&mut rng);
            assert_eq!(ops.len(), 2);
            assert!(ops.iter().all(|op| BLIP_TRAIN_OPS.contains(op)));
        }
    }

    #[test]
    fn test_identity_only_never_changes_image() {
        let augment = RandomAugment::new(3, 10, vec![AugmentOp::Identity]).unwrap();
        let image = gradient(12, 12);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(augment.apply(image.clone(), &mut rng), image);
    }

    #[test]
    fn test_apply_preserves_dimensions() {
        let augment = RandomAugment::default();
        let image = gradient(31, 17);
        let mut rng = StdRng::seed_from_u64(123);

        for _ in 0..20 {
            let out = augment.apply(image.clone(), &mut rng);
            assert_eq!(out.dimensions(), (31, 17));
        }
    }

    #[test]
    fn test_apply_is_reproducible_with_same_seed() {
        let augment = RandomAugment::blip_train();
        let image = gradient(24, 24);

        let a = augment.apply(image.clone(), &mut StdRng::seed_from_u64(77));
        let b = augment.apply(image, &mut StdRng::seed_from_u64(77));

        assert_eq!(a, b);
    }

    #[test]
    fn test_deserialize_rejects_invalid_values() {
        let too_strong = serde_json::from_str::<RandomAugment>(r#"{ "magnitude": 99 }"#);
        let no_ops = serde_json::from_str::<RandomAugment>(r#"{ "n": 3, "ops": [] }"#);

        assert!(too_strong.is_err());
        assert!(no_ops.is_err());
        assert!(serde_json::from_str::<RandomAugment>(r#"{ "n": 0, "ops": [] }"#).is_ok());
    }

    #[test]
    fn test_sample_ops_from_full_catalogue() {
        let augment = RandomAugment::new(5, 3, AugmentOp::ALL.to_vec()).unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        assert_eq!(augment.sample_ops(&mut rng).len(), 5);
        assert!(RandomAugment::new(0, 3, vec![]).unwrap().sample_ops(&mut rng).is_empty());
    }

    #[test]
    fn test_serialize_round_trips_through_validation() {
        let augment = RandomAugment::blip_train();

        let json = serde_json::to_string(&augment).unwrap();

        assert_eq!(serde_json::from_str::<RandomAugment>(&json).unwrap(), augment);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let augment: RandomAugment =
            serde_json::from_str(r#"{ "magnitude": 5, "ops": ["Rotate", "Equalize"] }"#).unwrap();

        assert_eq!(augment.num_ops(), 2);
        assert_eq!(augment.ops(), &[AugmentOp::Rotate, AugmentOp::Equalize]);
    }
}
