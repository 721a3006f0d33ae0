//! Offline sinc resampling of mono buffers

use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

/// Resample from one rate to another. Equal rates return a copy.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, String> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 {
        return Ok(samples.to_vec());
    }
    resample_ratio(samples, to_rate as f64 / from_rate as f64)
}

/// Resample by an output/input length ratio (2.0 doubles the sample count)
pub fn resample_ratio(samples: &[f32], ratio: f64) -> Result<Vec<f32>, String> {
    if samples.is_empty() || (ratio - 1.0).abs() < f64::EPSILON {
        return Ok(samples.to_vec());
    }
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(format!("invalid resample ratio {ratio}"));
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .map_err(|e| format!("resampler init: {e}"))?;

    let input = vec![samples.to_vec()];
    let output = resampler
        .process(&input, None)
        .map_err(|e| format!("resample: {e}"))?;

    Ok(output.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_copy() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(resample(&samples, 48000, 48000).unwrap(), samples);
        assert!(resample_ratio(&[], 2.0).unwrap().is_empty());
    }

    #[test]
    fn test_ratio_changes_length() {
        let samples: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.05).sin()).collect();
        let up = resample_ratio(&samples, 2.0).unwrap();
        let expected = samples.len() * 2;
        assert!(up.len().abs_diff(expected) <= expected / 50, "len = {}", up.len());
    }

    #[test]
    fn test_invalid_ratio() {
        assert!(resample_ratio(&[0.0; 16], -1.0).is_err());
    }
}
