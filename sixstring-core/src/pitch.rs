//! # Pitch Detection Module
//!
//! This module implements time-domain pitch detection for the tuner.
//! It estimates the fundamental frequency of a single audio frame using
//! unnormalized autocorrelation, which works well for the monophonic,
//! strongly periodic signals a plucked guitar string produces.
//!
//! ## Features
//! - RMS noise gate to skip silent frames cheaply
//! - Best-effort amplitude trimming to reduce edge bias in the correlation
//! - O(N²) autocorrelation peak search (fine for 2048-sample frames)

/// Minimum RMS amplitude for a frame to be considered non-silent.
pub const SILENCE_RMS_THRESHOLD: f32 = 0.01;

/// Amplitude threshold used when trimming low-level edges off a frame.
const TRIM_AMPLITUDE_THRESHOLD: f32 = 0.2;

/// Estimates the fundamental frequency of a single audio frame.
///
/// Stateless: the result depends only on the given frame and sample rate.
/// Detection is best-effort per frame; any degenerate input (silence, a
/// frame that trims down to nothing, a correlation with no usable peak)
/// yields `None` rather than an error, and the next frame simply tries
/// again with fresh data.
///
/// # Arguments
/// * `signal` - Input audio frame, samples roughly in [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `silence_threshold` - Minimum RMS amplitude for pitch detection
///
/// # Returns
/// * `Some(frequency)` - Estimated fundamental frequency in Hz
/// * `None` - No pitch detected (silence, noise, or degenerate signal)
pub fn detect_pitch(signal: &[f32], sample_rate: u32, silence_threshold: f32) -> Option<f32> {
    let size = signal.len();
    if size < 2 {
        return None;
    }

    // --- Noise Gate: Calculate RMS to filter out silence/noise ---
    let rms = (signal.iter().map(|&s| s * s).sum::<f32>() / size as f32).sqrt();
    if rms < silence_threshold {
        return None;
    }

    // --- Trim low-amplitude edges ---
    // Near-silent leading and trailing regions bias the correlation toward
    // spurious lags. Scan the first half forward and the last half backward
    // for the first sample below the amplitude threshold; if a scan finds
    // nothing, fall back to the frame boundary.
    let mut start = 0;
    for i in 0..size / 2 {
        if signal[i].abs() < TRIM_AMPLITUDE_THRESHOLD {
            start = i;
            break;
        }
    }
    let mut end = size - 1;
    for i in 1..size / 2 {
        if signal[size - i].abs() < TRIM_AMPLITUDE_THRESHOLD {
            end = size - i;
            break;
        }
    }

    let trimmed = &signal[start..=end];
    let n = trimmed.len();
    if n < 2 {
        return None;
    }

    // --- Autocorrelation: c[k] = sum of x[j] * x[j+k] ---
    // O(N²), acceptable for frames up to a couple of thousand samples.
    let mut c = vec![0.0f32; n];
    for k in 0..n {
        let mut sum = 0.0;
        for j in 0..n - k {
            sum += trimmed[j] * trimmed[j + k];
        }
        c[k] = sum;
    }

    // Skip past the zero-lag peak: find the first lag where the correlation
    // stops decreasing. If it never stops, there is no periodicity to find.
    let mut d = 0;
    while d + 1 < n && c[d] > c[d + 1] {
        d += 1;
    }
    if d + 1 >= n {
        return None;
    }

    // The strongest remaining peak marks the period in samples.
    let mut max_val = f32::MIN;
    let mut max_pos = 0;
    for (i, &val) in c.iter().enumerate().skip(d) {
        if val > max_val {
            max_val = val;
            max_pos = i;
        }
    }
    if max_pos == 0 {
        return None;
    }

    let frequency = sample_rate as f32 / max_pos as f32;

    // Guard against non-finite results from pathological frames.
    if frequency.is_finite() && frequency > 0.0 {
        Some(frequency)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_sine(
        sample_rate: f32,
        frequency: f32,
        amplitude: f32,
        sample_count: usize,
    ) -> Vec<f32> {
        (0..sample_count)
            .map(|i| {
                amplitude * (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate).sin()
            })
            .collect()
    }

    #[test]
    fn silent_frame_returns_none() {
        let frame = vec![0.0f32; 2048];
        assert_eq!(detect_pitch(&frame, 44100, SILENCE_RMS_THRESHOLD), None);
    }

    #[test]
    fn sub_threshold_frame_returns_none() {
        // A sine well below the RMS gate must be treated as silence.
        let frame = generate_sine(44100.0, 110.0, 0.005, 2048);
        assert_eq!(detect_pitch(&frame, 44100, SILENCE_RMS_THRESHOLD), None);
    }

    #[test]
    fn empty_and_tiny_frames_return_none() {
        assert_eq!(detect_pitch(&[], 44100, SILENCE_RMS_THRESHOLD), None);
        assert_eq!(detect_pitch(&[0.9], 44100, SILENCE_RMS_THRESHOLD), None);
    }

    #[test]
    fn impulse_frame_returns_none() {
        // A single spike has no periodicity; the trimmed frame is all zeros
        // and the correlation has no usable peak.
        let mut frame = vec![0.0f32; 2048];
        frame[0] = 1.0;
        assert_eq!(detect_pitch(&frame, 44100, 0.01), None);
    }

    #[test]
    fn detects_pure_sine_frequencies() {
        // Open-string range at CD sample rate, at least ~3 periods per frame.
        let sample_rate = 44100;
        for &freq in &[82.41f32, 110.0, 146.83, 196.0, 246.94, 329.63, 400.0] {
            let frame = generate_sine(sample_rate as f32, freq, 0.5, 2048);
            let detected = detect_pitch(&frame, sample_rate, SILENCE_RMS_THRESHOLD)
                .unwrap_or_else(|| panic!("no pitch detected for {} Hz", freq));
            let relative_error = (detected - freq).abs() / freq;
            assert!(
                relative_error < 0.02,
                "detected {} Hz for a {} Hz sine",
                detected,
                freq
            );
        }
    }
}
