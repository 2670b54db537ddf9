//! # Audio Capture Module
//!
//! This module handles real-time audio capture using CPAL (Cross-Platform
//! Audio Library). It selects a mono f32 input configuration near 44.1 kHz,
//! chops the callback data into fixed-size frames and publishes them for
//! the tuner loop.
//!
//! The consumer is expected to read a snapshot of the *latest* frame on
//! each tick (`Receiver::try_iter().last()`); frames that arrive between
//! ticks are simply skipped, since only the most recent window matters for
//! pitch detection. Acquisition failure (no device, no suitable format) is
//! the only fatal path and is surfaced to the caller before any loop runs.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::Sender;

/// Audio buffer size for processing frames.
///
/// This constant defines the number of samples per audio frame.
/// Larger buffers provide more frequency resolution but increase latency.
/// 2048 samples is roughly 46 ms at 44.1 kHz, enough for several periods
/// of the lowest guitar string.
pub const BUFFER_SIZE: usize = 2048;

/// Starts audio capture from the default input device.
///
/// Completed frames are pushed to `sender` with `try_send`; when the
/// channel is full the frame is dropped, which is the intended snapshot
/// behavior rather than a fault.
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Live stream handle and its sample rate.
///   The stream must be kept alive for capture to continue.
/// * `Err(e)` - Device unavailable or no suitable input format; the tuner
///   loop must not be started.
pub fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    eprintln!("[AUDIO] Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, 44100)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let config = supported_config.with_sample_rate(cpal::SampleRate(44100));
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    eprintln!("[AUDIO] Selected sample rate: {} Hz", sample_rate);

    let err_fn = |err| eprintln!("[AUDIO] An error occurred on the audio stream: {}", err);

    // Accumulates callback data until a full frame is available.
    let mut audio_buffer = Vec::with_capacity(BUFFER_SIZE * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            audio_buffer.extend_from_slice(data);

            while audio_buffer.len() >= BUFFER_SIZE {
                let frame = audio_buffer[..BUFFER_SIZE].to_vec();

                // Dropped frames are fine; the consumer only wants the latest.
                let _ = sender.try_send(frame);

                audio_buffer.drain(..BUFFER_SIZE);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Filters for mono 32-bit float input and picks the range whose bounds
/// come closest to the target rate.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i32 - target_rate as i32).abs();
            let max_diff = (c.max_sample_rate().0 as i32 - target_rate as i32).abs();
            min_diff.min(max_diff)
        })
}
