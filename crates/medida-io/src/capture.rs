//! Live play-while-record capture for sweep measurements.
//!
//! The real-time producer (the input callback) writes captured frames into
//! a buffer preallocated before the streams start, at a monotonically
//! increasing offset, with no allocation and no locks on the audio thread.
//! Completion is published through an atomic flag with release ordering;
//! the control thread polls it at a coarse interval with acquire ordering
//! and only touches the recording after the flag flips. The buffer itself
//! moves through a bounded channel, so there is no window for a partial
//! read. Once playback starts there is no cancellation: an early stop
//! leaves the tail zeroed, which the analyzers tolerate (they zero-pad
//! short input anyway).

use crate::devices::{device_name, find_input_device, find_output_device};
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use medida_analysis::{BitDepth, SampleBuffer};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

/// How often the control thread checks the completion flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for a live measurement pass.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sample rate for both streams in Hz.
    pub sample_rate: u32,
    /// Input device name or index (default device if `None`).
    pub input_device: Option<String>,
    /// Output device name or index (default device if `None`).
    pub output_device: Option<String>,
    /// Extra time recorded after the stimulus ends, to catch the decaying
    /// tail of the device response.
    pub tail_secs: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            input_device: None,
            output_device: None,
            tail_secs: 0.5,
        }
    }
}

/// A measurement session owning the resolved devices.
///
/// Explicitly constructed and passed by the caller; holds no global state.
pub struct CaptureSession {
    config: CaptureConfig,
    input_device: cpal::Device,
    output_device: cpal::Device,
}

impl CaptureSession {
    /// Resolve devices for a session.
    pub fn new(config: CaptureConfig) -> Result<Self> {
        let host = cpal::default_host();

        let input_device = match &config.input_device {
            Some(name) => find_input_device(&host, name)?,
            None => host.default_input_device().ok_or(Error::NoDevice)?,
        };
        let output_device = match &config.output_device {
            Some(name) => find_output_device(&host, name)?,
            None => host.default_output_device().ok_or(Error::NoDevice)?,
        };

        Ok(Self {
            config,
            input_device,
            output_device,
        })
    }

    /// Name of the resolved input device.
    pub fn input_name(&self) -> String {
        device_name(&self.input_device).unwrap_or_else(|_| "<unknown>".into())
    }

    /// Name of the resolved output device.
    pub fn output_name(&self) -> String {
        device_name(&self.output_device).unwrap_or_else(|_| "<unknown>".into())
    }

    /// Play the stimulus while recording the response.
    ///
    /// Blocks until the recording buffer is full (stimulus length plus the
    /// configured tail), then returns the captured mono signal. The
    /// stimulus lead-in absorbs stream start-up misalignment.
    pub fn run(&self, stimulus: &SampleBuffer) -> Result<SampleBuffer> {
        let sample_rate = self.config.sample_rate;
        let capture_len =
            stimulus.len() + (self.config.tail_secs * sample_rate as f32) as usize;

        let input_channels = self
            .input_device
            .default_input_config()
            .map_err(|e| Error::Stream(e.to_string()))?
            .channels() as usize;
        let output_channels = self
            .output_device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?
            .channels() as usize;

        let stream_config = |channels: usize| cpal::StreamConfig {
            channels: channels as u16,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let done = Arc::new(AtomicBool::new(false));
        let write_cursor = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::sync_channel::<Vec<f32>>(1);

        // Everything the producer touches is allocated here, before the
        // real-time path starts.
        let mut recording = vec![0.0f32; capture_len];
        let mut finished = false;

        let producer_done = Arc::clone(&done);
        let producer_cursor = Arc::clone(&write_cursor);
        let input_stream = self
            .input_device
            .build_input_stream(
                &stream_config(input_channels),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if finished {
                        return;
                    }
                    let mut pos = producer_cursor.load(Ordering::Relaxed);
                    for frame in data.chunks(input_channels) {
                        if pos >= capture_len {
                            break;
                        }
                        recording[pos] = frame.iter().sum::<f32>() / frame.len() as f32;
                        pos += 1;
                    }
                    producer_cursor.store(pos, Ordering::Relaxed);

                    if pos >= capture_len {
                        finished = true;
                        // Move the full buffer out, then publish: the
                        // release store pairs with the control thread's
                        // acquire load, so the flag is only visible after
                        // every write above it.
                        let _ = tx.try_send(std::mem::take(&mut recording));
                        producer_done.store(true, Ordering::Release);
                    }
                },
                |err| tracing::error!(%err, "input stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        let stimulus_data: Arc<Vec<f32>> = Arc::new(stimulus.samples().to_vec());
        let mut play_cursor = 0usize;
        let output_stream = self
            .output_device
            .build_output_stream(
                &stream_config(output_channels),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(output_channels) {
                        let sample = stimulus_data.get(play_cursor).copied().unwrap_or(0.0);
                        frame.fill(sample);
                        play_cursor += 1;
                    }
                },
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        // Start recording first so the stimulus onset is never lost; the
        // lead-in silence covers the gap between the two play calls.
        input_stream
            .play()
            .map_err(|e| Error::Stream(e.to_string()))?;
        output_stream
            .play()
            .map_err(|e| Error::Stream(e.to_string()))?;

        let expected_secs = capture_len as f32 / sample_rate as f32;
        let timeout = expected_secs + 5.0;
        let start = Instant::now();

        while !done.load(Ordering::Acquire) {
            std::thread::sleep(POLL_INTERVAL);
            tracing::debug!(
                captured = write_cursor.load(Ordering::Relaxed),
                total = capture_len,
                "capture progress"
            );
            if start.elapsed().as_secs_f32() > timeout {
                return Err(Error::CaptureTimeout(timeout));
            }
        }

        drop(output_stream);
        drop(input_stream);

        let recorded = rx
            .recv()
            .map_err(|_| Error::Stream("capture ended without delivering a buffer".into()))?;

        Ok(SampleBuffer::from_mono(
            recorded,
            sample_rate,
            BitDepth::Float32,
        ))
    }
}
