//! CPAL-based standalone host.
//!
//! Runs a `Processor` inside the device callback: drains pending MIDI input
//! into a bounded block event list, renders mono into a preallocated scratch
//! buffer, duplicates it across the device channels, and hands outgoing MIDI
//! to the sender ring. Nothing in the callback blocks or allocates.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use gs_engine::{BlockContext, Processor};
use gs_model::{BlockEvents, MidiEvent, MidiMessage};
use ringbuf::traits::{Consumer, Producer};
use ringbuf::{HeapCons, HeapProd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::HostError;

/// Largest block rendered in one go; bigger device callbacks are split.
pub const MAX_BLOCK_FRAMES: usize = 8192;

/// CPAL output stream hosting a block processor.
pub struct CpalHost {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl CpalHost {
    /// Open the default output device.
    pub fn new() -> Result<Self, HostError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(HostError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| HostError::DeviceInit(e.to_string()))?;
        let config: StreamConfig = config.into();

        log::info!(
            "audio output: {} Hz, {} channel(s)",
            config.sample_rate.0,
            config.channels
        );

        Ok(Self {
            device,
            config,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Build and start the stream around the processor. MIDI popped from
    /// `midi_in` is stamped at the start of the block it is drained into;
    /// events appended by the processor go to `midi_out`.
    pub fn build_stream(
        &mut self,
        mut processor: Box<dyn Processor>,
        mut midi_in: HeapCons<MidiMessage>,
        mut midi_out: HeapProd<MidiEvent>,
    ) -> Result<(), HostError> {
        let channels = self.config.channels as usize;
        let sample_rate = f64::from(self.config.sample_rate.0);
        let running = self.running.clone();

        processor.prepare(sample_rate, MAX_BLOCK_FRAMES);
        // The host renders mono and duplicates across device channels.
        if !processor.supports_channels(1) {
            return Err(HostError::UnsupportedLayout(1));
        }

        // Preallocated; the callback only ever borrows into these.
        let mut scratch = vec![0.0f32; MAX_BLOCK_FRAMES];
        let mut events = BlockEvents::new();
        let mut out_events = BlockEvents::new();

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }

                    events.clear();
                    while let Some(message) = midi_in.try_pop() {
                        if events.push(MidiEvent::new(0, message)).is_err() {
                            break;
                        }
                    }

                    let ctx = BlockContext::new(sample_rate);
                    let mut first_chunk = true;
                    for chunk in data.chunks_mut(channels * MAX_BLOCK_FRAMES) {
                        let frames = chunk.len() / channels;
                        let mono = &mut scratch[..frames];
                        mono.fill(0.0);
                        out_events.clear();

                        // Drained input applies to the first chunk only.
                        let block_events: &[MidiEvent] =
                            if first_chunk { &events } else { &[] };
                        processor.process(&ctx, block_events, mono, &mut out_events);
                        first_chunk = false;

                        for (frame, samples) in chunk.chunks_mut(channels).enumerate() {
                            for sample in samples.iter_mut() {
                                *sample = mono[frame];
                            }
                        }
                        for event in &out_events {
                            let _ = midi_out.try_push(*event);
                        }
                    }
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| HostError::StreamCreate(e.to_string()))?;

        stream
            .play()
            .map_err(|e| HostError::Playback(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), HostError> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream
                .play()
                .map_err(|e| HostError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), HostError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream
                .pause()
                .map_err(|e| HostError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}
