//! midir-backed MIDI input/output plumbing.
//!
//! Input messages are parsed on midir's callback thread and pushed into a
//! lock-free ring drained by the audio callback. Output events are popped
//! from a ring by a dedicated sender thread so the audio callback never
//! touches the OS MIDI API.

use gs_model::{MidiEvent, MidiMessage};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use ringbuf::traits::{Consumer, Producer};
use ringbuf::{HeapCons, HeapProd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::HostError;

const CLIENT_NAME: &str = "gridseq";

/// Names of the available MIDI input ports.
pub fn input_ports() -> Vec<String> {
    match MidiInput::new(CLIENT_NAME) {
        Ok(midi_in) => midi_in
            .ports()
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Names of the available MIDI output ports.
pub fn output_ports() -> Vec<String> {
    match MidiOutput::new(CLIENT_NAME) {
        Ok(midi_out) => midi_out
            .ports()
            .iter()
            .filter_map(|port| midi_out.port_name(port).ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// An open MIDI input connection feeding parsed messages into a ring.
pub struct MidiInputDevice {
    _connection: MidiInputConnection<()>,
}

impl MidiInputDevice {
    pub fn connect(
        port_index: usize,
        mut producer: HeapProd<MidiMessage>,
    ) -> Result<Self, HostError> {
        let midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|e| HostError::MidiInit(e.to_string()))?;
        let ports = midi_in.ports();
        let port = ports.get(port_index).ok_or(HostError::BadPort(port_index))?;
        let port_name = midi_in.port_name(port).unwrap_or_default();

        let connection = midi_in
            .connect(
                port,
                "gridseq-in",
                move |_timestamp, bytes, _| {
                    let mut raw = [0u8; 3];
                    for (dst, src) in raw.iter_mut().zip(bytes) {
                        *dst = *src;
                    }
                    if producer.try_push(MidiMessage::from_bytes(raw)).is_err() {
                        log::warn!("MIDI input ring full, dropping message");
                    }
                },
                (),
            )
            .map_err(|e| HostError::MidiConnect(e.to_string()))?;

        log::info!("MIDI input connected: {}", port_name);
        Ok(Self {
            _connection: connection,
        })
    }
}

/// An open MIDI output connection.
pub struct MidiOutputDevice {
    connection: MidiOutputConnection,
}

impl MidiOutputDevice {
    pub fn connect(port_index: usize) -> Result<Self, HostError> {
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|e| HostError::MidiInit(e.to_string()))?;
        let ports = midi_out.ports();
        let port = ports.get(port_index).ok_or(HostError::BadPort(port_index))?;
        let port_name = midi_out.port_name(port).unwrap_or_default();

        let connection = midi_out
            .connect(port, "gridseq-out")
            .map_err(|e| HostError::MidiConnect(e.to_string()))?;

        log::info!("MIDI output connected: {}", port_name);
        Ok(Self { connection })
    }

    pub fn send(&mut self, message: MidiMessage) -> Result<(), HostError> {
        self.connection
            .send(&message.to_bytes())
            .map_err(|e| HostError::Playback(e.to_string()))
    }
}

/// Drain the engine's outgoing events to the device at a 1 ms cadence until
/// `stop` is raised.
pub fn spawn_sender(
    mut device: MidiOutputDevice,
    mut consumer: HeapCons<MidiEvent>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            while let Some(event) = consumer.try_pop() {
                if let Err(err) = device.send(event.message) {
                    log::error!("MIDI send failed: {}", err);
                    return;
                }
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    })
}
