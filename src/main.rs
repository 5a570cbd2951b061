//! gridseq — standalone host for the step sequencer and velocity remap
//! engines.
//!
//! Usage:
//!   gridseq seq [--port N] [--preset FILE]
//!   gridseq remap [--port N] [--out M] [--preset FILE]
//!   gridseq --list-ports

use gs_audio::{
    input_ports, output_ports, spawn_sender, CpalHost, HostError, MidiInputDevice,
    MidiOutputDevice,
};
use gs_engine::{StepSequencer, VelocityRemap};
use gs_model::{musical_label, MidiEvent, MidiMessage, Preset, RemapParams, SeqParams};
use ringbuf::traits::Split;
use ringbuf::HeapRb;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs, process};

/// Display poll cadence (~30 Hz), independent of audio block boundaries.
const POLL_INTERVAL: Duration = Duration::from_millis(33);

const RING_CAPACITY: usize = 256;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--list-ports") {
        list_ports();
        return;
    }

    let mode = args.get(1).map(String::as_str).unwrap_or("seq");
    let port = flag_value(&args, "--port").unwrap_or(0);
    let preset = load_preset(&args);

    let result = match mode {
        "seq" => run_seq(port, &preset),
        "remap" => run_remap(port, flag_value(&args, "--out").unwrap_or(0), &preset),
        _ => {
            eprintln!(
                "Usage: gridseq [seq|remap] [--port N] [--out M] [--preset FILE] [--list-ports]"
            );
            process::exit(2);
        }
    };

    if let Err(err) = result {
        eprintln!("gridseq: {}", err);
        process::exit(1);
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<usize> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn load_preset(args: &[String]) -> Preset {
    let path = args
        .iter()
        .position(|a| a == "--preset")
        .and_then(|i| args.get(i + 1));
    match path {
        Some(path) => match fs::read(path) {
            Ok(bytes) => Preset::from_json(&bytes),
            Err(err) => {
                log::warn!("could not read preset {}: {}; using defaults", path, err);
                Preset::default()
            }
        },
        None => Preset::default(),
    }
}

fn list_ports() {
    println!("MIDI inputs:");
    for (index, name) in input_ports().iter().enumerate() {
        println!("  {}: {}", index, name);
    }
    println!("MIDI outputs:");
    for (index, name) in output_ports().iter().enumerate() {
        println!("  {}: {}", index, name);
    }
}

fn run_seq(port: usize, preset: &Preset) -> Result<(), HostError> {
    let params = Arc::new(SeqParams::default());
    preset.sequencer.apply(&params);

    let sequencer = StepSequencer::new(Arc::clone(&params));
    let display = sequencer.display();

    let (midi_prod, midi_cons) = HeapRb::<MidiMessage>::new(RING_CAPACITY).split();
    let (out_prod, _out_cons) = HeapRb::<MidiEvent>::new(RING_CAPACITY).split();
    let _input = MidiInputDevice::connect(port, midi_prod)?;

    let mut host = CpalHost::new()?;
    host.build_stream(Box::new(sequencer), midi_cons, out_prod)?;
    host.start()?;

    println!("Sequencer running; Ctrl-C to quit.");
    loop {
        let rate_ms = params.controls().rate_ms;
        print!(
            "\rstep: {:2} | note held: {:5} | rate: {}   ",
            display.current_step(),
            display.note_held(),
            musical_label(rate_ms, display.bpm()),
        );
        let _ = std::io::stdout().flush();
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn run_remap(port: usize, out_port: usize, preset: &Preset) -> Result<(), HostError> {
    let params = Arc::new(RemapParams::default());
    preset.remap.apply(&params);

    let remap = VelocityRemap::new(Arc::clone(&params));
    let table = remap.table();

    let (midi_prod, midi_cons) = HeapRb::<MidiMessage>::new(RING_CAPACITY).split();
    let (out_prod, out_cons) = HeapRb::<MidiEvent>::new(RING_CAPACITY).split();
    let _input = MidiInputDevice::connect(port, midi_prod)?;
    let output = MidiOutputDevice::connect(out_port)?;
    let stop = Arc::new(AtomicBool::new(false));
    let _sender = spawn_sender(output, out_cons, Arc::clone(&stop));

    let mut host = CpalHost::new()?;
    host.build_stream(Box::new(remap), midi_cons, out_prod)?;
    host.start()?;

    println!("Velocity remap running; Ctrl-C to quit.");
    loop {
        let active: Vec<String> = (0..128u8)
            .filter_map(|note| {
                let velocity = table.get(note);
                (velocity > 0).then(|| format!("{}:{}", note, velocity))
            })
            .collect();
        print!("\ractive notes: {:<60}", active.join(" "));
        let _ = std::io::stdout().flush();
        std::thread::sleep(POLL_INTERVAL);
    }
}
