//! Test utilities & fixtures.
//! Provides a recording serial opener and isolated preset locations.
#![allow(dead_code)] // not every test binary uses every helper

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mrex_nodetool::frame::{PidTriple, TractionProfile};
use mrex_nodetool::transport::{PortOpener, SerialSettings};

/// What a [`RecordingOpener`] saw: opened ports, written bytes, closed handles.
#[derive(Debug, Default)]
pub struct Recording {
    pub opened: Vec<(String, SerialSettings)>,
    pub written: Vec<u8>,
    pub closed: usize,
}

/// How the fake device behaves once opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Accept,
    RefuseOpen,
    FailWrite,
}

/// A [`PortOpener`] double that records traffic instead of touching hardware.
#[derive(Debug, Clone)]
pub struct RecordingOpener {
    pub log: Arc<Mutex<Recording>>,
    behavior: Behavior,
}

impl RecordingOpener {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            log: Arc::new(Mutex::new(Recording::default())),
            behavior,
        }
    }

    pub fn written_text(&self) -> String {
        String::from_utf8(self.log.lock().unwrap().written.clone()).unwrap()
    }
}

struct FakeDevice {
    log: Arc<Mutex<Recording>>,
    fail: bool,
}

impl Write for FakeDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "Operation timed out"));
        }
        self.log.lock().unwrap().written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        self.log.lock().unwrap().closed += 1;
    }
}

impl PortOpener for RecordingOpener {
    fn open(&self, port: &str, settings: &SerialSettings) -> io::Result<Box<dyn Write + Send>> {
        self.log.lock().unwrap().opened.push((port.to_string(), *settings));
        if self.behavior == Behavior::RefuseOpen {
            return Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory"));
        }
        Ok(Box::new(FakeDevice {
            log: self.log.clone(),
            fail: self.behavior == Behavior::FailWrite,
        }))
    }
}

/// A fresh temp dir and the preset path inside it.
pub fn preset_path() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("pid_presets.json");
    (tmp, path)
}

/// The mixed profile used across tests: filled, zero, blank and partial modes.
pub fn sample_profile() -> TractionProfile {
    TractionProfile::new(vec![
        PidTriple::new("1", "2", "3"),
        PidTriple::new("0", "0", "0"),
        PidTriple::new("", "", ""),
        PidTriple::new("5", "", "1"),
        PidTriple::new("", "9", ""),
    ])
}

pub const SAMPLE_FRAME: &str =
    "<TRACTION|M1:P1,I2,D3|M2:P0,I0,D0|M3:P0,I0,D0|M4:P5,I0,D1|M5:P0,I9,D0>";
