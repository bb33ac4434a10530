//! The "send configuration" action: persist, encode, transmit.
use log::{info, warn};

use crate::error::{NodeToolError, Result};
use crate::frame::{self, ConfigRequest, Frame, TractionProfile};
use crate::presets::{PresetFile, PresetStore};
use crate::transport::{PortOpener, SendOutcome, SystemPorts, Transmitter};

pub struct NodeProgrammer<O = SystemPorts> {
    store: PresetStore,
    transmitter: Transmitter<O>,
}

impl<O: PortOpener> NodeProgrammer<O> {
    pub fn new(store: PresetStore, transmitter: Transmitter<O>) -> Self {
        Self { store, transmitter }
    }

    /// Profile to start editing from. A corrupt preset file is reported and
    /// treated as empty so configuration is never blocked on it.
    pub fn startup_profile(&self) -> TractionProfile {
        let presets = match self.store.load() {
            Ok(presets) => presets,
            Err(e @ NodeToolError::CorruptPresetFile { .. }) => {
                warn!("{}; ignoring saved presets", e);
                PresetFile::new()
            }
            Err(e) => {
                warn!("Failed to read presets from {}: {}", self.store.path().display(), e);
                PresetFile::new()
            }
        };
        TractionProfile::from_presets(&presets)
    }

    /// Build the frame for `request`. Traction profiles are saved first so a
    /// failed transmit does not lose what the operator entered.
    pub fn prepare(&self, request: &ConfigRequest) -> Result<Frame> {
        if let ConfigRequest::Traction(profile) = request {
            profile.check_complete()?;
            self.store.save(profile)?;
        }
        frame::encode(request)
    }

    /// Prepare and send `request`. Encoding errors are returned; anything that
    /// goes wrong on the link comes back as a [`SendOutcome`].
    pub fn configure(&self, port: &str, request: &ConfigRequest) -> Result<SendOutcome> {
        let frame = self.prepare(request)?;
        info!("Sending: {}", frame);
        let outcome = self.transmitter.send(port, &frame);
        match &outcome {
            SendOutcome::Sent => info!("Sent {} frame to {}", request.kind(), port),
            other => warn!("{}", other),
        }
        Ok(outcome)
    }
}
