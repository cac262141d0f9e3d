//! UDP ingestion boundary. The phone app streams JSON packets here; decoding
//! happens immediately so everything downstream sees typed samples only.

use std::{net::UdpSocket, time::Duration, time::Instant};

use anyhow::{Context, Result};

use crate::{
    config::NetworkConfig,
    wire::{self, SensorSample},
};

const RECV_BUFFER_SIZE: usize = 2048;

/// Short read timeout so walking timeouts keep getting polled while the
/// phone is silent.
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Where decoded samples come from. Live detection and calibration share this
/// seam, and tests script it.
pub trait SampleSource {
    /// The next decoded sample, or `None` after a quiet window (read timeout
    /// or a dropped malformed packet).
    fn recv(&mut self) -> Option<SensorSample>;
}

pub struct UdpSource {
    socket: UdpSocket,
    buf: [u8; RECV_BUFFER_SIZE],
}

impl UdpSource {
    pub fn bind(network: &NetworkConfig) -> Result<Self> {
        let addr = format!("{}:{}", network.listen_ip, network.listen_port);
        let socket = UdpSocket::bind(&addr).with_context(|| {
            format!(
                "Could not bind UDP socket on {addr}. The port is likely held by another \
                 process — a running listener or calibration session. Stop it first, then retry"
            )
        })?;
        socket
            .set_read_timeout(Some(READ_TIMEOUT))
            .context("Failed to set socket read timeout")?;

        Ok(Self {
            socket,
            buf: [0u8; RECV_BUFFER_SIZE],
        })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.socket.local_addr().context("Failed to read local address")
    }
}

impl SampleSource for UdpSource {
    fn recv(&mut self) -> Option<SensorSample> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, _addr)) => wire::decode(&self.buf[..len], Instant::now()),
            // Timeouts and transient errors both read as a quiet window; the
            // caller's next poll picks things back up.
            Err(_) => None,
        }
    }
}
