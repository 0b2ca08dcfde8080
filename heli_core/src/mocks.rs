//! Test and helper mocks for heli_core

use heli_traits::{LinePort, PortOpener};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A port that replays canned byte chunks and records every written line.
pub struct ScriptedPort {
    chunks: VecDeque<Vec<u8>>,
    written: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPort {
    /// Returns the port plus a shared handle to its write log.
    pub fn new(chunks: impl IntoIterator<Item = Vec<u8>>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                chunks: chunks.into_iter().collect(),
                written: Arc::clone(&written),
            },
            written,
        )
    }
}

impl LinePort for ScriptedPort {
    fn read_available(
        &mut self,
        buf: &mut Vec<u8>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        match self.chunks.pop_front() {
            Some(chunk) => {
                buf.extend_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }

    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut log) = self.written.lock() {
            log.push(line.to_string());
        }
        Ok(())
    }
}

/// Hands out a prepared `ScriptedPort` exactly once.
pub struct ScriptedOpener {
    port: Option<ScriptedPort>,
}

impl ScriptedOpener {
    pub fn new(port: ScriptedPort) -> Self {
        Self { port: Some(port) }
    }
}

impl PortOpener for ScriptedOpener {
    fn open(&mut self) -> Result<Box<dyn LinePort>, Box<dyn std::error::Error + Send + Sync>> {
        match self.port.take() {
            Some(p) => Ok(Box::new(p)),
            None => Err(Box::new(std::io::Error::other("scripted port already consumed"))),
        }
    }
}

/// An opener that always fails, for exercising the open-failure path.
pub struct FailingOpener;

impl PortOpener for FailingOpener {
    fn open(&mut self) -> Result<Box<dyn LinePort>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("no such device")))
    }
}

/// A port whose reads fail immediately, for exercising the worker's fault
/// path.
pub struct FaultyPort;

impl LinePort for FaultyPort {
    fn read_available(
        &mut self,
        _buf: &mut Vec<u8>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("device vanished")))
    }

    fn write_line(
        &mut self,
        _line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("device vanished")))
    }
}

/// Opener for `FaultyPort`.
pub struct FaultyOpener;

impl PortOpener for FaultyOpener {
    fn open(&mut self) -> Result<Box<dyn LinePort>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Box::new(FaultyPort))
    }
}
