use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::error::CycleError;
use crate::frame::Frame;
use crate::report::FrameSink;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Retries after the first failed attempt. Uploads are best-effort: once
/// exhausted, the frame's report is dropped and the capture loop goes on.
const UPLOAD_RETRIES: u32 = 2;

/// Destination for uploaded frames.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Hostname or IP of the collector server.
    pub server: String,
    /// Port the collector listens on.
    pub port: u16,
}

/// Single-use-connection JPEG uploader.
pub struct TcpUploader {
    config: UploadConfig,
}

impl TcpUploader {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    fn dest(&self) -> String {
        format!("{}:{}", self.config.server, self.config.port)
    }

    fn resolve(&self) -> Result<SocketAddr> {
        self.dest()
            .to_socket_addrs()
            .with_context(|| format!("resolve collector address {}", self.dest()))?
            .next()
            .ok_or_else(|| anyhow!("no address found for {}", self.dest()))
    }

    /// One upload attempt: connect, write the whole buffer, orderly shutdown.
    fn send(&self, jpeg: &[u8]) -> Result<()> {
        let addr = self.resolve()?;
        let mut stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .with_context(|| format!("connect to collector {}", self.dest()))?;
        stream.write_all(jpeg).context("write jpeg payload")?;
        stream.flush().context("flush jpeg payload")?;
        // End-of-image is the connection close; no terminator is written.
        stream
            .shutdown(Shutdown::Both)
            .context("shutdown upload connection")?;
        Ok(())
    }
}

impl FrameSink for TcpUploader {
    fn deliver(&mut self, frame: &Frame) -> Result<(), CycleError> {
        let jpeg = frame.encode_jpeg().map_err(|cause| CycleError::Upload {
            dest: self.dest(),
            cause,
        })?;

        let mut last_err = None;
        for attempt in 0..=UPLOAD_RETRIES {
            match self.send(&jpeg) {
                Ok(()) => {
                    if attempt > 0 {
                        log::info!("upload to {} succeeded on retry {}", self.dest(), attempt);
                    }
                    return Ok(());
                }
                Err(err) => {
                    log::warn!(
                        "upload attempt {}/{} to {} failed: {:#}",
                        attempt + 1,
                        UPLOAD_RETRIES + 1,
                        self.dest(),
                        err
                    );
                    last_err = Some(err);
                }
            }
        }

        Err(CycleError::Upload {
            dest: self.dest(),
            cause: last_err.unwrap_or_else(|| anyhow!("upload failed")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;

    #[test]
    fn uploaded_bytes_match_the_encoded_frame_exactly() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            // read_to_end returns only once the peer closes the connection,
            // which is exactly how the receiver delimits the image.
            socket.read_to_end(&mut received).unwrap();
            received
        });

        let frame = Frame::solid([200, 40, 40], 48, 32);
        let expected = frame.encode_jpeg().unwrap();

        let mut uploader = TcpUploader::new(UploadConfig {
            server: "127.0.0.1".to_string(),
            port,
        });
        uploader.deliver(&frame).unwrap();

        let received = server.join().unwrap();
        assert_eq!(received, expected);
    }

    #[test]
    fn unreachable_collector_reports_an_upload_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        // Closing the listener leaves the port refusing connections.
        drop(listener);

        let frame = Frame::solid([0, 0, 0], 16, 16);
        let mut uploader = TcpUploader::new(UploadConfig {
            server: "127.0.0.1".to_string(),
            port,
        });

        let err = uploader.deliver(&frame).unwrap_err();
        assert!(matches!(err, CycleError::Upload { .. }));
    }
}
