// Fleetsim Agent - Simulated device fleet telemetry agent
//
// Licensed under the MIT license. See LICENSE file for details.

//! Concrete publishers
//!
//! `TcpPublisher` ships length-prefixed payload frames to an ingestion
//! endpoint; `LogPublisher` logs and discards payloads when no endpoint is
//! configured.

use async_trait::async_trait;
use fleetsim::{PublishError, Publisher};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Publishes payloads as length-prefixed frames over a TCP connection.
///
/// Wire format: 4-byte big-endian payload length, then the payload bytes.
pub struct TcpPublisher {
    stream: TcpStream,
    endpoint: String,
}

impl TcpPublisher {
    /// Connect to the ingestion endpoint.
    ///
    /// A connection failure here is fatal for the agent: there is no
    /// publisher to hand to the loop.
    pub async fn connect(endpoint: &str) -> Result<Self, PublishError> {
        let stream = TcpStream::connect(endpoint).await?;
        info!(%endpoint, "connected to ingestion endpoint");
        Ok(Self {
            stream,
            endpoint: endpoint.to_string(),
        })
    }

    /// The endpoint this publisher is connected to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Publisher for TcpPublisher {
    async fn publish(&mut self, payload: &[u8]) -> Result<(), PublishError> {
        let len = u32::try_from(payload.len()).map_err(|_| PublishError::Rejected {
            reason: format!("payload of {} bytes exceeds frame limit", payload.len()),
        })?;

        self.stream.write_all(&len.to_be_bytes()).await?;
        self.stream.write_all(payload).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Logs payload sizes and discards them
#[derive(Debug, Default)]
pub struct LogPublisher {
    published: u64,
}

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&mut self, payload: &[u8]) -> Result<(), PublishError> {
        self.published += 1;
        debug!(
            message = self.published,
            bytes = payload.len(),
            "discarding payload (no endpoint configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_publisher_frames_payloads() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut len_buf = [0u8; 4];
            socket.read_exact(&mut len_buf).await.unwrap();
            let len = u32::from_be_bytes(len_buf) as usize;

            let mut payload = vec![0u8; len];
            socket.read_exact(&mut payload).await.unwrap();
            payload
        });

        let mut publisher = TcpPublisher::connect(&addr.to_string()).await.unwrap();
        publisher.publish(b"telemetry payload").await.unwrap();

        assert_eq!(server.await.unwrap(), b"telemetry payload");
    }

    #[tokio::test]
    async fn test_tcp_connect_failure() {
        // Port 1 is essentially never listening.
        let result = TcpPublisher::connect("127.0.0.1:1").await;
        assert!(matches!(result, Err(PublishError::Io(_))));
    }

    #[tokio::test]
    async fn test_log_publisher_accepts_everything() {
        let mut publisher = LogPublisher::default();
        publisher.publish(b"one").await.unwrap();
        publisher.publish(b"two").await.unwrap();
        assert_eq!(publisher.published, 2);
    }
}
