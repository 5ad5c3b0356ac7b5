// Fleetsim - Simulated device fleet telemetry pipeline
//
// Licensed under the MIT license. See LICENSE file for details.

//! Publisher abstraction
//!
//! The publish loop hands each compressed payload to a [`Publisher`] and
//! awaits the outcome. Implementations own connection lifecycle,
//! authentication and protocol selection; the core only supplies opaque
//! bytes, once per cycle.

use async_trait::async_trait;

use crate::error::PublishError;

/// Transport boundary for encoded telemetry payloads
#[async_trait]
pub trait Publisher: Send {
    /// Transmit one payload to the ingestion endpoint
    async fn publish(&mut self, payload: &[u8]) -> Result<(), PublishError>;
}

/// In-memory publisher for tests and local pipelines.
///
/// Records every published payload and supports scripted failures so retry
/// behavior can be exercised without a network.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    published: Vec<Vec<u8>>,
    fail_next: usize,
    closed: bool,
    bytes_sent: u64,
}

impl MemoryPublisher {
    /// Create an open publisher with no scripted failures
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` publish calls fail with a rejection
    pub fn fail_next(&mut self, n: usize) {
        self.fail_next = n;
    }

    /// Close the publisher; subsequent publishes fail
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Payloads published so far, in order
    pub fn published(&self) -> &[Vec<u8>] {
        &self.published
    }

    /// Number of successfully published payloads
    pub fn message_count(&self) -> usize {
        self.published.len()
    }

    /// Total payload bytes accepted
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&mut self, payload: &[u8]) -> Result<(), PublishError> {
        if self.closed {
            return Err(PublishError::Closed);
        }

        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(PublishError::Rejected {
                reason: "scripted failure".to_string(),
            });
        }

        self.bytes_sent += payload.len() as u64;
        self.published.push(payload.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_records_payloads() {
        let mut publisher = MemoryPublisher::new();
        publisher.publish(b"one").await.unwrap();
        publisher.publish(b"two").await.unwrap();

        assert_eq!(publisher.message_count(), 2);
        assert_eq!(publisher.bytes_sent(), 6);
        assert_eq!(publisher.published()[0], b"one");
    }

    #[tokio::test]
    async fn test_closed_publisher_rejects() {
        let mut publisher = MemoryPublisher::new();
        publisher.close();

        let err = publisher.publish(b"payload").await.unwrap_err();
        assert!(matches!(err, PublishError::Closed));
        assert_eq!(publisher.message_count(), 0);
    }

    #[tokio::test]
    async fn test_scripted_failures_then_success() {
        let mut publisher = MemoryPublisher::new();
        publisher.fail_next(2);

        assert!(publisher.publish(b"a").await.is_err());
        assert!(publisher.publish(b"b").await.is_err());
        assert!(publisher.publish(b"c").await.is_ok());
        assert_eq!(publisher.message_count(), 1);
    }
}
