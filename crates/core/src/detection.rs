// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detection events emitted by the recognition pipeline

use crate::plate::{Plate, PlateError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors converting a raw detection into a [`DetectionEvent`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("invalid plate: {0}")]
    Plate(#[from] PlateError),
    #[error("confidence {0} outside [0, 1]")]
    Confidence(f64),
}

/// A plate observation, consumed exactly once by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionEvent {
    pub plate: Plate,
    pub confidence: f64,
    pub observed_at: DateTime<Utc>,
}

impl DetectionEvent {
    pub fn new(plate: Plate, confidence: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            plate,
            confidence,
            observed_at,
        }
    }
}

/// Unvalidated detection as it arrives on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct RawDetection {
    pub plate: String,
    pub confidence: f64,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
}

impl RawDetection {
    /// Validate into a [`DetectionEvent`], stamping `received_at` when the
    /// producer did not supply a timestamp
    pub fn into_event(self, received_at: DateTime<Utc>) -> Result<DetectionEvent, DetectionError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(DetectionError::Confidence(self.confidence));
        }
        let plate = Plate::parse(&self.plate)?;
        Ok(DetectionEvent {
            plate,
            confidence: self.confidence,
            observed_at: self.observed_at.unwrap_or(received_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_detection_keeps_producer_timestamp() {
        let raw: RawDetection = serde_json::from_str(
            r#"{"plate": "abc1234", "confidence": 0.91, "observed_at": "2026-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        let event = raw.into_event(Utc::now()).unwrap();

        assert_eq!(event.plate.as_str(), "ABC1234");
        assert_eq!(event.observed_at.to_rfc3339(), "2026-01-02T03:04:05+00:00");
    }

    #[test]
    fn raw_detection_without_timestamp_uses_received_at() {
        let raw: RawDetection =
            serde_json::from_str(r#"{"plate": "ABC1D23", "confidence": 0.5}"#).unwrap();
        let received = Utc::now();
        let event = raw.into_event(received).unwrap();
        assert_eq!(event.observed_at, received);
    }

    #[test]
    fn raw_detection_rejects_out_of_range_confidence() {
        let raw = RawDetection {
            plate: "ABC1234".to_string(),
            confidence: 1.5,
            observed_at: None,
        };
        assert_eq!(
            raw.into_event(Utc::now()).unwrap_err(),
            DetectionError::Confidence(1.5)
        );
    }

    #[test]
    fn raw_detection_rejects_nan_confidence() {
        let raw = RawDetection {
            plate: "ABC1234".to_string(),
            confidence: f64::NAN,
            observed_at: None,
        };
        assert!(matches!(
            raw.into_event(Utc::now()),
            Err(DetectionError::Confidence(_))
        ));
    }

    #[test]
    fn raw_detection_rejects_bad_plate() {
        let raw = RawDetection {
            plate: "??".to_string(),
            confidence: 0.9,
            observed_at: None,
        };
        assert!(matches!(
            raw.into_event(Utc::now()),
            Err(DetectionError::Plate(_))
        ));
    }
}
