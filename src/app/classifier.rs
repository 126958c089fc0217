//! Classifier client — capture a frame, ship it, decode the verdict.
//!
//! One capture, one POST, one decode.  No retries: a cycle that fails here
//! aborts cleanly and the next detection starts fresh, which keeps worst-case
//! cycle latency bounded by the transport timeout alone.

use crate::app::ports::{CameraPort, CaptureError, HttpPort};
use crate::category::Category;
use crate::error::CycleError;
use log::{debug, warn};
use serde::Deserialize;

/// Wire format of the classifier response: `{"label": ...}`.
///
/// Deployed classifier services disagree on the payload type — some return
/// the category name, others the dense category index — so both are accepted.
#[derive(Deserialize)]
struct ClassifyResponse {
    label: LabelField,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelField {
    Index(u8),
    Name(String),
}

/// Run the full capture → POST → decode pipeline for one cycle.
pub fn classify(
    camera: &mut impl CameraPort,
    http: &mut impl HttpPort,
    url: &str,
) -> Result<Category, CycleError> {
    let frame = camera.capture_jpeg().map_err(|e| {
        warn!("frame capture failed: {:?}", e);
        CycleError::Capture
    })?;
    if frame.is_empty() {
        warn!("frame capture returned an empty buffer");
        return Err(CycleError::Capture);
    }
    debug!("captured {} byte frame", frame.len());

    let response = http.post(url, "image/jpeg", &frame).map_err(|e| {
        warn!("classifier request failed: {:?}", e);
        CycleError::Network
    })?;

    if !(200..300).contains(&response.status) {
        warn!("classifier returned HTTP {}", response.status);
        return Err(CycleError::Network);
    }

    decode_label(&response.body)
}

/// Decode the response body into a routable category.
fn decode_label(body: &[u8]) -> Result<Category, CycleError> {
    let response: ClassifyResponse = serde_json::from_slice(body).map_err(|e| {
        warn!("malformed classifier response: {}", e);
        CycleError::Parse
    })?;

    let category = match &response.label {
        LabelField::Name(name) => Category::from_label(name),
        LabelField::Index(idx) => Category::from_index(*idx),
    };

    category.ok_or_else(|| {
        match response.label {
            LabelField::Name(name) => warn!("classifier label not routable: {:?}", name),
            LabelField::Index(idx) => warn!("classifier index not routable: {}", idx),
        }
        CycleError::UnknownLabel
    })
}
