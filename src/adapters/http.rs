//! HTTP client adapter.
//!
//! Implements [`HttpPort`] over the ESP-IDF `esp_http_client` API.  One
//! blocking request per call; TLS goes through the IDF certificate bundle.
//! On the host the adapter returns a configurable canned response so the
//! simulation loop classifies without a live service.

use crate::app::ports::{HttpPort, HttpResponse, TransportError};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use log::debug;

/// Per-request timeout. Covers connect + write + read; a stalled service
/// costs at most this much per cycle.
const HTTP_TIMEOUT_MS: i32 = 10_000;

pub struct HttpClientAdapter {
    #[cfg(not(target_os = "espidf"))]
    sim_status: u16,
    #[cfg(not(target_os = "espidf"))]
    sim_body: Vec<u8>,
}

impl HttpClientAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            sim_status: 200,
            #[cfg(not(target_os = "espidf"))]
            sim_body: br#"{"label": "plastic"}"#.to_vec(),
        }
    }

    /// Override the canned response served on non-device targets.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_response(&mut self, status: u16, body: &[u8]) {
        self.sim_status = status;
        self.sim_body = body.to_vec();
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_post(
        &mut self,
        url: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        let url_c = std::ffi::CString::new(url).map_err(|_| TransportError::Connect)?;
        let ct_c = std::ffi::CString::new(content_type).map_err(|_| TransportError::Connect)?;

        // SAFETY: client handle is created, used and cleaned up entirely
        // within this call from the single control task.
        unsafe {
            let cfg = esp_http_client_config_t {
                url: url_c.as_ptr(),
                timeout_ms: HTTP_TIMEOUT_MS,
                crt_bundle_attach: Some(esp_crt_bundle_attach),
                ..Default::default()
            };
            let client = esp_http_client_init(&cfg);
            if client.is_null() {
                return Err(TransportError::Connect);
            }

            let result = Self::perform(client, ct_c.as_ptr(), body);
            esp_http_client_cleanup(client);
            result
        }
    }

    /// SAFETY: `client` must be a live handle owned by the caller, which is
    /// also responsible for cleanup regardless of the result.
    #[cfg(target_os = "espidf")]
    unsafe fn perform(
        client: esp_http_client_handle_t,
        content_type: *const core::ffi::c_char,
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        unsafe {
            esp_http_client_set_method(client, esp_http_client_method_t_HTTP_METHOD_POST);
            esp_http_client_set_header(
                client,
                b"Content-Type\0".as_ptr() as *const _,
                content_type,
            );

            if esp_http_client_open(client, body.len() as i32) != ESP_OK {
                return Err(TransportError::Connect);
            }

            let written = esp_http_client_write(client, body.as_ptr() as *const _, body.len() as i32);
            if written < body.len() as i32 {
                return Err(TransportError::Write);
            }

            if esp_http_client_fetch_headers(client) < 0 {
                return Err(TransportError::Read);
            }
            let status = esp_http_client_get_status_code(client) as u16;

            let mut response = Vec::new();
            let mut chunk = [0u8; 512];
            loop {
                let n = esp_http_client_read(
                    client,
                    chunk.as_mut_ptr() as *mut _,
                    chunk.len() as i32,
                );
                if n < 0 {
                    return Err(TransportError::Read);
                }
                if n == 0 {
                    break;
                }
                response.extend_from_slice(&chunk[..n as usize]);
            }
            esp_http_client_close(client);

            Ok(HttpResponse { status, body: response })
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_post(
        &mut self,
        url: &str,
        _content_type: &str,
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        debug!("HTTP(sim): POST {} ({} bytes)", url, body.len());
        Ok(HttpResponse {
            status: self.sim_status,
            body: self.sim_body.clone(),
        })
    }
}

impl Default for HttpClientAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPort for HttpClientAdapter {
    fn post(
        &mut self,
        url: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        self.platform_post(url, content_type, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_serves_the_canned_response() {
        let mut http = HttpClientAdapter::new();
        let resp = http.post("http://x/classify", "image/jpeg", &[1, 2, 3]).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, br#"{"label": "plastic"}"#);
    }

    #[test]
    fn sim_response_is_overridable() {
        let mut http = HttpClientAdapter::new();
        http.set_sim_response(503, b"busy");
        let resp = http.post("http://x/classify", "image/jpeg", &[0]).unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, b"busy");
    }
}
