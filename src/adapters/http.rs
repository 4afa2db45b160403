//! HTTPS transports for the classification client.
//!
//! | Target | Adapter            | Stack                                 |
//! |--------|--------------------|---------------------------------------|
//! | espidf | `EspHttpTransport` | `EspHttpConnection` + cert bundle     |
//! | host   | `UreqTransport`    | `ureq` blocking agent                 |
//!
//! Both report every response that carried a status line as `Ok`;
//! the client decides what a non-2xx status means.

use std::time::Duration;

#[cfg(not(target_os = "espidf"))]
pub use host::UreqTransport;

#[cfg(target_os = "espidf")]
pub use device::EspHttpTransport;

/// Largest response body read back; web detection replies are a few KiB.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

pub fn timeout_from_secs(secs: u32) -> Duration {
    Duration::from_secs(u64::from(secs.max(1)))
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::io::Read;
    use std::time::Duration;

    use log::debug;

    use crate::app::ports::{HttpResponse, HttpTransport};
    use crate::error::ClassificationError;

    use super::MAX_BODY_BYTES;

    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new(timeout: Duration) -> Self {
            Self {
                agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            }
        }
    }

    fn read_body(resp: ureq::Response) -> Result<Vec<u8>, ClassificationError> {
        let mut body = Vec::new();
        resp.into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| ClassificationError::Transport(format!("reading body: {e}")))?;
        Ok(body)
    }

    impl HttpTransport for UreqTransport {
        fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, ClassificationError> {
            let result = self
                .agent
                .post(url)
                .set("Content-Type", "application/json")
                .send_bytes(body);
            let resp = match result {
                Ok(resp) => resp,
                Err(ureq::Error::Status(code, resp)) => {
                    debug!("http: status {code}");
                    return Ok(HttpResponse {
                        status: code,
                        body: read_body(resp)?,
                    });
                }
                Err(ureq::Error::Transport(t)) => {
                    return Err(ClassificationError::Transport(t.to_string()));
                }
            };
            Ok(HttpResponse {
                status: resp.status(),
                body: read_body(resp)?,
            })
        }
    }
}

#[cfg(target_os = "espidf")]
mod device {
    use std::time::Duration;

    use embedded_svc::http::client::Client;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use esp_idf_svc::io::{Read, Write};

    use crate::app::ports::{HttpResponse, HttpTransport};
    use crate::error::ClassificationError;

    use super::MAX_BODY_BYTES;

    fn transport_err(e: impl core::fmt::Debug) -> ClassificationError {
        ClassificationError::Transport(format!("{e:?}"))
    }

    /// Opens a fresh TLS connection per request.
    pub struct EspHttpTransport {
        timeout: Duration,
    }

    impl EspHttpTransport {
        pub fn new(timeout: Duration) -> Self {
            Self { timeout }
        }
    }

    impl HttpTransport for EspHttpTransport {
        fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, ClassificationError> {
            let conn = EspHttpConnection::new(&Configuration {
                timeout: Some(self.timeout),
                crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
                ..Default::default()
            })
            .map_err(transport_err)?;
            let mut client = Client::wrap(conn);

            let content_length = body.len().to_string();
            let headers = [
                ("Content-Type", "application/json"),
                ("Content-Length", content_length.as_str()),
            ];
            let mut request = client.post(url, &headers).map_err(transport_err)?;
            request.write_all(body).map_err(transport_err)?;
            request.flush().map_err(transport_err)?;
            let mut response = request.submit().map_err(transport_err)?;
            let status = response.status();

            let mut out = Vec::new();
            let mut chunk = [0u8; 512];
            loop {
                let n = response.read(&mut chunk).map_err(transport_err)?;
                if n == 0 || out.len() as u64 >= MAX_BODY_BYTES {
                    break;
                }
                out.extend_from_slice(&chunk[..n]);
            }
            Ok(HttpResponse { status, body: out })
        }
    }
}
