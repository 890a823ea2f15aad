//! HTTP compression probe.
//!
//! Sends one `GET` to the site base URL advertising `Accept-Encoding: gzip`
//! and reports whether the answer carries a gzip `Content-Encoding`.  The
//! `ureq` agent is built without its gzip feature, so the header reaches us
//! exactly as the server sent it.
//!
//! The status code does not matter: an error page that is compressed still
//! proves the server compresses.  Anything that prevents reading a response
//! (DNS, refused connection, TLS, timeout) is reported as "not working".
//! There are no retries.

use std::time::Duration;

use tracing::{debug, warn};

use crate::application::toggle_feature::VerificationProbe;

/// Default upper bound for the whole probe request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`VerificationProbe`] hitting the live site over HTTP(S).
pub struct HttpProbe {
    url: String,
    agent: ureq::Agent,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            url: url.into(),
            agent,
        }
    }
}

impl VerificationProbe for HttpProbe {
    fn compression_active(&self) -> bool {
        let response = match self.agent.get(&self.url).set("Accept-Encoding", "gzip").call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => {
                warn!(url = %self.url, error = %e, "compression probe failed");
                return false;
            }
        };

        let encoding = response.header("Content-Encoding");
        debug!(
            url = %self.url,
            status = response.status(),
            ?encoding,
            "compression probe answered"
        );
        header_indicates_gzip(encoding)
    }
}

/// `true` when a `Content-Encoding` value names gzip, in any letter case.
pub fn header_indicates_gzip(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.to_ascii_lowercase().contains("gzip"))
}
