//! Connectivity precheck.

use netmeasure_core::HttpTransport;
use tracing::{debug, warn};

/// Status code the connectivity endpoint answers with when nothing intercepts it
const NO_CONTENT: u16 = 204;

/// Returns true iff `url` answers with exactly 204.
///
/// A captive portal typically answers 200 or a redirect, so any other status
/// counts as offline, as does any transport failure.
pub async fn is_online(http: &dyn HttpTransport, url: &str) -> bool {
    match http.status(url).await {
        Ok(NO_CONTENT) => {
            debug!(url = %url, "connectivity precheck passed");
            true
        }
        Ok(status) => {
            warn!(url = %url, status, "unexpected connectivity status, captive portal?");
            false
        }
        Err(e) => {
            warn!(url = %url, error = %e, "connectivity precheck failed");
            false
        }
    }
}
