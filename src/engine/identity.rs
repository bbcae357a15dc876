use log::{debug, info};
use thiserror::Error;

pub const HOST_INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";
pub const DEBUG_USER_HEADER: &str = "X-Debug-Tg-Id";
pub const TUNNEL_BYPASS_HEADER: &str = "bypass-tunnel-reminder";

#[derive(Debug, Error)]
#[error("host bridge error: {0}")]
pub struct HostError(pub String);

/// The embedding host surface, as far as the client cares about it.
pub trait HostBridge {
    /// The opaque session token handed over by the host, if any.
    fn init_data(&self) -> Result<Option<String>, HostError>;

    /// Ask the host to maximise its viewport. `Ok(false)` when the host
    /// has no such capability.
    fn expand_viewport(&self) -> Result<bool, HostError>;
}

/// Used when the client runs outside any host.
pub struct NoHost;

impl HostBridge for NoHost {
    fn init_data(&self) -> Result<Option<String>, HostError> {
        Ok(None)
    }

    fn expand_viewport(&self) -> Result<bool, HostError> {
        Ok(false)
    }
}

/// Result of the best-effort viewport expansion done on host detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportOutcome {
    Succeeded,
    Unavailable,
    FailedIgnored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Host,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AuthMode {
    Host { init_data: String },
    Debug { user_id: String },
}

/// Authentication metadata for one session. Decided once by [`Identity::resolve`];
/// host mode is sticky for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Identity {
    mode: AuthMode,
    tunnel_bypass: bool,
    viewport: Option<ViewportOutcome>,
}

impl Identity {
    pub fn resolve(
        bridge: &dyn HostBridge,
        debug_user_id: impl Into<String>,
        tunnel_bypass: bool,
    ) -> Self {
        let init_data = match bridge.init_data() {
            Ok(data) => data.filter(|d| !d.trim().is_empty()),
            Err(e) => {
                debug!("Host token lookup failed, using debug identity: {}", e);
                None
            }
        };

        let Some(init_data) = init_data else {
            info!("No host token found; running in debug identity mode");
            return Self::debug(debug_user_id, tunnel_bypass);
        };

        let viewport = match bridge.expand_viewport() {
            Ok(true) => ViewportOutcome::Succeeded,
            Ok(false) => ViewportOutcome::Unavailable,
            Err(e) => {
                debug!("Viewport expansion failed (ignored): {}", e);
                ViewportOutcome::FailedIgnored
            }
        };

        info!("Host token found; running in host-authenticated mode");
        Self {
            mode: AuthMode::Host { init_data },
            tunnel_bypass,
            viewport: Some(viewport),
        }
    }

    pub fn debug(user_id: impl Into<String>, tunnel_bypass: bool) -> Self {
        Self {
            mode: AuthMode::Debug {
                user_id: user_id.into(),
            },
            tunnel_bypass,
            viewport: None,
        }
    }

    pub fn kind(&self) -> AuthKind {
        match self.mode {
            AuthMode::Host { .. } => AuthKind::Host,
            AuthMode::Debug { .. } => AuthKind::Debug,
        }
    }

    pub fn is_host(&self) -> bool {
        self.kind() == AuthKind::Host
    }

    /// `None` when no host was detected and nothing was attempted.
    pub fn viewport(&self) -> Option<ViewportOutcome> {
        self.viewport
    }

    pub fn debug_user_id(&self) -> Option<&str> {
        match &self.mode {
            AuthMode::Debug { user_id } => Some(user_id),
            AuthMode::Host { .. } => None,
        }
    }

    /// Replace the debug identifier. Ignored (returns `false`) in host mode.
    pub fn set_debug_user_id(&mut self, id: impl Into<String>) -> bool {
        match &mut self.mode {
            AuthMode::Debug { user_id } => {
                *user_id = id.into();
                true
            }
            AuthMode::Host { .. } => false,
        }
    }

    /// Headers to attach to every request.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = match &self.mode {
            AuthMode::Host { init_data } => vec![(HOST_INIT_DATA_HEADER, init_data.clone())],
            AuthMode::Debug { user_id } => vec![(DEBUG_USER_HEADER, user_id.trim().to_string())],
        };

        if self.tunnel_bypass {
            headers.push((TUNNEL_BYPASS_HEADER, "1".to_string()));
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeHost {
        token: Result<Option<String>, String>,
        expand: Result<bool, String>,
        expand_calls: Cell<u32>,
    }

    impl FakeHost {
        fn new(token: Result<Option<String>, String>, expand: Result<bool, String>) -> Self {
            Self {
                token,
                expand,
                expand_calls: Cell::new(0),
            }
        }
    }

    impl HostBridge for FakeHost {
        fn init_data(&self) -> Result<Option<String>, HostError> {
            self.token.clone().map_err(HostError)
        }

        fn expand_viewport(&self) -> Result<bool, HostError> {
            self.expand_calls.set(self.expand_calls.get() + 1);
            self.expand.clone().map_err(HostError)
        }
    }

    fn header<'a>(headers: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn host_token_wins_and_expands_viewport() {
        let host = FakeHost::new(Ok(Some("query_id=abc".into())), Ok(true));
        let identity = Identity::resolve(&host, "12345", true);

        assert_eq!(identity.kind(), AuthKind::Host);
        assert_eq!(identity.viewport(), Some(ViewportOutcome::Succeeded));
        assert_eq!(host.expand_calls.get(), 1);

        let headers = identity.headers();
        assert_eq!(header(&headers, HOST_INIT_DATA_HEADER), Some("query_id=abc"));
        assert_eq!(header(&headers, DEBUG_USER_HEADER), None);
        assert_eq!(header(&headers, TUNNEL_BYPASS_HEADER), Some("1"));
    }

    #[test]
    fn host_mode_ignores_debug_id_edits() {
        let host = FakeHost::new(Ok(Some("token".into())), Ok(false));
        let mut identity = Identity::resolve(&host, "12345", false);

        assert!(!identity.set_debug_user_id("999"));
        assert_eq!(identity.debug_user_id(), None);
        assert_eq!(identity.viewport(), Some(ViewportOutcome::Unavailable));

        let headers = identity.headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(header(&headers, DEBUG_USER_HEADER), None);
    }

    #[test]
    fn viewport_failure_does_not_block_host_mode() {
        let host = FakeHost::new(Ok(Some("token".into())), Err("no webview".into()));
        let identity = Identity::resolve(&host, "12345", true);

        assert!(identity.is_host());
        assert_eq!(identity.viewport(), Some(ViewportOutcome::FailedIgnored));
    }

    #[test]
    fn empty_token_means_debug_mode() {
        let host = FakeHost::new(Ok(Some("   ".into())), Ok(true));
        let identity = Identity::resolve(&host, "12345", true);

        assert_eq!(identity.kind(), AuthKind::Debug);
        assert_eq!(identity.viewport(), None);
        assert_eq!(host.expand_calls.get(), 0);
    }

    #[test]
    fn host_error_falls_back_to_debug() {
        let host = FakeHost::new(Err("bridge exploded".into()), Ok(true));
        let mut identity = Identity::resolve(&host, "12345", false);

        assert_eq!(identity.kind(), AuthKind::Debug);
        assert_eq!(header(&identity.headers(), DEBUG_USER_HEADER), Some("12345"));

        assert!(identity.set_debug_user_id(" 777 "));
        assert_eq!(header(&identity.headers(), DEBUG_USER_HEADER), Some("777"));
    }

    #[test]
    fn no_host_is_debug() {
        let identity = Identity::resolve(&NoHost, "42", false);
        assert_eq!(identity.debug_user_id(), Some("42"));
        assert_eq!(identity.headers(), vec![(DEBUG_USER_HEADER, "42".to_string())]);
    }
}
