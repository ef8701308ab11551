//! Scripts and messages injected into the embedded page.
//!
//! Every value interpolated into a script goes through `serde_json` so a
//! token can never break out of its string literal.

use crate::PageCommand;
use shell_config_and_utils::DeliveryMode;
use shell_storage::TokenPair;
use std::time::Duration;

/// Page-side function that receives a token pair, if the app registered it.
pub const RECEIVER_HOOK: &str = "receiveTokens";

/// Element the web app mounts into.
pub const ROOT_ELEMENT_ID: &str = "root";

/// DOM event dispatched after the tokens land in page storage.
pub const TOKENS_EVENT: &str = "go2go:tokens";

/// Page storage keys, matching what the web app reads.
pub const PAGE_ACCESS_TOKEN_KEY: &str = "accessToken";
pub const PAGE_REFRESH_TOKEN_KEY: &str = "refreshToken";

fn js_string(value: &str) -> String {
    // Serializing a &str cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Readiness probe run once the page finishes loading.
///
/// Posts `WEBVIEW_READY` as soon as the document is complete, the root
/// element exists and the receiver hook is registered, re-checking every
/// `poll_interval` up to `max_attempts` times. It stays silent after that;
/// the shell runs its own timeout for the give-up.
pub fn readiness_probe_script(poll_interval: Duration, max_attempts: u32) -> String {
    format!(
        r#"(function () {{
  if (window.__go2goProbe) {{ clearInterval(window.__go2goProbe); }}
  var attempts = 0;
  function isReady() {{
    return document.readyState === 'complete'
      && document.getElementById({root}) !== null
      && typeof window[{hook}] === 'function';
  }}
  function report() {{
    window.ReactNativeWebView.postMessage({ready});
  }}
  if (isReady()) {{ report(); return; }}
  window.__go2goProbe = setInterval(function () {{
    attempts += 1;
    if (isReady()) {{
      clearInterval(window.__go2goProbe);
      report();
    }} else if (attempts >= {max_attempts}) {{
      clearInterval(window.__go2goProbe);
    }}
  }}, {interval_ms});
}})();
true;"#,
        root = js_string(ROOT_ELEMENT_ID),
        hook = js_string(RECEIVER_HOOK),
        ready = js_string(crate::PageMessage::WEBVIEW_READY),
        max_attempts = max_attempts,
        interval_ms = poll_interval.as_millis(),
    )
}

/// JSON message carrying the token pair (`{"accessToken":..,"refreshToken":..}`).
pub fn token_message(tokens: &TokenPair) -> String {
    serde_json::to_string(tokens).unwrap_or_default()
}

/// Script writing the pair into page storage, calling the receiver hook
/// and dispatching [`TOKENS_EVENT`].
pub fn token_delivery_script(tokens: &TokenPair) -> String {
    format!(
        r#"(function () {{
  var tokens = {{ accessToken: {access}, refreshToken: {refresh} }};
  try {{
    window.localStorage.setItem({access_key}, tokens.accessToken);
    window.localStorage.setItem({refresh_key}, tokens.refreshToken);
    if (typeof window[{hook}] === 'function') {{
      window[{hook}](tokens);
    }}
    window.dispatchEvent(new CustomEvent({event}, {{ detail: tokens }}));
  }} catch (e) {{
    window.ReactNativeWebView.postMessage({save_error});
  }}
}})();
true;"#,
        access = js_string(&tokens.access_token),
        refresh = js_string(&tokens.refresh_token),
        access_key = js_string(PAGE_ACCESS_TOKEN_KEY),
        refresh_key = js_string(PAGE_REFRESH_TOKEN_KEY),
        hook = js_string(RECEIVER_HOOK),
        event = js_string(TOKENS_EVENT),
        save_error = js_string(crate::PageMessage::TOKEN_SAVED_ERROR),
    )
}

/// Script removing the tokens from page storage; the page answers
/// `TOKENS_CLEARED`.
pub fn clear_tokens_script() -> String {
    format!(
        r#"(function () {{
  try {{
    window.localStorage.removeItem({access_key});
    window.localStorage.removeItem({refresh_key});
  }} finally {{
    window.ReactNativeWebView.postMessage({cleared});
  }}
}})();
true;"#,
        access_key = js_string(PAGE_ACCESS_TOKEN_KEY),
        refresh_key = js_string(PAGE_REFRESH_TOKEN_KEY),
        cleared = js_string(crate::PageMessage::TOKENS_CLEARED),
    )
}

/// Page commands making up one delivery under `mode`.
pub fn delivery_commands(mode: DeliveryMode, tokens: &TokenPair) -> Vec<PageCommand> {
    let mut commands = Vec::with_capacity(2);
    if mode.posts_message() {
        commands.push(PageCommand::PostMessage(token_message(tokens)));
    }
    if mode.injects_script() {
        commands.push(PageCommand::InjectScript(token_delivery_script(tokens)));
    }
    commands
}
