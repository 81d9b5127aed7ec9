//! Chrome DevTools Protocol target implementation.

use std::time::Duration;

use {
    async_trait::async_trait,
    chromiumoxide::{
        Browser, Page,
        cdp::browser_protocol::input::{
            DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
            DispatchMouseEventType, MouseButton,
        },
        handler::HandlerConfig,
    },
    futures::StreamExt,
    serde_json::Value,
    tokio::task::JoinHandle,
    tracing::{debug, info, warn},
};

use {
    promptloop_config::TargetConfig,
    promptloop_engine::{AutomationTarget, TargetError, TargetPage},
};

/// How often the ready-wait re-polls the submit control.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Factory connecting to the remote-debugging endpoint on demand.
pub struct CdpTarget {
    config: TargetConfig,
}

impl CdpTarget {
    pub fn new(config: TargetConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AutomationTarget for CdpTarget {
    async fn locate(&self) -> Result<Box<dyn TargetPage>, TargetError> {
        let ws_url = discover_ws_url(&self.config.cdp_url).await?;
        debug!(ws_url, "connecting to remote browser");

        let (browser, mut handler) =
            Browser::connect_with_config(&ws_url, HandlerConfig::default())
                .await
                .map_err(|e| TargetError::Endpoint(e.to_string()))?;

        // Drain CDP events until the connection closes.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            debug!("browser event handler exited");
        });

        let pages = match browser.pages().await {
            Ok(pages) => pages,
            Err(e) => {
                handler_task.abort();
                return Err(TargetError::Endpoint(e.to_string()));
            },
        };

        for page in pages {
            let url = page.url().await.ok().flatten().unwrap_or_default();
            if url.contains(&self.config.url_fragment) {
                info!(url, "located target page");
                return Ok(Box::new(CdpPage {
                    _browser: browser,
                    page,
                    handler_task,
                    config: self.config.clone(),
                }));
            }
        }

        handler_task.abort();
        warn!(fragment = %self.config.url_fragment, "no open page matched");
        Err(TargetError::PageNotFound {
            fragment: self.config.url_fragment.clone(),
        })
    }
}

/// One attached page. Owns the CDP connection for the duration of a run.
struct CdpPage {
    /// Keeps the websocket alive; dropped (not closed) on release so the
    /// user's browser stays up.
    _browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    config: TargetConfig,
}

#[async_trait]
impl TargetPage for CdpPage {
    async fn open_editor(&self) -> Result<(), TargetError> {
        self.click_selector(&self.config.editor_selector).await
    }

    async fn clear_and_type(&self, text: &str) -> Result<(), TargetError> {
        let selector = &self.config.input_selector;
        // Focus and select-all so the typed text replaces any leftovers.
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.focus();
                if (el.select) el.select();
                else document.execCommand('selectAll');
                return true;
            }})()"#,
            sel = js_string(selector)
        );
        if self.eval(&js).await?.as_bool() != Some(true) {
            return Err(TargetError::Action(format!("no element matches {selector:?}")));
        }

        for c in text.chars() {
            self.dispatch_key(c).await?;
        }
        debug!(chars = text.chars().count(), "typed prompt text");
        Ok(())
    }

    async fn wait_until_ready(&self, timeout: Duration) -> Result<(), TargetError> {
        let selector = &self.config.submit_selector;
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return !!el && !el.disabled;
            }})()"#,
            sel = js_string(selector)
        );

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.eval(&js).await?.as_bool() == Some(true) {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(TargetError::ReadyTimeout { timeout });
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn submit(&self) -> Result<(), TargetError> {
        self.click_selector(&self.config.submit_selector).await
    }

    async fn release(&self) {
        // Dropping the connection detaches from the page; the browser itself
        // is the user's and stays untouched.
        self.handler_task.abort();
        info!("released target page");
    }
}

impl CdpPage {
    async fn eval(&self, js: &str) -> Result<Value, TargetError> {
        self.page
            .evaluate(js)
            .await
            .map_err(map_cdp_error)?
            .into_value()
            .map_err(|e| TargetError::Action(format!("evaluation returned no value: {e}")))
    }

    /// Click the center of the first element matching `selector` with real
    /// dispatched mouse events.
    async fn click_selector(&self, selector: &str) -> Result<(), TargetError> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return null;
                el.scrollIntoView({{ block: 'center' }});
                const r = el.getBoundingClientRect();
                return {{ x: r.x + r.width / 2, y: r.y + r.height / 2 }};
            }})()"#,
            sel = js_string(selector)
        );
        let center = self.eval(&js).await?;
        let (Some(x), Some(y)) = (center["x"].as_f64(), center["y"].as_f64()) else {
            return Err(TargetError::Action(format!("no element matches {selector:?}")));
        };

        for kind in [
            DispatchMouseEventType::MousePressed,
            DispatchMouseEventType::MouseReleased,
        ] {
            let event = DispatchMouseEventParams::builder()
                .r#type(kind)
                .x(x)
                .y(y)
                .button(MouseButton::Left)
                .click_count(1)
                .build()
                .map_err(TargetError::Action)?;
            self.page.execute(event).await.map_err(map_cdp_error)?;
        }
        debug!(selector, x, y, "clicked element");
        Ok(())
    }

    async fn dispatch_key(&self, c: char) -> Result<(), TargetError> {
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let is_key_down = matches!(kind, DispatchKeyEventType::KeyDown);
            let mut builder = DispatchKeyEventParams::builder().r#type(kind);
            if is_key_down {
                builder = builder.text(c.to_string());
            }
            let event = builder.build().map_err(TargetError::Action)?;
            self.page.execute(event).await.map_err(map_cdp_error)?;
        }
        Ok(())
    }
}

/// Resolve the websocket debugger URL from the HTTP endpoint, the same
/// discovery the DevTools frontend performs.
async fn discover_ws_url(cdp_url: &str) -> Result<String, TargetError> {
    let url = format!("{}/json/version", cdp_url.trim_end_matches('/'));
    let version: Value = reqwest::get(&url)
        .await
        .map_err(|e| TargetError::Endpoint(e.to_string()))?
        .json()
        .await
        .map_err(|e| TargetError::Endpoint(e.to_string()))?;

    version["webSocketDebuggerUrl"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| {
            TargetError::Endpoint(format!("{url} did not report webSocketDebuggerUrl"))
        })
}

/// Connection-level failures end the run; anything else is a per-attempt
/// failure.
fn map_cdp_error(e: chromiumoxide::error::CdpError) -> TargetError {
    let message = e.to_string();
    if is_connection_error(&message) {
        TargetError::Endpoint(message)
    } else {
        TargetError::Action(message)
    }
}

fn is_connection_error(message: &str) -> bool {
    message.contains("ConnectionClosed")
        || message.contains("AlreadyClosed")
        || message.contains("Ws(")
}

/// Embed `value` as a JS string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string("button[type='submit']"), r#""button[type='submit']""#);
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
    }

    #[test]
    fn only_connection_failures_are_fatal() {
        assert!(is_connection_error("Ws(ConnectionClosed)"));
        assert!(is_connection_error("send failed: AlreadyClosed"));
        assert!(!is_connection_error("Element not found"));
        assert!(!is_connection_error("evaluation threw"));
    }
}
