//! In-memory driver used by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::testing::TargetConfig;
use crate::webdriver::{ElementRef, Locator, TargetKind};

use super::{Connector, UiDriver};

#[derive(Debug, Clone)]
struct FakeElement {
    text: String,
    enabled: bool,
    /// Lookups that miss before the element shows up
    hidden_for: usize,
}

/// A scripted page: elements are keyed by locator value, regardless of kind
pub struct FakeDriver {
    pub target: TargetKind,
    pub fail_navigate: bool,
    url: String,
    elements: HashMap<String, FakeElement>,
    /// Clicking the key makes the element (id, text) appear
    reveal_on_click: HashMap<String, (String, String)>,
    /// Clicking the key opens a window with this handle
    window_on_click: HashMap<String, String>,
    windows: Vec<String>,
    current_window: String,
    pub clicks: Vec<String>,
    pub typed: Vec<(String, String)>,
    quits: Arc<AtomicUsize>,
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self {
            target: TargetKind::Web,
            fail_navigate: false,
            url: String::new(),
            elements: HashMap::new(),
            reveal_on_click: HashMap::new(),
            window_on_click: HashMap::new(),
            windows: vec!["main".to_string()],
            current_window: "main".to_string(),
            clicks: Vec::new(),
            typed: Vec::new(),
            quits: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeDriver {
    pub fn add_element(&mut self, id: &str, text: &str) {
        self.add_element_after(id, text, 0);
    }

    pub fn add_element_after(&mut self, id: &str, text: &str, misses: usize) {
        self.elements.insert(
            id.to_string(),
            FakeElement {
                text: text.to_string(),
                enabled: true,
                hidden_for: misses,
            },
        );
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.enabled = enabled;
        }
    }

    pub fn reveal_on_click(&mut self, clicked: &str, id: &str, text: &str) {
        self.reveal_on_click
            .insert(clicked.to_string(), (id.to_string(), text.to_string()));
    }

    pub fn open_window_on_click(&mut self, clicked: &str, handle: &str) {
        self.window_on_click
            .insert(clicked.to_string(), handle.to_string());
    }

    fn element(&self, element: &ElementRef) -> Result<&FakeElement> {
        self.elements
            .get(&element.id)
            .ok_or_else(|| Error::webdriver("stale element reference", &element.id))
    }
}

#[async_trait]
impl UiDriver for FakeDriver {
    fn target(&self) -> TargetKind {
        self.target
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        if self.fail_navigate {
            return Err(Error::webdriver("unknown error", "net::ERR_CONNECTION_REFUSED"));
        }
        self.url = url.to_string();
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.url.clone())
    }

    async fn back(&mut self) -> Result<()> {
        Ok(())
    }

    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>> {
        match self.elements.get_mut(&locator.value) {
            Some(element) if element.hidden_for > 0 => {
                element.hidden_for -= 1;
                Ok(Vec::new())
            }
            Some(_) => Ok(vec![ElementRef {
                id: locator.value.clone(),
            }]),
            None => Ok(Vec::new()),
        }
    }

    async fn click(&mut self, element: &ElementRef) -> Result<()> {
        self.element(element)?;
        self.clicks.push(element.id.clone());
        if let Some((id, text)) = self.reveal_on_click.get(&element.id).cloned() {
            self.add_element(&id, &text);
        }
        if let Some(handle) = self.window_on_click.get(&element.id).cloned() {
            self.windows.push(handle);
        }
        Ok(())
    }

    async fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<()> {
        self.element(element)?;
        self.typed.push((element.id.clone(), text.to_string()));
        Ok(())
    }

    async fn clear(&mut self, element: &ElementRef) -> Result<()> {
        self.element(element)?;
        Ok(())
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String> {
        Ok(self.element(element)?.text.clone())
    }

    async fn is_enabled(&mut self, element: &ElementRef) -> Result<bool> {
        Ok(self.element(element)?.enabled)
    }

    async fn is_displayed(&mut self, element: &ElementRef) -> Result<bool> {
        self.element(element).map(|_| true)
    }

    async fn window_handle(&mut self) -> Result<String> {
        Ok(self.current_window.clone())
    }

    async fn window_handles(&mut self) -> Result<Vec<String>> {
        Ok(self.windows.clone())
    }

    async fn switch_to_window(&mut self, handle: &str) -> Result<()> {
        if !self.windows.iter().any(|w| w == handle) {
            return Err(Error::webdriver("no such window", handle));
        }
        self.current_window = handle.to_string();
        Ok(())
    }

    async fn close_window(&mut self) -> Result<()> {
        let current = self.current_window.clone();
        self.windows.retain(|w| *w != current);
        Ok(())
    }

    async fn switch_to_frame(&mut self, _frame: Option<&ElementRef>) -> Result<()> {
        Ok(())
    }

    async fn execute_script(&mut self, _script: &str, args: Vec<Value>) -> Result<Value> {
        // Script clicks resolve to a click on the first argument
        if let Some(id) = args
            .first()
            .and_then(|a| a.get(crate::webdriver::types::ELEMENT_KEY))
            .and_then(|v| v.as_str())
        {
            let element = ElementRef { id: id.to_string() };
            self.click(&element).await?;
        }
        Ok(Value::Null)
    }

    async fn quit(&mut self) -> Result<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out fresh fake drivers and counts their lifecycle calls
pub struct FakeConnector {
    setup: fn(&mut FakeDriver),
    fail: bool,
    quits: Arc<AtomicUsize>,
    connects: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new(setup: fn(&mut FakeDriver)) -> Self {
        Self {
            setup,
            fail: false,
            quits: Arc::new(AtomicUsize::new(0)),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(|_| {})
        }
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, target: &TargetConfig) -> Result<Box<dyn UiDriver>> {
        if self.fail {
            return Err(Error::SessionStart(
                "Remote endpoint http://127.0.0.1:1 unreachable".to_string(),
            ));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);

        let mut driver = FakeDriver {
            target: target.kind,
            quits: Arc::clone(&self.quits),
            ..Default::default()
        };
        (self.setup)(&mut driver);
        Ok(Box::new(driver))
    }
}
