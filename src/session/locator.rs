//! Element lookup with bounded polling
//!
//! Every lookup is a deadline-bounded poll: the condition is checked at
//! least once, then re-checked every poll interval until it holds or the
//! deadline passes.

use std::time::Duration;

use tokio::time::Instant;

use crate::common::{Error, Result};
use crate::testing::WaitState;
use crate::webdriver::{ElementRef, Locator};

use super::UiDriver;

/// Outcome of polling a text value against a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    /// Whether the predicate held before the deadline
    pub matched: bool,
    /// Last value observed; `None` if the element never appeared
    pub last: Option<String>,
}

/// Deadline plus interval for one polling loop
struct Poll {
    deadline: Instant,
    interval: Duration,
}

impl Poll {
    fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            interval,
        }
    }

    /// Sleep until the next attempt; false once the deadline has passed
    async fn next(&self) -> bool {
        let now = Instant::now();
        if now >= self.deadline {
            return false;
        }
        tokio::time::sleep(self.interval.min(self.deadline - now)).await;
        true
    }
}

/// Treat vanished or stale elements as "not yet" instead of failing
fn missing_as<T>(result: Result<T>, fallback: T) -> Result<T> {
    match result {
        Err(e) if e.is_missing_element() => Ok(fallback),
        other => other,
    }
}

/// Locates elements on a live driver
pub struct ElementLocator<'a> {
    driver: &'a mut dyn UiDriver,
    poll_interval: Duration,
}

impl<'a> ElementLocator<'a> {
    pub fn new(driver: &'a mut dyn UiDriver, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    /// Find the first element matching the locator
    ///
    /// Fails with `ElementNotFound` if nothing matches within the timeout.
    pub async fn find(&mut self, locator: &Locator, timeout: Duration) -> Result<ElementRef> {
        let poll = Poll::new(timeout, self.poll_interval);
        loop {
            let found = missing_as(self.driver.find_elements(locator).await, Vec::new())?;
            if let Some(element) = found.into_iter().next() {
                return Ok(element);
            }
            if !poll.next().await {
                tracing::debug!("{} not found within {:?}", locator, timeout);
                return Err(Error::element_not_found(locator, timeout));
            }
        }
    }

    /// Whether an element matching the locator appears within the timeout
    pub async fn exists(&mut self, locator: &Locator, timeout: Duration) -> Result<bool> {
        self.check(locator, WaitState::Present, timeout).await
    }

    /// Whether no element matches the locator within the timeout
    pub async fn absent(&mut self, locator: &Locator, timeout: Duration) -> Result<bool> {
        self.check(locator, WaitState::Absent, timeout).await
    }

    /// Poll until the element reaches a state
    ///
    /// A missing element is reported as `ElementNotFound`; any other state
    /// that never held becomes an assertion failure.
    pub async fn wait_for(
        &mut self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> Result<()> {
        if self.check(locator, state, timeout).await? {
            return Ok(());
        }

        match state {
            WaitState::Present => Err(Error::element_not_found(locator, timeout)),
            WaitState::Absent => Err(Error::Assertion(format!(
                "{} still present after {:.1}s",
                locator,
                timeout.as_secs_f64()
            ))),
            _ => {
                // Distinguish "never there" from "there but wrong state"
                if self.driver.find_elements(locator).await?.is_empty() {
                    Err(Error::element_not_found(locator, timeout))
                } else {
                    Err(Error::Assertion(format!(
                        "{} did not become {} within {:.1}s",
                        locator,
                        state_name(state),
                        timeout.as_secs_f64()
                    )))
                }
            }
        }
    }

    /// Poll a state without failing on timeout
    pub async fn check(
        &mut self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> Result<bool> {
        let poll = Poll::new(timeout, self.poll_interval);
        loop {
            let holds = self.state_holds(locator, state).await;
            if missing_as(holds, state == WaitState::Absent)? {
                return Ok(true);
            }
            if !poll.next().await {
                return Ok(false);
            }
        }
    }

    /// Poll an element's text until the predicate holds
    pub async fn text_until<F>(
        &mut self,
        locator: &Locator,
        timeout: Duration,
        predicate: F,
    ) -> Result<TextMatch>
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let poll = Poll::new(timeout, self.poll_interval);
        let mut last = None;
        loop {
            let text = missing_as(self.first_text(locator).await.map(Some), None)?;
            if let Some(text) = text {
                if predicate(&text) {
                    return Ok(TextMatch {
                        matched: true,
                        last: Some(text),
                    });
                }
                last = Some(text);
            }
            if !poll.next().await {
                return Ok(TextMatch {
                    matched: false,
                    last,
                });
            }
        }
    }

    /// Poll the current URL until the predicate holds
    pub async fn url_until<F>(&mut self, timeout: Duration, predicate: F) -> Result<TextMatch>
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let poll = Poll::new(timeout, self.poll_interval);
        loop {
            let url = self.driver.current_url().await?;
            if predicate(&url) {
                return Ok(TextMatch {
                    matched: true,
                    last: Some(url),
                });
            }
            if !poll.next().await {
                return Ok(TextMatch {
                    matched: false,
                    last: Some(url),
                });
            }
        }
    }

    async fn first_text(&mut self, locator: &Locator) -> Result<String> {
        let element = self
            .driver
            .find_elements(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::element_not_found(locator, Duration::ZERO))?;
        self.driver.text(&element).await
    }

    async fn state_holds(&mut self, locator: &Locator, state: WaitState) -> Result<bool> {
        let elements = self.driver.find_elements(locator).await?;
        let Some(element) = elements.first() else {
            return Ok(state == WaitState::Absent);
        };

        match state {
            WaitState::Present => Ok(true),
            WaitState::Absent => Ok(false),
            WaitState::Visible => self.driver.is_displayed(element).await,
            WaitState::Enabled => self.driver.is_enabled(element).await,
            WaitState::TextNonEmpty => {
                Ok(!self.driver.text(element).await?.trim().is_empty())
            }
        }
    }
}

fn state_name(state: WaitState) -> &'static str {
    match state {
        WaitState::Present => "present",
        WaitState::Absent => "absent",
        WaitState::Visible => "visible",
        WaitState::Enabled => "enabled",
        WaitState::TextNonEmpty => "non-empty",
    }
}
