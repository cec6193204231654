//! WebDriver wire types
//!
//! These types mirror the W3C WebDriver JSON payloads that uiflow sends and
//! receives. See: https://www.w3.org/TR/webdriver2/
//!
//! Appium endpoints mounted under `/wd/hub` may still answer in the legacy
//! JSON Wire Protocol shape, so parsing accepts both where they differ.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::common::{Error, Result};

/// W3C web element identifier key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// What kind of surface a session controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A browser page
    #[default]
    Web,
    /// A native or Flutter mobile app driven through Appium
    Mobile,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Web => write!(f, "web"),
            TargetKind::Mobile => write!(f, "mobile"),
        }
    }
}

// === Locators ===

/// How a logical widget identifier is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorKind {
    /// DOM id / native resource id
    Id,
    /// CSS class (web) or widget class name (mobile)
    Class,
    Css,
    Xpath,
    /// `name` attribute
    Name,
    /// Tag name, e.g. `iframe`
    Tag,
    LinkText,
    /// Accessibility label (content-desc on Android, accessibilityIdentifier on iOS)
    AccessibilityId,
    /// Flutter `ValueKey<String>`
    ValueKey,
}

impl LocatorKind {
    /// Parse a kind from its suite-file spelling
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "class" | "class_name" => Some(Self::Class),
            "css" | "css_selector" => Some(Self::Css),
            "xpath" => Some(Self::Xpath),
            "name" => Some(Self::Name),
            "tag" | "tag_name" => Some(Self::Tag),
            "link_text" => Some(Self::LinkText),
            "accessibility_id" | "a11y" => Some(Self::AccessibilityId),
            "value_key" | "key" => Some(Self::ValueKey),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Class => "class",
            Self::Css => "css",
            Self::Xpath => "xpath",
            Self::Name => "name",
            Self::Tag => "tag",
            Self::LinkText => "link_text",
            Self::AccessibilityId => "accessibility_id",
            Self::ValueKey => "value_key",
        }
    }
}

/// A (kind, value) pair identifying a UI element
///
/// In suite files a locator is written either as a one-entry map
/// (`{ id: emailInput }`) or as a shorthand string (`"id=emailInput"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLocator")]
pub struct Locator {
    pub kind: LocatorKind,
    pub value: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLocator {
    Short(String),
    Map(HashMap<String, String>),
}

impl TryFrom<RawLocator> for Locator {
    type Error = String;

    fn try_from(raw: RawLocator) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawLocator::Short(s) => Locator::parse(&s).map_err(|e| e.to_string()),
            RawLocator::Map(map) => {
                if map.len() != 1 {
                    return Err(format!(
                        "locator must have exactly one kind, got {}",
                        map.len()
                    ));
                }
                let (kind, value) = map.into_iter().next().ok_or("empty locator")?;
                let kind = LocatorKind::parse(&kind)
                    .ok_or_else(|| format!("unknown locator kind '{}'", kind))?;
                Ok(Locator { kind, value })
            }
        }
    }
}

impl Locator {
    pub fn new(kind: LocatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Parse a shorthand locator string
    ///
    /// Formats:
    /// - `id=emailInput`
    /// - `accessibility_id=ChatGPTCheckbox`
    /// - `xpath=//div[@id='a']` (only the first `=` separates kind from value)
    pub fn parse(s: &str) -> Result<Self> {
        let (kind, value) = s
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("Invalid locator '{}': expected kind=value", s)))?;

        let kind = LocatorKind::parse(kind)
            .ok_or_else(|| Error::Config(format!("Unknown locator kind '{}' in '{}'", kind, s)))?;

        if value.is_empty() {
            return Err(Error::Config(format!("Empty locator value in '{}'", s)));
        }

        Ok(Self::new(kind, value))
    }

    /// Translate to a W3C locator strategy for the given target
    pub fn to_wire(&self, target: TargetKind) -> Result<WireLocator> {
        let (using, value) = match (target, self.kind) {
            (TargetKind::Web, LocatorKind::Id) => {
                ("css selector", format!("[id=\"{}\"]", escape_css_string(&self.value)))
            }
            (TargetKind::Web, LocatorKind::Name) => {
                ("css selector", format!("[name=\"{}\"]", escape_css_string(&self.value)))
            }
            (TargetKind::Web, LocatorKind::Class) => {
                ("css selector", format!(".{}", escape_css_ident(&self.value)))
            }
            (TargetKind::Web, LocatorKind::Tag) => ("tag name", self.value.clone()),
            (TargetKind::Web, LocatorKind::LinkText) => ("link text", self.value.clone()),
            (TargetKind::Mobile, LocatorKind::Id) => ("id", self.value.clone()),
            (TargetKind::Mobile, LocatorKind::Name) => ("name", self.value.clone()),
            (TargetKind::Mobile, LocatorKind::Class) => ("class name", self.value.clone()),
            (TargetKind::Mobile, LocatorKind::AccessibilityId) => {
                ("accessibility id", self.value.clone())
            }
            (TargetKind::Mobile, LocatorKind::ValueKey) => ("-flutter key", self.value.clone()),
            (_, LocatorKind::Css) => ("css selector", self.value.clone()),
            (_, LocatorKind::Xpath) => ("xpath", self.value.clone()),
            _ => {
                return Err(Error::UnsupportedLocator {
                    locator: self.to_string(),
                    target: target.to_string(),
                })
            }
        };

        Ok(WireLocator {
            using: using.to_string(),
            value,
        })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind.as_str(), self.value)
    }
}

/// Escape a value for use inside a double-quoted CSS attribute selector
fn escape_css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a value for use as a CSS identifier (class name)
fn escape_css_ident(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            if i == 0 && c.is_ascii_digit() {
                out.push_str(&format!("\\{:x} ", c as u32));
            } else {
                out.push(c);
            }
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Locator strategy as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLocator {
    pub using: String,
    pub value: String,
}

// === Elements ===

/// A web element reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawElementRef")]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

/// Element reference as received; Appium may send both keys at once
#[derive(Deserialize)]
struct RawElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    w3c: Option<String>,
    #[serde(rename = "ELEMENT")]
    legacy: Option<String>,
}

impl TryFrom<RawElementRef> for ElementRef {
    type Error = &'static str;

    fn try_from(raw: RawElementRef) -> std::result::Result<Self, Self::Error> {
        raw.w3c
            .or(raw.legacy)
            .map(|id| ElementRef { id })
            .ok_or("element reference without an element key")
    }
}

impl ElementRef {
    /// JSON form used when passing the element as a script argument
    pub fn to_json(&self) -> Value {
        serde_json::json!({ ELEMENT_KEY: self.id })
    }
}

// === Responses ===

/// Error body of a failed command
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Result of `GET /status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub message: String,
}

/// Session created by `POST /session`
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: String,
    pub capabilities: Value,
}

impl NewSession {
    /// Parse a new-session response body
    ///
    /// W3C puts `sessionId` inside `value`; the legacy wire protocol puts
    /// it at the top level next to a `value` holding the capabilities.
    pub fn from_response(body: &Value) -> Result<Self> {
        let value = body.get("value").cloned().unwrap_or(Value::Null);

        if let Some(id) = value.get("sessionId").and_then(|v| v.as_str()) {
            return Ok(Self {
                session_id: id.to_string(),
                capabilities: value.get("capabilities").cloned().unwrap_or(Value::Null),
            });
        }

        if let Some(id) = body.get("sessionId").and_then(|v| v.as_str()) {
            return Ok(Self {
                session_id: id.to_string(),
                capabilities: value,
            });
        }

        Err(Error::WebDriverProtocol(format!(
            "New session response has no sessionId: {}",
            body
        )))
    }
}

/// Session timeouts (milliseconds)
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timeouts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<u64>,
    #[serde(rename = "pageLoad", skip_serializing_if = "Option::is_none")]
    pub page_load: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_parse_shorthand() {
        let loc = Locator::parse("id=emailInput").unwrap();
        assert_eq!(loc.kind, LocatorKind::Id);
        assert_eq!(loc.value, "emailInput");

        let loc = Locator::parse("xpath=//*[@id='identifierId']").unwrap();
        assert_eq!(loc.kind, LocatorKind::Xpath);
        assert_eq!(loc.value, "//*[@id='identifierId']");

        assert!(Locator::parse("emailInput").is_err());
        assert!(Locator::parse("shadow=foo").is_err());
        assert!(Locator::parse("id=").is_err());
    }

    #[test]
    fn test_locator_from_yaml_forms() {
        let loc: Locator = serde_yaml::from_str("{ accessibility_id: ChatGPTCheckbox }").unwrap();
        assert_eq!(loc, Locator::new(LocatorKind::AccessibilityId, "ChatGPTCheckbox"));

        let loc: Locator = serde_yaml::from_str("\"class=btn-login\"").unwrap();
        assert_eq!(loc, Locator::new(LocatorKind::Class, "btn-login"));

        let err = serde_yaml::from_str::<Locator>("{ id: a, class: b }");
        assert!(err.is_err());
    }

    #[test]
    fn test_web_wire_mapping() {
        let wire = Locator::new(LocatorKind::Id, "emailInput")
            .to_wire(TargetKind::Web)
            .unwrap();
        assert_eq!(wire.using, "css selector");
        assert_eq!(wire.value, "[id=\"emailInput\"]");

        let wire = Locator::new(LocatorKind::Class, "nsm7Bb-HzV7m-LgbsSe")
            .to_wire(TargetKind::Web)
            .unwrap();
        assert_eq!(wire.value, ".nsm7Bb-HzV7m-LgbsSe");

        let wire = Locator::new(LocatorKind::Name, "identifier")
            .to_wire(TargetKind::Web)
            .unwrap();
        assert_eq!(wire.value, "[name=\"identifier\"]");

        let wire = Locator::new(LocatorKind::Tag, "iframe")
            .to_wire(TargetKind::Web)
            .unwrap();
        assert_eq!(wire.using, "tag name");
    }

    #[test]
    fn test_mobile_wire_mapping() {
        let wire = Locator::new(LocatorKind::AccessibilityId, "SendSurveyButton")
            .to_wire(TargetKind::Mobile)
            .unwrap();
        assert_eq!(wire.using, "accessibility id");
        assert_eq!(wire.value, "SendSurveyButton");

        let wire = Locator::new(LocatorKind::ValueKey, "CityField")
            .to_wire(TargetKind::Mobile)
            .unwrap();
        assert_eq!(wire.using, "-flutter key");
    }

    #[test]
    fn test_unsupported_locator() {
        let err = Locator::new(LocatorKind::AccessibilityId, "x")
            .to_wire(TargetKind::Web)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedLocator { .. }));

        let err = Locator::new(LocatorKind::LinkText, "Sign in")
            .to_wire(TargetKind::Mobile)
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG");
    }

    #[test]
    fn test_css_escaping() {
        assert_eq!(escape_css_string(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_css_ident("btn.login"), "btn\\.login");
        assert_eq!(escape_css_ident("1col"), "\\31 col");
    }

    #[test]
    fn test_element_ref_accepts_both_keys() {
        let w3c: ElementRef =
            serde_json::from_value(serde_json::json!({ ELEMENT_KEY: "abc" })).unwrap();
        assert_eq!(w3c.id, "abc");

        let legacy: ElementRef =
            serde_json::from_value(serde_json::json!({ "ELEMENT": "xyz" })).unwrap();
        assert_eq!(legacy.id, "xyz");

        assert_eq!(legacy.to_json()[ELEMENT_KEY], "xyz");

        let both: ElementRef = serde_json::from_value(
            serde_json::json!({ ELEMENT_KEY: "abc", "ELEMENT": "abc" }),
        )
        .unwrap();
        assert_eq!(both.id, "abc");

        assert!(serde_json::from_value::<ElementRef>(serde_json::json!({})).is_err());
    }

    #[test]
    fn test_new_session_shapes() {
        let w3c = serde_json::json!({
            "value": { "sessionId": "s1", "capabilities": { "browserName": "chrome" } }
        });
        let session = NewSession::from_response(&w3c).unwrap();
        assert_eq!(session.session_id, "s1");
        assert_eq!(session.capabilities["browserName"], "chrome");

        let legacy = serde_json::json!({
            "sessionId": "s2", "status": 0, "value": { "platformName": "Android" }
        });
        let session = NewSession::from_response(&legacy).unwrap();
        assert_eq!(session.session_id, "s2");
        assert_eq!(session.capabilities["platformName"], "Android");

        assert!(NewSession::from_response(&serde_json::json!({ "value": {} })).is_err());
    }

    #[test]
    fn test_timeouts_serialization() {
        let t = Timeouts {
            page_load: Some(30_000),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&t).unwrap(),
            serde_json::json!({ "pageLoad": 30000 })
        );
    }
}
