//! Mock WebDriver endpoint for integration testing
//!
//! This binary implements enough of the W3C WebDriver HTTP protocol to run
//! suites without a browser or a device. Sessions created with web
//! capabilities get a simulated login page; sessions with a mobile
//! `platformName` get a simulated survey app. Session lifecycle events are
//! printed to stdout so tests can count them.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde_json::{json, Value};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const MAIN_WINDOW: &str = "main-window";
const POPUP_WINDOW: &str = "google-popup";
const NATIVE_CONTEXT: &str = "NATIVE_APP";

/// Positional XPaths used by the extended login suite
const GOOGLE_BUTTON_XPATH: &str = "/html/body/div/div[3]/div[2]/div/div/div/div[2]";
const NEXT_BUTTON_XPATH: &str =
    "/html/body/div[1]/div[1]/div[2]/c-wiz/div/div[3]/div/div[1]/div/div/button/div[3]";

const USERS: &[(&str, &str)] = &[
    ("john@example.com", "12345"),
    ("test@example.com", "12345"),
    ("5551234567", "phonePass"),
];

/// The page drops non-ASCII characters and collapses repeated `@` before lookup
fn normalize_login(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars().filter(char::is_ascii) {
        if c == '@' && out.ends_with('@') {
            continue;
        }
        out.push(c);
    }
    out
}

#[derive(Parser)]
#[command(name = "mock_webdriver", about = "Mock WebDriver endpoint for tests")]
struct Args {
    /// Port to listen on (0 picks a free one)
    #[arg(long, default_value = "0")]
    port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let state = Shared::default();

    let api = Router::new()
        .route("/status", get(status))
        .route("/session", post(new_session))
        .route("/session/:sid", axum::routing::delete(delete_session))
        .route("/session/:sid/timeouts", post(timeouts))
        .route("/session/:sid/url", get(current_url).post(navigate))
        .route("/session/:sid/back", post(back))
        .route("/session/:sid/elements", post(find_elements))
        .route("/session/:sid/element/:eid/click", post(click))
        .route("/session/:sid/element/:eid/value", post(send_keys))
        .route("/session/:sid/element/:eid/clear", post(clear))
        .route("/session/:sid/element/:eid/text", get(text))
        .route("/session/:sid/element/:eid/enabled", get(enabled))
        .route("/session/:sid/element/:eid/displayed", get(displayed))
        .route(
            "/session/:sid/window",
            get(window_handle).post(switch_window).delete(close_window),
        )
        .route("/session/:sid/window/handles", get(window_handles))
        .route("/session/:sid/frame", post(switch_frame))
        .route("/session/:sid/execute/sync", post(execute));

    // Appium servers are commonly mounted under /wd/hub
    let app = Router::new()
        .nest("/wd/hub", api.clone())
        .merge(api)
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("mock webdriver failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(local) => println!("mock webdriver listening at: {}", local),
        Err(e) => {
            eprintln!("mock webdriver has no local address: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("mock webdriver stopped: {}", e);
        std::process::exit(1);
    }
}

// ============== Protocol plumbing ==============

#[derive(Clone, Default)]
struct Shared {
    inner: Arc<Mutex<Sessions>>,
}

#[derive(Default)]
struct Sessions {
    next_id: u64,
    live: HashMap<String, Box<dyn SimulatedApp>>,
}

#[derive(Debug)]
struct MockError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl MockError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    fn stale(id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "stale element reference",
            format!("element {} is no longer attached", id),
        )
    }

    fn no_such_window(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "no such window", what)
    }

    fn unsupported(what: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "unsupported operation", what)
    }
}

type Reply = Result<Value, MockError>;

fn respond(reply: Reply) -> Response {
    match reply {
        Ok(value) => Json(json!({ "value": value })).into_response(),
        Err(e) => (
            e.status,
            Json(json!({
                "value": { "error": e.error, "message": e.message, "stacktrace": "" }
            })),
        )
            .into_response(),
    }
}

fn with_app<F>(state: &Shared, sid: &str, f: F) -> Response
where
    F: FnOnce(&mut dyn SimulatedApp) -> Reply,
{
    let mut sessions = match state.inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let reply = match sessions.live.get_mut(sid) {
        Some(app) => f(app.as_mut()),
        None => Err(MockError::new(
            StatusCode::NOT_FOUND,
            "invalid session id",
            format!("session {} does not exist", sid),
        )),
    };
    respond(reply)
}

fn element_ref(id: &str) -> Value {
    json!({ ELEMENT_KEY: id, "ELEMENT": id })
}

fn element_id(value: &Value) -> Option<&str> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get("ELEMENT"))
        .and_then(Value::as_str)
}

async fn status() -> Response {
    respond(Ok(json!({ "ready": true, "message": "mock webdriver ready" })))
}

async fn new_session(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let caps = body
        .pointer("/capabilities/alwaysMatch")
        .or_else(|| body.get("desiredCapabilities"))
        .cloned()
        .unwrap_or_else(|| json!({}));

    let mobile = caps.get("platformName").and_then(Value::as_str).is_some();
    let app: Box<dyn SimulatedApp> = if mobile {
        Box::new(SurveyApp::default())
    } else {
        Box::new(LoginPage::new())
    };

    let mut sessions = match state.inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    sessions.next_id += 1;
    let id = format!("mock-{}", sessions.next_id);
    sessions.live.insert(id.clone(), app);

    println!(
        "session created {} ({})",
        id,
        if mobile { "mobile" } else { "web" }
    );
    respond(Ok(json!({ "sessionId": id, "capabilities": caps })))
}

async fn delete_session(State(state): State<Shared>, Path(sid): Path<String>) -> Response {
    let mut sessions = match state.inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    match sessions.live.remove(&sid) {
        Some(_) => {
            println!("session deleted {}", sid);
            respond(Ok(Value::Null))
        }
        None => respond(Err(MockError::new(
            StatusCode::NOT_FOUND,
            "invalid session id",
            format!("session {} does not exist", sid),
        ))),
    }
}

async fn timeouts(State(state): State<Shared>, Path(sid): Path<String>) -> Response {
    with_app(&state, &sid, |_| Ok(Value::Null))
}

async fn current_url(State(state): State<Shared>, Path(sid): Path<String>) -> Response {
    with_app(&state, &sid, |app| app.url().map(Value::from))
}

async fn navigate(
    State(state): State<Shared>,
    Path(sid): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let url = body["url"].as_str().unwrap_or_default().to_string();
    with_app(&state, &sid, |app| app.navigate(&url).map(|_| Value::Null))
}

async fn back(State(state): State<Shared>, Path(sid): Path<String>) -> Response {
    with_app(&state, &sid, |app| app.back().map(|_| Value::Null))
}

async fn find_elements(
    State(state): State<Shared>,
    Path(sid): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let using = body["using"].as_str().unwrap_or_default().to_string();
    let value = body["value"].as_str().unwrap_or_default().to_string();
    let query = Query::parse(&using, &value);
    with_app(&state, &sid, |app| {
        let found: Vec<Value> = app
            .elements()?
            .iter()
            .filter(|el| query.matches(el))
            .map(|el| element_ref(el.id))
            .collect();
        Ok(Value::Array(found))
    })
}

async fn click(State(state): State<Shared>, Path((sid, eid)): Path<(String, String)>) -> Response {
    with_app(&state, &sid, |app| {
        app.require(&eid)?;
        app.click(&eid).map(|_| Value::Null)
    })
}

async fn send_keys(
    State(state): State<Shared>,
    Path((sid, eid)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let text = body["text"].as_str().unwrap_or_default().to_string();
    with_app(&state, &sid, |app| {
        app.require(&eid)?;
        app.type_text(&eid, &text).map(|_| Value::Null)
    })
}

async fn clear(State(state): State<Shared>, Path((sid, eid)): Path<(String, String)>) -> Response {
    with_app(&state, &sid, |app| {
        app.require(&eid)?;
        app.clear(&eid).map(|_| Value::Null)
    })
}

async fn text(State(state): State<Shared>, Path((sid, eid)): Path<(String, String)>) -> Response {
    with_app(&state, &sid, |app| {
        app.require(&eid)?;
        Ok(Value::from(app.text(&eid)))
    })
}

async fn enabled(
    State(state): State<Shared>,
    Path((sid, eid)): Path<(String, String)>,
) -> Response {
    with_app(&state, &sid, |app| {
        app.require(&eid)?;
        Ok(Value::Bool(true))
    })
}

async fn displayed(
    State(state): State<Shared>,
    Path((sid, eid)): Path<(String, String)>,
) -> Response {
    with_app(&state, &sid, |app| {
        app.require(&eid)?;
        Ok(Value::Bool(true))
    })
}

async fn window_handle(State(state): State<Shared>, Path(sid): Path<String>) -> Response {
    with_app(&state, &sid, |app| app.window_handle().map(Value::from))
}

async fn window_handles(State(state): State<Shared>, Path(sid): Path<String>) -> Response {
    with_app(&state, &sid, |app| Ok(json!(app.window_handles())))
}

async fn switch_window(
    State(state): State<Shared>,
    Path(sid): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let handle = body["handle"].as_str().unwrap_or_default().to_string();
    with_app(&state, &sid, |app| {
        app.switch_window(&handle).map(|_| Value::Null)
    })
}

async fn close_window(State(state): State<Shared>, Path(sid): Path<String>) -> Response {
    with_app(&state, &sid, |app| {
        app.close_window()?;
        Ok(json!(app.window_handles()))
    })
}

async fn switch_frame(
    State(state): State<Shared>,
    Path(sid): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let frame = element_id(&body["id"]).map(str::to_string);
    with_app(&state, &sid, |app| {
        app.switch_frame(frame.as_deref()).map(|_| Value::Null)
    })
}

async fn execute(
    State(state): State<Shared>,
    Path(sid): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let script = body["script"].as_str().unwrap_or_default().to_string();
    let target = body["args"]
        .get(0)
        .and_then(element_id)
        .map(str::to_string);

    with_app(&state, &sid, |app| {
        if script.contains(".click()") {
            let id = target.ok_or_else(|| {
                MockError::new(StatusCode::BAD_REQUEST, "invalid argument", "click needs an element")
            })?;
            app.require(&id)?;
            app.click(&id)?;
        }
        Ok(Value::Null)
    })
}

// ============== Element model ==============

/// A simulated element, addressable by id, class, name, tag or XPath
#[derive(Clone, Copy, Default)]
struct El {
    id: &'static str,
    class: &'static str,
    name: &'static str,
    tag: &'static str,
    xpath: &'static str,
}

impl El {
    fn id(id: &'static str) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

enum Query {
    Id(String),
    Name(String),
    Class(String),
    Tag(String),
    XPath(String),
    Unsupported,
}

impl Query {
    fn parse(using: &str, value: &str) -> Self {
        match using {
            "css selector" => {
                if let Some(v) = strip_attr(value, "id") {
                    Query::Id(v)
                } else if let Some(v) = strip_attr(value, "name") {
                    Query::Name(v)
                } else if let Some(v) = value.strip_prefix('#') {
                    Query::Id(unescape(v))
                } else if let Some(v) = value.strip_prefix('.') {
                    Query::Class(unescape(v))
                } else {
                    Query::Tag(value.to_string())
                }
            }
            "tag name" => Query::Tag(value.to_string()),
            "xpath" => match value
                .strip_prefix("//*[@id='")
                .and_then(|v| v.strip_suffix("']"))
            {
                Some(id) => Query::Id(id.to_string()),
                None => Query::XPath(value.to_string()),
            },
            "id" | "accessibility id" | "-flutter key" => Query::Id(value.to_string()),
            "name" => Query::Name(value.to_string()),
            "class name" => Query::Class(value.to_string()),
            _ => Query::Unsupported,
        }
    }

    fn matches(&self, el: &El) -> bool {
        match self {
            Query::Id(v) => el.id == v,
            Query::Name(v) => !el.name.is_empty() && el.name == v,
            Query::Class(v) => el.class.split_whitespace().any(|c| c == v),
            Query::Tag(v) => !el.tag.is_empty() && el.tag.eq_ignore_ascii_case(v),
            Query::XPath(v) => !el.xpath.is_empty() && el.xpath == v,
            Query::Unsupported => false,
        }
    }
}

/// `[attr="value"]` to `value`
fn strip_attr(selector: &str, attr: &str) -> Option<String> {
    selector
        .strip_prefix(&format!("[{}=\"", attr))
        .and_then(|v| v.strip_suffix("\"]"))
        .map(unescape)
}

fn unescape(value: &str) -> String {
    value.replace('\\', "")
}

/// Behaviour shared by the simulated targets
trait SimulatedApp: Send {
    /// Elements present in the current context
    fn elements(&self) -> Result<Vec<El>, MockError>;

    fn require(&self, id: &str) -> Result<(), MockError> {
        if self.elements()?.iter().any(|el| el.id == id) {
            Ok(())
        } else {
            Err(MockError::stale(id))
        }
    }

    fn navigate(&mut self, url: &str) -> Result<(), MockError>;
    fn url(&self) -> Result<String, MockError>;
    fn back(&mut self) -> Result<(), MockError>;
    fn click(&mut self, id: &str) -> Result<(), MockError>;
    fn type_text(&mut self, id: &str, text: &str) -> Result<(), MockError>;
    fn clear(&mut self, id: &str) -> Result<(), MockError>;
    fn text(&self, id: &str) -> String;

    fn window_handle(&self) -> Result<String, MockError> {
        Ok(NATIVE_CONTEXT.to_string())
    }

    fn window_handles(&self) -> Vec<String> {
        vec![NATIVE_CONTEXT.to_string()]
    }

    fn switch_window(&mut self, handle: &str) -> Result<(), MockError> {
        if handle == NATIVE_CONTEXT {
            Ok(())
        } else {
            Err(MockError::no_such_window(handle))
        }
    }

    fn close_window(&mut self) -> Result<(), MockError> {
        Err(MockError::unsupported("close window"))
    }

    fn switch_frame(&mut self, _frame: Option<&str>) -> Result<(), MockError> {
        Err(MockError::unsupported("frames"))
    }
}

// ============== Login page ==============

/// The login page: standard, Facebook and Google sign-in
#[derive(Default)]
struct LoginPage {
    url: Option<String>,
    popup_open: bool,
    popup_url: String,
    current: Option<&'static str>,
    frame: Option<String>,
    email: String,
    password: String,
    identifier: String,
    message: Option<String>,
}

impl LoginPage {
    fn new() -> Self {
        Self {
            current: Some(MAIN_WINDOW),
            ..Default::default()
        }
    }

    fn current_window(&self) -> Result<&'static str, MockError> {
        self.current
            .ok_or_else(|| MockError::no_such_window("the current window was closed"))
    }

    fn submit(&mut self) {
        let email = normalize_login(&self.email);
        let message = if email.is_empty() {
            "Please enter your Email/Phone"
        } else if USERS
            .iter()
            .any(|(user, pass)| *user == email && *pass == self.password)
        {
            "Login Successful"
        } else {
            "Invalid credentials. Please try again."
        };
        self.message = Some(message.to_string());
    }

    fn open_popup(&mut self) {
        self.popup_open = true;
        self.popup_url = "https://accounts.google.com/v3/signin/identifier".to_string();
        self.identifier.clear();
        self.message = Some("Google sign-in successful".to_string());
    }
}

impl SimulatedApp for LoginPage {
    fn elements(&self) -> Result<Vec<El>, MockError> {
        let window = self.current_window()?;

        if window == POPUP_WINDOW {
            return Ok(vec![
                El {
                    id: "identifierId",
                    name: "identifier",
                    tag: "input",
                    ..Default::default()
                },
                El {
                    id: "identifierNext",
                    tag: "button",
                    xpath: NEXT_BUTTON_XPATH,
                    ..Default::default()
                },
            ]);
        }

        if self.url.is_none() {
            return Ok(Vec::new());
        }

        if self.frame.is_some() {
            return Ok(vec![El {
                id: "googleSignIn",
                class: "nsm7Bb-HzV7m-LgbsSe",
                tag: "div",
                ..Default::default()
            }]);
        }

        let mut elements = vec![
            El {
                id: "emailInput",
                name: "email",
                tag: "input",
                ..Default::default()
            },
            El {
                id: "passwordInput",
                name: "password",
                tag: "input",
                ..Default::default()
            },
            El {
                id: "loginButton",
                class: "btn btn-login",
                tag: "button",
                ..Default::default()
            },
            El {
                id: "facebookButton",
                class: "btn btn-facebook",
                tag: "button",
                ..Default::default()
            },
            El {
                id: "googleFrame",
                tag: "iframe",
                ..Default::default()
            },
            El {
                id: "googleButtonContainer",
                tag: "div",
                xpath: GOOGLE_BUTTON_XPATH,
                ..Default::default()
            },
        ];
        if self.message.is_some() {
            elements.push(El {
                id: "message",
                tag: "div",
                ..Default::default()
            });
        }
        Ok(elements)
    }

    fn navigate(&mut self, url: &str) -> Result<(), MockError> {
        if url.contains("unreachable") {
            return Err(MockError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "unknown error",
                format!("net::ERR_CONNECTION_REFUSED loading {}", url),
            ));
        }
        if self.current_window()? == POPUP_WINDOW {
            self.popup_url = url.to_string();
            return Ok(());
        }

        self.url = Some(url.to_string());
        self.frame = None;
        self.email.clear();
        self.password.clear();
        self.message = None;
        Ok(())
    }

    fn url(&self) -> Result<String, MockError> {
        if self.current_window()? == POPUP_WINDOW {
            return Ok(self.popup_url.clone());
        }
        Ok(self.url.clone().unwrap_or_else(|| "about:blank".to_string()))
    }

    fn back(&mut self) -> Result<(), MockError> {
        self.current_window()?;
        Ok(())
    }

    fn click(&mut self, id: &str) -> Result<(), MockError> {
        match id {
            "loginButton" => self.submit(),
            "facebookButton" => {
                self.message = Some("Facebook sign-in successful".to_string());
            }
            "googleSignIn" | "googleButtonContainer" => self.open_popup(),
            "identifierNext" => {
                // Only known accounts move on to the password page
                if USERS.iter().any(|(user, _)| *user == self.identifier) {
                    self.popup_url = "https://accounts.google.com/v3/signin/challenge/pwd".to_string();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn type_text(&mut self, id: &str, text: &str) -> Result<(), MockError> {
        match id {
            "emailInput" => self.email.push_str(text),
            "passwordInput" => self.password.push_str(text),
            "identifierId" => self.identifier.push_str(text),
            other => {
                return Err(MockError::new(
                    StatusCode::BAD_REQUEST,
                    "element not interactable",
                    format!("{} is not an input", other),
                ))
            }
        }
        Ok(())
    }

    fn clear(&mut self, id: &str) -> Result<(), MockError> {
        match id {
            "emailInput" => self.email.clear(),
            "passwordInput" => self.password.clear(),
            "identifierId" => self.identifier.clear(),
            _ => {}
        }
        Ok(())
    }

    fn text(&self, id: &str) -> String {
        match id {
            "message" => self.message.clone().unwrap_or_default(),
            "loginButton" => "Login".to_string(),
            "facebookButton" => "Continue with Facebook".to_string(),
            "googleSignIn" => "Sign in with Google".to_string(),
            "identifierNext" => "Next".to_string(),
            _ => String::new(),
        }
    }

    fn window_handle(&self) -> Result<String, MockError> {
        self.current_window().map(str::to_string)
    }

    fn window_handles(&self) -> Vec<String> {
        let mut handles = vec![MAIN_WINDOW.to_string()];
        if self.popup_open {
            handles.push(POPUP_WINDOW.to_string());
        }
        handles
    }

    fn switch_window(&mut self, handle: &str) -> Result<(), MockError> {
        match handle {
            MAIN_WINDOW => self.current = Some(MAIN_WINDOW),
            POPUP_WINDOW if self.popup_open => self.current = Some(POPUP_WINDOW),
            other => return Err(MockError::no_such_window(other)),
        }
        self.frame = None;
        Ok(())
    }

    fn close_window(&mut self) -> Result<(), MockError> {
        match self.current_window()? {
            POPUP_WINDOW => self.popup_open = false,
            _ => self.url = None,
        }
        self.current = None;
        Ok(())
    }

    fn switch_frame(&mut self, frame: Option<&str>) -> Result<(), MockError> {
        match frame {
            None => self.frame = None,
            Some("googleFrame") if self.frame.is_none() => {
                self.frame = Some("googleFrame".to_string())
            }
            Some(other) => {
                return Err(MockError::new(
                    StatusCode::NOT_FOUND,
                    "no such frame",
                    format!("{} is not a frame", other),
                ))
            }
        }
        Ok(())
    }
}

// ============== Survey app ==============

const AI_MODELS: &[&str] = &["ChatGPT", "Bard", "Claude", "Copilot"];
const EDUCATION_OPTIONS: &[(&str, &str)] = &[
    ("HighSchoolOption", "High School"),
    ("BachelorOption", "Bachelor's Degree"),
    ("MasterOption", "Master's Degree"),
    ("PhDOption", "PhD"),
];
const GENDER_OPTIONS: &[(&str, &str)] = &[
    ("MaleOption", "Male"),
    ("FemaleOption", "Female"),
    ("OtherOption", "Other"),
];

#[derive(Default)]
struct SurveyForm {
    name: String,
    birth_date: String,
    city: String,
    education: Option<&'static str>,
    gender: Option<&'static str>,
    education_open: bool,
    gender_open: bool,
    /// Checked models and their cons text
    models: HashMap<&'static str, String>,
    use_case: String,
    sent: bool,
}

impl SurveyForm {
    fn birth_date_valid(&self) -> bool {
        let date = self.birth_date.trim();
        if date.is_empty() {
            return true;
        }
        let parts: Vec<&str> = date.split('.').collect();
        matches!(parts.as_slice(), [d, m, y]
            if d.len() == 2 && m.len() == 2 && y.len() == 4
                && [d, m, y].iter().all(|p| p.chars().all(|c| c.is_ascii_digit())))
    }

    fn complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.city.trim().is_empty()
            && self.education.is_some()
            && self.gender.is_some()
            && !self.models.is_empty()
            && self.models.values().all(|cons| !cons.trim().is_empty())
            && !self.use_case.trim().is_empty()
            && self.birth_date_valid()
    }
}

/// The survey app: a Google login screen followed by the survey form
#[derive(Default)]
struct SurveyApp {
    on_form: bool,
    form: SurveyForm,
}

impl SurveyApp {
    fn model_of(id: &str, suffix: &str) -> Option<&'static str> {
        let model = id.strip_suffix(suffix)?;
        AI_MODELS.iter().copied().find(|m| *m == model)
    }

    fn field_mut(&mut self, id: &str) -> Option<&mut String> {
        match id {
            "NameSurnameField" => Some(&mut self.form.name),
            "BirthDateField" => Some(&mut self.form.birth_date),
            "CityField" => Some(&mut self.form.city),
            "AIUseCaseField" => Some(&mut self.form.use_case),
            _ => {
                let model = Self::model_of(id, "ConsField")?;
                self.form.models.get_mut(model)
            }
        }
    }
}

impl SimulatedApp for SurveyApp {
    fn elements(&self) -> Result<Vec<El>, MockError> {
        if !self.on_form {
            return Ok(vec![El::id("GoogleLoginButton")]);
        }

        let mut ids = vec![
            "Survey Form",
            "NameSurnameField",
            "BirthDateField",
            "CityField",
            "EducationDropdown",
            "GenderDropdown",
            "AIUseCaseField",
        ];
        if self.form.education_open {
            ids.extend(EDUCATION_OPTIONS.iter().map(|(id, _)| *id));
        }
        if self.form.gender_open {
            ids.extend(GENDER_OPTIONS.iter().map(|(id, _)| *id));
        }

        let mut elements: Vec<El> = ids.into_iter().map(El::id).collect();
        for model in AI_MODELS {
            elements.push(El::id(checkbox_id(model)));
            if self.form.models.contains_key(model) {
                elements.push(El::id(cons_field_id(model)));
            }
        }
        if self.form.complete() {
            elements.push(El::id("SendSurveyButton"));
        }
        if self.form.sent {
            elements.push(El::id("SurveySentMessage"));
        }
        Ok(elements)
    }

    fn navigate(&mut self, _url: &str) -> Result<(), MockError> {
        Err(MockError::unsupported("navigation in a native app"))
    }

    fn url(&self) -> Result<String, MockError> {
        Err(MockError::unsupported("url in a native app"))
    }

    fn back(&mut self) -> Result<(), MockError> {
        // Leaving the form logs out; logging in again starts a fresh form
        self.on_form = false;
        Ok(())
    }

    fn click(&mut self, id: &str) -> Result<(), MockError> {
        match id {
            "GoogleLoginButton" => {
                self.on_form = true;
                self.form = SurveyForm::default();
            }
            "EducationDropdown" => self.form.education_open = !self.form.education_open,
            "GenderDropdown" => self.form.gender_open = !self.form.gender_open,
            "SendSurveyButton" => self.form.sent = true,
            _ => {
                if let Some((option, _)) = EDUCATION_OPTIONS.iter().find(|(o, _)| *o == id) {
                    self.form.education = Some(*option);
                    self.form.education_open = false;
                } else if let Some((option, _)) = GENDER_OPTIONS.iter().find(|(o, _)| *o == id) {
                    self.form.gender = Some(*option);
                    self.form.gender_open = false;
                } else if let Some(model) = Self::model_of(id, "Checkbox") {
                    if self.form.models.remove(model).is_none() {
                        self.form.models.insert(model, String::new());
                    }
                }
            }
        }
        Ok(())
    }

    fn type_text(&mut self, id: &str, text: &str) -> Result<(), MockError> {
        let field = self.field_mut(id).ok_or_else(|| {
            MockError::new(
                StatusCode::BAD_REQUEST,
                "element not interactable",
                format!("{} is not a text field", id),
            )
        })?;
        field.push_str(text);
        Ok(())
    }

    fn clear(&mut self, id: &str) -> Result<(), MockError> {
        if let Some(field) = self.field_mut(id) {
            field.clear();
        }
        Ok(())
    }

    fn text(&self, id: &str) -> String {
        let form = &self.form;
        match id {
            "Survey Form" => "Survey Form".to_string(),
            "GoogleLoginButton" => "Sign in with Google".to_string(),
            "NameSurnameField" => form.name.clone(),
            "BirthDateField" => form.birth_date.clone(),
            "CityField" => form.city.clone(),
            "AIUseCaseField" => form.use_case.clone(),
            "SendSurveyButton" => "Send".to_string(),
            "SurveySentMessage" => "Survey sent successfully".to_string(),
            "EducationDropdown" => label(EDUCATION_OPTIONS, form.education),
            "GenderDropdown" => label(GENDER_OPTIONS, form.gender),
            _ => {
                if let Some((_, text)) = EDUCATION_OPTIONS
                    .iter()
                    .chain(GENDER_OPTIONS)
                    .find(|(o, _)| *o == id)
                {
                    return text.to_string();
                }
                Self::model_of(id, "ConsField")
                    .and_then(|m| form.models.get(m).cloned())
                    .unwrap_or_default()
            }
        }
    }
}

fn label(options: &[(&str, &str)], selected: Option<&str>) -> String {
    selected
        .and_then(|s| options.iter().find(|(o, _)| *o == s))
        .map(|(_, text)| text.to_string())
        .unwrap_or_default()
}

fn checkbox_id(model: &str) -> &'static str {
    match model {
        "ChatGPT" => "ChatGPTCheckbox",
        "Bard" => "BardCheckbox",
        "Claude" => "ClaudeCheckbox",
        _ => "CopilotCheckbox",
    }
}

fn cons_field_id(model: &str) -> &'static str {
    match model {
        "ChatGPT" => "ChatGPTConsField",
        "Bard" => "BardConsField",
        "Claude" => "ClaudeConsField",
        _ => "CopilotConsField",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_login() {
        assert_eq!(normalize_login("test@@example.comñ"), "test@example.com");
        assert_eq!(normalize_login(" john@example.com "), "john@example.com");
        assert_eq!(normalize_login("ñ"), "");
    }

    #[test]
    fn test_login_with_invalid_characters_succeeds() {
        let mut page = LoginPage::new();
        page.type_text("emailInput", "test@@example.comñ").unwrap();
        page.type_text("passwordInput", "12345").unwrap();
        page.submit();
        assert_eq!(page.message.as_deref(), Some("Login Successful"));
    }
}
