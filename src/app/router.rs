//! HTTP request dispatch: method, path and body to motor command and response.
//!
//! Routing is a two-step, exhaustive match:
//!
//! ```text
//!   (Method, path) ──classify──▶ Route ──dispatch──▶ Response
//! ```
//!
//! | Method     | Path                 | Route       |
//! |------------|----------------------|-------------|
//! | GET        | `/api/motors`        | `ListMotors`|
//! | POST       | `/api/motors/stop`   | `StopAll`   |
//! | POST / PUT | `/api/motors/{name}` | `SetSpeed`  |
//! | anything   | anything else        | `NotFound`  |
//!
//! The router owns no state.  It reads and writes only through the
//! [`MotorRegistry`] it is handed, and never mutates it on a 400/404 path.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::ports::PwmPort;
use super::registry::MotorRegistry;
use crate::error::{NotFound, ValidationError};

const MOTORS_PATH: &str = "/api/motors";
const STOP_PATH: &str = "/api/motors/stop";
const MOTOR_PREFIX: &str = "/api/motors/";

// ───────────────────────────────────────────────────────────────
// Request side
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Other,
}

impl Method {
    /// Case-sensitive, as HTTP methods are.
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            _ => Self::Other,
        }
    }

    /// Whether the transport should look for a JSON body.
    pub fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Other => "OTHER",
        })
    }
}

/// A request classified by method and path shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    ListMotors,
    StopAll,
    /// `motor` is the final path segment, unvalidated.
    SetSpeed { motor: &'a str },
    NotFound,
}

impl<'a> Route<'a> {
    pub fn classify(method: Method, path: &'a str) -> Self {
        match (method, path) {
            (Method::Get, MOTORS_PATH) => Self::ListMotors,
            (Method::Post, STOP_PATH) => Self::StopAll,
            (Method::Post | Method::Put, p) if p.starts_with(MOTOR_PREFIX) => Self::SetSpeed {
                motor: p.rsplit_once('/').map_or(p, |(_, last)| last),
            },
            _ => Self::NotFound,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Response side
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
}

impl StatusCode {
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
        }
    }
}

/// JSON payloads.  Serialized untagged, so each variant is a plain object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// `{"motors": {...}, "status": "running"}`
    MotorStatus {
        motors: BTreeMap<String, f64>,
        status: &'static str,
    },
    /// `{"status": "success", "motor": ..., "speed": ...}`
    SpeedSet {
        status: &'static str,
        motor: String,
        /// Parsed request value, before clamping.
        speed: f64,
    },
    /// `{"status": ...}`
    Status { status: &'static str },
    /// `{"error": ...}`
    Error { error: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl Response {
    fn ok(body: ResponseBody) -> Self {
        Self {
            status: StatusCode::Ok,
            body,
        }
    }

    fn error(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            body: ResponseBody::Error { error: message },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.body)
    }
}

/// Request-level failures, converted to 400/404 inside the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NotFound(NotFound),
    Invalid(ValidationError),
}

impl From<NotFound> for Rejection {
    fn from(e: NotFound) -> Self {
        Self::NotFound(e)
    }
}

impl From<ValidationError> for Rejection {
    fn from(e: ValidationError) -> Self {
        Self::Invalid(e)
    }
}

impl From<Rejection> for Response {
    fn from(r: Rejection) -> Self {
        match r {
            Rejection::NotFound(e) => Self::error(StatusCode::NotFound, e.message()),
            Rejection::Invalid(e) => Self::error(StatusCode::BadRequest, e.message()),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatch
// ───────────────────────────────────────────────────────────────

/// Route one request.  Never fails: every rejection becomes a response.
///
/// `body` is the parsed JSON object, empty when absent or malformed.
pub fn handle_request<P: PwmPort>(
    registry: &mut MotorRegistry<P>,
    method: Method,
    path: &str,
    body: &Map<String, Value>,
) -> Response {
    dispatch(registry, Route::classify(method, path), body).unwrap_or_else(Response::from)
}

fn dispatch<P: PwmPort>(
    registry: &mut MotorRegistry<P>,
    route: Route<'_>,
    body: &Map<String, Value>,
) -> Result<Response, Rejection> {
    match route {
        Route::ListMotors => Ok(Response::ok(ResponseBody::MotorStatus {
            motors: registry
                .snapshot()
                .map(|(name, speed)| (String::from(name), speed))
                .collect(),
            status: "running",
        })),

        Route::StopAll => {
            registry.stop_all();
            Ok(Response::ok(ResponseBody::Status {
                status: "All motors stopped",
            }))
        }

        Route::SetSpeed { motor } => {
            if !registry.contains(motor) {
                return Err(NotFound::Motor.into());
            }
            let speed = parse_speed(body)?;
            registry.set_speed(motor, speed)?;
            Ok(Response::ok(ResponseBody::SpeedSet {
                status: "success",
                motor: String::from(motor),
                speed,
            }))
        }

        Route::NotFound => Err(NotFound::Route.into()),
    }
}

/// Extract `speed` from the body.
///
/// Accepts JSON numbers and numeric strings (`"42.5"`); anything else,
/// including non-finite values, is invalid.
pub fn parse_speed(body: &Map<String, Value>) -> Result<f64, ValidationError> {
    let value = body.get("speed").ok_or(ValidationError::MissingSpeed)?;
    let speed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    speed
        .filter(|s| s.is_finite())
        .ok_or(ValidationError::InvalidSpeed)
}
