//! Live controller client over HTTP (ureq, blocking).
//!
//! Two endpoint shapes are supported:
//! - direct: `GET http://<ip>/json`
//! - proxied: `GET <proxy>/api/status?ip=<ip>`, where the proxy relays the
//!   device body verbatim, or answers `400`/`502` with `{error, details}`.
//!
//! The body shape is controller specific, so readings are located with the
//! JSON pointers of a [`FieldMap`].

use chrono::{DateTime, Utc};
use pitwatch_config::{Config, FieldMap};
use pitwatch_traits::{Clock, Probe, Sample, SampleSource, SystemClock};
use serde_json::Value;
use std::time::Duration;

use crate::error::{DeviceError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Direct { ip: String },
    Proxy { base: String, ip: String },
}

impl Endpoint {
    /// Pick the endpoint for `ip`, routed through `proxy` when given.
    pub fn new(ip: Option<&str>, proxy: Option<&str>) -> Result<Self> {
        let ip = ip.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
            DeviceError::InvalidConfiguration("device ip address is missing".into())
        })?;
        match proxy.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Self::Direct { ip: ip.to_string() }),
            Some(base) => {
                if !(base.starts_with("http://") || base.starts_with("https://")) {
                    return Err(DeviceError::InvalidConfiguration(format!(
                        "proxy url must start with http:// or https://, got {base:?}"
                    )));
                }
                Ok(Self::Proxy {
                    base: base.trim_end_matches('/').to_string(),
                    ip: ip.to_string(),
                })
            }
        }
    }

    /// Request URL without the query string.
    pub fn url(&self) -> String {
        match self {
            Self::Direct { ip } => format!("http://{ip}/json"),
            Self::Proxy { base, .. } => format!("{base}/api/status"),
        }
    }

    #[inline]
    pub fn is_proxied(&self) -> bool {
        matches!(self, Self::Proxy { .. })
    }
}

pub struct HttpDevice {
    agent: ureq::Agent,
    endpoint: Endpoint,
    fields: FieldMap,
    clock: Box<dyn Clock + Send + Sync>,
}

impl HttpDevice {
    pub fn new(endpoint: Endpoint, fields: FieldMap, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("pitwatch/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            endpoint,
            fields,
            clock: Box::new(SystemClock::new()),
        }
    }

    /// Build from `[source]` and `[device.fields]`. A missing IP is rejected here,
    /// before any request is attempted.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let endpoint = Endpoint::new(
            cfg.source.device_ip.as_deref(),
            cfg.source.proxy_url.as_deref(),
        )?;
        let timeout = match cfg.source.timeout_ms {
            0 => DEFAULT_TIMEOUT,
            ms => Duration::from_millis(ms),
        };
        Ok(Self::new(endpoint, cfg.device.fields.clone(), timeout))
    }

    /// Replace the clock used to stamp samples.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    #[inline]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// One GET, returning the decoded device body.
    pub fn get_json(&self, timeout: Duration) -> Result<Value> {
        let mut req = self.agent.get(&self.endpoint.url()).timeout(timeout);
        if let Endpoint::Proxy { ip, .. } = &self.endpoint {
            req = req.query("ip", ip);
        }
        tracing::debug!(url = %self.endpoint.url(), "device GET");

        match req.call() {
            Ok(resp) => {
                let text = resp
                    .into_string()
                    .map_err(|e| DeviceError::Decode(e.to_string()))?;
                serde_json::from_str(&text).map_err(|e| DeviceError::Decode(e.to_string()))
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                if self.endpoint.is_proxied() {
                    Err(proxy_error(code, &body))
                } else {
                    Err(DeviceError::Status(code))
                }
            }
            Err(ureq::Error::Transport(t)) => {
                if is_timeout(&t) {
                    Err(DeviceError::Timeout)
                } else {
                    Err(DeviceError::Transport(t.to_string()))
                }
            }
        }
    }
}

impl SampleSource for HttpDevice {
    fn fetch(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<Sample, Box<dyn std::error::Error + Send + Sync>> {
        let body = self.get_json(timeout)?;
        Ok(map_body(&body, &self.fields, self.clock.wall())?)
    }
}

/// Decode a proxy failure body `{error, details}`; falls back to the raw text.
pub fn proxy_error(status: u16, body: &str) -> DeviceError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |k: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(k))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    DeviceError::Proxy {
        status,
        error: field("error").unwrap_or_else(|| "proxy error".to_string()),
        details: field("details").unwrap_or_else(|| body.trim().to_string()),
    }
}

fn is_timeout(t: &ureq::Transport) -> bool {
    let io_timeout = std::error::Error::source(t)
        .and_then(|s| s.downcast_ref::<std::io::Error>())
        .is_some_and(|io| {
            matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        });
    io_timeout || t.to_string().to_lowercase().contains("timed out")
}

/// Numbers, or numeric strings as some firmwares send them.
fn number_at(body: &Value, pointer: &str) -> Option<f64> {
    let v = body.pointer(pointer)?;
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|x| x.is_finite())
}

fn required(body: &Value, pointer: &str) -> Result<f64> {
    number_at(body, pointer).ok_or_else(|| DeviceError::MissingField(pointer.to_string()))
}

/// Map a device body to a `Sample` stamped `timestamp`.
///
/// Pit, fan and every probe temperature are required. An absent set-point or
/// probe target is treated as "not reported" (`None` / no target).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn map_body(body: &Value, fields: &FieldMap, timestamp: DateTime<Utc>) -> Result<Sample> {
    let pit = required(body, &fields.pit)?;
    let fan = required(body, &fields.fan)?;
    let pit_set = fields
        .pit_set
        .as_deref()
        .and_then(|p| number_at(body, p));

    let probes = fields
        .probes
        .iter()
        .map(|pf| {
            let temperature = required(body, &pf.temp)?;
            let target = pf
                .target
                .as_deref()
                .and_then(|p| number_at(body, p))
                .unwrap_or(0.0);
            Ok(Probe::new(pf.id, pf.name.clone(), temperature, target))
        })
        .collect::<Result<Vec<_>>>()?;

    let fan_duty = fan.round().clamp(0.0, 100.0) as u8;
    let sample = Sample::new(timestamp, pit, probes, fan_duty);
    Ok(match pit_set {
        Some(set) => sample.with_pit_set(set),
        None => sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts() -> DateTime<Utc> {
        DateTime::<Utc>::default()
    }

    #[test]
    fn maps_default_field_layout() {
        let body = json!({
            "pitTemp": 224.6,
            "pitSet": 225,
            "fanSpeed": 37.4,
            "probes": [{"temp": 161.2, "target": 203}, {"temp": 210.0}]
        });
        let s = map_body(&body, &FieldMap::default(), ts()).unwrap();
        assert_eq!(s.pit, 224.6);
        assert_eq!(s.pit_set, Some(225.0));
        assert_eq!(s.fan_duty, 37);
        assert_eq!(s.probes.len(), 2);
        assert_eq!(s.probes[0].target, 203.0);
        assert!(!s.probes[1].has_target());
    }

    #[test]
    fn numeric_strings_and_fan_clamp() {
        let body = json!({
            "pitTemp": "230.5",
            "fanSpeed": 140,
            "probes": [{"temp": "150"}, {"temp": 200}]
        });
        let s = map_body(&body, &FieldMap::default(), ts()).unwrap();
        assert_eq!(s.pit, 230.5);
        assert_eq!(s.pit_set, None);
        assert_eq!(s.fan_duty, 100);
        assert_eq!(s.probes[0].target, 0.0);
    }

    #[test]
    fn missing_pit_is_an_error() {
        let body = json!({"fanSpeed": 10, "probes": []});
        match map_body(&body, &FieldMap::default(), ts()) {
            Err(DeviceError::MissingField(p)) => assert_eq!(p, "/pitTemp"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn proxy_error_body_is_decoded() {
        let e = proxy_error(
            502,
            r#"{"error":"Unreachable","details":"timeout of 4000ms exceeded"}"#,
        );
        match e {
            DeviceError::Proxy {
                status,
                error,
                details,
            } => {
                assert_eq!(status, 502);
                assert_eq!(error, "Unreachable");
                assert_eq!(details, "timeout of 4000ms exceeded");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match proxy_error(400, "Bad Request") {
            DeviceError::Proxy { error, details, .. } => {
                assert_eq!(error, "proxy error");
                assert_eq!(details, "Bad Request");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn endpoint_selection() {
        assert!(matches!(
            Endpoint::new(None, None),
            Err(DeviceError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Endpoint::new(Some("  "), Some("http://localhost:3000")),
            Err(DeviceError::InvalidConfiguration(_))
        ));
        let direct = Endpoint::new(Some("192.168.1.50"), None).unwrap();
        assert_eq!(direct.url(), "http://192.168.1.50/json");
        let proxied = Endpoint::new(Some("192.168.1.50"), Some("http://localhost:3000/")).unwrap();
        assert_eq!(proxied.url(), "http://localhost:3000/api/status");
        assert!(Endpoint::new(Some("10.0.0.2"), Some("localhost:3000")).is_err());
    }
}
