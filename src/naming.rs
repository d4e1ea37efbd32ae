//! Human readable color names.
//!
//! A [`NameResolver`] maps a hex code to a name.  Two are provided:
//! [`Heuristic`] (offline, HSV bands) and [`ColorPizza`] (remote
//! catalogue).  [`resolve_name`] never fails: any lookup error, or a
//! match too far from the requested color, falls back to
//! [`approx_name`].

use std::time::Duration;

use log::debug;
use rgb::RGB8;
use serde::Deserialize;

use crate::color_math::{approx_name, to_hex};
use crate::error::LookupError;

const COLOR_PIZZA_URL: &str = "https://api.color.pizza/v1/";
const USER_AGENT: &str = concat!("color-sentence/", env!("CARGO_PKG_VERSION"));

/// Result of a successful name lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorNameInfo {
    /// The requested color, as `#RRGGBB`.
    pub requested_hex: String,
    pub display_name: String,
    /// The catalogue color the name belongs to, as `#RRGGBB`.
    pub matched_hex: String,
    /// Distance between the requested and the matched color.
    pub distance: f64,
    pub exact_match: bool,
}

/// Capability to name a color given as `#RRGGBB` or `RRGGBB`.
pub trait NameResolver: Send + Sync {
    fn lookup(&self, hex: &str) -> Result<ColorNameInfo, LookupError>;
}

/// Normalize `hex` to uppercase `#RRGGBB`.
pub fn normalize_hex(hex: &str) -> Result<String, LookupError> {
    let raw = hex.trim();
    let digits = raw.strip_prefix('#').unwrap_or(raw).trim();
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LookupError::InvalidHex(hex.to_string()));
    }
    Ok(format!("#{}", digits.to_ascii_uppercase()))
}

fn parse_hex(hex: &str) -> Result<RGB8, LookupError> {
    let h = normalize_hex(hex)?;
    let byte = |i: usize| u8::from_str_radix(&h[i .. i + 2], 16)
        .map_err(|_| LookupError::InvalidHex(hex.to_string()));
    Ok(RGB8::new(byte(1)?, byte(3)?, byte(5)?))
}

/// Offline resolver naming colors by HSV thresholds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Heuristic;

impl NameResolver for Heuristic {
    fn lookup(&self, hex: &str) -> Result<ColorNameInfo, LookupError> {
        let requested_hex = normalize_hex(hex)?;
        let name = approx_name(parse_hex(&requested_hex)?);
        Ok(ColorNameInfo { matched_hex: requested_hex.clone(), requested_hex,
                           display_name: name.to_string(), distance: 0.,
                           exact_match: false })
    }
}

/// Resolver backed by the Color.Pizza catalogue
/// (<https://api.color.pizza>).  One blocking request per lookup, no
/// retry.
pub struct ColorPizza {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ColorPizza {
    pub fn new(timeout: Duration) -> Result<Self, LookupError> {
        Self::with_base_url(COLOR_PIZZA_URL, timeout)
    }

    /// Query another deployment of the service.
    pub fn with_base_url(base_url: &str, timeout: Duration)
                         -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(ColorPizza { client, base_url: base_url.to_string() })
    }
}

impl NameResolver for ColorPizza {
    fn lookup(&self, hex: &str) -> Result<ColorNameInfo, LookupError> {
        let requested = normalize_hex(hex)?;
        let payload: Payload = self.client.get(&self.base_url)
            .query(&[("values", &requested[1..]),
                     ("goodnamesonly", "true"),
                     ("noduplicates", "true")])
            .send()?
            .error_for_status()?
            .json()?;
        first_name(payload, &requested)
    }
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    colors: Vec<serde_json::Value>,
}

/// Extract the first entry of a Color.Pizza answer.
fn first_name(payload: Payload, requested: &str)
              -> Result<ColorNameInfo, LookupError> {
    let first = payload.colors.first()
        .ok_or_else(|| LookupError::Payload("no colors".to_string()))?;
    let field = |k: &str| first.get(k).and_then(|v| v.as_str());
    let (Some(name), Some(hex)) = (field("name"), field("hex")) else {
        return Err(LookupError::Payload("missing name or hex".to_string()))
    };
    let matched_hex = normalize_hex(hex)?;
    let requested_hex = match field("requestedHex") {
        Some(r) => normalize_hex(r)?,
        None => requested.to_string(),
    };
    let distance = first.get("distance").and_then(|d| d.as_f64()).unwrap_or(0.);
    let exact_match = distance == 0. || matched_hex == requested_hex;
    Ok(ColorNameInfo { display_name: name.trim().to_string(),
                       requested_hex, matched_hex, distance, exact_match })
}

/// Name of `color`: the name given by `resolver` if its match is
/// within `max_distance`, the HSV heuristic otherwise (including when
/// there is no resolver or the lookup fails).
pub fn resolve_name(resolver: Option<&dyn NameResolver>, color: RGB8,
                    max_distance: f64) -> String {
    let local = || approx_name(color).to_string();
    let Some(resolver) = resolver else { return local() };
    let hex = to_hex(color);
    match resolver.lookup(&hex) {
        Ok(info) if info.distance <= max_distance
            && !info.display_name.is_empty() => info.display_name,
        Ok(info) => {
            debug!("name “{}” for {hex} too far ({} > {max_distance})",
                   info.display_name, info.distance);
            local()
        }
        Err(e) => {
            debug!("name lookup for {hex} failed: {e}");
            local()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: serde_json::Value) -> Payload {
        serde_json::from_value(v).unwrap()
    }

    struct Fixed(Result<f64, ()>);

    impl NameResolver for Fixed {
        fn lookup(&self, hex: &str) -> Result<ColorNameInfo, LookupError> {
            let distance = self.0.map_err(|_| LookupError::Payload("down".into()))?;
            Ok(ColorNameInfo { requested_hex: hex.to_string(),
                               display_name: "Cerulean".to_string(),
                               matched_hex: "#24B1E0".to_string(),
                               distance, exact_match: false })
        }
    }

    #[test]
    fn hex_normalization() {
        assert_eq!(normalize_hex(" #ab12Cd ").unwrap(), "#AB12CD");
        assert_eq!(normalize_hex("ab12cd").unwrap(), "#AB12CD");
        assert!(matches!(normalize_hex("#ab12c"), Err(LookupError::InvalidHex(_))));
        assert!(normalize_hex("#gg0000").is_err());
        assert!(normalize_hex("##ab12cd").is_err());
    }

    #[test]
    fn heuristic() {
        let info = Heuristic.lookup("0000ff").unwrap();
        assert_eq!(info.display_name, "blue");
        assert_eq!(info.requested_hex, "#0000FF");
        assert!(Heuristic.lookup("blue").is_err());
    }

    #[test]
    fn payload_parsing() {
        let p = payload(json!({ "colors": [
            { "name": " Cerulean ", "hex": "#24b1e0",
              "requestedHex": "#24B1E1", "distance": 1.5 } ] }));
        let info = first_name(p, "#24B1E1").unwrap();
        assert_eq!(info.display_name, "Cerulean");
        assert_eq!(info.matched_hex, "#24B1E0");
        assert_eq!(info.distance, 1.5);
        assert!(!info.exact_match);

        let p = payload(json!({ "colors": [ { "name": "Blue", "hex": "0000ff" } ] }));
        let info = first_name(p, "#0000FF").unwrap();
        assert_eq!(info.distance, 0.);
        assert!(info.exact_match);
    }

    #[test]
    fn unusable_payload() {
        let p = payload(json!({ "colors": [] }));
        assert!(matches!(first_name(p, "#000000"), Err(LookupError::Payload(_))));
        let p = payload(json!({ "colors": [ { "hex": "#000000" } ] }));
        assert!(matches!(first_name(p, "#000000"), Err(LookupError::Payload(_))));
        let p = payload(json!({}));
        assert!(first_name(p, "#000000").is_err());
    }

    #[test]
    fn fallback() {
        let blue = RGB8::new(0, 0, 255);
        assert_eq!(resolve_name(None, blue, 20.), "blue");
        assert_eq!(resolve_name(Some(&Fixed(Ok(3.))), blue, 20.), "Cerulean");
        assert_eq!(resolve_name(Some(&Fixed(Ok(20.))), blue, 20.), "Cerulean");
        assert_eq!(resolve_name(Some(&Fixed(Ok(25.))), blue, 20.), "blue");
        assert_eq!(resolve_name(Some(&Fixed(Err(()))), blue, 20.), "blue");
    }
}
