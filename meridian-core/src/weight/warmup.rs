//! Warmup weighting.
//!
//! A freshly started endpoint can announce a warmup window (`warmupTime` millis after its
//! `startTime`) during which it should receive `warmupWeight` instead of its declared
//! weight. The window is stored once as dynamic attributes; status and weight are then
//! derived from the clock on every read, so there is no timer to fire or to miss.

use crate::domain::endpoint::{attr, Endpoint};
use crate::domain::attributes::DynamicValue;
use crate::error::{DecodeResult, RegistryDecodeError};

/// The warmup window recorded on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupWindow {
    /// Epoch millis at which warmup ends.
    pub end_time_ms: i64,
    /// Weight served until then.
    pub weight: i64,
}

/// Stateless warmup processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarmupEngine;

impl WarmupEngine {
    /// Normalize the warmup attributes of a freshly built endpoint.
    ///
    /// When both `warmupTime` and `warmupWeight` are declared, records the window as
    /// dynamic attributes. In every case both keys are removed from the static
    /// attributes afterwards.
    pub fn process(endpoint: &mut Endpoint) -> DecodeResult<Option<WarmupWindow>> {
        let window = Self::window(endpoint)?;

        let statics = endpoint.static_attrs_mut();
        statics.remove(attr::WARMUP_TIME);
        statics.remove(attr::WARMUP_WEIGHT);

        if let Some(window) = window {
            let dynamics = endpoint.dynamic_attrs_mut();
            dynamics.insert(attr::WARMUP_END_TIME, DynamicValue::Int(window.end_time_ms));
            dynamics.insert(attr::WARMUP_WEIGHT, DynamicValue::Int(window.weight));
            tracing::trace!(
                endpoint = %endpoint,
                end_time_ms = window.end_time_ms,
                weight = window.weight,
                "endpoint is warming up"
            );
        }
        Ok(window)
    }

    fn window(endpoint: &Endpoint) -> DecodeResult<Option<WarmupWindow>> {
        let (Some(warmup_time), Some(warmup_weight)) = (
            declared(endpoint, attr::WARMUP_TIME),
            declared(endpoint, attr::WARMUP_WEIGHT),
        ) else {
            return Ok(None);
        };

        let warmup_time = parse_int(endpoint, attr::WARMUP_TIME, warmup_time)?;
        let weight = parse_int(endpoint, attr::WARMUP_WEIGHT, warmup_weight)?;
        let start_time = match endpoint.static_attr(attr::START_TIME) {
            Some(start) => parse_int(endpoint, attr::START_TIME, start)?,
            None => {
                return Err(RegistryDecodeError::MissingStartTime {
                    address: endpoint.address(),
                })
            }
        };

        Ok(Some(WarmupWindow {
            end_time_ms: start_time.saturating_add(warmup_time),
            weight,
        }))
    }
}

/// A blank value counts as not declared.
fn declared<'a>(endpoint: &'a Endpoint, key: &str) -> Option<&'a str> {
    endpoint
        .static_attr(key)
        .filter(|value| !value.trim().is_empty())
}

fn parse_int(endpoint: &Endpoint, key: &str, value: &str) -> DecodeResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| RegistryDecodeError::InvalidAttribute {
            address: endpoint.address(),
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::endpoint::EndpointStatus;
    use crate::url::EndpointUrl;

    fn endpoint(query: &str) -> Endpoint {
        let url = EndpointUrl::parse(&format!("bolt://10.0.0.1:12200?{query}")).unwrap();
        Endpoint::from_url(&url, 100)
    }

    #[test]
    fn records_window_and_strips_statics() {
        let mut e = endpoint("weight=200&startTime=1000&warmupTime=200&warmupWeight=700");
        let window = WarmupEngine::process(&mut e).unwrap();

        assert_eq!(
            window,
            Some(WarmupWindow {
                end_time_ms: 1200,
                weight: 700
            })
        );
        assert_eq!(e.static_attr("weight"), Some("200"));
        assert_eq!(e.static_attr("startTime"), Some("1000"));
        assert_eq!(e.static_attr("warmupTime"), None);
        assert_eq!(e.static_attr("warmupWeight"), None);
        assert_eq!(e.dynamic_attrs().get_int(attr::WARMUP_END_TIME), Some(1200));
        assert_eq!(e.dynamic_attrs().get_int(attr::WARMUP_WEIGHT), Some(700));

        assert_eq!(e.status_at(1000), EndpointStatus::WarmingUp);
        assert_eq!(e.weight_at(1199), 700);
        assert_eq!(e.status_at(1200), EndpointStatus::Available);
        assert_eq!(e.weight_at(1200), 200);
    }

    #[test]
    fn missing_warmup_time_is_available() {
        let mut e = endpoint("weight=300&startTime=1000&warmupWeight=800");
        assert_eq!(WarmupEngine::process(&mut e).unwrap(), None);
        assert_eq!(e.static_attr("warmupWeight"), None);
        assert!(e.dynamic_attrs().is_empty());
        assert_eq!(e.status_at(1000), EndpointStatus::Available);
        assert_eq!(e.weight_at(1000), 300);
    }

    #[test]
    fn missing_warmup_weight_is_available() {
        let mut e = endpoint("weight=600&startTime=1000&warmupTime=30");
        assert_eq!(WarmupEngine::process(&mut e).unwrap(), None);
        assert_eq!(e.static_attr("warmupTime"), None);
        assert!(e.dynamic_attrs().is_empty());
        assert_eq!(e.weight_at(1001), 600);
    }

    #[test]
    fn blank_window_is_available() {
        let mut e = endpoint("weight=5&startTime=1&warmupTime=&warmupWeight=");
        assert_eq!(WarmupEngine::process(&mut e).unwrap(), None);
        assert_eq!(e.static_attr("warmupTime"), None);
        assert_eq!(e.static_attr("warmupWeight"), None);
        assert!(e.dynamic_attrs().is_empty());
        assert_eq!(e.status_at(1), EndpointStatus::Available);
        assert_eq!(e.weight_at(1), 5);

        let mut e = endpoint("weight=5&startTime=1&warmupTime=30&warmupWeight=%20");
        assert_eq!(WarmupEngine::process(&mut e).unwrap(), None);
        assert_eq!(e.static_attr("warmupTime"), None);
    }

    #[test]
    fn missing_start_time_is_rejected() {
        let mut e = endpoint("warmupTime=30&warmupWeight=5");
        assert_eq!(
            WarmupEngine::process(&mut e),
            Err(RegistryDecodeError::MissingStartTime {
                address: "10.0.0.1:12200".into()
            })
        );
    }

    #[test]
    fn unparseable_window_is_rejected() {
        let mut e = endpoint("startTime=1&warmupTime=soon&warmupWeight=5");
        assert!(matches!(
            WarmupEngine::process(&mut e),
            Err(RegistryDecodeError::InvalidAttribute { key, .. }) if key == "warmupTime"
        ));
    }
}
