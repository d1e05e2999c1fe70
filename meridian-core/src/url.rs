//! Registry URL codec.
//!
//! Registry nodes carry endpoint and configurator URLs form-encoded in their path
//! segment: `+` is a space and every reserved byte is `%XY`. Decoding is strict, a stray
//! `%` is an error rather than a literal, so a half-written node never turns into a
//! plausible looking endpoint.

use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::domain::attributes::Attributes;
use crate::error::{DecodeResult, RegistryDecodeError};

/// Bytes left untouched by [`encode_component`].
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'*')
    .remove(b'_');

/// Decode one form-encoded registry path segment.
pub fn decode_component(raw: &str) -> DecodeResult<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return Err(RegistryDecodeError::MalformedPercentEncoding {
                    input: raw.to_string(),
                    position: i,
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| RegistryDecodeError::InvalidUtf8 {
            input: raw.to_string(),
        })
}

/// Form-encode a value so it can be used as one registry path segment.
pub fn encode_component(value: &str) -> String {
    value
        .split(' ')
        .map(|part| utf8_percent_encode(part, COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// A decoded `scheme://[user[:pass]@]host[:port][/path][?query]` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrl {
    protocol: String,
    username: Option<String>,
    password: Option<String>,
    host: String,
    port: u16,
    path: String,
    parameters: Attributes,
}

impl EndpointUrl {
    /// Build a URL without credentials, path or parameters.
    pub fn new(protocol: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol: protocol.into(),
            username: None,
            password: None,
            host: host.into(),
            port,
            path: String::new(),
            parameters: Attributes::new(),
        }
    }

    /// Parse an already decoded URL.
    pub fn parse(url: &str) -> DecodeResult<Self> {
        let (protocol, rest) = url
            .split_once("://")
            .filter(|(protocol, _)| !protocol.is_empty())
            .ok_or_else(|| RegistryDecodeError::MissingScheme {
                url: url.to_string(),
            })?;

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));

        let (userinfo, host_port) = match authority.rsplit_once('@') {
            Some((userinfo, host_port)) => (Some(userinfo), host_port),
            None => (None, authority),
        };
        let (username, password) = match userinfo {
            Some(info) => match info.split_once(':') {
                Some((user, pass)) => (Some(user.to_string()), Some(pass.to_string())),
                None => (Some(info.to_string()), None),
            },
            None => (None, None),
        };

        let (host, port) = split_host_port(host_port);
        let port = match port {
            Some(port) => port.parse::<u16>().map_err(|_| RegistryDecodeError::InvalidPort {
                url: url.to_string(),
                port: port.to_string(),
            })?,
            None => 0,
        };

        let mut parameters = Attributes::new();
        for part in query.unwrap_or_default().split('&') {
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((key, value)) => parameters.insert(key, value),
                None => parameters.insert(part, part),
            };
        }

        Ok(Self {
            protocol: protocol.to_string(),
            username,
            password,
            host: host.to_string(),
            port,
            path: path.to_string(),
            parameters,
        })
    }

    /// Decode a registry path segment and parse it.
    pub fn decode(raw: &str) -> DecodeResult<Self> {
        Self::parse(&decode_component(raw)?)
    }

    /// Protocol scheme.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Host name or address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port, `0` when the URL carries none.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path without its leading `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in the order they appeared.
    pub fn parameters(&self) -> &Attributes {
        &self.parameters
    }

    /// One query parameter.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key)
    }

    /// Key used to match configurator overrides against endpoints: host and port
    /// concatenated as text.
    pub fn address_key(&self) -> String {
        format!("{}{}", self.host, self.port)
    }

    /// A copy of this URL with `key` set to `value`.
    pub fn with_parameter(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut url = self.clone();
        url.parameters.insert(key, value);
        url
    }

    /// A copy of this URL with `path` replaced.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        let mut url = self.clone();
        url.path = path.into();
        url
    }

    /// Render the URL including credentials and every parameter.
    pub fn to_full_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.protocol)?;
        if let Some(username) = &self.username {
            f.write_str(username)?;
            if let Some(password) = &self.password {
                write!(f, ":{password}")?;
            }
            f.write_str("@")?;
        }
        f.write_str(&self.host)?;
        if self.port > 0 {
            write!(f, ":{}", self.port)?;
        }
        if !self.path.is_empty() {
            write!(f, "/{}", self.path)?;
        }
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

fn split_host_port(host_port: &str) -> (&str, Option<&str>) {
    // Bracketed IPv6 literal: the port separator is after the closing bracket.
    if host_port.starts_with('[') {
        if let Some(end) = host_port.find(']') {
            let port = host_port[end + 1..].strip_prefix(':');
            return (&host_port[..=end], port);
        }
    }
    match host_port.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (host_port, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_form_encoding() {
        assert_eq!(
            decode_component("configurator%3a%2f%2f172.20.136.45%3a8888%3fweight%3d45%26up%3d1")
                .unwrap(),
            "configurator://172.20.136.45:8888?weight=45&up=1"
        );
        assert_eq!(decode_component("a+b%2Bc").unwrap(), "a b+c");
    }

    #[test]
    fn stray_percent_is_an_error() {
        assert_eq!(
            decode_component("bolt%3A%2F%2Fhost%2"),
            Err(RegistryDecodeError::MalformedPercentEncoding {
                input: "bolt%3A%2F%2Fhost%2".into(),
                position: 17,
            })
        );
        assert!(decode_component("%zz").is_err());
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(matches!(
            decode_component("%ff%fe"),
            Err(RegistryDecodeError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn encode_is_decodable() {
        let raw = "bolt://10.0.0.1:12200?appName=echo server&tag=a/b";
        let encoded = encode_component(raw);
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('/'));
        assert_eq!(decode_component(&encoded).unwrap(), raw);
    }

    #[test]
    fn parses_full_url() {
        let url =
            EndpointUrl::parse("rest://admin:pw@172.20.136.45:8888/api?version=1.0&uniqueId=&flag")
                .unwrap();
        assert_eq!(url.protocol(), "rest");
        assert_eq!(url.host(), "172.20.136.45");
        assert_eq!(url.port(), 8888);
        assert_eq!(url.path(), "api");
        assert_eq!(url.parameter("version"), Some("1.0"));
        assert_eq!(url.parameter("uniqueId"), Some(""));
        assert_eq!(url.parameter("flag"), Some("flag"));
        assert_eq!(url.address_key(), "172.20.136.458888");
        assert_eq!(
            url.to_full_string(),
            "rest://admin:pw@172.20.136.45:8888/api?version=1.0&uniqueId=&flag=flag"
        );
    }

    #[test]
    fn missing_port_is_zero() {
        let url = EndpointUrl::parse("override://10.1.1.1?timeout=200").unwrap();
        assert_eq!(url.port(), 0);
        assert_eq!(url.address_key(), "10.1.1.10");
    }

    #[test]
    fn ipv6_literal_keeps_brackets() {
        let url = EndpointUrl::parse("bolt://[::1]:12200").unwrap();
        assert_eq!(url.host(), "[::1]");
        assert_eq!(url.port(), 12200);
    }

    #[test]
    fn rejects_missing_scheme_and_bad_port() {
        assert!(matches!(
            EndpointUrl::parse("10.0.0.1:80"),
            Err(RegistryDecodeError::MissingScheme { .. })
        ));
        assert!(matches!(
            EndpointUrl::parse("bolt://10.0.0.1:99999"),
            Err(RegistryDecodeError::InvalidPort { .. })
        ));
    }

    #[test]
    fn with_parameter_leaves_original_untouched() {
        let url = EndpointUrl::parse("bolt://h:1?weight=10").unwrap();
        let merged = url.with_parameter("weight", "45").with_parameter("up", "1");
        assert_eq!(url.parameter("weight"), Some("10"));
        assert_eq!(merged.parameter("weight"), Some("45"));
        assert_eq!(merged.to_full_string(), "bolt://h:1?weight=45&up=1");
    }
}
