//! Request data read by request variables.

use super::collection::{Collection, KeyValueCollection};

/// Request data container.
#[derive(Debug, Clone, Default)]
pub struct RequestData {
    /// HTTP method.
    pub method: String,
    /// Request URI (with query string).
    pub uri: String,
    /// Request path (without query string).
    pub path: String,
    /// Query string.
    pub query_string: String,
    /// HTTP protocol version.
    pub protocol: String,
    /// Request headers.
    pub headers: KeyValueCollection,
    /// GET arguments.
    pub args_get: KeyValueCollection,
    /// POST arguments.
    pub args_post: KeyValueCollection,
    /// Request body.
    pub body: Vec<u8>,
    /// Client IP address.
    pub client_ip: String,
    /// Client port.
    pub client_port: u16,
}

impl RequestData {
    /// Create new request data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URI and parse path/query string.
    pub fn set_uri(&mut self, uri: &str) {
        self.uri = uri.to_string();
        self.args_get.clear();

        match uri.split_once('?') {
            Some((path, query)) => {
                self.path = path.to_string();
                self.query_string = query.to_string();
                self.args_get = parse_urlencoded(query);
            }
            None => {
                self.path = uri.to_string();
                self.query_string.clear();
            }
        }
    }

    /// Set the HTTP method.
    pub fn set_method(&mut self, method: &str) {
        self.method = method.to_string();
    }

    /// Set the protocol.
    pub fn set_protocol(&mut self, protocol: &str) {
        self.protocol = protocol.to_string();
    }

    /// Set the client address.
    pub fn set_client(&mut self, ip: &str, port: u16) {
        self.client_ip = ip.to_string();
        self.client_port = port;
    }

    /// Add a request header.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    /// Append to request body.
    pub fn append_body(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
    }

    /// Get body as string.
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse an urlencoded form body into `args_post`.
    pub fn parse_form_body(&mut self) {
        self.args_post = parse_urlencoded(&self.body_str());
    }

    /// Get all arguments (GET then POST).
    pub fn all_args(&self) -> Vec<(&str, &str)> {
        let mut all = self.args_get.all();
        all.extend(self.args_post.all());
        all
    }
}

/// Parse `a=1&b=2` pairs, percent-decoding keys and values.
fn parse_urlencoded(input: &str) -> KeyValueCollection {
    let mut out = KeyValueCollection::new();
    for pair in input.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        out.add(decode_component(key), decode_component(value));
    }
    out
}

fn decode_component(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_encoding::percent_decode_str(&s)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_uri_parses_query() {
        let mut req = RequestData::new();
        req.set_uri("/search?q=hello+world&id=%31");
        assert_eq!(req.path, "/search");
        assert_eq!(req.query_string, "q=hello+world&id=%31");
        assert_eq!(req.args_get.get("q"), Some(vec!["hello world"]));
        assert_eq!(req.args_get.get("id"), Some(vec!["1"]));
    }

    #[test]
    fn test_form_body() {
        let mut req = RequestData::new();
        req.set_uri("/login?next=home");
        req.append_body(b"user=admin&pass=x%27");
        req.parse_form_body();
        assert_eq!(req.args_post.get("pass"), Some(vec!["x'"]));
        assert_eq!(
            req.all_args(),
            vec![("next", "home"), ("user", "admin"), ("pass", "x'")]
        );
    }
}
