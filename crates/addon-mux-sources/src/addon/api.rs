use serde_json::Value;
use urlencoding::encode;
use crate::error::UpstreamError;

const MANIFEST_FILE: &str = "manifest.json";

/// URL of an addon's manifest, given either the manifest URL itself or the addon's base URL
pub fn manifest_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with(&format!("/{}", MANIFEST_FILE)) {
        url.to_string()
    } else {
        format!("{}/{}", url.trim_end_matches('/'), MANIFEST_FILE)
    }
}

/// `{endpoint}catalog/{type}/{id}.json`, or `{endpoint}catalog/{type}/{id}/{extra}.json`
/// when extra arguments are present
pub fn catalog_url(endpoint: &str, content_type: &str, inner_id: &str, extra: Option<&str>) -> String {
    let mut url = String::from(endpoint);
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str("catalog/");
    url.push_str(&encode_segment(content_type));
    url.push('/');
    url.push_str(&encode_segment(inner_id));

    if let Some(extra) = extra.filter(|e| !e.is_empty()) {
        url.push('/');
        url.push_str(&encode_extra(extra));
    }

    url.push_str(".json");
    url
}

/// Percent-encode a path segment. `:` is legal inside a segment and addons use it
/// in catalog ids (`kitsu:trending`), so it is left as is.
fn encode_segment(segment: &str) -> String {
    encode(segment).replace("%3A", ":")
}

/// Percent-encode each key and value of a `key=value&key=value` extra string,
/// keeping the `&` and `=` delimiters
pub fn encode_extra(extra: &str) -> String {
    extra
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => format!("{}={}", encode(key), encode(value)),
            None => encode(pair).into_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Pull the `metas` array out of a catalog response body
pub fn extract_metas(body: Value, url: &str) -> Result<Vec<Value>, UpstreamError> {
    match body {
        Value::Object(mut fields) => match fields.remove("metas") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(UpstreamError::MissingMetas { url: url.to_string() }),
        },
        _ => Err(UpstreamError::MissingMetas { url: url.to_string() }),
    }
}
