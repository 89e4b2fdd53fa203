//! Turns the supported input kinds into the single string that gets encoded.

use base64::Engine as _;
use tracing::warn;

use crate::error::EncodeError;

/// One input as supplied by the caller, before normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Free text, encoded as-is.
    Text(String),
    /// A URL; `http://` and `https://` URLs are structurally validated.
    Url(String),
    /// WiFi credentials as `SSID:PASSWORD[:SECURITY]`.
    Wifi(String),
    /// The contents of a `.vcf` contact record.
    VCard(String),
    /// A `data:<mime>;base64,<data>` URI.
    DataUri(String),
}

/// Knobs for [`Payload::normalize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Backslash-escape `\ ; , :` inside the WiFi SSID and password.
    ///
    /// Off by default: the generated string then matches what earlier releases produced,
    /// even though readers may split fields at a `;` inside a password.
    pub escape_wifi: bool,
}

impl Payload {
    /// Produces the string to encode, or `InvalidInput` when the payload is empty or malformed.
    pub fn normalize(&self, options: &NormalizeOptions) -> Result<String, EncodeError> {
        let normalized = match self {
            Payload::Text(text) => text.clone(),
            Payload::Url(url) => normalize_url(url)?,
            Payload::Wifi(credentials) => wifi_string(credentials, options.escape_wifi)?,
            Payload::VCard(text) => normalize_vcard(text),
            Payload::DataUri(uri) => normalize_data_uri(uri)?,
        };
        if normalized.is_empty() {
            return Err(EncodeError::InvalidInput("payload is empty".into()));
        }
        Ok(normalized)
    }
}

fn normalize_url(url: &str) -> Result<String, EncodeError> {
    if (url.starts_with("http://") || url.starts_with("https://")) && !is_valid_url(url) {
        return Err(EncodeError::InvalidInput(format!("invalid URL format: {url}")));
    }
    Ok(url.to_string())
}

/// Checks that `url` has a scheme and a non-empty host.
pub fn is_valid_url(url: &str) -> bool {
    if url.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((scheme, rest)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok {
        return false;
    }
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let hostport = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = if hostport.starts_with('[') {
        // IPv6 literal, keep the brackets.
        hostport.split_once(']').map_or("", |(h, _)| h)
    } else {
        hostport.split(':').next().unwrap_or_default()
    };
    !host.is_empty()
}

/// Builds the `WIFI:` join string from `SSID:PASSWORD[:SECURITY]`.
///
/// The security type defaults to `WPA` and is upper-cased. Fields past the third are ignored.
pub fn wifi_string(credentials: &str, escape: bool) -> Result<String, EncodeError> {
    let parts: Vec<&str> = credentials.split(':').collect();
    if parts.len() < 2 {
        return Err(EncodeError::InvalidInput(
            "WiFi format should be 'SSID:PASSWORD' or 'SSID:PASSWORD:SECURITY'".into(),
        ));
    }
    let security = parts
        .get(2)
        .map_or_else(|| "WPA".to_string(), |s| s.to_uppercase());
    let (ssid, password) = if escape {
        (escape_wifi_field(parts[0]), escape_wifi_field(parts[1]))
    } else {
        (parts[0].to_string(), parts[1].to_string())
    };
    Ok(format!("WIFI:T:{security};S:{ssid};P:{password};H:false;"))
}

fn escape_wifi_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        if matches!(c, '\\' | ';' | ',' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Normalizes line endings to `\n` and trims surrounding whitespace.
pub fn normalize_text_file(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join("\n").trim().to_string()
}

fn normalize_vcard(text: &str) -> String {
    let normalized = normalize_text_file(text);
    if !normalized.is_empty() && !normalized.to_ascii_uppercase().starts_with("BEGIN:VCARD") {
        warn!("vCard does not start with BEGIN:VCARD, encoding it as-is");
    }
    normalized
}

fn normalize_data_uri(uri: &str) -> Result<String, EncodeError> {
    match uri.strip_prefix("data:") {
        Some(rest) if rest.contains(";base64,") => Ok(uri.to_string()),
        _ => Err(EncodeError::InvalidInput(
            "data URI must look like 'data:<mime>;base64,<data>'".into(),
        )),
    }
}

/// MIME type for an image file extension, defaulting to PNG.
pub fn image_mime_type(extension: &str) -> &'static str {
    match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Wraps raw image bytes into a base64 data URI.
pub fn image_data_uri(bytes: &[u8], extension: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{encoded}", image_mime_type(extension))
}

/// Entries of a batch file: trimmed lines, skipping blanks and `#` comments.
pub fn batch_entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(payload: Payload) -> Result<String, EncodeError> {
        payload.normalize(&NormalizeOptions::default())
    }

    #[test]
    fn test_wifi_with_security() {
        assert_eq!(
            normalize(Payload::Wifi("MyWiFi:pass123:WPA".into())).unwrap(),
            "WIFI:T:WPA;S:MyWiFi;P:pass123;H:false;"
        );
    }

    #[test]
    fn test_wifi_defaults_and_uppercases_security() {
        assert_eq!(
            wifi_string("Home:secret", false).unwrap(),
            "WIFI:T:WPA;S:Home;P:secret;H:false;"
        );
        assert_eq!(
            wifi_string("Home:secret:wep:extra", false).unwrap(),
            "WIFI:T:WEP;S:Home;P:secret;H:false;"
        );
    }

    #[test]
    fn test_wifi_requires_two_fields() {
        assert!(matches!(
            normalize(Payload::Wifi("JustSsid".into())),
            Err(EncodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_wifi_escaping_is_opt_in() {
        let options = NormalizeOptions { escape_wifi: true };
        assert_eq!(
            Payload::Wifi("Cafe;1:p,w\\d".into()).normalize(&options).unwrap(),
            "WIFI:T:WPA;S:Cafe\\;1;P:p\\,w\\\\d;H:false;"
        );
        assert_eq!(
            normalize(Payload::Wifi("Cafe;1:p,w".into())).unwrap(),
            "WIFI:T:WPA;S:Cafe;1;P:p,w;H:false;"
        );
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://github.com/user"));
        assert!(is_valid_url("http://user:pw@localhost:8080/x?y#z"));
        assert!(is_valid_url("http://[::1]:80/"));
        assert!(!is_valid_url("http://"));
        assert!(!is_valid_url("https:///path"));
        assert!(!is_valid_url("http://exa mple.com"));
        assert!(matches!(
            normalize(Payload::Url("https://".into())),
            Err(EncodeError::InvalidInput(_))
        ));
        // Non-web URLs are encoded literally.
        assert_eq!(
            normalize(Payload::Url("mailto:me@example.com".into())).unwrap(),
            "mailto:me@example.com"
        );
    }

    #[test]
    fn test_empty_payload() {
        assert!(matches!(
            normalize(Payload::Text(String::new())),
            Err(EncodeError::InvalidInput(_))
        ));
        assert!(matches!(
            normalize(Payload::VCard(" \n ".into())),
            Err(EncodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_vcard_line_endings() {
        let vcard = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jane Doe\r\nEND:VCARD\r\n\r\n";
        assert_eq!(
            normalize(Payload::VCard(vcard.into())).unwrap(),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Jane Doe\nEND:VCARD"
        );
    }

    #[test]
    fn test_data_uri() {
        let uri = image_data_uri(&[0x89, b'P', b'N', b'G'], ".PNG");
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
        assert_eq!(normalize(Payload::DataUri(uri.clone())).unwrap(), uri);
        assert!(normalize(Payload::DataUri("image/png;base64,AAAA".into())).is_err());
        assert_eq!(image_mime_type("jpeg"), "image/jpeg");
        assert_eq!(image_mime_type(".bmp"), "image/png");
    }

    #[test]
    fn test_batch_entries() {
        let text = "# urls\nhttps://a.example\n\n   Contact: +1234567890  \n#skip\n";
        let entries: Vec<&str> = batch_entries(text).collect();
        assert_eq!(entries, vec!["https://a.example", "Contact: +1234567890"]);
    }
}
