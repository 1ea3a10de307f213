// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cookie text helpers shared by the ticket providers.
//!
//! Providers never touch a response object. They return [`OutboundHeader`]
//! values and the transport layer applies them.

use chrono::{DateTime, Utc};

/// Name of the response header used to set cookies.
pub const SET_COOKIE: &str = "Set-Cookie";

/// A header the caller should add to its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundHeader {
    pub name: &'static str,
    pub value: String,
}

impl OutboundHeader {
    pub fn set_cookie(value: impl Into<String>) -> Self {
        Self {
            name: SET_COOKIE,
            value: value.into(),
        }
    }
}

/// Attributes of a `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub expires: Option<DateTime<Utc>>,
    pub path: &'a str,
    pub domain: Option<&'a str>,
}

impl SetCookie<'_> {
    /// Render as `name=value; Expires=..; Path=..; Domain=..; HttpOnly`.
    pub fn render(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(expires) = self.expires {
            out.push_str("; Expires=");
            out.push_str(&http_date(expires));
        }
        out.push_str("; Path=");
        out.push_str(self.path);
        if let Some(domain) = self.domain.filter(|d| !d.is_empty()) {
            out.push_str("; Domain=");
            out.push_str(domain);
        }
        out.push_str("; HttpOnly");
        out
    }
}

/// A cookie that tells the client to drop `name` right away.
///
/// Expires at the Unix epoch, so the instruction is the same on every call.
pub fn removal_cookie(name: &str, path: &str, domain: Option<&str>) -> OutboundHeader {
    let cookie = SetCookie {
        name,
        value: "",
        expires: Some(DateTime::<Utc>::UNIX_EPOCH),
        path,
        domain,
    };
    OutboundHeader::set_cookie(cookie.render())
}

/// RFC 1123 date in GMT, e.g. `Tue, 20 Oct 2026 08:00:00 GMT`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Find the value of cookie `name` among `Cookie` request header values.
///
/// Blank values count as absent.
pub fn find_cookie<'a, I>(cookie_headers: I, name: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    cookie_headers
        .into_iter()
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, 8, 0, 0).unwrap()
    }

    #[test]
    fn http_date_is_rfc1123() {
        assert_eq!(http_date(at()), "Tue, 20 Oct 2026 08:00:00 GMT");
    }

    #[test]
    fn render_without_domain() {
        let cookie = SetCookie {
            name: "CookieTicket",
            value: "abc+/=",
            expires: Some(at()),
            path: "/",
            domain: None,
        };
        assert_eq!(
            cookie.render(),
            "CookieTicket=abc+/=; Expires=Tue, 20 Oct 2026 08:00:00 GMT; Path=/; HttpOnly"
        );
    }

    #[test]
    fn render_with_domain_and_no_expiry() {
        let cookie = SetCookie {
            name: "auth",
            value: "token",
            expires: None,
            path: "/app",
            domain: Some("example.com"),
        };
        assert_eq!(
            cookie.render(),
            "auth=token; Path=/app; Domain=example.com; HttpOnly"
        );
    }

    #[test]
    fn removal_cookie_is_already_expired() {
        let header = removal_cookie("auth", "/", None);
        assert_eq!(header.name, SET_COOKIE);
        assert_eq!(
            header.value,
            "auth=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/; HttpOnly"
        );
        assert_eq!(header, removal_cookie("auth", "/", None));
    }

    #[test]
    fn find_cookie_across_headers() {
        let headers = ["theme=dark; lang=en", "auth=c2VhbGVk==; other=1"];
        assert_eq!(
            find_cookie(headers, "auth"),
            Some("c2VhbGVk==".to_string())
        );
        assert_eq!(find_cookie(headers, "lang"), Some("en".to_string()));
        assert_eq!(find_cookie(headers, "missing"), None);
    }

    #[test]
    fn find_cookie_treats_blank_as_absent() {
        assert_eq!(find_cookie(["auth="], "auth"), None);
        assert_eq!(find_cookie(["auth=\"\""], "auth"), None);
        assert_eq!(find_cookie(std::iter::empty(), "auth"), None);
    }
}
