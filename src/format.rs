//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Named format validators
//!
//! The `format` keyword delegates to this registry. Each validator declares
//! the drafts that define it; a name unknown in the active draft downgrades
//! to an annotation.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use crate::draft::DraftSet;

/// One named format validator
pub struct FormatValidator {
    name: &'static str,
    drafts: DraftSet,
    check: fn(&str) -> bool,
}

impl FormatValidator {
    /// Format name as it appears in schemas
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Drafts that define this format
    pub fn supported_drafts(&self) -> DraftSet {
        self.drafts
    }

    /// Run the check
    pub fn check(&self, input: &str) -> bool {
        (self.check)(input)
    }
}

/// Look up a format validator by name
pub fn lookup(name: &str) -> Option<&'static FormatValidator> {
    FORMATS.iter().find(|f| f.name == name)
}

/// Whether a format name is known to the registry
pub fn is_known(name: &str) -> bool {
    lookup(name).is_some()
}

static FORMATS: &[FormatValidator] = &[
    FormatValidator {
        name: "date-time",
        drafts: DraftSet::ALL,
        check: check_date_time,
    },
    FormatValidator {
        name: "date",
        drafts: DraftSet::FROM_DRAFT7,
        check: check_date,
    },
    FormatValidator {
        name: "time",
        drafts: DraftSet::FROM_DRAFT7,
        check: check_time,
    },
    FormatValidator {
        name: "duration",
        drafts: DraftSet::DRAFT2019_09,
        check: check_duration,
    },
    FormatValidator {
        name: "email",
        drafts: DraftSet::ALL,
        check: check_email,
    },
    FormatValidator {
        name: "idn-email",
        drafts: DraftSet::FROM_DRAFT7,
        check: check_idn_email,
    },
    FormatValidator {
        name: "hostname",
        drafts: DraftSet::ALL,
        check: check_hostname,
    },
    FormatValidator {
        name: "idn-hostname",
        drafts: DraftSet::FROM_DRAFT7,
        check: check_idn_hostname,
    },
    FormatValidator {
        name: "ipv4",
        drafts: DraftSet::ALL,
        check: check_ipv4,
    },
    FormatValidator {
        name: "ipv6",
        drafts: DraftSet::ALL,
        check: check_ipv6,
    },
    FormatValidator {
        name: "uri",
        drafts: DraftSet::ALL,
        check: check_uri,
    },
    FormatValidator {
        name: "uri-reference",
        drafts: DraftSet::FROM_DRAFT6,
        check: check_uri_reference,
    },
    FormatValidator {
        name: "iri",
        drafts: DraftSet::FROM_DRAFT7,
        check: check_uri,
    },
    FormatValidator {
        name: "iri-reference",
        drafts: DraftSet::FROM_DRAFT7,
        check: check_uri_reference,
    },
    FormatValidator {
        name: "uri-template",
        drafts: DraftSet::FROM_DRAFT6,
        check: check_uri_template,
    },
    FormatValidator {
        name: "uuid",
        drafts: DraftSet::DRAFT2019_09,
        check: check_uuid,
    },
    FormatValidator {
        name: "json-pointer",
        drafts: DraftSet::FROM_DRAFT6,
        check: check_json_pointer,
    },
    FormatValidator {
        name: "relative-json-pointer",
        drafts: DraftSet::FROM_DRAFT7,
        check: check_relative_json_pointer,
    },
    FormatValidator {
        name: "regex",
        drafts: DraftSet::FROM_DRAFT7,
        check: check_regex,
    },
];

fn check_date_time(input: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(input).is_ok()
}

fn check_date(input: &str) -> bool {
    chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok() && input.len() == 10
}

fn check_time(input: &str) -> bool {
    static TIME: OnceLock<regex::Regex> = OnceLock::new();
    let regex = TIME.get_or_init(|| {
        regex::Regex::new(
            r"^([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?([Zz]|[+-]([01][0-9]|2[0-3]):[0-5][0-9])$",
        )
        .expect("time regex compiles")
    });
    regex.is_match(input)
}

/// ISO 8601 duration: `P` followed by date components, an optional `T`
/// section, or a week count
fn check_duration(input: &str) -> bool {
    let Some(mut rest) = input.strip_prefix('P') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }

    fn take_components<'a>(mut s: &'a str, designators: &[char], fractions: bool) -> Option<&'a str> {
        let mut seen_any = false;
        for &designator in designators {
            let digits: String = s
                .chars()
                .take_while(|c| c.is_ascii_digit() || (fractions && *c == '.'))
                .collect();
            if digits.is_empty() {
                continue;
            }
            let after = &s[digits.len()..];
            if after.starts_with(designator) {
                seen_any = true;
                s = &after[designator.len_utf8()..];
            }
        }
        seen_any.then_some(s)
    }

    // week form stands alone
    if let Some(after) = take_components(rest, &['W'], false) {
        return after.is_empty();
    }

    let mut seen = false;
    if let Some(after) = take_components(rest, &['Y', 'M', 'D'], false) {
        seen = true;
        rest = after;
    }
    if let Some(time_part) = rest.strip_prefix('T') {
        match take_components(time_part, &['H', 'M', 'S'], true) {
            Some(after) if after.is_empty() => return true,
            _ => return false,
        }
    }
    seen && rest.is_empty()
}

fn check_email(input: &str) -> bool {
    static EMAIL: OnceLock<regex::Regex> = OnceLock::new();
    let regex = EMAIL.get_or_init(|| {
        regex::Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("email regex compiles")
    });
    regex.is_match(input)
}

fn check_idn_email(input: &str) -> bool {
    let mut parts = input.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        _ => false,
    }
}

fn check_hostname(input: &str) -> bool {
    if input.is_empty() || input.len() > 253 {
        return false;
    }
    input.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

fn check_idn_hostname(input: &str) -> bool {
    !input.is_empty() && !input.contains(char::is_whitespace)
}

fn check_ipv4(input: &str) -> bool {
    input.parse::<Ipv4Addr>().is_ok()
}

fn check_ipv6(input: &str) -> bool {
    input.parse::<Ipv6Addr>().is_ok()
}

fn check_uri(input: &str) -> bool {
    url::Url::parse(input).is_ok()
}

fn check_uri_reference(input: &str) -> bool {
    match url::Url::parse(input) {
        Ok(_) => true,
        // a relative reference is fine; other parse failures are not
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            !input.contains(char::is_whitespace) && !input.contains('\\')
        }
        Err(_) => false,
    }
}

/// RFC 6570 shape check: balanced, non-nested, non-empty expressions
fn check_uri_template(input: &str) -> bool {
    let mut depth = 0usize;
    let mut expression_len = 0usize;
    for c in input.chars() {
        match c {
            '{' => {
                if depth > 0 {
                    return false;
                }
                depth = 1;
                expression_len = 0;
            }
            '}' => {
                if depth == 0 || expression_len == 0 {
                    return false;
                }
                depth = 0;
            }
            _ if depth > 0 => expression_len += 1,
            _ => {}
        }
    }
    depth == 0
}

fn check_uuid(input: &str) -> bool {
    input.len() == 36 && uuid::Uuid::parse_str(input).is_ok()
}

fn check_json_pointer(input: &str) -> bool {
    if input.is_empty() {
        return true;
    }
    if !input.starts_with('/') {
        return false;
    }
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.peek(), Some('0') | Some('1')) {
            return false;
        }
    }
    true
}

fn check_relative_json_pointer(input: &str) -> bool {
    let digits: String = input.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return false;
    }
    let rest = &input[digits.len()..];
    rest.is_empty() || rest == "#" || check_json_pointer(rest)
}

fn check_regex(input: &str) -> bool {
    regex::Regex::new(input).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;

    fn assert_format(name: &str, valid: &[&str], invalid: &[&str]) {
        let validator = lookup(name).unwrap_or_else(|| panic!("unknown format {}", name));
        for input in valid {
            assert!(validator.check(input), "{} should match {}", name, input);
        }
        for input in invalid {
            assert!(!validator.check(input), "{} should reject {}", name, input);
        }
    }

    #[test]
    fn test_date_time() {
        assert_format(
            "date-time",
            &["2025-01-02T10:05:08Z", "2025-01-02T10:05:08.5+01:00"],
            &["2025-01-02", "not a date", "2025-13-01T00:00:00Z"],
        );
    }

    #[test]
    fn test_date_and_time() {
        assert_format("date", &["2025-01-02"], &["2025-1-2", "2025-13-02", "x"]);
        assert_format(
            "time",
            &["10:05:08Z", "23:59:60Z", "10:05:08+01:00"],
            &["24:00:00Z", "10:05", "10:05:08"],
        );
    }

    #[test]
    fn test_duration() {
        assert_format(
            "duration",
            &["P1Y2M3D", "PT1H30M", "P3W", "P1DT12H", "PT0.5S"],
            &["P", "PT", "1Y", "P1H", "P3W2D"],
        );
    }

    #[test]
    fn test_email_and_hostname() {
        assert_format(
            "email",
            &["user@example.com", "a.b+c@host.org"],
            &["plain", "@example.com", "user@", "user@-bad-.com"],
        );
        assert_format(
            "hostname",
            &["example.com", "a-b.c-d", "localhost"],
            &["", "-leading.com", "trailing-.com", "under_score.com"],
        );
    }

    #[test]
    fn test_ip_addresses() {
        assert_format("ipv4", &["127.0.0.1", "255.255.255.255"], &["256.1.1.1", "1.2.3", "::1"]);
        assert_format("ipv6", &["::1", "2001:db8::8a2e:370:7334"], &["127.0.0.1", "12345::"]);
    }

    #[test]
    fn test_uri_family() {
        assert_format("uri", &["http://example.com/a?b=c#d"], &["/relative/path", "not a uri"]);
        assert_format("uri-reference", &["/relative/path", "#fragment", "http://x/y"], &["has space"]);
        assert_format("uri-template", &["http://x/{id}", "{/path*}"], &["{unclosed", "{}", "{a{b}}"]);
    }

    #[test]
    fn test_uuid() {
        assert_format(
            "uuid",
            &["550e8400-e29b-41d4-a716-446655440000"],
            &["550e8400e29b41d4a716446655440000", "not-a-uuid"],
        );
    }

    #[test]
    fn test_pointers() {
        assert_format("json-pointer", &["", "/a/b", "/a~0b/c~1d"], &["a/b", "/a~2b"]);
        assert_format(
            "relative-json-pointer",
            &["0", "1/a/b", "2#", "0#"],
            &["", "01", "#", "/a"],
        );
    }

    #[test]
    fn test_regex_format() {
        assert_format("regex", &["^a+b*$"], &["(unclosed"]);
    }

    #[test]
    fn test_draft_gating() {
        let uuid = lookup("uuid").unwrap();
        assert!(uuid.supported_drafts().contains(Draft::Draft201909));
        assert!(!uuid.supported_drafts().contains(Draft::Draft7));
    }
}
