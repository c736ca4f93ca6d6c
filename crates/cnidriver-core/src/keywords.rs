//! Placeholder substitution inside CNI config values.
//!
//! Recognized forms, applied to string values only:
//! - `$NAME` as the whole string, or `${NAME}` anywhere in it, where
//!   `NAME` is a host property ([`Host::property`]).
//! - `__host.label__<key>` as the whole string, replaced by the host label.
//!
//! Placeholders that do not resolve are left as they are. Object keys are
//! never rewritten.

use std::borrow::Cow;

use cnidriver_common::types::Host;
use serde_json::Value;

/// Prefix of the host label placeholder.
pub const HOST_LABEL_PREFIX: &str = "__host.label__";

/// Returns a copy of `value` with every placeholder resolved against `host`.
#[must_use]
pub fn substitute(value: &Value, host: &Host) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, host)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute(v, host)).collect()),
        Value::String(s) => Value::String(substitute_str(s, host).into_owned()),
        other => other.clone(),
    }
}

/// Resolves placeholders within a single string.
#[must_use]
pub fn substitute_str<'a>(s: &'a str, host: &Host) -> Cow<'a, str> {
    if let Some(key) = s.strip_prefix(HOST_LABEL_PREFIX) {
        return host
            .label(key)
            .map_or(Cow::Borrowed(s), |v| Cow::Owned(v.to_string()));
    }
    if let Some(value) = s.strip_prefix('$').and_then(|name| host.property(name)) {
        return Cow::Owned(value.into_owned());
    }
    expand_braced(s, host)
}

fn expand_braced<'a>(s: &'a str, host: &Host) -> Cow<'a, str> {
    if !s.contains("${") {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // unterminated
            break;
        };
        let name = &after[..end];
        match host.property(name) {
            Some(v) => out.push_str(&v),
            None => out.push_str(&rest[start..start + end + 3]),
        }
        rest = &after[end + 1..];
    }
    if let Some(start) = rest.find("${") {
        out.push_str(&rest[start..]);
    } else {
        out.push_str(rest);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn host() -> Host {
        let mut host = Host {
            uuid: "h1".into(),
            agent_ip: "10.0.0.5".into(),
            environment_uuid: "e1".into(),
            ..Host::default()
        };
        let _ = host
            .properties
            .insert("CNI_SUBNET".into(), "10.42.0.0/16".into());
        let _ = host
            .labels
            .insert("io.rancher.network.mtu".into(), "1450".into());
        host
    }

    #[test]
    fn whole_string_token_is_replaced() {
        let out = substitute(&json!({"subnet": "$CNI_SUBNET"}), &host());
        assert_eq!(out, json!({"subnet": "10.42.0.0/16"}));
    }

    #[test]
    fn nested_tokens_are_replaced_at_any_depth() {
        let raw = json!({
            "ipam": {
                "routes": [{"dst": "$CNI_SUBNET"}, {"dst": "0.0.0.0/0"}],
                "gateway": "$AGENT_IP"
            },
            "args": [["$HOST_UUID"]]
        });
        let out = substitute(&raw, &host());
        assert_eq!(out["ipam"]["routes"][0]["dst"], "10.42.0.0/16");
        assert_eq!(out["ipam"]["routes"][1]["dst"], "0.0.0.0/0");
        assert_eq!(out["ipam"]["gateway"], "10.0.0.5");
        assert_eq!(out["args"][0][0], "h1");
    }

    #[test]
    fn embedded_braced_token_is_replaced() {
        let out = substitute_str("route via ${AGENT_IP} in ${ENVIRONMENT_UUID}", &host());
        assert_eq!(out, "route via 10.0.0.5 in e1");
    }

    #[test]
    fn label_token_is_replaced() {
        let out = substitute(&json!({"mtu": "__host.label__io.rancher.network.mtu"}), &host());
        assert_eq!(out, json!({"mtu": "1450"}));
    }

    #[test]
    fn unknown_tokens_pass_through() {
        let raw = json!({
            "a": "$NOT_A_PROPERTY",
            "b": "${NOPE}/24",
            "c": "__host.label__missing",
            "d": "${unterminated"
        });
        assert_eq!(substitute(&raw, &host()), raw);
    }

    #[test]
    fn non_string_scalars_and_keys_are_untouched() {
        let raw = json!({"$CNI_SUBNET": 1, "flag": true, "none": null, "mtu": 1500.5});
        assert_eq!(substitute(&raw, &host()), raw);
    }

    #[test]
    fn substitution_is_idempotent() {
        let raw = json!({"subnet": "$CNI_SUBNET", "list": ["${AGENT_IP}:80", "plain"]});
        let once = substitute(&raw, &host());
        assert_eq!(substitute(&once, &host()), once);
    }
}
