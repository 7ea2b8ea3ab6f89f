// Shopline CLI — Lenient selector matching
//
// Used once an exact profile-name lookup has failed. The selector and each
// profile's name and handle are reduced to sets of lookup keys so a user can
// paste `demo.myshopline.com` or an admin URL
// (`https://admin.shoplineapp.com/admin/demo/`) instead of the bare handle.

use std::collections::BTreeSet;

use url::Url;

use crate::secrets::StoreCredentials;

/// Host suffixes that wrap a store handle.
const HANDLE_HOST_SUFFIXES: [&str; 3] = [".myshopline.com", ".shoplineapp.com", ".shoplineapp.cn"];

/// Shortest selector allowed to match by prefix.
const MIN_PREFIX_LEN: usize = 3;

/// Every normalised form of `value` worth comparing.
pub fn lookup_keys(value: &str) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return keys;
    }

    add_key(&mut keys, &normalized);

    if normalized.contains("://") {
        add_url_keys(&mut keys, &normalized);
    } else if normalized.contains('/') {
        add_url_keys(&mut keys, &format!("https://{}", normalized));
    } else if normalized.contains('.') {
        add_host_keys(&mut keys, &normalized);
    }

    keys
}

/// Reduce user input (handle, host or admin URL) to a bare handle.
pub fn normalize_handle(input: &str) -> String {
    let trimmed = input.trim().trim_matches('/').to_lowercase();
    if trimmed.contains('/') {
        let raw = if trimmed.contains("://") {
            trimmed.clone()
        } else {
            format!("https://{}", trimmed)
        };
        if let Ok(url) = Url::parse(&raw) {
            let segments: Vec<&str> = url
                .path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                .unwrap_or_default();
            if let Some(pos) = segments.iter().position(|seg| *seg == "admin") {
                if let Some(handle) = segments.get(pos + 1) {
                    return handle.to_string();
                }
            }
            if let Some(host) = url.host_str() {
                return store_handle_of_host(host).unwrap_or(host).to_string();
            }
        }
    }
    store_handle_of_host(&trimmed).unwrap_or(&trimmed).to_string()
}

/// `demo.myshopline.com` -> `demo`. Service hosts such as
/// `admin.shoplineapp.com` carry no handle and are left as they are.
fn store_handle_of_host(host: &str) -> Option<&str> {
    strip_handle_suffix(host).filter(|h| !is_service_label(h))
}

/// Profiles matching `requested`: exact key matches if there are any,
/// otherwise prefix matches. Unique by name, sorted case-insensitively.
pub fn find_matches<'a>(requested: &str, profiles: &'a [StoreCredentials]) -> Vec<&'a StoreCredentials> {
    let request_keys = lookup_keys(requested);
    if request_keys.is_empty() {
        return Vec::new();
    }

    let mut exact = Vec::new();
    let mut prefix = Vec::new();

    for creds in profiles {
        let mut candidate_keys = lookup_keys(creds.name());
        candidate_keys.extend(lookup_keys(creds.handle()));

        if !request_keys.is_disjoint(&candidate_keys) {
            exact.push(creds);
        } else if has_prefix_match(&request_keys, creds.name(), creds.handle()) {
            prefix.push(creds);
        }
    }

    let mut matches = if exact.is_empty() { prefix } else { exact };
    matches.sort_by_key(|c| c.name().to_lowercase());
    matches.dedup_by(|a, b| a.name() == b.name());
    matches
}

fn has_prefix_match(request_keys: &BTreeSet<String>, name: &str, handle: &str) -> bool {
    let name = name.trim().to_lowercase();
    let handle = handle.trim().to_lowercase();
    request_keys
        .iter()
        .filter(|key| key.chars().count() >= MIN_PREFIX_LEN)
        .any(|key| name.starts_with(key.as_str()) || handle.starts_with(key.as_str()))
}

fn add_url_keys(keys: &mut BTreeSet<String>, raw: &str) {
    let Ok(url) = Url::parse(raw) else {
        return;
    };

    if let Some(host) = url.host_str() {
        add_key(keys, host);
        add_host_keys(keys, host);
    }

    let segments: Vec<&str> = match url.path_segments() {
        Some(segments) => segments.filter(|s| !s.is_empty()).collect(),
        None => return,
    };
    for (i, segment) in segments.iter().enumerate() {
        add_key(keys, segment);
        if *segment == "admin" {
            if let Some(next) = segments.get(i + 1) {
                add_key(keys, next);
            }
        }
    }
}

fn add_host_keys(keys: &mut BTreeSet<String>, host: &str) {
    if let Some(handle) = store_handle_of_host(host) {
        add_key(keys, handle);
    }
    if let Some((label, _)) = host.split_once('.') {
        if !label.is_empty() && !is_service_label(label) {
            add_key(keys, label);
        }
    }
}

/// Host labels that belong to the platform rather than a store.
pub fn is_service_label(label: &str) -> bool {
    label == "www" || label == "admin"
}

fn strip_handle_suffix(host: &str) -> Option<&str> {
    HANDLE_HOST_SUFFIXES
        .iter()
        .find_map(|suffix| host.strip_suffix(suffix))
        .filter(|handle| !handle.is_empty())
}

fn add_key(keys: &mut BTreeSet<String>, raw: &str) {
    let key = raw.trim().trim_matches('/').to_lowercase();
    if !key.is_empty() {
        keys.insert(key);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
