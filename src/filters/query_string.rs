use std::collections::BTreeMap;

use urlencoding::encode;

use super::validator::NormalizedQuery;

/// Build a query string from key-value pairs
pub fn build_query_string(pairs: &[(String, String)]) -> String {
    let mut first = true;
    let mut out = String::new();
    for (k, v) in pairs {
        if !first {
            out.push('&');
        } else {
            first = false;
        }
        out.push_str(&encode(k));
        out.push('=');
        out.push_str(&encode(v));
    }
    out
}

/// Canonical encoding of a normalised query: keys sorted, list values in
/// canonical order, absent filters omitted. Semantically identical queries
/// always encode to the same string.
pub fn query_signature(query: &NormalizedQuery) -> String {
    let f = &query.filters;
    let mut params: BTreeMap<&str, String> = BTreeMap::new();

    if !f.storage_ranges.is_empty() {
        let labels: Vec<&str> = f.storage_ranges.iter().map(|r| r.label).collect();
        params.insert("storage", labels.join(","));
    }
    if !f.ram_sizes.is_empty() {
        let sizes: Vec<String> = f.ram_sizes.iter().map(|gb| gb.to_string()).collect();
        params.insert("ram", sizes.join(","));
    }
    if let Some(disk) = f.disk_type {
        params.insert("disk_type", disk.as_str().to_string());
    }
    if let Some(location) = &f.location {
        params.insert("location", location.clone());
    }
    if let Some(min) = f.price_min {
        params.insert("price_min", min.normalize().to_string());
    }
    if let Some(max) = f.price_max {
        params.insert("price_max", max.normalize().to_string());
    }
    params.insert("sort", query.sort.field.as_str().to_string());
    params.insert("order", query.sort.order.as_str().to_string());
    params.insert("page", query.page.to_string());
    params.insert("limit", query.limit.to_string());

    let pairs: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    build_query_string(&pairs)
}
