/// Untrusted query parameters exactly as a caller supplied them.
///
/// Nothing here is validated; see [`super::validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawQuery {
    pub storage: Vec<String>,
    pub ram: Vec<String>,
    pub disk_type: Option<String>,
    pub location: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl RawQuery {
    /// Collect parameters from decoded key/value pairs.
    ///
    /// Keys are matched case-insensitively, ignoring `_`, `-` and a trailing `[]`,
    /// so `ram[]`, `priceMin` and `price_min` are all recognised. List values may
    /// repeat or be comma separated. For scalar keys the last occurrence wins.
    /// Unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut q = RawQuery::default();
        for (k, v) in pairs {
            let value = v.as_ref().to_string();
            match canonical_key(k.as_ref()).as_str() {
                "storage" | "hdd" => push_list(&mut q.storage, &value),
                "ram" | "memory" => push_list(&mut q.ram, &value),
                "disktype" | "disk" | "harddisktype" => q.disk_type = Some(value),
                "location" => q.location = Some(value),
                "pricemin" | "minprice" => q.price_min = Some(value),
                "pricemax" | "maxprice" => q.price_max = Some(value),
                "sort" | "sortby" => q.sort = Some(value),
                "order" | "sortorder" | "direction" => q.order = Some(value),
                "page" => q.page = Some(value),
                "limit" | "perpage" => q.limit = Some(value),
                _ => {}
            }
        }
        q
    }
}

fn canonical_key(key: &str) -> String {
    key.trim()
        .trim_end_matches("[]")
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn push_list(list: &mut Vec<String>, value: &str) {
    list.extend(
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );
}
