//! Pure regrouping of publishable groups into invite-link summaries.
//!
//! Buckets are keyed `DOMAIN` or `DOMAIN#CATEGORY`, both parts uppercased and
//! stripped to `[A-Za-z0-9]`. Each bucket keeps its ten smallest groups by
//! member count; ties keep their read order.

use std::collections::{BTreeMap, HashMap};

use crate::model::{Category, Group, InviteLinkSummary};

pub const MAX_INVITES: usize = 10;

pub fn sanitize_key(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn normalize(s: Option<&str>) -> String {
    s.map(|v| sanitize_key(&v.to_uppercase())).unwrap_or_default()
}

/// `(domainKey, categoryKey)` for a group; `None` when it has no usable domain.
pub fn bucket_parts(group: &Group) -> Option<(String, String)> {
    let domain = normalize(group.domain.as_deref());
    if domain.is_empty() {
        return None;
    }
    Some((domain, normalize(group.category.as_deref())))
}

pub fn bucket_key(domain_key: &str, category_key: &str) -> String {
    if category_key.is_empty() {
        domain_key.to_string()
    } else {
        format!("{domain_key}#{category_key}")
    }
}

/// "DEV" -> "Dev"
pub fn format_name(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

pub fn encode_invite(group: &Group) -> String {
    format!(
        "{}|{}|{}",
        group.sk,
        group.name,
        group.invite_code.as_deref().unwrap_or_default()
    )
}

/// Category display names, looked up by bucket category key.
pub struct CategoryNames {
    exact: HashMap<String, String>,
    normalized: HashMap<String, String>,
}

impl CategoryNames {
    pub fn new(categories: &[Category]) -> Self {
        let mut exact = HashMap::new();
        let mut normalized = HashMap::new();
        for c in categories {
            exact.insert(c.sk.clone(), c.name.clone());
            normalized
                .entry(normalize(Some(&c.sk)))
                .or_insert_with(|| c.name.clone());
        }
        Self { exact, normalized }
    }

    pub fn get(&self, category_key: &str) -> Option<&str> {
        if category_key.is_empty() {
            return None;
        }
        self.exact
            .get(category_key)
            .or_else(|| self.normalized.get(category_key))
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }
}

/// Builds one summary per bucket, keyed by the summary's sort key.
///
/// `domain` restricts output to buckets whose domain key equals the
/// uppercased filter. `updated` is stamped on every record as-is.
pub fn aggregate(
    groups: &[Group],
    categories: &[Category],
    domain: Option<&str>,
    updated: &str,
) -> BTreeMap<String, InviteLinkSummary> {
    let names = CategoryNames::new(categories);
    let wanted = domain.filter(|d| !d.is_empty()).map(str::to_uppercase);

    let mut buckets: BTreeMap<String, (String, String, Vec<&Group>)> = BTreeMap::new();
    for group in groups
        .iter()
        .filter(|g| g.publishable && g.has_invite_code())
    {
        let Some((domain_key, category_key)) = bucket_parts(group) else {
            continue;
        };
        buckets
            .entry(bucket_key(&domain_key, &category_key))
            .or_insert_with(|| (domain_key, category_key, Vec::new()))
            .2
            .push(group);
    }

    let mut out = BTreeMap::new();
    for (key, (domain_key, category_key, mut members)) in buckets {
        if wanted.as_deref().is_some_and(|w| w != domain_key) {
            continue;
        }

        // stable: equal member counts keep read order
        members.sort_by_key(|g| g.members());
        members.truncate(MAX_INVITES);

        let domain_name = members
            .first()
            .and_then(|g| g.domain.clone())
            .unwrap_or_else(|| format_name(&domain_key));

        let summary = InviteLinkSummary {
            sk: key.clone(),
            domain_name,
            category_name: names.get(&category_key).map(str::to_string),
            invite_codes: members.iter().map(|g| encode_invite(g)).collect(),
            updated: updated.to_string(),
        };
        out.insert(key, summary);
    }
    out
}
