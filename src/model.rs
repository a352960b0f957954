use aws_sdk_dynamodb::types::AttributeValue as Av;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type Item = HashMap<String, Av>;

pub const PK_GROUPS: &str = "WHATSAPP#GROUP";
pub const PK_CATEGORIES: &str = "WHATSAPP#GROUPCATEGORY";
pub const PK_INVITE_LINKS: &str = "WHATSAPP#INVITELINKS";

/// Request body. An empty `domain` is the same as none.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct Payload {
    #[serde(default)]
    pub domain: Option<String>,
}

impl Payload {
    pub fn domain_filter(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Group {
    pub sk: String,
    pub name: String,
    pub domain: Option<String>,
    pub category: Option<String>,
    pub publishable: bool,
    pub invite_code: Option<String>,
    pub total_members: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Category {
    pub sk: String,
    pub name: String,
}

/// One row of the `WHATSAPP#INVITELINKS` partition.
#[derive(Debug, Clone, PartialEq)]
pub struct InviteLinkSummary {
    pub sk: String,
    pub domain_name: String,
    pub category_name: Option<String>,
    /// `SK|Name|InviteCode`, ascending by member count.
    pub invite_codes: Vec<String>,
    pub updated: String,
}

fn s(item: &Item, k: &str) -> Option<String> {
    item.get(k).and_then(|v| v.as_s().ok()).cloned()
}

impl Group {
    pub fn from_item(item: &Item) -> Self {
        Self {
            sk: s(item, "SK").unwrap_or_default(),
            name: s(item, "Name").unwrap_or_default(),
            domain: s(item, "Domain"),
            category: s(item, "Category"),
            publishable: matches!(item.get("Publishable"), Some(Av::Bool(true))),
            invite_code: s(item, "InviteCode"),
            total_members: item
                .get("TotalMembers")
                .and_then(|v| v.as_n().ok())
                .and_then(|n| n.parse::<f64>().ok())
                .map(|n| n as i64),
        }
    }

    pub fn has_invite_code(&self) -> bool {
        self.invite_code.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn members(&self) -> i64 {
        self.total_members.unwrap_or(0)
    }
}

impl Category {
    pub fn from_item(item: &Item) -> Self {
        Self {
            sk: s(item, "SK").unwrap_or_default(),
            name: s(item, "Name").unwrap_or_default(),
        }
    }
}

impl InviteLinkSummary {
    pub fn into_item(self) -> Item {
        let mut item = HashMap::new();
        item.insert("PK".into(), Av::S(PK_INVITE_LINKS.to_string()));
        item.insert("SK".into(), Av::S(self.sk));
        item.insert("DomainName".into(), Av::S(self.domain_name));
        if let Some(category) = self.category_name {
            item.insert("CategoryName".into(), Av::S(category));
        }
        item.insert(
            "InviteCodes".into(),
            Av::L(self.invite_codes.into_iter().map(Av::S).collect()),
        );
        item.insert("Updated".into(), Av::S(self.updated));
        item
    }
}
