use serde::{Deserialize, Serialize};

/// Organization a short code belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct OrganizationRef {
    pub id: String,
    pub name: String,
}

/// A short code as returned by the Link service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ShortCode {
    pub id: String,
    pub code: String,
    pub long_url: String,
    pub domain: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "organizationId", default)]
    pub organization: OrganizationRef,
}

/// Optional fields of a new short code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateShortCodeOptions {
    /// Requested code. The service picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[allow(missing_docs)]
    pub tags: Vec<String>,
}

#[derive(Serialize)]
pub(super) struct CreateShortCodeBody<'a> {
    pub long_url: &'a str,
    pub domain: &'a str,
    #[serde(flatten)]
    pub options: &'a CreateShortCodeOptions,
}

/// Fields to change on an existing short code. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct UpdateShortCodeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Page selection. Zero or absent values are left to the service's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Pagination {
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
}

impl Pagination {
    /// Select page `page_num` of `page_size` entries.
    pub fn new(page_num: u32, page_size: u32) -> Self {
        Pagination {
            page_num: Some(page_num),
            page_size: Some(page_size),
        }
    }

    pub(super) fn append_to(&self, query: &mut Vec<(&'static str, String)>) {
        if let Some(page_num) = self.page_num.filter(|n| *n > 0) {
            query.push(("pageNum", page_num.to_string()));
        }
        if let Some(page_size) = self.page_size.filter(|n| *n > 0) {
            query.push(("pageSize", page_size.to_string()));
        }
    }
}

/// Filter for listing short codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortCodeQuery {
    /// Substring of the title to search for.
    pub title: Option<String>,
    /// Only codes carrying these tags.
    pub tags: Vec<String>,
    #[allow(missing_docs)]
    pub pagination: Pagination,
}

impl ShortCodeQuery {
    pub(super) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            query.push(("title", title.to_owned()));
        }
        if !self.tags.is_empty() {
            query.push(("tags", self.tags.join(",")));
        }
        self.pagination.append_to(&mut query);
        query
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Page<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page_num: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Size of a generated QR code image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum QrSize {
    Small,
    Medium,
    Large,
}

/// Options of a new QR code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrCodeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub title: Option<String>,
    /// CSS color, e.g. `#ffffff`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// CSS color of the code itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub size: Option<QrSize>,
    /// Logo image, as a data URL or base64 string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// A QR code attached to a short code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    #[allow(missing_docs)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub title: Option<String>,
    /// Image as a data URL.
    #[serde(default)]
    pub qr_code: String,
    /// Link the QR code resolves to.
    #[serde(default)]
    pub qr_link: String,
}

/// Click counts of a single day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct DailyClicks {
    pub date: String,
    pub total: u64,
    pub unique: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct ClickStats {
    pub total: u64,
    pub unique: u64,
    pub by_day: Vec<DailyClicks>,
}

/// Statistics of a short code over a date range.
///
/// The breakdowns are passed through as the service returns them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct CodeStats {
    pub clicks: ClickStats,
    pub referrals: Vec<serde_json::Value>,
    pub browsers: Vec<serde_json::Value>,
    pub devices: Vec<serde_json::Value>,
    pub locations: Vec<serde_json::Value>,
}
